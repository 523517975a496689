//! Bresenham lines between tiles

use super::coords::Tripoint;

/// Tiles on the line from `from` to `to`, excluding `from` and including `to`.
///
/// The z coordinate is interpolated evenly along the horizontal steps; a
/// purely vertical line steps one level at a time.
pub fn line_to(from: Tripoint, to: Tripoint) -> Vec<Tripoint> {
    let flat = line_to_2d((from.x, from.y), (to.x, to.y));
    let dz = to.z - from.z;
    if flat.is_empty() {
        let step = dz.signum();
        return (1..=dz.abs())
            .map(|i| from.with_z(from.z + step * i))
            .collect();
    }
    let n = flat.len() as i32;
    flat.into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let i = i as i32 + 1;
            let z = from.z + (dz * i + dz.signum() * n / 2) / n;
            Tripoint::new(x, y, z)
        })
        .collect()
}

/// Horizontal Bresenham line, excluding the start point.
pub fn line_to_2d(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if dx == 0 && dy == 0 {
        return Vec::new();
    }
    let ax = dx.abs() * 2;
    let ay = dy.abs() * 2;
    let sx = dx.signum();
    let sy = dy.signum();
    let (mut x, mut y) = from;
    let mut out = Vec::with_capacity(dx.abs().max(dy.abs()) as usize);
    let mut t = 0;
    if ax == ay {
        while x != to.0 {
            x += sx;
            y += sy;
            out.push((x, y));
        }
    } else if ax > ay {
        while x != to.0 {
            if t > 0 {
                y += sy;
                t -= ax;
            }
            x += sx;
            t += ay;
            out.push((x, y));
        }
    } else {
        while y != to.1 {
            if t > 0 {
                x += sx;
                t -= ay;
            }
            y += sy;
            t += ax;
            out.push((x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ends_at_target() {
        for &(tx, ty) in &[(5, 1), (1, 5), (-4, 3), (3, -3), (0, 7), (-6, 0), (7, 4)] {
            let line = line_to_2d((0, 0), (tx, ty));
            assert_eq!(line.last(), Some(&(tx, ty)));
            assert_eq!(line.len() as i32, tx.abs().max(ty.abs()));
            let mut prev = (0, 0);
            for p in line {
                assert!((p.0 - prev.0).abs() <= 1 && (p.1 - prev.1).abs() <= 1);
                prev = p;
            }
        }
    }

    #[test]
    fn test_line_3d_vertical() {
        let from = Tripoint::new(2, 2, 0);
        let line = line_to(from, Tripoint::new(2, 2, -2));
        assert_eq!(line, vec![Tripoint::new(2, 2, -1), Tripoint::new(2, 2, -2)]);
    }

    #[test]
    fn test_line_3d_interpolates_z() {
        let line = line_to(Tripoint::new(0, 0, 0), Tripoint::new(4, 0, 1));
        assert_eq!(line.len(), 4);
        assert_eq!(line.last(), Some(&Tripoint::new(4, 0, 1)));
        assert_eq!(line[0].z, 0);
    }
}
