//! Tile coordinates and distance metrics

use core::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A tile position; `z` selects the vertical level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Tripoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tripoint {
    pub const ZERO: Tripoint = Tripoint::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Offset this point by a delta
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Same point on another level
    pub const fn with_z(self, z: i32) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Component-wise signum
    pub const fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum(), self.z.signum())
    }

    /// True if both points share x and y
    pub const fn same_column(self, other: Tripoint) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// The eight horizontal neighbours, orthogonal first
    pub fn neighbors(self) -> [Tripoint; 8] {
        [
            self.offset(0, -1, 0),
            self.offset(1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(-1, 0, 0),
            self.offset(1, -1, 0),
            self.offset(1, 1, 0),
            self.offset(-1, 1, 0),
            self.offset(-1, -1, 0),
        ]
    }

    /// Point mirrored through `center`
    pub const fn mirrored_through(self, center: Tripoint) -> Self {
        Self::new(
            2 * center.x - self.x,
            2 * center.y - self.y,
            self.z,
        )
    }
}

impl Add for Tripoint {
    type Output = Tripoint;
    fn add(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Tripoint {
    fn add_assign(&mut self, rhs: Tripoint) {
        *self = *self + rhs;
    }
}

impl Sub for Tripoint {
    type Output = Tripoint;
    fn sub(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Tripoint {
    type Output = Tripoint;
    fn neg(self) -> Tripoint {
        Tripoint::new(-self.x, -self.y, -self.z)
    }
}

impl core::fmt::Display for Tripoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Distance metric used for ranges, light falloff and diagonal costs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum DistanceMode {
    /// Chebyshev distance; diagonals cost the same as orthogonals
    #[default]
    Roguelike = 0,
    /// Euclidean distance, rounded
    Trigonometric = 1,
}

impl DistanceMode {
    /// Integer distance between two points
    pub fn rl_dist(self, a: Tripoint, b: Tripoint) -> i32 {
        match self {
            DistanceMode::Roguelike => square_dist(a, b),
            DistanceMode::Trigonometric => trig_dist(a, b).round() as i32,
        }
    }

    pub const fn is_trig(self) -> bool {
        matches!(self, DistanceMode::Trigonometric)
    }
}

/// Chebyshev distance
pub fn square_dist(a: Tripoint, b: Tripoint) -> i32 {
    let d = a - b;
    d.x.abs().max(d.y.abs()).max(d.z.abs())
}

/// Euclidean distance
pub fn trig_dist(a: Tripoint, b: Tripoint) -> f32 {
    let d = a - b;
    ((d.x * d.x + d.y * d.y + d.z * d.z) as f32).sqrt()
}

/// Taxicab distance
pub fn manhattan_dist(a: Tripoint, b: Tripoint) -> i32 {
    let d = a - b;
    d.x.abs() + d.y.abs() + d.z.abs()
}

/// Adjacent squares that bring `from` closer to `to`, most direct first.
///
/// Up to five candidates are produced; a pure diagonal yields three. When the
/// levels differ, the straight vertical continuation is listed first.
pub fn squares_closer_to(from: Tripoint, to: Tripoint) -> Vec<Tripoint> {
    let d = to - from;
    let (ax, ay) = (d.x.abs(), d.y.abs());
    let (sx, sy) = (d.x.signum(), d.y.signum());
    let mut out = Vec::with_capacity(5);
    if d.z != 0 {
        out.push(Tripoint::new(from.x + sx, from.y + sy, from.z + d.z.signum()));
    }
    if ax > ay {
        out.push(from.offset(sx, 0, 0));
        out.push(from.offset(sx, 1, 0));
        out.push(from.offset(sx, -1, 0));
        if d.y != 0 {
            out.push(from.offset(0, sy, 0));
        }
    } else if ax < ay {
        out.push(from.offset(0, sy, 0));
        out.push(from.offset(1, sy, 0));
        out.push(from.offset(-1, sy, 0));
        if d.x != 0 {
            out.push(from.offset(sx, 0, 0));
        }
    } else if d.x != 0 {
        out.push(from.offset(sx, sy, 0));
        out.push(from.offset(sx, 0, 0));
        out.push(from.offset(0, sy, 0));
    }
    out
}
