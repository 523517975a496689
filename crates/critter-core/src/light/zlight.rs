//! Shadow-casting across z-levels
//!
//! Each segment sweeps a square frustum outward along one axis. The frustum
//! is tracked as a list of spans bounded by major and minor slopes; a change
//! of transparency splits the current span into up to four pieces. A tile
//! viewed from the side its floor faces is treated as solid.

use super::shadowcast::{Propagation, Slope};
use crate::consts::{LIGHT_TRANSPARENCY_OPEN_AIR, LIGHT_TRANSPARENCY_SOLID};
use crate::map::{DistanceMode, Tripoint};

/// Which way a 3D cast looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
    Both,
}

/// One level's view for a 3D cast
pub struct ZLevel<'a> {
    pub transparency: &'a [f32],
    pub floor: &'a [bool],
    pub output: &'a mut [f32],
}

/// A contiguous stack of levels starting at `min_z`
pub struct ZGrid<'a> {
    pub width: i32,
    pub height: i32,
    pub min_z: i32,
    pub levels: Vec<ZLevel<'a>>,
}

impl ZGrid<'_> {
    fn level_index(&self, z: i32) -> Option<usize> {
        let i = z - self.min_z;
        (i >= 0 && (i as usize) < self.levels.len()).then_some(i as usize)
    }

    fn tile_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((x * self.height + y) as usize)
        }
    }
}

/// Parameters for a 3D cast
#[derive(Debug, Clone, Copy)]
pub struct ZParams {
    pub numerator: f32,
    pub offset_distance: i32,
    pub radius: i32,
    pub mode: DistanceMode,
    /// Tiles on this level are skipped when writing output
    pub skip_origin_level: bool,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start_major: Slope,
    end_major: Slope,
    start_minor: Slope,
    end_minor: Slope,
    cumulative: f32,
    skip_first_row: bool,
    skip_first_column: bool,
}

impl Span {
    fn full() -> Self {
        Self {
            start_major: Slope::new(0, 1),
            end_major: Slope::new(1, 1),
            start_minor: Slope::new(0, 1),
            end_minor: Slope::new(1, 1),
            cumulative: LIGHT_TRANSPARENCY_OPEN_AIR,
            skip_first_row: false,
            skip_first_column: false,
        }
    }
}

/// Grid delta contributed by each sweep coordinate
#[derive(Debug, Clone, Copy)]
struct ZTransform {
    minor: Tripoint,
    major: Tripoint,
    depth: Tripoint,
}

impl ZTransform {
    const fn horizontal(xx: i32, xy: i32, yx: i32, yy: i32, z: i32) -> Self {
        Self {
            minor: Tripoint::new(xx, yx, 0),
            major: Tripoint::new(0, 0, z),
            depth: Tripoint::new(xy, yy, 0),
        }
    }

    const fn vertical(x: i32, y: i32, z: i32) -> Self {
        Self {
            minor: Tripoint::new(x, 0, 0),
            major: Tripoint::new(0, y, 0),
            depth: Tripoint::new(0, 0, z),
        }
    }

    fn delta(&self, minor: i32, major: i32, depth: i32) -> Tripoint {
        Tripoint::new(
            minor * self.minor.x + major * self.major.x + depth * self.depth.x,
            minor * self.minor.y + major * self.major.y + depth * self.depth.y,
            minor * self.minor.z + major * self.major.z + depth * self.depth.z,
        )
    }
}

const HORIZONTAL: [(i32, i32, i32, i32); 8] = [
    (0, 1, 1, 0),
    (1, 0, 0, 1),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
    (0, -1, -1, 0),
    (-1, 0, 0, -1),
];

const VERTICAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Cast every segment facing `dir`
pub fn cast_zlight<P: Propagation>(
    grid: &mut ZGrid<'_>,
    origin: Tripoint,
    params: &ZParams,
    dir: VerticalDirection,
) {
    let mut zs = Vec::with_capacity(2);
    if matches!(dir, VerticalDirection::Down | VerticalDirection::Both) {
        zs.push(-1);
    }
    if matches!(dir, VerticalDirection::Up | VerticalDirection::Both) {
        zs.push(1);
    }
    for z in zs {
        for (xx, xy, yx, yy) in HORIZONTAL {
            cast_segment::<P>(grid, origin, params, ZTransform::horizontal(xx, xy, yx, yy, z));
        }
        for (x, y) in VERTICAL {
            cast_segment::<P>(grid, origin, params, ZTransform::vertical(x, y, z));
        }
    }
}

/// Whether the row at `major` lies inside the grid along the major axis
fn major_in_bounds(grid: &ZGrid<'_>, origin: Tripoint, t: &ZTransform, major: i32) -> bool {
    if t.major.z != 0 {
        grid.level_index(origin.z + major * t.major.z).is_some()
    } else if t.major.y != 0 {
        let y = origin.y + major * t.major.y;
        y >= 0 && y < grid.height
    } else {
        let x = origin.x + major * t.major.x;
        x >= 0 && x < grid.width
    }
}

fn cast_segment<P: Propagation>(
    grid: &mut ZGrid<'_>,
    origin: Tripoint,
    params: &ZParams,
    t: ZTransform,
) {
    let radius = params.radius - params.offset_distance;
    let mut spans = vec![Span::full()];
    let mut new_start_minor = Slope::new(1, 1);
    let mut last_intensity = 0.0_f32;

    for distance in 1..=radius {
        if spans.is_empty() {
            break;
        }
        let mut current_transparency = 0.0_f32;
        let mut i = 0;
        while i < spans.len() {
            let mut started_block = false;
            for major in 0..=distance {
                let trailing_major = Slope::new(major * 2 - 1, distance * 2 + 1);
                let leading_major = Slope::new(major * 2 + 1, distance * 2 - 1);
                if !major_in_bounds(grid, origin, &t, major) {
                    continue;
                }
                if spans[i].start_major > leading_major {
                    continue;
                }
                // Do not rescan the row that split off this span
                if spans[i].skip_first_row && spans[i].start_major == leading_major {
                    continue;
                }
                if spans[i].end_major < trailing_major {
                    break;
                }

                let mut started_span = false;
                for minor in 0..=distance {
                    let delta = t.delta(minor, major, distance);
                    let current = origin + delta;
                    let trailing_minor = Slope::new(minor * 2 - 1, distance * 2 + 1);
                    let leading_minor = Slope::new(minor * 2 + 1, distance * 2 - 1);

                    let (Some(li), Some(ti)) =
                        (grid.level_index(current.z), grid.tile_index(current.x, current.y))
                    else {
                        continue;
                    };
                    if spans[i].start_minor > leading_minor {
                        continue;
                    }
                    if spans[i].skip_first_column && spans[i].start_minor == leading_minor {
                        continue;
                    }
                    if spans[i].end_minor < trailing_minor {
                        break;
                    }

                    let mut new_transparency = grid.levels[li].transparency[ti];
                    let floor_block = if current.z < origin.z {
                        grid.levels[li + 1].floor[ti]
                    } else if current.z > origin.z {
                        grid.levels[li].floor[ti]
                    } else {
                        false
                    };
                    if floor_block {
                        new_transparency = LIGHT_TRANSPARENCY_SOLID;
                    }

                    if !started_block {
                        started_block = true;
                        current_transparency = new_transparency;
                    }

                    let dist = params.mode.rl_dist(Tripoint::ZERO, delta) + params.offset_distance;
                    last_intensity = P::calc(params.numerator, spans[i].cumulative, dist);

                    let skip_write = params.skip_origin_level && current.z == origin.z;
                    if !floor_block && !skip_write {
                        let out = &mut grid.levels[li].output[ti];
                        if last_intensity > *out {
                            *out = last_intensity;
                        }
                    }

                    if !started_span {
                        new_start_minor = leading_minor;
                        started_span = true;
                    }

                    if new_transparency == current_transparency {
                        new_start_minor = leading_minor;
                        continue;
                    }

                    i = split_span::<P>(
                        &mut spans,
                        i,
                        SplitEdges {
                            trailing_major,
                            leading_major,
                            trailing_minor,
                            leading_minor,
                        },
                        &mut current_transparency,
                        new_transparency,
                        last_intensity,
                        distance,
                        &mut new_start_minor,
                    );
                }

                // A row ending opaque need not be revisited
                if !P::check(current_transparency, last_intensity) {
                    spans[i].start_major = leading_major;
                }
            }

            if !started_block || !P::check(current_transparency, last_intensity) {
                spans.remove(i);
            } else {
                spans[i].cumulative =
                    P::accumulate(spans[i].cumulative, current_transparency, distance);
                i += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitEdges {
    trailing_major: Slope,
    leading_major: Slope,
    trailing_minor: Slope,
    leading_minor: Slope,
}

/// Split the span at `i` where transparency changes; returns the span's new index.
///
/// Viewed from the origin the span divides into: rows already finished (A),
/// tiles already scanned on this row (B), the rest of this row (C, kept as the
/// current span) and rows not yet reached (D).
#[allow(clippy::too_many_arguments)]
fn split_span<P: Propagation>(
    spans: &mut Vec<Span>,
    mut i: usize,
    edges: SplitEdges,
    current_transparency: &mut f32,
    new_transparency: f32,
    last_intensity: f32,
    distance: i32,
    new_start_minor: &mut Slope,
) -> usize {
    let this = spans[i];
    let next_cumulative = P::accumulate(this.cumulative, *current_transparency, distance);
    let was_open = P::check(*current_transparency, last_intensity);

    if was_open {
        if edges.trailing_major > this.start_major {
            spans.insert(
                i,
                Span {
                    start_major: this.start_major,
                    end_major: edges.trailing_major,
                    start_minor: this.start_minor,
                    end_minor: this.end_minor,
                    cumulative: next_cumulative,
                    skip_first_row: false,
                    skip_first_column: this.skip_first_column,
                },
            );
            i += 1;
        }
        if edges.trailing_minor > this.start_minor {
            spans.insert(
                i,
                Span {
                    start_major: this.start_major.max(edges.trailing_major),
                    end_major: this.end_major.min(edges.leading_major),
                    start_minor: this.start_minor,
                    end_minor: edges.trailing_minor,
                    cumulative: next_cumulative,
                    skip_first_row: false,
                    skip_first_column: this.skip_first_column,
                },
            );
            i += 1;
        }
        *new_start_minor = edges.trailing_minor;
    }

    if edges.leading_major < this.end_major {
        spans.insert(
            i + 1,
            Span {
                start_major: edges.leading_major,
                end_major: this.end_major,
                start_minor: this.start_minor,
                end_minor: this.end_minor,
                cumulative: this.cumulative,
                skip_first_row: true,
                skip_first_column: this.skip_first_column,
            },
        );
    }

    let span = &mut spans[i];
    span.skip_first_column = was_open && P::check(new_transparency, last_intensity);
    span.start_major = span.start_major.max(edges.trailing_major);
    span.end_major = span.end_major.min(edges.leading_major);
    span.start_minor = *new_start_minor;

    *new_start_minor = edges.leading_minor;
    *current_transparency = new_transparency;
    i
}
