//! Recursive shadowcasting over the transparency layer.
//!
//! The algorithm sweeps eight octants from the origin, tracking the slopes of
//! shadows cast by opaque cells. Each octant is scanned row by row; when an
//! opaque cell is met, a child scan continues the unobstructed slice and the
//! parent narrows its sweep to the far side of the obstruction.
//!
//! Visibility is radius-limited with a Euclidean check, so the lit area is a
//! disc rather than a square. Slope arithmetic uses `f32` with the same
//! operation sequence on every run, which keeps results identical across
//! platforms for a given map.

use std::collections::HashSet;

use glam::IVec2;

use crate::grid::GridMap;

/// Octant transforms: (xx, xy, yx, yy) per octant.
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// Computes the set of cells visible from `origin` within `radius`.
///
/// The origin itself is always visible. When `light_walls` is `false`,
/// opaque cells are excluded from the result even where sight reaches them.
pub(crate) fn shadowcast(
    grid: &GridMap,
    origin: IVec2,
    radius: i32,
    light_walls: bool,
) -> HashSet<IVec2> {
    let mut visible = HashSet::new();
    if grid.in_bounds(origin) {
        visible.insert(origin);
    }
    for &(xx, xy, yx, yy) in &OCTANTS {
        cast_octant(
            grid,
            &mut visible,
            origin,
            radius,
            light_walls,
            1,
            1.0,
            0.0,
            xx,
            xy,
            yx,
            yy,
        );
    }
    visible
}

/// Scans one octant between the `start` and `end` slopes.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::cast_precision_loss)]
fn cast_octant(
    grid: &GridMap,
    visible: &mut HashSet<IVec2>,
    origin: IVec2,
    radius: i32,
    light_walls: bool,
    row: i32,
    mut start: f32,
    end: f32,
    xx: i32,
    xy: i32,
    yx: i32,
    yy: i32,
) {
    if start < end {
        return;
    }
    let radius_sq = radius * radius;
    let mut new_start = 0.0_f32;
    let mut blocked = false;

    let mut depth = row;
    while depth <= radius && !blocked {
        let dy = -depth;
        for dx in -depth..=0 {
            let cur = IVec2::new(origin.x + dx * xx + dy * xy, origin.y + dx * yx + dy * yy);
            let left_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
            let right_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);

            if start < right_slope {
                continue;
            }
            if end > left_slope {
                break;
            }

            let opaque = !grid.in_bounds(cur) || !grid.is_transparent(cur);

            if dx * dx + dy * dy <= radius_sq && grid.in_bounds(cur) && (light_walls || !opaque) {
                visible.insert(cur);
            }

            if blocked {
                if opaque {
                    new_start = right_slope;
                } else {
                    blocked = false;
                    start = new_start;
                }
            } else if opaque && depth < radius {
                blocked = true;
                cast_octant(
                    grid,
                    visible,
                    origin,
                    radius,
                    light_walls,
                    depth + 1,
                    start,
                    left_slope,
                    xx,
                    xy,
                    yx,
                    yy,
                );
                new_start = right_slope;
            }
        }
        depth += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
