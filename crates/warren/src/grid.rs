//! Dense grid storage with walkability and transparency flags.
//!
//! The [`GridMap`] is the authoritative record of which cells can be entered
//! and which cells light passes through. Field-of-view state is owned by the
//! map (one computation at a time) so visibility queries never need to name
//! the observer.
//!
//! # Out-of-bounds behavior
//!
//! Queries and mutations outside the map bounds are expected, frequent, and
//! ordinary: they return `false` and change nothing. Construction is the only
//! fallible operation.

use std::collections::HashSet;

use bitflags::bitflags;
use glam::IVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fov;
use crate::Rect;

bitflags! {
    /// Per-cell terrain flags.
    ///
    /// `WALKABLE` means a body may enter the cell; `TRANSPARENT` means sight
    /// lines pass through it. The two are independent: a window cell could be
    /// transparent but not walkable, a smoke cell walkable but not
    /// transparent.
    ///
    /// Serde impls come from the bitflags `serde` feature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        /// A body may occupy this cell.
        const WALKABLE = 0b01;
        /// Sight lines pass through this cell.
        const TRANSPARENT = 0b10;
    }
}

impl Default for CellFlags {
    fn default() -> Self {
        Self::WALKABLE | Self::TRANSPARENT
    }
}

/// Errors raised by grid construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Both dimensions must be at least one cell.
    #[error("grid dimensions must be nonzero (got {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Cached result of the most recent field-of-view computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FovState {
    pub(crate) origin: IVec2,
    pub(crate) radius: i32,
    pub(crate) light_walls: bool,
    pub(crate) visible: HashSet<IVec2>,
}

/// A dense rectangular grid of cells.
///
/// Cells are stored row-major. All coordinate-taking methods accept arbitrary
/// `IVec2` values; coordinates outside the map answer `false` rather than
/// panicking.
///
/// # Example
///
/// ```
/// use warren::GridMap;
/// use glam::IVec2;
///
/// let mut map = GridMap::new(8, 8).unwrap();
/// assert!(map.is_walkable(IVec2::new(3, 3)));
///
/// map.set_walkable(IVec2::new(3, 3), false);
/// assert!(!map.is_walkable(IVec2::new(3, 3)));
/// assert!(!map.is_walkable(IVec2::new(-1, 0))); // out of bounds
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<CellFlags>,
    fov: Option<FovState>,
}

impl GridMap {
    /// Creates a map of the given dimensions with every cell walkable and
    /// transparent.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ZeroDimension`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        #[allow(clippy::cast_possible_wrap)]
        let (width, height) = (width as i32, height as i32);
        #[allow(clippy::cast_sign_loss)]
        let len = (width * height) as usize;
        Ok(Self {
            width,
            height,
            cells: vec![CellFlags::default(); len],
            fov: None,
        })
    }

    /// Map width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Map height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// The rectangle covering the whole map.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Whether a coordinate lies on the map.
    #[must_use]
    pub const fn in_bounds(&self, p: IVec2) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    #[allow(clippy::cast_sign_loss)]
    const fn index(&self, p: IVec2) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Returns the flags of a cell, or `None` out of bounds.
    #[must_use]
    pub fn flags(&self, p: IVec2) -> Option<CellFlags> {
        self.in_bounds(p).then(|| self.cells[self.index(p)])
    }

    /// Whether a body may enter the cell. Out of bounds is never walkable.
    #[must_use]
    pub fn is_walkable(&self, p: IVec2) -> bool {
        self.flags(p).is_some_and(|f| f.contains(CellFlags::WALKABLE))
    }

    /// Whether sight lines pass through the cell. Out of bounds is opaque.
    #[must_use]
    pub fn is_transparent(&self, p: IVec2) -> bool {
        self.flags(p).is_some_and(|f| f.contains(CellFlags::TRANSPARENT))
    }

    /// Sets the walkable flag of a cell.
    ///
    /// Returns `false` (no state change) if the coordinate is out of bounds.
    pub fn set_walkable(&mut self, p: IVec2, walkable: bool) -> bool {
        if !self.in_bounds(p) {
            return false;
        }
        let idx = self.index(p);
        self.cells[idx].set(CellFlags::WALKABLE, walkable);
        true
    }

    /// Sets the transparent flag of a cell.
    ///
    /// Returns `false` (no state change) if the coordinate is out of bounds.
    pub fn set_transparent(&mut self, p: IVec2, transparent: bool) -> bool {
        if !self.in_bounds(p) {
            return false;
        }
        let idx = self.index(p);
        self.cells[idx].set(CellFlags::TRANSPARENT, transparent);
        true
    }

    /// Computes field of view from `origin` out to `radius` cells.
    ///
    /// The result replaces any previously stored FOV state. `light_walls`
    /// controls whether opaque cells on the edge of vision are themselves
    /// reported visible (walls lit by the observer) or excluded.
    pub fn compute_fov(&mut self, origin: IVec2, radius: i32, light_walls: bool) {
        let visible = fov::shadowcast(self, origin, radius.max(0), light_walls);
        tracing::trace!(
            origin = ?origin,
            radius,
            visible = visible.len(),
            "recomputed field of view"
        );
        self.fov = Some(FovState {
            origin,
            radius,
            light_walls,
            visible,
        });
    }

    /// Drops the stored FOV state; [`Self::is_in_fov`] then answers `false`.
    pub fn clear_fov(&mut self) {
        self.fov = None;
    }

    /// Whether a cell is visible in the most recent FOV computation.
    ///
    /// Always `false` when no FOV has been computed (or it was cleared).
    #[must_use]
    pub fn is_in_fov(&self, p: IVec2) -> bool {
        self.fov.as_ref().is_some_and(|state| state.visible.contains(&p))
    }

    /// Origin of the stored FOV state, if any.
    #[must_use]
    pub fn fov_origin(&self) -> Option<IVec2> {
        self.fov.as_ref().map(|state| state.origin)
    }

    /// Iterates all walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                let p = IVec2::new(x, y);
                self.is_walkable(p).then_some(p)
            })
        })
    }

    /// Picks a uniformly random walkable cell, optionally restricted to a
    /// sub-rectangle.
    ///
    /// Returns `None` when no walkable cell exists in the region. The caller
    /// supplies the generator so runs stay reproducible under a fixed seed.
    pub fn random_walkable<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        within: Option<Rect>,
    ) -> Option<IVec2> {
        let candidates: Vec<IVec2> = self
            .walkable_cells()
            .filter(|p| within.map_or(true, |rect| rect.contains(*p)))
            .collect();
        candidates.choose(rng).copied()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    mod construction_tests {
        use super::*;

        #[test]
        fn new_creates_open_map() {
            let map = GridMap::new(4, 3).unwrap();
            assert_eq!(map.width(), 4);
            assert_eq!(map.height(), 3);
            for y in 0..3 {
                for x in 0..4 {
                    let p = IVec2::new(x, y);
                    assert!(map.is_walkable(p));
                    assert!(map.is_transparent(p));
                }
            }
        }

        #[test]
        fn zero_dimension_is_rejected() {
            assert_eq!(
                GridMap::new(0, 5),
                Err(GridError::ZeroDimension { width: 0, height: 5 })
            );
            assert!(GridMap::new(5, 0).is_err());
        }
    }

    mod flag_tests {
        use super::*;

        #[test]
        fn set_walkable_toggles_cell() {
            let mut map = GridMap::new(5, 5).unwrap();
            let p = IVec2::new(2, 2);

            assert!(map.set_walkable(p, false));
            assert!(!map.is_walkable(p));
            assert!(map.is_transparent(p)); // independent flag

            assert!(map.set_walkable(p, true));
            assert!(map.is_walkable(p));
        }

        #[test]
        fn set_transparent_toggles_cell() {
            let mut map = GridMap::new(5, 5).unwrap();
            let p = IVec2::new(1, 3);

            assert!(map.set_transparent(p, false));
            assert!(!map.is_transparent(p));
            assert!(map.is_walkable(p));
        }

        #[test]
        fn out_of_bounds_queries_return_false() {
            let map = GridMap::new(5, 5).unwrap();
            assert!(!map.is_walkable(IVec2::new(-1, 0)));
            assert!(!map.is_walkable(IVec2::new(5, 0)));
            assert!(!map.is_transparent(IVec2::new(0, -1)));
            assert!(!map.is_transparent(IVec2::new(0, 5)));
            assert!(map.flags(IVec2::new(9, 9)).is_none());
        }

        #[test]
        fn out_of_bounds_mutation_is_rejected() {
            let mut map = GridMap::new(5, 5).unwrap();
            assert!(!map.set_walkable(IVec2::new(-1, 2), false));
            assert!(!map.set_transparent(IVec2::new(2, 7), false));
            // Nothing changed
            for p in map.walkable_cells() {
                assert!(map.is_transparent(p));
            }
        }
    }

    mod fov_tests {
        use super::*;

        #[test]
        fn no_fov_state_means_nothing_visible() {
            let map = GridMap::new(5, 5).unwrap();
            assert!(!map.is_in_fov(IVec2::new(2, 2)));
            assert!(map.fov_origin().is_none());
        }

        #[test]
        fn clear_fov_disables_queries() {
            let mut map = GridMap::new(5, 5).unwrap();
            map.compute_fov(IVec2::new(2, 2), 4, true);
            assert!(map.is_in_fov(IVec2::new(2, 2)));

            map.clear_fov();
            assert!(!map.is_in_fov(IVec2::new(2, 2)));
        }

        #[test]
        fn recompute_replaces_previous_state() {
            let mut map = GridMap::new(9, 9).unwrap();
            map.compute_fov(IVec2::new(0, 0), 2, true);
            assert!(map.is_in_fov(IVec2::new(1, 1)));
            assert!(!map.is_in_fov(IVec2::new(8, 8)));

            map.compute_fov(IVec2::new(8, 8), 2, true);
            assert!(map.is_in_fov(IVec2::new(7, 7)));
            assert!(!map.is_in_fov(IVec2::new(1, 1)));
            assert_eq!(map.fov_origin(), Some(IVec2::new(8, 8)));
        }
    }

    mod random_walkable_tests {
        use super::*;

        #[test]
        fn finds_only_walkable_cells() {
            let mut map = GridMap::new(4, 4).unwrap();
            // Block everything except (1, 1)
            for y in 0..4 {
                for x in 0..4 {
                    map.set_walkable(IVec2::new(x, y), false);
                }
            }
            map.set_walkable(IVec2::new(1, 1), true);

            let mut rng = ChaCha8Rng::seed_from_u64(7);
            assert_eq!(map.random_walkable(&mut rng, None), Some(IVec2::new(1, 1)));
        }

        #[test]
        fn fully_blocked_map_yields_none() {
            let mut map = GridMap::new(3, 3).unwrap();
            for y in 0..3 {
                for x in 0..3 {
                    map.set_walkable(IVec2::new(x, y), false);
                }
            }
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            assert_eq!(map.random_walkable(&mut rng, None), None);
        }

        #[test]
        fn respects_bounds_restriction() {
            let map = GridMap::new(10, 10).unwrap();
            let region = Rect::new(IVec2::new(5, 5), IVec2::new(7, 7));
            let mut rng = ChaCha8Rng::seed_from_u64(99);

            for _ in 0..32 {
                let p = map.random_walkable(&mut rng, Some(region)).unwrap();
                assert!(region.contains(p));
            }
        }

        #[test]
        fn same_seed_same_sample() {
            let map = GridMap::new(10, 10).unwrap();
            let mut rng1 = ChaCha8Rng::seed_from_u64(1234);
            let mut rng2 = ChaCha8Rng::seed_from_u64(1234);
            assert_eq!(
                map.random_walkable(&mut rng1, None),
                map.random_walkable(&mut rng2, None)
            );
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn random_walkable_always_returns_a_walkable_cell(
                seed in 0u64..1000,
                blocked in proptest::collection::vec((0..8i32, 0..8i32), 0..32),
            ) {
                let mut map = GridMap::new(8, 8).unwrap();
                for (x, y) in blocked {
                    let _ = map.set_walkable(IVec2::new(x, y), false);
                }

                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                if let Some(p) = map.random_walkable(&mut rng, None) {
                    prop_assert!(map.is_walkable(p));
                } else {
                    prop_assert_eq!(map.walkable_cells().count(), 0);
                }
            }
        }
    }

    mod serialization_tests {
        use super::*;

        #[test]
        fn grid_roundtrip_preserves_flags_and_fov() {
            let mut map = GridMap::new(6, 6).unwrap();
            map.set_walkable(IVec2::new(2, 2), false);
            map.set_transparent(IVec2::new(2, 2), false);
            map.compute_fov(IVec2::new(0, 0), 4, true);

            let json = serde_json::to_string(&map).unwrap();
            let restored: GridMap = serde_json::from_str(&json).unwrap();

            assert_eq!(map, restored);
            assert!(!restored.is_walkable(IVec2::new(2, 2)));
            assert!(restored.is_in_fov(IVec2::new(1, 1)));
        }
    }
}
