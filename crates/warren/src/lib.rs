//! # Warren
//!
//! Grid spatial substrate for walkability, occupancy, and field-of-view
//! queries.
//!
//! Warren represents an arena as a dense rectangular grid of cells, each
//! carrying a walkable and a transparent flag. Occupancy is expressed through
//! the walkability layer: a cell holding a body is simply not walkable until
//! it is vacated. Visibility is computed with recursive shadowcasting over
//! the transparency layer and cached as a single field-of-view state per map.
//!
//! ## Quick Start
//!
//! ```
//! use warren::GridMap;
//! use glam::IVec2;
//!
//! let mut map = GridMap::new(10, 10).unwrap();
//!
//! // Raise a wall segment
//! map.set_walkable(IVec2::new(5, 4), false);
//! map.set_transparent(IVec2::new(5, 4), false);
//!
//! // Compute visibility from (2, 4) with radius 8
//! map.compute_fov(IVec2::new(2, 4), 8, true);
//! assert!(map.is_in_fov(IVec2::new(4, 4)));
//! assert!(!map.is_in_fov(IVec2::new(7, 4))); // behind the wall
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fov;
pub mod grid;

// Re-exports for convenience
pub use grid::{CellFlags, GridError, GridMap};

/// Axis-aligned rectangle of grid cells.
///
/// `min` is inclusive and `max` is exclusive, so a `Rect` from `(0, 0)` to
/// `(10, 10)` covers exactly the cells of a 10x10 map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Minimum corner (inclusive).
    pub min: glam::IVec2,
    /// Maximum corner (exclusive).
    pub max: glam::IVec2,
}

impl Rect {
    /// Create a rectangle from min/max corners.
    #[must_use]
    pub const fn new(min: glam::IVec2, max: glam::IVec2) -> Self {
        Self { min, max }
    }

    /// Create a rectangle covering `width` x `height` cells from the origin.
    #[must_use]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self {
            min: glam::IVec2::new(0, 0),
            max: glam::IVec2::new(width, height),
        }
    }

    /// Check whether a cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: glam::IVec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}
