//! Entity-mediated wrapper around the grid substrate.
//!
//! [`ArenaMap`] owns the [`warren::GridMap`] and is the single mutation point
//! for entity movement: every move is validated against walkability, flips
//! occupancy, writes the entity position, and keeps the field-of-view state
//! coherent. Nothing else in the crate writes an agent's position.
//!
//! # Occupancy
//!
//! Only agents occupy cells. A cell holding a living agent is not walkable by
//! anyone else; vacating (moving away or dying) restores walkability. Bullets
//! pass over walkable cells without claiming them.
//!
//! # Focus
//!
//! FOV state is per-map with one focus entity at a time. Setting the focus to
//! `None` disables visibility queries entirely — they answer `false`.

use glam::IVec2;
use rand::Rng;
use warren::{GridMap, Rect};

use crate::config::MapConfig;
use crate::entity::EntityId;
use crate::error::SimError;
use crate::scene::Scene;

/// The arena grid plus FOV focus bookkeeping.
#[derive(Debug, Clone)]
pub struct ArenaMap {
    grid: GridMap,
    focus: Option<EntityId>,
}

impl ArenaMap {
    /// Wraps an existing grid.
    #[must_use]
    pub const fn new(grid: GridMap) -> Self {
        Self { grid, focus: None }
    }

    /// Builds the arena from a map configuration.
    ///
    /// Wall cells become non-walkable and opaque. Wall coordinates outside
    /// the map are ignored, matching the ordinary-failure contract for
    /// out-of-range positions.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured dimensions are zero.
    pub fn from_config(config: &MapConfig) -> Result<Self, SimError> {
        let mut grid = GridMap::new(config.width, config.height)?;
        for wall in &config.walls {
            let _ = grid.set_walkable(*wall, false);
            let _ = grid.set_transparent(*wall, false);
        }
        Ok(Self::new(grid))
    }

    /// Read access to the underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// Whether a coordinate lies on the map.
    #[must_use]
    pub const fn in_bounds(&self, p: IVec2) -> bool {
        self.grid.in_bounds(p)
    }

    /// Whether a body may enter the cell.
    #[must_use]
    pub fn is_walkable(&self, p: IVec2) -> bool {
        self.grid.is_walkable(p)
    }

    /// Whether sight lines pass through the cell.
    #[must_use]
    pub fn is_transparent(&self, p: IVec2) -> bool {
        self.grid.is_transparent(p)
    }

    /// Sets the walkable flag of a cell; `false` out of bounds.
    pub fn set_walkable(&mut self, p: IVec2, walkable: bool) -> bool {
        self.grid.set_walkable(p, walkable)
    }

    /// Sets the transparent flag of a cell; `false` out of bounds.
    pub fn set_transparent(&mut self, p: IVec2, transparent: bool) -> bool {
        self.grid.set_transparent(p, transparent)
    }

    /// Marks a cell as occupied (non-walkable).
    pub fn occupy(&mut self, p: IVec2) -> bool {
        self.grid.set_walkable(p, false)
    }

    /// Restores walkability at a vacated cell.
    pub fn vacate(&mut self, p: IVec2) -> bool {
        self.grid.set_walkable(p, true)
    }

    /// Whether a cell is visible to the current focus entity.
    ///
    /// Always `false` while no entity is focused.
    #[must_use]
    pub fn is_in_fov(&self, p: IVec2) -> bool {
        self.focus.is_some() && self.grid.is_in_fov(p)
    }

    /// The entity whose FOV is currently stored, if any.
    #[must_use]
    pub const fn focus(&self) -> Option<EntityId> {
        self.focus
    }

    /// Switches the FOV focus.
    ///
    /// With `Some(id)`, recomputes visibility from that agent's position and
    /// awareness radius; returns `false` (and clears the focus) if the id is
    /// not a living agent. With `None`, drops the FOV state so visibility
    /// queries answer `false`.
    pub fn set_focus(&mut self, scene: &Scene, focus: Option<EntityId>, light_walls: bool) -> bool {
        match focus {
            Some(id) => match scene.agent(id) {
                Some(agent) => {
                    self.grid.compute_fov(agent.position, agent.awareness, light_walls);
                    self.focus = Some(id);
                    true
                }
                None => {
                    self.grid.clear_fov();
                    self.focus = None;
                    false
                }
            },
            None => {
                self.grid.clear_fov();
                self.focus = None;
                true
            }
        }
    }

    /// Focuses an agent and recomputes FOV from its position and awareness
    /// radius. Shorthand for [`Self::set_focus`] with `Some(id)`.
    pub fn compute_fov_for(&mut self, scene: &Scene, id: EntityId, light_walls: bool) -> bool {
        self.set_focus(scene, Some(id), light_walls)
    }

    /// Moves an entity to a target cell. The single mutation point for
    /// movement.
    ///
    /// The move is rejected (`Ok(false)`, no state change) when the target
    /// cell is out of bounds or not walkable. On success the vacated cell
    /// becomes walkable again, the destination is claimed, the position is
    /// written, and — when the moved entity is the current FOV focus — the
    /// FOV is recomputed from the new position.
    ///
    /// Only agents claim walkability; bullets are advanced directly by the
    /// simulation and never pass through here.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownEntity`] if `id` is not in the scene.
    pub fn move_entity(
        &mut self,
        scene: &mut Scene,
        id: EntityId,
        to: IVec2,
    ) -> Result<bool, SimError> {
        let Some(entity) = scene.get_mut(id) else {
            return Err(SimError::UnknownEntity(id));
        };
        if !self.grid.is_walkable(to) {
            return Ok(false);
        }

        let from = entity.position();
        let is_agent = entity.is_agent();
        entity.set_position(to);

        if is_agent {
            let _ = self.grid.set_walkable(from, true);
            let _ = self.grid.set_walkable(to, false);
        }

        if self.focus == Some(id) {
            let _ = self.set_focus(scene, Some(id), true);
        }

        tracing::trace!(entity = %id, ?from, ?to, "entity moved");
        Ok(true)
    }

    /// Picks a uniformly random walkable cell via the supplied generator.
    pub fn random_walkable<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        within: Option<Rect>,
    ) -> Option<IVec2> {
        self.grid.random_walkable(rng, within)
    }
}

// =============================================================================
// Tests
// =============================================================================
