//! Error types for the simulation core.
//!
//! Only precondition violations surface as errors: null-equivalent arguments,
//! acting on an already-owned weapon, impossible starting configurations.
//! Expected failures (blocked movement, missed attacks) are ordinary `bool`
//! results, and malformed numeric gameplay parameters are clamped rather than
//! rejected.

use glam::IVec2;
use thiserror::Error;

use crate::entity::EntityId;
use crate::simulation::SimState;

/// Errors raised by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An operation that requires an initialized simulation was called first.
    #[error("simulation has not been initialized")]
    NotInitialized,

    /// An operation was attempted from a state that does not allow it.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the simulation was in.
        state: SimState,
    },

    /// An entity id was passed that is not registered in the scene.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// A weapon can be equipped exactly once.
    #[error("weapon is already owned by entity {owner}")]
    WeaponAlreadyOwned {
        /// The entity that already owns the weapon.
        owner: EntityId,
    },

    /// A match needs at least one agent.
    #[error("agent roster is empty")]
    EmptyRoster,

    /// A fixed starting position is off the map or not walkable.
    #[error("agent {name:?} cannot start at {position:?}")]
    InvalidStart {
        /// Name of the agent from configuration.
        name: String,
        /// The rejected starting position.
        position: IVec2,
    },

    /// No walkable cell was left for a randomly placed agent.
    #[error("no walkable cell available for random placement")]
    NoRoomToSpawn,

    /// Map construction failed.
    #[error(transparent)]
    Grid(#[from] warren::GridError),
}
