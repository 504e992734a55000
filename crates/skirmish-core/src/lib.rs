//! # Skirmish Core
//!
//! Deterministic, tick-based arena-combat simulation engine.
//!
//! The core owns entity lifecycle, a grid map with walkability and
//! field-of-view, weapon and projectile combat, and a family of pluggable
//! objective trackers that decide when and how a match ends. Configuration
//! loading, rendering, and result formatting are external collaborators that
//! talk to the core through [`config`] records, [`events`], and [`report`]s.
//!
//! ## Architecture
//!
//! - **[`warren`]** (re-exported): the grid spatial substrate — cell flags
//!   and shadowcast FOV
//! - **[`entity`]** / **[`scene`]**: id-keyed entities in a deterministic
//!   registry
//! - **[`map`]**: the single mutation point for movement and occupancy
//! - **[`combat`]**: damage, melee strikes, bullet flight
//! - **[`brain`]**: per-tick decision makers (human input stand-in, AI)
//! - **[`objective`]**: win-condition state machines
//! - **[`simulation`]**: the orchestrator driving the tick loop
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::config::{AgentConfig, MapConfig, MatchConfig, RunMode};
//! use skirmish_core::entity::TeamId;
//! use skirmish_core::objective::ObjectiveSpec;
//! use skirmish_core::Simulation;
//!
//! let config = MatchConfig {
//!     seed: 42,
//!     map: MapConfig::open(10, 10),
//!     agents: vec![
//!         AgentConfig::new("alpha", TeamId::new(0)),
//!         AgentConfig::new("bravo", TeamId::new(1)),
//!     ],
//!     objective: ObjectiveSpec::steps(5),
//!     mode: RunMode::Offline,
//! };
//!
//! let mut sim = Simulation::from_config(&config)?;
//! sim.start()?;
//! assert_eq!(sim.summary().unwrap().step, 5);
//! # Ok::<(), skirmish_core::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export the spatial substrate for direct grid access
pub use warren;

pub mod brain;
pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod map;
pub mod objective;
pub mod report;
pub mod scene;
pub mod simulation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use error::SimError;
pub use events::{SimEvent, StopReason, StopSummary};
pub use simulation::{SimState, Simulation, NOMINAL_DT};
