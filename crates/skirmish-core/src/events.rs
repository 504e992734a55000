//! Simulation events and the end-of-match summary.
//!
//! Events are facts about what happened, delivered synchronously: the
//! simulation collects every event raised during a tick, feeds the batch to
//! the objective tracker, then appends it to a host-drainable log. There are
//! no persistent subscriptions to leak — consumers either receive the batch
//! (tracker) or pull the log ([`crate::simulation::Simulation::drain_events`]).

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityTag, TeamId};
use crate::report::ObjectiveReport;

/// A lifecycle or domain event raised by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The simulation finished building its map, scene, and tracker.
    Initialized,
    /// The tick loop began.
    Started,
    /// The tick loop was suspended.
    Paused,
    /// The tick loop resumed after a pause.
    Resumed,
    /// The match ended; carries the final summary.
    Stopped(Box<StopSummary>),
    /// A tick finished.
    StepCompleted {
        /// The step counter after this tick.
        step: u64,
    },
    /// An entity entered the scene.
    EntityCreated {
        /// The new entity.
        entity: EntityId,
        /// Its classification.
        tag: EntityTag,
        /// Where it appeared.
        position: IVec2,
    },
    /// An entity changed cells.
    EntityMoved {
        /// The entity that moved.
        entity: EntityId,
        /// The vacated cell.
        from: IVec2,
        /// The entered cell.
        to: IVec2,
    },
    /// An entity left the scene.
    EntityDestroyed {
        /// The removed entity.
        entity: EntityId,
    },
    /// An agent took damage.
    AgentDamaged {
        /// The damaged agent.
        target: EntityId,
        /// The source of the damage, when attributable.
        attacker: Option<EntityId>,
        /// Health actually removed (after defense, floored at zero health).
        amount: i32,
        /// Health remaining after the hit.
        remaining: i32,
    },
    /// An agent died.
    ///
    /// The killer is the most recent attacker at the moment of death; the
    /// assists are the remaining distinct entries of the victim's
    /// recent-attacker record.
    AgentKilled {
        /// The agent that died.
        victim: EntityId,
        /// Credited with the kill, when any attacker was recorded.
        killer: Option<EntityId>,
        /// Credited with assists, most recent first.
        assists: Vec<EntityId>,
    },
}

impl SimEvent {
    /// The entity this event is primarily about, if any.
    #[must_use]
    pub fn primary_entity(&self) -> Option<EntityId> {
        match self {
            Self::EntityCreated { entity, .. }
            | Self::EntityMoved { entity, .. }
            | Self::EntityDestroyed { entity } => Some(*entity),
            Self::AgentDamaged { target, .. } => Some(*target),
            Self::AgentKilled { victim, .. } => Some(*victim),
            Self::Initialized
            | Self::Started
            | Self::Paused
            | Self::Resumed
            | Self::Stopped(_)
            | Self::StepCompleted { .. } => None,
        }
    }
}

/// Why the match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The objective tracker signaled completion.
    ObjectiveComplete,
    /// Fallback: no living agent remained.
    AllAgentsDead,
    /// An external caller stopped the match.
    Aborted,
}

/// A one-line record of an agent at the end of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    /// The agent's id.
    pub id: EntityId,
    /// Display name from configuration.
    pub name: String,
    /// Team affiliation.
    pub team: TeamId,
    /// Health at match end (zero for the defeated).
    pub health: i32,
}

/// The terminal summary carried by [`SimEvent::Stopped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSummary {
    /// Step counter when the match ended.
    pub step: u64,
    /// Why the match ended.
    pub reason: StopReason,
    /// Agents alive at match end.
    pub survivors: Vec<AgentSummary>,
    /// Agents defeated during the match, in death order.
    pub defeated: Vec<AgentSummary>,
    /// The objective tracker's final structured report.
    pub report: ObjectiveReport,
}
