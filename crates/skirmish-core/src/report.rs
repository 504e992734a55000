//! Structured match reports for external result formatting.
//!
//! Objective trackers expose their final state as an [`ObjectiveReport`]: an
//! opaque, serializable record the host's result-formatting collaborator can
//! consume. The [`ReportBuilder`] visitor lets that collaborator render or
//! serialize the data without the core depending on any output format.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, KdaCounters, TeamId};

/// Per-agent entry in a match report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReport {
    /// The agent's id.
    pub id: EntityId,
    /// Display name from configuration.
    pub name: String,
    /// Final kill/death/assist counters.
    pub kda: KdaCounters,
}

/// Per-team entry in a match report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamReport {
    /// The team's id.
    pub team: TeamId,
    /// Aggregate counters over all members.
    pub kda: KdaCounters,
    /// Member entries in id order.
    pub members: Vec<MemberReport>,
}

/// The structured data an objective tracker hands to the result builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveReport {
    /// Report of a steps-limited run.
    Steps {
        /// Steps taken so far.
        steps: u64,
        /// Configured step limit.
        max_steps: u64,
    },
    /// Report of a team match (deathmatch, capture point, defend).
    Match {
        /// The winning team, if the match produced one.
        winner: Option<TeamId>,
        /// Per-team rosters with aggregate and per-member counters.
        teams: Vec<TeamReport>,
    },
}

impl ObjectiveReport {
    /// Feeds this report through a builder.
    ///
    /// The builder selection hook: the caller picks the builder, the report
    /// picks which method to invoke.
    pub fn build_with(&self, builder: &mut dyn ReportBuilder) {
        match self {
            Self::Steps { steps, max_steps } => builder.steps(*steps, *max_steps),
            Self::Match { winner, teams } => builder.match_result(*winner, teams),
        }
    }
}

/// Visitor implemented by result-formatting collaborators.
///
/// The core never renders; it calls exactly one of these methods with the
/// final structured data.
pub trait ReportBuilder {
    /// Receives the result of a steps-limited run.
    fn steps(&mut self, steps: u64, max_steps: u64);

    /// Receives the result of a team match.
    fn match_result(&mut self, winner: Option<TeamId>, teams: &[TeamReport]);
}
