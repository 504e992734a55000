//! Objective tracking: the state machines that decide when a match ends.
//!
//! An [`ObjectiveSpec`] is a flat tagged descriptor — a kind plus the
//! superset of kind-specific fields — that external configuration produces.
//! [`ObjectiveSpec::into_tracker`] is the single dispatch point mapping kind
//! to a concrete tracker.
//!
//! Trackers implement [`ObjectiveTracker`]: they consume simulation events,
//! advance their own timers, signal when the match should stop, and produce
//! the structured report the result-formatting collaborator consumes.
//!
//! # Clamping
//!
//! Team and player counts are gameplay tunables, not structural parameters:
//! out-of-range values are clamped to the nearest valid value instead of
//! rejected. Clamping runs in the constructors and again inside
//! [`ObjectiveSpec::into_tracker`], because deserialization can bypass the
//! constructors entirely.

mod capture;
mod deathmatch;
mod defend;
mod steps;

pub use capture::CapturePointTracker;
pub use deathmatch::DeathmatchTracker;
pub use defend::DefendTracker;
pub use steps::StepsTracker;

pub(crate) use deathmatch::MatchCore;

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, TeamId};
use crate::events::SimEvent;
use crate::report::ObjectiveReport;
use crate::scene::Scene;

/// Minimum number of teams for team-based objectives.
pub const MIN_TEAMS: u32 = 2;

/// Minimum players per team for team-based objectives.
pub const MIN_PLAYERS_PER_TEAM: u32 = 1;

/// Defend is hard-pinned to exactly two sides.
pub const DEFEND_TEAMS: u32 = 2;

/// One agent entry used to seed a tracker's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSeed {
    /// The agent's id in the scene.
    pub id: EntityId,
    /// Display name from configuration.
    pub name: String,
    /// Team affiliation.
    pub team: TeamId,
}

/// Objective kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// End after a fixed number of steps.
    Steps,
    /// Last team standing wins.
    Deathmatch,
    /// Deathmatch plus a point that can be captured for the win.
    CapturePoint,
    /// Two-sided defense with a match timer and an objective health pool.
    Defend,
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Steps => write!(f, "Steps"),
            Self::Deathmatch => write!(f, "Deathmatch"),
            Self::CapturePoint => write!(f, "CapturePoint"),
            Self::Defend => write!(f, "Defend"),
        }
    }
}

/// Flat objective descriptor: a kind plus the superset of per-kind fields.
///
/// Unused fields keep their defaults and are ignored by the chosen tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    /// Which tracker to build.
    pub kind: ObjectiveKind,
    /// Steps: the step limit.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Team-based kinds: number of teams.
    #[serde(default = "default_teams")]
    pub teams: u32,
    /// Team-based kinds: players per team.
    #[serde(default = "default_players_per_team")]
    pub players_per_team: u32,
    /// CapturePoint: the cell to hold.
    #[serde(default)]
    pub capture_point: IVec2,
    /// CapturePoint: hold radius in cells.
    #[serde(default = "default_capture_radius")]
    pub capture_radius: i32,
    /// CapturePoint: uncontested seconds required for the capture.
    #[serde(default = "default_capture_time")]
    pub capture_time: f32,
    /// Defend: match length in seconds; expiry is a defender win.
    #[serde(default = "default_match_time")]
    pub match_time: f32,
    /// Defend: cumulative damage the defenders may absorb before the
    /// attackers win.
    #[serde(default = "default_objective_health")]
    pub objective_health: i32,
}

const fn default_max_steps() -> u64 {
    1000
}
const fn default_teams() -> u32 {
    MIN_TEAMS
}
const fn default_players_per_team() -> u32 {
    MIN_PLAYERS_PER_TEAM
}
const fn default_capture_radius() -> i32 {
    2
}
const fn default_capture_time() -> f32 {
    10.0
}
const fn default_match_time() -> f32 {
    120.0
}
const fn default_objective_health() -> i32 {
    100
}

impl ObjectiveSpec {
    fn base(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            max_steps: default_max_steps(),
            teams: default_teams(),
            players_per_team: default_players_per_team(),
            capture_point: IVec2::ZERO,
            capture_radius: default_capture_radius(),
            capture_time: default_capture_time(),
            match_time: default_match_time(),
            objective_health: default_objective_health(),
        }
    }

    /// A steps-limited run.
    #[must_use]
    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps,
            ..Self::base(ObjectiveKind::Steps)
        }
        .clamped()
    }

    /// A team deathmatch.
    #[must_use]
    pub fn deathmatch(teams: u32, players_per_team: u32) -> Self {
        Self {
            teams,
            players_per_team,
            ..Self::base(ObjectiveKind::Deathmatch)
        }
        .clamped()
    }

    /// A capture-point match.
    #[must_use]
    pub fn capture_point(
        teams: u32,
        players_per_team: u32,
        point: IVec2,
        radius: i32,
        capture_time: f32,
    ) -> Self {
        Self {
            teams,
            players_per_team,
            capture_point: point,
            capture_radius: radius,
            capture_time,
            ..Self::base(ObjectiveKind::CapturePoint)
        }
        .clamped()
    }

    /// A defend match. Always exactly two sides.
    #[must_use]
    pub fn defend(players_per_team: u32, match_time: f32, objective_health: i32) -> Self {
        Self {
            players_per_team,
            match_time,
            objective_health,
            ..Self::base(ObjectiveKind::Defend)
        }
        .clamped()
    }

    /// Clamps all numeric tunables to their valid ranges.
    ///
    /// Runs in every constructor and again in [`Self::into_tracker`];
    /// deserialized specs get the same treatment as constructed ones.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.max_steps = self.max_steps.max(1);
        self.teams = self.teams.max(MIN_TEAMS);
        if self.kind == ObjectiveKind::Defend {
            self.teams = DEFEND_TEAMS;
        }
        self.players_per_team = self.players_per_team.max(MIN_PLAYERS_PER_TEAM);
        self.capture_radius = self.capture_radius.max(1);
        self.capture_time = self.capture_time.max(0.0);
        self.match_time = self.match_time.max(0.0);
        self.objective_health = self.objective_health.max(1);
        self
    }

    /// Builds the concrete tracker for this descriptor.
    ///
    /// The single dispatch point from kind to tracker. The roster seeds
    /// team-based trackers with the spawned agents.
    #[must_use]
    pub fn into_tracker(&self, roster: &[AgentSeed]) -> Box<dyn ObjectiveTracker> {
        let spec = self.clone().clamped();
        match spec.kind {
            ObjectiveKind::Steps => Box::new(StepsTracker::new(spec.max_steps)),
            ObjectiveKind::Deathmatch => Box::new(DeathmatchTracker::new(roster)),
            ObjectiveKind::CapturePoint => Box::new(CapturePointTracker::new(
                roster,
                spec.capture_point,
                spec.capture_radius,
                spec.capture_time,
            )),
            ObjectiveKind::Defend => Box::new(DefendTracker::new(
                roster,
                spec.match_time,
                spec.objective_health,
            )),
        }
    }
}

/// The state machine deciding when and why a match ends.
///
/// The simulation feeds every event of a tick through [`observe`], then
/// calls [`update`] once, then checks [`should_stop`]. KDA mutation happens
/// inside `observe` — on the tracker's roster and mirrored onto the scene's
/// agents — keeping combat mechanics free of win-condition bookkeeping.
///
/// [`observe`]: ObjectiveTracker::observe
/// [`update`]: ObjectiveTracker::update
/// [`should_stop`]: ObjectiveTracker::should_stop
pub trait ObjectiveTracker: fmt::Debug {
    /// Consumes one simulation event.
    fn observe(&mut self, event: &SimEvent, scene: &mut Scene);

    /// Advances timers and position-dependent progress.
    fn update(&mut self, dt: f32, scene: &Scene);

    /// Whether the match should end now.
    fn should_stop(&self) -> bool;

    /// The structured report for the result-formatting collaborator.
    fn report(&self) -> ObjectiveReport;
}

// =============================================================================
// Tests
// =============================================================================
