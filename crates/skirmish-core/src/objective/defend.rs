//! Defend objective: two sides, a match timer, and an objective health pool.
//!
//! The defending side is the lower team id, the attacking side the higher.
//! Attackers win by breaching the objective — pushing the defenders'
//! cumulative damage taken past the configured pool — or by elimination;
//! defenders win by running out the clock or by elimination.

use std::collections::BTreeSet;

use crate::entity::{EntityId, TeamId};
use crate::events::SimEvent;
use crate::report::ObjectiveReport;
use crate::scene::Scene;

use super::{AgentSeed, MatchCore, ObjectiveTracker};

/// Two-sided defense with a timer and an objective health threshold.
#[derive(Debug, Clone)]
pub struct DefendTracker {
    core: MatchCore,
    defenders: Option<TeamId>,
    attackers: Option<TeamId>,
    defender_ids: BTreeSet<EntityId>,
    match_time: f32,
    elapsed: f32,
    objective_health: i32,
    damage_taken: i32,
    outcome: Option<TeamId>,
}

impl DefendTracker {
    /// Creates the tracker. The roster's two lowest team ids become the
    /// defending and attacking sides respectively.
    #[must_use]
    pub fn new(roster: &[AgentSeed], match_time: f32, objective_health: i32) -> Self {
        let teams: BTreeSet<TeamId> = roster.iter().map(|seed| seed.team).collect();
        let mut teams = teams.into_iter();
        let defenders = teams.next();
        let attackers = teams.next();

        let defender_ids = roster
            .iter()
            .filter(|seed| Some(seed.team) == defenders)
            .map(|seed| seed.id)
            .collect();

        Self {
            core: MatchCore::from_roster(roster),
            defenders,
            attackers,
            defender_ids,
            match_time: match_time.max(0.0),
            elapsed: 0.0,
            objective_health: objective_health.max(1),
            damage_taken: 0,
            outcome: None,
        }
    }

    /// The defending side.
    #[must_use]
    pub const fn defenders(&self) -> Option<TeamId> {
        self.defenders
    }

    /// Cumulative damage absorbed by the defenders.
    #[must_use]
    pub const fn damage_taken(&self) -> i32 {
        self.damage_taken
    }

    /// Match time remaining, floored at zero.
    #[must_use]
    pub fn time_remaining(&self) -> f32 {
        (self.match_time - self.elapsed).max(0.0)
    }
}

impl ObjectiveTracker for DefendTracker {
    fn observe(&mut self, event: &SimEvent, scene: &mut Scene) {
        self.core.observe(event, scene);

        if self.outcome.is_some() {
            return;
        }
        if let SimEvent::AgentDamaged { target, amount, .. } = event {
            if self.defender_ids.contains(target) {
                self.damage_taken += (*amount).max(0);
                if self.damage_taken >= self.objective_health {
                    self.outcome = self.attackers;
                    tracing::info!(damage = self.damage_taken, "objective breached");
                }
            }
        }
    }

    fn update(&mut self, dt: f32, _scene: &Scene) {
        if self.outcome.is_some() {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.match_time {
            self.outcome = self.defenders;
            tracing::info!("match timer expired, defenders hold");
        }
    }

    fn should_stop(&self) -> bool {
        self.outcome.is_some() || self.core.eliminated_to_one()
    }

    fn report(&self) -> ObjectiveReport {
        ObjectiveReport::Match {
            winner: self.outcome.or_else(|| self.core.elimination_winner()),
            teams: self.core.team_reports(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
