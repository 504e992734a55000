//! Capture-point objective: hold the point, uncontested, long enough to win.
//!
//! Extends the deathmatch rules by composition: elimination still ends the
//! match, but a full capture ends it first, with the capturing team as the
//! winner regardless of the body count.

use std::collections::BTreeSet;

use glam::IVec2;

use crate::entity::TeamId;
use crate::events::SimEvent;
use crate::report::ObjectiveReport;
use crate::scene::Scene;

use super::{AgentSeed, MatchCore, ObjectiveTracker};

/// Deathmatch plus a capturable point.
#[derive(Debug, Clone)]
pub struct CapturePointTracker {
    core: MatchCore,
    point: IVec2,
    radius: i32,
    required: f32,
    progress: f32,
    holder: Option<TeamId>,
    captured: Option<TeamId>,
}

impl CapturePointTracker {
    /// Creates the tracker.
    ///
    /// `radius` is the hold radius in cells; `capture_time` the uncontested
    /// seconds required for a full capture.
    #[must_use]
    pub fn new(roster: &[AgentSeed], point: IVec2, radius: i32, capture_time: f32) -> Self {
        Self {
            core: MatchCore::from_roster(roster),
            point,
            radius: radius.max(1),
            required: capture_time.max(0.0),
            progress: 0.0,
            holder: None,
            captured: None,
        }
    }

    /// Capture progress in seconds of uncontested hold.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// The team currently holding the point uncontested, if any.
    #[must_use]
    pub const fn holder(&self) -> Option<TeamId> {
        self.holder
    }

    /// Teams with a living agent inside the capture radius.
    fn occupying_teams(&self, scene: &Scene) -> BTreeSet<TeamId> {
        scene
            .living_agents()
            .filter(|(_, agent)| {
                let d = agent.position - self.point;
                d.x * d.x + d.y * d.y <= self.radius * self.radius
            })
            .map(|(_, agent)| agent.team)
            .collect()
    }
}

impl ObjectiveTracker for CapturePointTracker {
    fn observe(&mut self, event: &SimEvent, scene: &mut Scene) {
        self.core.observe(event, scene);
    }

    fn update(&mut self, dt: f32, scene: &Scene) {
        if self.captured.is_some() {
            return;
        }

        let occupants = self.occupying_teams(scene);
        let mut teams = occupants.iter();
        match (teams.next(), teams.next()) {
            // Exactly one team on the point: progress accrues
            (Some(team), None) => {
                if self.holder != Some(*team) {
                    self.holder = Some(*team);
                    self.progress = 0.0;
                }
                self.progress += dt;
                if self.progress >= self.required {
                    self.captured = Some(*team);
                    tracing::info!(team = %team, "point captured");
                }
            }
            // Vacant or contested: progress resets
            _ => {
                self.holder = None;
                self.progress = 0.0;
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.captured.is_some() || self.core.eliminated_to_one()
    }

    fn report(&self) -> ObjectiveReport {
        ObjectiveReport::Match {
            winner: self.captured.or_else(|| self.core.elimination_winner()),
            teams: self.core.team_reports(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AgentComponents, EntityId, EntityInner};

    fn scene_with_agent(team: u32, pos: IVec2) -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let id = scene.spawn(EntityInner::Agent(AgentComponents::at_position(
            "holder",
            TeamId::new(team),
            pos,
        )));
        (scene, id)
    }

    fn seed(id: EntityId, team: u32) -> AgentSeed {
        AgentSeed {
            id,
            name: format!("agent-{id}"),
            team: TeamId::new(team),
        }
    }

    #[test]
    fn uncontested_hold_accrues_and_captures() {
        let (scene, id) = scene_with_agent(0, IVec2::new(5, 5));
        let roster = vec![seed(id, 0), seed(EntityId::new(99), 1)];
        let mut tracker =
            CapturePointTracker::new(&roster, IVec2::new(5, 5), 2, 3.0);

        tracker.update(1.0, &scene);
        tracker.update(1.0, &scene);
        assert!(!tracker.should_stop());
        assert_eq!(tracker.holder(), Some(TeamId::new(0)));

        tracker.update(1.0, &scene);
        assert!(tracker.should_stop());

        let ObjectiveReport::Match { winner, .. } = tracker.report() else {
            panic!("capture point must produce a match report");
        };
        assert_eq!(winner, Some(TeamId::new(0)));
    }

    #[test]
    fn vacancy_resets_progress() {
        let (mut scene, id) = scene_with_agent(0, IVec2::new(5, 5));
        let roster = vec![seed(id, 0), seed(EntityId::new(99), 1)];
        let mut tracker =
            CapturePointTracker::new(&roster, IVec2::new(5, 5), 2, 3.0);

        tracker.update(2.0, &scene);
        assert!(tracker.progress() > 0.0);

        // Walk the holder far away
        scene.agent_mut(id).unwrap().position = IVec2::new(20, 20);
        tracker.update(1.0, &scene);

        assert!((tracker.progress() - 0.0).abs() < f32::EPSILON);
        assert_eq!(tracker.holder(), None);
    }

    #[test]
    fn contest_blocks_progress() {
        let (mut scene, id) = scene_with_agent(0, IVec2::new(5, 5));
        let rival = scene.spawn(EntityInner::Agent(AgentComponents::at_position(
            "rival",
            TeamId::new(1),
            IVec2::new(6, 5),
        )));
        let roster = vec![seed(id, 0), seed(rival, 1)];
        let mut tracker =
            CapturePointTracker::new(&roster, IVec2::new(5, 5), 2, 2.0);

        for _ in 0..8 {
            tracker.update(1.0, &scene);
        }
        assert!(!tracker.should_stop());
        assert!((tracker.progress() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn holder_change_restarts_the_clock() {
        let (mut scene, id) = scene_with_agent(0, IVec2::new(5, 5));
        let rival = scene.spawn(EntityInner::Agent(AgentComponents::at_position(
            "rival",
            TeamId::new(1),
            IVec2::new(20, 20),
        )));
        let roster = vec![seed(id, 0), seed(rival, 1)];
        let mut tracker =
            CapturePointTracker::new(&roster, IVec2::new(5, 5), 2, 3.0);

        tracker.update(2.0, &scene);

        // Swap which team stands on the point
        scene.agent_mut(id).unwrap().position = IVec2::new(20, 19);
        scene.agent_mut(rival).unwrap().position = IVec2::new(5, 5);

        tracker.update(1.0, &scene);
        assert_eq!(tracker.holder(), Some(TeamId::new(1)));
        assert!(!tracker.should_stop(), "new holder must restart the clock");
    }

    #[test]
    fn elimination_still_ends_the_match() {
        let (mut scene, id) = scene_with_agent(0, IVec2::new(0, 0));
        let roster = vec![seed(id, 0), seed(EntityId::new(99), 1)];
        let mut tracker =
            CapturePointTracker::new(&roster, IVec2::new(5, 5), 2, 30.0);

        tracker.observe(
            &SimEvent::AgentKilled {
                victim: EntityId::new(99),
                killer: Some(id),
                assists: vec![],
            },
            &mut scene,
        );

        assert!(tracker.should_stop());
        let ObjectiveReport::Match { winner, .. } = tracker.report() else {
            panic!("capture point must produce a match report");
        };
        assert_eq!(winner, Some(TeamId::new(0)));
    }
}
