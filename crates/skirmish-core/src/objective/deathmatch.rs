//! Team deathmatch: the last team with a living member wins.
//!
//! [`MatchCore`] is the shared roster/KDA machinery; the capture-point and
//! defend objectives embed it by composition and add their own win paths on
//! top of elimination.

use std::collections::BTreeMap;

use crate::entity::{EntityId, KdaCounters, TeamId};
use crate::events::SimEvent;
use crate::report::{MemberReport, ObjectiveReport, TeamReport};
use crate::scene::Scene;

use super::{AgentSeed, ObjectiveTracker};

/// One agent as the roster sees it.
#[derive(Debug, Clone)]
struct MemberState {
    name: String,
    kda: KdaCounters,
    alive: bool,
}

/// Shared roster, KDA bookkeeping, and elimination logic for team matches.
///
/// The roster is fixed at construction; agents that die stay on it with
/// their final counters, so the end-of-match report always covers everyone.
#[derive(Debug, Clone)]
pub(crate) struct MatchCore {
    teams: BTreeMap<TeamId, BTreeMap<EntityId, MemberState>>,
}

impl MatchCore {
    /// Builds the roster from the spawned agents.
    pub(crate) fn from_roster(roster: &[AgentSeed]) -> Self {
        let mut teams: BTreeMap<TeamId, BTreeMap<EntityId, MemberState>> = BTreeMap::new();
        for seed in roster {
            let _ = teams.entry(seed.team).or_default().insert(
                seed.id,
                MemberState {
                    name: seed.name.clone(),
                    kda: KdaCounters::default(),
                    alive: true,
                },
            );
        }
        Self { teams }
    }

    fn member_mut(&mut self, id: EntityId) -> Option<&mut MemberState> {
        self.teams.values_mut().find_map(|members| members.get_mut(&id))
    }

    /// Credits a kill: the victim's death, the killer's kill, and one assist
    /// per remaining recent attacker. Counters are mirrored onto the scene's
    /// agents where they still exist.
    pub(crate) fn observe_kill(
        &mut self,
        victim: EntityId,
        killer: Option<EntityId>,
        assists: &[EntityId],
        scene: &mut Scene,
    ) {
        if let Some(member) = self.member_mut(victim) {
            member.alive = false;
            member.kda.deaths += 1;
        }
        if let Some(agent) = scene.agent_mut(victim) {
            agent.kda.deaths += 1;
        }

        if let Some(killer) = killer {
            if let Some(member) = self.member_mut(killer) {
                member.kda.kills += 1;
            }
            if let Some(agent) = scene.agent_mut(killer) {
                agent.kda.kills += 1;
            }
        }

        for assist in assists {
            if let Some(member) = self.member_mut(*assist) {
                member.kda.assists += 1;
            }
            if let Some(agent) = scene.agent_mut(*assist) {
                agent.kda.assists += 1;
            }
        }

        tracing::debug!(%victim, ?killer, assists = assists.len(), "kill recorded");
    }

    /// Routes the events a team match cares about.
    pub(crate) fn observe(&mut self, event: &SimEvent, scene: &mut Scene) {
        if let SimEvent::AgentKilled {
            victim,
            killer,
            assists,
        } = event
        {
            self.observe_kill(*victim, *killer, assists, scene);
        }
    }

    /// Teams that still have a living member, in id order.
    pub(crate) fn surviving_teams(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|(_, members)| members.values().any(|m| m.alive))
            .map(|(team, _)| *team)
            .collect()
    }

    /// Whether elimination has reduced the match to at most one team.
    pub(crate) fn eliminated_to_one(&self) -> bool {
        self.surviving_teams().len() <= 1
    }

    /// The team that won by elimination, if exactly one still stands.
    pub(crate) fn elimination_winner(&self) -> Option<TeamId> {
        match self.surviving_teams().as_slice() {
            [team] => Some(*team),
            _ => None,
        }
    }

    /// Per-team report entries with aggregate and per-member counters.
    pub(crate) fn team_reports(&self) -> Vec<TeamReport> {
        self.teams
            .iter()
            .map(|(team, members)| {
                let mut aggregate = KdaCounters::default();
                let members: Vec<MemberReport> = members
                    .iter()
                    .map(|(id, state)| {
                        aggregate.accumulate(state.kda);
                        MemberReport {
                            id: *id,
                            name: state.name.clone(),
                            kda: state.kda,
                        }
                    })
                    .collect();
                TeamReport {
                    team: *team,
                    kda: aggregate,
                    members,
                }
            })
            .collect()
    }
}

/// Last-team-standing objective.
#[derive(Debug, Clone)]
pub struct DeathmatchTracker {
    core: MatchCore,
}

impl DeathmatchTracker {
    /// Creates the tracker from the spawned roster.
    #[must_use]
    pub fn new(roster: &[AgentSeed]) -> Self {
        Self {
            core: MatchCore::from_roster(roster),
        }
    }
}

impl ObjectiveTracker for DeathmatchTracker {
    fn observe(&mut self, event: &SimEvent, scene: &mut Scene) {
        self.core.observe(event, scene);
    }

    fn update(&mut self, _dt: f32, _scene: &Scene) {}

    fn should_stop(&self) -> bool {
        self.core.eliminated_to_one()
    }

    fn report(&self) -> ObjectiveReport {
        ObjectiveReport::Match {
            winner: self.core.elimination_winner(),
            teams: self.core.team_reports(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
