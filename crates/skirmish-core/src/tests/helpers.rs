//! Test helper factories for simulations, configurations, and brains.

use std::collections::VecDeque;

use glam::IVec2;
use rand_chacha::ChaCha8Rng;

use crate::brain::{AttackOrder, Brain, BrainView, Intent};
use crate::config::{AgentConfig, MapConfig, MatchConfig, RunMode};
use crate::entity::TeamId;
use crate::objective::ObjectiveSpec;

/// A 10x10 open-map duel: one agent per team at fixed, well-separated cells.
pub fn duel_config(seed: u64, objective: ObjectiveSpec, mode: RunMode) -> MatchConfig {
    MatchConfig {
        seed,
        map: MapConfig::open(10, 10),
        agents: vec![
            AgentConfig::new("gunner", TeamId::new(0)).with_start(IVec2::new(2, 2)),
            AgentConfig::new("target", TeamId::new(1)).with_start(IVec2::new(6, 2)),
        ],
        objective,
        mode,
    }
}

/// A brain that plays back a fixed list of intents, then holds forever.
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    script: VecDeque<Intent>,
}

impl ScriptedBrain {
    pub fn new(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self {
            script: intents.into_iter().collect(),
        }
    }
}

impl Brain for ScriptedBrain {
    fn think(&mut self, _view: &BrainView<'_>, _rng: &mut ChaCha8Rng) -> Intent {
        self.script.pop_front().unwrap_or_else(Intent::hold)
    }
}

/// A brain that fires weapon slot 0 in a direction on its first tick only.
pub fn fire_once(direction: IVec2) -> ScriptedBrain {
    ScriptedBrain::new([Intent {
        movement: IVec2::ZERO,
        attack: Some(AttackOrder {
            slot: 0,
            direction,
        }),
    }])
}

/// A brain that strikes in a direction every tick.
#[derive(Debug, Clone, Copy)]
pub struct RepeatAttack {
    direction: IVec2,
}

impl RepeatAttack {
    pub fn new(direction: IVec2) -> Self {
        Self { direction }
    }
}

impl Brain for RepeatAttack {
    fn think(&mut self, _view: &BrainView<'_>, _rng: &mut ChaCha8Rng) -> Intent {
        Intent {
            movement: IVec2::ZERO,
            attack: Some(AttackOrder {
                slot: 0,
                direction: self.direction,
            }),
        }
    }
}
