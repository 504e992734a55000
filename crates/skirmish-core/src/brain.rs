//! Brains: per-tick decision makers for agents.
//!
//! A brain is the externally supplied collaborator that yields a movement
//! vector and an optional attack order each tick. The core defines the
//! contract and ships three implementations; hosts may install their own via
//! [`crate::simulation::Simulation::set_brain`].
//!
//! Brains read the world through a [`BrainView`] and draw randomness from the
//! simulation's seeded generator, so every decision is reproducible under a
//! fixed seed.

use std::fmt;

use glam::IVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{AgentComponents, EntityId};
use crate::map::ArenaMap;
use crate::scene::Scene;

/// The four cardinal step directions.
pub const CARDINALS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// An attack order produced by a brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOrder {
    /// Index into the agent's weapon list.
    pub slot: usize,
    /// Fire/strike direction; reduced to per-axis signum by the simulation.
    pub direction: IVec2,
}

/// What an agent wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Desired movement vector; zero means hold position.
    pub movement: IVec2,
    /// Optional attack order.
    pub attack: Option<AttackOrder>,
}

impl Intent {
    /// Do nothing this tick.
    #[must_use]
    pub const fn hold() -> Self {
        Self {
            movement: IVec2::ZERO,
            attack: None,
        }
    }

    /// Move without attacking.
    #[must_use]
    pub const fn step(direction: IVec2) -> Self {
        Self {
            movement: direction,
            attack: None,
        }
    }
}

/// Read-only view of the world handed to a brain.
///
/// The map's FOV is focused on the thinking agent before `think` runs, so
/// [`ArenaMap::is_in_fov`] answers from this agent's point of view.
pub struct BrainView<'a> {
    /// The thinking agent's id.
    pub id: EntityId,
    /// The thinking agent's components.
    pub agent: &'a AgentComponents,
    /// The entity registry.
    pub scene: &'a Scene,
    /// The arena map, FOV-focused on this agent.
    pub map: &'a ArenaMap,
}

/// Per-tick decision maker.
pub trait Brain: fmt::Debug {
    /// Produces this tick's intent.
    fn think(&mut self, view: &BrainView<'_>, rng: &mut ChaCha8Rng) -> Intent;
}

/// Which brain implementation to install for an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrainKind {
    /// Inert; movement arrives externally through
    /// [`crate::simulation::Simulation::process_movement`].
    #[default]
    Human,
    /// Seeded random walk.
    Wander,
    /// Closes on the nearest visible enemy and attacks.
    Hunter,
}

impl BrainKind {
    /// Instantiates the brain for this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn Brain> {
        match self {
            Self::Human => Box::new(HumanBrain),
            Self::Wander => Box::new(WanderBrain),
            Self::Hunter => Box::new(HunterBrain),
        }
    }
}

/// Inert brain for externally driven agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanBrain;

impl Brain for HumanBrain {
    fn think(&mut self, _view: &BrainView<'_>, _rng: &mut ChaCha8Rng) -> Intent {
        Intent::hold()
    }
}

/// Random walk: each tick, either hold or step in a random cardinal
/// direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanderBrain;

impl Brain for WanderBrain {
    fn think(&mut self, _view: &BrainView<'_>, rng: &mut ChaCha8Rng) -> Intent {
        match rng.gen_range(0..=CARDINALS.len()) {
            0 => Intent::hold(),
            n => Intent::step(CARDINALS[n - 1]),
        }
    }
}

/// Pursues the nearest visible enemy.
///
/// Target selection: living agents of other teams that are inside this
/// agent's field of view, nearest first, lowest id breaking ties. Adjacent
/// enemies are struck with the first ready melee weapon; enemies aligned on
/// a row, column, or diagonal are fired upon with the first ready ranged
/// weapon whose range covers the distance; otherwise the hunter steps toward
/// the target. With no visible enemy it wanders.
#[derive(Debug, Clone, Copy, Default)]
pub struct HunterBrain;

impl HunterBrain {
    fn nearest_visible_enemy(view: &BrainView<'_>) -> Option<(EntityId, IVec2)> {
        view.scene
            .living_agents()
            .filter(|(id, other)| *id != view.id && other.team != view.agent.team)
            .filter(|(_, other)| view.map.is_in_fov(other.position))
            .map(|(id, other)| {
                let d = other.position - view.agent.position;
                (d.x * d.x + d.y * d.y, id, other.position)
            })
            .min_by_key(|(dist_sq, id, _)| (*dist_sq, *id))
            .map(|(_, id, pos)| (id, pos))
    }

    fn ready_slot(agent: &AgentComponents, melee: bool) -> Option<usize> {
        agent
            .weapons
            .iter()
            .position(|w| w.is_melee() == melee && w.is_ready())
    }

    fn step_toward(view: &BrainView<'_>, delta: IVec2) -> IVec2 {
        let primary = if delta.x.abs() >= delta.y.abs() {
            IVec2::new(delta.x.signum(), 0)
        } else {
            IVec2::new(0, delta.y.signum())
        };
        let secondary = if delta.x.abs() >= delta.y.abs() {
            IVec2::new(0, delta.y.signum())
        } else {
            IVec2::new(delta.x.signum(), 0)
        };

        for candidate in [primary, secondary, delta.signum()] {
            if candidate != IVec2::ZERO && view.map.is_walkable(view.agent.position + candidate) {
                return candidate;
            }
        }
        IVec2::ZERO
    }
}

impl Brain for HunterBrain {
    fn think(&mut self, view: &BrainView<'_>, rng: &mut ChaCha8Rng) -> Intent {
        let Some((_, target_pos)) = Self::nearest_visible_enemy(view) else {
            return WanderBrain.think(view, rng);
        };

        let delta = target_pos - view.agent.position;
        let chebyshev = delta.x.abs().max(delta.y.abs());

        // Adjacent: melee strike
        if chebyshev == 1 {
            if let Some(slot) = Self::ready_slot(view.agent, true) {
                return Intent {
                    movement: IVec2::ZERO,
                    attack: Some(AttackOrder {
                        slot,
                        direction: delta,
                    }),
                };
            }
        }

        // Aligned at distance: ranged shot
        let aligned = delta.x == 0 || delta.y == 0 || delta.x.abs() == delta.y.abs();
        if aligned && chebyshev >= 2 {
            if let Some(slot) = Self::ready_slot(view.agent, false) {
                #[allow(clippy::cast_sign_loss)]
                let in_range = view.agent.weapons[slot]
                    .range()
                    .is_some_and(|r| r >= chebyshev as u32);
                if in_range {
                    return Intent {
                        movement: IVec2::ZERO,
                        attack: Some(AttackOrder {
                            slot,
                            direction: delta.signum(),
                        }),
                    };
                }
            }
        }

        Intent::step(Self::step_toward(view, delta))
    }
}

// =============================================================================
// Tests
// =============================================================================
