//! Combat resolution: damage application, melee strikes, bullet flight.
//!
//! These functions compute outcomes; the simulation orchestrator applies the
//! follow-through (events, death handling, despawns). Keeping resolution
//! separate from orchestration makes each piece testable on a bare scene.
//!
//! KDA counters are never touched here — that bookkeeping belongs to the
//! objective tracker.

use glam::IVec2;

use crate::entity::{AgentComponents, EntityId};
use crate::map::ArenaMap;
use crate::scene::Scene;

/// Result of applying damage to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed (zero when the agent was already dead).
    pub applied: i32,
    /// Health remaining after the hit.
    pub remaining: i32,
    /// Whether this hit caused the (single) death transition.
    pub killed: bool,
}

/// Damage delivered after the victim's defense, never negative.
#[must_use]
pub const fn effective_damage(raw: i32, defense: i32) -> i32 {
    let delivered = raw - defense;
    if delivered > 0 {
        delivered
    } else {
        0
    }
}

/// Applies damage to an agent.
///
/// Health is floored at zero, the attacker is recorded for assist
/// attribution, and the alive flag flips exactly once when health reaches
/// zero. Damage against an already-dead agent changes nothing.
pub fn take_damage(
    agent: &mut AgentComponents,
    amount: i32,
    attacker: Option<EntityId>,
) -> DamageOutcome {
    if !agent.alive {
        return DamageOutcome {
            applied: 0,
            remaining: agent.health,
            killed: false,
        };
    }

    let amount = amount.max(0);
    let applied = amount.min(agent.health);
    agent.health -= applied;

    if let Some(attacker) = attacker {
        agent.recent_attackers.record(attacker);
    }

    // Only an actual transition counts; zero-damage hits never kill.
    let killed = applied > 0 && agent.health == 0;
    if killed {
        agent.alive = false;
    }

    DamageOutcome {
        applied,
        remaining: agent.health,
        killed,
    }
}

/// Outcome of a melee strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeleeOutcome {
    /// No living agent stood in the target cell.
    Miss,
    /// A living agent was struck.
    Hit {
        /// The struck agent.
        victim: EntityId,
        /// Health actually removed.
        applied: i32,
        /// Health remaining.
        remaining: i32,
        /// Whether the strike was lethal.
        killed: bool,
    },
}

/// Resolves a melee strike against a single cell.
///
/// If a living agent stands in `target_cell`, the raw damage (weapon plus
/// wielder attack power) is delivered through the victim's defense; otherwise
/// the strike misses with no effect.
pub fn resolve_melee(
    scene: &mut Scene,
    attacker: EntityId,
    raw_damage: i32,
    target_cell: IVec2,
) -> MeleeOutcome {
    let Some(victim) = scene.living_agent_at(target_cell) else {
        return MeleeOutcome::Miss;
    };
    if victim == attacker {
        return MeleeOutcome::Miss;
    }
    let Some(components) = scene.agent_mut(victim) else {
        return MeleeOutcome::Miss;
    };

    let delivered = effective_damage(raw_damage, components.defense);
    let outcome = take_damage(components, delivered, Some(attacker));
    MeleeOutcome::Hit {
        victim,
        applied: outcome.applied,
        remaining: outcome.remaining,
        killed: outcome.killed,
    }
}

/// Outcome of advancing a bullet by one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulletStep {
    /// The bullet had already reached its maximum range.
    Expired,
    /// The bullet moved into a free cell.
    Moved {
        /// The vacated cell.
        from: IVec2,
        /// The entered cell.
        to: IVec2,
    },
    /// The bullet struck a living agent.
    HitAgent {
        /// The struck agent.
        victim: EntityId,
        /// The agent that fired the bullet.
        shooter: EntityId,
        /// Health actually removed.
        applied: i32,
        /// Health remaining.
        remaining: i32,
        /// Whether the hit was lethal.
        killed: bool,
    },
    /// The bullet struck a wall or the map edge.
    HitObstacle,
}

/// Advances a bullet by one grid step.
///
/// Before moving, a bullet that has already traveled its maximum range
/// expires. Otherwise the destination cell decides: walkable means the bullet
/// flies on; a blocked cell holding a living agent other than the shooter
/// means an impact; any other blocked cell (wall, map edge, the shooter
/// standing in the way) destroys the bullet without damage.
///
/// Returns `None` when `id` is not a bullet in the scene.
pub fn advance_bullet(scene: &mut Scene, map: &ArenaMap, id: EntityId) -> Option<BulletStep> {
    let bullet = scene.bullet(id)?;
    if !bullet.has_range_left() {
        return Some(BulletStep::Expired);
    }

    let from = bullet.position;
    let shooter = bullet.shooter;
    let damage = bullet.damage;
    let to = from + bullet.direction;

    if map.is_walkable(to) {
        if let Some(bullet) = scene.bullet_mut(id) {
            bullet.position = to;
            bullet.traveled += 1;
        }
        return Some(BulletStep::Moved { from, to });
    }

    match scene.living_agent_at(to) {
        Some(victim) if victim != shooter => {
            let Some(components) = scene.agent_mut(victim) else {
                return Some(BulletStep::HitObstacle);
            };
            let delivered = effective_damage(damage, components.defense);
            let outcome = take_damage(components, delivered, Some(shooter));
            Some(BulletStep::HitAgent {
                victim,
                shooter,
                applied: outcome.applied,
                remaining: outcome.remaining,
                killed: outcome.killed,
            })
        }
        _ => Some(BulletStep::HitObstacle),
    }
}

// =============================================================================
// Tests
// =============================================================================
