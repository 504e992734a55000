//! Component structs for agents and bullets.
//!
//! Components hold all state for a particular entity kind. Fields are public:
//! the scene owns the structs and the simulation mutates them through its
//! tick phases, so there is no invariant a private field would protect that
//! the phase functions do not already enforce.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, TeamId};
use crate::error::SimError;

/// Default maximum health for agents built without explicit configuration.
pub const DEFAULT_MAX_HEALTH: i32 = 100;

/// Default awareness (FOV) radius in cells.
pub const DEFAULT_AWARENESS: i32 = 8;

/// Default movement speed in cells per second.
pub const DEFAULT_SPEED: f32 = 1.0;

/// How many recent attackers are remembered for assist attribution.
pub const RECENT_ATTACKER_CAPACITY: usize = 5;

// =============================================================================
// KDA
// =============================================================================

/// Kill/death/assist counters.
///
/// These are never mutated by the combat mechanics themselves; the objective
/// tracker owns all KDA bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdaCounters {
    /// Confirmed kills.
    pub kills: u32,
    /// Deaths.
    pub deaths: u32,
    /// Assists credited from the victim's recent-attacker record.
    pub assists: u32,
}

impl KdaCounters {
    /// Adds another set of counters into this one (team aggregation).
    pub fn accumulate(&mut self, other: Self) {
        self.kills += other.kills;
        self.deaths += other.deaths;
        self.assists += other.assists;
    }
}

// =============================================================================
// Recent attackers
// =============================================================================

/// Bounded, most-recent-last record of who damaged an agent.
///
/// Used at the moment of death to attribute the kill (most recent attacker)
/// and assists (the remaining distinct entries). Re-recording an attacker
/// moves them to the most-recent slot rather than duplicating them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentAttackers {
    entries: VecDeque<EntityId>,
}

impl RecentAttackers {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attacker as the most recent, evicting the oldest entry
    /// once the capacity is reached.
    pub fn record(&mut self, attacker: EntityId) {
        self.entries.retain(|id| *id != attacker);
        self.entries.push_back(attacker);
        while self.entries.len() > RECENT_ATTACKER_CAPACITY {
            let _ = self.entries.pop_front();
        }
    }

    /// The most recent attacker, if any.
    #[must_use]
    pub fn latest(&self) -> Option<EntityId> {
        self.entries.back().copied()
    }

    /// All recorded attackers except `exclude`, most recent first.
    #[must_use]
    pub fn others(&self, exclude: Option<EntityId>) -> Vec<EntityId> {
        self.entries
            .iter()
            .rev()
            .copied()
            .filter(|id| Some(*id) != exclude)
            .collect()
    }

    /// Forgets all recorded attackers.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether any attacker is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded attackers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Weapons
// =============================================================================

/// Weapon variant data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Strikes an adjacent cell directly.
    Melee,
    /// Spawns a bullet that travels across the grid.
    Ranged {
        /// Maximum travel distance of the bullet, in cells.
        range: u32,
        /// Bullet speed in cells per tick (informational; bullets advance
        /// one cell per simulation step).
        projectile_speed: f32,
        /// Shots per second; drives the cooldown between firings.
        fire_rate: f32,
    },
}

impl Default for WeaponKind {
    fn default() -> Self {
        Self::Melee
    }
}

/// A weapon carried by an agent.
///
/// Ownership is write-once: a weapon starts unowned and [`Weapon::equip`]
/// binds it to an agent exactly once. The owner is an id reference, not a
/// back-pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Base damage dealt on a hit.
    pub damage: i32,
    /// Melee or ranged behavior.
    pub kind: WeaponKind,
    owner: Option<EntityId>,
    cooldown: f32,
}

impl Weapon {
    /// Creates an unowned melee weapon.
    #[must_use]
    pub const fn melee(damage: i32) -> Self {
        Self {
            damage,
            kind: WeaponKind::Melee,
            owner: None,
            cooldown: 0.0,
        }
    }

    /// Creates an unowned ranged weapon.
    #[must_use]
    pub const fn ranged(damage: i32, range: u32, projectile_speed: f32, fire_rate: f32) -> Self {
        Self {
            damage,
            kind: WeaponKind::Ranged {
                range,
                projectile_speed,
                fire_rate,
            },
            owner: None,
            cooldown: 0.0,
        }
    }

    /// Binds the weapon to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WeaponAlreadyOwned`] if the weapon already has an
    /// owner; the existing owner is left untouched.
    pub fn equip(&mut self, owner: EntityId) -> Result<(), SimError> {
        match self.owner {
            Some(existing) => Err(SimError::WeaponAlreadyOwned { owner: existing }),
            None => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }

    /// The owning agent, if the weapon has been equipped.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Whether this is a ranged weapon.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        matches!(self.kind, WeaponKind::Ranged { .. })
    }

    /// Whether this is a melee weapon.
    #[must_use]
    pub const fn is_melee(&self) -> bool {
        matches!(self.kind, WeaponKind::Melee)
    }

    /// Bullet range for ranged weapons, `None` for melee.
    #[must_use]
    pub const fn range(&self) -> Option<u32> {
        match self.kind {
            WeaponKind::Ranged { range, .. } => Some(range),
            WeaponKind::Melee => None,
        }
    }

    /// Whether the weapon may fire this tick.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Advances the cooldown clock.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    /// Starts the post-fire cooldown. Melee weapons have none.
    pub fn arm_cooldown(&mut self) {
        self.cooldown = match self.kind {
            WeaponKind::Ranged { fire_rate, .. } if fire_rate > 0.0 => 1.0 / fire_rate,
            WeaponKind::Ranged { .. } | WeaponKind::Melee => 0.0,
        };
    }
}

// =============================================================================
// Agent components
// =============================================================================

/// Components for agent entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentComponents {
    /// Display name from configuration.
    pub name: String,
    /// Team affiliation.
    pub team: TeamId,
    /// Grid position. Mutated only through map-mediated moves.
    pub position: IVec2,
    /// Current health, clamped to `0..=max_health`.
    pub health: i32,
    /// Health ceiling.
    pub max_health: i32,
    /// False after health has reached zero; never flips back.
    pub alive: bool,
    /// Attack power added to weapon damage at the point of firing.
    pub attack: i32,
    /// Flat damage reduction applied at the point of impact.
    pub defense: i32,
    /// Movement speed in cells per second.
    pub speed: f32,
    /// Fractional movement budget carried between ticks.
    pub stride: f32,
    /// FOV radius in cells.
    pub awareness: i32,
    /// Carried weapons, in equip order.
    pub weapons: Vec<Weapon>,
    /// Kill/death/assist counters, maintained by the objective tracker.
    pub kda: KdaCounters,
    /// Bounded record of recent attackers for assist attribution.
    pub recent_attackers: RecentAttackers,
}

impl AgentComponents {
    /// Creates an agent with default stats at a position.
    #[must_use]
    pub fn at_position(name: impl Into<String>, team: TeamId, position: IVec2) -> Self {
        Self {
            name: name.into(),
            team,
            position,
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            alive: true,
            attack: 0,
            defense: 0,
            speed: DEFAULT_SPEED,
            stride: 0.0,
            awareness: DEFAULT_AWARENESS,
            weapons: Vec::new(),
            kda: KdaCounters::default(),
            recent_attackers: RecentAttackers::new(),
        }
    }

    /// Whether the agent is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

// =============================================================================
// Bullet components
// =============================================================================

/// Components for bullet entities.
///
/// A bullet carries everything it needs at spawn time: damage is copied from
/// the firing weapon (plus the shooter's attack power) so the bullet stays
/// valid even if the shooter dies mid-flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletComponents {
    /// Grid position.
    pub position: IVec2,
    /// Travel direction; each component in `{-1, 0, 1}`.
    pub direction: IVec2,
    /// Maximum travel distance in cells, including the spawn offset.
    pub max_range: u32,
    /// Cells traveled so far. Starts at 1: spawning one cell out from the
    /// wielder counts against the range.
    pub traveled: u32,
    /// Damage delivered on impact, before the victim's defense.
    pub damage: i32,
    /// The agent that fired; excluded from impact checks.
    pub shooter: EntityId,
}

impl BulletComponents {
    /// Creates a bullet at its spawn cell.
    #[must_use]
    pub const fn new(
        position: IVec2,
        direction: IVec2,
        max_range: u32,
        damage: i32,
        shooter: EntityId,
    ) -> Self {
        Self {
            position,
            direction,
            max_range,
            traveled: 1,
            damage,
            shooter,
        }
    }

    /// Whether the bullet may advance another cell.
    #[must_use]
    pub const fn has_range_left(&self) -> bool {
        self.traveled < self.max_range
    }
}

// =============================================================================
// Tests
// =============================================================================
