//! Configuration records the external loader produces.
//!
//! The core never reads files; a configuration collaborator parses whatever
//! format it likes (JSON, XML) into these serde-derived records and hands
//! them to [`crate::simulation::Simulation::initialize`]. Numeric gameplay
//! tunables are taken as-is here and clamped where they are consumed.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::brain::BrainKind;
use crate::entity::components::{
    DEFAULT_AWARENESS, DEFAULT_MAX_HEALTH, DEFAULT_SPEED,
};
use crate::entity::{AgentComponents, TeamId, Weapon, WeaponKind};
use crate::objective::ObjectiveSpec;

/// How the tick loop is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// `start()` drives ticks back-to-back with a fixed nominal delta until
    /// the objective stops the match.
    #[default]
    Offline,
    /// An external host calls `update(dt)` at a cadence it controls.
    Realtime,
}

/// Grid dimensions and wall layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Cells that are non-walkable and opaque.
    #[serde(default)]
    pub walls: Vec<IVec2>,
}

impl MapConfig {
    /// An open map with no walls.
    #[must_use]
    pub const fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
        }
    }
}

/// Where an agent starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartPosition {
    /// A specific cell; must be walkable at initialization.
    Fixed(IVec2),
    /// A random walkable cell drawn from the simulation's seeded generator.
    #[default]
    Random,
}

/// One weapon as configuration describes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Base damage dealt on a hit.
    pub damage: i32,
    /// Melee or ranged behavior.
    #[serde(default)]
    pub kind: WeaponKind,
}

impl WeaponConfig {
    /// A melee weapon.
    #[must_use]
    pub const fn melee(damage: i32) -> Self {
        Self {
            damage,
            kind: WeaponKind::Melee,
        }
    }

    /// A ranged weapon.
    #[must_use]
    pub const fn ranged(damage: i32, range: u32, projectile_speed: f32, fire_rate: f32) -> Self {
        Self {
            damage,
            kind: WeaponKind::Ranged {
                range,
                projectile_speed,
                fire_rate,
            },
        }
    }

    /// Builds the unowned runtime weapon.
    #[must_use]
    pub const fn build(&self) -> Weapon {
        match self.kind {
            WeaponKind::Melee => Weapon::melee(self.damage),
            WeaponKind::Ranged {
                range,
                projectile_speed,
                fire_rate,
            } => Weapon::ranged(self.damage, range, projectile_speed, fire_rate),
        }
    }
}

/// One agent as configuration describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Display name.
    pub name: String,
    /// Team affiliation.
    pub team: TeamId,
    /// Decision maker to install.
    #[serde(default)]
    pub brain: BrainKind,
    /// Starting cell or random placement.
    #[serde(default)]
    pub start: StartPosition,
    /// FOV radius in cells.
    #[serde(default = "default_awareness")]
    pub awareness: i32,
    /// Health ceiling.
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    /// Attack power added to weapon damage.
    #[serde(default)]
    pub attack: i32,
    /// Flat damage reduction.
    #[serde(default)]
    pub defense: i32,
    /// Movement speed in cells per second.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Weapons to equip, in order.
    #[serde(default)]
    pub weapons: Vec<WeaponConfig>,
}

const fn default_awareness() -> i32 {
    DEFAULT_AWARENESS
}
const fn default_max_health() -> i32 {
    DEFAULT_MAX_HEALTH
}
const fn default_speed() -> f32 {
    DEFAULT_SPEED
}

impl AgentConfig {
    /// An agent with default stats, a human brain, and random placement.
    #[must_use]
    pub fn new(name: impl Into<String>, team: TeamId) -> Self {
        Self {
            name: name.into(),
            team,
            brain: BrainKind::default(),
            start: StartPosition::default(),
            awareness: DEFAULT_AWARENESS,
            max_health: DEFAULT_MAX_HEALTH,
            attack: 0,
            defense: 0,
            speed: DEFAULT_SPEED,
            weapons: Vec::new(),
        }
    }

    /// Sets the brain kind.
    #[must_use]
    pub const fn with_brain(mut self, brain: BrainKind) -> Self {
        self.brain = brain;
        self
    }

    /// Sets a fixed starting cell.
    #[must_use]
    pub const fn with_start(mut self, position: IVec2) -> Self {
        self.start = StartPosition::Fixed(position);
        self
    }

    /// Adds a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponConfig) -> Self {
        self.weapons.push(weapon);
        self
    }

    /// Builds the runtime components at a resolved position.
    ///
    /// Health and awareness are clamped to sane minimums here; these are
    /// tunables, not structural errors.
    #[must_use]
    pub fn build_components(&self, position: IVec2) -> AgentComponents {
        let max_health = self.max_health.max(1);
        let mut components = AgentComponents::at_position(self.name.clone(), self.team, position);
        components.health = max_health;
        components.max_health = max_health;
        components.attack = self.attack;
        components.defense = self.defense.max(0);
        components.speed = self.speed.max(0.0);
        components.awareness = self.awareness.max(0);
        components
    }
}

/// Everything needed to initialize one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Master seed; all randomness in the run flows from it.
    pub seed: u64,
    /// Grid dimensions and walls.
    pub map: MapConfig,
    /// The agent roster.
    pub agents: Vec<AgentConfig>,
    /// Win-condition descriptor.
    pub objective: ObjectiveSpec,
    /// How the tick loop is driven.
    #[serde(default)]
    pub mode: RunMode,
}

// =============================================================================
// Tests
// =============================================================================
