//! Entity types for the arena simulation.
//!
//! This module provides the core entity vocabulary:
//! - [`EntityId`]: unique identifier, assigned monotonically by the scene
//! - [`TeamId`]: team affiliation for agents
//! - [`EntityTag`]: coarse classification used by queries
//! - [`EntityInner`]: type-safe storage for entity-specific components
//! - [`Entity`]: the complete entity container
//!
//! # Architecture
//!
//! Entities are plain data keyed by stable identifiers. Relationships between
//! entities (weapon ownership, who fired a bullet) are id references, never
//! ownership links, so no cyclic ownership graph exists.
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Entity, EntityId, EntityTag, EntityInner, TeamId};
//! use skirmish_core::entity::components::AgentComponents;
//! use glam::IVec2;
//!
//! let agent = Entity::new(
//!     EntityId::new(42),
//!     EntityInner::Agent(AgentComponents::at_position(
//!         "scout",
//!         TeamId::new(0),
//!         IVec2::new(3, 4),
//!     )),
//! );
//!
//! assert_eq!(agent.id().as_u64(), 42);
//! assert_eq!(agent.tag(), EntityTag::Agent);
//! assert_eq!(agent.position(), IVec2::new(3, 4));
//! ```

pub mod components;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    AgentComponents, BulletComponents, KdaCounters, RecentAttackers, Weapon, WeaponKind,
};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Ids are immutable once
/// assigned and unique within a scene. Their numeric ordering drives the
/// deterministic iteration order of the entity registry.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Team affiliation for agents.
///
/// Plain numeric team id; objective trackers group and score agents by it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(u32);

impl TeamId {
    /// Creates a new `TeamId` from a raw `u32` value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw `u32` value of this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TeamId({})", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TeamId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Coarse entity classification.
///
/// - `Agent`: a combatant with health, a team, and weapons
/// - `Bullet`: an in-flight projectile spawned by a ranged weapon
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A combatant with health, a team, and weapons.
    Agent,
    /// An in-flight projectile.
    Bullet,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "Agent"),
            Self::Bullet => write!(f, "Bullet"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// Each variant holds the full component struct for that entity kind, so
/// access never needs runtime type checks beyond a single `match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Agent components (team, health, weapons, counters).
    Agent(AgentComponents),
    /// Bullet components (trajectory, range, payload).
    Bullet(BulletComponents),
}

impl EntityInner {
    /// Returns the corresponding [`EntityTag`] for this storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Agent(_) => EntityTag::Agent,
            Self::Bullet(_) => EntityTag::Bullet,
        }
    }

    /// Returns the agent components, if this is an agent.
    #[must_use]
    pub const fn as_agent(&self) -> Option<&AgentComponents> {
        match self {
            Self::Agent(components) => Some(components),
            Self::Bullet(_) => None,
        }
    }

    /// Returns the mutable agent components, if this is an agent.
    #[must_use]
    pub fn as_agent_mut(&mut self) -> Option<&mut AgentComponents> {
        match self {
            Self::Agent(components) => Some(components),
            Self::Bullet(_) => None,
        }
    }

    /// Returns the bullet components, if this is a bullet.
    #[must_use]
    pub const fn as_bullet(&self) -> Option<&BulletComponents> {
        match self {
            Self::Bullet(components) => Some(components),
            Self::Agent(_) => None,
        }
    }

    /// Returns the mutable bullet components, if this is a bullet.
    #[must_use]
    pub fn as_bullet_mut(&mut self) -> Option<&mut BulletComponents> {
        match self {
            Self::Bullet(components) => Some(components),
            Self::Agent(_) => None,
        }
    }
}

/// A complete entity in the simulation.
///
/// Combines a unique [`EntityId`] with an [`EntityInner`] component storage.
/// The tag is derived from the storage variant, so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given id and component storage.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's classification tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` if this entity is an agent.
    #[must_use]
    pub const fn is_agent(&self) -> bool {
        matches!(self.inner, EntityInner::Agent(_))
    }

    /// Returns `true` if this entity is a bullet.
    #[must_use]
    pub const fn is_bullet(&self) -> bool {
        matches!(self.inner, EntityInner::Bullet(_))
    }

    /// Returns the agent components if this is an agent, `None` otherwise.
    #[must_use]
    pub const fn as_agent(&self) -> Option<&AgentComponents> {
        self.inner.as_agent()
    }

    /// Returns mutable agent components if this is an agent, `None` otherwise.
    #[must_use]
    pub fn as_agent_mut(&mut self) -> Option<&mut AgentComponents> {
        self.inner.as_agent_mut()
    }

    /// Returns the bullet components if this is a bullet, `None` otherwise.
    #[must_use]
    pub const fn as_bullet(&self) -> Option<&BulletComponents> {
        self.inner.as_bullet()
    }

    /// Returns mutable bullet components if this is a bullet, `None` otherwise.
    #[must_use]
    pub fn as_bullet_mut(&mut self) -> Option<&mut BulletComponents> {
        self.inner.as_bullet_mut()
    }

    /// Returns the entity's grid position.
    ///
    /// Every entity kind has a position; this extracts it uniformly.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        match &self.inner {
            EntityInner::Agent(c) => c.position,
            EntityInner::Bullet(c) => c.position,
        }
    }

    /// Writes the entity's grid position.
    ///
    /// Callers outside the map go through [`crate::map::ArenaMap::move_entity`]
    /// instead, which keeps walkability in sync.
    pub fn set_position(&mut self, position: IVec2) {
        match &mut self.inner {
            EntityInner::Agent(c) => c.position = position,
            EntityInner::Bullet(c) => c.position = position,
        }
    }
}
