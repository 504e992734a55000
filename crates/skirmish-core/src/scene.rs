//! Scene: the authoritative registry of live entities.
//!
//! The scene stores entities in a `BTreeMap` so iteration is always in id
//! order, which keeps every run with the same seed identical across
//! platforms. Ids are assigned monotonically and never reused.
//!
//! # Mid-tick mutation
//!
//! Tick code iterates [`Scene::ids_snapshot`] — a copied id list — never the
//! live map. Handlers may therefore spawn or remove entities mid-tick without
//! invalidating the iteration; a removed entity simply fails its lookup and
//! is skipped.
//!
//! # Example
//!
//! ```
//! use skirmish_core::scene::Scene;
//! use skirmish_core::entity::{AgentComponents, EntityInner, TeamId};
//! use glam::IVec2;
//!
//! let mut scene = Scene::new();
//! let id = scene.spawn(EntityInner::Agent(AgentComponents::at_position(
//!     "scout",
//!     TeamId::new(0),
//!     IVec2::new(2, 2),
//! )));
//!
//! assert!(scene.get(id).is_some());
//! assert_eq!(scene.entity_at(IVec2::new(2, 2)), Some(id));
//! ```

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{
    AgentComponents, BulletComponents, Entity, EntityId, EntityInner, EntityTag, TeamId,
};

/// Registry of live entities with deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity, assigning it the next id.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let _ = self.entities.insert(id, Entity::new(id, inner));
        id
    }

    /// Removes an entity.
    ///
    /// Removing an absent entity is a no-op that returns `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by id.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Convenience accessor for an entity's agent components.
    #[must_use]
    pub fn agent(&self, id: EntityId) -> Option<&AgentComponents> {
        self.get(id).and_then(Entity::as_agent)
    }

    /// Convenience accessor for mutable agent components.
    #[must_use]
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut AgentComponents> {
        self.get_mut(id).and_then(Entity::as_agent_mut)
    }

    /// Convenience accessor for an entity's bullet components.
    #[must_use]
    pub fn bullet(&self, id: EntityId) -> Option<&BulletComponents> {
        self.get(id).and_then(Entity::as_bullet)
    }

    /// Convenience accessor for mutable bullet components.
    #[must_use]
    pub fn bullet_mut(&mut self, id: EntityId) -> Option<&mut BulletComponents> {
        self.get_mut(id).and_then(Entity::as_bullet_mut)
    }

    /// A copied list of all entity ids in ascending order.
    ///
    /// Tick iteration uses this snapshot so entities may be spawned or
    /// removed while it is walked.
    #[must_use]
    pub fn ids_snapshot(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterates entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// The first entity found at a position, scanning in id order.
    ///
    /// Linear scan; the registry is small by design.
    #[must_use]
    pub fn entity_at(&self, position: IVec2) -> Option<EntityId> {
        self.iter()
            .find(|e| e.position() == position)
            .map(Entity::id)
    }

    /// Ids of all entities with the given tag, in id order.
    #[must_use]
    pub fn tagged(&self, tag: EntityTag) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.tag() == tag)
            .map(Entity::id)
            .collect()
    }

    /// Iterates all agents as `(id, components)` pairs in id order.
    pub fn agents(&self) -> impl Iterator<Item = (EntityId, &AgentComponents)> + '_ {
        self.iter()
            .filter_map(|e| e.as_agent().map(|a| (e.id(), a)))
    }

    /// Iterates living agents in id order.
    pub fn living_agents(&self) -> impl Iterator<Item = (EntityId, &AgentComponents)> + '_ {
        self.agents().filter(|(_, a)| a.alive)
    }

    /// The living agent standing at a position, if any.
    #[must_use]
    pub fn living_agent_at(&self, position: IVec2) -> Option<EntityId> {
        self.living_agents()
            .find(|(_, a)| a.position == position)
            .map(|(id, _)| id)
    }

    /// Number of living agents on a team.
    #[must_use]
    pub fn living_on_team(&self, team: TeamId) -> usize {
        self.living_agents().filter(|(_, a)| a.team == team).count()
    }

    /// Number of entities in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_agent(scene: &mut Scene, team: u32, pos: IVec2) -> EntityId {
        scene.spawn(EntityInner::Agent(AgentComponents::at_position(
            "test",
            TeamId::new(team),
            pos,
        )))
    }

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut scene = Scene::new();
        let a = spawn_agent(&mut scene, 0, IVec2::ZERO);
        let b = spawn_agent(&mut scene, 0, IVec2::new(1, 0));

        assert_eq!(a, EntityId::new(0));
        assert_eq!(b, EntityId::new(1));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut scene = Scene::new();
        let a = spawn_agent(&mut scene, 0, IVec2::ZERO);
        let _ = scene.remove(a);

        let b = spawn_agent(&mut scene, 0, IVec2::ZERO);
        assert_eq!(b, EntityId::new(1));
    }

    #[test]
    fn remove_absent_entity_is_noop() {
        let mut scene = Scene::new();
        assert!(scene.remove(EntityId::new(99)).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn snapshot_survives_mid_iteration_removal() {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..4)
            .map(|i| spawn_agent(&mut scene, 0, IVec2::new(i, 0)))
            .collect();

        let mut visited = 0;
        for id in scene.ids_snapshot() {
            // Remove a peer mid-iteration
            if id == ids[0] {
                let _ = scene.remove(ids[2]);
            }
            if scene.get(id).is_some() {
                visited += 1;
            }
        }
        assert_eq!(visited, 3);
    }

    #[test]
    fn entity_at_finds_lowest_id_first() {
        let mut scene = Scene::new();
        let a = spawn_agent(&mut scene, 0, IVec2::new(2, 2));
        let _b = spawn_agent(&mut scene, 1, IVec2::new(2, 2));

        assert_eq!(scene.entity_at(IVec2::new(2, 2)), Some(a));
    }

    #[test]
    fn tagged_filters_by_kind() {
        let mut scene = Scene::new();
        let agent = spawn_agent(&mut scene, 0, IVec2::ZERO);
        let bullet = scene.spawn(EntityInner::Bullet(BulletComponents::new(
            IVec2::new(1, 0),
            IVec2::new(1, 0),
            5,
            10,
            agent,
        )));

        assert_eq!(scene.tagged(EntityTag::Agent), vec![agent]);
        assert_eq!(scene.tagged(EntityTag::Bullet), vec![bullet]);
    }

    #[test]
    fn living_queries_skip_the_dead() {
        let mut scene = Scene::new();
        let a = spawn_agent(&mut scene, 0, IVec2::new(0, 0));
        let b = spawn_agent(&mut scene, 1, IVec2::new(1, 0));

        scene.agent_mut(b).unwrap().alive = false;

        assert_eq!(scene.living_agents().count(), 1);
        assert_eq!(scene.living_agent_at(IVec2::new(1, 0)), None);
        assert_eq!(scene.living_agent_at(IVec2::new(0, 0)), Some(a));
        assert_eq!(scene.living_on_team(TeamId::new(1)), 0);
        assert_eq!(scene.living_on_team(TeamId::new(0)), 1);
    }

    #[test]
    fn serialization_roundtrip_preserves_id_counter() {
        let mut scene = Scene::new();
        let _ = spawn_agent(&mut scene, 0, IVec2::ZERO);
        let _ = spawn_agent(&mut scene, 1, IVec2::new(1, 1));

        let json = serde_json::to_string(&scene).unwrap();
        let mut restored: Scene = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        let next = spawn_agent(&mut restored, 0, IVec2::new(2, 2));
        assert_eq!(next, EntityId::new(2));
    }
}
