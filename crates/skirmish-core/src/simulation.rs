//! The simulation orchestrator and its tick loop.
//!
//! [`Simulation`] owns the map, the scene, the objective tracker, the agent
//! brains, and the active bullet list, and drives them through a
//! single-threaded, cooperative tick:
//!
//! 1. **AGENTS**: each living agent (in id order, over an id snapshot) gets
//!    its weapons' cooldowns ticked, its FOV focused, and its brain asked for
//!    an intent; movement goes through the map, attacks through the combat
//!    resolver.
//! 2. **BULLETS**: every active bullet advances one cell, hitting, expiring,
//!    or flying on.
//! 3. **STEP**: the counter increments and `StepCompleted` fires.
//! 4. **OBJECTIVE**: the tick's events feed the tracker, its timers advance,
//!    and its verdict (or the all-agents-dead fallback) decides whether the
//!    match stops.
//!
//! # Determinism
//!
//! Given the same [`MatchConfig`], a run is reproducible: entities iterate in
//! id order, all randomness flows from one seeded `ChaCha8Rng`, and event
//! delivery is synchronous. Multiple simulations are fully independent.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::{AgentConfig, MapConfig, MatchConfig, RunMode};
//! use skirmish_core::entity::TeamId;
//! use skirmish_core::objective::ObjectiveSpec;
//! use skirmish_core::simulation::Simulation;
//!
//! let config = MatchConfig {
//!     seed: 7,
//!     map: MapConfig::open(8, 8),
//!     agents: vec![
//!         AgentConfig::new("alpha", TeamId::new(0)),
//!         AgentConfig::new("bravo", TeamId::new(1)),
//!     ],
//!     objective: ObjectiveSpec::steps(3),
//!     mode: RunMode::Offline,
//! };
//!
//! let mut sim = Simulation::from_config(&config).unwrap();
//! sim.start().unwrap();
//!
//! assert!(!sim.is_running());
//! let summary = sim.summary().unwrap();
//! assert_eq!(summary.step, 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::IVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::brain::{Brain, BrainView, Intent};
use crate::combat::{self, BulletStep, MeleeOutcome};
use crate::config::{MatchConfig, RunMode, StartPosition};
use crate::entity::{BulletComponents, Entity, EntityId, EntityInner, EntityTag, WeaponKind};
use crate::error::SimError;
use crate::events::{AgentSummary, SimEvent, StopReason, StopSummary};
use crate::map::ArenaMap;
use crate::objective::{AgentSeed, ObjectiveTracker};
use crate::scene::Scene;

/// Fixed time delta used by offline mode, in seconds.
pub const NOMINAL_DT: f32 = 1.0;

/// Lifecycle state of a simulation.
///
/// `Uninitialized → Initialized → Running ⇄ Paused → Stopped`, with
/// `Stopped` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimState {
    /// Freshly constructed; no map or roster yet.
    Uninitialized,
    /// Map, scene, and tracker built; waiting for `start()`.
    Initialized,
    /// The tick loop is live.
    Running,
    /// Suspended; `resume()` continues.
    Paused,
    /// Terminal.
    Stopped,
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// The simulation orchestrator.
///
/// See the module documentation for the tick structure.
#[derive(Debug)]
pub struct Simulation {
    state: SimState,
    seed: u64,
    rng: ChaCha8Rng,
    map: Option<ArenaMap>,
    scene: Scene,
    tracker: Option<Box<dyn ObjectiveTracker>>,
    brains: BTreeMap<EntityId, Box<dyn Brain>>,
    active_bullets: Vec<EntityId>,
    events: Vec<SimEvent>,
    step: u64,
    elapsed: f32,
    mode: RunMode,
    defeated: Vec<AgentSummary>,
    summary: Option<StopSummary>,
}

impl Simulation {
    /// Creates an uninitialized simulation with the given master seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: SimState::Uninitialized,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            map: None,
            scene: Scene::new(),
            tracker: None,
            brains: BTreeMap::new(),
            active_bullets: Vec::new(),
            events: Vec::new(),
            step: 0,
            elapsed: 0.0,
            mode: RunMode::default(),
            defeated: Vec::new(),
            summary: None,
        }
    }

    /// Creates and initializes a simulation in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::initialize`].
    pub fn from_config(config: &MatchConfig) -> Result<Self, SimError> {
        let mut sim = Self::new(config.seed);
        sim.initialize(config)?;
        Ok(sim)
    }

    /// Builds the map, spawns the roster, and constructs the objective
    /// tracker.
    ///
    /// Each agent is placed (fixed cells validated, random cells drawn from
    /// the seeded generator), equipped, given its brain, and FOV-enabled.
    /// Fires [`SimEvent::Initialized`] on success.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidState`] unless the simulation is uninitialized
    /// - [`SimError::EmptyRoster`] for an empty agent list
    /// - [`SimError::Grid`] for zero map dimensions
    /// - [`SimError::InvalidStart`] for a fixed start that is off-map or
    ///   not walkable (including cells already taken by an earlier agent)
    /// - [`SimError::NoRoomToSpawn`] when random placement finds no cell
    pub fn initialize(&mut self, config: &MatchConfig) -> Result<(), SimError> {
        if self.state != SimState::Uninitialized {
            return Err(SimError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }
        if config.agents.is_empty() {
            return Err(SimError::EmptyRoster);
        }

        let mut map = ArenaMap::from_config(&config.map)?;
        let mut roster = Vec::with_capacity(config.agents.len());

        for agent_config in &config.agents {
            let position = match agent_config.start {
                StartPosition::Fixed(p) => {
                    if !map.is_walkable(p) {
                        return Err(SimError::InvalidStart {
                            name: agent_config.name.clone(),
                            position: p,
                        });
                    }
                    p
                }
                StartPosition::Random => map
                    .random_walkable(&mut self.rng, None)
                    .ok_or(SimError::NoRoomToSpawn)?,
            };

            let components = agent_config.build_components(position);
            let spawned = self.scene.spawn(EntityInner::Agent(components));
            for weapon_config in &agent_config.weapons {
                let mut weapon = weapon_config.build();
                weapon.equip(spawned)?;
                if let Some(agent) = self.scene.agent_mut(spawned) {
                    agent.weapons.push(weapon);
                }
            }
            let _ = map.occupy(position);
            let _ = map.compute_fov_for(&self.scene, spawned, true);
            self.brains.insert(spawned, agent_config.brain.build());

            roster.push(AgentSeed {
                id: spawned,
                name: agent_config.name.clone(),
                team: agent_config.team,
            });
            self.events.push(SimEvent::EntityCreated {
                entity: spawned,
                tag: EntityTag::Agent,
                position,
            });
        }

        self.tracker = Some(config.objective.into_tracker(&roster));
        self.map = Some(map);
        self.mode = config.mode;
        self.state = SimState::Initialized;
        self.events.push(SimEvent::Initialized);
        tracing::info!(
            seed = self.seed,
            agents = roster.len(),
            objective = %config.objective.kind,
            "simulation initialized"
        );
        Ok(())
    }

    /// Starts the tick loop.
    ///
    /// In [`RunMode::Offline`] this drives ticks back-to-back with
    /// [`NOMINAL_DT`] until the objective (or the all-agents-dead fallback)
    /// stops the match; a non-terminating objective would spin forever, so
    /// offline runs pair with Steps or an eliminating match. In
    /// [`RunMode::Realtime`] it returns immediately and the host calls
    /// [`Self::update`].
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidState`] unless the simulation is initialized.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.state != SimState::Initialized {
            return Err(SimError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        self.state = SimState::Running;
        self.events.push(SimEvent::Started);
        tracing::info!("simulation started");

        if self.mode == RunMode::Offline {
            while self.state == SimState::Running {
                self.update(NOMINAL_DT);
            }
        }
        Ok(())
    }

    /// Suspends the tick loop. No-op unless running.
    pub fn pause(&mut self) {
        if self.state == SimState::Running {
            self.state = SimState::Paused;
            self.events.push(SimEvent::Paused);
            tracing::info!(step = self.step, "simulation paused");
        }
    }

    /// Resumes a paused simulation. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state == SimState::Paused {
            self.state = SimState::Running;
            self.events.push(SimEvent::Resumed);
            tracing::info!(step = self.step, "simulation resumed");
        }
    }

    /// Stops the match from outside the tick loop.
    ///
    /// Idempotent; fires [`SimEvent::Stopped`] with the final summary the
    /// first time it takes effect.
    pub fn stop(&mut self) {
        self.finish(StopReason::Aborted);
    }

    /// Runs one tick.
    ///
    /// A no-op in every state but [`SimState::Running`], so late external
    /// calls after a stop are harmless.
    #[allow(clippy::too_many_lines)]
    pub fn update(&mut self, dt: f32) {
        if self.state != SimState::Running {
            return;
        }
        self.elapsed += dt;

        let Self {
            scene,
            map,
            tracker,
            brains,
            rng,
            active_bullets,
            defeated,
            ..
        } = self;
        let (Some(map), Some(tracker)) = (map.as_mut(), tracker.as_mut()) else {
            return;
        };

        let mut tick: Vec<SimEvent> = Vec::new();

        // PHASE 1: AGENTS — cooldowns, FOV, brain, movement, attack
        for id in scene.ids_snapshot() {
            let Some(agent) = scene.agent_mut(id) else {
                continue;
            };
            if !agent.alive {
                continue;
            }
            for weapon in &mut agent.weapons {
                weapon.tick_cooldown(dt);
            }

            let _ = map.compute_fov_for(scene, id, true);

            let intent = match brains.get_mut(&id) {
                Some(brain) => {
                    let Some(agent) = scene.agent(id) else {
                        continue;
                    };
                    let view = BrainView {
                        id,
                        agent,
                        scene,
                        map,
                    };
                    brain.think(&view, rng)
                }
                None => Intent::hold(),
            };

            apply_movement(scene, map, id, intent.movement, dt, &mut tick);

            if let Some(order) = intent.attack {
                apply_attack(
                    scene,
                    map,
                    brains,
                    active_bullets,
                    defeated,
                    id,
                    order.slot,
                    order.direction,
                    &mut tick,
                );
            }
        }

        // PHASE 2: BULLETS — advance every active bullet one cell
        let flying: Vec<EntityId> = active_bullets.clone();
        for bullet_id in flying {
            let outcome = combat::advance_bullet(scene, map, bullet_id);
            match outcome {
                None => {
                    active_bullets.retain(|b| *b != bullet_id);
                }
                Some(BulletStep::Moved { from, to }) => {
                    tick.push(SimEvent::EntityMoved {
                        entity: bullet_id,
                        from,
                        to,
                    });
                }
                Some(BulletStep::Expired | BulletStep::HitObstacle) => {
                    despawn_bullet(scene, active_bullets, bullet_id, &mut tick);
                }
                Some(BulletStep::HitAgent {
                    victim,
                    shooter,
                    applied,
                    remaining,
                    killed,
                }) => {
                    tick.push(SimEvent::AgentDamaged {
                        target: victim,
                        attacker: Some(shooter),
                        amount: applied,
                        remaining,
                    });
                    if killed {
                        handle_death(scene, map, brains, defeated, victim, &mut tick);
                    }
                    despawn_bullet(scene, active_bullets, bullet_id, &mut tick);
                }
            }
        }

        // PHASE 3: STEP
        self.step += 1;
        tick.push(SimEvent::StepCompleted { step: self.step });

        // PHASE 4: OBJECTIVE — feed the tick's events, advance, check
        for event in &tick {
            tracker.observe(event, scene);
        }
        tracker.update(dt, scene);

        let stop_reason = if tracker.should_stop() {
            Some(StopReason::ObjectiveComplete)
        } else if scene.living_agents().next().is_none() {
            Some(StopReason::AllAgentsDead)
        } else {
            None
        };

        tracing::debug!(step = self.step, events = tick.len(), "tick complete");
        self.events.append(&mut tick);

        if let Some(reason) = stop_reason {
            self.finish(reason);
        }
    }

    /// Requests a one-cell move on behalf of external input (human control
    /// or a host-side AI). The sole external movement path.
    ///
    /// Blocked or out-of-bounds targets are ordinary failures (`Ok(false)`);
    /// calls while the simulation is not running are no-ops (`Ok(false)`).
    /// On success an [`SimEvent::EntityMoved`] is raised.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownEntity`] if `id` is not in the scene.
    pub fn process_movement(&mut self, id: EntityId, direction: IVec2) -> Result<bool, SimError> {
        let Some(entity) = self.scene.get(id) else {
            return Err(SimError::UnknownEntity(id));
        };
        let from = entity.position();

        if self.state != SimState::Running {
            return Ok(false);
        }
        let dir = direction.signum();
        if dir == IVec2::ZERO {
            return Ok(false);
        }
        let Some(map) = self.map.as_mut() else {
            return Err(SimError::NotInitialized);
        };

        let moved = map.move_entity(&mut self.scene, id, from + dir)?;
        if moved {
            self.events.push(SimEvent::EntityMoved {
                entity: id,
                from,
                to: from + dir,
            });
        }
        Ok(moved)
    }

    /// Installs a brain for an agent, replacing the configured one.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownEntity`] if `id` is not in the scene.
    pub fn set_brain(&mut self, id: EntityId, brain: Box<dyn Brain>) -> Result<(), SimError> {
        if self.scene.get(id).is_none() {
            return Err(SimError::UnknownEntity(id));
        }
        let _ = self.brains.insert(id, brain);
        Ok(())
    }

    fn finish(&mut self, reason: StopReason) {
        if matches!(self.state, SimState::Stopped | SimState::Uninitialized) {
            return;
        }
        let Some(tracker) = self.tracker.as_ref() else {
            return;
        };

        let survivors: Vec<AgentSummary> = self
            .scene
            .living_agents()
            .map(|(id, agent)| AgentSummary {
                id,
                name: agent.name.clone(),
                team: agent.team,
                health: agent.health,
            })
            .collect();

        let summary = StopSummary {
            step: self.step,
            reason,
            survivors,
            defeated: self.defeated.clone(),
            report: tracker.report(),
        };
        self.summary = Some(summary.clone());
        self.events.push(SimEvent::Stopped(Box::new(summary)));
        self.state = SimState::Stopped;
        tracing::info!(step = self.step, ?reason, "simulation stopped");
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SimState {
        self.state
    }

    /// Whether the tick loop is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    /// The master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn current_step(&self) -> u64 {
        self.step
    }

    /// Simulated seconds accumulated so far.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Read access to the entity registry.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Read access to the arena map, once initialized.
    #[must_use]
    pub fn map(&self) -> Option<&ArenaMap> {
        self.map.as_ref()
    }

    /// An entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    /// The first entity at a position, in id order.
    #[must_use]
    pub fn entity_at(&self, position: IVec2) -> Option<EntityId> {
        self.scene.entity_at(position)
    }

    /// All entity ids with the given tag, in id order.
    #[must_use]
    pub fn entities_tagged(&self, tag: EntityTag) -> Vec<EntityId> {
        self.scene.tagged(tag)
    }

    /// The final summary, once the match has stopped.
    #[must_use]
    pub fn summary(&self) -> Option<&StopSummary> {
        self.summary.as_ref()
    }

    /// Drains the host-facing event log.
    ///
    /// Events accumulate in raise order across ticks until drained.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

// =============================================================================
// Tick helpers
// =============================================================================

/// Applies a movement intent, consuming the agent's stride budget.
///
/// Speed accumulates fractionally across ticks; an idle tick resets the
/// budget so held agents never bank a burst of moves.
fn apply_movement(
    scene: &mut Scene,
    map: &mut ArenaMap,
    id: EntityId,
    movement: IVec2,
    dt: f32,
    tick: &mut Vec<SimEvent>,
) {
    let dir = movement.signum();
    let Some(agent) = scene.agent_mut(id) else {
        return;
    };
    if dir == IVec2::ZERO {
        agent.stride = 0.0;
        return;
    }

    agent.stride += agent.speed * dt;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let budget = agent.stride.floor() as u32;
    agent.stride -= agent.stride.floor();

    for _ in 0..budget {
        let Some(from) = scene.get(id).map(Entity::position) else {
            return;
        };
        match map.move_entity(scene, id, from + dir) {
            Ok(true) => tick.push(SimEvent::EntityMoved {
                entity: id,
                from,
                to: from + dir,
            }),
            Ok(false) | Err(_) => break,
        }
    }
}

/// Resolves an attack order against the agent's weapon list.
///
/// Invalid slots and weapons still on cooldown are ordinary failures:
/// nothing happens. Melee strikes resolve immediately; ranged weapons spawn
/// a bullet one cell out and start their cooldown.
#[allow(clippy::too_many_arguments)]
fn apply_attack(
    scene: &mut Scene,
    map: &mut ArenaMap,
    brains: &mut BTreeMap<EntityId, Box<dyn Brain>>,
    active_bullets: &mut Vec<EntityId>,
    defeated: &mut Vec<AgentSummary>,
    attacker: EntityId,
    slot: usize,
    direction: IVec2,
    tick: &mut Vec<SimEvent>,
) {
    let dir = direction.signum();
    if dir == IVec2::ZERO {
        return;
    }
    let Some(agent) = scene.agent(attacker) else {
        return;
    };
    let position = agent.position;
    let attack_power = agent.attack;
    let Some(weapon) = agent.weapons.get(slot) else {
        tracing::debug!(%attacker, slot, "attack order names a missing weapon slot");
        return;
    };
    if !weapon.is_ready() {
        return;
    }
    let raw_damage = weapon.damage + attack_power;
    let kind = weapon.kind;

    match kind {
        WeaponKind::Melee => {
            match combat::resolve_melee(scene, attacker, raw_damage, position + dir) {
                MeleeOutcome::Miss => {}
                MeleeOutcome::Hit {
                    victim,
                    applied,
                    remaining,
                    killed,
                } => {
                    tick.push(SimEvent::AgentDamaged {
                        target: victim,
                        attacker: Some(attacker),
                        amount: applied,
                        remaining,
                    });
                    if killed {
                        handle_death(scene, map, brains, defeated, victim, tick);
                    }
                }
            }
        }
        WeaponKind::Ranged { range, .. } => {
            let spawn_pos = position + dir;
            let bullet_id = scene.spawn(EntityInner::Bullet(BulletComponents::new(
                spawn_pos, dir, range, raw_damage, attacker,
            )));
            active_bullets.push(bullet_id);
            tick.push(SimEvent::EntityCreated {
                entity: bullet_id,
                tag: EntityTag::Bullet,
                position: spawn_pos,
            });
            if let Some(weapon) = scene
                .agent_mut(attacker)
                .and_then(|a| a.weapons.get_mut(slot))
            {
                weapon.arm_cooldown();
            }
            tracing::trace!(%attacker, bullet = %bullet_id, ?dir, "bullet fired");
        }
    }
}

/// Removes a dead agent: attributes the kill, vacates the cell, drops the
/// brain, and records the defeat.
fn handle_death(
    scene: &mut Scene,
    map: &mut ArenaMap,
    brains: &mut BTreeMap<EntityId, Box<dyn Brain>>,
    defeated: &mut Vec<AgentSummary>,
    victim: EntityId,
    tick: &mut Vec<SimEvent>,
) {
    let Some(entity) = scene.remove(victim) else {
        return;
    };
    let Some(agent) = entity.as_agent() else {
        return;
    };

    let killer = agent.recent_attackers.latest();
    let assists = agent.recent_attackers.others(killer);

    let _ = map.vacate(agent.position);
    if map.focus() == Some(victim) {
        let _ = map.set_focus(scene, None, true);
    }
    let _ = brains.remove(&victim);
    defeated.push(AgentSummary {
        id: victim,
        name: agent.name.clone(),
        team: agent.team,
        health: 0,
    });

    tick.push(SimEvent::AgentKilled {
        victim,
        killer,
        assists,
    });
    tick.push(SimEvent::EntityDestroyed { entity: victim });
    tracing::debug!(%victim, ?killer, "agent fell");
}

/// Removes a spent bullet from the scene and the active list.
fn despawn_bullet(
    scene: &mut Scene,
    active_bullets: &mut Vec<EntityId>,
    bullet_id: EntityId,
    tick: &mut Vec<SimEvent>,
) {
    let _ = scene.remove(bullet_id);
    active_bullets.retain(|b| *b != bullet_id);
    tick.push(SimEvent::EntityDestroyed { entity: bullet_id });
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, MapConfig, WeaponConfig};
    use crate::entity::TeamId;
    use crate::objective::ObjectiveSpec;

    fn steps_config(max_steps: u64) -> MatchConfig {
        MatchConfig {
            seed: 42,
            map: MapConfig::open(10, 10),
            agents: vec![
                AgentConfig::new("alpha", TeamId::new(0)).with_start(IVec2::new(2, 2)),
                AgentConfig::new("bravo", TeamId::new(1)).with_start(IVec2::new(7, 7)),
            ],
            objective: ObjectiveSpec::steps(max_steps),
            mode: RunMode::Realtime,
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn new_simulation_is_uninitialized() {
            let sim = Simulation::new(1);
            assert_eq!(sim.state(), SimState::Uninitialized);
            assert_eq!(sim.seed(), 1);
            assert_eq!(sim.current_step(), 0);
        }

        #[test]
        fn initialize_builds_roster_and_fires_event() {
            let mut sim = Simulation::new(1);
            sim.initialize(&steps_config(5)).unwrap();

            assert_eq!(sim.state(), SimState::Initialized);
            assert_eq!(sim.entities_tagged(EntityTag::Agent).len(), 2);

            let events = sim.drain_events();
            assert!(events.contains(&SimEvent::Initialized));
        }

        #[test]
        fn initialize_twice_is_an_error() {
            let mut sim = Simulation::new(1);
            sim.initialize(&steps_config(5)).unwrap();

            let err = sim.initialize(&steps_config(5)).unwrap_err();
            assert!(matches!(err, SimError::InvalidState { .. }));
        }

        #[test]
        fn empty_roster_fails_fast() {
            let mut config = steps_config(5);
            config.agents.clear();

            let mut sim = Simulation::new(1);
            assert_eq!(sim.initialize(&config), Err(SimError::EmptyRoster));
        }

        #[test]
        fn fixed_start_on_occupied_cell_fails_fast() {
            let mut config = steps_config(5);
            config.agents[1] = AgentConfig::new("clone", TeamId::new(1))
                .with_start(IVec2::new(2, 2));

            let mut sim = Simulation::new(1);
            assert!(matches!(
                sim.initialize(&config),
                Err(SimError::InvalidStart { .. })
            ));
        }

        #[test]
        fn start_before_initialize_is_an_error() {
            let mut sim = Simulation::new(1);
            assert!(matches!(
                sim.start(),
                Err(SimError::InvalidState { .. })
            ));
        }

        #[test]
        fn pause_and_resume_gate_updates() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            sim.start().unwrap();

            sim.update(NOMINAL_DT);
            assert_eq!(sim.current_step(), 1);

            sim.pause();
            assert_eq!(sim.state(), SimState::Paused);
            sim.update(NOMINAL_DT);
            assert_eq!(sim.current_step(), 1, "paused ticks must not advance");

            sim.resume();
            sim.update(NOMINAL_DT);
            assert_eq!(sim.current_step(), 2);
        }

        #[test]
        fn stop_is_idempotent() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            sim.start().unwrap();
            sim.update(NOMINAL_DT);

            sim.stop();
            assert_eq!(sim.state(), SimState::Stopped);
            let stops_before = sim
                .drain_events()
                .iter()
                .filter(|e| matches!(e, SimEvent::Stopped(_)))
                .count();
            assert_eq!(stops_before, 1);

            sim.stop();
            assert!(sim.drain_events().is_empty());
        }

        #[test]
        fn update_after_stop_is_a_noop() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            sim.start().unwrap();
            sim.stop();

            sim.update(NOMINAL_DT);
            assert_eq!(sim.current_step(), 0);
        }
    }

    mod movement_tests {
        use super::*;

        #[test]
        fn process_movement_moves_one_cell() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            sim.start().unwrap();
            let alpha = sim.entity_at(IVec2::new(2, 2)).unwrap();

            let moved = sim.process_movement(alpha, IVec2::new(1, 0)).unwrap();

            assert!(moved);
            assert_eq!(sim.entity(alpha).unwrap().position(), IVec2::new(3, 2));
            let map = sim.map().unwrap();
            assert!(map.is_walkable(IVec2::new(2, 2)));
            assert!(!map.is_walkable(IVec2::new(3, 2)));
        }

        #[test]
        fn process_movement_unknown_entity_fails_fast() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            sim.start().unwrap();

            let err = sim
                .process_movement(EntityId::new(404), IVec2::new(1, 0))
                .unwrap_err();
            assert_eq!(err, SimError::UnknownEntity(EntityId::new(404)));
        }

        #[test]
        fn process_movement_before_start_is_ordinary_failure() {
            let mut sim = Simulation::from_config(&steps_config(100)).unwrap();
            let alpha = sim.entity_at(IVec2::new(2, 2)).unwrap();

            assert_eq!(sim.process_movement(alpha, IVec2::new(1, 0)), Ok(false));
        }

        #[test]
        fn blocked_movement_is_ordinary_failure() {
            let mut config = steps_config(100);
            config.map.walls.push(IVec2::new(3, 2));
            let mut sim = Simulation::from_config(&config).unwrap();
            sim.start().unwrap();
            let alpha = sim.entity_at(IVec2::new(2, 2)).unwrap();

            assert_eq!(sim.process_movement(alpha, IVec2::new(1, 0)), Ok(false));
        }
    }

    mod objective_tests {
        use super::*;

        #[test]
        fn steps_objective_stops_offline_run() {
            let mut config = steps_config(5);
            config.mode = RunMode::Offline;

            let mut sim = Simulation::from_config(&config).unwrap();
            sim.start().unwrap();

            assert!(!sim.is_running());
            assert_eq!(sim.state(), SimState::Stopped);

            let summary = sim.summary().unwrap();
            assert_eq!(summary.step, 5);
            assert_eq!(summary.reason, StopReason::ObjectiveComplete);
            assert_eq!(
                summary.report,
                crate::report::ObjectiveReport::Steps {
                    steps: 5,
                    max_steps: 5,
                }
            );
        }

        #[test]
        fn stop_summary_lists_survivors() {
            let mut config = steps_config(3);
            config.mode = RunMode::Offline;

            let mut sim = Simulation::from_config(&config).unwrap();
            sim.start().unwrap();

            let summary = sim.summary().unwrap();
            assert_eq!(summary.survivors.len(), 2);
            assert!(summary.defeated.is_empty());
        }
    }

    mod determinism_tests {
        use super::*;
        use crate::brain::BrainKind;

        fn wander_config(seed: u64) -> MatchConfig {
            MatchConfig {
                seed,
                map: MapConfig::open(12, 12),
                agents: vec![
                    AgentConfig::new("w0", TeamId::new(0)).with_brain(BrainKind::Wander),
                    AgentConfig::new("w1", TeamId::new(1)).with_brain(BrainKind::Wander),
                ],
                objective: ObjectiveSpec::steps(25),
                mode: RunMode::Offline,
            }
        }

        fn final_positions(seed: u64) -> Vec<IVec2> {
            let mut sim = Simulation::from_config(&wander_config(seed)).unwrap();
            sim.start().unwrap();
            sim.scene().agents().map(|(_, a)| a.position).collect()
        }

        #[test]
        fn same_seed_same_run() {
            assert_eq!(final_positions(1234), final_positions(1234));
        }

        #[test]
        fn different_seed_diverges() {
            // Two wandering agents over 25 ticks virtually never coincide
            assert_ne!(final_positions(1), final_positions(2));
        }
    }

    mod combat_tests {
        use super::*;

        #[test]
        fn ranged_attack_spawns_tracked_bullet() {
            let mut config = steps_config(100);
            config.agents[0] = AgentConfig::new("gunner", TeamId::new(0))
                .with_start(IVec2::new(2, 2))
                .with_weapon(WeaponConfig::ranged(10, 5, 1.0, 1.0));
            let mut sim = Simulation::from_config(&config).unwrap();
            sim.start().unwrap();
            let gunner = sim.entity_at(IVec2::new(2, 2)).unwrap();

            // Drive the attack through the brain seam
            sim.set_brain(gunner, Box::new(FireEastOnce::default()))
                .unwrap();
            sim.update(NOMINAL_DT);

            let bullets = sim.entities_tagged(EntityTag::Bullet);
            assert_eq!(bullets.len(), 1);
            // Spawned at (3,2), advanced once in the same tick
            assert_eq!(
                sim.entity(bullets[0]).unwrap().position(),
                IVec2::new(4, 2)
            );
        }

        /// Brain that fires weapon slot 0 east on its first tick, then holds.
        #[derive(Debug, Default)]
        struct FireEastOnce {
            fired: bool,
        }

        impl Brain for FireEastOnce {
            fn think(&mut self, _view: &BrainView<'_>, _rng: &mut ChaCha8Rng) -> Intent {
                if self.fired {
                    Intent::hold()
                } else {
                    self.fired = true;
                    Intent {
                        movement: IVec2::ZERO,
                        attack: Some(crate::brain::AttackOrder {
                            slot: 0,
                            direction: IVec2::new(1, 0),
                        }),
                    }
                }
            }
        }
    }
}
