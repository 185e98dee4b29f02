//! Game Context
//!
//! Everything a frame touches lives here: config, assets, the entity world,
//! the physics world, the input dispatcher and the event queues. Systems
//! take `&mut GameContext` and borrow the fields they need, which keeps the
//! update loop free of globals.
//!
//! The context also owns the entity lifecycle across subsystems: despawn is
//! a mark in the world, and `reap` releases physics bodies and dispatcher
//! registrations before the world frees the slot.

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::input::{InputEvent, InputSnapshot};

use super::ability;
use super::dispatcher::{Dispatcher, Listener};
use super::entity::Entity;
use super::event::{CollisionEvent, Events};
use super::launcher::{self, LauncherPhase};
use super::physics::PhysicsWorld;
use super::systems;
use super::world::World;

pub struct GameContext {
    pub config: GameConfig,
    pub assets: Assets,
    pub world: World,
    pub physics: PhysicsWorld,
    pub dispatcher: Dispatcher,
    pub events: Events,
}

impl GameContext {
    pub fn new(config: GameConfig, assets: Assets) -> Self {
        let physics = PhysicsWorld::new(config.gravity);
        Self {
            config,
            assets,
            world: World::new(),
            physics,
            dispatcher: Dispatcher::new(),
            events: Events::new(),
        }
    }

    /// Advance the game by one frame.
    ///
    /// Order matters: input first so a release launches into this frame's
    /// physics step rather than the next, then physics, then the per-frame
    /// systems, and finally the reap of everything marked dead along the
    /// way. `GameAction` events survive the frame for the app to drain.
    pub fn update(&mut self, dt: f32, input: &[InputEvent], snapshot: InputSnapshot) {
        let mut mouse_pressed = false;
        for &event in input {
            if matches!(event, InputEvent::MouseDown(_)) {
                mouse_pressed = true;
            }
            self.route_input(event);
        }

        systems::update_timers(self, dt);

        self.physics.step(
            dt,
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
        for contact in self.physics.drain_contacts() {
            self.events.collision.send(CollisionEvent {
                entity_a: contact.a,
                entity_b: contact.b,
            });
        }

        systems::sync_transforms(self);
        systems::apply_collision_damage(self);

        let launcher_entities: Vec<Entity> = self
            .world
            .live_entities()
            .iter()
            .copied()
            .filter(|&e| self.world.launchers.contains(e))
            .collect();
        for entity in launcher_entities {
            launcher::update(self, entity);
        }

        systems::update_follow_mouse(self, snapshot, dt);
        ability::update_abilities(self, mouse_pressed);
        systems::update_damage_tints(self);

        self.reap();
        self.events.collision.clear();
    }

    /// Deliver one input event to every registered listener. Listeners run
    /// against a snapshot of the registry, so handlers may unregister
    /// entities (or despawn them) without disturbing delivery.
    fn route_input(&mut self, event: InputEvent) {
        for (entity, listener) in self.dispatcher.snapshot() {
            if !self.world.is_alive(entity) {
                continue;
            }
            match listener {
                Listener::Launcher => launcher::handle_event(self, entity, event),
                Listener::FollowMouse => systems::follow_mouse_event(self, entity, event),
                Listener::Button => systems::button_event(self, entity, event),
            }
        }
    }

    /// Process the despawn queue until it stays empty. Tearing a launcher
    /// down can mark its hanging bird, so one pass is not always enough.
    pub fn reap(&mut self) {
        while self.world.has_pending_despawns() {
            for entity in self.world.take_despawns() {
                self.release_entity(entity);
                self.world.despawn_immediate(entity);
            }
        }
    }

    /// Strip an entity of everything the world does not own: physics body
    /// and colliders, sling tether, input registrations. Component slots
    /// are left for the caller.
    fn release_entity(&mut self, entity: Entity) {
        if self.world.launchers.contains(entity) {
            launcher::teardown(self, entity);
        }
        if let Some(rb) = self.world.rigid_bodies.get(entity) {
            self.physics.remove_body(rb.handle);
        }
        self.dispatcher.unregister_all(entity);
    }

    /// Detach every capability from a live entity: after this, component
    /// lookups return None and the dispatcher no longer knows it, but the
    /// entity slot itself stays allocated.
    pub fn detach_all(&mut self, entity: Entity) {
        if !self.world.is_alive(entity) {
            return;
        }
        self.release_entity(entity);
        self.world.clear_components(entity);
    }

    /// Despawn every entity immediately and drop pending events. Scene
    /// transitions call this before building the next scene.
    pub fn clear_scene(&mut self) {
        for entity in self.world.live_entities().to_vec() {
            self.world.despawn(entity);
        }
        self.reap();
        self.events.clear_all();
    }

    /// The level is won when no pigs remain.
    pub fn level_complete(&self) -> bool {
        self.world.pig_count() == 0
    }

    /// The level is lost when pigs remain but nothing can still reach them:
    /// every launcher is out of throws and every bird has come to rest.
    /// Levels without a launcher never fail this way.
    pub fn level_failed(&self) -> bool {
        if self.world.pig_count() == 0 {
            return false;
        }

        let mut any_launcher = false;
        for &entity in self.world.live_entities() {
            if let Some(l) = self.world.launchers.get(entity) {
                any_launcher = true;
                if l.can_throw(self.config.max_throws) || l.phase == LauncherPhase::Launched {
                    return false;
                }
            }
        }
        if !any_launcher {
            return false;
        }

        for &entity in self.world.live_entities() {
            if self.world.abilities.contains(entity) {
                if let Some(rb) = self.world.rigid_bodies.get(entity) {
                    if self.physics.speed(rb.handle) > 0.5 {
                        return false;
                    }
                }
            }
        }
        true
    }
}
