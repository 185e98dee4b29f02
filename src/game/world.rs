//! Game World
//!
//! The World is the central container for all game state:
//! - Entity allocation and lifetime tracking
//! - Component storage for all component types
//! - Deferred entity despawn (to avoid iterator invalidation)
//!
//! Component types are defined at compile time as typed fields rather than
//! a HashMap<TypeId, ...> registry. This is simpler and sufficient for the
//! known set of game components.
//!
//! Despawn is two-phase: `despawn()` only marks, and the context reaps the
//! queue after the frame's systems have run, releasing physics bodies and
//! dispatcher registrations before the component slots are cleared.

use macroquad::prelude::Vec2;

use super::ability::Ability;
use super::component::ComponentStorage;
use super::components::*;
use super::entity::{Entity, EntityAllocator};
use super::launcher::Launcher;

/// The game world containing all entities and their components.
pub struct World {
    /// Entity allocator for creating/destroying entities
    entities: EntityAllocator,

    /// Every live entity, in spawn order. Scene setup and teardown walk
    /// this list; removal keeps order (swap_remove would break it).
    live: Vec<Entity>,

    /// Entities queued for despawn, reaped by the context at end of frame
    despawn_queue: Vec<Entity>,

    // =========================================================================
    // Core Components
    // =========================================================================

    /// Screen-space transform (pixels, degrees)
    pub transforms: ComponentStorage<Transform>,

    /// Debug name, shown in logs
    pub names: ComponentStorage<String>,

    // =========================================================================
    // Physics Components
    // =========================================================================

    /// Rigid body handle and parameters
    pub rigid_bodies: ComponentStorage<RigidBody>,

    /// Collision shape; entities with this receive collision events
    pub colliders: ComponentStorage<Collider>,

    // =========================================================================
    // Visual Components
    // =========================================================================

    /// Solid-color rectangle
    pub shapes: ComponentStorage<ShapeRenderer>,

    /// Textured sprite
    pub sprites: ComponentStorage<SpriteRenderer>,

    /// Text drawn at the entity's position
    pub labels: ComponentStorage<TextLabel>,

    /// Clickable UI button
    pub buttons: ComponentStorage<Button>,

    // =========================================================================
    // Gameplay Components
    // =========================================================================

    /// Slingshot launcher state machine
    pub launchers: ComponentStorage<Launcher>,

    /// Bird ability (double mass, boost, split)
    pub abilities: ComponentStorage<Ability>,

    /// Health that collision damage chips away
    pub breakables: ComponentStorage<Breakable>,

    /// Marks pig entities; zero pigs completes the level
    pub pigs: ComponentStorage<Pig>,

    /// Mouse-steered movement
    pub follow_mouse: ComponentStorage<FollowMouse>,

    /// Countdown timers
    pub timers: ComponentStorage<Timer>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            live: Vec::new(),
            despawn_queue: Vec::new(),

            transforms: ComponentStorage::new(),
            names: ComponentStorage::new(),

            rigid_bodies: ComponentStorage::new(),
            colliders: ComponentStorage::new(),

            shapes: ComponentStorage::new(),
            sprites: ComponentStorage::new(),
            labels: ComponentStorage::new(),
            buttons: ComponentStorage::new(),

            launchers: ComponentStorage::new(),
            abilities: ComponentStorage::new(),
            breakables: ComponentStorage::new(),
            pigs: ComponentStorage::new(),
            follow_mouse: ComponentStorage::new(),
            timers: ComponentStorage::new(),
        }
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Spawn a new entity with a default transform.
    /// Returns the entity ID for adding more components.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.entities.allocate();
        self.transforms.insert(entity, Transform::default());
        self.live.push(entity);
        entity
    }

    /// Spawn a new entity at a specific position.
    pub fn spawn_at(&mut self, position: Vec2) -> Entity {
        let entity = self.entities.allocate();
        self.transforms.insert(entity, Transform::from_position(position));
        self.live.push(entity);
        entity
    }

    /// Queue an entity for despawn. The context reaps the queue at end of
    /// frame, after physics handles and listeners have been released.
    /// Marking twice is harmless.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Take the current despawn queue. Reaping a launcher can mark further
    /// entities, so the reap loop calls this until it comes back empty.
    pub fn take_despawns(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.despawn_queue)
    }

    pub fn has_pending_despawns(&self) -> bool {
        !self.despawn_queue.is_empty()
    }

    /// Free the entity slot and clear every component it held. Callers must
    /// have released physics handles and dispatcher registrations first;
    /// this only touches world-side state.
    pub fn despawn_immediate(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return; // Already dead
        }
        self.live.retain(|&e| e != entity);
        self.clear_components(entity);
    }

    /// Clear every component slot for an entity without freeing it.
    pub fn clear_components(&mut self, entity: Entity) {
        let idx = entity.index();
        self.transforms.clear_slot(idx);
        self.names.clear_slot(idx);
        self.rigid_bodies.clear_slot(idx);
        self.colliders.clear_slot(idx);
        self.shapes.clear_slot(idx);
        self.sprites.clear_slot(idx);
        self.labels.clear_slot(idx);
        self.buttons.clear_slot(idx);
        self.launchers.clear_slot(idx);
        self.abilities.clear_slot(idx);
        self.breakables.clear_slot(idx);
        self.pigs.clear_slot(idx);
        self.follow_mouse.clear_slot(idx);
        self.timers.clear_slot(idx);
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Get the number of alive entities.
    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// All live entities in spawn order.
    pub fn live_entities(&self) -> &[Entity] {
        &self.live
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of pigs still standing.
    pub fn pig_count(&self) -> usize {
        self.pigs.count()
    }

    /// Debug name for an entity, or a placeholder.
    pub fn name_of(&self, entity: Entity) -> &str {
        self.names.get(entity).map(String::as_str).unwrap_or("<unnamed>")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_despawn() {
        let mut world = World::new();

        let e1 = world.spawn();
        let e2 = world.spawn_at(Vec2::new(100.0, 200.0));
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.live_entities(), &[e1, e2]);
        assert_eq!(world.transforms.get(e2).unwrap().position, Vec2::new(100.0, 200.0));

        world.despawn_immediate(e1);
        assert_eq!(world.entity_count(), 1);
        assert!(!world.is_alive(e1));
        assert!(world.is_alive(e2));
        assert_eq!(world.live_entities(), &[e2]);
    }

    #[test]
    fn test_despawn_is_deferred() {
        let mut world = World::new();
        let entity = world.spawn();

        world.despawn(entity);
        world.despawn(entity); // double-mark collapses to one entry
        assert!(world.is_alive(entity));
        assert!(world.has_pending_despawns());

        let queue = world.take_despawns();
        assert_eq!(queue, vec![entity]);
        assert!(!world.has_pending_despawns());

        world.despawn_immediate(entity);
        assert!(!world.is_alive(entity));
    }

    #[test]
    fn test_despawn_clears_components() {
        let mut world = World::new();
        let entity = world.spawn();
        world.pigs.insert(entity, Pig);
        world.breakables.insert(entity, Breakable::new(20.0));
        world.names.insert(entity, "piggy".to_string());
        assert_eq!(world.pig_count(), 1);

        world.despawn_immediate(entity);
        assert_eq!(world.pig_count(), 0);
        assert!(!world.breakables.contains(entity));
        assert_eq!(world.name_of(entity), "<unnamed>");
    }

    #[test]
    fn test_stale_entity_lookup_is_none() {
        let mut world = World::new();
        let old = world.spawn();
        world.pigs.insert(old, Pig);
        world.despawn_immediate(old);

        // The recycled slot must not expose the old entity's components
        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert!(!world.pigs.contains(new));
        assert!(world.pigs.get(old).is_none());
    }
}
