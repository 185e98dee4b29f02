//! Input Dispatcher
//!
//! Registry of entities that want raw input events (mouse presses, moves,
//! releases). Listeners are a closed set: each variant names the system that
//! consumes the event, and the context routes a snapshot of the registry per
//! event so listeners may unregister themselves mid-dispatch.

use super::entity::Entity;

/// Which system handles input for a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Slingshot launcher: drag and release
    Launcher,
    /// Mouse-steered body (boss fight)
    FollowMouse,
    /// Clickable UI button
    Button,
}

/// Ordered listener registry. Delivery order is registration order, which
/// keeps input handling deterministic across frames.
#[derive(Debug, Default)]
pub struct Dispatcher {
    listeners: Vec<(Entity, Listener)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    /// Register an entity for a listener kind. Re-registering the same pair
    /// is a no-op so systems can register idempotently on scene start.
    pub fn register(&mut self, entity: Entity, listener: Listener) {
        if !self.listeners.contains(&(entity, listener)) {
            self.listeners.push((entity, listener));
        }
    }

    /// Remove one (entity, listener) pair. Missing pairs are ignored.
    pub fn unregister(&mut self, entity: Entity, listener: Listener) {
        self.listeners.retain(|pair| *pair != (entity, listener));
    }

    /// Remove every registration for an entity (despawn path).
    pub fn unregister_all(&mut self, entity: Entity) {
        self.listeners.retain(|(registered, _)| *registered != entity);
    }

    pub fn is_registered(&self, entity: Entity, listener: Listener) -> bool {
        self.listeners.contains(&(entity, listener))
    }

    pub fn has_any(&self, entity: Entity) -> bool {
        self.listeners.iter().any(|(registered, _)| *registered == entity)
    }

    /// Copy of the registry for iteration. Handlers run against the snapshot,
    /// so a handler that unregisters entities does not invalidate delivery of
    /// the current event.
    pub fn snapshot(&self) -> Vec<(Entity, Listener)> {
        self.listeners.clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
