//! Event System
//!
//! Events allow decoupled communication between game systems.
//! Instead of systems directly calling each other, they send events
//! that other systems can listen to.
//!
//! Example flow:
//! 1. Physics step reports a contact → sends CollisionEvent
//! 2. Damage system reads CollisionEvent → reduces breakable health
//! 3. Dispatcher fans the same CollisionEvent out to listeners
//!
//! Each system handles its own concern without knowing about the others.

use super::entity::Entity;

/// A queue for events of a single type.
/// Events are collected during the frame and drained at specific points.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Check if there are any events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events in queue
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all game events.
/// Add new event types as fields here.
pub struct Events {
    /// Collision between two entities, reported by the physics step
    pub collision: EventQueue<CollisionEvent>,

    /// UI and gameplay actions (buttons, level flow)
    pub action: EventQueue<GameAction>,
}

impl Events {
    pub fn new() -> Self {
        Self {
            collision: EventQueue::new(),
            action: EventQueue::new(),
        }
    }

    /// Clear all event queues. Call at end of frame.
    pub fn clear_all(&mut self) {
        self.collision.clear();
        self.action.clear();
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// Two entities collided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First entity
    pub entity_a: Entity,
    /// Second entity
    pub entity_b: Entity,
}

/// A game-flow action requested by UI or gameplay code. Buttons carry one of
/// these instead of a callback; the app drains them after the update pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    StartGame,
    RetryLevel,
    NextLevel,
    MainMenu,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.collision.send(CollisionEvent {
            entity_a: Entity::default(),
            entity_b: Entity::default(),
        });
        events.action.send(GameAction::RetryLevel);

        assert_eq!(events.collision.len(), 1);
        assert_eq!(events.action.len(), 1);

        events.clear_all();
        assert!(events.collision.is_empty());
        assert!(events.action.is_empty());
    }
}
