//! Game Components
//!
//! Plain data structs attached to entities - behavior lives in systems
//! (`systems.rs`, `launcher.rs`, `ability.rs`). Physics handles stored here
//! are non-owning references into the `PhysicsWorld`; the reap pass in the
//! game context releases the underlying bodies.

use macroquad::prelude::{Color, Vec2, WHITE};
use rapier2d::prelude::RigidBodyHandle;

use crate::assets::Assets;

/// Pixels covered by one unit of transform scale, for shapes and sprites.
pub const SPRITE_UNIT: f32 = 60.0;

// =============================================================================
// Transform
// =============================================================================

/// 2D transform in screen space: pixels, degrees.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in degrees (matches the renderer's convention)
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: Vec2::new(0.5, 0.5),
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// On-screen size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        self.scale * SPRITE_UNIT
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec2::ZERO)
    }
}

// =============================================================================
// Physics-facing components
// =============================================================================

/// Rigid body wrapper: the handle into the physics world plus the gameplay
/// parameters the body was built with. `mass` mirrors the body's exact mass
/// (colliders are massless by construction).
#[derive(Debug, Clone, Copy)]
pub struct RigidBody {
    pub handle: RigidBodyHandle,
    pub mass: f32,
    pub gravity_scale: f32,
    pub restitution: f32,
    pub max_speed: f32,
    /// Whether gravity currently applies (launcher suppresses it while armed)
    pub gravity_on: bool,
}

/// Collision shape attached to a rigid body. Dimensions are in physics
/// meters, already scaled by the owner's transform at attach time.
#[derive(Debug, Clone, Copy)]
pub enum ColliderShape {
    Box { half_extents: Vec2 },
    Circle { radius: f32, offset: Vec2 },
}

/// The collider capability: entities with this component receive collision
/// notifications straight from the physics contact poll, so the generic
/// collision fan-out must not deliver to them a second time.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub shape: ColliderShape,
}

// =============================================================================
// Visuals
// =============================================================================

/// Solid-color rectangle visual.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRenderer {
    pub color: Color,
}

impl ShapeRenderer {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Textured sprite visual. Construction fails hard if the texture was not
/// loaded - rendering cannot proceed without it.
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    pub path: String,
    pub tint: Color,
}

impl SpriteRenderer {
    pub fn new(assets: &Assets, path: &str) -> Result<Self, String> {
        if !assets.has_texture(path) {
            return Err(format!("Texture not loaded: {}", path));
        }
        Ok(Self {
            path: path.to_string(),
            tint: WHITE,
        })
    }
}

/// Screen text attached to an entity's position.
#[derive(Debug, Clone)]
pub struct TextLabel {
    pub text: String,
    pub font_size: u16,
    pub color: Color,
}

impl TextLabel {
    pub fn new(text: &str, font_size: u16, color: Color) -> Self {
        Self {
            text: text.to_string(),
            font_size,
            color,
        }
    }
}

/// Clickable button. Actions are a closed set routed through the event
/// queues rather than stored closures.
#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub size: Vec2,
    pub color: Color,
    pub text_color: Color,
    pub action: super::event::GameAction,
}

// =============================================================================
// Gameplay
// =============================================================================

/// Takes collision damage and dies at zero health. Damage per hit is the
/// impactor's `speed * mass` when the speed exceeds the config threshold.
#[derive(Debug, Clone, Copy)]
pub struct Breakable {
    pub max_health: f32,
    pub health: f32,
}

impl Breakable {
    pub fn new(max_health: f32) -> Self {
        Self {
            max_health,
            health: max_health,
        }
    }

    /// Apply damage, clamped at zero. Returns true if this hit was lethal.
    pub fn damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }

    /// Remaining health fraction in [0, 1].
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }
}

/// Marker for pig entities; the level is complete when none remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pig;

/// Steers the body toward the pointer while the left button is held
/// (boss-fight behavior).
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowMouse {
    pub clicking: bool,
    pub pointer: Vec2,
}

// =============================================================================
// Timer
// =============================================================================

/// Simple countdown polled once per frame. Drives the launcher's respawn
/// delay.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    duration: f32,
    remaining: f32,
    running: bool,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.running && self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    /// Start (or restart) the countdown from the full duration.
    pub fn start(&mut self) {
        self.running = true;
        self.remaining = self.duration;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Stop and rewind to the full duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn elapsed(&self) -> f32 {
        self.duration - self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_countdown() {
        let mut timer = Timer::new(1.0);
        assert!(!timer.is_running());
        // Not started yet: updates do nothing
        timer.update(0.5);
        assert_eq!(timer.remaining(), 1.0);

        timer.start();
        timer.update(0.4);
        assert!(timer.is_running());
        assert!(!timer.is_finished());
        assert!((timer.remaining() - 0.6).abs() < 1e-6);
        assert!((timer.elapsed() - 0.4).abs() < 1e-6);

        timer.update(0.7);
        assert!(timer.is_finished());
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_timer_pause_resume_reset() {
        let mut timer = Timer::new(2.0);
        timer.start();
        timer.update(1.0);
        timer.pause();
        timer.update(5.0);
        assert!((timer.remaining() - 1.0).abs() < 1e-6);

        timer.resume();
        timer.update(0.25);
        assert!((timer.remaining() - 0.75).abs() < 1e-6);

        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 2.0);
    }

    #[test]
    fn test_breakable_damage_and_death() {
        let mut breakable = Breakable::new(30.0);
        assert!(!breakable.damage(10.0));
        assert_eq!(breakable.health, 20.0);
        assert!((breakable.health_fraction() - 2.0 / 3.0).abs() < 1e-6);

        assert!(breakable.damage(25.0));
        assert_eq!(breakable.health, 0.0);
    }

    #[test]
    fn test_transform_pixel_size() {
        let transform = Transform::from_position(Vec2::ZERO);
        assert_eq!(transform.pixel_size(), Vec2::new(30.0, 30.0));

        let scaled = transform.with_scale(Vec2::new(1.5, 1.5));
        assert_eq!(scaled.pixel_size(), Vec2::new(90.0, 90.0));
    }
}
