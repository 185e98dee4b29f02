//! Slingshot Launcher
//!
//! The launcher owns a four-phase state machine per slingshot:
//!
//!   Idle -> Armed -> Dragging -> Launched -> (timer) -> Armed or Idle
//!
//! While armed, the current bird hangs from a transient static anchor body
//! through a soft spring joint and feels no gravity. Any pointer press
//! enters Dragging; the bird is pinned to the pointer, clamped to a maximum
//! pull distance from the anchor. Release destroys the tether, restores
//! gravity and applies an impulse along the pull direction whose magnitude
//! is the squared pull length, capped, times a fixed multiplier. After a
//! delay the launcher re-arms with a fresh bird until the throw budget is
//! spent.

use macroquad::prelude::Vec2;
use rapier2d::prelude::{ImpulseJointHandle, RigidBodyHandle};

use super::ability;
use super::context::GameContext;
use super::dispatcher::Listener;
use super::entity::Entity;
use crate::input::InputEvent;

/// Spawns one bird at a position, returning None on failure (e.g. a missing
/// texture). Scenes pick the factory; the launcher only calls it.
pub type BirdFactory = fn(&mut GameContext, Vec2, &str) -> Option<Entity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherPhase {
    /// Throw budget spent, nothing to launch
    Idle,
    /// A bird hangs on the sling, waiting to be grabbed
    Armed,
    /// The player is pulling the bird back
    Dragging,
    /// Bird in flight, respawn timer running
    Launched,
}

/// Slingshot state attached to a launcher entity. The entity also carries a
/// `Timer` for the respawn delay.
pub struct Launcher {
    pub phase: LauncherPhase,
    /// Sling rest position in pixels; birds spawn and launch from here
    pub anchor: Vec2,
    /// Last clamped drag position, only meaningful while Dragging
    pub drag: Vec2,
    pub current_bird: Option<Entity>,
    /// Static body the sling joint tethers to, alive only while a bird hangs
    pub anchor_body: Option<RigidBodyHandle>,
    pub sling_joint: Option<ImpulseJointHandle>,
    pub thrown: u32,
    pub factory: BirdFactory,
    pub bird_sprite: String,
}

impl Launcher {
    pub fn new(anchor: Vec2, factory: BirdFactory, bird_sprite: &str) -> Self {
        Self {
            phase: LauncherPhase::Idle,
            anchor,
            drag: anchor,
            current_bird: None,
            anchor_body: None,
            sling_joint: None,
            thrown: 0,
            factory,
            bird_sprite: bird_sprite.to_string(),
        }
    }

    /// Whether this launcher can still produce a throw.
    pub fn can_throw(&self, max_throws: u32) -> bool {
        self.thrown < max_throws
            || matches!(self.phase, LauncherPhase::Armed | LauncherPhase::Dragging)
    }
}

/// Register the launcher for input and arm it with its first bird. Called
/// once when the scene is built; the launcher entity must already carry its
/// `Launcher` and `Timer` components.
pub fn start(ctx: &mut GameContext, entity: Entity) {
    ctx.dispatcher.register(entity, Listener::Launcher);
    spawn_bird(ctx, entity);
}

/// Arm the launcher with a fresh bird: spawn it at the anchor, suppress its
/// gravity and tether it to a transient static anchor body. Does nothing
/// once the throw budget is spent, so calling at the cap is harmless.
pub fn spawn_bird(ctx: &mut GameContext, entity: Entity) {
    let Some(mut launcher) = ctx.world.launchers.remove(entity) else {
        return;
    };

    if launcher.thrown >= ctx.config.max_throws || launcher.current_bird.is_some() {
        ctx.world.launchers.insert(entity, launcher);
        return;
    }

    let bird = (launcher.factory)(ctx, launcher.anchor, &launcher.bird_sprite);
    let Some(bird) = bird else {
        eprintln!("Launcher could not spawn a bird, staying idle");
        launcher.phase = LauncherPhase::Idle;
        ctx.world.launchers.insert(entity, launcher);
        return;
    };

    if let Some(rb) = ctx.world.rigid_bodies.get_mut(bird) {
        rb.gravity_on = false;
        ctx.physics.set_gravity_scale(rb.handle, 0.0);

        let anchor_body = ctx.physics.create_static_body(launcher.anchor);
        launcher.sling_joint = ctx.physics.create_sling_joint(
            rb.handle,
            anchor_body,
            ctx.config.sling_stiffness,
            ctx.config.sling_damping,
        );
        launcher.anchor_body = Some(anchor_body);
    }

    launcher.current_bird = Some(bird);
    launcher.phase = LauncherPhase::Armed;
    ctx.world.launchers.insert(entity, launcher);
}

/// Route one input event to this launcher.
pub fn handle_event(ctx: &mut GameContext, entity: Entity, event: InputEvent) {
    let Some(mut launcher) = ctx.world.launchers.remove(entity) else {
        return;
    };

    match (launcher.phase, event) {
        (LauncherPhase::Armed, InputEvent::MouseDown(pos)) => {
            launcher.phase = LauncherPhase::Dragging;
            launcher.drag = clamp_pull(launcher.anchor, pos, ctx.config.max_pull_distance);
            pin_bird(ctx, &launcher);
        }
        (LauncherPhase::Dragging, InputEvent::MouseMove(pos)) => {
            launcher.drag = clamp_pull(launcher.anchor, pos, ctx.config.max_pull_distance);
            pin_bird(ctx, &launcher);
        }
        (LauncherPhase::Dragging, InputEvent::MouseUp(pos)) => {
            launcher.drag = clamp_pull(launcher.anchor, pos, ctx.config.max_pull_distance);
            launch(ctx, entity, &mut launcher);
        }
        _ => {}
    }

    ctx.world.launchers.insert(entity, launcher);
}

/// Per-frame launcher upkeep: keep a dragged bird pinned (physics would
/// otherwise drift it between events) and re-arm once the respawn timer
/// fires after a launch.
pub fn update(ctx: &mut GameContext, entity: Entity) {
    let Some(phase) = ctx.world.launchers.get(entity).map(|l| l.phase) else {
        return;
    };

    match phase {
        LauncherPhase::Dragging => {
            let Some(launcher) = ctx.world.launchers.remove(entity) else {
                return;
            };
            pin_bird(ctx, &launcher);
            ctx.world.launchers.insert(entity, launcher);
        }
        LauncherPhase::Launched => {
            let finished = ctx
                .world
                .timers
                .get(entity)
                .map(|t| t.is_finished())
                .unwrap_or(true);
            if finished {
                reset_launcher(ctx, entity);
            }
        }
        _ => {}
    }
}

/// Cycle after a throw: the spent bird's ability winds back and the bird is
/// destroyed, then the launcher either hangs a fresh bird on the sling or
/// goes idle at the throw cap.
pub fn reset_launcher(ctx: &mut GameContext, entity: Entity) {
    let old_bird = ctx
        .world
        .launchers
        .get_mut(entity)
        .and_then(|launcher| {
            launcher.phase = LauncherPhase::Idle;
            launcher.current_bird.take()
        });
    if let Some(bird) = old_bird {
        ability::reset(ctx, bird);
        ctx.world.despawn(bird);
    }
    if let Some(timer) = ctx.world.timers.get_mut(entity) {
        timer.reset();
    }
    spawn_bird(ctx, entity);
}

/// Release the launcher's physics objects and input registration. The reap
/// pass calls this when a launcher entity despawns; the current bird, on
/// the sling or in flight, despawns with it after its ability winds back.
pub fn teardown(ctx: &mut GameContext, entity: Entity) {
    let Some(launcher) = ctx.world.launchers.get_mut(entity) else {
        return;
    };

    if let Some(joint) = launcher.sling_joint.take() {
        ctx.physics.destroy_joint(joint);
    }
    let anchor_body = launcher.anchor_body.take();
    let bird = launcher.current_bird.take();

    if let Some(anchor_body) = anchor_body {
        ctx.physics.remove_body(anchor_body);
    }
    if let Some(bird) = bird {
        ability::reset(ctx, bird);
        ctx.world.despawn(bird);
    }
    ctx.dispatcher.unregister(entity, Listener::Launcher);
}

fn launch(ctx: &mut GameContext, entity: Entity, launcher: &mut Launcher) {
    let pull = launcher.anchor - launcher.drag;
    let magnitude = pull.length_squared().min(ctx.config.launch_force_cap)
        * ctx.config.launch_impulse_multiplier;

    if let Some(joint) = launcher.sling_joint.take() {
        ctx.physics.destroy_joint(joint);
    }
    if let Some(anchor_body) = launcher.anchor_body.take() {
        ctx.physics.remove_body(anchor_body);
    }

    if let Some(bird) = launcher.current_bird {
        if let Some(rb) = ctx.world.rigid_bodies.get_mut(bird) {
            rb.gravity_on = true;
            ctx.physics.set_gravity_scale(rb.handle, rb.gravity_scale);
            ctx.physics.zero_velocity(rb.handle);
            if magnitude > 0.0 && pull.length_squared() > f32::EPSILON {
                ctx.physics.apply_impulse(rb.handle, pull.normalize() * magnitude);
            }
        }
        if let Some(ability) = ctx.world.abilities.get_mut(bird) {
            ability.launched = true;
        }
    }

    launcher.thrown += 1;
    launcher.phase = LauncherPhase::Launched;
    if let Some(timer) = ctx.world.timers.get_mut(entity) {
        timer.start();
    }
}

/// Hold the bird at the clamped drag position with no residual velocity.
fn pin_bird(ctx: &mut GameContext, launcher: &Launcher) {
    let Some(bird) = launcher.current_bird else {
        return;
    };
    if let Some(rb) = ctx.world.rigid_bodies.get(bird) {
        ctx.physics.set_body_position_px(rb.handle, launcher.drag);
        ctx.physics.zero_velocity(rb.handle);
    }
    if let Some(transform) = ctx.world.transforms.get_mut(bird) {
        transform.position = launcher.drag;
    }
}

/// Clamp a pointer position to within `max_distance` pixels of the anchor.
fn clamp_pull(anchor: Vec2, pos: Vec2, max_distance: f32) -> Vec2 {
    let offset = pos - anchor;
    let distance = offset.length();
    if distance > max_distance {
        anchor + offset / distance * max_distance
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Assets;
    use crate::config::GameConfig;
    use crate::game::components::{Collider, ColliderShape, RigidBody, Timer};

    fn plain_bird(ctx: &mut GameContext, position: Vec2, _sprite: &str) -> Option<Entity> {
        let bird = ctx.world.spawn_at(position);
        let handle = ctx.physics.create_dynamic_body(bird, position, 1.0, 1.0);
        ctx.physics.attach_circle_collider(handle, 0.25, Vec2::ZERO, 0.5);
        ctx.world.colliders.insert(
            bird,
            Collider {
                shape: ColliderShape::Circle { radius: 0.25, offset: Vec2::ZERO },
            },
        );
        ctx.world.rigid_bodies.insert(
            bird,
            RigidBody {
                handle,
                mass: 1.0,
                gravity_scale: 1.0,
                restitution: 0.5,
                max_speed: 10.0,
                gravity_on: true,
            },
        );
        Some(bird)
    }

    fn armed_launcher(ctx: &mut GameContext, anchor: Vec2) -> Entity {
        let entity = ctx.world.spawn_at(anchor);
        ctx.world
            .launchers
            .insert(entity, Launcher::new(anchor, plain_bird, "bird.png"));
        ctx.world
            .timers
            .insert(entity, Timer::new(ctx.config.reset_delay));
        start(ctx, entity);
        entity
    }

    fn test_ctx() -> GameContext {
        GameContext::new(GameConfig::default(), Assets::empty())
    }

    #[test]
    fn test_start_arms_with_tethered_bird() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);

        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Armed);
        assert!(launcher.sling_joint.is_some());
        assert!(launcher.anchor_body.is_some());
        assert!(ctx.dispatcher.is_registered(entity, Listener::Launcher));

        let bird = launcher.current_bird.unwrap();
        let rb = ctx.world.rigid_bodies.get(bird).unwrap();
        assert!(!rb.gravity_on);
        // No gravity while armed: the bird stays put when physics steps
        ctx.physics.step(1.0 / 60.0, 8, 3);
        assert!(ctx.physics.velocity(rb.handle).length() < 0.05);
    }

    #[test]
    fn test_drag_is_clamped_to_max_pull() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);

        handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
        handle_event(&mut ctx, entity, InputEvent::MouseMove(Vec2::new(200.0, 750.0)));

        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Dragging);
        assert!((launcher.drag.distance(anchor) - 100.0).abs() < 1e-4);
        assert_eq!(launcher.drag, Vec2::new(200.0, 550.0));
    }

    #[test]
    fn test_any_press_starts_dragging() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);

        // A press far from the sling still grabs; the drag clamp reins the
        // bird in toward the anchor.
        handle_event(&mut ctx, entity, InputEvent::MouseDown(Vec2::new(500.0, 100.0)));
        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Dragging);
        assert!(launcher.drag.distance(anchor) <= ctx.config.max_pull_distance + 1e-4);
    }

    #[test]
    fn test_launch_applies_capped_impulse() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);
        let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();

        handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
        handle_event(&mut ctx, entity, InputEvent::MouseMove(Vec2::new(150.0, 500.0)));
        handle_event(&mut ctx, entity, InputEvent::MouseUp(Vec2::new(150.0, 500.0)));

        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Launched);
        assert_eq!(launcher.thrown, 1);
        assert!(launcher.sling_joint.is_none());
        assert!(launcher.anchor_body.is_none());

        // Pull (50, -50): squared length 5000 caps at 100, times 0.1 gives
        // an impulse of 10 along the normalized pull. Mass 1, so velocity
        // equals the impulse.
        let rb = ctx.world.rigid_bodies.get(bird).unwrap();
        assert!(rb.gravity_on);
        let velocity = ctx.physics.velocity(rb.handle);
        let expected = Vec2::new(50.0, -50.0).normalize() * 10.0;
        assert!((velocity - expected).length() < 1e-3, "velocity was {:?}", velocity);
    }

    #[test]
    fn test_zero_pull_release_applies_no_impulse() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);
        let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();

        // Grab and let go without moving: the throw counts but the bird
        // just drops from the anchor.
        handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
        handle_event(&mut ctx, entity, InputEvent::MouseUp(anchor));

        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Launched);
        assert_eq!(launcher.thrown, 1);
        let rb = ctx.world.rigid_bodies.get(bird).unwrap();
        assert!(rb.gravity_on);
        assert!(ctx.physics.velocity(rb.handle).length() < 1e-6);
    }

    #[test]
    fn test_impulse_grows_with_pull_until_the_cap() {
        let mut speeds = Vec::new();
        for pull in [3.0f32, 6.0, 9.0, 20.0, 50.0] {
            let mut ctx = test_ctx();
            let anchor = Vec2::new(200.0, 450.0);
            let entity = armed_launcher(&mut ctx, anchor);
            let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();

            handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
            handle_event(&mut ctx, entity, InputEvent::MouseUp(anchor + Vec2::new(0.0, pull)));

            let handle = ctx.world.rigid_bodies.get(bird).unwrap().handle;
            speeds.push(ctx.physics.speed(handle));
        }

        // Quadratic growth below the cap
        assert!(speeds[0] < speeds[1] && speeds[1] < speeds[2], "speeds {:?}", speeds);
        // Past the cap every pull launches equally hard
        assert!(speeds[2] <= speeds[3] + 1e-4);
        assert!((speeds[3] - speeds[4]).abs() < 1e-4, "speeds {:?}", speeds);
    }

    #[test]
    fn test_respawn_after_timer_until_cap() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);

        for throw in 1..=ctx.config.max_throws {
            handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
            handle_event(&mut ctx, entity, InputEvent::MouseMove(Vec2::new(150.0, 500.0)));
            handle_event(&mut ctx, entity, InputEvent::MouseUp(Vec2::new(150.0, 500.0)));
            assert_eq!(ctx.world.launchers.get(entity).unwrap().thrown, throw);

            // Run the respawn timer out
            ctx.world.timers.get_mut(entity).unwrap().update(10.0);
            update(&mut ctx, entity);
        }

        // Budget spent: launcher idles with no bird
        let launcher = ctx.world.launchers.get(entity).unwrap();
        assert_eq!(launcher.phase, LauncherPhase::Idle);
        assert!(launcher.current_bird.is_none());
        assert!(!launcher.can_throw(ctx.config.max_throws));

        // Every cycle destroyed the spent bird
        assert_eq!(ctx.world.take_despawns().len(), ctx.config.max_throws as usize);

        // Respawn at the cap is idempotent
        let before = ctx.world.entity_count();
        spawn_bird(&mut ctx, entity);
        spawn_bird(&mut ctx, entity);
        assert_eq!(ctx.world.entity_count(), before);
        assert_eq!(ctx.world.launchers.get(entity).unwrap().phase, LauncherPhase::Idle);
    }

    #[test]
    fn test_launch_marks_ability() {
        use crate::game::ability::{Ability, AbilityKind};

        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);
        let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();
        ctx.world.abilities.insert(bird, Ability::new(AbilityKind::DoubleMass));

        handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
        handle_event(&mut ctx, entity, InputEvent::MouseUp(anchor + Vec2::new(-30.0, 30.0)));

        assert!(ctx.world.abilities.get(bird).unwrap().launched);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);
        let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();

        teardown(&mut ctx, entity);
        assert!(!ctx.dispatcher.has_any(entity));
        assert!(ctx.world.launchers.get(entity).unwrap().sling_joint.is_none());
        // The unthrown bird is queued for despawn
        assert!(ctx.world.take_despawns().contains(&bird));
    }

    #[test]
    fn test_teardown_despawns_flying_bird() {
        let mut ctx = test_ctx();
        let anchor = Vec2::new(200.0, 450.0);
        let entity = armed_launcher(&mut ctx, anchor);
        let bird = ctx.world.launchers.get(entity).unwrap().current_bird.unwrap();

        handle_event(&mut ctx, entity, InputEvent::MouseDown(anchor));
        handle_event(&mut ctx, entity, InputEvent::MouseUp(anchor + Vec2::new(-40.0, 40.0)));
        assert_eq!(ctx.world.launchers.get(entity).unwrap().phase, LauncherPhase::Launched);

        teardown(&mut ctx, entity);
        assert!(ctx.world.take_despawns().contains(&bird));
        assert!(ctx.world.launchers.get(entity).unwrap().current_bird.is_none());
    }
}
