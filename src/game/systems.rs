//! Per-frame Systems
//!
//! Free functions over `GameContext` called in a fixed order from
//! `GameContext::update`. Entity lists are snapshotted before mutation so a
//! system can despawn entities while walking them.

use macroquad::prelude::{Color, Vec2, RED, WHITE};

use super::context::GameContext;
use super::entity::Entity;
use super::event::CollisionEvent;
use crate::input::{InputEvent, InputSnapshot};

/// Tick every countdown timer.
pub fn update_timers(ctx: &mut GameContext, dt: f32) {
    for (_, timer) in ctx.world.timers.iter_mut() {
        timer.update(dt);
    }
}

/// Copy body positions back into transforms and clamp runaway bodies to
/// their max speed.
pub fn sync_transforms(ctx: &mut GameContext) {
    let entities: Vec<Entity> = ctx.world.live_entities().to_vec();
    for entity in entities {
        let Some(rb) = ctx.world.rigid_bodies.get(entity).copied() else {
            continue;
        };

        let speed = ctx.physics.speed(rb.handle);
        if speed > rb.max_speed {
            let velocity = ctx.physics.velocity(rb.handle);
            ctx.physics.set_velocity(rb.handle, velocity / speed * rb.max_speed);
        }

        if let Some((position, rotation)) = ctx.physics.body_position_px(rb.handle) {
            if let Some(transform) = ctx.world.transforms.get_mut(entity) {
                transform.position = position;
                transform.rotation = rotation;
            }
        }
    }
}

/// Chip breakable health from this frame's contacts. A hit only counts when
/// the impactor moves faster than the damage threshold; the damage dealt is
/// its speed times its mass. Entities that reach zero health are marked for
/// despawn.
pub fn apply_collision_damage(ctx: &mut GameContext) {
    let collisions: Vec<CollisionEvent> = ctx.events.collision.iter().copied().collect();
    for event in collisions {
        damage_from_impact(ctx, event.entity_a, event.entity_b);
        damage_from_impact(ctx, event.entity_b, event.entity_a);
    }
}

fn damage_from_impact(ctx: &mut GameContext, target: Entity, source: Entity) {
    if !ctx.world.is_alive(target) || !ctx.world.is_alive(source) {
        return;
    }
    let Some(source_rb) = ctx.world.rigid_bodies.get(source).copied() else {
        return;
    };
    let speed = ctx.physics.speed(source_rb.handle);
    if speed <= ctx.config.damage_speed_threshold {
        return;
    }
    let amount = speed * ctx.physics.mass(source_rb.handle);
    let Some(breakable) = ctx.world.breakables.get_mut(target) else {
        return;
    };
    if breakable.damage(amount) {
        ctx.world.despawn(target);
    }
}

/// Redden damaged sprites: full health is untinted, zero health is pure red.
pub fn update_damage_tints(ctx: &mut GameContext) {
    let entities: Vec<Entity> = ctx.world.live_entities().to_vec();
    for entity in entities {
        let Some(fraction) = ctx.world.breakables.get(entity).map(|b| b.health_fraction())
        else {
            continue;
        };
        if let Some(sprite) = ctx.world.sprites.get_mut(entity) {
            sprite.tint = lerp_color(RED, WHITE, fraction);
        }
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

// =============================================================================
// FollowMouse
// =============================================================================

/// Track pointer state on a mouse-steered entity.
pub fn follow_mouse_event(ctx: &mut GameContext, entity: Entity, event: InputEvent) {
    let Some(follow) = ctx.world.follow_mouse.get_mut(entity) else {
        return;
    };
    match event {
        InputEvent::MouseDown(pos) => {
            follow.clicking = true;
            follow.pointer = pos;
        }
        InputEvent::MouseMove(pos) => follow.pointer = pos,
        InputEvent::MouseUp(_) => follow.clicking = false,
        InputEvent::KeyDown(_) => {}
    }
}

/// Steer held entities toward the pointer. The held-button snapshot backs
/// up the event stream: if a release event was dropped (focus loss), the
/// entity stops steering anyway.
pub fn update_follow_mouse(ctx: &mut GameContext, snapshot: InputSnapshot, dt: f32) {
    let entities: Vec<Entity> = ctx.world.live_entities().to_vec();
    for entity in entities {
        let Some(follow) = ctx.world.follow_mouse.get_mut(entity) else {
            continue;
        };
        if follow.clicking && !snapshot.left_down {
            follow.clicking = false;
        }
        let follow = *follow;
        if !follow.clicking {
            continue;
        }
        if let Some(rb) = ctx.world.rigid_bodies.get(entity).copied() {
            ctx.physics
                .move_towards(rb.handle, follow.pointer, rb.max_speed, rb.max_speed, dt);
        }
    }
}

// =============================================================================
// Buttons
// =============================================================================

/// Fire a button's action when a press lands inside its rectangle.
pub fn button_event(ctx: &mut GameContext, entity: Entity, event: InputEvent) {
    let InputEvent::MouseDown(pos) = event else {
        return;
    };
    let Some(button) = ctx.world.buttons.get(entity) else {
        return;
    };
    let Some(transform) = ctx.world.transforms.get(entity) else {
        return;
    };
    if point_in_rect(pos, transform.position, button.size) {
        ctx.events.action.send(button.action);
    }
}

/// Rect test against a center position and full size.
fn point_in_rect(point: Vec2, center: Vec2, size: Vec2) -> bool {
    let half = size * 0.5;
    point.x >= center.x - half.x
        && point.x <= center.x + half.x
        && point.y >= center.y - half.y
        && point.y <= center.y + half.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Assets;
    use crate::config::GameConfig;
    use crate::game::components::{Breakable, Button, Collider, ColliderShape, RigidBody};
    use crate::game::event::GameAction;

    fn test_ctx() -> GameContext {
        GameContext::new(GameConfig::default(), Assets::empty())
    }

    fn spawn_body(ctx: &mut GameContext, position: Vec2, mass: f32) -> Entity {
        let entity = ctx.world.spawn_at(position);
        let handle = ctx.physics.create_dynamic_body(entity, position, mass, 1.0);
        ctx.physics.attach_box_collider(handle, Vec2::new(0.5, 0.5), 0.5);
        ctx.world.colliders.insert(
            entity,
            Collider {
                shape: ColliderShape::Box { half_extents: Vec2::new(0.5, 0.5) },
            },
        );
        ctx.world.rigid_bodies.insert(
            entity,
            RigidBody {
                handle,
                mass,
                gravity_scale: 1.0,
                restitution: 0.5,
                max_speed: 10.0,
                gravity_on: true,
            },
        );
        entity
    }

    #[test]
    fn test_damage_scales_with_speed_and_mass() {
        let mut ctx = test_ctx();
        let wall = ctx.world.spawn_at(Vec2::new(300.0, 300.0));
        ctx.world.breakables.insert(wall, Breakable::new(20.0));

        let bird = spawn_body(&mut ctx, Vec2::new(290.0, 300.0), 2.0);
        let handle = ctx.world.rigid_bodies.get(bird).unwrap().handle;
        ctx.physics.set_velocity(handle, Vec2::new(6.0, 0.0));

        ctx.events.collision.send(CollisionEvent { entity_a: wall, entity_b: bird });
        apply_collision_damage(&mut ctx);

        // speed 6 over the threshold, times mass 2: 12 damage
        let breakable = ctx.world.breakables.get(wall).unwrap();
        assert!((breakable.health - 8.0).abs() < 1e-4);
        assert!(!ctx.world.has_pending_despawns());

        // A second identical hit is lethal
        ctx.events.collision.send(CollisionEvent { entity_a: wall, entity_b: bird });
        apply_collision_damage(&mut ctx);
        assert_eq!(ctx.world.breakables.get(wall).unwrap().health, 0.0);
        assert!(ctx.world.has_pending_despawns());
    }

    #[test]
    fn test_slow_impacts_deal_no_damage() {
        let mut ctx = test_ctx();
        let wall = ctx.world.spawn_at(Vec2::new(300.0, 300.0));
        ctx.world.breakables.insert(wall, Breakable::new(20.0));

        let bird = spawn_body(&mut ctx, Vec2::new(290.0, 300.0), 2.0);
        let handle = ctx.world.rigid_bodies.get(bird).unwrap().handle;
        // Exactly at the threshold: no damage (strictly greater is required)
        ctx.physics.set_velocity(handle, Vec2::new(3.0, 0.0));

        ctx.events.collision.send(CollisionEvent { entity_a: wall, entity_b: bird });
        apply_collision_damage(&mut ctx);
        assert_eq!(ctx.world.breakables.get(wall).unwrap().health, 20.0);
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let mut ctx = test_ctx();
        let bird = spawn_body(&mut ctx, Vec2::new(100.0, 100.0), 1.0);
        let handle = ctx.world.rigid_bodies.get(bird).unwrap().handle;
        ctx.physics.set_velocity(handle, Vec2::new(30.0, 40.0)); // speed 50

        sync_transforms(&mut ctx);
        assert!((ctx.physics.speed(handle) - 10.0).abs() < 1e-4);
        // Direction is preserved
        let velocity = ctx.physics.velocity(handle);
        assert!((velocity - Vec2::new(6.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_button_press_inside_rect_fires_action() {
        let mut ctx = test_ctx();
        let button = ctx.world.spawn_at(Vec2::new(400.0, 300.0));
        ctx.world.buttons.insert(
            button,
            Button {
                label: "Retry".to_string(),
                size: Vec2::new(200.0, 60.0),
                color: WHITE,
                text_color: RED,
                action: GameAction::RetryLevel,
            },
        );

        button_event(&mut ctx, button, InputEvent::MouseDown(Vec2::new(450.0, 310.0)));
        let actions: Vec<GameAction> = ctx.events.action.drain().collect();
        assert_eq!(actions, vec![GameAction::RetryLevel]);

        // Outside the rect: nothing
        button_event(&mut ctx, button, InputEvent::MouseDown(Vec2::new(700.0, 310.0)));
        assert!(ctx.events.action.is_empty());
    }

    #[test]
    fn test_damage_tint_reddens_sprites() {
        let mut ctx = test_ctx();
        let entity = ctx.world.spawn_at(Vec2::ZERO);
        ctx.world.breakables.insert(entity, Breakable::new(20.0));
        ctx.world.sprites.insert(
            entity,
            crate::game::components::SpriteRenderer {
                path: "pig.png".to_string(),
                tint: WHITE,
            },
        );

        ctx.world.breakables.get_mut(entity).unwrap().damage(10.0);
        update_damage_tints(&mut ctx);

        // Halfway between RED and WHITE: green and blue dip, red stays high
        let tint = ctx.world.sprites.get(entity).unwrap().tint;
        assert!(tint.r > 0.9);
        assert!(tint.g < 1.0 && tint.g > 0.0);
        assert!(tint.b < 1.0);
    }
}
