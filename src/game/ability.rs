//! Bird Abilities
//!
//! Each bird carries at most one ability from a closed set. Abilities arm
//! when the bird is launched and fire on the first mouse press after that,
//! at most once per bird. Activation is detected by polling the frame's
//! input rather than through the dispatcher, so an ability click anywhere
//! on screen triggers it.

use macroquad::prelude::Vec2;

use super::context::GameContext;
use super::entity::Entity;

/// The closed set of bird abilities.
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityKind {
    /// Double the bird's mass (and shrink it) for a heavier impact
    DoubleMass,
    /// Multiply the current velocity by `factor`
    Boost { factor: f32 },
    /// Split into `count` birds sharing the original's velocity. The copies
    /// are remembered so a launcher reset can clean them up.
    Split { count: u32, spawned: Vec<Entity> },
}

/// Ability state attached to a bird.
#[derive(Debug, Clone)]
pub struct Ability {
    pub kind: AbilityKind,
    /// Set by the launcher the moment the bird flies
    pub launched: bool,
    /// Abilities fire once; this latches after the triggering click
    pub activated: bool,
}

impl Ability {
    pub fn new(kind: AbilityKind) -> Self {
        Self {
            kind,
            launched: false,
            activated: false,
        }
    }
}

/// Fire pending abilities. Call once per frame with whether the left mouse
/// button was pressed this frame; only birds that are launched and have not
/// activated yet respond.
pub fn update_abilities(ctx: &mut GameContext, mouse_pressed: bool) {
    if !mouse_pressed {
        return;
    }

    let pending: Vec<Entity> = ctx
        .world
        .live_entities()
        .iter()
        .copied()
        .filter(|&entity| {
            ctx.world
                .abilities
                .get(entity)
                .map(|ability| ability.launched && !ability.activated)
                .unwrap_or(false)
        })
        .collect();

    for entity in pending {
        let Some(mut ability) = ctx.world.abilities.remove(entity) else {
            continue;
        };
        ability.activated = true;
        match &mut ability.kind {
            AbilityKind::DoubleMass => double_mass(ctx, entity),
            AbilityKind::Boost { factor } => {
                let factor = *factor;
                boost(ctx, entity, factor);
            }
            AbilityKind::Split { count, spawned } => {
                let count = *count;
                let copies = split(ctx, entity, count);
                spawned.extend(copies);
            }
        }
        ctx.world.abilities.insert(entity, ability);
    }
}

/// Undo a fired ability and rearm it. The launcher calls this when the bird
/// cycles out: doubled mass comes back exactly (power-of-two scaling is
/// lossless in f32) and split copies are marked for despawn.
pub fn reset(ctx: &mut GameContext, entity: Entity) {
    let Some(mut ability) = ctx.world.abilities.remove(entity) else {
        return;
    };
    if ability.activated {
        match &mut ability.kind {
            AbilityKind::DoubleMass => {
                if let Some(rb) = ctx.world.rigid_bodies.get_mut(entity) {
                    rb.mass /= 2.0;
                    ctx.physics.set_mass(rb.handle, rb.mass);
                }
                if let Some(transform) = ctx.world.transforms.get_mut(entity) {
                    transform.scale *= 2.0;
                }
            }
            AbilityKind::Boost { .. } => {}
            AbilityKind::Split { spawned, .. } => {
                for copy in spawned.drain(..) {
                    ctx.world.despawn(copy);
                }
            }
        }
    }
    ability.launched = false;
    ability.activated = false;
    ctx.world.abilities.insert(entity, ability);
}

fn double_mass(ctx: &mut GameContext, entity: Entity) {
    let Some(rb) = ctx.world.rigid_bodies.get_mut(entity) else {
        return;
    };
    rb.mass *= 2.0;
    ctx.physics.set_mass(rb.handle, rb.mass);
    if let Some(transform) = ctx.world.transforms.get_mut(entity) {
        transform.scale *= 0.5;
    }
}

fn boost(ctx: &mut GameContext, entity: Entity, factor: f32) {
    let Some(rb) = ctx.world.rigid_bodies.get(entity) else {
        return;
    };
    let velocity = ctx.physics.velocity(rb.handle);
    ctx.physics.set_velocity(rb.handle, velocity * factor);
}

/// Spawn `count - 1` siblings next to the bird, each a plain copy (same
/// sprite, mass and velocity) with no ability of its own. Returns the
/// spawned copies.
fn split(ctx: &mut GameContext, entity: Entity, count: u32) -> Vec<Entity> {
    let Some(&rb) = ctx.world.rigid_bodies.get(entity) else {
        return Vec::new();
    };
    let Some(&transform) = ctx.world.transforms.get(entity) else {
        return Vec::new();
    };
    let sprite = ctx.world.sprites.get(entity).cloned();
    let collider_shape = ctx.world.colliders.get(entity).map(|c| c.shape);
    let velocity = ctx.physics.velocity(rb.handle);

    let mut copies = Vec::new();
    for i in 1..count {
        let offset = Vec2::new(0.0, 10.0 * i as f32);
        let sibling = ctx.world.spawn_at(transform.position + offset);
        copies.push(sibling);
        if let Some(t) = ctx.world.transforms.get_mut(sibling) {
            t.scale = transform.scale;
            t.rotation = transform.rotation;
        }
        if let Some(sprite) = sprite.clone() {
            ctx.world.sprites.insert(sibling, sprite);
        }

        let handle = ctx.physics.create_dynamic_body(
            sibling,
            transform.position + offset,
            rb.mass,
            rb.gravity_scale,
        );
        match collider_shape {
            Some(super::components::ColliderShape::Circle { radius, offset }) => {
                ctx.physics.attach_circle_collider(handle, radius, offset, rb.restitution);
            }
            Some(super::components::ColliderShape::Box { half_extents }) => {
                ctx.physics.attach_box_collider(handle, half_extents, rb.restitution);
            }
            None => {}
        }
        if let Some(shape) = collider_shape {
            ctx.world
                .colliders
                .insert(sibling, super::components::Collider { shape });
        }
        ctx.physics.set_velocity(handle, velocity);
        ctx.world.rigid_bodies.insert(
            sibling,
            super::components::RigidBody { handle, ..rb },
        );
    }
    copies
}
