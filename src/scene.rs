//! Scenes
//!
//! Scene builders populate a cleared world with entities: menus are buttons
//! and labels, levels are a launcher plus pigs and platforms. Entity
//! spawners live here too so levels and abilities share one bird recipe.
//!
//! Visuals degrade gracefully: spawners use the sprite if its texture is
//! loaded and fall back to a colored rectangle otherwise, so scenes build
//! identically in headless tests.

use macroquad::prelude::{Color, Vec2, BROWN, DARKGREEN, GRAY, GREEN, ORANGE, RED, SKYBLUE, WHITE};

use crate::game::ability::{Ability, AbilityKind};
use crate::game::components::{
    Breakable, Button, Collider, ColliderShape, FollowMouse, Pig, RigidBody, ShapeRenderer,
    SpriteRenderer, TextLabel, Timer,
};
use crate::game::dispatcher::Listener;
use crate::game::event::GameAction;
use crate::game::launcher::{self, BirdFactory, Launcher};
use crate::game::{Entity, GameContext};

pub const SCREEN_W: f32 = 800.0;
pub const SCREEN_H: f32 = 600.0;

pub const BIRD_RED: &str = "assets/bird_red.png";
pub const BIRD_YELLOW: &str = "assets/bird_yellow.png";
pub const BIRD_BLUE: &str = "assets/bird_blue.png";
pub const PIG: &str = "assets/pig.png";
pub const PLATFORM: &str = "assets/platform.png";
pub const FONT: &str = "assets/font.ttf";

pub const ALL_TEXTURES: [&str; 5] = [BIRD_RED, BIRD_YELLOW, BIRD_BLUE, PIG, PLATFORM];

/// Which screen the game is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    MainMenu,
    Level1,
    Level2,
    BossFight,
    GameOver { won: bool },
}

/// Tear down the current scene and build the requested one.
pub fn build(ctx: &mut GameContext, kind: SceneKind) {
    ctx.clear_scene();
    match kind {
        SceneKind::MainMenu => build_main_menu(ctx),
        SceneKind::Level1 => build_level1(ctx),
        SceneKind::Level2 => build_level2(ctx),
        SceneKind::BossFight => build_boss_fight(ctx),
        SceneKind::GameOver { won } => build_game_over(ctx, won),
    }
}

// =============================================================================
// Scene layouts
// =============================================================================

fn build_main_menu(ctx: &mut GameContext) {
    spawn_label(ctx, Vec2::new(SCREEN_W * 0.5, 180.0), "Fowl Play", 64, WHITE);
    spawn_button(ctx, Vec2::new(SCREEN_W * 0.5, 320.0), "Start", GameAction::StartGame);
    spawn_button(ctx, Vec2::new(SCREEN_W * 0.5, 400.0), "Quit", GameAction::Quit);
}

fn build_level1(ctx: &mut GameContext) {
    spawn_bounds(ctx);
    spawn_launcher(ctx, Vec2::new(200.0, 450.0), spawn_heavy_bird, BIRD_RED);

    // One platform tower with a pig on top and one on the ground
    spawn_platform(ctx, Vec2::new(600.0, 540.0), Vec2::new(1.5, 0.25));
    spawn_platform(ctx, Vec2::new(600.0, 460.0), Vec2::new(1.0, 0.25));
    spawn_pig(ctx, Vec2::new(600.0, 420.0));
    spawn_pig(ctx, Vec2::new(700.0, 560.0));
}

fn build_level2(ctx: &mut GameContext) {
    spawn_bounds(ctx);
    spawn_launcher(ctx, Vec2::new(150.0, 450.0), spawn_split_bird, BIRD_BLUE);
    spawn_launcher(ctx, Vec2::new(260.0, 520.0), spawn_boost_bird, BIRD_YELLOW);

    // Two shielded towers; splitting the bird helps reach both
    spawn_platform(ctx, Vec2::new(500.0, 540.0), Vec2::new(1.0, 0.25));
    spawn_platform(ctx, Vec2::new(500.0, 470.0), Vec2::new(0.6, 0.6));
    spawn_pig(ctx, Vec2::new(500.0, 410.0));

    spawn_platform(ctx, Vec2::new(680.0, 540.0), Vec2::new(1.0, 0.25));
    spawn_platform(ctx, Vec2::new(680.0, 460.0), Vec2::new(1.0, 0.25));
    spawn_pig(ctx, Vec2::new(680.0, 510.0));
    spawn_pig(ctx, Vec2::new(680.0, 420.0));
}

fn build_boss_fight(ctx: &mut GameContext) {
    spawn_bounds(ctx);

    // The player steers a bird directly; no slingshot here
    let Some(bird) = spawn_plain_bird(ctx, Vec2::new(200.0, 300.0), BIRD_YELLOW) else {
        return;
    };
    ctx.world.follow_mouse.insert(bird, FollowMouse::default());
    ctx.dispatcher.register(bird, Listener::FollowMouse);

    // A big, tough pig
    let boss = spawn_pig(ctx, Vec2::new(600.0, 480.0));
    if let Some(t) = ctx.world.transforms.get_mut(boss) {
        t.scale = Vec2::new(1.5, 1.5);
    }
    ctx.world.breakables.insert(boss, Breakable::new(100.0));
    if let Some(rb) = ctx.world.rigid_bodies.get_mut(boss) {
        rb.mass = 5.0;
        let handle = rb.handle;
        ctx.physics.set_mass(handle, 5.0);
    }

    spawn_label(
        ctx,
        Vec2::new(SCREEN_W * 0.5, 60.0),
        "Hold the mouse to fly into the boss!",
        28,
        WHITE,
    );
}

fn build_game_over(ctx: &mut GameContext, won: bool) {
    let (title, color) = if won {
        ("You Win!", GREEN)
    } else {
        ("Game Over", RED)
    };
    spawn_label(ctx, Vec2::new(SCREEN_W * 0.5, 180.0), title, 64, color);
    if !won {
        spawn_button(ctx, Vec2::new(SCREEN_W * 0.5, 320.0), "Retry", GameAction::RetryLevel);
    }
    spawn_button(ctx, Vec2::new(SCREEN_W * 0.5, 400.0), "Main Menu", GameAction::MainMenu);
}

// =============================================================================
// Bird factories
// =============================================================================

pub fn spawn_plain_bird(ctx: &mut GameContext, position: Vec2, sprite: &str) -> Option<Entity> {
    spawn_bird(ctx, position, sprite, None)
}

pub fn spawn_heavy_bird(ctx: &mut GameContext, position: Vec2, sprite: &str) -> Option<Entity> {
    spawn_bird(ctx, position, sprite, Some(AbilityKind::DoubleMass))
}

pub fn spawn_boost_bird(ctx: &mut GameContext, position: Vec2, sprite: &str) -> Option<Entity> {
    let factor = ctx.config.boost_factor;
    spawn_bird(ctx, position, sprite, Some(AbilityKind::Boost { factor }))
}

pub fn spawn_split_bird(ctx: &mut GameContext, position: Vec2, sprite: &str) -> Option<Entity> {
    let count = ctx.config.split_count;
    spawn_bird(ctx, position, sprite, Some(AbilityKind::Split { count, spawned: Vec::new() }))
}

fn spawn_bird(
    ctx: &mut GameContext,
    position: Vec2,
    sprite: &str,
    ability: Option<AbilityKind>,
) -> Option<Entity> {
    let entity = ctx.world.spawn_at(position);
    let scale = ctx.world.transforms.get(entity).map(|t| t.scale).unwrap_or(Vec2::splat(0.5));
    attach_visual(ctx, entity, sprite, ORANGE);

    let handle = ctx.physics.create_dynamic_body(entity, position, 1.0, 1.0);
    let radius = scale.x * 0.5;
    ctx.physics
        .attach_circle_collider(handle, radius, Vec2::ZERO, ctx.config.default_restitution);
    ctx.world.colliders.insert(
        entity,
        Collider {
            shape: ColliderShape::Circle { radius, offset: Vec2::ZERO },
        },
    );
    ctx.world.rigid_bodies.insert(
        entity,
        RigidBody {
            handle,
            mass: 1.0,
            gravity_scale: 1.0,
            restitution: ctx.config.default_restitution,
            max_speed: ctx.config.default_max_speed,
            gravity_on: true,
        },
    );
    if let Some(kind) = ability {
        ctx.world.abilities.insert(entity, Ability::new(kind));
    }
    ctx.world.names.insert(entity, "bird".to_string());
    Some(entity)
}

// =============================================================================
// Other spawners
// =============================================================================

pub fn spawn_pig(ctx: &mut GameContext, position: Vec2) -> Entity {
    let entity = ctx.world.spawn_at(position);
    attach_visual(ctx, entity, PIG, DARKGREEN);

    let scale = ctx.world.transforms.get(entity).map(|t| t.scale).unwrap_or(Vec2::splat(0.5));
    let handle = ctx.physics.create_dynamic_body(entity, position, 1.0, 1.0);
    let radius = scale.x * 0.5;
    ctx.physics
        .attach_circle_collider(handle, radius, Vec2::ZERO, ctx.config.default_restitution);
    ctx.world.colliders.insert(
        entity,
        Collider {
            shape: ColliderShape::Circle { radius, offset: Vec2::ZERO },
        },
    );
    ctx.world.rigid_bodies.insert(
        entity,
        RigidBody {
            handle,
            mass: 1.0,
            gravity_scale: 1.0,
            restitution: ctx.config.default_restitution,
            max_speed: ctx.config.default_max_speed,
            gravity_on: true,
        },
    );
    ctx.world.breakables.insert(entity, Breakable::new(ctx.config.pig_health));
    ctx.world.pigs.insert(entity, Pig);
    ctx.world.names.insert(entity, "pig".to_string());
    entity
}

/// Static breakable platform. `scale` is in transform units, so a scale of
/// (1.0, 0.25) is a 60x15 pixel slab with matching collider.
pub fn spawn_platform(ctx: &mut GameContext, position: Vec2, scale: Vec2) -> Entity {
    let entity = ctx.world.spawn_at(position);
    if let Some(t) = ctx.world.transforms.get_mut(entity) {
        t.scale = scale;
    }
    attach_visual(ctx, entity, PLATFORM, BROWN);

    let handle = ctx.physics.create_static_body_for(entity, position);
    // Transform scale doubles as box half-extents in meters
    ctx.physics
        .attach_box_collider(handle, scale, ctx.config.default_restitution);
    ctx.world.colliders.insert(
        entity,
        Collider {
            shape: ColliderShape::Box { half_extents: scale },
        },
    );
    ctx.world.rigid_bodies.insert(
        entity,
        RigidBody {
            handle,
            mass: 0.0,
            gravity_scale: 0.0,
            restitution: ctx.config.default_restitution,
            max_speed: 0.0,
            gravity_on: false,
        },
    );
    ctx.world.breakables.insert(entity, Breakable::new(ctx.config.platform_health));
    ctx.world.names.insert(entity, "platform".to_string());
    entity
}

/// Unbreakable static wall.
fn spawn_wall(ctx: &mut GameContext, position: Vec2, scale: Vec2, color: Color) -> Entity {
    let entity = ctx.world.spawn_at(position);
    if let Some(t) = ctx.world.transforms.get_mut(entity) {
        t.scale = scale;
    }
    ctx.world.shapes.insert(entity, ShapeRenderer::new(color));

    let handle = ctx.physics.create_static_body_for(entity, position);
    ctx.physics.attach_box_collider(handle, scale, 0.0);
    ctx.world.colliders.insert(
        entity,
        Collider {
            shape: ColliderShape::Box { half_extents: scale },
        },
    );
    ctx.world.rigid_bodies.insert(
        entity,
        RigidBody {
            handle,
            mass: 0.0,
            gravity_scale: 0.0,
            restitution: 0.0,
            max_speed: 0.0,
            gravity_on: false,
        },
    );
    ctx.world.names.insert(entity, "wall".to_string());
    entity
}

/// Ground plus side walls so nothing escapes the screen.
fn spawn_bounds(ctx: &mut GameContext) {
    let ground_half = Vec2::new(SCREEN_W / 60.0, 10.0 / 30.0);
    spawn_wall(ctx, Vec2::new(SCREEN_W * 0.5, SCREEN_H - 10.0), ground_half, DARKGREEN);

    let wall_half = Vec2::new(10.0 / 30.0, SCREEN_H / 60.0);
    spawn_wall(ctx, Vec2::new(10.0, SCREEN_H * 0.5), wall_half, GRAY);
    spawn_wall(ctx, Vec2::new(SCREEN_W - 10.0, SCREEN_H * 0.5), wall_half, GRAY);
}

pub fn spawn_launcher(
    ctx: &mut GameContext,
    anchor: Vec2,
    factory: BirdFactory,
    bird_sprite: &str,
) -> Entity {
    let entity = ctx.world.spawn_at(anchor);
    ctx.world
        .launchers
        .insert(entity, Launcher::new(anchor, factory, bird_sprite));
    ctx.world.timers.insert(entity, Timer::new(ctx.config.reset_delay));
    ctx.world.names.insert(entity, "launcher".to_string());
    launcher::start(ctx, entity);
    entity
}

pub fn spawn_button(
    ctx: &mut GameContext,
    position: Vec2,
    label: &str,
    action: GameAction,
) -> Entity {
    let entity = ctx.world.spawn_at(position);
    ctx.world.buttons.insert(
        entity,
        Button {
            label: label.to_string(),
            size: Vec2::new(220.0, 60.0),
            color: SKYBLUE,
            text_color: WHITE,
            action,
        },
    );
    ctx.dispatcher.register(entity, Listener::Button);
    entity
}

pub fn spawn_label(
    ctx: &mut GameContext,
    position: Vec2,
    text: &str,
    font_size: u16,
    color: Color,
) -> Entity {
    let entity = ctx.world.spawn_at(position);
    ctx.world.labels.insert(entity, TextLabel::new(text, font_size, color));
    entity
}

/// Sprite when its texture is loaded, colored rectangle otherwise.
fn attach_visual(ctx: &mut GameContext, entity: Entity, sprite: &str, fallback: Color) {
    match SpriteRenderer::new(&ctx.assets, sprite) {
        Ok(renderer) => {
            ctx.world.sprites.insert(entity, renderer);
        }
        Err(_) => {
            ctx.world.shapes.insert(entity, ShapeRenderer::new(fallback));
        }
    }
}
