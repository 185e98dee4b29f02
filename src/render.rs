//! Rendering
//!
//! One immediate-mode pass over the live entities, in spawn order. All
//! gameplay state lives in the world; this module only reads it.

use macroquad::prelude::{
    clear_background, draw_circle_lines, draw_line, draw_rectangle_ex, draw_rectangle_lines,
    draw_text_ex, measure_text, DrawRectangleParams, DrawTextureParams, TextParams, Vec2, BROWN,
    GREEN, SKYBLUE, WHITE,
};
use macroquad::texture::draw_texture_ex;

use crate::game::launcher::LauncherPhase;
use crate::game::physics::PIXELS_PER_METER;
use crate::game::GameContext;

pub fn draw(ctx: &GameContext, debug: bool) {
    clear_background(SKYBLUE);

    for &entity in ctx.world.live_entities() {
        let Some(transform) = ctx.world.transforms.get(entity) else {
            continue;
        };
        let position = transform.position;
        let size = transform.pixel_size();
        let rotation = transform.rotation.to_radians();

        if let Some(shape) = ctx.world.shapes.get(entity) {
            draw_rectangle_ex(
                position.x,
                position.y,
                size.x,
                size.y,
                DrawRectangleParams {
                    offset: Vec2::new(0.5, 0.5),
                    rotation,
                    color: shape.color,
                },
            );
        }

        if let Some(sprite) = ctx.world.sprites.get(entity) {
            if let Some(texture) = ctx.assets.texture(&sprite.path) {
                draw_texture_ex(
                    texture,
                    position.x - size.x * 0.5,
                    position.y - size.y * 0.5,
                    sprite.tint,
                    DrawTextureParams {
                        dest_size: Some(size),
                        rotation,
                        ..Default::default()
                    },
                );
            }
        }

        if let Some(button) = ctx.world.buttons.get(entity) {
            draw_rectangle_ex(
                position.x,
                position.y,
                button.size.x,
                button.size.y,
                DrawRectangleParams {
                    offset: Vec2::new(0.5, 0.5),
                    rotation: 0.0,
                    color: button.color,
                },
            );
            draw_centered_text(ctx, &button.label, position, 32, button.text_color);
        }

        if let Some(label) = ctx.world.labels.get(entity) {
            draw_centered_text(ctx, &label.text, position, label.font_size, label.color);
        }
    }

    draw_tethers(ctx);
    draw_hud(ctx);

    if debug {
        draw_collider_outlines(ctx);
    }
}

/// Sling band from the anchor to the hanging bird.
fn draw_tethers(ctx: &GameContext) {
    for &entity in ctx.world.live_entities() {
        let Some(launcher) = ctx.world.launchers.get(entity) else {
            continue;
        };
        if !matches!(launcher.phase, LauncherPhase::Armed | LauncherPhase::Dragging) {
            continue;
        }
        let Some(bird_pos) = launcher
            .current_bird
            .and_then(|bird| ctx.world.transforms.get(bird))
            .map(|t| t.position)
        else {
            continue;
        };
        draw_line(launcher.anchor.x, launcher.anchor.y, bird_pos.x, bird_pos.y, 3.0, BROWN);
    }
}

/// Remaining throws for each launcher, top-left.
fn draw_hud(ctx: &GameContext) {
    let mut y = 30.0;
    for &entity in ctx.world.live_entities() {
        if let Some(launcher) = ctx.world.launchers.get(entity) {
            let left = ctx.config.max_throws.saturating_sub(launcher.thrown);
            let text = format!("Birds: {}", left);
            draw_text_ex(
                &text,
                20.0,
                y,
                TextParams {
                    font: ctx.assets.font.as_ref(),
                    font_size: 24,
                    color: WHITE,
                    ..Default::default()
                },
            );
            y += 28.0;
        }
    }
}

fn draw_collider_outlines(ctx: &GameContext) {
    for &entity in ctx.world.live_entities() {
        let Some(collider) = ctx.world.colliders.get(entity) else {
            continue;
        };
        let Some(transform) = ctx.world.transforms.get(entity) else {
            continue;
        };
        let position = transform.position;
        match collider.shape {
            crate::game::components::ColliderShape::Box { half_extents } => {
                let half = half_extents * PIXELS_PER_METER;
                draw_rectangle_lines(
                    position.x - half.x,
                    position.y - half.y,
                    half.x * 2.0,
                    half.y * 2.0,
                    2.0,
                    GREEN,
                );
            }
            crate::game::components::ColliderShape::Circle { radius, offset } => {
                let center = position + offset * PIXELS_PER_METER;
                draw_circle_lines(center.x, center.y, radius * PIXELS_PER_METER, 2.0, GREEN);
            }
        }
    }
}

fn draw_centered_text(
    ctx: &GameContext,
    text: &str,
    center: Vec2,
    font_size: u16,
    color: macroquad::prelude::Color,
) {
    let dims = measure_text(text, ctx.assets.font.as_ref(), font_size, 1.0);
    draw_text_ex(
        text,
        center.x - dims.width * 0.5,
        center.y + dims.height * 0.5,
        TextParams {
            font: ctx.assets.font.as_ref(),
            font_size,
            color,
            ..Default::default()
        },
    );
}
