//! FOWL PLAY: a 2D slingshot physics puzzle
//!
//! Drag birds off the sling, knock over platforms, squash every pig.
//! Birds carry one-shot abilities triggered by a click mid-flight:
//! - Red doubles its mass for a heavier impact
//! - Blue splits into three
//! - Yellow gets a speed boost

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod assets;
mod config;
mod game;
mod input;
mod level;
mod render;
mod scene;

use macroquad::prelude::{get_frame_time, next_frame, Conf};

use app::Game;
use assets::Assets;
use config::GameConfig;
use scene::{ALL_TEXTURES, FONT, SCREEN_H, SCREEN_W};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Fowl Play v{}", VERSION),
        window_width: SCREEN_W as i32,
        window_height: SCREEN_H as i32,
        window_resizable: false,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = GameConfig::load_or_default("config.ron");

    let assets = match Assets::load(&ALL_TEXTURES, FONT).await {
        Ok(assets) => assets,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Continuing without art; entities render as shapes");
            Assets::empty()
        }
    };

    let mut game = Game::new(config, assets);

    while game.running {
        game.frame(get_frame_time());
        game.draw();
        next_frame().await;
    }
}
