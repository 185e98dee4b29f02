//! Application Loop
//!
//! Owns the game context, the active scene and level progression. `frame`
//! polls input and hands off to `step`, which is pure with respect to the
//! window so tests can drive it with synthetic input.
//!
//! Scene changes are deferred to the end of the frame: systems run against
//! a consistent world, and the swap happens once everything has settled.

use macroquad::prelude::KeyCode;

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::game::{GameAction, GameContext};
use crate::input::{InputEvent, InputPoller, InputSnapshot};
use crate::level::LevelManager;
use crate::render;
use crate::scene::{self, SceneKind};

pub struct Game {
    pub ctx: GameContext,
    input: InputPoller,
    scene: SceneKind,
    levels: LevelManager,
    pending_scene: Option<SceneKind>,
    debug_draw: bool,
    pub running: bool,
}

impl Game {
    pub fn new(config: GameConfig, assets: Assets) -> Self {
        let mut ctx = GameContext::new(config, assets);
        let scene = SceneKind::MainMenu;
        scene::build(&mut ctx, scene);
        Self {
            ctx,
            input: InputPoller::new(),
            scene,
            levels: LevelManager::new(),
            pending_scene: None,
            debug_draw: false,
            running: true,
        }
    }

    pub fn scene(&self) -> SceneKind {
        self.scene
    }

    /// Run one frame against the real window.
    pub fn frame(&mut self, dt: f32) {
        let (events, snapshot) = self.input.poll();
        self.step(dt, &events, snapshot);
    }

    /// Advance the game by one frame with the given input.
    pub fn step(&mut self, dt: f32, events: &[InputEvent], snapshot: InputSnapshot) {
        for &event in events {
            if let InputEvent::KeyDown(key) = event {
                self.handle_key(key);
            }
        }

        self.ctx.update(dt, events, snapshot);

        let actions: Vec<GameAction> = self.ctx.events.action.drain().collect();
        for action in actions {
            self.handle_action(action);
        }

        self.check_level_outcome();

        if let Some(next) = self.pending_scene.take() {
            self.switch_scene(next);
        }
    }

    pub fn draw(&self) {
        render::draw(&self.ctx, self.debug_draw);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Key1 => self.request_scene(SceneKind::MainMenu),
            KeyCode::Key2 => self.request_scene(SceneKind::Level1),
            KeyCode::Key3 => self.request_scene(SceneKind::Level2),
            KeyCode::Key4 => self.request_scene(SceneKind::BossFight),
            KeyCode::Key5 => self.request_scene(SceneKind::GameOver { won: false }),
            KeyCode::R => {
                if is_level(self.scene) {
                    self.request_scene(self.scene);
                }
            }
            KeyCode::F1 => self.debug_draw = !self.debug_draw,
            KeyCode::Escape => self.request_scene(SceneKind::MainMenu),
            _ => {}
        }
    }

    fn handle_action(&mut self, action: GameAction) {
        match action {
            GameAction::StartGame => {
                let first = self.levels.first();
                self.request_scene(first);
            }
            GameAction::RetryLevel => {
                let retry = self.levels.current().unwrap_or(SceneKind::Level1);
                self.levels.jump_to(retry);
                self.request_scene(retry);
            }
            GameAction::NextLevel => self.advance_level(),
            GameAction::MainMenu => {
                self.levels.reset();
                self.request_scene(SceneKind::MainMenu);
            }
            GameAction::Quit => self.running = false,
        }
    }

    /// Win and lose detection, only meaningful while a level is active.
    fn check_level_outcome(&mut self) {
        if !is_level(self.scene) || self.pending_scene.is_some() {
            return;
        }
        if self.ctx.level_complete() {
            self.advance_level();
        } else if self.ctx.level_failed() {
            self.request_scene(SceneKind::GameOver { won: false });
        }
    }

    fn advance_level(&mut self) {
        match self.levels.advance() {
            Some(next) => self.request_scene(next),
            None => self.request_scene(SceneKind::GameOver { won: true }),
        }
    }

    fn request_scene(&mut self, scene: SceneKind) {
        self.pending_scene = Some(scene);
    }

    fn switch_scene(&mut self, next: SceneKind) {
        self.scene = next;
        self.levels.jump_to(next);
        scene::build(&mut self.ctx, next);
    }
}

fn is_level(scene: SceneKind) -> bool {
    matches!(
        scene,
        SceneKind::Level1 | SceneKind::Level2 | SceneKind::BossFight
    )
}
