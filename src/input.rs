//! Input Handling
//!
//! Raw macroquad polling is turned into discrete `InputEvent`s once per
//! frame, plus an `InputSnapshot` of the held state. Gameplay systems only
//! see these types, which keeps the launcher and ability logic testable
//! without a window.

use macroquad::prelude::{
    is_key_pressed, is_mouse_button_down, is_mouse_button_pressed,
    is_mouse_button_released, mouse_position, KeyCode, MouseButton, Vec2,
};

/// A discrete input transition observed this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Left mouse button went down at this screen position
    MouseDown(Vec2),
    /// Left mouse button came up at this screen position
    MouseUp(Vec2),
    /// Pointer moved to this screen position
    MouseMove(Vec2),
    /// A key was pressed this frame
    KeyDown(KeyCode),
}

/// Held input state, sampled once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    pub left_down: bool,
    pub mouse: Vec2,
}

/// Polls macroquad and emits events for the transitions since last frame.
#[derive(Debug, Default)]
pub struct InputPoller {
    last_mouse: Vec2,
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather this frame's events and held state. Events come out in a fixed
    /// order: movement first, then button transitions, then keys.
    pub fn poll(&mut self) -> (Vec<InputEvent>, InputSnapshot) {
        let mut events = Vec::new();

        let (mx, my) = mouse_position();
        let mouse = Vec2::new(mx, my);
        if mouse != self.last_mouse {
            events.push(InputEvent::MouseMove(mouse));
            self.last_mouse = mouse;
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            events.push(InputEvent::MouseDown(mouse));
        }
        if is_mouse_button_released(MouseButton::Left) {
            events.push(InputEvent::MouseUp(mouse));
        }

        for key in [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::R,
            KeyCode::F1,
            KeyCode::Escape,
        ] {
            if is_key_pressed(key) {
                events.push(InputEvent::KeyDown(key));
            }
        }

        let snapshot = InputSnapshot {
            left_down: is_mouse_button_down(MouseButton::Left),
            mouse,
        };

        (events, snapshot)
    }
}
