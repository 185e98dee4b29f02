//! Level Progression
//!
//! Orders the playable scenes and tracks which one is active. Clearing a
//! level advances to the next; past the last level the campaign is won.

use crate::scene::SceneKind;

pub struct LevelManager {
    order: Vec<SceneKind>,
    /// Index into `order`; None outside the campaign (menus, game over)
    current: Option<usize>,
}

impl LevelManager {
    pub fn new() -> Self {
        Self {
            order: vec![SceneKind::Level1, SceneKind::Level2, SceneKind::BossFight],
            current: None,
        }
    }

    /// Enter the campaign at the first level.
    pub fn first(&mut self) -> SceneKind {
        self.current = Some(0);
        self.order[0]
    }

    /// The level being played, if any.
    pub fn current(&self) -> Option<SceneKind> {
        self.current.map(|i| self.order[i])
    }

    /// Move to the next level. Returns None once the campaign is finished.
    pub fn advance(&mut self) -> Option<SceneKind> {
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.order.len() {
            self.current = Some(next);
            Some(self.order[next])
        } else {
            self.current = None;
            None
        }
    }

    /// Leave the campaign (back to the menu).
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Align the manager with a directly-selected scene (debug keys), so a
    /// later advance continues from there. Non-level scenes leave the
    /// campaign.
    pub fn jump_to(&mut self, scene: SceneKind) {
        self.current = self.order.iter().position(|&s| s == scene);
    }
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}
