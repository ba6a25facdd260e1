//! Scenes
//!
//! Exactly one scene is current at a time. The application drives it every
//! frame: `poll_events` → `update` → `render`. Switching scenes always runs
//! the outgoing scene's `clean_up` before the incoming scene's `init`.

pub mod game;
pub mod hiscores;
pub mod menu;

pub use game::{GameScene, RoundPhase};
pub use hiscores::HiScoresScene;
pub use menu::MainMenu;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::error::SceneError;
use crate::platform::InputEvent;
use crate::renderer::Renderer;

/// Scene identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    MainMenu,
    Game,
    HiScores,
}

/// Scene lifecycle and per-frame hooks
pub trait Scene {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Acquire the scene's resources. On error the scene is not installed.
    fn init(&mut self, ctx: &mut AppContext) -> Result<(), SceneError>;

    /// React to this frame's input, oldest event first
    fn poll_events(&mut self, events: &[InputEvent], ctx: &mut AppContext);

    /// Advance one frame
    fn update(&mut self, ctx: &mut AppContext);

    fn render(&self, renderer: &mut dyn Renderer, ctx: &AppContext);

    /// Release everything acquired in `init`
    fn clean_up(&mut self, ctx: &mut AppContext);
}

/// Clickable text button
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: &'static str,
    pub center: Vec2,
    pub half_size: Vec2,
}

impl Button {
    pub fn new(label: &'static str, center: Vec2, text_size: f32) -> Self {
        let width = crate::renderer::text_width(label, text_size);
        Self {
            label,
            center,
            half_size: Vec2::new(width * 0.5 + 12.0, text_size * 0.5 + 4.0),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_size.x && d.y <= self.half_size.y
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_size
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_hit_box() {
        let button = Button::new("Play!", Vec2::new(320.0, 100.0), 36.0);
        assert!(button.contains(Vec2::new(320.0, 100.0)));
        assert!(button.contains(button.min()));
        assert!(!button.contains(Vec2::new(320.0, 150.0)));
        assert!(!button.contains(Vec2::new(0.0, 100.0)));
    }
}
