//! Session leaderboard screen

use glam::Vec2;

use super::{Scene, SceneId};
use crate::app::AppContext;
use crate::error::SceneError;
use crate::platform::{InputEvent, Key};
use crate::renderer::{Renderer, palette, text_width};

const TITLE_SIZE: f32 = 40.0;
const ROW_SIZE: f32 = 22.0;
const ROW_SPACING: f32 = 34.0;

#[derive(Debug, Default)]
pub struct HiScoresScene;

impl HiScoresScene {
    pub fn new() -> Self {
        Self
    }
}

impl Scene for HiScoresScene {
    fn name(&self) -> &'static str {
        "hiscores"
    }

    fn init(&mut self, _ctx: &mut AppContext) -> Result<(), SceneError> {
        Ok(())
    }

    fn poll_events(&mut self, events: &[InputEvent], ctx: &mut AppContext) {
        let leave = events.iter().any(|e| {
            matches!(
                e,
                InputEvent::PointerReleased(_)
                    | InputEvent::KeyPressed(Key::Escape)
                    | InputEvent::KeyPressed(Key::Enter)
            )
        });
        if leave {
            ctx.switch_to(SceneId::MainMenu);
        }
    }

    fn update(&mut self, _ctx: &mut AppContext) {}

    fn render(&self, renderer: &mut dyn Renderer, ctx: &AppContext) {
        renderer.clear(palette::BACKGROUND);
        let width = ctx.width();
        let title = "High Scores";
        renderer.draw_text(
            title,
            Vec2::new((width - text_width(title, TITLE_SIZE)) * 0.5, 60.0),
            TITLE_SIZE,
            palette::TEXT,
        );

        let mut y = 140.0;
        if ctx.high_scores.is_empty() {
            let text = "No scores yet";
            renderer.draw_text(
                text,
                Vec2::new((width - text_width(text, ROW_SIZE)) * 0.5, y),
                ROW_SIZE,
                palette::TEXT_MUTED,
            );
        }
        for (i, entry) in ctx.high_scores.entries.iter().enumerate() {
            let row = format!(
                "{:>2}. {:>8}  {:<7} {:>4} merges",
                i + 1,
                entry.score,
                entry.best.name(),
                entry.merges
            );
            renderer.draw_text(
                &row,
                Vec2::new((width - text_width(&row, ROW_SIZE)) * 0.5, y),
                ROW_SIZE,
                palette::TEXT,
            );
            y += ROW_SPACING;
        }

        let hint = "Click to go back";
        renderer.draw_text(
            hint,
            Vec2::new((width - text_width(hint, 18.0)) * 0.5, ctx.height() - 60.0),
            18.0,
            palette::TEXT_MUTED,
        );
    }

    fn clean_up(&mut self, _ctx: &mut AppContext) {}
}
