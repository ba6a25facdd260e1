//! Main menu: Play!, Hiscores and Quit stacked at the horizontal centre

use glam::Vec2;
use log::debug;

use super::{Button, Scene, SceneId};
use crate::app::AppContext;
use crate::error::SceneError;
use crate::platform::{InputEvent, Key};
use crate::renderer::{Renderer, palette, shapes};

pub const PLAY_BUTTON_Y: f32 = 100.0;
pub const HISCORES_BUTTON_Y: f32 = 150.0;
pub const QUIT_BUTTON_Y: f32 = 200.0;

const BUTTON_TEXT_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Play,
    HiScores,
    Quit,
}

#[derive(Debug, Default)]
pub struct MainMenu {
    buttons: Vec<(Button, MenuAction)>,
    hovered: Option<usize>,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    fn hit(&self, point: Vec2) -> Option<usize> {
        self.buttons.iter().position(|(button, _)| button.contains(point))
    }

    fn activate(action: MenuAction, ctx: &mut AppContext) {
        debug!("Menu action {:?}", action);
        match action {
            MenuAction::Play => ctx.switch_to(SceneId::Game),
            MenuAction::HiScores => ctx.switch_to(SceneId::HiScores),
            MenuAction::Quit => ctx.request_close(),
        }
    }
}

impl Scene for MainMenu {
    fn name(&self) -> &'static str {
        "main menu"
    }

    fn init(&mut self, ctx: &mut AppContext) -> Result<(), SceneError> {
        let x = ctx.width() * 0.5;
        let button = |label, y| Button::new(label, Vec2::new(x, y), BUTTON_TEXT_SIZE);
        self.buttons = vec![
            (button("Play!", PLAY_BUTTON_Y), MenuAction::Play),
            (button("Hiscores", HISCORES_BUTTON_Y), MenuAction::HiScores),
            (button("Quit", QUIT_BUTTON_Y), MenuAction::Quit),
        ];
        self.hovered = self.hit(ctx.pointer);
        Ok(())
    }

    fn poll_events(&mut self, events: &[InputEvent], ctx: &mut AppContext) {
        for event in events {
            match *event {
                InputEvent::PointerMoved(p) => self.hovered = self.hit(p),
                InputEvent::PointerReleased(p) => {
                    if let Some(index) = self.hit(p) {
                        Self::activate(self.buttons[index].1, ctx);
                    }
                }
                InputEvent::KeyPressed(Key::Enter) => Self::activate(MenuAction::Play, ctx),
                InputEvent::KeyPressed(Key::Escape) => Self::activate(MenuAction::Quit, ctx),
                _ => {}
            }
        }
    }

    fn update(&mut self, _ctx: &mut AppContext) {}

    fn render(&self, renderer: &mut dyn Renderer, _ctx: &AppContext) {
        renderer.clear(palette::BACKGROUND);
        for (index, (button, _)) in self.buttons.iter().enumerate() {
            let color = if self.hovered == Some(index) {
                palette::TEXT
            } else {
                palette::TEXT_MUTED
            };
            renderer.draw_triangles(&shapes::rect_outline(button.min(), button.max(), 2.0, color));
            let inset = Vec2::new(button.half_size.x - 12.0, BUTTON_TEXT_SIZE * 0.5);
            let text_min = button.center - inset;
            renderer.draw_text(button.label, text_min, BUTTON_TEXT_SIZE, color);
        }
    }

    fn clean_up(&mut self, _ctx: &mut AppContext) {
        self.buttons.clear();
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;
    use crate::settings::Settings;

    fn menu() -> (MainMenu, AppContext) {
        let mut ctx = AppContext::new(Settings::default());
        let mut menu = MainMenu::new();
        menu.init(&mut ctx).unwrap();
        (menu, ctx)
    }

    fn click(menu: &mut MainMenu, ctx: &mut AppContext, y: f32) {
        let p = Vec2::new(ctx.width() * 0.5, y);
        menu.poll_events(&[InputEvent::PointerPressed(p), InputEvent::PointerReleased(p)], ctx);
    }

    #[test]
    fn test_play_switches_to_game() {
        let (mut menu, mut ctx) = menu();
        click(&mut menu, &mut ctx, PLAY_BUTTON_Y);
        assert_eq!(ctx.pending_switch(), Some(SceneId::Game));
        assert!(!ctx.should_close());
    }

    #[test]
    fn test_hiscores_button() {
        let (mut menu, mut ctx) = menu();
        click(&mut menu, &mut ctx, HISCORES_BUTTON_Y);
        assert_eq!(ctx.pending_switch(), Some(SceneId::HiScores));
    }

    #[test]
    fn test_quit_and_escape_close() {
        let (mut menu, mut ctx) = menu();
        click(&mut menu, &mut ctx, QUIT_BUTTON_Y);
        assert!(ctx.should_close());

        let (mut menu, mut ctx) = self::menu();
        menu.poll_events(&[InputEvent::KeyPressed(Key::Escape)], &mut ctx);
        assert!(ctx.should_close());
    }

    #[test]
    fn test_click_outside_buttons_does_nothing() {
        let (mut menu, mut ctx) = menu();
        click(&mut menu, &mut ctx, 400.0);
        menu.poll_events(&[InputEvent::PointerReleased(Vec2::new(5.0, PLAY_BUTTON_Y))], &mut ctx);
        assert_eq!(ctx.pending_switch(), None);
        assert!(!ctx.should_close());
    }

    #[test]
    fn test_render_lists_buttons() {
        let (menu, ctx) = menu();
        let mut renderer = HeadlessRenderer::new();
        menu.render(&mut renderer, &ctx);
        for label in ["Play!", "Hiscores", "Quit"] {
            assert!(renderer.has_text(label));
        }
    }
}
