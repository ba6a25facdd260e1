//! Headless platform
//!
//! No window: input comes from a per-frame script and/or an automatic
//! player, frames go to a `HeadlessRenderer`.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{InputEvent, Platform};
use crate::renderer::headless::FrameStats;
use crate::renderer::{HeadlessRenderer, Renderer};
use crate::scenes::menu::PLAY_BUTTON_Y;

/// Height at which the auto player clicks to drop (above every menu button)
const AUTOPLAY_DROP_Y: f32 = 30.0;
/// Every n-th action clicks where the Play button sits instead of a random column
const AUTOPLAY_MENU_EVERY: u32 = 8;

/// Plays the game with seeded random clicks
///
/// In a round each click drops a ball at a random column. Now and then it
/// clicks the centre of the Play button, which starts a round from the menu
/// and is an ordinary centre drop during a round.
#[derive(Debug)]
pub struct AutoPlayer {
    rng: Pcg32,
    width: f32,
    interval: u32,
    frame: u32,
    actions: u32,
}

impl AutoPlayer {
    pub fn new(seed: u64, width: f32, interval: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            width,
            interval: interval.max(1),
            frame: 0,
            actions: 0,
        }
    }

    /// Events for the next frame
    pub fn next_events(&mut self, events: &mut Vec<InputEvent>) {
        let act = self.frame % self.interval == 0;
        self.frame += 1;
        if !act {
            return;
        }

        let target = if self.actions % AUTOPLAY_MENU_EVERY == 0 {
            Vec2::new(self.width / 2.0, PLAY_BUTTON_Y)
        } else {
            Vec2::new(self.rng.random_range(0.0..self.width), AUTOPLAY_DROP_Y)
        };
        self.actions += 1;

        events.push(InputEvent::PointerMoved(target));
        events.push(InputEvent::PointerPressed(target));
        events.push(InputEvent::PointerReleased(target));
    }
}

/// Platform without a window
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    renderer: HeadlessRenderer,
    script: VecDeque<Vec<InputEvent>>,
    autoplay: Option<AutoPlayer>,
    presented: Vec<FrameStats>,
    keep_history: bool,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_autoplay(mut self, player: AutoPlayer) -> Self {
        self.autoplay = Some(player);
        self
    }

    /// Keep the stats of every presented frame (tests)
    pub fn with_history(mut self) -> Self {
        self.keep_history = true;
        self
    }

    /// Queue the events for one upcoming frame
    pub fn push_frame(&mut self, events: Vec<InputEvent>) {
        self.script.push_back(events);
    }

    pub fn headless_renderer(&self) -> &HeadlessRenderer {
        &self.renderer
    }

    pub fn presented(&self) -> &[FrameStats] {
        &self.presented
    }

    pub fn frames_presented(&self) -> u64 {
        self.renderer.frames()
    }
}

impl Platform for HeadlessPlatform {
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        if let Some(frame) = self.script.pop_front() {
            events.extend(frame);
        }
        if let Some(player) = self.autoplay.as_mut() {
            player.next_events(events);
        }
    }

    fn renderer(&mut self) -> &mut dyn Renderer {
        &mut self.renderer
    }

    fn present(&mut self) {
        let stats = self.renderer.finish_frame();
        if self.keep_history {
            self.presented.push(stats);
        }
    }
}
