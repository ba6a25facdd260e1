//! Application loop and scene switching
//!
//! Each frame:
//! 1. collect every pending input event into the frame buffer
//! 2. track the pointer and window close from the buffer
//! 3. current scene: `poll_events` → `update` → `render`
//! 4. present, clear the buffer
//! 5. apply a scene switch requested during the frame
//!
//! The loop ends after the frame in which a close was requested.

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec2;
use log::{debug, error, info, warn};

use crate::error::AppError;
use crate::highscores::HighScores;
use crate::platform::{InputEvent, Platform};
use crate::scenes::{Scene, SceneId};
use crate::settings::Settings;

/// Golden-ratio increment used to derive per-round seeds
const SEED_STEP: u64 = 0x9e37_79b9_7f4a_7c15;

/// State shared by all scenes
#[derive(Debug)]
pub struct AppContext {
    settings: Settings,
    /// Last known pointer position (window pixels)
    pub pointer: Vec2,
    /// Session leaderboard
    pub high_scores: HighScores,
    rounds: u64,
    close_requested: bool,
    pending_switch: Option<SceneId>,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pointer: Vec2::ZERO,
            high_scores: HighScores::new(),
            rounds: 0,
            close_requested: false,
            pending_switch: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn width(&self) -> f32 {
        self.settings.width as f32
    }

    pub fn height(&self) -> f32 {
        self.settings.height as f32
    }

    /// Ask for a scene switch at the end of the current frame
    pub fn switch_to(&mut self, id: SceneId) {
        if let Some(previous) = self.pending_switch.replace(id) {
            debug!("Scene switch to {:?} overrides pending {:?}", id, previous);
        }
    }

    pub fn pending_switch(&self) -> Option<SceneId> {
        self.pending_switch
    }

    /// Ask the loop to stop after the current frame
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Seed for the next round
    pub fn next_round_seed(&mut self) -> u64 {
        let seed = self.settings.seed.wrapping_add(self.rounds.wrapping_mul(SEED_STEP));
        self.rounds += 1;
        seed
    }

    pub fn rounds_started(&self) -> u64 {
        self.rounds
    }
}

/// Owns the scenes and runs the frame loop
pub struct Application {
    ctx: AppContext,
    scenes: HashMap<SceneId, Box<dyn Scene>>,
    current: Option<SceneId>,
    frame_events: Vec<InputEvent>,
    frames: u64,
}

impl Application {
    pub fn new(settings: Settings) -> Self {
        info!(
            "{} ({}x{}) starting",
            settings.title, settings.width, settings.height
        );
        Self {
            ctx: AppContext::new(settings),
            scenes: HashMap::new(),
            current: None,
            frame_events: Vec::new(),
            frames: 0,
        }
    }

    /// Register a scene under `id`, replacing any previous one
    pub fn register_scene(&mut self, id: SceneId, scene: Box<dyn Scene>) {
        if self.current == Some(id) {
            warn!("Replacing scene {:?} while it is current", id);
        }
        if self.scenes.insert(id, scene).is_some() {
            warn!("Scene {:?} was already registered and has been replaced", id);
        }
    }

    /// Make `id` the current scene
    ///
    /// The outgoing scene is cleaned up first. If the incoming scene fails to
    /// initialize there is no current scene afterwards and a close is requested.
    pub fn set_current_scene(&mut self, id: SceneId) -> Result<(), AppError> {
        if !self.scenes.contains_key(&id) {
            error!("Attempted to switch to unregistered scene {:?}", id);
            self.ctx.request_close();
            return Err(AppError::UnregisteredScene(id));
        }

        if let Some(outgoing) = self.current.take() {
            if let Some(scene) = self.scenes.get_mut(&outgoing) {
                debug!("Cleaning up scene {}", scene.name());
                scene.clean_up(&mut self.ctx);
            }
        }

        let Some(scene) = self.scenes.get_mut(&id) else {
            return Err(AppError::UnregisteredScene(id));
        };
        match scene.init(&mut self.ctx) {
            Ok(()) => {
                info!("Entered scene {}", scene.name());
                self.current = Some(id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to initialize scene {}: {}", scene.name(), e);
                self.ctx.request_close();
                Err(AppError::SceneInit(e))
            }
        }
    }

    pub fn current_scene(&self) -> Option<SceneId> {
        self.current
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn should_close(&self) -> bool {
        self.ctx.should_close()
    }

    pub fn request_close(&mut self) {
        self.ctx.request_close();
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame
    pub fn tick(&mut self, platform: &mut dyn Platform) {
        platform.poll_events(&mut self.frame_events);
        self.handle_events();

        if let Some(scene) = self.current.and_then(|id| self.scenes.get_mut(&id)) {
            scene.poll_events(&self.frame_events, &mut self.ctx);
            scene.update(&mut self.ctx);
            scene.render(platform.renderer(), &self.ctx);
        }
        platform.present();
        self.frame_events.clear();
        self.frames += 1;

        if let Some(next) = self.ctx.pending_switch.take() {
            if self.ctx.should_close() {
                debug!("Ignoring switch to {:?}: close requested", next);
            } else if let Err(e) = self.set_current_scene(next) {
                error!("Scene switch failed: {}", e);
            }
        }
    }

    /// Run frames until a close is requested or `max_frames` have run
    ///
    /// Returns the number of frames run by this call. The current scene is
    /// cleaned up before returning.
    pub fn run(&mut self, platform: &mut dyn Platform, max_frames: Option<u64>) -> u64 {
        let budget = self.ctx.settings().frame_budget();
        let start = self.frames;

        while !self.should_close() && max_frames.is_none_or(|max| self.frames - start < max) {
            let frame_start = Instant::now();
            self.tick(platform);
            if let Some(budget) = budget {
                let elapsed = frame_start.elapsed();
                if elapsed < budget {
                    std::thread::sleep(budget - elapsed);
                }
            }
        }

        self.shutdown();
        let ran = self.frames - start;
        info!("Loop finished after {} frames", ran);
        ran
    }

    /// Clean up the current scene, leaving none current
    pub fn shutdown(&mut self) {
        if let Some(id) = self.current.take() {
            if let Some(scene) = self.scenes.get_mut(&id) {
                debug!("Shutting down scene {}", scene.name());
                scene.clean_up(&mut self.ctx);
            }
        }
    }

    /// Pointer tracking and window close
    fn handle_events(&mut self) {
        for event in &self.frame_events {
            if let Some(pointer) = event.pointer() {
                self.ctx.pointer = pointer;
            }
            if *event == InputEvent::CloseRequested {
                info!("Close requested by platform");
                self.ctx.request_close();
            }
        }
    }
}
