//! Application settings
//!
//! Fixed for the lifetime of the process: window size and title come from
//! the command line, the rest has sensible defaults. Physics tuning lives in
//! `consts` and is not configurable at runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::TARGET_FPS;

/// Startup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Window width (pixels), also the arena width
    pub width: u32,
    /// Window height (pixels), also the arena height
    pub height: u32,
    /// Window title
    pub title: String,
    /// Frame rate the loop throttles to (0 = unthrottled)
    pub target_fps: u32,
    /// Seed for round RNGs; each round derives its own seed from it
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 960,
            title: "Merge Drop".to_string(),
            target_fps: TARGET_FPS,
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Time budget of one frame, None when unthrottled
    pub fn frame_budget(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.target_fps as f64))
    }

    /// Same settings without frame throttling (tests, headless runs)
    pub fn unthrottled(mut self) -> Self {
        self.target_fps = 0;
        self
    }
}
