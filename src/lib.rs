//! Merge Drop - a merge-ball arcade game
//!
//! Core modules:
//! - `sim`: Ball model, physics backend, contact resolution and the deferred ball registry
//! - `scenes`: Main menu, game round and high score scenes
//! - `app`: Fixed-rate application loop and scene switching
//! - `renderer`: Vertex generation and the renderer interface
//! - `platform`: Input events and the platform interface (headless implementation included)

pub mod app;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod scenes;
pub mod settings;
pub mod sim;

pub use app::{AppContext, Application};
pub use error::{AppError, PhysicsError, SceneError};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one physics step per frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Default frame rate the application loop throttles to
    pub const TARGET_FPS: u32 = 60;
    /// Physics substeps per simulation step
    pub const PHYSICS_SUBSTEPS: u32 = 4;

    /// Gravity in pixels/s² (screen space, y grows downward)
    pub const GRAVITY: f32 = 980.0;

    /// Ball size table parameters
    pub const BASE_RADIUS: f32 = 25.0;
    pub const RADIUS_MULTIPLIER: f64 = 1.26;
    pub const BASE_DENSITY: f32 = 0.3;
    pub const DENSITY_MULTIPLIER: f64 = 1.05;
    /// Number of distinct ball sizes
    pub const TOTAL_TYPES: usize = 10;

    /// Bounciness of ball bodies
    pub const BALL_RESTITUTION: f32 = 0.15;
    /// Bounciness of the arena walls and floor
    pub const WALL_RESTITUTION: f32 = 0.1;
    /// Coulomb friction coefficient for all contacts
    pub const CONTACT_FRICTION: f32 = 0.3;

    /// Repulsion impulse per pixel of the smaller radius for non-merging contacts
    pub const REPULSION_IMPULSE_PER_RADIUS: f32 = 400.0;

    /// Arena layout (distance from the top edge)
    pub const DROP_LINE_Y: f32 = 60.0;
    pub const LOSS_LINE_Y: f32 = 140.0;

    /// Initial downward speed of a dropped ball
    pub const DROP_SPEED: f32 = 40.0;
    /// Maximum sideways speed jitter of a dropped ball
    pub const DROP_JITTER: f32 = 6.0;
    /// Ticks between two drops (0.5 seconds)
    pub const DROP_COOLDOWN_TICKS: u32 = 30;

    /// Only the smallest types are ever dropped, weighted toward WHITE
    pub const DROP_WEIGHTS: [u32; 5] = [5, 4, 3, 2, 1];

    /// A ball slower than this (pixels/s) counts as resting
    pub const REST_SPEED: f32 = 20.0;
    /// Ticks a resting ball may stay above the loss line before the round ends (2 seconds)
    pub const LOSS_GRACE_TICKS: u32 = 120;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert!((normalize_angle(-2.0 * PI - 0.5) - (-0.5)).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        // Rounding may land either side of the seam
        let seam = normalize_angle(3.0 * PI);
        assert!((seam.abs() - PI).abs() < 1e-5);
        assert!((-PI..PI).contains(&seam));
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(2.0, PI / 2.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }
}
