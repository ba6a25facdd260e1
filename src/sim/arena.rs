//! Arena geometry
//!
//! Screen-space box, y grows downward:
//! - side walls at x = 0 and x = width
//! - floor at y = height
//! - balls are dropped from `drop_y`; resting above `loss_y` ends the round

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::BallType;
use crate::consts::*;
use crate::error::PhysicsError;

/// The playing field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    /// Height at which new balls appear
    pub drop_y: f32,
    /// Loss line
    pub loss_y: f32,
}

impl Arena {
    /// Build an arena for a window, rejecting sizes that cannot hold the terminal ball
    pub fn new(width: f32, height: f32) -> Result<Self, PhysicsError> {
        let largest = BallType::TERMINAL.radius() * 2.0;
        let finite = width.is_finite() && height.is_finite();
        if !finite || width <= largest || height <= LOSS_LINE_Y + largest {
            return Err(PhysicsError::InvalidArena { width, height });
        }
        Ok(Self {
            width,
            height,
            drop_y: DROP_LINE_Y,
            loss_y: LOSS_LINE_Y,
        })
    }

    /// Wall segments (left, right, floor). Side walls extend above the top edge
    /// so a freshly dropped ball cannot escape sideways.
    pub fn walls(&self) -> [(Vec2, Vec2); 3] {
        let top = -self.height;
        [
            (Vec2::new(0.0, top), Vec2::new(0.0, self.height)),
            (Vec2::new(self.width, top), Vec2::new(self.width, self.height)),
            (Vec2::new(0.0, self.height), Vec2::new(self.width, self.height)),
        ]
    }

    /// Clamp a drop column so a ball of `radius` fits between the walls
    pub fn clamp_drop_x(&self, x: f32, radius: f32) -> f32 {
        x.clamp(radius, self.width - radius)
    }

    /// Where a ball of `radius` would be dropped for pointer column `x`
    pub fn drop_point(&self, x: f32, radius: f32) -> Vec2 {
        Vec2::new(self.clamp_drop_x(x, radius), self.drop_y)
    }

    /// Whether a disc's top edge is above the loss line
    pub fn is_above_loss_line(&self, center: Vec2, radius: f32) -> bool {
        center.y - radius < self.loss_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_rejects_small_window() {
        assert!(Arena::new(300.0, 900.0).is_err());
        assert!(Arena::new(640.0, 200.0).is_err());
        assert!(Arena::new(f32::NAN, 900.0).is_err());
        assert!(Arena::new(640.0, 960.0).is_ok());
    }

    #[test]
    fn test_clamp_drop_x() {
        let arena = Arena::new(640.0, 960.0).unwrap();
        assert_eq!(arena.clamp_drop_x(-50.0, 25.0), 25.0);
        assert_eq!(arena.clamp_drop_x(700.0, 25.0), 615.0);
        assert_eq!(arena.clamp_drop_x(320.0, 25.0), 320.0);
        assert_eq!(arena.drop_point(0.0, 30.0), Vec2::new(30.0, DROP_LINE_Y));
    }

    #[test]
    fn test_loss_line() {
        let arena = Arena::new(640.0, 960.0).unwrap();
        assert!(arena.is_above_loss_line(Vec2::new(100.0, LOSS_LINE_Y + 10.0), 25.0));
        assert!(!arena.is_above_loss_line(Vec2::new(100.0, LOSS_LINE_Y + 30.0), 25.0));
    }

    #[test]
    fn test_walls_enclose_floor() {
        let arena = Arena::new(640.0, 960.0).unwrap();
        let [left, right, floor] = arena.walls();
        assert_eq!(left.0.x, 0.0);
        assert_eq!(right.0.x, 640.0);
        assert_eq!(floor.0.y, 960.0);
        assert_eq!(floor.1, Vec2::new(640.0, 960.0));
    }
}
