//! Physics backend interface
//!
//! The game treats the rigid-body solver as a black box. A backend:
//! - creates and destroys circular bodies and static wall segments
//! - applies impulses and reports body state
//! - advances time and reports contact begins to a listener, synchronously,
//!   from inside `step`
//!
//! While `step` runs the backend is mutably borrowed, so a listener can only
//! record what it wants done. Structural changes happen after `step` returns.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Opaque handle to a body inside a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Parameters for a dynamic circular body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleBodyDesc {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub density: f32,
    pub restitution: f32,
    /// Opaque user tag reported back in contact events
    pub tag: Option<u32>,
}

/// Snapshot of a body's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
}

/// Beginning of contact between two bodies during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub tag_a: Option<u32>,
    pub tag_b: Option<u32>,
    /// Body positions at the moment contact began
    pub position_a: Vec2,
    pub position_b: Vec2,
    /// World-space contact point
    pub point: Vec2,
    /// Unit contact normal pointing from A toward B
    pub normal: Vec2,
}

impl ContactEvent {
    /// Same contact seen from the other body
    pub fn flipped(&self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            tag_a: self.tag_b,
            tag_b: self.tag_a,
            position_a: self.position_b,
            position_b: self.position_a,
            point: self.point,
            normal: -self.normal,
        }
    }
}

/// Receives contact begins from inside `PhysicsBackend::step`
pub trait ContactListener {
    fn begin_contact(&mut self, contact: &ContactEvent);
}

impl<F: FnMut(&ContactEvent)> ContactListener for F {
    fn begin_contact(&mut self, contact: &ContactEvent) {
        self(contact)
    }
}

/// Rigid-body world used by a game round
pub trait PhysicsBackend {
    /// Create a dynamic circle
    fn create_circle_body(&mut self, desc: &CircleBodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Create a static line segment (arena walls and floor)
    fn create_wall(
        &mut self,
        start: Vec2,
        end: Vec2,
        restitution: f32,
    ) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body. Returns false if the handle is unknown.
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    /// Apply an impulse at the body's centre of mass. Returns false if the handle is unknown.
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool;

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState>;

    /// Number of bodies (dynamic and static)
    fn body_count(&self) -> usize;

    /// Advance the world by `dt`, reporting contact begins to `listener`
    fn step(&mut self, dt: f32, listener: &mut dyn ContactListener);
}

/// Check a circle description before it reaches a backend
pub fn validate_circle(desc: &CircleBodyDesc) -> Result<(), PhysicsError> {
    if !desc.radius.is_finite() || desc.radius <= 0.0 {
        return Err(PhysicsError::InvalidRadius(desc.radius));
    }
    if !desc.density.is_finite() || desc.density <= 0.0 {
        return Err(PhysicsError::InvalidDensity(desc.density));
    }
    validate_restitution(desc.restitution)
}

pub fn validate_restitution(restitution: f32) -> Result<(), PhysicsError> {
    if !(0.0..=1.0).contains(&restitution) {
        return Err(PhysicsError::InvalidRestitution(restitution));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> CircleBodyDesc {
        CircleBodyDesc {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 10.0,
            density: 1.0,
            restitution: 0.5,
            tag: None,
        }
    }

    #[test]
    fn test_validate_circle() {
        assert!(validate_circle(&desc()).is_ok());
        assert_eq!(
            validate_circle(&CircleBodyDesc { radius: 0.0, ..desc() }),
            Err(PhysicsError::InvalidRadius(0.0))
        );
        assert!(matches!(
            validate_circle(&CircleBodyDesc { density: f32::NAN, ..desc() }),
            Err(PhysicsError::InvalidDensity(_))
        ));
        assert_eq!(
            validate_circle(&CircleBodyDesc { restitution: 1.5, ..desc() }),
            Err(PhysicsError::InvalidRestitution(1.5))
        );
    }

    #[test]
    fn test_flipped_contact() {
        let contact = ContactEvent {
            body_a: BodyHandle(1),
            body_b: BodyHandle(2),
            tag_a: Some(10),
            tag_b: None,
            position_a: Vec2::ZERO,
            position_b: Vec2::X,
            point: Vec2::new(0.5, 0.0),
            normal: Vec2::X,
        };
        let flipped = contact.flipped();
        assert_eq!(flipped.body_a, BodyHandle(2));
        assert_eq!(flipped.tag_b, Some(10));
        assert_eq!(flipped.normal, -Vec2::X);
        assert_eq!(flipped.flipped(), contact);
    }

    #[test]
    fn test_closure_is_listener() {
        let mut seen = 0;
        {
            let mut count = |_: &ContactEvent| seen += 1;
            let listener: &mut dyn ContactListener = &mut count;
            let contact = ContactEvent {
                body_a: BodyHandle(1),
                body_b: BodyHandle(2),
                tag_a: None,
                tag_b: None,
                position_a: Vec2::ZERO,
                position_b: Vec2::ZERO,
                point: Vec2::ZERO,
                normal: Vec2::X,
            };
            listener.begin_contact(&contact);
            listener.begin_contact(&contact);
        }
        assert_eq!(seen, 2);
    }
}
