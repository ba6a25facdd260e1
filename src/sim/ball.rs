//! Ball types and the ball entity
//!
//! Every ball belongs to one of ten size classes. Radius and density grow
//! geometrically with the ordinal:
//! - radius = BASE_RADIUS * RADIUS_MULTIPLIER^n
//! - density = BASE_DENSITY * DENSITY_MULTIPLIER^n

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::BodyHandle;
use crate::consts::*;

/// Geometric table `base * multiplier^n` for every ball type.
const fn geometric_table(base: f32, multiplier: f64) -> [f32; TOTAL_TYPES] {
    let mut table = [0.0; TOTAL_TYPES];
    let mut value = base as f64;
    let mut i = 0;
    while i < TOTAL_TYPES {
        table[i] = value as f32;
        value *= multiplier;
        i += 1;
    }
    table
}

static RADIUS_TABLE: [f32; TOTAL_TYPES] = geometric_table(BASE_RADIUS, RADIUS_MULTIPLIER);
static DENSITY_TABLE: [f32; TOTAL_TYPES] = geometric_table(BASE_DENSITY, DENSITY_MULTIPLIER);

/// Size class of a ball, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BallType {
    White = 0,
    Red = 1,
    Violet = 2,
    Orange = 3,
    Yellow = 4,
    Green = 5,
    Lime = 6,
    Pink = 7,
    Blue = 8,
    /// Terminal type, never merges
    Black = 9,
}

impl BallType {
    pub const ALL: [BallType; TOTAL_TYPES] = [
        BallType::White,
        BallType::Red,
        BallType::Violet,
        BallType::Orange,
        BallType::Yellow,
        BallType::Green,
        BallType::Lime,
        BallType::Pink,
        BallType::Blue,
        BallType::Black,
    ];

    /// Largest type
    pub const TERMINAL: BallType = BallType::Black;

    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    #[inline]
    pub fn radius(self) -> f32 {
        RADIUS_TABLE[self.ordinal()]
    }

    #[inline]
    pub fn density(self) -> f32 {
        DENSITY_TABLE[self.ordinal()]
    }

    /// Mass of a disc of this type
    pub fn mass(self) -> f32 {
        let r = self.radius();
        self.density() * std::f32::consts::PI * r * r
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    /// The type two balls of this type merge into (None for the terminal type)
    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// Points awarded when a merge produces this type
    ///
    /// Triangular in the ordinal: RED = 1, VIOLET = 3, ..., BLACK = 45.
    pub fn merge_score(self) -> u64 {
        let n = self.ordinal() as u64;
        n * (n + 1) / 2
    }

    pub fn name(self) -> &'static str {
        match self {
            BallType::White => "white",
            BallType::Red => "red",
            BallType::Violet => "violet",
            BallType::Orange => "orange",
            BallType::Yellow => "yellow",
            BallType::Green => "green",
            BallType::Lime => "lime",
            BallType::Pink => "pink",
            BallType::Blue => "blue",
            BallType::Black => "black",
        }
    }

    /// Fill colour (linear RGBA)
    pub fn color(self) -> [f32; 4] {
        match self {
            BallType::White => [0.95, 0.95, 0.95, 1.0],
            BallType::Red => [0.90, 0.15, 0.15, 1.0],
            BallType::Violet => [0.55, 0.25, 0.85, 1.0],
            BallType::Orange => [1.00, 0.55, 0.10, 1.0],
            BallType::Yellow => [0.98, 0.88, 0.15, 1.0],
            BallType::Green => [0.10, 0.60, 0.20, 1.0],
            BallType::Lime => [0.60, 0.90, 0.20, 1.0],
            BallType::Pink => [1.00, 0.55, 0.75, 1.0],
            BallType::Blue => [0.15, 0.35, 0.95, 1.0],
            BallType::Black => [0.08, 0.08, 0.08, 1.0],
        }
    }
}

/// Stable ball identifier, never reused within a registry
///
/// Stored as the opaque tag of the ball's physics body so contacts can be
/// mapped back to balls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// A ball entity
///
/// A ball starts either attached (created with its physics body) or
/// suspended: known to the round, positioned, but not simulated until a body
/// is attached. The held ball waiting at the drop line is suspended.
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: BallId,
    pub kind: BallType,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation (radians, normalized to [-π, π))
    pub angle: f32,
    /// Cached `kind.radius()`
    pub radius: f32,
    /// False once consumed by a merge (removed on the next deferred apply)
    pub alive: bool,
    /// Latches on the ball's first contact with anything
    pub has_collided: bool,
    /// Consecutive ticks spent resting above the loss line
    pub over_line_ticks: u32,
    suspended: bool,
    pub(crate) body: Option<BodyHandle>,
}

impl Ball {
    pub(crate) fn new(id: BallId, kind: BallType, pos: Vec2, vel: Vec2, body: BodyHandle) -> Self {
        Self {
            suspended: false,
            body: Some(body),
            ..Self::suspended(id, kind, pos).with_velocity(vel)
        }
    }

    /// A ball outside the simulation, without a body
    pub(crate) fn suspended(id: BallId, kind: BallType, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            radius: kind.radius(),
            alive: true,
            has_collided: false,
            over_line_ticks: 0,
            suspended: true,
            body: None,
        }
    }

    fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Hand the ball its body; it is simulated from now on
    pub(crate) fn attach_body(&mut self, body: BodyHandle, vel: Vec2) {
        self.body = Some(body);
        self.vel = vel;
        self.suspended = false;
    }

    /// Physics body backing this ball, None while suspended
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Whether the ball has come to rest
    pub fn is_resting(&self) -> bool {
        self.vel.length() < REST_SPEED
    }
}
