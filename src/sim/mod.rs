//! Deterministic simulation module
//!
//! All merge logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by ball id and body handle)
//! - No rendering or platform dependencies
//! - Structural changes to the ball set only after a physics step returns

pub mod arena;
pub mod ball;
pub mod physics;
pub mod registry;
pub mod resolver;
pub mod tick;
pub mod world;

pub use arena::Arena;
pub use ball::{Ball, BallId, BallType};
pub use physics::{
    BodyHandle, BodyState, CircleBodyDesc, ContactEvent, ContactListener, PhysicsBackend,
};
pub use registry::{BallRegistry, DeferredReport};
pub use resolver::{ContactOutcome, ContactResolver, MergeEvent};
pub use tick::{TickReport, tick};
pub use world::{CircleWorld, WorldConfig};
