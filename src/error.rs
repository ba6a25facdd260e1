//! Error types for physics, scenes and the application loop.

use std::fmt;

use crate::scenes::SceneId;

/// Errors reported by a physics backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Radius must be positive and finite.
    InvalidRadius(f32),
    /// Density must be positive and finite.
    InvalidDensity(f32),
    /// Restitution must be in [0, 1].
    InvalidRestitution(f32),
    /// A wall needs two distinct, finite end points.
    DegenerateWall,
    /// Arena is too small to hold the largest ball.
    InvalidArena { width: f32, height: f32 },
    /// The ball already has a physics body.
    AlreadyAttached(u32),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidRadius(r) => {
                write!(f, "radius must be positive and finite (got {})", r)
            }
            PhysicsError::InvalidDensity(d) => {
                write!(f, "density must be positive and finite (got {})", d)
            }
            PhysicsError::InvalidRestitution(e) => {
                write!(f, "restitution must be in [0, 1] (got {})", e)
            }
            PhysicsError::DegenerateWall => {
                write!(f, "wall end points must be distinct and finite")
            }
            PhysicsError::InvalidArena { width, height } => {
                write!(f, "arena {}x{} cannot hold the largest ball", width, height)
            }
            PhysicsError::AlreadyAttached(id) => write!(f, "ball {} already has a body", id),
        }
    }
}

impl std::error::Error for PhysicsError {}

/// Errors raised while bringing a scene up.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Scene-level resources could not be created.
    Init { scene: &'static str, reason: String },
    /// The physics world or its static geometry failed to build.
    Physics(PhysicsError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Init { scene, reason } => {
                write!(f, "failed to initialize {}: {}", scene, reason)
            }
            SceneError::Physics(e) => write!(f, "physics world setup failed: {}", e),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Physics(e) => Some(e),
            SceneError::Init { .. } => None,
        }
    }
}

impl From<PhysicsError> for SceneError {
    fn from(e: PhysicsError) -> Self {
        SceneError::Physics(e)
    }
}

/// Errors from scene switching in the application loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// No scene was registered under this id.
    UnregisteredScene(SceneId),
    /// The incoming scene failed to initialize.
    SceneInit(SceneError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnregisteredScene(id) => write!(f, "scene {:?} is not registered", id),
            AppError::SceneInit(e) => write!(f, "scene switch failed: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::SceneInit(e) => Some(e),
            AppError::UnregisteredScene(_) => None,
        }
    }
}

impl From<SceneError> for AppError {
    fn from(e: SceneError) -> Self {
        AppError::SceneInit(e)
    }
}
