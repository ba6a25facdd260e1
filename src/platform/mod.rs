//! Platform abstraction layer
//!
//! Handles the device side of the loop:
//! - Input events, delivered as an ordered per-frame sequence
//! - The render target for the frame
//! - Presenting the finished frame
//!
//! The crate ships a headless platform; window/audio bring-up is external.

pub mod headless;

pub use headless::{AutoPlayer, HeadlessPlatform};

use glam::Vec2;

use crate::renderer::Renderer;

/// Keys the scenes react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Other,
}

/// One input event (pointer positions in window pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    PointerPressed(Vec2),
    PointerReleased(Vec2),
    KeyPressed(Key),
    /// Window close button / OS quit
    CloseRequested,
}

impl InputEvent {
    /// Pointer position carried by the event, if any
    pub fn pointer(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerMoved(p)
            | InputEvent::PointerPressed(p)
            | InputEvent::PointerReleased(p) => Some(p),
            _ => None,
        }
    }
}

/// Device side of the application loop
pub trait Platform {
    /// Append every pending input event, oldest first
    fn poll_events(&mut self, events: &mut Vec<InputEvent>);

    /// Render target for the current frame
    fn renderer(&mut self) -> &mut dyn Renderer;

    /// Show the finished frame
    fn present(&mut self);
}
