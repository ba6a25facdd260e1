//! Rendering interface
//!
//! Scenes describe frames as triangle lists and text. A device-backed
//! renderer lives outside this crate; `HeadlessRenderer` records frames.

pub mod headless;
pub mod shapes;
pub mod vertex;

pub use headless::HeadlessRenderer;
pub use vertex::Vertex;

use glam::Vec2;

/// Draw target for one frame
pub trait Renderer {
    /// Start a frame filled with `color`
    fn clear(&mut self, color: [f32; 4]);

    /// Draw a triangle list
    fn draw_triangles(&mut self, vertices: &[Vertex]);

    /// Draw text with its top-left corner at `position` (pixels)
    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: [f32; 4]);
}

/// Palette shared by the scenes
pub mod palette {
    pub const BACKGROUND: [f32; 4] = [0.96, 0.87, 0.70, 1.0];
    pub const WALL: [f32; 4] = [0.35, 0.22, 0.12, 1.0];
    pub const LOSS_LINE: [f32; 4] = [0.85, 0.10, 0.10, 0.6];
    pub const TEXT: [f32; 4] = [0.10, 0.10, 0.10, 1.0];
    pub const TEXT_MUTED: [f32; 4] = [0.35, 0.35, 0.35, 1.0];
    pub const BANNER: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
    pub const BANNER_TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

/// Approximate width of `text` rendered at `size` pixels
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.55
}
