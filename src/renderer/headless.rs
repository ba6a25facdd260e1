//! Headless renderer
//!
//! Keeps the current frame's vertex data and text in memory. Used by the
//! native binary (no window backend) and by tests to inspect what a scene drew.

use glam::Vec2;
use log::trace;

use super::{Renderer, Vertex};

/// A line of text drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub position: Vec2,
    pub size: f32,
}

/// Summary of a finished frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub vertices: usize,
    pub bytes: usize,
    pub texts: usize,
    /// Leading 8 bytes of the blake3 hash of the frame's vertices and text
    pub digest: u64,
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    clear_color: [f32; 4],
    vertices: Vec<Vertex>,
    texts: Vec<TextItem>,
    frames: u64,
    last: FrameStats,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current frame and start an empty one
    pub fn finish_frame(&mut self) -> FrameStats {
        let bytes = Vertex::as_bytes(&self.vertices);
        let stats = FrameStats {
            vertices: self.vertices.len(),
            bytes: bytes.len(),
            texts: self.texts.len(),
            digest: frame_digest(bytes, &self.texts),
        };
        trace!("Frame {}: {:?}", self.frames, stats);
        self.frames += 1;
        self.last = stats;
        self.vertices.clear();
        self.texts.clear();
        stats
    }

    /// Frames finished so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Vertices drawn so far in the current frame
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Text drawn so far in the current frame
    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }
}

impl Renderer for HeadlessRenderer {
    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        self.vertices.clear();
        self.texts.clear();
    }

    fn draw_triangles(&mut self, vertices: &[Vertex]) {
        debug_assert!(vertices.len() % 3 == 0, "triangle list length must be a multiple of 3");
        self.vertices.extend_from_slice(vertices);
    }

    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, _color: [f32; 4]) {
        self.texts.push(TextItem {
            text: text.to_string(),
            position,
            size,
        });
    }
}

fn frame_digest(vertex_bytes: &[u8], texts: &[TextItem]) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(vertex_bytes.len() as u64).to_le_bytes());
    hasher.update(vertex_bytes);
    for item in texts {
        hasher.update(&(item.text.len() as u64).to_le_bytes());
        hasher.update(item.text.as_bytes());
        hasher.update(&item.position.x.to_le_bytes());
        hasher.update(&item.position.y.to_le_bytes());
    }
    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}
