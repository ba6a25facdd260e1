//! Shape generation for 2D primitives
//!
//! Everything is emitted as plain triangle lists.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::polar_to_cartesian;
use crate::sim::Ball;

/// Colour of the rotation marker drawn on balls
const MARKER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.35];

/// Segment count for a circle of the given radius (more for bigger circles)
pub fn segments_for_radius(radius: f32) -> usize {
    ((radius * 0.6) as usize).clamp(12, 64)
}

/// Filled circle as a triangle fan expanded into a triangle list
pub fn circle(center: Vec2, radius: f32, color: [f32; 4]) -> Vec<Vertex> {
    let segments = segments_for_radius(radius);
    let mut vertices = Vec::with_capacity(segments * 3);
    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;
        let p0 = center + polar_to_cartesian(radius, a0);
        let p1 = center + polar_to_cartesian(radius, a1);
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p0.x, p0.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
    }
    vertices
}

/// Axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, max.y, color),
    ]
}

/// Thick line segment as a quad
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    let v1a = a + perp;
    let v1b = a - perp;
    let v2a = b + perp;
    let v2b = b - perp;

    vec![
        Vertex::new(v1a.x, v1a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2b.x, v2b.y, color),
    ]
}

/// Rectangle outline
pub fn rect_outline(min: Vec2, max: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
    let mut vertices = Vec::with_capacity(24);
    for i in 0..4 {
        vertices.extend(line(corners[i], corners[(i + 1) % 4], width, color));
    }
    vertices
}

/// A ball: filled disc plus a marker showing its rotation
pub fn ball(ball: &Ball) -> Vec<Vertex> {
    ball_at(ball.pos, ball.radius, ball.angle, ball.kind.color())
}

/// A ball-like disc anywhere (used for drop previews)
pub fn ball_at(center: Vec2, radius: f32, angle: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = circle(center, radius, color);
    let tip = center + polar_to_cartesian(radius * 0.75, angle);
    vertices.extend(line(center, tip, (radius * 0.12).max(2.0), MARKER_COLOR));
    vertices
}
