//! Built-in physics backend
//!
//! A small deterministic impulse solver for circles and static segments:
//! - semi-implicit Euler integration with a fixed number of substeps
//! - circle/circle and circle/segment narrow phase (no broad phase, rounds hold few balls)
//! - positional correction, restitution and Coulomb friction
//! - contact-begin tracking per body pair
//!
//! Bodies are kept sorted by handle so iteration order, and therefore the
//! order of contact events, is stable.

use std::collections::BTreeSet;

use glam::Vec2;
use log::trace;

use super::physics::{
    BodyHandle, BodyState, CircleBodyDesc, ContactEvent, ContactListener, PhysicsBackend,
    validate_circle, validate_restitution,
};
use crate::consts::*;
use crate::error::PhysicsError;
use crate::normalize_angle;

/// Fraction of penetration removed per substep
const CORRECTION_PERCENT: f32 = 0.8;
/// Penetration tolerated without correction (pixels)
const CORRECTION_SLOP: f32 = 0.05;

/// Solver configuration
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    /// Gravity acceleration (pixels/s²)
    pub gravity: Vec2,
    /// Substeps per `step` call
    pub substeps: u32,
    /// Coulomb friction coefficient
    pub friction: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, GRAVITY),
            substeps: PHYSICS_SUBSTEPS,
            friction: CONTACT_FRICTION,
        }
    }
}

impl WorldConfig {
    /// Same configuration without gravity
    pub fn weightless() -> Self {
        Self {
            gravity: Vec2::ZERO,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Circle { radius: f32 },
    Segment { start: Vec2, end: Vec2 },
}

#[derive(Debug, Clone)]
struct Body {
    handle: BodyHandle,
    shape: Shape,
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    /// Zero for static bodies
    inv_mass: f32,
    restitution: f32,
    tag: Option<u32>,
}

impl Body {
    fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// A detected overlap between two bodies (by index into `bodies`, a < b)
#[derive(Debug, Clone, Copy)]
struct Manifold {
    a: usize,
    b: usize,
    /// Unit normal from A toward B
    normal: Vec2,
    penetration: f32,
    point: Vec2,
}

/// Deterministic circle world
#[derive(Debug)]
pub struct CircleWorld {
    config: WorldConfig,
    bodies: Vec<Body>,
    next_handle: u32,
    /// Pairs touching at the end of the previous substep
    touching: BTreeSet<(BodyHandle, BodyHandle)>,
}

impl Default for CircleWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl CircleWorld {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config: WorldConfig {
                substeps: config.substeps.max(1),
                ..config
            },
            bodies: Vec::new(),
            next_handle: 1,
            touching: BTreeSet::new(),
        }
    }

    fn insert(
        &mut self,
        shape: Shape,
        pos: Vec2,
        vel: Vec2,
        inv_mass: f32,
        restitution: f32,
        tag: Option<u32>,
    ) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        // Handles only grow, so pushing keeps the list sorted
        self.bodies.push(Body {
            handle,
            shape,
            pos,
            vel,
            angle: 0.0,
            inv_mass,
            restitution,
            tag,
        });
        handle
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies.binary_search_by_key(&handle, |b| b.handle).ok()
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            body.vel += gravity * dt;
            body.pos += body.vel * dt;
            // Rolling approximation: spin follows horizontal travel
            if let Shape::Circle { radius } = body.shape {
                body.angle = normalize_angle(body.angle + body.vel.x / radius * dt);
            }
        }
    }

    fn find_contacts(&self) -> Vec<Manifold> {
        let mut manifolds = Vec::new();
        for a in 0..self.bodies.len() {
            for b in (a + 1)..self.bodies.len() {
                let (ba, bb) = (&self.bodies[a], &self.bodies[b]);
                if ba.is_static() && bb.is_static() {
                    continue;
                }
                if let Some(m) = collide(a, ba, b, bb) {
                    manifolds.push(m);
                }
            }
        }
        manifolds
    }

    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Body, &mut Body) {
        debug_assert!(a < b);
        let (left, right) = self.bodies.split_at_mut(b);
        (&mut left[a], &mut right[0])
    }

    fn resolve(&mut self, m: &Manifold) {
        let friction = self.config.friction;
        let (ba, bb) = self.pair_mut(m.a, m.b);
        let inv_sum = ba.inv_mass + bb.inv_mass;
        if inv_sum == 0.0 {
            return;
        }

        // Push the pair apart in proportion to inverse mass
        let depth = (m.penetration - CORRECTION_SLOP).max(0.0);
        let correction = m.normal * (depth * CORRECTION_PERCENT / inv_sum);
        ba.pos -= correction * ba.inv_mass;
        bb.pos += correction * bb.inv_mass;

        let rel = bb.vel - ba.vel;
        let vn = rel.dot(m.normal);
        if vn >= 0.0 {
            return; // Already separating
        }

        let restitution = ba.restitution.min(bb.restitution);
        let j = -(1.0 + restitution) * vn / inv_sum;
        let impulse = m.normal * j;
        ba.vel -= impulse * ba.inv_mass;
        bb.vel += impulse * bb.inv_mass;

        // Friction along the tangent, clamped to the Coulomb cone
        let rel = bb.vel - ba.vel;
        let tangent = (rel - m.normal * rel.dot(m.normal)).normalize_or_zero();
        let jt = (-rel.dot(tangent) / inv_sum).clamp(-j * friction, j * friction);
        let friction_impulse = tangent * jt;
        ba.vel -= friction_impulse * ba.inv_mass;
        bb.vel += friction_impulse * bb.inv_mass;
    }

    fn contact_event(&self, m: &Manifold) -> ContactEvent {
        let (ba, bb) = (&self.bodies[m.a], &self.bodies[m.b]);
        ContactEvent {
            body_a: ba.handle,
            body_b: bb.handle,
            tag_a: ba.tag,
            tag_b: bb.tag,
            position_a: ba.pos,
            position_b: bb.pos,
            point: m.point,
            normal: m.normal,
        }
    }
}

impl PhysicsBackend for CircleWorld {
    fn create_circle_body(&mut self, desc: &CircleBodyDesc) -> Result<BodyHandle, PhysicsError> {
        validate_circle(desc)?;
        let mass = desc.density * std::f32::consts::PI * desc.radius * desc.radius;
        let handle = self.insert(
            Shape::Circle { radius: desc.radius },
            desc.position,
            desc.velocity,
            1.0 / mass,
            desc.restitution,
            desc.tag,
        );
        trace!("Created circle body {:?} r={:.1} at {:?}", handle, desc.radius, desc.position);
        Ok(handle)
    }

    fn create_wall(
        &mut self,
        start: Vec2,
        end: Vec2,
        restitution: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        validate_restitution(restitution)?;
        if !start.is_finite() || !end.is_finite() || start.distance_squared(end) < 1e-6 {
            return Err(PhysicsError::DegenerateWall);
        }
        Ok(self.insert(
            Shape::Segment { start, end },
            (start + end) * 0.5,
            Vec2::ZERO,
            0.0,
            restitution,
            None,
        ))
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(index) = self.index_of(handle) else {
            return false;
        };
        self.bodies.remove(index);
        self.touching.retain(|&(a, b)| a != handle && b != handle);
        true
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool {
        let Some(index) = self.index_of(handle) else {
            return false;
        };
        let body = &mut self.bodies[index];
        body.vel += impulse * body.inv_mass;
        true
    }

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.index_of(handle).map(|i| {
            let body = &self.bodies[i];
            BodyState {
                position: body.pos,
                velocity: body.vel,
                angle: body.angle,
            }
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        let sub_dt = dt / self.config.substeps as f32;

        for _ in 0..self.config.substeps {
            self.integrate(sub_dt);

            let manifolds = self.find_contacts();
            let mut touching_now = BTreeSet::new();
            for m in &manifolds {
                let key = (self.bodies[m.a].handle, self.bodies[m.b].handle);
                touching_now.insert(key);
                if !self.touching.contains(&key) {
                    listener.begin_contact(&self.contact_event(m));
                }
            }

            for m in &manifolds {
                self.resolve(m);
            }
            self.touching = touching_now;
        }
    }
}

/// Narrow phase for one ordered pair
fn collide(ia: usize, a: &Body, ib: usize, b: &Body) -> Option<Manifold> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let delta = b.pos - a.pos;
            let dist_sq = delta.length_squared();
            let reach = ra + rb;
            if dist_sq >= reach * reach {
                return None;
            }
            let dist = dist_sq.sqrt();
            // Coincident centres: separate sideways
            let normal = if dist > 1e-4 { delta / dist } else { Vec2::X };
            Some(Manifold {
                a: ia,
                b: ib,
                normal,
                penetration: reach - dist,
                point: a.pos + normal * (ra - (reach - dist) * 0.5),
            })
        }
        (Shape::Segment { start, end }, Shape::Circle { radius }) => {
            let (normal, penetration, point) = circle_segment(b.pos, radius, start, end)?;
            Some(Manifold { a: ia, b: ib, normal, penetration, point })
        }
        (Shape::Circle { radius }, Shape::Segment { start, end }) => {
            let (normal, penetration, point) = circle_segment(a.pos, radius, start, end)?;
            // Normal must point from A (circle) toward B (segment)
            Some(Manifold { a: ia, b: ib, normal: -normal, penetration, point })
        }
        (Shape::Segment { .. }, Shape::Segment { .. }) => None,
    }
}

/// Circle against a segment; normal points from the segment toward the circle
fn circle_segment(center: Vec2, radius: f32, start: Vec2, end: Vec2) -> Option<(Vec2, f32, Vec2)> {
    let line_vec = end - start;
    let line_len_sq = line_vec.length_squared();
    let t = ((center - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let closest = start + line_vec * t;
    let offset = center - closest;
    let dist = offset.length();
    if dist >= radius {
        return None;
    }
    let normal = if dist > 1e-4 {
        offset / dist
    } else {
        // Centre on the line: use the segment's left-hand perpendicular
        Vec2::new(-line_vec.y, line_vec.x).normalize()
    };
    Some((normal, radius - dist, closest))
}
