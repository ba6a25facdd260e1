//! Ball registry with deferred mutation
//!
//! The registry owns every simulated ball of the current round. While the
//! physics backend is stepping, contact handling may only *schedule* work:
//! - `schedule_removal` marks a ball consumed
//! - `schedule_spawn` queues a new ball
//! - `queue_repulsion` queues a pair of opposite impulses
//!
//! `apply_deferred` runs after the step has returned: impulses first, then
//! removals (destroying bodies), then spawns. A merged ball is therefore
//! never created while its predecessors' bodies still exist.
//!
//! Suspended balls (`prepare`) get an id but stay outside the registry until
//! `attach` gives them a body.

use glam::Vec2;
use log::{debug, error, warn};

use super::arena::Arena;
use super::ball::{Ball, BallId, BallType};
use super::physics::{BodyHandle, CircleBodyDesc, PhysicsBackend};
use crate::consts::*;
use crate::error::PhysicsError;

/// A ball waiting to be created after the step
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSpawn {
    kind: BallType,
    position: Vec2,
    velocity: Vec2,
}

/// Opposite impulses waiting for the step to finish: `b` is pushed along
/// `impulse`, `a` against it. Applied to both balls or to neither.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRepulsion {
    a: BallId,
    b: BallId,
    impulse: Vec2,
}

/// What one `apply_deferred` call did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredReport {
    pub impulses: usize,
    pub removed: Vec<BallId>,
    pub spawned: Vec<BallId>,
}

impl DeferredReport {
    pub fn is_empty(&self) -> bool {
        self.impulses == 0 && self.removed.is_empty() && self.spawned.is_empty()
    }
}

/// Live balls of a round (sorted by id for determinism)
#[derive(Debug, Default)]
pub struct BallRegistry {
    balls: Vec<Ball>,
    next_id: u32,
    walls: Vec<BodyHandle>,
    pending_removals: Vec<BallId>,
    pending_spawns: Vec<PendingSpawn>,
    pending_repulsions: Vec<PendingRepulsion>,
}

impl BallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the arena's side walls and floor as static geometry
    pub fn build_arena(
        &mut self,
        world: &mut dyn PhysicsBackend,
        arena: &Arena,
    ) -> Result<(), PhysicsError> {
        for (start, end) in arena.walls() {
            let handle = world.create_wall(start, end, WALL_RESTITUTION)?;
            self.walls.push(handle);
        }
        debug!("Arena built: {}x{}", arena.width, arena.height);
        Ok(())
    }

    fn body_desc(id: BallId, kind: BallType, position: Vec2, velocity: Vec2) -> CircleBodyDesc {
        CircleBodyDesc {
            position,
            velocity,
            radius: kind.radius(),
            density: kind.density(),
            restitution: BALL_RESTITUTION,
            tag: Some(id.0),
        }
    }

    /// Create a ball and its physics body right away
    ///
    /// Must not be called from inside a contact callback; use `schedule_spawn` there.
    pub fn spawn(
        &mut self,
        world: &mut dyn PhysicsBackend,
        kind: BallType,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<BallId, PhysicsError> {
        let id = BallId(self.next_id);
        let body = world.create_circle_body(&Self::body_desc(id, kind, position, velocity))?;
        self.next_id += 1;
        // Fresh ids are the largest, so pushing keeps the list sorted
        self.balls.push(Ball::new(id, kind, position, velocity, body));
        Ok(id)
    }

    /// A suspended ball with a reserved id; nothing is simulated until `attach`
    pub fn prepare(&mut self, kind: BallType, position: Vec2) -> Ball {
        let id = BallId(self.next_id);
        self.next_id += 1;
        Ball::suspended(id, kind, position)
    }

    /// Give a suspended ball its body at its current position
    pub fn attach(
        &mut self,
        world: &mut dyn PhysicsBackend,
        mut ball: Ball,
        velocity: Vec2,
    ) -> Result<BallId, PhysicsError> {
        let id = ball.id;
        let index = match self.index_of(id) {
            Err(index) if ball.is_suspended() => index,
            _ => {
                error!("Ball {:?} is already attached", id);
                return Err(PhysicsError::AlreadyAttached(id.0));
            }
        };
        let body = world.create_circle_body(&Self::body_desc(id, ball.kind, ball.pos, velocity))?;
        ball.attach_body(body, velocity);
        // Balls spawned while this one waited have larger ids
        self.balls.insert(index, ball);
        Ok(id)
    }

    /// Mark a ball consumed. Returns false if it was already consumed or unknown.
    pub fn schedule_removal(&mut self, id: BallId) -> bool {
        match self.get_mut(id) {
            Some(ball) if ball.alive => {
                ball.alive = false;
                self.pending_removals.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn schedule_spawn(&mut self, kind: BallType, position: Vec2, velocity: Vec2) {
        self.pending_spawns.push(PendingSpawn {
            kind,
            position,
            velocity,
        });
    }

    pub fn queue_repulsion(&mut self, a: BallId, b: BallId, impulse: Vec2) {
        self.pending_repulsions.push(PendingRepulsion { a, b, impulse });
    }

    /// Latch the first-contact flag
    pub fn mark_collided(&mut self, id: BallId) {
        if let Some(ball) = self.get_mut(id) {
            ball.has_collided = true;
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_removals.is_empty()
            || !self.pending_spawns.is_empty()
            || !self.pending_repulsions.is_empty()
    }

    /// Apply everything scheduled during the last step
    ///
    /// If a spawn fails, it and every spawn after it stay queued for the
    /// next call and the error is returned.
    pub fn apply_deferred(
        &mut self,
        world: &mut dyn PhysicsBackend,
    ) -> Result<DeferredReport, PhysicsError> {
        let mut report = DeferredReport::default();

        for pending in std::mem::take(&mut self.pending_repulsions) {
            // A consumed ball cancels the whole pair
            let (Some(a), Some(b)) = (self.get(pending.a), self.get(pending.b)) else {
                continue;
            };
            if !(a.alive && b.alive) {
                continue;
            }
            for (ball, impulse) in [(a, -pending.impulse), (b, pending.impulse)] {
                if ball.body.is_some_and(|body| world.apply_impulse(body, impulse)) {
                    report.impulses += 1;
                } else {
                    stale_handle("apply_impulse", ball.id, ball.body);
                }
            }
        }

        for id in std::mem::take(&mut self.pending_removals) {
            let Ok(index) = self.index_of(id) else {
                continue;
            };
            let ball = self.balls.remove(index);
            if !ball.body.is_some_and(|body| world.destroy_body(body)) {
                stale_handle("destroy_body", id, ball.body);
            }
            report.removed.push(id);
        }

        let mut spawns = std::mem::take(&mut self.pending_spawns).into_iter();
        while let Some(spawn) = spawns.next() {
            match self.spawn(world, spawn.kind, spawn.position, spawn.velocity) {
                Ok(id) => report.spawned.push(id),
                Err(e) => {
                    warn!(
                        "Spawn of {} failed, {} spawns stay queued",
                        spawn.kind.name(),
                        spawns.len() + 1
                    );
                    self.pending_spawns.push(spawn);
                    self.pending_spawns.extend(spawns);
                    return Err(e);
                }
            }
        }

        if !report.is_empty() {
            debug!(
                "Deferred apply: {} impulses, {} removed, {} spawned",
                report.impulses,
                report.removed.len(),
                report.spawned.len()
            );
        }
        Ok(report)
    }

    /// Copy body state from the backend into every ball
    pub fn sync_from(&mut self, world: &dyn PhysicsBackend) {
        for ball in &mut self.balls {
            match ball.body.and_then(|body| world.body_state(body)) {
                Some(state) => {
                    ball.pos = state.position;
                    ball.vel = state.velocity;
                    ball.angle = state.angle;
                }
                None => stale_handle("body_state", ball.id, ball.body),
            }
        }
    }

    /// Release every ball body and the arena walls
    pub fn clear(&mut self, world: &mut dyn PhysicsBackend) {
        for ball in self.balls.drain(..) {
            if !ball.body.is_some_and(|body| world.destroy_body(body)) {
                stale_handle("destroy_body", ball.id, ball.body);
            }
        }
        for wall in self.walls.drain(..) {
            world.destroy_body(wall);
        }
        self.pending_removals.clear();
        self.pending_spawns.clear();
        self.pending_repulsions.clear();
    }

    fn index_of(&self, id: BallId) -> Result<usize, usize> {
        self.balls.binary_search_by_key(&id, |b| b.id)
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.index_of(id).ok().map(|i| &self.balls[i])
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.index_of(id).ok().map(|i| &mut self.balls[i])
    }

    /// Alive balls at the time of the call
    pub fn iter(&self) -> impl Iterator<Item = &Ball> + '_ {
        self.balls.iter().filter(|b| b.alive)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> + '_ {
        self.balls.iter_mut().filter(|b| b.alive)
    }

    /// Owned copy of the alive balls
    pub fn snapshot(&self) -> Vec<Ball> {
        self.iter().cloned().collect()
    }

    /// Number of balls held, including consumed ones not yet removed
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn count_of(&self, kind: BallType) -> usize {
        self.iter().filter(|b| b.kind == kind).count()
    }
}

/// A ball the registry owns has no body the backend knows
fn stale_handle(op: &str, id: BallId, body: Option<BodyHandle>) {
    error!("{} on stale body {:?} for ball {:?}", op, body, id);
    debug_assert!(false, "{} on stale body {:?} for ball {:?}", op, body, id);
}
