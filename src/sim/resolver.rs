//! Contact resolution: merges and repulsion
//!
//! Runs inside the physics backend's step, once per contact begin. It never
//! touches the backend; every decision is recorded in the registry and
//! applied after the step.

use glam::Vec2;
use log::{debug, error};

use super::ball::{BallId, BallType};
use super::physics::ContactEvent;
use super::registry::BallRegistry;
use crate::consts::*;

/// A merge decided during the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    pub consumed: (BallId, BallId),
    /// Type of the ball the merge produces
    pub kind: BallType,
    pub position: Vec2,
}

/// How a single contact was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Two equal balls merged into this type
    Merged(BallType),
    /// The balls were pushed apart
    Repelled,
    /// Ball against static geometry, or nothing to do
    Ignored,
}

/// Decides merges for contact begins
#[derive(Debug, Default)]
pub struct ContactResolver {
    merges: Vec<MergeEvent>,
    repulsions: u64,
}

impl ContactResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one contact begin
    pub fn resolve(
        &mut self,
        contact: &ContactEvent,
        registry: &mut BallRegistry,
    ) -> ContactOutcome {
        let a = contact.tag_a.map(BallId);
        let b = contact.tag_b.map(BallId);
        match (a, b) {
            (Some(a), Some(b)) => self.resolve_balls(a, b, contact, registry),
            (Some(id), None) | (None, Some(id)) => {
                registry.mark_collided(id);
                ContactOutcome::Ignored
            }
            (None, None) => ContactOutcome::Ignored,
        }
    }

    fn resolve_balls(
        &mut self,
        a: BallId,
        b: BallId,
        contact: &ContactEvent,
        registry: &mut BallRegistry,
    ) -> ContactOutcome {
        let (Some(ball_a), Some(ball_b)) = (registry.get(a), registry.get(b)) else {
            error!("Contact between unknown balls {:?} and {:?}", a, b);
            debug_assert!(false, "contact references a ball that is not registered");
            return ContactOutcome::Ignored;
        };
        let (kind_a, kind_b) = (ball_a.kind, ball_b.kind);
        let mergeable = ball_a.alive && ball_b.alive && kind_a == kind_b;
        let min_radius = ball_a.radius.min(ball_b.radius);

        registry.mark_collided(a);
        registry.mark_collided(b);

        // Terminal balls have no next type and fall through to repulsion
        if let Some(next) = kind_a.next().filter(|_| mergeable) {
            registry.schedule_removal(a);
            registry.schedule_removal(b);
            let position = (contact.position_a + contact.position_b) * 0.5;
            // Merged balls start at rest
            registry.schedule_spawn(next, position, Vec2::ZERO);
            self.merges.push(MergeEvent {
                consumed: (a, b),
                kind: next,
                position,
            });
            debug!("Merge {:?} + {:?} -> {} at {:?}", a, b, next.name(), position);
            return ContactOutcome::Merged(next);
        }

        let normal = if contact.normal.length_squared() > 0.5 {
            contact.normal
        } else {
            (contact.position_b - contact.position_a).normalize_or(Vec2::X)
        };
        let impulse = normal * (REPULSION_IMPULSE_PER_RADIUS * min_radius);
        registry.queue_repulsion(a, b, impulse);
        self.repulsions += 1;
        ContactOutcome::Repelled
    }

    /// Merges decided since the last call
    pub fn take_merges(&mut self) -> Vec<MergeEvent> {
        std::mem::take(&mut self.merges)
    }

    /// Total repulsion contacts handled
    pub fn repulsions(&self) -> u64 {
        self.repulsions
    }

    pub fn reset(&mut self) {
        self.merges.clear();
        self.repulsions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::{BodyHandle, PhysicsBackend};
    use crate::sim::world::{CircleWorld, WorldConfig};
    use proptest::prelude::*;

    fn contact(registry: &BallRegistry, a: BallId, b: BallId) -> ContactEvent {
        let ba = registry.get(a).unwrap();
        let bb = registry.get(b).unwrap();
        ContactEvent {
            body_a: ba.body().unwrap(),
            body_b: bb.body().unwrap(),
            tag_a: Some(a.0),
            tag_b: Some(b.0),
            position_a: ba.pos,
            position_b: bb.pos,
            point: (ba.pos + bb.pos) * 0.5,
            normal: (bb.pos - ba.pos).normalize_or(Vec2::X),
        }
    }

    fn pair(kind_a: BallType, kind_b: BallType) -> (CircleWorld, BallRegistry, BallId, BallId) {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let a = registry.spawn(&mut world, kind_a, Vec2::new(100.0, 100.0), Vec2::ZERO);
        let b = registry.spawn(&mut world, kind_b, Vec2::new(140.0, 100.0), Vec2::ZERO);
        (world, registry, a.unwrap(), b.unwrap())
    }

    #[test]
    fn test_equal_types_merge() {
        let (mut world, mut registry, a, b) = pair(BallType::White, BallType::White);
        let mut resolver = ContactResolver::new();
        let outcome = resolver.resolve(&contact(&registry, a, b), &mut registry);
        assert_eq!(outcome, ContactOutcome::Merged(BallType::Red));

        // Nothing structural has happened yet
        assert_eq!(world.body_count(), 2);
        assert!(!registry.get(a).unwrap().alive);
        assert!(!registry.get(b).unwrap().alive);

        registry.apply_deferred(&mut world).unwrap();
        let balls = registry.snapshot();
        assert_eq!(balls.len(), 1);
        assert_eq!(balls[0].kind, BallType::Red);
        assert_eq!(balls[0].pos, Vec2::new(120.0, 100.0));
        assert_eq!(balls[0].vel, Vec2::ZERO);
        assert_eq!(world.body_count(), 1);

        let merges = resolver.take_merges();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].consumed, (a, b));
        assert!(resolver.take_merges().is_empty());
    }

    #[test]
    fn test_duplicate_contact_is_noop() {
        let (mut world, mut registry, a, b) = pair(BallType::Orange, BallType::Orange);
        let mut resolver = ContactResolver::new();
        let event = contact(&registry, a, b);
        resolver.resolve(&event, &mut registry);
        let second = resolver.resolve(&event.flipped(), &mut registry);
        assert_eq!(second, ContactOutcome::Repelled);

        let report = registry.apply_deferred(&mut world).unwrap();
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(report.impulses, 0);
        assert_eq!(resolver.take_merges().len(), 1);
    }

    #[test]
    fn test_terminal_types_repel() {
        let (mut world, mut registry, a, b) = pair(BallType::Black, BallType::Black);
        let mut resolver = ContactResolver::new();
        let outcome = resolver.resolve(&contact(&registry, a, b), &mut registry);
        assert_eq!(outcome, ContactOutcome::Repelled);

        let report = registry.apply_deferred(&mut world).unwrap();
        assert!(report.spawned.is_empty());
        assert_eq!(report.impulses, 2);
        registry.sync_from(&world);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(a).unwrap().vel.x < 0.0);
        assert!(registry.get(b).unwrap().vel.x > 0.0);
    }

    #[test]
    fn test_repulsion_scales_with_smaller_radius() {
        let (mut world, mut registry, a, b) = pair(BallType::White, BallType::Blue);
        let mut resolver = ContactResolver::new();
        resolver.resolve(&contact(&registry, a, b), &mut registry);
        registry.apply_deferred(&mut world).unwrap();
        registry.sync_from(&world);
        let expected = REPULSION_IMPULSE_PER_RADIUS * BallType::White.radius();
        for (id, kind) in [(a, BallType::White), (b, BallType::Blue)] {
            let momentum = registry.get(id).unwrap().vel.length() * kind.mass();
            assert!((momentum - expected).abs() < expected * 1e-3);
        }
        assert_eq!(resolver.repulsions(), 1);
    }

    #[test]
    fn test_wall_contact_latches_collided() {
        let (_, mut registry, a, _) = pair(BallType::White, BallType::Red);
        let mut resolver = ContactResolver::new();
        let event = ContactEvent {
            body_a: BodyHandle(999),
            body_b: registry.get(a).unwrap().body().unwrap(),
            tag_a: None,
            tag_b: Some(a.0),
            position_a: Vec2::ZERO,
            position_b: Vec2::ZERO,
            point: Vec2::ZERO,
            normal: Vec2::Y,
        };
        assert_eq!(resolver.resolve(&event, &mut registry), ContactOutcome::Ignored);
        assert!(registry.get(a).unwrap().has_collided);
        assert!(!registry.has_pending());
    }

    #[test]
    fn test_consumed_ball_does_not_merge_again() {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let mut white = |x: f32| {
            registry.spawn(&mut world, BallType::White, Vec2::new(x, 0.0), Vec2::ZERO).unwrap()
        };
        let (a, b, c) = (white(0.0), white(40.0), white(80.0));
        let mut resolver = ContactResolver::new();

        resolver.resolve(&contact(&registry, a, b), &mut registry);
        resolver.resolve(&contact(&registry, b, c), &mut registry);
        registry.apply_deferred(&mut world).unwrap();

        assert_eq!(registry.count_of(BallType::Red), 1);
        assert_eq!(registry.count_of(BallType::White), 1);
        assert!(registry.get(c).unwrap().alive);
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn test_repulsion_dropped_when_partner_merges() {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let mut spawn = |kind: BallType, x: f32| {
            registry.spawn(&mut world, kind, Vec2::new(x, 0.0), Vec2::ZERO).unwrap()
        };
        let red = spawn(BallType::Red, 0.0);
        let (a, b) = (spawn(BallType::White, 50.0), spawn(BallType::White, 90.0));
        let mut resolver = ContactResolver::new();

        // RED bumps a WHITE that merges away later in the same step
        let bump = resolver.resolve(&contact(&registry, red, a), &mut registry);
        assert_eq!(bump, ContactOutcome::Repelled);
        resolver.resolve(&contact(&registry, a, b), &mut registry);

        let report = registry.apply_deferred(&mut world).unwrap();
        assert_eq!(report.impulses, 0);
        registry.sync_from(&world);
        assert_eq!(registry.get(red).unwrap().vel, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_merge_produces_exactly_one_next(
            n in 0usize..9,
            dx in -40.0f32..40.0,
            dy in -40.0f32..40.0,
        ) {
            let kind = BallType::from_ordinal(n).unwrap();
            let mut world = CircleWorld::new(WorldConfig::weightless());
            let mut registry = BallRegistry::new();
            let a = registry.spawn(&mut world, kind, Vec2::new(300.0, 300.0), Vec2::ZERO).unwrap();
            let b_pos = Vec2::new(300.0 + dx, 300.0 + dy);
            let b = registry.spawn(&mut world, kind, b_pos, Vec2::ZERO).unwrap();
            let mut resolver = ContactResolver::new();
            resolver.resolve(&contact(&registry, a, b), &mut registry);
            registry.apply_deferred(&mut world).unwrap();

            let balls = registry.snapshot();
            prop_assert_eq!(balls.len(), 1);
            prop_assert_eq!(Some(balls[0].kind), kind.next());
            prop_assert!(registry.get(a).is_none());
            prop_assert!(registry.get(b).is_none());
            prop_assert_eq!(world.body_count(), 1);
        }

        #[test]
        fn prop_different_types_never_merge(n in 0usize..10, m in 0usize..10) {
            prop_assume!(n != m);
            let (mut world, mut registry, a, b) =
                pair(BallType::from_ordinal(n).unwrap(), BallType::from_ordinal(m).unwrap());
            let mut resolver = ContactResolver::new();
            let outcome = resolver.resolve(&contact(&registry, a, b), &mut registry);
            prop_assert_eq!(outcome, ContactOutcome::Repelled);
            registry.apply_deferred(&mut world).unwrap();
            prop_assert_eq!(registry.iter().count(), 2);
        }
    }
}
