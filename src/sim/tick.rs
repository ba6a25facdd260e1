//! Fixed timestep simulation tick
//!
//! One tick of the merge engine:
//! 1. step the physics backend, resolving contact begins as they are reported
//! 2. apply the deferred registry changes (impulses, removals, spawns)
//! 3. copy body state back into the balls

use super::ball::BallType;
use super::physics::{ContactEvent, PhysicsBackend};
use super::registry::{BallRegistry, DeferredReport};
use super::resolver::{ContactResolver, MergeEvent};
use crate::error::PhysicsError;

/// Result of one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub merges: Vec<MergeEvent>,
    pub deferred: DeferredReport,
}

impl TickReport {
    /// Points earned by this tick's merges
    pub fn score(&self) -> u64 {
        self.merges.iter().map(|m| m.kind.merge_score()).sum()
    }

    /// Largest type produced this tick
    pub fn best_merge(&self) -> Option<BallType> {
        self.merges.iter().map(|m| m.kind).max()
    }
}

/// Advance the round by one fixed timestep
pub fn tick(
    world: &mut dyn PhysicsBackend,
    registry: &mut BallRegistry,
    resolver: &mut ContactResolver,
    dt: f32,
) -> Result<TickReport, PhysicsError> {
    world.step(dt, &mut |contact: &ContactEvent| {
        resolver.resolve(contact, registry);
    });

    let deferred = registry.apply_deferred(world)?;
    registry.sync_from(world);

    Ok(TickReport {
        merges: resolver.take_merges(),
        deferred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::arena::Arena;
    use crate::sim::world::{CircleWorld, WorldConfig};
    use glam::Vec2;

    #[test]
    fn test_two_whites_merge_into_red() {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let mut resolver = ContactResolver::new();
        let pos = Vec2::new(300.0, 400.0);
        registry.spawn(&mut world, BallType::White, pos, Vec2::ZERO).unwrap();
        registry.spawn(&mut world, BallType::White, pos, Vec2::ZERO).unwrap();

        let report = tick(&mut world, &mut registry, &mut resolver, SIM_DT).unwrap();

        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.score(), BallType::Red.merge_score());
        assert_eq!(report.best_merge(), Some(BallType::Red));
        let balls = registry.snapshot();
        assert_eq!(balls.len(), 1);
        assert_eq!(balls[0].kind, BallType::Red);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_terminal_and_white_stay_apart() {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let mut resolver = ContactResolver::new();
        let black_pos = Vec2::new(300.0, 400.0);
        let reach = BallType::Black.radius() + BallType::White.radius();
        let black = registry.spawn(&mut world, BallType::Black, black_pos, Vec2::ZERO).unwrap();
        let white = registry
            .spawn(&mut world, BallType::White, black_pos + Vec2::new(reach - 2.0, 0.0), Vec2::ZERO)
            .unwrap();

        let report = tick(&mut world, &mut registry, &mut resolver, SIM_DT).unwrap();

        assert!(report.merges.is_empty());
        assert_eq!(report.deferred.impulses, 2);
        assert_eq!(registry.iter().count(), 2);
        assert!(registry.get(black).unwrap().alive);
        let white = registry.get(white).unwrap();
        assert!(white.alive);
        assert!(white.vel.x > 0.0, "white should be pushed away: {:?}", white.vel);
        assert!(registry.get(black).unwrap().vel.x < 0.0);
    }

    #[test]
    fn test_chain_merge_across_ticks() {
        let mut world = CircleWorld::new(WorldConfig::weightless());
        let mut registry = BallRegistry::new();
        let mut resolver = ContactResolver::new();
        let red_spot = Vec2::new(300.0, 300.0);
        // A RED already overlaps the spot where the two WHITEs will merge
        let mut spawn = |kind: BallType, dx: f32| {
            let pos = red_spot + Vec2::new(dx, 0.0);
            registry.spawn(&mut world, kind, pos, Vec2::ZERO).unwrap();
        };
        spawn(BallType::Red, 20.0);
        spawn(BallType::White, -10.0);
        spawn(BallType::White, -10.0);

        let mut total = 0;
        let mut best = None;
        for _ in 0..5 {
            let report = tick(&mut world, &mut registry, &mut resolver, SIM_DT).unwrap();
            total += report.score();
            best = best.max(report.best_merge());
        }

        assert_eq!(best, Some(BallType::Violet));
        assert_eq!(total, BallType::Red.merge_score() + BallType::Violet.merge_score());
        assert_eq!(registry.count_of(BallType::Violet), 1);
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn test_balls_settle_inside_arena() {
        let mut world = CircleWorld::default();
        let mut registry = BallRegistry::new();
        let mut resolver = ContactResolver::new();
        let arena = Arena::new(640.0, 960.0).unwrap();
        registry.build_arena(&mut world, &arena).unwrap();
        let start = Vec2::new(320.0, arena.drop_y);
        let id = registry.spawn(&mut world, BallType::Green, start, Vec2::ZERO).unwrap();

        for _ in 0..300 {
            tick(&mut world, &mut registry, &mut resolver, SIM_DT).unwrap();
        }

        let ball = registry.get(id).unwrap();
        assert!(ball.has_collided);
        assert!(ball.is_resting());
        assert!((ball.pos.y - (arena.height - ball.radius)).abs() < 2.0);
    }
}
