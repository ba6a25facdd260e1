//! Game round scene
//!
//! Phases: `Loading` until the physics world and arena are built, `Playing`
//! while balls are dropped and merged, `GameOver` once a settled ball stays
//! above the loss line too long (or the player quits). Each tick while
//! playing:
//! 1. move the held ball to the pointer column, and attach it to the world
//!    if a drop was requested and the cooldown has elapsed
//! 2. step the world, resolve contacts, apply deferred ball changes
//! 3. score the merges
//! 4. check the loss condition

use glam::Vec2;
use log::{debug, error, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Scene, SceneId};
use crate::app::AppContext;
use crate::consts::*;
use crate::error::{PhysicsError, SceneError};
use crate::platform::{InputEvent, Key};
use crate::renderer::{Renderer, Vertex, palette, shapes, text_width};
use crate::sim::{
    self, Arena, Ball, BallId, BallRegistry, BallType, CircleWorld, ContactResolver, PhysicsBackend,
};

/// Builds the physics world for a round
pub type WorldFactory = Box<dyn Fn(&Arena) -> Result<Box<dyn PhysicsBackend>, PhysicsError>>;

/// Factory for the built-in circle world with default tuning
pub fn circle_world_factory() -> WorldFactory {
    Box::new(|_arena: &Arena| -> Result<Box<dyn PhysicsBackend>, PhysicsError> {
        Ok(Box::new(CircleWorld::default()))
    })
}

/// Phase of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Loading,
    Playing,
    GameOver,
}

const WALL_THICKNESS: f32 = 4.0;
const HUD_MARGIN: f32 = 12.0;
const PREVIEW_RADIUS: f32 = 18.0;

/// Draw the type of a dropped ball, weighted toward the smallest types
fn draw_drop_type(rng: &mut Pcg32) -> BallType {
    let total: u32 = DROP_WEIGHTS.iter().sum();
    let mut roll = rng.random_range(0..total);
    for (ordinal, &weight) in DROP_WEIGHTS.iter().enumerate() {
        if roll < weight {
            return BallType::from_ordinal(ordinal).unwrap_or(BallType::White);
        }
        roll -= weight;
    }
    BallType::White
}

/// One round of the game
pub struct GameScene {
    factory: WorldFactory,
    phase: RoundPhase,
    world: Option<Box<dyn PhysicsBackend>>,
    registry: BallRegistry,
    resolver: ContactResolver,
    arena: Option<Arena>,
    rng: Pcg32,
    /// Suspended ball waiting at the drop line
    held: Option<Ball>,
    next: BallType,
    /// Pointer column the held ball follows
    drop_x: f32,
    drop_requested: bool,
    cooldown: u32,
    score: u64,
    merges: u32,
    drops: u32,
    /// Largest type reached this round
    best: BallType,
    ticks: u64,
    /// Leaderboard rank achieved when the round ended
    rank: Option<usize>,
}

impl GameScene {
    pub fn new(factory: WorldFactory) -> Self {
        Self {
            factory,
            phase: RoundPhase::Loading,
            world: None,
            registry: BallRegistry::new(),
            resolver: ContactResolver::new(),
            arena: None,
            rng: Pcg32::seed_from_u64(0),
            held: None,
            next: BallType::White,
            drop_x: 0.0,
            drop_requested: false,
            cooldown: 0,
            score: 0,
            merges: 0,
            drops: 0,
            best: BallType::White,
            ticks: 0,
            rank: None,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn merges(&self) -> u32 {
        self.merges
    }

    pub fn best(&self) -> BallType {
        self.best
    }

    pub fn held(&self) -> Option<&Ball> {
        self.held.as_ref()
    }

    pub fn next(&self) -> BallType {
        self.next
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn registry(&self) -> &BallRegistry {
        &self.registry
    }

    pub fn arena(&self) -> Option<&Arena> {
        self.arena.as_ref()
    }

    pub fn world(&self) -> Option<&dyn PhysicsBackend> {
        self.world.as_deref()
    }

    /// Put a ball into the running round directly, bypassing the drop queue
    pub fn spawn_ball(
        &mut self,
        kind: BallType,
        position: Vec2,
        velocity: Vec2,
    ) -> Option<BallId> {
        let world = self.world.as_mut()?;
        match self.registry.spawn(world.as_mut(), kind, position, velocity) {
            Ok(id) => {
                self.best = self.best.max(kind);
                Some(id)
            }
            Err(e) => {
                error!("Failed to spawn {} ball: {}", kind.name(), e);
                None
            }
        }
    }

    fn reset_round(&mut self) {
        self.phase = RoundPhase::Loading;
        self.registry = BallRegistry::new();
        self.resolver.reset();
        self.held = None;
        self.drop_requested = false;
        self.cooldown = 0;
        self.score = 0;
        self.merges = 0;
        self.drops = 0;
        self.best = BallType::White;
        self.ticks = 0;
        self.rank = None;
    }

    /// Run one simulation tick. Returns true when the loss condition is met.
    fn advance(&mut self) -> Result<bool, PhysicsError> {
        let (Some(world), Some(arena)) = (self.world.as_mut(), self.arena) else {
            return Ok(false);
        };

        self.cooldown = self.cooldown.saturating_sub(1);
        if let Some(held) = self.held.as_mut() {
            held.pos = arena.drop_point(self.drop_x, held.radius);
        }
        let ready = self.drop_requested && self.cooldown == 0;
        if let Some(ball) = self.held.take_if(|_| ready) {
            let (kind, x) = (ball.kind, ball.pos.x);
            let jitter = self.rng.random_range(-DROP_JITTER..=DROP_JITTER);
            let velocity = Vec2::new(jitter, DROP_SPEED);
            let id = self.registry.attach(world.as_mut(), ball, velocity)?;
            debug!("Dropped {} ball {:?} at x={:.1}", kind.name(), id, x);

            self.best = self.best.max(kind);
            let point = arena.drop_point(self.drop_x, self.next.radius());
            self.held = Some(self.registry.prepare(self.next, point));
            self.next = draw_drop_type(&mut self.rng);
            self.cooldown = DROP_COOLDOWN_TICKS;
            self.drops += 1;
        }
        // Requests made during the cooldown are dropped
        self.drop_requested = false;

        let report =
            sim::tick(world.as_mut(), &mut self.registry, &mut self.resolver, SIM_DT)?;
        self.ticks += 1;
        self.score += report.score();
        self.merges += report.merges.len() as u32;
        if let Some(kind) = report.best_merge() {
            self.best = self.best.max(kind);
        }

        let mut lost = false;
        for ball in self.registry.iter_mut() {
            let settled = ball.has_collided && ball.is_resting();
            if settled && arena.is_above_loss_line(ball.pos, ball.radius) {
                ball.over_line_ticks += 1;
                lost |= ball.over_line_ticks >= LOSS_GRACE_TICKS;
            } else {
                ball.over_line_ticks = 0;
            }
        }
        Ok(lost)
    }

    fn end_round(&mut self, ctx: &mut AppContext, reason: &str) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        self.phase = RoundPhase::GameOver;
        self.rank = ctx.high_scores.add_score(self.score, self.best, self.merges);
        info!(
            "Round over ({}): score {}, best {}, {} merges, {} drops, {} ticks",
            reason,
            self.score,
            self.best.name(),
            self.merges,
            self.drops,
            self.ticks
        );
        if let Some(rank) = self.rank {
            info!("New high score at rank {}", rank);
        }
    }

    fn render_hud(&self, renderer: &mut dyn Renderer, arena: &Arena) {
        renderer.draw_text(
            &format!("Score: {}", self.score),
            Vec2::new(HUD_MARGIN, HUD_MARGIN),
            28.0,
            palette::TEXT,
        );
        renderer.draw_text(
            &format!("Best: {}", self.best.name()),
            Vec2::new(HUD_MARGIN, HUD_MARGIN + 32.0),
            18.0,
            palette::TEXT_MUTED,
        );

        let label = format!("Next: {}", self.next.name());
        let size = 18.0;
        let preview_left = arena.width - HUD_MARGIN - PREVIEW_RADIUS * 2.0;
        let x = preview_left - 8.0 - text_width(&label, size);
        renderer.draw_text(&label, Vec2::new(x, HUD_MARGIN + 8.0), size, palette::TEXT_MUTED);
    }

    fn render_game_over(&self, renderer: &mut dyn Renderer, arena: &Arena) {
        let mid = arena.height * 0.5;
        renderer.draw_triangles(&shapes::rect(
            Vec2::new(0.0, mid - 90.0),
            Vec2::new(arena.width, mid + 90.0),
            palette::BANNER,
        ));

        let mut lines = vec![
            ("Game Over".to_string(), 48.0),
            (format!("Score: {}", self.score), 28.0),
        ];
        if let Some(rank) = self.rank {
            lines.push((format!("New high score! #{}", rank), 22.0));
        }
        lines.push(("Click to continue".to_string(), 18.0));

        let mut y = mid - 75.0;
        for (text, size) in &lines {
            let x = (arena.width - text_width(text, *size)) * 0.5;
            renderer.draw_text(text, Vec2::new(x, y), *size, palette::BANNER_TEXT);
            y += size + 10.0;
        }
    }
}

impl Scene for GameScene {
    fn name(&self) -> &'static str {
        "game"
    }

    fn init(&mut self, ctx: &mut AppContext) -> Result<(), SceneError> {
        self.reset_round();

        let arena = Arena::new(ctx.width(), ctx.height())?;
        let mut world = (self.factory)(&arena)?;
        if let Err(e) = self.registry.build_arena(world.as_mut(), &arena) {
            self.registry = BallRegistry::new();
            return Err(e.into());
        }

        let seed = ctx.next_round_seed();
        self.rng = Pcg32::seed_from_u64(seed);
        let first = draw_drop_type(&mut self.rng);
        self.next = draw_drop_type(&mut self.rng);
        self.drop_x = arena.width * 0.5;
        let point = arena.drop_point(self.drop_x, first.radius());
        self.held = Some(self.registry.prepare(first, point));
        self.arena = Some(arena);
        self.world = Some(world);
        self.phase = RoundPhase::Playing;
        info!("Round {} started (seed {:#x})", ctx.rounds_started(), seed);
        Ok(())
    }

    fn poll_events(&mut self, events: &[InputEvent], ctx: &mut AppContext) {
        for event in events {
            match self.phase {
                RoundPhase::Playing => match *event {
                    InputEvent::PointerMoved(p) | InputEvent::PointerPressed(p) => {
                        self.drop_x = p.x;
                    }
                    InputEvent::PointerReleased(p) => {
                        self.drop_x = p.x;
                        self.drop_requested = true;
                    }
                    InputEvent::KeyPressed(Key::Space) => self.drop_requested = true,
                    InputEvent::KeyPressed(Key::Escape) => self.end_round(ctx, "quit"),
                    _ => {}
                },
                RoundPhase::GameOver => match *event {
                    InputEvent::PointerReleased(_)
                    | InputEvent::KeyPressed(Key::Enter)
                    | InputEvent::KeyPressed(Key::Escape) => ctx.switch_to(SceneId::MainMenu),
                    _ => {}
                },
                RoundPhase::Loading => {}
            }
        }
    }

    fn update(&mut self, ctx: &mut AppContext) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        match self.advance() {
            Ok(true) => self.end_round(ctx, "ball settled above the line"),
            Ok(false) => {}
            Err(e) => {
                error!("Simulation failed: {}", e);
                self.end_round(ctx, "simulation error");
            }
        }
    }

    fn render(&self, renderer: &mut dyn Renderer, _ctx: &AppContext) {
        renderer.clear(palette::BACKGROUND);
        let Some(arena) = self.arena.as_ref() else {
            return;
        };

        let mut vertices: Vec<Vertex> = Vec::new();
        for (start, end) in arena.walls() {
            let start = Vec2::new(start.x, start.y.max(0.0));
            vertices.extend(shapes::line(start, end, WALL_THICKNESS, palette::WALL));
        }
        vertices.extend(shapes::line(
            Vec2::new(0.0, arena.loss_y),
            Vec2::new(arena.width, arena.loss_y),
            2.0,
            palette::LOSS_LINE,
        ));
        for ball in self.registry.iter() {
            vertices.extend(shapes::ball(ball));
        }
        let playing = self.phase == RoundPhase::Playing;
        if let Some(held) = self.held.as_ref().filter(|_| playing) {
            let mut color = held.kind.color();
            color[3] *= 0.5;
            vertices.extend(shapes::ball_at(held.pos, held.radius, 0.0, color));
        }
        let preview = Vec2::new(
            arena.width - HUD_MARGIN - PREVIEW_RADIUS,
            HUD_MARGIN + PREVIEW_RADIUS,
        );
        vertices.extend(shapes::ball_at(preview, PREVIEW_RADIUS, 0.0, self.next.color()));
        renderer.draw_triangles(&vertices);

        self.render_hud(renderer, arena);
        if self.phase == RoundPhase::GameOver {
            self.render_game_over(renderer, arena);
        }
    }

    fn clean_up(&mut self, _ctx: &mut AppContext) {
        if let Some(mut world) = self.world.take() {
            self.registry.clear(world.as_mut());
            debug!("Round world released with {} bodies left", world.body_count());
        }
        self.registry = BallRegistry::new();
        self.resolver.reset();
        self.held = None;
        self.arena = None;
        self.phase = RoundPhase::Loading;
    }
}
