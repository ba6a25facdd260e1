//! Merge Drop entry point
//!
//! Runs the game loop on the headless platform. Window and audio bring-up
//! live outside this crate; `--autoplay` drives the menu and the rounds with
//! seeded clicks so a full session can be played without a display.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use merge_drop::Application;
use merge_drop::Settings;
use merge_drop::platform::{AutoPlayer, HeadlessPlatform};
use merge_drop::scenes::game::circle_world_factory;
use merge_drop::scenes::{GameScene, HiScoresScene, MainMenu, SceneId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge-ball arcade game", long_about = None)]
struct Args {
    /// Window (and arena) width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Window (and arena) height in pixels
    #[arg(long, default_value_t = 960)]
    height: u32,
    #[arg(long, default_value = "Merge Drop")]
    title: String,
    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
    /// Seed for the round RNGs and the auto player
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    /// Let the auto player click every N frames
    #[arg(long)]
    autoplay: Option<u32>,
    /// Frame rate cap (0 = as fast as possible)
    #[arg(long, default_value_t = merge_drop::consts::TARGET_FPS)]
    fps: u32,
    /// Print the session leaderboard as JSON on exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.frames.is_none() && args.autoplay.is_none() {
        anyhow::bail!("the headless platform has no input source: pass --frames or --autoplay");
    }

    let settings = Settings {
        width: args.width,
        height: args.height,
        title: args.title.clone(),
        target_fps: args.fps,
        seed: args.seed,
    };
    let width = settings.width as f32;

    let mut app = Application::new(settings);
    app.register_scene(SceneId::MainMenu, Box::new(MainMenu::new()));
    app.register_scene(SceneId::Game, Box::new(GameScene::new(circle_world_factory())));
    app.register_scene(SceneId::HiScores, Box::new(HiScoresScene::new()));
    app.set_current_scene(SceneId::MainMenu)
        .context("failed to enter the main menu")?;

    let mut platform = HeadlessPlatform::new();
    if let Some(interval) = args.autoplay {
        platform = platform.with_autoplay(AutoPlayer::new(args.seed, width, interval));
    }

    let frames = app.run(&mut platform, args.frames);
    let scores = &app.context().high_scores;
    info!(
        "Session over: {} frames, {} rounds, top score {}",
        frames,
        app.context().rounds_started(),
        scores.top_score().unwrap_or(0)
    );

    if args.json {
        let json = serde_json::to_string_pretty(scores).context("failed to serialize high scores")?;
        println!("{}", json);
    }
    Ok(())
}
