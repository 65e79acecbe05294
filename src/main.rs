use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetrisdl::{
    engine::EngineSettings,
    input::{Key, ManualClock, ScriptedEvents, ScriptedKeyboard},
    level::{Level, LevelLoader},
    render::NullSurface,
    resources::HeadlessTextures,
    App,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless runner for the block prototype")]
struct Cli {
    /// Level YAML file; the built-in first level is used when omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Override frame count (uses the level default when omitted)
    #[arg(long)]
    frames: Option<u64>,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Keys held for the whole run
    #[arg(long, value_enum)]
    hold: Vec<Key>,

    /// Override snapshot interval in frames
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tetrisdl=trace"; overrides the level file
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match &cli.level {
        Some(path) => LevelLoader::new(".").load(path)?,
        None => Level::first_level(),
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(&level.logging.level));

    let frames = level.frames(cli.frames);
    let settings = EngineSettings {
        level_name: level.name.clone(),
        snapshot_interval_frames: cli
            .snapshot_interval
            .unwrap_or(level.snapshot_interval_frames),
        snapshot_dir: cli
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
    };
    let tile = level.map.tile_size as u32;
    let mut app = App::new(&level, HeadlessTextures::new(tile, tile), settings)?;

    let clock = ManualClock::new();
    let mut events = ScriptedEvents::quit_after(frames);
    let keys = ScriptedKeyboard::holding(cli.hold.iter().copied());
    let mut surface = NullSurface::new();
    let summary = app.run(&clock, &mut events, &keys, &mut surface, |events| {
        clock.advance(cli.frame_ms);
        events.begin_frame();
    })?;

    let block = app.world().block().map(|b| (b.position.x, b.position.y));
    info!(
        level = %level.name,
        frames = summary.frames,
        elapsed_secs = summary.elapsed_secs,
        block = ?block,
        "run complete"
    );
    println!(
        "Level '{}' ran for {} frames. Block position: {:?}",
        level.name, summary.frames, block
    );
    Ok(())
}
