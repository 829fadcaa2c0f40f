//! scrolly-replay binary
//!
//! Replays a scroll script against the synchronization engine and a
//! simulated map, then prints a JSON report.
//!
//! ## Configuration (CLI / env / settings file via `config` crate)
//!
//! | Key                     | Default          | Description                          |
//! |-------------------------|------------------|--------------------------------------|
//! | `SCROLLY_STORY`         | bundled story    | Story config (JSON)                  |
//! | `SCROLLY_SCRIPT`        | bundled demo     | Replay script (JSON)                 |
//! | `SCROLLY_SETTINGS`      | *(none)*         | Sync settings file (TOML/JSON/YAML)  |
//! | `SCROLLY_WIDTH`         | script or `1280` | Viewport width (px)                  |
//! | `SCROLLY_HEIGHT`        | script or `800`  | Viewport height (px)                 |
//! | `SCROLLY_FRAME_RATE_HZ` | `60`             | Simulated engine frame rate          |
//! | `SCROLLY_TAIL_MS`       | `2000`           | Rendering time after the last step   |
//!
//! Sync settings can also be overridden per key from the environment, e.g.
//! `SCROLLY_SMALL_BREAKPOINT_PX=480` or `SCROLLY_SMALL_ZOOM__FLOOR=8`.

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use scrolly_sync::{
    data,
    driver::{ReplayConfig, ReplayDriver},
    layers::VisibilityTable,
    LayerId, ReplayScript, SimulatedMap, StoryConfig, StoryCoordinator, SyncConfig, Viewport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "scrolly-replay", about = "Scroll-to-camera sync replay", version)]
struct Args {
    /// Story config (chapters, routes, annotations)
    #[arg(long, env = "SCROLLY_STORY")]
    story: Option<PathBuf>,

    /// Replay script of timed scroll events
    #[arg(long, env = "SCROLLY_SCRIPT")]
    script: Option<PathBuf>,

    /// Sync settings file
    #[arg(long, env = "SCROLLY_SETTINGS")]
    settings: Option<PathBuf>,

    /// Photo points dataset (JSON)
    #[arg(long, env = "SCROLLY_POINTS")]
    points: Option<PathBuf>,

    /// Trajectory arcs dataset (JSON)
    #[arg(long, env = "SCROLLY_ARCS")]
    arcs: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, env = "SCROLLY_WIDTH")]
    width: Option<f64>,

    /// Viewport height in pixels
    #[arg(long, env = "SCROLLY_HEIGHT")]
    height: Option<f64>,

    /// Simulated engine frame rate (Hz)
    #[arg(long, env = "SCROLLY_FRAME_RATE_HZ", default_value_t = 60.0)]
    frame_rate_hz: f32,

    /// Rendering time after the last script step (ms)
    #[arg(long, env = "SCROLLY_TAIL_MS", default_value_t = 2000)]
    tail_ms: u64,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_settings(path: Option<&Path>) -> Result<SyncConfig> {
    let mut builder = config::Config::builder().add_source(
        config::Config::try_from(&SyncConfig::default()).context("Failed to encode defaults")?,
    );
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    builder
        .add_source(
            config::Environment::with_prefix("SCROLLY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read sync settings")?
        .try_deserialize()
        .context("Invalid sync settings")
}

fn load_story(path: Option<&Path>) -> Result<StoryConfig> {
    match path {
        None => Ok(StoryConfig::builtin()?),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read story {}", path.display()))?;
            StoryConfig::from_json_str(&raw)
                .with_context(|| format!("Invalid story {}", path.display()))
        }
    }
}

fn load_script(path: Option<&Path>) -> Result<ReplayScript> {
    match path {
        None => Ok(ReplayScript::demo()?),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            ReplayScript::from_json_str(&raw)
                .with_context(|| format!("Invalid script {}", path.display()))
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scrolly_sync=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let settings = load_settings(args.settings.as_deref())?;
    let story = load_story(args.story.as_deref())?;
    let script = load_script(args.script.as_deref())?;

    let base = script.viewport.unwrap_or_default();
    let viewport = Viewport::new(
        args.width.unwrap_or(base.width),
        args.height.unwrap_or(base.height),
    );
    let small = viewport.is_small(settings.small_breakpoint_px);

    log::info!(
        "Starting scrolly-replay (story='{}', chapters={}, routes={}, viewport={}x{}, small={})",
        story.title,
        story.chapters.len(),
        story.routes.len(),
        viewport.width,
        viewport.height,
        small,
    );

    let initial = story
        .initial_camera(small)
        .context("Story has no chapters")?;
    let engine = SimulatedMap::new(initial, viewport);

    let mut coordinator = StoryCoordinator::new(
        story,
        settings,
        engine,
        VisibilityTable::default(),
        viewport,
    );

    // Missing datasets only hide their layer; the camera story still runs.
    if let Some(path) = &args.points {
        coordinator.on_dataset_loaded(
            LayerId::Scatterplot,
            data::load_photo_points(path).map(|p| p.len()),
        );
    }
    if let Some(path) = &args.arcs {
        coordinator.on_dataset_loaded(
            LayerId::Arcs,
            data::load_trajectory_arcs(path).map(|a| a.len()),
        );
    }

    let coordinator = Arc::new(Mutex::new(coordinator));
    let replay_config = ReplayConfig {
        frame_rate_hz: args.frame_rate_hz,
        tail: Duration::from_millis(args.tail_ms),
    };

    let span = tracing::info_span!("replay", steps = script.steps.len());
    let report = ReplayDriver::new(replay_config, coordinator)
        .run(script)
        .instrument(span)
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
