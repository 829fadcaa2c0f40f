//! Replay driver – feeds a scroll script and engine frames into a shared
//! [`StoryCoordinator`] on a tokio event loop.
//!
//! ## Loop structure
//!
//! | Source                 | Cadence           | Effect                              |
//! |------------------------|-------------------|-------------------------------------|
//! | script feeder task     | per `at_ms`       | `handle_scroll`                     |
//! | frame interval         | `frame_rate_hz`   | engine `advance` → events → `tick`  |
//!
//! Both sources run on the same task set of a current-thread runtime, so
//! every coordinator call is serialized; the mutex is only held for the
//! duration of one call and never across an `.await`.

use crate::coordinator::StoryCoordinator;
use crate::engine::MapEngine;
use crate::layers::LayerSink;
use crate::overlay::OverlayFrame;
use crate::protocol::{ReplayScript, ScrollEvent};
use crate::sim::SimulatedMap;
use crate::types::{CameraState, SyncStats};
use anyhow::{ensure, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

pub type SharedCoordinator<S> = Arc<Mutex<StoryCoordinator<SimulatedMap, S>>>;

// ---------------------------------------------------------------------------
// Config & report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Engine frame rate in Hz.
    pub frame_rate_hz: f32,
    /// How long to keep rendering after the last script step.
    pub tail: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60.0,
            tail: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub stats: SyncStats,
    pub frames: u64,
    pub elapsed_ms: u64,
    pub final_camera: CameraState,
    pub last_overlay: Option<OverlayFrame>,
}

// ---------------------------------------------------------------------------
// ReplayDriver
// ---------------------------------------------------------------------------

pub struct ReplayDriver<S: LayerSink> {
    config: ReplayConfig,
    coordinator: SharedCoordinator<S>,
}

impl<S: LayerSink> ReplayDriver<S> {
    pub fn new(config: ReplayConfig, coordinator: SharedCoordinator<S>) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    /// Replay `script` in real (tokio) time and return a summary once the
    /// tail after the last step has elapsed.
    pub async fn run(self, script: ReplayScript) -> Result<ReplayReport> {
        let hz = self.config.frame_rate_hz;
        ensure!(
            hz.is_finite() && hz > 0.0,
            "frame rate must be positive and finite, got {}",
            hz
        );
        let frame = Duration::try_from_secs_f32(1.0 / hz)
            .with_context(|| format!("invalid frame rate {}", hz))?;
        ensure!(!frame.is_zero(), "frame rate {}Hz is too high", hz);

        let start = Instant::now();
        let end = start + Duration::from_millis(script.end_ms()) + self.config.tail;

        info!(
            "Replaying {} steps over {}ms at {:.0}Hz",
            script.steps.len(),
            script.end_ms(),
            self.config.frame_rate_hz
        );

        // -------------------------------------------------------------------
        // Script feeder
        // -------------------------------------------------------------------

        let (tx, mut rx) = mpsc::unbounded_channel::<ScrollEvent>();
        let feeder = tokio::spawn(async move {
            for step in script.steps {
                tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
                if tx.send(step.event).is_err() {
                    break;
                }
            }
        });

        // -------------------------------------------------------------------
        // Frame loop
        // -------------------------------------------------------------------

        let mut timer = tokio::time::interval(frame);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = 0u64;
        let mut last_overlay = None;
        let mut feeder_open = true;

        loop {
            tokio::select! {
                event = rx.recv(), if feeder_open => match event {
                    Some(event) => {
                        debug!("Scroll event {:?}", event);
                        let now = start.elapsed();
                        if let Some(overlay) = self.coordinator.lock().handle_scroll(&event, now) {
                            last_overlay = Some(overlay);
                        }
                    }
                    None => feeder_open = false,
                },
                _ = timer.tick() => {
                    frames += 1;
                    let now = start.elapsed();

                    // Hold the lock for one frame only.
                    let mut coordinator = self.coordinator.lock();
                    coordinator.engine_mut().advance(now);
                    for event in coordinator.engine_mut().drain_events() {
                        if let Some(overlay) = coordinator.handle_engine_event(&event) {
                            last_overlay = Some(overlay);
                        }
                    }
                    coordinator.tick(now);

                    if !feeder_open && Instant::now() >= end {
                        break;
                    }
                }
            }
        }

        // The feeder has already finished once its channel closed.
        feeder.await.context("script feeder failed")?;

        let coordinator = self.coordinator.lock();
        let report = ReplayReport {
            stats: coordinator.stats(),
            frames,
            elapsed_ms: start.elapsed().as_millis() as u64,
            final_camera: coordinator.engine().camera(),
            last_overlay,
        };
        info!(
            "Replay finished: {} frames, {} progress applied, {} dropped in flight",
            report.frames, report.stats.progress_applied, report.stats.progress_dropped_in_flight
        );
        Ok(report)
    }
}
