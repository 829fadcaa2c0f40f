//! StoryCoordinator – single owner of the sync state, routes scroll and
//! engine events to the synchronizer, transition controller and overlay.

use crate::engine::{AnimationId, EngineEvent, MapEngine};
use crate::error::DataError;
use crate::layers::{LayerId, LayerRegistry, LayerSink};
use crate::overlay::{OverlayFrame, OverlayLayer, OverlayStyle};
use crate::protocol::ScrollEvent;
use crate::state::SyncState;
use crate::story::StoryConfig;
use crate::sync::CameraSynchronizer;
use crate::transition::TransitionController;
use crate::types::{CameraState, SyncConfig, SyncStats, Viewport};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

pub struct StoryCoordinator<E: MapEngine, S: LayerSink> {
    story: Arc<StoryConfig>,
    config: SyncConfig,
    state: SyncState,
    synchronizer: CameraSynchronizer,
    transitions: TransitionController,
    overlay: OverlayLayer,
    layers: LayerRegistry<S>,
    engine: E,
    viewport: Viewport,
    now: Duration,
    stats: SyncStats,
}

impl<E: MapEngine, S: LayerSink> StoryCoordinator<E, S> {
    pub fn new(
        story: StoryConfig,
        config: SyncConfig,
        engine: E,
        sink: S,
        viewport: Viewport,
    ) -> Self {
        let routes = Arc::new(story.route_registry());
        let overlay = OverlayLayer::new(story.annotations.clone(), OverlayStyle::default());

        Self {
            synchronizer: CameraSynchronizer::new(routes.clone(), config.small_zoom),
            transitions: TransitionController::new(routes, config.clone()),
            story: Arc::new(story),
            config,
            state: SyncState::new(),
            overlay,
            layers: LayerRegistry::new(sink),
            engine,
            viewport,
            now: Duration::ZERO,
            stats: SyncStats::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Scroll observer events
    // -----------------------------------------------------------------------

    /// Handle one scroll-observer event at time `now`.
    ///
    /// Returns a fresh overlay frame when overlay opacity changed.
    pub fn handle_scroll(&mut self, event: &ScrollEvent, now: Duration) -> Option<OverlayFrame> {
        self.now = self.now.max(now);
        match event {
            ScrollEvent::Enter { segment } => self.on_segment_enter(segment),
            ScrollEvent::Exit { segment } => self.on_segment_exit(segment),
            ScrollEvent::Progress { segment, progress } => {
                self.on_segment_progress(segment, *progress);
                None
            }
        }
    }

    pub fn on_segment_enter(&mut self, segment_id: &str) -> Option<OverlayFrame> {
        let Some(segment) = self.story.segment(segment_id) else {
            debug!("Enter for unknown segment '{}' ignored", segment_id);
            return None;
        };

        let small = self.viewport.is_small(self.config.small_breakpoint_px);
        let outcome = self.transitions.on_segment_enter(
            &mut self.state,
            segment,
            small,
            self.now,
            &mut self.engine,
            &mut self.overlay,
            &mut self.layers,
        );

        if outcome.animation.is_some() {
            self.stats.transitions_started += 1;
        }
        if outcome.released {
            self.stats.transitions_released += 1;
        }
        if outcome.rotation_cancelled {
            self.stats.rotations_cancelled += 1;
        }
        if outcome.rotation_started {
            self.stats.rotations_started += 1;
        }

        outcome
            .overlay_changed
            .then(|| self.overlay.reproject(&self.engine))
    }

    pub fn on_segment_exit(&mut self, segment_id: &str) -> Option<OverlayFrame> {
        let Some(segment) = self.story.segment(segment_id) else {
            debug!("Exit for unknown segment '{}' ignored", segment_id);
            return None;
        };

        self.transitions
            .on_segment_exit(segment, &mut self.overlay)
            .then(|| self.overlay.reproject(&self.engine))
    }

    /// Drive the active segment's route. Returns the submitted camera.
    pub fn on_segment_progress(&mut self, segment_id: &str, progress: f64) -> Option<CameraState> {
        if !self.state.is_active(segment_id) {
            debug!("Progress for inactive segment '{}' ignored", segment_id);
            self.stats.progress_ignored += 1;
            return None;
        }

        let small = self.is_small();
        let applied = self.synchronizer.apply_progress(
            &self.state,
            &mut self.engine,
            segment_id,
            progress,
            small,
        );

        match applied {
            Some(_) => self.stats.progress_applied += 1,
            None if self.state.transition_in_flight() => {
                self.stats.progress_dropped_in_flight += 1
            }
            None => self.stats.progress_ignored += 1,
        }
        applied
    }

    // -----------------------------------------------------------------------
    // Engine events
    // -----------------------------------------------------------------------

    pub fn handle_engine_event(&mut self, event: &EngineEvent) -> Option<OverlayFrame> {
        match event {
            EngineEvent::CameraMoved => Some(self.handle_camera_moved()),
            EngineEvent::AnimationSettled { animation } => {
                self.handle_animation_settled(*animation);
                None
            }
            EngineEvent::Resized { width, height } => {
                Some(self.handle_resize(Viewport::new(*width, *height)))
            }
        }
    }

    pub fn handle_camera_moved(&mut self) -> OverlayFrame {
        self.overlay.reproject(&self.engine)
    }

    pub fn handle_animation_settled(&mut self, animation: AnimationId) {
        let outcome = self.transitions.on_animation_settled(
            &mut self.state,
            animation,
            self.now,
            &mut self.engine,
        );
        if outcome.released {
            self.stats.transitions_released += 1;
        }
        if outcome.rotation_started {
            self.stats.rotations_started += 1;
        }
    }

    pub fn handle_resize(&mut self, viewport: Viewport) -> OverlayFrame {
        let was_small = self.is_small();
        self.viewport = viewport;
        if was_small != self.is_small() {
            debug!(
                "Viewport {}x{} → small={} (zoom {:.2})",
                viewport.width,
                viewport.height,
                self.is_small(),
                self.engine.zoom()
            );
        }
        self.overlay.reproject(&self.engine)
    }

    /// Advance the clock and release an expired transition lock.
    pub fn tick(&mut self, now: Duration) {
        self.now = self.now.max(now);
        if self.transitions.tick(&mut self.state, self.now) {
            self.stats.transitions_released += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Datasets
    // -----------------------------------------------------------------------

    /// Record a dataset load. Once the arc layer is ready the active
    /// chapter's layer action (or the first chapter's) is applied again.
    pub fn on_dataset_loaded(&mut self, layer: LayerId, result: Result<usize, DataError>) {
        if !self.layers.record_load(layer, result) || layer != LayerId::Arcs {
            return;
        }

        let segment = self
            .state
            .active_segment
            .as_deref()
            .and_then(|id| self.story.segment(id))
            .or_else(|| self.story.first());

        if let Some(action) = segment.and_then(|s| s.callback) {
            self.layers.activate(action);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_small(&self) -> bool {
        self.viewport.is_small(self.config.small_breakpoint_px)
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn stats(&self) -> SyncStats {
        self.stats.clone()
    }

    pub fn story(&self) -> &StoryConfig {
        &self.story
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn layers(&self) -> &LayerRegistry<S> {
        &self.layers
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }
}
