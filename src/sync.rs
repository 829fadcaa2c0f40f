//! Camera synchronizer: scroll progress → camera state along a route.
//!
//! Called once per scroll-progress tick. The computation is pure
//! ([`CameraSynchronizer::camera_at`]); [`CameraSynchronizer::apply_progress`]
//! adds exactly one side effect, an immediate camera submission.

use crate::engine::MapEngine;
use crate::interp::{clamp_unit, ease_in_out_cubic, lerp, lerp_vector};
use crate::route::{Route, RouteRegistry};
use crate::state::SyncState;
use crate::types::{CameraState, LngLat, SmallViewportZoom};
use log::debug;
use std::sync::Arc;

/// Camera on `route` at `progress`, with the small-viewport zoom rule applied.
pub fn route_camera(
    route: &Route,
    progress: f64,
    small: bool,
    zoom_rule: &SmallViewportZoom,
) -> CameraState {
    let t = ease_in_out_cubic(clamp_unit(progress));

    let center = lerp_vector(
        &route.start_position.to_array(),
        &route.end_position.to_array(),
        t,
    );
    let zoom = lerp(route.start_zoom, route.end_zoom, t);

    CameraState {
        position: LngLat::new(center[0], center[1]),
        zoom: zoom_rule.apply(zoom, small),
        pitch: lerp(route.start_pitch, route.end_pitch, t),
        bearing: lerp(route.start_bearing, route.end_bearing, t),
    }
}

pub struct CameraSynchronizer {
    routes: Arc<RouteRegistry>,
    zoom_rule: SmallViewportZoom,
}

impl CameraSynchronizer {
    pub fn new(routes: Arc<RouteRegistry>, zoom_rule: SmallViewportZoom) -> Self {
        Self { routes, zoom_rule }
    }

    /// Camera for `segment_id` at `progress`, or `None` when the segment has
    /// no route.
    pub fn camera_at(&self, segment_id: &str, progress: f64, small: bool) -> Option<CameraState> {
        self.routes
            .get(segment_id)
            .map(|route| route_camera(route, progress, small, &self.zoom_rule))
    }

    /// Move the camera to `progress` along the segment's route.
    ///
    /// No-op when the segment has no route or a chapter transition owns the
    /// camera. Returns the submitted state.
    pub fn apply_progress<E: MapEngine + ?Sized>(
        &self,
        state: &SyncState,
        engine: &mut E,
        segment_id: &str,
        progress: f64,
        small: bool,
    ) -> Option<CameraState> {
        if state.transition_in_flight() {
            debug!("Progress {:.3} on '{}' dropped: transition in flight", progress, segment_id);
            return None;
        }

        let camera = self.camera_at(segment_id, progress, small)?;
        engine.set_camera_immediate(&camera);
        Some(camera)
    }
}
