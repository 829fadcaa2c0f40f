//! Shared test fakes.

#![allow(dead_code)]

use scrolly_sync::{
    AnimationId, CameraState, LngLat, MapEngine, Motion, ScreenPoint, StoryConfig,
};
use std::time::Duration;

/// Records every submission. Animated moves "arrive" instantly so that
/// `camera()` reflects the last target, but no settle is ever reported on
/// its own: tests deliver settles explicitly.
pub struct RecordingEngine {
    pub camera: CameraState,
    pub immediate: Vec<CameraState>,
    pub animated: Vec<(CameraState, Motion, AnimationId)>,
    pub stops: usize,
    next_id: u64,
}

impl RecordingEngine {
    pub fn new(camera: CameraState) -> Self {
        Self {
            camera,
            immediate: Vec::new(),
            animated: Vec::new(),
            stops: 0,
            next_id: 1,
        }
    }

    pub fn at_origin() -> Self {
        Self::new(CameraState::new(LngLat::new(-74.0, 40.7), 11.0, 0.0, 0.0))
    }

    pub fn last_animated(&self) -> &(CameraState, Motion, AnimationId) {
        self.animated.last().expect("no animated move recorded")
    }
}

impl MapEngine for RecordingEngine {
    fn set_camera_immediate(&mut self, state: &CameraState) {
        self.camera = *state;
        self.immediate.push(*state);
    }

    fn set_camera_animated(&mut self, state: &CameraState, motion: Motion) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.camera = *state;
        self.animated.push((*state, motion, id));
        id
    }

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn project(&self, coordinate: LngLat) -> ScreenPoint {
        let scale = 100.0 * 2f64.powf(self.camera.zoom);
        ScreenPoint::new(
            400.0 + (coordinate.lng - self.camera.position.lng) * scale,
            300.0 - (coordinate.lat - self.camera.position.lat) * scale,
        )
    }

    fn stop_animations(&mut self) {
        self.stops += 1;
    }
}

pub fn story() -> StoryConfig {
    StoryConfig::builtin().expect("bundled story must load")
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
