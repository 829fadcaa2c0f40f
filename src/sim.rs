//! SimulatedMap – an in-process stand-in for the map-rendering engine.
//!
//! Implements [`MapEngine`] with a flat Web-Mercator projection (512 px
//! tiles, bearing rotation about the viewport centre; pitch is not
//! modelled) and time-based animations. Callbacks are queued as
//! [`EngineEvent`]s and drained by the event loop after each
//! [`SimulatedMap::advance`].

use crate::engine::{AnimationId, EngineEvent, MapEngine, Motion};
use crate::interp::{lerp, Easing};
use crate::types::{CameraState, LngLat, ScreenPoint, Viewport};
use std::f64::consts::PI;
use std::time::Duration;

pub const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Duration the engine picks when a move does not specify one.
pub const DEFAULT_MOVE_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
struct ActiveAnimation {
    id: AnimationId,
    from: CameraState,
    to: CameraState,
    started_at: Duration,
    duration: Duration,
    easing: Easing,
}

impl ActiveAnimation {
    fn sample(&self, now: Duration) -> (CameraState, bool) {
        let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
        let t = elapsed / self.duration.as_secs_f64();
        if t >= 1.0 {
            return (self.to, true);
        }

        let e = self.easing.apply(t);
        let camera = CameraState {
            position: LngLat::new(
                lerp(self.from.position.lng, self.to.position.lng, e),
                lerp(self.from.position.lat, self.to.position.lat, e),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom, e),
            pitch: lerp(self.from.pitch, self.to.pitch, e),
            bearing: lerp(self.from.bearing, self.to.bearing, e),
        };
        (camera, false)
    }
}

pub struct SimulatedMap {
    viewport: Viewport,
    camera: CameraState,
    animation: Option<ActiveAnimation>,
    next_id: u64,
    now: Duration,
    pending: Vec<EngineEvent>,
    /// Every camera submitted through [`MapEngine::set_camera_immediate`].
    immediate_log: Vec<CameraState>,
}

impl SimulatedMap {
    pub fn new(camera: CameraState, viewport: Viewport) -> Self {
        Self {
            viewport,
            camera,
            animation: None,
            next_id: 1,
            now: Duration::ZERO,
            pending: Vec::new(),
            immediate_log: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn immediate_log(&self) -> &[CameraState] {
        &self.immediate_log
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pending.push(EngineEvent::Resized {
            width: viewport.width,
            height: viewport.height,
        });
    }

    /// Step the running animation to `now`, queueing move/settle events.
    pub fn advance(&mut self, now: Duration) {
        self.now = self.now.max(now);
        let Some(anim) = &self.animation else {
            return;
        };

        let (camera, done) = anim.sample(self.now);
        self.camera = camera;
        self.pending.push(EngineEvent::CameraMoved);
        if done {
            let id = anim.id;
            self.animation = None;
            self.pending.push(EngineEvent::AnimationSettled { animation: id });
        }
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }

    fn interrupt(&mut self) {
        if let Some(anim) = self.animation.take() {
            self.pending
                .push(EngineEvent::AnimationSettled { animation: anim.id });
        }
    }

    fn world_pixels(&self, coordinate: LngLat, zoom: f64) -> (f64, f64) {
        let scale = TILE_SIZE * 2f64.powf(zoom);
        let x = (coordinate.lng + 180.0) / 360.0 * scale;
        let lat = coordinate.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * scale;
        (x, y)
    }
}

impl MapEngine for SimulatedMap {
    fn set_camera_immediate(&mut self, state: &CameraState) {
        self.interrupt();
        self.camera = *state;
        self.immediate_log.push(*state);
        self.pending.push(EngineEvent::CameraMoved);
    }

    fn set_camera_animated(&mut self, state: &CameraState, motion: Motion) -> AnimationId {
        self.interrupt();

        let id = AnimationId(self.next_id);
        self.next_id += 1;

        let duration = motion.duration.unwrap_or(DEFAULT_MOVE_DURATION);
        if duration.is_zero() {
            self.camera = *state;
            self.pending.push(EngineEvent::CameraMoved);
            self.pending
                .push(EngineEvent::AnimationSettled { animation: id });
            return id;
        }

        self.animation = Some(ActiveAnimation {
            id,
            from: self.camera,
            to: *state,
            started_at: self.now,
            duration,
            easing: motion.easing,
        });
        id
    }

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn project(&self, coordinate: LngLat) -> ScreenPoint {
        let (px, py) = self.world_pixels(coordinate, self.camera.zoom);
        let (cx, cy) = self.world_pixels(self.camera.position, self.camera.zoom);
        let (dx, dy) = (px - cx, py - cy);

        let angle = -self.camera.bearing.to_radians();
        let (sin, cos) = angle.sin_cos();
        let center = self.viewport.center();
        ScreenPoint::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }

    fn stop_animations(&mut self) {
        self.interrupt();
    }
}
