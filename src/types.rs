//! Core camera and viewport types shared across all modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Geographic coordinates
// ---------------------------------------------------------------------------

/// A `[longitude, latitude]` pair in degrees.
///
/// Serialized as a two-element array, matching the GeoJSON convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        p.to_array()
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.5}, {:.5}]", self.lng, self.lat)
    }
}

// ---------------------------------------------------------------------------
// Screen space
// ---------------------------------------------------------------------------

/// A pixel position relative to the top-left corner of the map container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the viewport is at or below the small-screen breakpoint.
    pub fn is_small(&self, breakpoint_px: f64) -> bool {
        self.width <= breakpoint_px
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Full set of parameters that determine what the map shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraState {
    pub position: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl CameraState {
    pub fn new(position: LngLat, zoom: f64, pitch: f64, bearing: f64) -> Self {
        Self {
            position,
            zoom,
            pitch,
            bearing,
        }
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &CameraState, eps: f64) -> bool {
        (self.position.lng - other.position.lng).abs() <= eps
            && (self.position.lat - other.position.lat).abs() <= eps
            && (self.zoom - other.zoom).abs() <= eps
            && (self.pitch - other.pitch).abs() <= eps
            && (self.bearing - other.bearing).abs() <= eps
    }
}

impl std::fmt::Display for CameraState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} z{:.2} p{:.1} b{:.1}",
            self.position, self.zoom, self.pitch, self.bearing
        )
    }
}

// ---------------------------------------------------------------------------
// Zoom rule
// ---------------------------------------------------------------------------

/// Small-viewport zoom reduction applied to every route-derived camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SmallViewportZoom {
    /// Zoom levels subtracted on small viewports.
    pub reduction: f64,
    /// The reduced zoom never drops below this level.
    pub floor: f64,
}

impl SmallViewportZoom {
    pub fn apply(&self, zoom: f64, small: bool) -> f64 {
        if small {
            (zoom - self.reduction).max(self.floor)
        } else {
            zoom
        }
    }
}

impl Default for SmallViewportZoom {
    fn default() -> Self {
        Self {
            reduction: 1.0,
            floor: 9.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStats {
    pub progress_applied: u64,
    pub progress_dropped_in_flight: u64,
    pub progress_ignored: u64,
    pub transitions_started: u64,
    pub transitions_released: u64,
    pub rotations_started: u64,
    pub rotations_cancelled: u64,
}

/// How an in-flight chapter transition hands camera ownership back to the
/// scroll synchronizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockPolicy {
    /// Release after a fixed delay, regardless of the engine.
    Timer {
        #[serde(with = "duration_ms")]
        duration: Duration,
    },
    /// Release when the engine reports that the transition's own animation
    /// settled. `safety_timeout` releases the lock if that never happens.
    AnimationSettled {
        #[serde(with = "duration_ms")]
        safety_timeout: Duration,
    },
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self::AnimationSettled {
            safety_timeout: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Viewports at or below this width (px) use the small zoom variants.
    pub small_breakpoint_px: f64,
    pub small_zoom: SmallViewportZoom,
    /// Duration of the fly to a route's start point.
    #[serde(with = "duration_ms")]
    pub route_entry_duration: Duration,
    pub unlock: UnlockPolicy,
    /// Bearing delta of the slow rotation on rotate-enabled chapters.
    pub rotation_degrees: f64,
    #[serde(with = "duration_ms")]
    pub rotation_duration: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            small_breakpoint_px: 600.0,
            small_zoom: SmallViewportZoom::default(),
            route_entry_duration: Duration::from_millis(1000),
            unlock: UnlockPolicy::default(),
            rotation_degrees: 90.0,
            rotation_duration: Duration::from_millis(24_000),
        }
    }
}

/// Serde helper: durations as integer milliseconds.
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
