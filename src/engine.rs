//! The map-rendering engine as seen by the synchronization core.
//!
//! The engine owns the live camera. The core only submits candidate states,
//! either immediately (scroll-driven sync) or as a timed animation (chapter
//! transitions, rotation). Engine callbacks (camera moved, animation
//! settled, resize) are delivered back into
//! [`StoryCoordinator`](crate::coordinator::StoryCoordinator) by whoever owns
//! the event loop.

use crate::interp::Easing;
use crate::types::{CameraState, LngLat, ScreenPoint};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle for one animated camera move.
///
/// The engine reports the same id when the move settles, which lets the
/// core tell the settle of its own transition apart from a stale one.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl std::fmt::Display for AnimationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    /// Zoom-out / zoom-in arc.
    Fly,
    /// Straight interpolation of every camera parameter.
    Ease,
}

/// Parameters of an animated camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motion {
    pub kind: MotionKind,
    /// `None` lets the engine pick a duration from the travel distance.
    pub duration: Option<Duration>,
    pub easing: Easing,
}

impl Motion {
    pub fn fly(duration: Option<Duration>) -> Self {
        Self {
            kind: MotionKind::Fly,
            duration,
            easing: Easing::EaseInOutCubic,
        }
    }

    pub fn ease(duration: Option<Duration>, easing: Easing) -> Self {
        Self {
            kind: MotionKind::Ease,
            duration,
            easing,
        }
    }
}

pub trait MapEngine {
    /// Set the camera now, cancelling any running animation.
    fn set_camera_immediate(&mut self, state: &CameraState);

    /// Start an animated move towards `state`.
    fn set_camera_animated(&mut self, state: &CameraState, motion: Motion) -> AnimationId;

    /// Current camera.
    fn camera(&self) -> CameraState;

    fn zoom(&self) -> f64 {
        self.camera().zoom
    }

    /// Project a geographic coordinate to container pixels under the
    /// current camera.
    fn project(&self, coordinate: LngLat) -> ScreenPoint;

    /// Stop every running animation where it is.
    fn stop_animations(&mut self);
}

/// Callbacks the engine raises back into the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    CameraMoved,
    AnimationSettled { animation: AnimationId },
    Resized { width: f64, height: f64 },
}
