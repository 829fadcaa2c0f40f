//! Camera ownership state shared by the synchronizer and the transition
//! controller.
//!
//! Exactly one [`SyncState`] exists per story, owned by the coordinator.
//! The transition controller is the only writer; the synchronizer only
//! reads it.

use crate::engine::AnimationId;
use std::time::Duration;

/// Who is currently allowed to write the camera.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CameraOwnership {
    /// Scroll progress drives the camera.
    #[default]
    Idle,
    /// A chapter transition owns the camera; progress events are dropped.
    TransitionInFlight {
        segment: String,
        animation: AnimationId,
        started_at: Duration,
        /// Time after which the lock is released even without a settle.
        deadline: Duration,
    },
}

/// The slow bearing rotation some chapters run after arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationTask {
    #[default]
    Idle,
    /// Starts when `after` settles.
    AwaitingSettle { after: AnimationId },
    Running { animation: AnimationId },
}

impl RotationTask {
    pub fn is_active(&self) -> bool {
        !matches!(self, RotationTask::Idle)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub active_segment: Option<String>,
    pub ownership: CameraOwnership,
    pub rotation: RotationTask,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition_in_flight(&self) -> bool {
        matches!(self.ownership, CameraOwnership::TransitionInFlight { .. })
    }

    pub fn is_active(&self, segment_id: &str) -> bool {
        self.active_segment.as_deref() == Some(segment_id)
    }
}
