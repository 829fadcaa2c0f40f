//! Chapter transition controller.
//!
//! ```text
//!            enter(segment)                 settle(own id) / deadline
//!   Idle ─────────────────────▶ InFlight ─────────────────────────────▶ Idle
//!     ▲                            │ enter(other): replaces the transition
//!     └──── enter(jumpTo) ─────────┘
//! ```
//!
//! The controller is the only writer of [`SyncState`]. Exit events only
//! touch overlay opacity.

use crate::engine::{AnimationId, MapEngine, Motion};
use crate::interp::Easing;
use crate::layers::{LayerRegistry, LayerSink};
use crate::overlay::OverlayLayer;
use crate::route::RouteRegistry;
use crate::state::{CameraOwnership, RotationTask, SyncState};
use crate::story::{MapAnimation, NarrativeSegment};
use crate::types::{CameraState, SyncConfig, UnlockPolicy};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What [`TransitionController::on_segment_enter`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterOutcome {
    /// Camera the transition heads to.
    pub target: CameraState,
    /// `None` for instant jumps.
    pub animation: Option<AnimationId>,
    pub rotation_cancelled: bool,
    pub rotation_started: bool,
    /// True when a jump released an earlier transition's lock.
    pub released: bool,
    /// True when an overlay effect changed opacity.
    pub overlay_changed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleOutcome {
    pub released: bool,
    pub rotation_started: bool,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct TransitionController {
    routes: Arc<RouteRegistry>,
    config: SyncConfig,
}

impl TransitionController {
    pub fn new(routes: Arc<RouteRegistry>, config: SyncConfig) -> Self {
        Self { routes, config }
    }

    /// Take camera ownership and move to the segment's entry view.
    ///
    /// Route segments fly to the route start over the fixed entry duration;
    /// other segments use their own animation kind towards the canonical
    /// view. The segment's layer action and enter effects apply immediately.
    #[allow(clippy::too_many_arguments)]
    pub fn on_segment_enter<E, S>(
        &self,
        state: &mut SyncState,
        segment: &NarrativeSegment,
        small: bool,
        now: Duration,
        engine: &mut E,
        overlay: &mut OverlayLayer,
        layers: &mut LayerRegistry<S>,
    ) -> EnterOutcome
    where
        E: MapEngine + ?Sized,
        S: LayerSink,
    {
        let rotation_cancelled = self.cancel_rotation(state, engine);
        state.active_segment = Some(segment.id.clone());

        let mut rotation_started = false;
        let mut released = false;
        let (target, animation) = match self.routes.get(&segment.id) {
            Some(route) => {
                let mut target = route.start();
                target.zoom = self.config.small_zoom.apply(target.zoom, small);

                let id = engine.set_camera_animated(
                    &target,
                    Motion::fly(Some(self.config.route_entry_duration)),
                );
                self.lock(state, &segment.id, id, now);
                (target, Some(id))
            }
            None => {
                let target = segment.location.camera(small);
                let motion = match segment.map_animation {
                    MapAnimation::FlyTo => Some(Motion::fly(None)),
                    MapAnimation::EaseTo => Some(Motion::ease(None, Easing::EaseInOutCubic)),
                    MapAnimation::JumpTo => None,
                };

                match motion {
                    Some(motion) => {
                        let id = engine.set_camera_animated(&target, motion);
                        self.lock(state, &segment.id, id, now);
                        if segment.rotate_animation {
                            state.rotation = RotationTask::AwaitingSettle { after: id };
                        }
                        (target, Some(id))
                    }
                    None => {
                        // A jump has already arrived: nothing to wait for.
                        engine.set_camera_immediate(&target);
                        released = self.release(state, now);
                        if segment.rotate_animation {
                            self.start_rotation(state, engine);
                            rotation_started = true;
                        }
                        (target, None)
                    }
                }
            }
        };

        info!("Entered '{}' → {}", segment.id, target);

        if let Some(action) = segment.callback {
            layers.activate(action);
        }

        let mut overlay_changed = false;
        for effect in &segment.on_chapter_enter {
            overlay_changed |= overlay.apply_effect(effect, 1.0);
        }

        EnterOutcome {
            target,
            animation,
            rotation_cancelled,
            rotation_started,
            released,
            overlay_changed,
        }
    }

    /// Apply the segment's exit effects. Camera ownership is untouched.
    ///
    /// Returns true when overlay opacity changed.
    pub fn on_segment_exit(&self, segment: &NarrativeSegment, overlay: &mut OverlayLayer) -> bool {
        let mut changed = false;
        for effect in &segment.on_chapter_exit {
            changed |= overlay.apply_effect(effect, 0.0);
        }
        changed
    }

    /// The engine finished (or abandoned) the animation `id`.
    pub fn on_animation_settled<E: MapEngine + ?Sized>(
        &self,
        state: &mut SyncState,
        id: AnimationId,
        now: Duration,
        engine: &mut E,
    ) -> SettleOutcome {
        let mut outcome = SettleOutcome::default();

        let owns = matches!(
            &state.ownership,
            CameraOwnership::TransitionInFlight { animation, .. } if *animation == id
        );
        if owns && matches!(self.config.unlock, UnlockPolicy::AnimationSettled { .. }) {
            outcome.released = self.release(state, now);
        }

        match state.rotation {
            RotationTask::AwaitingSettle { after } if after == id => {
                self.start_rotation(state, engine);
                outcome.rotation_started = true;
            }
            RotationTask::Running { animation } if animation == id => {
                state.rotation = RotationTask::Idle;
            }
            _ => {}
        }

        outcome
    }

    /// Release the lock once its deadline has passed. Returns true on release.
    pub fn tick(&self, state: &mut SyncState, now: Duration) -> bool {
        let CameraOwnership::TransitionInFlight {
            segment, deadline, ..
        } = &state.ownership
        else {
            return false;
        };
        if now < *deadline {
            return false;
        }

        if let UnlockPolicy::AnimationSettled { safety_timeout } = self.config.unlock {
            warn!(
                "Transition into '{}' never settled; releasing after {:?}",
                segment, safety_timeout
            );
        }
        self.release(state, now)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock(&self, state: &mut SyncState, segment: &str, animation: AnimationId, now: Duration) {
        let hold = match self.config.unlock {
            UnlockPolicy::Timer { duration } => duration,
            UnlockPolicy::AnimationSettled { safety_timeout } => safety_timeout,
        };
        state.ownership = CameraOwnership::TransitionInFlight {
            segment: segment.to_string(),
            animation,
            started_at: now,
            deadline: now + hold,
        };
    }

    /// Hand the camera back to scroll progress. Returns true if a
    /// transition was in flight.
    fn release(&self, state: &mut SyncState, now: Duration) -> bool {
        match std::mem::take(&mut state.ownership) {
            CameraOwnership::TransitionInFlight {
                segment,
                animation,
                started_at,
                ..
            } => {
                debug!(
                    "Released '{}' ({}) after {:?}",
                    segment,
                    animation,
                    now.saturating_sub(started_at)
                );
                true
            }
            CameraOwnership::Idle => false,
        }
    }

    fn start_rotation<E: MapEngine + ?Sized>(&self, state: &mut SyncState, engine: &mut E) {
        engine.stop_animations();
        let mut target = engine.camera();
        target.bearing += self.config.rotation_degrees;

        let id = engine.set_camera_animated(
            &target,
            Motion::ease(Some(self.config.rotation_duration), Easing::Linear),
        );
        debug!("Rotation started ({} → bearing {:.1})", id, target.bearing);
        state.rotation = RotationTask::Running { animation: id };
    }

    /// Stop a running rotation before anything else writes the bearing.
    fn cancel_rotation<E: MapEngine + ?Sized>(&self, state: &mut SyncState, engine: &mut E) -> bool {
        match std::mem::take(&mut state.rotation) {
            RotationTask::Running { animation } => {
                debug!("Cancelling rotation {}", animation);
                engine.stop_animations();
                true
            }
            RotationTask::AwaitingSettle { .. } => true,
            RotationTask::Idle => false,
        }
    }
}
