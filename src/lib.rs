//! Scrolly Sync
//!
//! Scroll-to-camera synchronization for map-driven scrollytelling: scroll
//! progress through a narrative drives a map camera, and chapter changes
//! trigger discrete camera transitions and layer visibility changes.
//!
//! ## Architecture
//!
//! ```text
//! ReplayDriver  (driver.rs)        ← tokio loop: script feeder + frames
//!   └── StoryCoordinator  (coordinator.rs) ← owns SyncState
//!         ├── CameraSynchronizer    (sync.rs)       ← progress → camera
//!         ├── TransitionController  (transition.rs) ← enter/exit, lock
//!         ├── OverlayLayer          (overlay.rs)    ← annotation projection
//!         ├── LayerRegistry         (layers.rs)     ← data-layer actions
//!         └── impl MapEngine        (engine.rs, sim.rs)
//! ```
//!
//! The scroll synchronizer and the transition controller both write the
//! camera. [`state::CameraOwnership`] decides which one may: while a chapter
//! transition is in flight, scroll progress is dropped.

// Core types are always available (no runtime feature needed).
pub mod coordinator;
pub mod data;
pub mod engine;
pub mod error;
pub mod interp;
pub mod layers;
pub mod overlay;
pub mod protocol;
pub mod route;
pub mod sim;
pub mod state;
pub mod story;
pub mod sync;
pub mod transition;
pub mod types;

// The replay driver requires the `runtime` feature.
#[cfg(feature = "runtime")]
pub mod driver;

// Convenience re-exports
pub use coordinator::StoryCoordinator;
#[cfg(feature = "runtime")]
pub use driver::{ReplayConfig, ReplayDriver, ReplayReport};
pub use engine::{AnimationId, EngineEvent, MapEngine, Motion, MotionKind};
pub use error::{DataError, StoryError};
pub use layers::{LayerAction, LayerId, LayerSink};
pub use protocol::{ReplayScript, ScrollEvent};
pub use route::{Route, RouteRegistry};
pub use sim::SimulatedMap;
pub use state::{CameraOwnership, RotationTask, SyncState};
pub use story::{NarrativeSegment, StoryConfig};
pub use types::{CameraState, LngLat, ScreenPoint, SyncConfig, SyncStats, UnlockPolicy, Viewport};
