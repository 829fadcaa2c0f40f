//! Scroll-observer events and the replay script format.
//!
//! A script is a JSON document of timed scroll events:
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 800 },
//!   "steps": [
//!     { "at_ms": 0,    "type": "enter",    "segment": "overview" },
//!     { "at_ms": 4000, "type": "progress", "segment": "brooklynView", "progress": 0.5 }
//!   ]
//! }
//! ```
//!
//! Steps must be sorted by `at_ms`; [`ReplayScript::from_json_str`] sorts
//! them (stably) if they are not.

use crate::types::Viewport;
use serde::{Deserialize, Serialize};

const DEMO_SCRIPT: &str = include_str!("../data/demo_script.json");

/// One event from the scroll-position observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollEvent {
    Enter { segment: String },
    Exit { segment: String },
    /// `progress` is how far the viewport has scrolled through the
    /// segment, nominally in `[0, 1]`.
    Progress { segment: String, progress: f64 },
}

impl ScrollEvent {
    pub fn segment(&self) -> &str {
        match self {
            ScrollEvent::Enter { segment }
            | ScrollEvent::Exit { segment }
            | ScrollEvent::Progress { segment, .. } => segment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ScrollEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub viewport: Option<Viewport>,
    pub steps: Vec<ScriptStep>,
}

impl ReplayScript {
    /// A walk through the bundled story, including progress events that
    /// arrive while chapter transitions are still flying.
    pub fn demo() -> Result<Self, serde_json::Error> {
        Self::from_json_str(DEMO_SCRIPT)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let mut script: ReplayScript = serde_json::from_str(raw)?;
        script.steps.sort_by_key(|s| s.at_ms);
        Ok(script)
    }

    /// Time of the last step.
    pub fn end_ms(&self) -> u64 {
        self.steps.last().map(|s| s.at_ms).unwrap_or(0)
    }
}
