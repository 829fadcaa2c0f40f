//! Route subsystem: scroll-driven camera paths and their registry.

use crate::types::{CameraState, LngLat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A start → end camera path driven by scroll progress within one segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub start_position: LngLat,
    pub end_position: LngLat,
    pub start_zoom: f64,
    pub end_zoom: f64,
    pub start_pitch: f64,
    pub end_pitch: f64,
    pub start_bearing: f64,
    pub end_bearing: f64,
}

impl Route {
    pub fn start(&self) -> CameraState {
        CameraState::new(
            self.start_position,
            self.start_zoom,
            self.start_pitch,
            self.start_bearing,
        )
    }

    pub fn end(&self) -> CameraState {
        CameraState::new(
            self.end_position,
            self.end_zoom,
            self.end_pitch,
            self.end_bearing,
        )
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Segment identifier → [`Route`].
///
/// Built once from the story configuration and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segment_id: &str) -> Option<&Route> {
        self.routes.get(segment_id)
    }

    pub fn contains(&self, segment_id: &str) -> bool {
        self.routes.contains_key(segment_id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<(String, Route)> for RouteRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Route)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
