//! Story configuration: chapters, routes and annotation points.
//!
//! Everything here is immutable once loaded. [`StoryConfig::validate`] runs
//! on every load path so the coordinator can assume unique chapter ids and
//! routes that belong to a chapter.

use crate::error::StoryError;
use crate::layers::{deserialize_action, LayerAction};
use crate::route::{Route, RouteRegistry};
use crate::types::{CameraState, LngLat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

const BUILTIN_STORY: &str = include_str!("../data/story.json");

// ---------------------------------------------------------------------------
// Chapter pieces
// ---------------------------------------------------------------------------

/// Horizontal placement of a chapter card. Unknown values render centered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
    Full,
}

impl Alignment {
    /// CSS class of the chapter container.
    pub fn css_class(&self) -> &'static str {
        match self {
            Alignment::Left => "lefty",
            Alignment::Center => "centered",
            Alignment::Right => "righty",
            Alignment::Full => "fully",
        }
    }
}

impl From<String> for Alignment {
    fn from(s: String) -> Self {
        match s.as_str() {
            "left" => Alignment::Left,
            "right" => Alignment::Right,
            "full" => Alignment::Full,
            _ => Alignment::Center,
        }
    }
}

impl From<Alignment> for String {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Full => "full",
        }
        .to_string()
    }
}

/// How the camera reaches a chapter's canonical view.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MapAnimation {
    #[default]
    FlyTo,
    EaseTo,
    JumpTo,
}

/// Canonical view of a chapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub center: LngLat,
    pub zoom: f64,
    /// Zoom used on small viewports.
    pub zoom_small: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Location {
    pub fn camera(&self, small: bool) -> CameraState {
        let zoom = if small { self.zoom_small } else { self.zoom };
        CameraState::new(self.center, zoom, self.pitch, self.bearing)
    }
}

/// Opacity change applied to an overlay when a chapter is entered or left.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayEffect {
    /// Target overlay identifier (e.g. `highlight-circles`).
    pub layer: String,
    /// Missing means "show" on enter and "hide" on exit.
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub duration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSegment {
    pub id: String,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub hidden: bool,
    pub location: Location,
    #[serde(default)]
    pub map_animation: MapAnimation,
    #[serde(default)]
    pub rotate_animation: bool,
    #[serde(default, deserialize_with = "deserialize_action")]
    pub callback: Option<LayerAction>,
    #[serde(default)]
    pub on_chapter_enter: Vec<OverlayEffect>,
    #[serde(default)]
    pub on_chapter_exit: Vec<OverlayEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationPoint {
    pub coordinate: LngLat,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: String,
    pub chapters: Vec<NarrativeSegment>,
    #[serde(default)]
    pub routes: BTreeMap<String, Route>,
    #[serde(default)]
    pub annotations: Vec<AnnotationPoint>,
}

impl StoryConfig {
    /// The bundled New York 2024 story.
    pub fn builtin() -> Result<Self, StoryError> {
        Self::from_json_str(BUILTIN_STORY)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StoryError> {
        let story: StoryConfig = serde_json::from_str(raw)?;
        story.validate()?;
        Ok(story)
    }

    pub fn validate(&self) -> Result<(), StoryError> {
        if self.chapters.is_empty() {
            return Err(StoryError::Empty);
        }

        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if !seen.insert(chapter.id.as_str()) {
                return Err(StoryError::DuplicateChapter(chapter.id.clone()));
            }
        }

        if let Some(orphan) = self.routes.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(StoryError::OrphanRoute(orphan.clone()));
        }

        Ok(())
    }

    pub fn segment(&self, id: &str) -> Option<&NarrativeSegment> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&NarrativeSegment> {
        self.chapters.first()
    }

    pub fn route_registry(&self) -> RouteRegistry {
        self.routes
            .iter()
            .map(|(id, route)| (id.clone(), route.clone()))
            .collect()
    }

    /// Camera the map is created with: the first chapter's view.
    pub fn initial_camera(&self, small: bool) -> Option<CameraState> {
        self.first().map(|c| c.location.camera(small))
    }
}
