//! Overlay annotation layer: highlight circles with labels above them.
//!
//! Screen positions are recomputed from the engine on every camera change and
//! returned as an [`OverlayFrame`]; the layer itself only stores the static
//! point list and the current opacity.

use crate::engine::MapEngine;
use crate::story::{AnnotationPoint, OverlayEffect};
use crate::types::ScreenPoint;
use log::debug;
use serde::{Deserialize, Serialize};

/// Overlay id targeted by chapter effects.
pub const HIGHLIGHT_CIRCLES: &str = "highlight-circles";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverlayStyle {
    /// Circle diameter in pixels.
    pub circle_size: f64,
    /// Extra space between the circle's top edge and the label.
    pub label_gap: f64,
}

impl OverlayStyle {
    /// Distance from the circle centre up to the label anchor.
    pub fn vertical_offset(&self) -> f64 {
        (self.circle_size / 2.0 + self.label_gap).round()
    }

    pub fn font_size(&self) -> f64 {
        (self.circle_size / 7.0).round().clamp(10.0, 16.0)
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            circle_size: 150.0,
            label_gap: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub label: String,
    pub circle: ScreenPoint,
    /// Bottom-centre of the label.
    pub label_anchor: ScreenPoint,
}

/// Everything a renderer needs to draw the overlay for one camera state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayFrame {
    pub opacity: f64,
    pub circle_size: f64,
    pub font_size: f64,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone)]
pub struct OverlayLayer {
    id: String,
    points: Vec<AnnotationPoint>,
    style: OverlayStyle,
    opacity: f64,
}

impl OverlayLayer {
    /// New layer, initially hidden.
    pub fn new(points: Vec<AnnotationPoint>, style: OverlayStyle) -> Self {
        Self {
            id: HIGHLIGHT_CIRCLES.to_string(),
            points,
            style,
            opacity: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Apply a chapter effect. `default_opacity` is used when the effect
    /// leaves it unspecified. Returns `false` when the effect targets some
    /// other overlay.
    pub fn apply_effect(&mut self, effect: &OverlayEffect, default_opacity: f64) -> bool {
        if effect.layer != self.id {
            debug!("Overlay effect for unknown layer '{}' ignored", effect.layer);
            return false;
        }
        self.set_opacity(effect.opacity.unwrap_or(default_opacity));
        true
    }

    /// Project every point under the engine's current camera.
    ///
    /// Runs regardless of opacity so a re-shown overlay is already in place.
    pub fn reproject<E: MapEngine + ?Sized>(&self, engine: &E) -> OverlayFrame {
        let offset = self.style.vertical_offset();
        let placements = self
            .points
            .iter()
            .map(|point| {
                let p = engine.project(point.coordinate);
                Placement {
                    label: point.label.clone(),
                    circle: p,
                    label_anchor: ScreenPoint::new(p.x, p.y - offset),
                }
            })
            .collect();

        OverlayFrame {
            opacity: self.opacity,
            circle_size: self.style.circle_size,
            font_size: self.style.font_size(),
            placements,
        }
    }
}
