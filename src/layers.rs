//! Data-layer visibility: typed chapter actions and dataset readiness.
//!
//! Chapters name a layer action in the story config (`"showBothLayers"`).
//! Names are resolved to [`LayerAction`] when the config is loaded; unknown
//! names resolve to "no action" so a typo never breaks the story.

use log::{debug, error, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::DataError;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    /// One dot per geotagged photo.
    Scatterplot,
    /// One arc per consecutive photo pair within a day.
    Arcs,
}

impl LayerId {
    pub const ALL: [LayerId; 2] = [LayerId::Scatterplot, LayerId::Arcs];
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerId::Scatterplot => f.write_str("scatterplot-layer"),
            LayerId::Arcs => f.write_str("arc-layer"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerAction {
    ShowBothLayers,
    ShowScatterOnly,
    HideAllLayers,
}

impl LayerAction {
    /// Desired visibility for every layer under this action.
    pub fn visibility(&self) -> [(LayerId, bool); 2] {
        match self {
            LayerAction::ShowBothLayers => [(LayerId::Scatterplot, true), (LayerId::Arcs, true)],
            LayerAction::ShowScatterOnly => {
                [(LayerId::Scatterplot, true), (LayerId::Arcs, false)]
            }
            LayerAction::HideAllLayers => [(LayerId::Scatterplot, false), (LayerId::Arcs, false)],
        }
    }
}

impl FromStr for LayerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "showBothLayers" => Ok(LayerAction::ShowBothLayers),
            "showScatterOnly" => Ok(LayerAction::ShowScatterOnly),
            "hideAllLayers" => Ok(LayerAction::HideAllLayers),
            other => Err(other.to_string()),
        }
    }
}

/// Deserialize an optional action name, dropping names that do not resolve.
pub(crate) fn deserialize_action<'de, D>(d: D) -> Result<Option<LayerAction>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(d)?;
    Ok(name.and_then(|n| match n.parse() {
        Ok(action) => Some(action),
        Err(unknown) => {
            warn!("Unknown layer action '{}' ignored", unknown);
            None
        }
    }))
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// The GPU layer renderer, as seen by the synchronization engine.
pub trait LayerSink {
    fn set_layer_visible(&mut self, layer: LayerId, visible: bool);
}

/// A sink that only records the last requested visibility per layer.
#[derive(Debug, Default, Clone)]
pub struct VisibilityTable {
    pub visible: HashMap<LayerId, bool>,
}

impl VisibilityTable {
    pub fn is_visible(&self, layer: LayerId) -> bool {
        self.visible.get(&layer).copied().unwrap_or(false)
    }
}

impl LayerSink for VisibilityTable {
    fn set_layer_visible(&mut self, layer: LayerId, visible: bool) {
        self.visible.insert(layer, visible);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Pending,
    Ready { records: usize },
    Failed,
}

/// Tracks which layers have data and forwards actions to the sink.
///
/// A layer whose dataset is pending or failed is never touched: it simply
/// does not exist on the renderer side yet.
pub struct LayerRegistry<S: LayerSink> {
    sink: S,
    status: HashMap<LayerId, DatasetStatus>,
}

impl<S: LayerSink> LayerRegistry<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            status: LayerId::ALL
                .iter()
                .map(|&id| (id, DatasetStatus::Pending))
                .collect(),
        }
    }

    pub fn status(&self, layer: LayerId) -> DatasetStatus {
        self.status
            .get(&layer)
            .copied()
            .unwrap_or(DatasetStatus::Pending)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Record the outcome of loading a layer's dataset.
    ///
    /// Returns `true` when the layer became ready.
    pub fn record_load(&mut self, layer: LayerId, result: Result<usize, DataError>) -> bool {
        match result {
            Ok(records) => {
                debug!("Layer {} ready ({} records)", layer, records);
                self.status.insert(layer, DatasetStatus::Ready { records });
                true
            }
            Err(e) => {
                error!("Error loading data for {}: {}", layer, e);
                self.status.insert(layer, DatasetStatus::Failed);
                false
            }
        }
    }

    pub fn activate(&mut self, action: LayerAction) {
        for (layer, visible) in action.visibility() {
            match self.status(layer) {
                DatasetStatus::Ready { .. } => self.sink.set_layer_visible(layer, visible),
                status => debug!("Skipping {} ({:?})", layer, status),
            }
        }
    }
}
