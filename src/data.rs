//! Visualization datasets: photo points and daily trajectory arcs.
//!
//! Only the record counts matter to the synchronization engine; the records
//! themselves are handed to the GPU layer renderer.

use crate::error::DataError;
use crate::types::LngLat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoPoint {
    pub coordinates: LngLat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryArc {
    pub source: LngLat,
    pub destination: LngLat,
}

pub fn load_photo_points(path: impl AsRef<Path>) -> Result<Vec<PhotoPoint>, DataError> {
    load_json(path.as_ref())
}

pub fn load_trajectory_arcs(path: impl AsRef<Path>) -> Result<Vec<TrajectoryArc>, DataError> {
    load_json(path.as_ref())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
