//! Typed requests and plans exchanged with the protocol layer.

use governance::Governance;
use serde::{Deserialize, Serialize};

/// A WMS GetMap or WMTS GetTile request, reduced to what governance needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    pub layer: String,
    /// Falls back to the layer's default style.
    #[serde(default)]
    pub style: Option<String>,
    pub zoom_factor: f64,
    /// Datasets matched for the requested extent and time.
    pub dataset_count: u32,
    /// Arrived through WMTS rather than WMS.
    #[serde(default)]
    pub tiled: bool,
}

impl MapRequest {
    pub fn new(layer: impl Into<String>, zoom_factor: f64, dataset_count: u32) -> Self {
        Self {
            layer: layer.into(),
            style: None,
            zoom_factor,
            dataset_count,
            tiled: false,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn tiled(mut self) -> Self {
        self.tiled = true;
        self
    }
}

/// What to do for a map request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPlan {
    pub layer: String,
    pub style: String,
    /// Product the data is read from.
    pub product: String,
    pub governance: Governance,
    pub headers: Vec<(String, String)>,
    /// Canonical bands to fetch; empty unless the decision is to render.
    pub bands: Vec<String>,
}

/// A WCS GetCoverage request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRequest {
    pub layer: String,
    pub dataset_count: u32,
}

/// What to do for a coverage request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePlan {
    pub layer: String,
    pub product: String,
    pub governance: Governance,
    pub headers: Vec<(String, String)>,
    /// Every canonical band of the layer; empty unless the decision is to render.
    pub bands: Vec<String>,
}
