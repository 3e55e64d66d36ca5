//! Root service configuration and loading.
//!
//! The configuration is read once at startup from YAML or JSON and is never
//! mutated afterwards. Reusable fragments (band maps, resource limits,
//! styles) are shared in YAML through anchors and aliases.

use crate::error::ConfigError;
use crate::layer::{LayerConfig, LayerNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// Root configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwsConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub layers: Vec<LayerNode>,
}

/// Settings that apply to every layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub title: String,

    /// Headers added to every response (e.g. CORS).
    #[serde(default)]
    pub response_headers: BTreeMap<String, String>,

    #[serde(default)]
    pub services: ServicesConfig,
}

/// Which OGC services are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_true")]
    pub wms: bool,
    #[serde(default = "default_true")]
    pub wmts: bool,
    #[serde(default = "default_true")]
    pub wcs: bool,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            wms: true,
            wmts: true,
            wcs: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl OwsConfig {
    /// Load configuration from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content)?,
            "json" => Self::from_json(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        info!(
            path = %path.display(),
            layers = config.layers().len(),
            "Loaded OWS configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// All named layers, depth first through the folder tree.
    pub fn layers(&self) -> Vec<&LayerConfig> {
        let mut out = Vec::new();
        for node in &self.layers {
            node.collect_layers(&mut out);
        }
        out
    }

    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers().into_iter().find(|l| l.name == name)
    }

    /// Validate every layer. Layer names must be unique across the tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for layer in self.layers() {
            if !names.insert(layer.name.as_str()) {
                return Err(ConfigError::DuplicateLayer(layer.name.clone()));
            }
            layer.validate()?;
        }
        Ok(())
    }
}
