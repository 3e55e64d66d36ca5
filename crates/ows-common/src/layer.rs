//! Layer definitions and the folder tree they are published in.

use crate::bands::BandAliasMap;
use crate::error::ConfigError;
use crate::limits::ResourceLimits;
use crate::style::StyleDefinition;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node of the published layer tree: either a folder or a named layer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayerNode {
    Layer(Box<LayerConfig>),
    Folder(LayerFolder),
}

// Nodes with `layers` and no `bands` are folders. Dispatching on that keeps
// parse errors pointing at the real problem instead of "no variant matched".
impl<'de> Deserialize<'de> for LayerNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_folder = value.get("bands").is_none() && value.get("layers").is_some();
        if is_folder {
            serde_json::from_value(value)
                .map(LayerNode::Folder)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(|layer| LayerNode::Layer(Box::new(layer)))
                .map_err(de::Error::custom)
        }
    }
}

/// A titled grouping of layers with no data of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerFolder {
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub layers: Vec<LayerNode>,
}

/// A named layer backed by one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Product the layer reads from; defaults to the layer name.
    #[serde(default)]
    pub product_name: Option<String>,

    /// Pre-rendered low resolution products substituted when over limits.
    #[serde(default)]
    pub low_res_product_names: Vec<String>,

    pub bands: BandAliasMap,

    #[serde(default)]
    pub resource_limits: ResourceLimits,

    #[serde(default)]
    pub native_crs: Option<String>,

    #[serde(default)]
    pub native_resolution: Option<[f64; 2]>,

    pub styling: StylingConfig,
}

/// Styles published for a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylingConfig {
    /// Falls back to the first style when omitted.
    #[serde(default)]
    pub default_style: Option<String>,
    pub styles: Vec<StyleDefinition>,
}

impl LayerConfig {
    pub fn product_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.name)
    }

    /// The low resolution product to substitute, if any is configured.
    pub fn summary_product(&self) -> Option<&str> {
        self.low_res_product_names.first().map(String::as_str)
    }

    pub fn style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styling.styles.iter().find(|s| s.name == name)
    }

    pub fn default_style_name(&self) -> Option<&str> {
        self.styling
            .default_style
            .as_deref()
            .or_else(|| self.styling.styles.first().map(|s| s.name.as_str()))
    }

    /// Validate the layer and everything it owns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bands.validate(&self.name)?;
        self.resource_limits.validate()?;

        if self.styling.styles.is_empty() {
            return Err(ConfigError::NoStyles(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for style in &self.styling.styles {
            if !seen.insert(style.name.as_str()) {
                return Err(ConfigError::DuplicateStyle {
                    layer: self.name.clone(),
                    style: style.name.clone(),
                });
            }
            style.validate()?;
            if let Some(band) = style
                .declared_bands()
                .into_iter()
                .find(|band| self.bands.canonical_for(band).is_none())
            {
                return Err(ConfigError::UndeclaredBand {
                    layer: self.name.clone(),
                    style: style.name.clone(),
                    band: band.to_string(),
                });
            }
        }

        if let Some(default) = &self.styling.default_style {
            if self.style(default).is_none() {
                return Err(ConfigError::DefaultStyleNotFound {
                    layer: self.name.clone(),
                    style: default.clone(),
                });
            }
        }
        Ok(())
    }
}

impl LayerNode {
    /// Depth-first walk over the named layers below this node.
    pub fn collect_layers<'a>(&'a self, out: &mut Vec<&'a LayerConfig>) {
        match self {
            LayerNode::Layer(layer) => out.push(layer.as_ref()),
            LayerNode::Folder(folder) => {
                for child in &folder.layers {
                    child.collect_layers(out);
                }
            }
        }
    }
}
