//! Compiled styles for every layer of a configuration.

use crate::index::IndexRegistry;
use crate::style::CompiledStyle;
use ows_common::{BandAliasMap, ConfigError, LayerConfig, OwsConfig, OwsError};
use std::collections::HashMap;
use tracing::info;

/// The compiled styles of one layer plus the aliases they resolve through.
#[derive(Debug, Clone)]
pub struct LayerStyles {
    aliases: BandAliasMap,
    default_style: String,
    styles: Vec<CompiledStyle>,
}

impl LayerStyles {
    pub fn compile(layer: &LayerConfig, registry: &IndexRegistry) -> Result<Self, ConfigError> {
        let styles = layer
            .styling
            .styles
            .iter()
            .map(|def| CompiledStyle::compile(&layer.name, def, &layer.bands, registry))
            .collect::<Result<Vec<_>, _>>()?;
        let default_style = layer
            .default_style_name()
            .ok_or_else(|| ConfigError::NoStyles(layer.name.clone()))?
            .to_string();

        Ok(Self {
            aliases: layer.bands.clone(),
            default_style,
            styles,
        })
    }

    pub fn aliases(&self) -> &BandAliasMap {
        &self.aliases
    }

    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    pub fn styles(&self) -> &[CompiledStyle] {
        &self.styles
    }

    /// A style by name, or the default style when `name` is `None` or empty.
    pub fn style(&self, name: Option<&str>) -> Option<&CompiledStyle> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => self.default_style.as_str(),
        };
        self.styles.iter().find(|s| s.name() == name)
    }
}

/// Style catalog keyed by layer name. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    layers: HashMap<String, LayerStyles>,
}

impl StyleCatalog {
    /// Validate `config` and compile every style of every layer.
    pub fn compile(config: &OwsConfig, registry: &IndexRegistry) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut layers = HashMap::new();
        let mut style_count = 0;
        for layer in config.layers() {
            let compiled = LayerStyles::compile(layer, registry)?;
            style_count += compiled.styles.len();
            layers.insert(layer.name.clone(), compiled);
        }

        info!(
            layers = layers.len(),
            styles = style_count,
            "Compiled style catalog"
        );
        Ok(Self { layers })
    }

    pub fn layer(&self, name: &str) -> Option<&LayerStyles> {
        self.layers.get(name)
    }

    /// Look up a layer's style, falling back to the layer default.
    pub fn style(&self, layer: &str, style: Option<&str>) -> Result<&CompiledStyle, OwsError> {
        let styles = self
            .layer(layer)
            .ok_or_else(|| OwsError::LayerNotFound(layer.to_string()))?;
        styles.style(style).ok_or_else(|| OwsError::StyleNotFound {
            layer: layer.to_string(),
            style: style.unwrap_or_default().to_string(),
        })
    }

    /// Layer names, sorted.
    pub fn layer_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.layers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
