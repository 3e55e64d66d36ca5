//! The engine facade: governance first, then rendering.

use crate::request::{CoveragePlan, CoverageRequest, MapPlan, MapRequest};
use governance::{Governance, GovernanceRequest, Governor};
use ows_common::{LayerConfig, OwsConfig, OwsError, OwsResult, RenderError};
use renderer::{legend_for, DatasetBands, IndexRegistry, Legend, RgbaTile, StyleCatalog};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

struct Inner {
    config: OwsConfig,
    catalog: StyleCatalog,
    governor: Governor,
}

/// Validated configuration, compiled styles and the governor.
///
/// Immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct OwsEngine {
    inner: Arc<Inner>,
}

impl OwsEngine {
    /// Validate `config` and compile its styles with the built-in functions.
    pub fn from_config(config: OwsConfig) -> OwsResult<Self> {
        Self::with_registry(config, &IndexRegistry::builtin())
    }

    /// Like [`from_config`](Self::from_config) with a custom function registry.
    pub fn with_registry(config: OwsConfig, registry: &IndexRegistry) -> OwsResult<Self> {
        let catalog = StyleCatalog::compile(&config, registry)?;
        let governor = Governor::from_config(&config.global);
        info!(
            title = %config.global.title,
            layers = catalog.len(),
            "OWS engine ready"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                catalog,
                governor,
            }),
        })
    }

    /// Load a YAML or JSON configuration file and build the engine.
    pub fn from_file(path: impl AsRef<Path>) -> OwsResult<Self> {
        Self::from_config(OwsConfig::from_file(path)?)
    }

    pub fn config(&self) -> &OwsConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.inner.catalog
    }

    fn layer(&self, name: &str) -> OwsResult<&LayerConfig> {
        self.inner
            .config
            .layer(name)
            .ok_or_else(|| OwsError::LayerNotFound(name.to_string()))
    }

    /// Decide how to serve a map request and what to fetch for it.
    pub fn plan(&self, request: &MapRequest) -> OwsResult<MapPlan> {
        let services = &self.inner.config.global.services;
        if request.tiled && !services.wmts {
            return Err(OwsError::ServiceDisabled("WMTS".to_string()));
        }
        if !request.tiled && !services.wms {
            return Err(OwsError::ServiceDisabled("WMS".to_string()));
        }

        let layer = self.layer(&request.layer)?;
        let style = self
            .inner
            .catalog
            .style(&layer.name, request.style.as_deref())?;

        let governance = self.inner.governor.evaluate(
            layer,
            &GovernanceRequest::wms(request.zoom_factor, request.dataset_count),
        );
        let bands = if governance.decision.is_render() {
            style.needed_bands().to_vec()
        } else {
            Vec::new()
        };

        Ok(MapPlan {
            layer: layer.name.clone(),
            style: style.name().to_string(),
            product: layer.product_name().to_string(),
            headers: self.inner.governor.headers(&governance),
            governance,
            bands,
        })
    }

    /// Decide how to serve a coverage request.
    pub fn coverage_plan(&self, request: &CoverageRequest) -> OwsResult<CoveragePlan> {
        if !self.inner.config.global.services.wcs {
            return Err(OwsError::ServiceDisabled("WCS".to_string()));
        }
        let layer = self.layer(&request.layer)?;
        let governance = self
            .inner
            .governor
            .evaluate(layer, &GovernanceRequest::wcs(request.dataset_count));
        let bands = if governance.decision.is_render() {
            layer.bands.canonical_names().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        Ok(CoveragePlan {
            layer: layer.name.clone(),
            product: layer.product_name().to_string(),
            headers: self.inner.governor.headers(&governance),
            governance,
            bands,
        })
    }

    /// Response headers for an already evaluated decision.
    pub fn headers(&self, governance: &Governance) -> Vec<(String, String)> {
        self.inner.governor.headers(governance)
    }

    /// Render a tile on the blocking pool.
    pub async fn render_tile(
        &self,
        layer: &str,
        style: Option<&str>,
        data: DatasetBands,
    ) -> OwsResult<RgbaTile> {
        // fail fast on unknown names before handing off
        self.inner.catalog.style(layer, style)?;

        let engine = self.clone();
        let layer = layer.to_string();
        let style = style.map(str::to_string);
        tokio::task::spawn_blocking(move || engine.render_tile_blocking(&layer, style.as_deref(), &data))
            .await
            .map_err(|e| OwsError::Internal(format!("render task failed: {}", e)))?
    }

    /// Render a tile on the current thread.
    pub fn render_tile_blocking(
        &self,
        layer: &str,
        style: Option<&str>,
        data: &DatasetBands,
    ) -> OwsResult<RgbaTile> {
        let styles = self
            .inner
            .catalog
            .layer(layer)
            .ok_or_else(|| OwsError::LayerNotFound(layer.to_string()))?;
        let compiled = self.inner.catalog.style(layer, style)?;

        compiled.render(styles.aliases(), data).map_err(|e| {
            if let RenderError::MissingBand { source, .. } = &e {
                warn!(
                    layer,
                    style = compiled.name(),
                    band = %source.band,
                    tried = ?source.tried,
                    "Band resolution failed"
                );
            }
            OwsError::Render(e)
        })
    }

    /// The legend of a layer's style (default style when `None`).
    pub fn legend(&self, layer: &str, style: Option<&str>) -> OwsResult<Option<Legend>> {
        Ok(legend_for(self.inner.catalog.style(layer, style)?)?)
    }
}

impl std::fmt::Debug for OwsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwsEngine")
            .field("layers", &self.inner.catalog.layer_names())
            .finish()
    }
}
