//! Resource limit decisions.

use ows_common::{Rgba, Service, ServiceLimits};
use serde::Serialize;

/// How a request is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RenderDecision {
    /// Render the requested datasets.
    Render,
    /// Serve the pre-rendered low resolution product instead.
    SummaryProduct { product: String },
    /// Paint the data footprint in a flat colour.
    IndicativePolygon { fill: Rgba },
}

impl RenderDecision {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RenderDecision::Render => "render",
            RenderDecision::SummaryProduct { .. } => "summary_product",
            RenderDecision::IndicativePolygon { .. } => "indicative_polygon",
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, RenderDecision::Render)
    }
}

/// Whether a request exceeds the service's limits.
///
/// WCS has no zoom axis, so only the dataset count applies there. A zoom
/// factor that is not finite counts as zoomed out.
pub fn is_over_limit(
    limits: &ServiceLimits,
    service: Service,
    zoom_factor: f64,
    dataset_count: u32,
) -> bool {
    let zoomed_out = service.has_zoom_axis()
        && (!zoom_factor.is_finite() || zoom_factor < limits.min_zoom_factor);
    let too_many = limits.max_datasets > 0 && dataset_count > limits.max_datasets;
    zoomed_out || too_many
}

/// Choose between rendering, a summary product and an indicative polygon.
pub fn decide(
    limits: &ServiceLimits,
    service: Service,
    zoom_factor: f64,
    dataset_count: u32,
    summary_product: Option<&str>,
) -> RenderDecision {
    if !is_over_limit(limits, service, zoom_factor, dataset_count) {
        return RenderDecision::Render;
    }
    match summary_product {
        Some(product) => RenderDecision::SummaryProduct {
            product: product.to_string(),
        },
        None => RenderDecision::IndicativePolygon {
            fill: limits.zoomed_out_fill_colour,
        },
    }
}
