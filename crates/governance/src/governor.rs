//! Per-request governance: the limit decision and the cache directive.

use crate::cache::{cache_directive, CacheDirective};
use crate::decision::{decide, RenderDecision};
use crate::headers::response_headers;
use metrics::counter;
use ows_common::{GlobalConfig, LayerConfig, Service};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Inputs the protocol layer computes for a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernanceRequest {
    pub service: Service,
    /// Ignored for WCS.
    pub zoom_factor: f64,
    pub dataset_count: u32,
}

impl GovernanceRequest {
    pub fn wms(zoom_factor: f64, dataset_count: u32) -> Self {
        Self {
            service: Service::Wms,
            zoom_factor,
            dataset_count,
        }
    }

    pub fn wcs(dataset_count: u32) -> Self {
        Self {
            service: Service::Wcs,
            zoom_factor: f64::INFINITY,
            dataset_count,
        }
    }
}

/// Outcome of governing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Governance {
    pub decision: RenderDecision,
    /// `None` when the service has no cache rule table.
    pub cache_directive: Option<CacheDirective>,
}

/// Applies layer resource limits and cache rules to requests.
#[derive(Debug, Clone, Default)]
pub struct Governor {
    global_headers: BTreeMap<String, String>,
}

impl Governor {
    pub fn new(global_headers: BTreeMap<String, String>) -> Self {
        Self { global_headers }
    }

    pub fn from_config(global: &GlobalConfig) -> Self {
        Self::new(global.response_headers.clone())
    }

    pub fn evaluate(&self, layer: &LayerConfig, request: &GovernanceRequest) -> Governance {
        let limits = layer.resource_limits.for_service(request.service);
        let decision = decide(
            limits,
            request.service,
            request.zoom_factor,
            request.dataset_count,
            layer.summary_product(),
        );
        // over-limit placeholders are never cached
        let cache_directive = if decision.is_render() {
            cache_directive(limits.cache_rules(), request.dataset_count)
        } else {
            limits.cache_rules().map(|_| CacheDirective::NoCache)
        };

        counter!(
            "ows_render_decisions_total",
            "service" => request.service.as_str(),
            "decision" => decision.label()
        )
        .increment(1);
        debug!(
            layer = %layer.name,
            service = %request.service,
            zoom_factor = request.zoom_factor,
            dataset_count = request.dataset_count,
            decision = decision.label(),
            cache = ?cache_directive,
            "Governance decision"
        );

        Governance {
            decision,
            cache_directive,
        }
    }

    /// Headers to attach to the response for `governance`.
    pub fn headers(&self, governance: &Governance) -> Vec<(String, String)> {
        response_headers(&self.global_headers, governance.cache_directive)
    }
}
