//! OWS engine facade.
//!
//! Wires configuration loading, resource governance and style rendering into
//! the request flow a WMS/WMTS/WCS front end drives: plan the request, fetch
//! the bands the plan names, render, attach the plan's headers.

pub mod engine;
pub mod request;

pub use engine::OwsEngine;
pub use request::{CoveragePlan, CoverageRequest, MapPlan, MapRequest};
