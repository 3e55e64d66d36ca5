//! Resource governance and cache control for OWS requests.
//!
//! Decides per request whether to render the requested data, substitute a
//! low resolution summary product, or paint an indicative polygon, and which
//! `Cache-Control` directive the response carries.

pub mod cache;
pub mod decision;
pub mod governor;
pub mod headers;

pub use cache::{cache_directive, CacheDirective};
pub use decision::{decide, is_over_limit, RenderDecision};
pub use governor::{Governance, GovernanceRequest, Governor};
pub use headers::{response_headers, CACHE_CONTROL};
