//! Response header assembly.

use crate::cache::CacheDirective;
use std::collections::BTreeMap;

pub const CACHE_CONTROL: &str = "Cache-Control";

/// Configured global headers plus `Cache-Control` for `directive`.
///
/// A directive replaces any `Cache-Control` set globally. Without a
/// directive the global headers pass through untouched.
pub fn response_headers(
    global: &BTreeMap<String, String>,
    directive: Option<CacheDirective>,
) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = global
        .iter()
        .filter(|(name, _)| directive.is_none() || !name.eq_ignore_ascii_case(CACHE_CONTROL))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if let Some(directive) = directive {
        headers.push((CACHE_CONTROL.to_string(), directive.header_value()));
    }
    headers
}
