//! Cache rule evaluation.
//!
//! Maps the number of datasets a request touched to a cache directive using
//! the service's `dataset_cache_rules` table. Rule `i` covers the half-open
//! bucket `[rules[i].min_datasets, rules[i + 1].min_datasets)`; the last
//! rule is unbounded above.

use ows_common::CacheRule;
use serde::Serialize;
use std::fmt;

/// What the `Cache-Control` header should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDirective {
    NoCache,
    /// Seconds.
    MaxAge(u32),
}

impl CacheDirective {
    /// `Cache-Control` header value.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheDirective::NoCache => f.write_str("no-cache"),
            CacheDirective::MaxAge(seconds) => write!(f, "max-age={}", seconds),
        }
    }
}

/// Pick the cache directive for `dataset_count`.
///
/// - `rules` absent: `None`, no header is emitted at all.
/// - empty table, zero datasets, or a count below the first threshold:
///   `NoCache`.
/// - otherwise the `max_age` of the last rule whose `min_datasets` is at
///   most `dataset_count`.
///
/// `rules` must be sorted ascending by `min_datasets`; configuration
/// validation guarantees this.
pub fn cache_directive(rules: Option<&[CacheRule]>, dataset_count: u32) -> Option<CacheDirective> {
    let rules = rules?;
    if dataset_count == 0 {
        return Some(CacheDirective::NoCache);
    }
    let matched = rules.partition_point(|rule| rule.min_datasets <= dataset_count);
    Some(match matched {
        0 => CacheDirective::NoCache,
        n => CacheDirective::MaxAge(rules[n - 1].max_age),
    })
}
