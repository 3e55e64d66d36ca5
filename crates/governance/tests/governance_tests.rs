//! Governance over the shared fixture configuration.

use governance::{
    cache_directive, decide, is_over_limit, CacheDirective, GovernanceRequest, Governor,
    RenderDecision,
};
use ows_common::{CacheRule, OwsConfig, Rgba, Service, ServiceLimits};
use test_utils::fixtures::MINIMAL_CONFIG_YAML;

fn config() -> OwsConfig {
    let config = OwsConfig::from_yaml(MINIMAL_CONFIG_YAML).unwrap();
    config.validate().unwrap();
    config
}

// ============================================================================
// Layer-level evaluation
// ============================================================================

#[test]
fn test_optical_wms() {
    let config = config();
    let governor = Governor::from_config(&config.global);
    let layer = config.layer("optical").unwrap();

    let g = governor.evaluate(layer, &GovernanceRequest::wms(600.0, 5));
    assert_eq!(g.decision, RenderDecision::Render);
    assert_eq!(g.cache_directive, Some(CacheDirective::MaxAge(86400)));

    // zoomed out, no summary product configured
    let g = governor.evaluate(layer, &GovernanceRequest::wms(300.0, 5));
    assert_eq!(
        g.decision,
        RenderDecision::IndicativePolygon {
            fill: Rgba::new(150, 180, 200, 160)
        }
    );

    // too many datasets
    let g = governor.evaluate(layer, &GovernanceRequest::wms(600.0, 11));
    assert!(!g.decision.is_render());
    assert_eq!(g.cache_directive, Some(CacheDirective::NoCache));
}

#[test]
fn test_over_limit_responses_are_not_cached() {
    let config = config();
    let governor = Governor::from_config(&config.global);
    let layer = config.layer("optical").unwrap();

    // the 8+ bucket would give a week, but the placeholder must not be cached
    let g = governor.evaluate(layer, &GovernanceRequest::wms(600.0, 11));
    assert!(matches!(g.decision, RenderDecision::IndicativePolygon { .. }));
    assert_eq!(g.cache_directive, Some(CacheDirective::NoCache));
    assert!(governor
        .headers(&g)
        .contains(&("Cache-Control".to_string(), "no-cache".to_string())));

    // zoomed out with a rendering-sized dataset count
    let g = governor.evaluate(layer, &GovernanceRequest::wms(300.0, 5));
    assert_eq!(g.cache_directive, Some(CacheDirective::NoCache));

    // at the limit still renders and uses the buckets
    let g = governor.evaluate(layer, &GovernanceRequest::wms(600.0, 10));
    assert_eq!(g.decision, RenderDecision::Render);
    assert_eq!(g.cache_directive, Some(CacheDirective::MaxAge(604800)));

    // no rule table means no header even when over the limit
    let g = governor.evaluate(layer, &GovernanceRequest::wcs(21));
    assert!(!g.decision.is_render());
    assert_eq!(g.cache_directive, None);
}

#[test]
fn test_optical_wcs_has_no_cache_header() {
    let config = config();
    let governor = Governor::from_config(&config.global);
    let layer = config.layer("optical").unwrap();

    let g = governor.evaluate(layer, &GovernanceRequest::wcs(20));
    assert_eq!(g.decision, RenderDecision::Render);
    assert_eq!(g.cache_directive, None);
    assert_eq!(
        governor.headers(&g),
        vec![("Access-Control-Allow-Origin".to_string(), "*".to_string())]
    );

    let g = governor.evaluate(layer, &GovernanceRequest::wcs(21));
    assert!(matches!(g.decision, RenderDecision::IndicativePolygon { .. }));
}

#[test]
fn test_seasonal_summary_and_empty_rules() {
    let config = config();
    let governor = Governor::from_config(&config.global);
    let layer = config.layer("seasonal").unwrap();

    let g = governor.evaluate(layer, &GovernanceRequest::wms(100.0, 50));
    assert_eq!(
        g.decision,
        RenderDecision::SummaryProduct {
            product: "seasonal_summary".to_string()
        }
    );
    assert_eq!(g.cache_directive, Some(CacheDirective::NoCache));
    assert!(governor
        .headers(&g)
        .contains(&("Cache-Control".to_string(), "no-cache".to_string())));
}

#[test]
fn test_governance_serializes() {
    let config = config();
    let governor = Governor::default();
    let layer = config.layer("seasonal").unwrap();
    let g = governor.evaluate(layer, &GovernanceRequest::wms(100.0, 1));
    let json = serde_json::to_value(&g).unwrap();
    assert_eq!(json["decision"]["decision"], "summary_product");
    assert_eq!(json["decision"]["product"], "seasonal_summary");
    assert_eq!(json["cache_directive"], "no_cache");
}

// ============================================================================
// Properties
// ============================================================================

fn sample_rules() -> Vec<CacheRule> {
    vec![
        CacheRule::new(4, 86400),
        CacheRule::new(8, 604800),
        CacheRule::new(100, 3600),
    ]
}

#[test]
fn test_cache_directive_is_bucket_lookup() {
    let rules = sample_rules();
    for count in 0..200u32 {
        let expected = if count == 0 {
            CacheDirective::NoCache
        } else {
            rules
                .iter()
                .rev()
                .find(|r| r.min_datasets <= count)
                .map(|r| CacheDirective::MaxAge(r.max_age))
                .unwrap_or(CacheDirective::NoCache)
        };
        assert_eq!(cache_directive(Some(&rules), count), Some(expected), "count {count}");
    }
}

#[test]
fn test_decision_monotonic_in_dataset_count() {
    let limits = ServiceLimits {
        min_zoom_factor: 500.0,
        max_datasets: 10,
        ..Default::default()
    };
    for zoom in [100.0, 499.9, 500.0, 1000.0] {
        let mut seen_over = false;
        for count in 0..50 {
            let over = is_over_limit(&limits, Service::Wms, zoom, count);
            assert!(!(seen_over && !over), "zoom {zoom} count {count}");
            seen_over |= over;
        }
    }
}

#[test]
fn test_decision_monotonic_in_zoom() {
    let limits = ServiceLimits {
        min_zoom_factor: 500.0,
        max_datasets: 10,
        ..Default::default()
    };
    for count in [0, 5, 10, 11] {
        let mut seen_over = false;
        // walking from zoomed in to zoomed out
        for step in (0..=100).rev() {
            let zoom = step as f64 * 10.0;
            let decision = decide(&limits, Service::Wms, zoom, count, None);
            let over = !decision.is_render();
            assert!(!(seen_over && !over), "zoom {zoom} count {count}");
            seen_over |= over;
        }
    }
}
