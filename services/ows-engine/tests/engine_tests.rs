//! End-to-end tests of the engine facade.

use governance::{CacheDirective, RenderDecision};
use ows_common::{OwsConfig, OwsError};
use ows_engine::{CoverageRequest, MapRequest, OwsEngine};
use renderer::{DatasetBands, Legend};
use test_utils::fixtures::MINIMAL_CONFIG_YAML;
use test_utils::{constant_band, example_config_path, write_temp_config};

fn engine() -> OwsEngine {
    OwsEngine::from_config(OwsConfig::from_yaml(MINIMAL_CONFIG_YAML).unwrap()).unwrap()
}

fn optical_bands(red: f32, nir: f32) -> DatasetBands {
    DatasetBands::new(2, 2)
        .with_band("B04", constant_band(2, 2, red))
        .unwrap()
        .with_band("B08", constant_band(2, 2, nir))
        .unwrap()
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_plan_render_lists_bands_to_fetch() {
    let plan = engine()
        .plan(&MapRequest::new("optical", 800.0, 4).with_style("ndvi"))
        .unwrap();
    assert_eq!(plan.style, "ndvi");
    assert_eq!(plan.product, "optical");
    assert_eq!(plan.governance.decision, RenderDecision::Render);
    assert_eq!(plan.bands, vec!["nir", "red"]);
    assert!(plan
        .headers
        .contains(&("Cache-Control".to_string(), "max-age=86400".to_string())));
}

#[test]
fn test_plan_over_limit_fetches_nothing() {
    let plan = engine().plan(&MapRequest::new("optical", 100.0, 4)).unwrap();
    assert_eq!(plan.style, "rgb");
    assert!(matches!(
        plan.governance.decision,
        RenderDecision::IndicativePolygon { .. }
    ));
    assert!(plan.bands.is_empty());
}

#[test]
fn test_plan_summary_product() {
    let plan = engine().plan(&MapRequest::new("seasonal", 1.0, 0)).unwrap();
    assert_eq!(
        plan.governance.decision,
        RenderDecision::SummaryProduct {
            product: "seasonal_summary".to_string()
        }
    );
    assert_eq!(plan.governance.cache_directive, Some(CacheDirective::NoCache));
}

#[test]
fn test_plan_unknown_names() {
    let engine = engine();
    let err = engine.plan(&MapRequest::new("nope", 800.0, 1)).unwrap_err();
    assert_eq!(err.exception_code(), "LayerNotDefined");

    let err = engine
        .plan(&MapRequest::new("optical", 800.0, 1).with_style("nope"))
        .unwrap_err();
    assert_eq!(err.exception_code(), "StyleNotDefined");
}

#[test]
fn test_disabled_services() {
    let yaml = MINIMAL_CONFIG_YAML.replace(
        "  title: Test service\n",
        "  title: Test service\n  services:\n    wms: true\n    wmts: false\n    wcs: false\n",
    );
    let engine = OwsEngine::from_config(OwsConfig::from_yaml(&yaml).unwrap()).unwrap();

    assert!(engine.plan(&MapRequest::new("optical", 800.0, 1)).is_ok());
    assert!(matches!(
        engine.plan(&MapRequest::new("optical", 800.0, 1).tiled()),
        Err(OwsError::ServiceDisabled(_))
    ));
    let err = engine
        .coverage_plan(&CoverageRequest {
            layer: "optical".to_string(),
            dataset_count: 1,
        })
        .unwrap_err();
    assert_eq!(err.http_status_code(), 400);
}

#[test]
fn test_coverage_plan() {
    let engine = engine();
    let plan = engine
        .coverage_plan(&CoverageRequest {
            layer: "optical".to_string(),
            dataset_count: 3,
        })
        .unwrap();
    assert_eq!(plan.governance.decision, RenderDecision::Render);
    assert_eq!(plan.governance.cache_directive, None);
    assert_eq!(plan.bands, vec!["blue", "green", "nir", "red"]);

    let plan = engine
        .coverage_plan(&CoverageRequest {
            layer: "optical".to_string(),
            dataset_count: 21,
        })
        .unwrap();
    assert!(plan.bands.is_empty());
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_render_tile_async() {
    let engine = engine();
    let tile = engine
        .render_tile("optical", Some("ndvi"), optical_bands(1.0, 1.0))
        .await
        .unwrap();
    assert_eq!(tile.pixel(1, 1), [255, 255, 255, 255]);
    let png = tile.to_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[tokio::test]
async fn test_render_missing_band_is_render_error() {
    let engine = engine();
    let data = DatasetBands::new(1, 1).with_band("B04", vec![1.0]).unwrap();
    let err = engine
        .render_tile("optical", Some("ndvi"), data)
        .await
        .unwrap_err();
    assert!(matches!(err, OwsError::Render(_)));
    assert_eq!(err.http_status_code(), 500);
}

#[tokio::test]
async fn test_concurrent_renders_share_engine() {
    let engine = engine();
    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let nir = i as f32;
            engine
                .render_tile("optical", Some("ndvi"), optical_bands(1.0, nir + 1.0))
                .await
        }));
    }
    for handle in handles {
        let tile = handle.await.unwrap().unwrap();
        assert_eq!(tile.width, 2);
    }
}

#[test]
fn test_render_blocking_in_test_runtime() {
    let engine = engine();
    let tile = tokio_test::block_on(engine.render_tile(
        "seasonal",
        None,
        DatasetBands::new(1, 1).with_band("mediannan", vec![50.0]).unwrap(),
    ))
    .unwrap();
    assert_eq!(tile.pixel(0, 0), [153, 79, 28, 255]);
}

// ============================================================================
// Legends and configuration files
// ============================================================================

#[test]
fn test_legend_lookup() {
    let engine = engine();
    assert!(engine.legend("optical", None).unwrap().is_none());
    assert!(matches!(
        engine.legend("optical", Some("ndvi")).unwrap(),
        Some(Legend::Generated(_))
    ));
    assert!(engine.legend("nope", None).is_err());
}

#[test]
fn test_example_config_builds() {
    let engine = OwsEngine::from_file(example_config_path()).unwrap();
    assert!(engine.catalog().layer("s2_l2a").is_some());
    assert!(matches!(
        engine.legend("s2_l2a", Some("simple_rgb")).unwrap(),
        Some(Legend::External { .. })
    ));
}

#[test]
fn test_from_file_reports_bad_config() {
    let file = write_temp_config("layers: [ { name: broken } ]", "yaml");
    let err = OwsEngine::from_file(file.path()).unwrap_err();
    assert!(matches!(err, OwsError::Config(_)));
}
