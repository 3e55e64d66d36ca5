//! Tests for the index function registry, including custom functions.

use ows_common::OwsConfig;
use renderer::{
    DatasetBands, IndexError, IndexFunction, IndexParams, IndexRegistry, ParamSpec, PixelBands,
    StyleCatalog,
};
use test_utils::fixtures::MINIMAL_CONFIG_YAML;

/// Enhanced vegetation index-like function with a tunable soil factor.
struct SoilAdjusted;

impl IndexFunction for SoilAdjusted {
    fn name(&self) -> &'static str {
        "soil_adjusted"
    }

    fn params(&self) -> &'static [ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::band("nir"),
            ParamSpec::band("red"),
            ParamSpec::number_or("l", 0.5),
        ];
        PARAMS
    }

    fn evaluate(&self, bands: &PixelBands<'_>, params: &IndexParams) -> Result<f64, IndexError> {
        let nir = bands.value(params.band(0)?)?;
        let red = bands.value(params.band(1)?)?;
        let l = params.number(0)?;
        if nir < 0.0 || red < 0.0 {
            return Err(IndexError::Invalid("negative reflectance".to_string()));
        }
        Ok((nir - red) / (nir + red + l) * (1.0 + l))
    }
}

fn soil_adjusted_config() -> OwsConfig {
    let yaml = MINIMAL_CONFIG_YAML.replace(
        "                function: norm_diff\n                kwargs: { band1: nir, band2: red }",
        "                function: indices.soil_adjusted\n                args: [nir, red]\n                kwargs: { l: 1.0 }",
    );
    OwsConfig::from_yaml(&yaml).unwrap()
}

fn data(red: f32, nir: f32) -> DatasetBands {
    DatasetBands::new(1, 1)
        .with_band("B04", vec![red])
        .unwrap()
        .with_band("B08", vec![nir])
        .unwrap()
}

#[test]
fn test_builtin_registry_rejects_unregistered() {
    let err = StyleCatalog::compile(&soil_adjusted_config(), &IndexRegistry::builtin()).unwrap_err();
    assert!(err.to_string().contains("indices.soil_adjusted"));
}

#[test]
fn test_registered_function_renders() {
    let mut registry = IndexRegistry::builtin();
    registry.register(SoilAdjusted);
    let catalog = StyleCatalog::compile(&soil_adjusted_config(), &registry).unwrap();
    let layer = catalog.layer("optical").unwrap();
    let style = layer.style(Some("ndvi")).unwrap();

    // (3 - 1) / (3 + 1 + 1) * 2 = 0.8 -> 80% of the way from white to green
    let tile = style.render(layer.aliases(), &data(1.0, 3.0)).unwrap();
    assert_eq!(tile.pixel(0, 0), [51, 255, 51, 255]);
}

#[test]
fn test_function_error_fails_tile() {
    let mut registry = IndexRegistry::builtin();
    registry.register(SoilAdjusted);
    let catalog = StyleCatalog::compile(&soil_adjusted_config(), &registry).unwrap();
    let layer = catalog.layer("optical").unwrap();
    let style = layer.style(Some("ndvi")).unwrap();

    let err = style.render(layer.aliases(), &data(-1.0, 3.0)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("soil_adjusted"));
    assert!(message.contains("negative reflectance"));
}

#[test]
fn test_builtin_names() {
    assert_eq!(
        IndexRegistry::builtin().names(),
        vec![
            "band_quotient",
            "constant",
            "delta_bands",
            "norm_diff",
            "scaled_band",
            "single_band",
            "sum_bands",
        ]
    );
}
