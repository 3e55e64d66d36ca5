//! Configuration fixtures shared across test suites.

/// A small two-layer configuration covering both style kinds and the three
/// cache-rule states (populated for WMS, empty for the second layer's WMS,
/// absent for WCS).
pub const MINIMAL_CONFIG_YAML: &str = r##"
global:
  title: Test service
  response_headers:
    Access-Control-Allow-Origin: "*"
layers:
  - title: Test folder
    layers:
      - name: optical
        bands:
          red: [band_04, red, B04]
          green: [band_03, green, B03]
          blue: [band_02, blue, B02]
          nir: [band_08, nir, B08]
        resource_limits:
          wms:
            min_zoom_factor: 500.0
            max_datasets: 10
            zoomed_out_fill_colour: [150, 180, 200, 160]
            dataset_cache_rules:
              - { min_datasets: 4, max_age: 86400 }
              - { min_datasets: 8, max_age: 604800 }
          wcs:
            max_datasets: 20
        styling:
          default_style: rgb
          styles:
            - name: rgb
              components:
                red: { red: 1.0 }
                green: { green: 1.0 }
                blue: { blue: 1.0 }
              scale_range: [0.0, 3000.0]
            - name: ndvi
              index_function:
                function: norm_diff
                kwargs: { band1: nir, band2: red }
              needed_bands: [nir, red]
              color_ramp:
                - { value: -1.0, color: "#FF0000" }
                - { value: 0.0, color: "#FFFFFF" }
                - { value: 1.0, color: "#00FF00" }
  - name: seasonal
    low_res_product_names: [seasonal_summary]
    bands:
      mediannan: [mediannan]
    resource_limits:
      wms:
        min_zoom_factor: 500.0
        dataset_cache_rules: []
    styling:
      styles:
        - name: seasonal_ndvi
          index_function:
            function: single_band
            kwargs: { band: mediannan }
          needed_bands: [mediannan]
          color_ramp:
            - { value: -0.0, color: "#8F3F20", alpha: 0.0 }
            - { value: 0.0, color: "#8F3F20", alpha: 1.0 }
            - { value: 100, color: "#A35F18" }
"##;

/// Control points of the seasonal NDVI ramp as `(value, hex colour, alpha)`.
pub const SEASONAL_NDVI_RAMP: &[(f64, &str, f64)] = &[
    (-0.0, "#8F3F20", 0.0),
    (0.0, "#8F3F20", 1.0),
    (100.0, "#A35F18", 1.0),
    (200.0, "#B88512", 1.0),
    (300.0, "#CEAC0E", 1.0),
    (400.0, "#E5D609", 1.0),
    (500.0, "#FFFF0C", 1.0),
    (600.0, "#C3DE09", 1.0),
    (700.0, "#88B808", 1.0),
    (800.0, "#529400", 1.0),
    (900.0, "#237100", 1.0),
    (1000.0, "#114D04", 1.0),
];
