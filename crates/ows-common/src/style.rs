//! Style configuration schema.
//!
//! A style is either a linear combination of bands mapped onto RGB(A)
//! channels, or an index function whose scalar output is pushed through a
//! colour ramp. Which one is decided by the fields present:
//!
//! ```yaml
//! - name: simple_rgb
//!   components:
//!     red: { red: 1.0 }
//!     green: { green: 1.0 }
//!     blue: { blue: 1.0 }
//!   scale_range: [0.0, 3000.0]
//!
//! - name: ndvi
//!   index_function:
//!     function: norm_diff
//!     kwargs: { band1: nir, band2: red }
//!   needed_bands: [nir, red]
//!   color_ramp:
//!     - { value: -1.0, color: "#000000", alpha: 0.0 }
//!     - { value: 1.0, color: "#00FF00" }
//! ```

use crate::color::Rgb;
use crate::error::ConfigError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named style as written in a layer's `styling.styles` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDefinition {
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    #[serde(flatten)]
    pub kind: StyleKind,

    #[serde(default)]
    pub legend: LegendConfig,

    #[serde(default)]
    pub include_in_feature_info: bool,
}

/// The two rendering paths a style can take.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StyleKind {
    Ramp(RampStyle),
    Linear(LinearStyle),
}

impl<'de> Deserialize<'de> for StyleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("index_function").is_some() || value.get("color_ramp").is_some() {
            serde_json::from_value(value)
                .map(StyleKind::Ramp)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(StyleKind::Linear)
                .map_err(de::Error::custom)
        }
    }
}

impl StyleDefinition {
    /// Every band this style reads, as declared in configuration.
    ///
    /// For ramp styles this is `needed_bands`; the index function's own
    /// band parameters are checked against it when the style is compiled.
    pub fn declared_bands(&self) -> BTreeSet<&str> {
        match &self.kind {
            StyleKind::Linear(linear) => linear.components.bands().collect(),
            StyleKind::Ramp(ramp) => ramp.needed_bands.iter().map(String::as_str).collect(),
        }
    }

    /// Whether a legend is published for this style.
    pub fn shows_legend(&self) -> bool {
        self.legend
            .show_legend
            .unwrap_or(matches!(self.kind, StyleKind::Ramp(_)))
    }

    /// Structural checks that need no knowledge of the layer or index registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.kind {
            StyleKind::Linear(linear) => linear.validate(&self.name),
            StyleKind::Ramp(ramp) => validate_color_ramp(&self.name, &ramp.color_ramp),
        }
    }
}

/// Band weights for one output channel.
pub type ChannelWeights = BTreeMap<String, f64>;

/// Per-channel band weights. A channel left out renders as 0 (alpha: opaque).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<ChannelWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<ChannelWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<ChannelWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<ChannelWeights>,
}

impl Components {
    /// Channels in output order: red, green, blue, alpha.
    pub fn channels(&self) -> [Option<&ChannelWeights>; 4] {
        [
            self.red.as_ref(),
            self.green.as_ref(),
            self.blue.as_ref(),
            self.alpha.as_ref(),
        ]
    }

    /// All bands referenced by any channel.
    pub fn bands(&self) -> impl Iterator<Item = &str> {
        self.channels()
            .into_iter()
            .flatten()
            .flat_map(|weights| weights.keys().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.channels().iter().all(Option::is_none)
    }
}

/// Input value range mapped onto 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ScaleRange {
    pub lo: f64,
    pub hi: f64,
}

impl ScaleRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Rescale `value` to 0..=255, clamping at the boundaries.
    pub fn to_byte(&self, value: f64) -> u8 {
        let scaled = (value - self.lo) / (self.hi - self.lo) * 255.0;
        scaled.clamp(0.0, 255.0).round() as u8
    }
}

impl From<[f64; 2]> for ScaleRange {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<ScaleRange> for [f64; 2] {
    fn from(r: ScaleRange) -> Self {
        [r.lo, r.hi]
    }
}

/// Linear band-combination style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearStyle {
    pub components: Components,
    pub scale_range: ScaleRange,
}

impl LinearStyle {
    fn validate(&self, style: &str) -> Result<(), ConfigError> {
        let ScaleRange { lo, hi } = self.scale_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(ConfigError::InvalidScaleRange {
                style: style.to_string(),
                lo,
                hi,
            });
        }
        if self.components.is_empty() {
            return Err(ConfigError::EmptyComponents {
                style: style.to_string(),
            });
        }
        Ok(())
    }
}

/// Reference to a registered index function plus its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFunctionRef {
    /// Registered function name. Dotted paths resolve by their last segment.
    pub function: String,

    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    #[serde(default)]
    pub kwargs: serde_json::Map<String, serde_json::Value>,

    /// Accepted for compatibility; functions always receive band lookup.
    #[serde(default)]
    pub mapped_bands: bool,
}

/// Index-function + colour-ramp style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampStyle {
    pub index_function: IndexFunctionRef,
    pub needed_bands: BTreeSet<String>,
    pub color_ramp: Vec<ControlPoint>,
}

/// One control point of a colour ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub value: f64,
    pub color: Rgb,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl ControlPoint {
    pub fn new(value: f64, color: Rgb, alpha: f64) -> Self {
        Self {
            value,
            color,
            alpha,
        }
    }

    pub fn opaque(value: f64, color: Rgb) -> Self {
        Self::new(value, color, 1.0)
    }
}

fn default_alpha() -> f64 {
    1.0
}

/// Check a ramp is usable for interpolation: at least one point, values
/// never decreasing, alpha within [0, 1].
///
/// Equal neighbouring values are permitted and produce a hard step.
pub fn validate_color_ramp(style: &str, ramp: &[ControlPoint]) -> Result<(), ConfigError> {
    if ramp.is_empty() {
        return Err(ConfigError::EmptyColorRamp {
            style: style.to_string(),
        });
    }
    for (index, point) in ramp.iter().enumerate() {
        if !(0.0..=1.0).contains(&point.alpha) {
            return Err(ConfigError::AlphaOutOfRange {
                style: style.to_string(),
                index,
                alpha: point.alpha,
            });
        }
        let decreasing = index > 0 && point.value < ramp[index - 1].value;
        if decreasing || point.value.is_nan() {
            return Err(ConfigError::DecreasingColorRamp {
                style: style.to_string(),
                index,
                value: point.value,
            });
        }
    }
    Ok(())
}

/// Legend options for a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    /// Unset means the style kind decides: ramps show one, linear styles don't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,

    /// Externally hosted legend image; takes precedence over generation.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub units: Option<String>,

    /// First value shown on the bar (defaults to the first control point).
    #[serde(default)]
    pub begin: Option<f64>,

    /// Last value shown on the bar (defaults to the last control point).
    #[serde(default)]
    pub end: Option<f64>,

    #[serde(default = "default_ticks")]
    pub ticks: u32,

    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,

    #[serde(default = "default_legend_width")]
    pub width: u32,

    #[serde(default = "default_legend_height")]
    pub height: u32,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            show_legend: None,
            url: None,
            title: None,
            units: None,
            begin: None,
            end: None,
            ticks: default_ticks(),
            decimal_places: default_decimal_places(),
            width: default_legend_width(),
            height: default_legend_height(),
        }
    }
}

fn default_ticks() -> u32 {
    5
}
fn default_decimal_places() -> usize {
    1
}
fn default_legend_width() -> u32 {
    300
}
fn default_legend_height() -> u32 {
    40
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGB_STYLE: &str = r##"{
        "name": "simple_rgb",
        "title": "Simple RGB",
        "components": {
            "red": {"red": 1.0},
            "green": {"green": 1.0},
            "blue": {"blue": 1.0}
        },
        "scale_range": [0.0, 3000.0],
        "legend": {"show_legend": true, "url": "http://example.com/custom_style_image.png"}
    }"##;

    const NDVI_STYLE: &str = r##"{
        "name": "s2_seasonal_ndvi",
        "index_function": {
            "function": "single_band",
            "mapped_bands": true,
            "kwargs": {"band": "mediannan"}
        },
        "needed_bands": ["mediannan"],
        "color_ramp": [
            {"value": -0.0, "color": "#8F3F20", "alpha": 0.0},
            {"value": 0.0, "color": "#8F3F20", "alpha": 1.0},
            {"value": 100, "color": "#A35F18"}
        ]
    }"##;

    #[test]
    fn test_parse_linear_style() {
        let style: StyleDefinition = serde_json::from_str(RGB_STYLE).unwrap();
        style.validate().unwrap();
        let StyleKind::Linear(linear) = &style.kind else {
            panic!("Expected linear style");
        };
        assert_eq!(linear.scale_range, ScaleRange::new(0.0, 3000.0));
        assert!(linear.components.alpha.is_none());
        assert_eq!(
            style.declared_bands().into_iter().collect::<Vec<_>>(),
            vec!["blue", "green", "red"]
        );
        assert_eq!(
            style.legend.url.as_deref(),
            Some("http://example.com/custom_style_image.png")
        );
        assert!(style.shows_legend());
    }

    #[test]
    fn test_parse_ramp_style() {
        let style: StyleDefinition = serde_json::from_str(NDVI_STYLE).unwrap();
        style.validate().unwrap();
        let StyleKind::Ramp(ramp) = &style.kind else {
            panic!("Expected ramp style");
        };
        assert_eq!(ramp.color_ramp.len(), 3);
        assert_eq!(ramp.color_ramp[2].alpha, 1.0);
        assert_eq!(ramp.index_function.kwargs["band"], "mediannan");
        assert_eq!(style.legend.show_legend, None);
        assert!(style.shows_legend());
    }

    #[test]
    fn test_scale_range_clamps() {
        let range = ScaleRange::new(0.0, 3000.0);
        assert_eq!(range.to_byte(3000.0), 255);
        assert_eq!(range.to_byte(0.0), 0);
        assert_eq!(range.to_byte(-100.0), 0);
        assert_eq!(range.to_byte(1e9), 255);
        assert_eq!(range.to_byte(1500.0), 128);
    }

    #[test]
    fn test_ramp_validation() {
        let red = Rgb::new(255, 0, 0);
        assert!(matches!(
            validate_color_ramp("s", &[]),
            Err(ConfigError::EmptyColorRamp { .. })
        ));
        assert!(matches!(
            validate_color_ramp("s", &[ControlPoint::opaque(1.0, red), ControlPoint::opaque(0.0, red)]),
            Err(ConfigError::DecreasingColorRamp { index: 1, .. })
        ));
        assert!(matches!(
            validate_color_ramp("s", &[ControlPoint::new(0.0, red, 1.5)]),
            Err(ConfigError::AlphaOutOfRange { index: 0, .. })
        ));
        // A repeated value is a hard step, not an error.
        assert!(validate_color_ramp(
            "s",
            &[ControlPoint::new(0.0, red, 0.0), ControlPoint::opaque(0.0, red)]
        )
        .is_ok());
    }

    #[test]
    fn test_linear_validation() {
        let style = LinearStyle {
            components: Components::default(),
            scale_range: ScaleRange::new(0.0, 1.0),
        };
        assert!(matches!(
            style.validate("empty"),
            Err(ConfigError::EmptyComponents { .. })
        ));

        let style = LinearStyle {
            components: Components {
                red: Some([("red".to_string(), 1.0)].into_iter().collect()),
                ..Default::default()
            },
            scale_range: ScaleRange::new(10.0, 10.0),
        };
        assert!(matches!(
            style.validate("flat"),
            Err(ConfigError::InvalidScaleRange { .. })
        ));
    }
}
