//! Error types for the OWS style and governance engines.
//!
//! Three families of failure exist:
//! - [`ConfigError`]: raised while loading or validating configuration at
//!   startup. Always fatal.
//! - [`BandNotFoundError`] and [`RenderError`]: raised per request while
//!   rendering a tile. They fail that tile only.
//! - [`OwsError`]: the umbrella type handed to the protocol layer, which maps
//!   it to an OGC exception report.

use thiserror::Error;

/// Result type alias using OwsError.
pub type OwsResult<T> = Result<T, OwsError>;

/// Startup-time configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Unsupported configuration format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid colour '{0}'")]
    InvalidColor(String),

    #[error("Layer '{layer}': band '{band}' has an empty alias list")]
    EmptyAliasList { layer: String, band: String },

    #[error("Layer '{layer}': source band '{alias}' is claimed by both '{first}' and '{second}'")]
    DuplicateAlias {
        layer: String,
        alias: String,
        first: String,
        second: String,
    },

    #[error("Duplicate layer name: {0}")]
    DuplicateLayer(String),

    #[error("Layer '{layer}': duplicate style '{style}'")]
    DuplicateStyle { layer: String, style: String },

    #[error("Layer '{layer}': default style '{style}' is not defined")]
    DefaultStyleNotFound { layer: String, style: String },

    #[error("Layer '{0}' defines no styles")]
    NoStyles(String),

    #[error("Style '{style}': colour ramp has no control points")]
    EmptyColorRamp { style: String },

    #[error("Style '{style}': control point {index} value {value} is lower than the previous point")]
    DecreasingColorRamp {
        style: String,
        index: usize,
        value: f64,
    },

    #[error("Style '{style}': control point {index} alpha {alpha} is outside [0, 1]")]
    AlphaOutOfRange {
        style: String,
        index: usize,
        alpha: f64,
    },

    #[error("Style '{style}': invalid scale range [{lo}, {hi}]")]
    InvalidScaleRange { style: String, lo: f64, hi: f64 },

    #[error("Style '{style}': linear style has no components")]
    EmptyComponents { style: String },

    #[error("Layer '{layer}', style '{style}': band '{band}' is not declared")]
    UndeclaredBand {
        layer: String,
        style: String,
        band: String,
    },

    #[error("Style '{style}': unknown index function '{function}'")]
    UnknownIndexFunction { style: String, function: String },

    #[error("Style '{style}': invalid parameters for index function '{function}': {message}")]
    InvalidIndexParams {
        style: String,
        function: String,
        message: String,
    },

    #[error("{service} resource limits: cache rule {index} has min_datasets = 0")]
    ZeroMinDatasets { service: String, index: usize },

    #[error("{service} resource limits: cache rules are not sorted by min_datasets (rule {index})")]
    UnsortedCacheRules { service: String, index: usize },

    #[error("{service} resource limits: invalid min_zoom_factor {value}")]
    InvalidZoomFactor { service: String, value: f64 },
}

/// A canonical band could not be matched to any band the dataset provides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Band '{band}' not found in dataset (tried: [{}])", tried.join(", "))]
pub struct BandNotFoundError {
    /// Canonical band name requested by the style.
    pub band: String,
    /// Source names tried, in order.
    pub tried: Vec<String>,
}

/// Per-tile rendering failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Style '{style}': {source}")]
    MissingBand {
        style: String,
        #[source]
        source: BandNotFoundError,
    },

    #[error("Band '{band}' has {actual} values, expected {expected} ({width}x{height})")]
    ShapeMismatch {
        band: String,
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Style '{style}': index function '{function}' failed: {message}")]
    IndexFunction {
        style: String,
        function: String,
        message: String,
    },

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Primary error type surfaced to the protocol layer.
#[derive(Debug, Error)]
pub enum OwsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer '{layer}': style not found: {style}")]
    StyleNotFound { layer: String, style: String },

    #[error("Service not enabled: {0}")]
    ServiceDisabled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OwsError {
    /// Get the OGC exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            OwsError::LayerNotFound(_) => "LayerNotDefined",
            OwsError::StyleNotFound { .. } => "StyleNotDefined",
            OwsError::ServiceDisabled(_) => "OperationNotSupported",
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            OwsError::LayerNotFound(_) | OwsError::StyleNotFound { .. } => 404,
            OwsError::ServiceDisabled(_) => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_not_found_message_lists_candidates() {
        let err = BandNotFoundError {
            band: "red".to_string(),
            tried: vec!["band_04".to_string(), "B04".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Band 'red' not found in dataset (tried: [band_04, B04])"
        );
    }

    #[test]
    fn test_exception_codes() {
        let err = OwsError::StyleNotFound {
            layer: "s2_l2a".to_string(),
            style: "nope".to_string(),
        };
        assert_eq!(err.exception_code(), "StyleNotDefined");
        assert_eq!(err.http_status_code(), 404);

        let err: OwsError = RenderError::Encode("boom".to_string()).into();
        assert_eq!(err.exception_code(), "NoApplicableCode");
        assert_eq!(err.http_status_code(), 500);
    }
}
