//! Index functions for ramp styles.
//!
//! An index function turns the band values of one pixel into a scalar that is
//! then coloured through the style's ramp. Functions are registered by name
//! in an [`IndexRegistry`]; configuration refers to them by that name and
//! supplies parameters as keyword (`kwargs`) or positional (`args`) values.
//!
//! Parameters are bound once when a style is compiled. Every function gets
//! the pixel's band lookup ([`PixelBands`]) at evaluation time.

use crate::raster::PixelBands;
use ows_common::{ConfigError, IndexFunctionRef};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure while evaluating an index function for a pixel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    #[error("band '{0}' is not available to this function")]
    UnknownBand(String),

    #[error("parameter {0} is not bound")]
    MissingParam(usize),

    #[error("{0}")]
    Invalid(String),
}

/// What a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A canonical band name.
    Band,
    /// A number.
    Number,
}

/// Declaration of one function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Used when the parameter is not supplied. Bands never default.
    pub default: Option<f64>,
}

impl ParamSpec {
    pub const fn band(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Band,
            default: None,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            default: None,
        }
    }

    pub const fn number_or(name: &'static str, default: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            default: Some(default),
        }
    }
}

/// Bound parameter values, in declaration order per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexParams {
    bands: Vec<String>,
    numbers: Vec<f64>,
}

impl IndexParams {
    /// The `i`-th band parameter.
    pub fn band(&self, i: usize) -> Result<&str, IndexError> {
        self.bands
            .get(i)
            .map(String::as_str)
            .ok_or(IndexError::MissingParam(i))
    }

    /// The `i`-th numeric parameter.
    pub fn number(&self, i: usize) -> Result<f64, IndexError> {
        self.numbers
            .get(i)
            .copied()
            .ok_or(IndexError::MissingParam(i))
    }

    /// All band parameters.
    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    /// Bind configuration values against `specs`.
    ///
    /// A keyword wins over a positional argument at the same slot.
    pub fn bind(
        specs: &[ParamSpec],
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Self, String> {
        if args.len() > specs.len() {
            return Err(format!(
                "expected at most {} positional arguments, got {}",
                specs.len(),
                args.len()
            ));
        }
        if let Some(unknown) = kwargs
            .keys()
            .find(|key| !specs.iter().any(|s| s.name == key.as_str()))
        {
            return Err(format!("unexpected parameter '{}'", unknown));
        }

        let mut params = IndexParams::default();
        for (position, spec) in specs.iter().enumerate() {
            let supplied = kwargs.get(spec.name).or_else(|| args.get(position));
            match spec.kind {
                ParamKind::Band => match supplied {
                    Some(Value::String(band)) => params.bands.push(band.clone()),
                    Some(other) => {
                        return Err(format!("'{}' must be a band name, got {}", spec.name, other))
                    }
                    None => return Err(format!("missing band parameter '{}'", spec.name)),
                },
                ParamKind::Number => {
                    let value = match supplied {
                        Some(v) => v
                            .as_f64()
                            .ok_or_else(|| format!("'{}' must be a number, got {}", spec.name, v))?,
                        None => spec
                            .default
                            .ok_or_else(|| format!("missing parameter '{}'", spec.name))?,
                    };
                    params.numbers.push(value);
                }
            }
        }
        Ok(params)
    }
}

/// A named, statically registered index function.
pub trait IndexFunction: Send + Sync {
    fn name(&self) -> &'static str;

    /// Parameters accepted, in positional order.
    fn params(&self) -> &'static [ParamSpec];

    fn evaluate(&self, bands: &PixelBands<'_>, params: &IndexParams) -> Result<f64, IndexError>;
}

/// The value of a single band.
pub struct SingleBand;

impl IndexFunction for SingleBand {
    fn name(&self) -> &'static str {
        "single_band"
    }

    fn params(&self) -> &'static [ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::band("band")];
        PARAMS
    }

    fn evaluate(&self, bands: &PixelBands<'_>, params: &IndexParams) -> Result<f64, IndexError> {
        bands.value(params.band(0)?)
    }
}

/// `band * scale + offset`
pub struct ScaledBand;

impl IndexFunction for ScaledBand {
    fn name(&self) -> &'static str {
        "scaled_band"
    }

    fn params(&self) -> &'static [ParamSpec] {
        const PARAMS: &[ParamSpec] = &[
            ParamSpec::band("band"),
            ParamSpec::number_or("scale", 1.0),
            ParamSpec::number_or("offset", 0.0),
        ];
        PARAMS
    }

    fn evaluate(&self, bands: &PixelBands<'_>, params: &IndexParams) -> Result<f64, IndexError> {
        Ok(bands.value(params.band(0)?)? * params.number(0)? + params.number(1)?)
    }
}

/// A fixed value for every pixel.
pub struct Constant;

impl IndexFunction for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn params(&self) -> &'static [ParamSpec] {
        const PARAMS: &[ParamSpec] = &[ParamSpec::number("const")];
        PARAMS
    }

    fn evaluate(&self, _bands: &PixelBands<'_>, params: &IndexParams) -> Result<f64, IndexError> {
        params.number(0)
    }
}

const TWO_BANDS: &[ParamSpec] = &[ParamSpec::band("band1"), ParamSpec::band("band2")];

/// Index functions of the form `f(band1, band2)`.
macro_rules! two_band_function {
    ($(#[$doc:meta])* $ty:ident, $name:literal, |$a:ident, $b:ident| $body:expr) => {
        $(#[$doc])*
        pub struct $ty;

        impl IndexFunction for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn params(&self) -> &'static [ParamSpec] {
                TWO_BANDS
            }

            fn evaluate(
                &self,
                bands: &PixelBands<'_>,
                params: &IndexParams,
            ) -> Result<f64, IndexError> {
                let $a = bands.value(params.band(0)?)?;
                let $b = bands.value(params.band(1)?)?;
                Ok($body)
            }
        }
    };
}

two_band_function!(
    /// `(band1 - band2) / (band1 + band2)`, e.g. NDVI from nir and red.
    NormDiff, "norm_diff", |a, b| (a - b) / (a + b)
);
two_band_function!(
    /// `band1 / band2`
    BandQuotient, "band_quotient", |a, b| a / b
);
two_band_function!(
    /// `band1 + band2`
    SumBands, "sum_bands", |a, b| a + b
);
two_band_function!(
    /// `band1 - band2`
    DeltaBands, "delta_bands", |a, b| a - b
);

/// Name -> function table consulted when styles are compiled.
#[derive(Clone)]
pub struct IndexRegistry {
    functions: HashMap<&'static str, Arc<dyn IndexFunction>>,
}

impl IndexRegistry {
    /// A registry with no functions.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry holding every built-in function.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SingleBand);
        registry.register(ScaledBand);
        registry.register(Constant);
        registry.register(NormDiff);
        registry.register(BandQuotient);
        registry.register(SumBands);
        registry.register(DeltaBands);
        registry
    }

    /// Add a function, replacing any with the same name.
    pub fn register<F: IndexFunction + 'static>(&mut self, function: F) {
        self.functions.insert(function.name(), Arc::new(function));
    }

    /// Look a function up. A dotted path resolves by its last segment.
    pub fn get(&self, name: &str) -> Option<Arc<dyn IndexFunction>> {
        let short = name.rsplit('.').next().unwrap_or(name);
        self.functions.get(short).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// A function together with the parameters a style bound it to.
#[derive(Clone)]
pub struct BoundIndexFunction {
    function: Arc<dyn IndexFunction>,
    params: IndexParams,
}

impl BoundIndexFunction {
    /// Resolve `reference` in `registry` and bind its parameters.
    pub fn bind(
        registry: &IndexRegistry,
        style: &str,
        reference: &IndexFunctionRef,
    ) -> Result<Self, ConfigError> {
        let function =
            registry
                .get(&reference.function)
                .ok_or_else(|| ConfigError::UnknownIndexFunction {
                    style: style.to_string(),
                    function: reference.function.clone(),
                })?;
        let params = IndexParams::bind(function.params(), &reference.args, &reference.kwargs)
            .map_err(|message| ConfigError::InvalidIndexParams {
                style: style.to_string(),
                function: reference.function.clone(),
                message,
            })?;
        Ok(Self { function, params })
    }

    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Bands the bound function reads.
    pub fn bands(&self) -> &[String] {
        self.params.bands()
    }

    /// Rewrite every band parameter through `f`.
    pub fn map_bands<E>(mut self, mut f: impl FnMut(&str) -> Result<String, E>) -> Result<Self, E> {
        for band in &mut self.params.bands {
            *band = f(band.as_str())?;
        }
        Ok(self)
    }

    pub fn evaluate(&self, bands: &PixelBands<'_>) -> Result<f64, IndexError> {
        self.function.evaluate(bands, &self.params)
    }
}

impl fmt::Debug for BoundIndexFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundIndexFunction")
            .field("function", &self.function.name())
            .field("params", &self.params)
            .finish()
    }
}
