//! Colour ramp interpolation.
//!
//! A ramp is an ordered list of control points. Values at or beyond either
//! end clamp to that end's colour; values in between are interpolated
//! linearly, each RGB channel and alpha independently.

use ows_common::style::validate_color_ramp;
use ows_common::{ConfigError, ControlPoint};

/// Interpolated colour before quantisation to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampColor {
    pub rgb: [f64; 3],
    pub alpha: f64,
}

impl RampColor {
    fn from_point(point: &ControlPoint) -> Self {
        Self {
            rgb: point.color.to_f64(),
            alpha: point.alpha,
        }
    }

    /// Quantise to RGBA8; alpha is scaled from [0, 1] to [0, 255].
    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |v: f64| v.clamp(0.0, 255.0).round() as u8;
        [
            channel(self.rgb[0]),
            channel(self.rgb[1]),
            channel(self.rgb[2]),
            channel(self.alpha * 255.0),
        ]
    }
}

/// Interpolate `value` through `ramp`.
///
/// `ramp` must hold at least one point with non-decreasing values; use
/// [`ColorRamp::new`] to get that checked once up front.
pub fn interpolate(ramp: &[ControlPoint], value: f64) -> RampColor {
    let (first, last) = match (ramp.first(), ramp.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return RampColor {
                rgb: [0.0; 3],
                alpha: 0.0,
            }
        }
    };

    if value <= first.value {
        return RampColor::from_point(first);
    }
    if value >= last.value {
        return RampColor::from_point(last);
    }

    // First point strictly above `value`; its predecessor is <= value.
    // Equal neighbours therefore never end up as the bracketing pair.
    let upper = ramp.partition_point(|p| p.value <= value);
    let low = &ramp[upper - 1];
    let high = &ramp[upper];

    let t = (value - low.value) / (high.value - low.value);
    let lerp = |a: f64, b: f64| a + t * (b - a);
    let (a, b) = (low.color.to_f64(), high.color.to_f64());
    RampColor {
        rgb: [lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])],
        alpha: lerp(low.alpha, high.alpha),
    }
}

/// A validated colour ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    points: Vec<ControlPoint>,
}

impl ColorRamp {
    /// Validate and wrap `points`. `style` names the owner in errors.
    pub fn new(style: &str, points: Vec<ControlPoint>) -> Result<Self, ConfigError> {
        validate_color_ramp(style, &points)?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn min_value(&self) -> f64 {
        self.points[0].value
    }

    pub fn max_value(&self) -> f64 {
        self.points[self.points.len() - 1].value
    }

    pub fn interpolate(&self, value: f64) -> RampColor {
        interpolate(&self.points, value)
    }

    /// Interpolate and quantise in one step.
    pub fn rgba(&self, value: f64) -> [u8; 4] {
        self.interpolate(value).to_rgba8()
    }
}
