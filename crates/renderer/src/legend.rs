//! Legend generation.
//!
//! A style either points at an externally hosted legend image, gets a
//! generated horizontal colour bar (ramp styles), or has no legend at all.

use crate::ramp::ColorRamp;
use crate::raster::RgbaTile;
use crate::style::CompiledStyle;
use ows_common::{LegendConfig, RenderError};
use serde::Serialize;

/// Height of the tick strip drawn under the colour bar.
const TICK_STRIP: usize = 6;

const TICK_COLOR: [u8; 4] = [0, 0, 0, 255];

/// The legend of a style.
#[derive(Debug, Clone, PartialEq)]
pub enum Legend {
    /// Served from elsewhere.
    External { url: String },
    Generated(GeneratedLegend),
}

/// A rendered colour bar and the ticks drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLegend {
    pub title: Option<String>,
    pub units: Option<String>,
    pub image: RgbaTile,
    pub ticks: Vec<LegendTick>,
}

impl GeneratedLegend {
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        self.image.to_png()
    }
}

/// A labelled tick on the colour bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendTick {
    pub value: f64,
    pub label: String,
    /// Column of the tick, from the left edge.
    pub offset: usize,
}

/// Build the legend for `style`, or `None` when it has none.
pub fn legend_for(style: &CompiledStyle) -> Result<Option<Legend>, RenderError> {
    if !style.shows_legend() {
        return Ok(None);
    }
    let config = style.legend_config();
    if let Some(url) = &config.url {
        return Ok(Some(Legend::External { url: url.clone() }));
    }
    match style.color_ramp() {
        Some(ramp) => Ok(Some(Legend::Generated(generate(ramp, config)?))),
        None => Ok(None),
    }
}

/// Draw the colour bar for `ramp` using the sizes and range in `config`.
pub fn generate(ramp: &ColorRamp, config: &LegendConfig) -> Result<GeneratedLegend, RenderError> {
    let width = config.width as usize;
    let height = config.height as usize;
    let begin = config.begin.unwrap_or_else(|| ramp.min_value());
    let end = config.end.unwrap_or_else(|| ramp.max_value());

    let strip = if height > TICK_STRIP { TICK_STRIP } else { 0 };
    let bar_height = height - strip;

    let mut image = RgbaTile::transparent(width, height)?;
    for x in 0..width {
        let rgba = ramp.rgba(column_value(x, width, begin, end));
        for y in 0..bar_height {
            set_pixel(&mut image, x, y, rgba);
        }
    }

    let ticks = ticks(config, width, begin, end);
    for tick in &ticks {
        for y in bar_height..height {
            set_pixel(&mut image, tick.offset, y, TICK_COLOR);
        }
    }

    Ok(GeneratedLegend {
        title: config.title.clone(),
        units: config.units.clone(),
        image,
        ticks,
    })
}

fn column_value(x: usize, width: usize, begin: f64, end: f64) -> f64 {
    if width <= 1 {
        return begin;
    }
    begin + (end - begin) * x as f64 / (width - 1) as f64
}

fn ticks(config: &LegendConfig, width: usize, begin: f64, end: f64) -> Vec<LegendTick> {
    if width == 0 {
        return Vec::new();
    }
    let count = config.ticks as usize;
    (0..count)
        .map(|i| {
            let fraction = if count == 1 {
                0.0
            } else {
                i as f64 / (count - 1) as f64
            };
            let value = begin + (end - begin) * fraction;
            LegendTick {
                value,
                label: format!("{:.*}", config.decimal_places, value),
                offset: (fraction * (width - 1) as f64).round() as usize,
            }
        })
        .collect()
}

fn set_pixel(image: &mut RgbaTile, x: usize, y: usize, rgba: [u8; 4]) {
    let i = (y * image.width + x) * 4;
    image.pixels[i..i + 4].copy_from_slice(&rgba);
}
