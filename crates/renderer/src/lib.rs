//! Style rendering for multi-band raster data.
//!
//! Turns decoded band grids into RGBA tiles through one of two paths:
//! - Linear band combinations rescaled to 0..=255 per channel
//! - Index functions evaluated per pixel and coloured through a ramp
//!
//! Also generates legends and encodes tiles as PNG.

pub mod catalog;
pub mod index;
pub mod legend;
pub mod png;
pub mod ramp;
pub mod raster;
pub mod style;

pub use catalog::{LayerStyles, StyleCatalog};
pub use index::{IndexError, IndexFunction, IndexParams, IndexRegistry, ParamKind, ParamSpec};
pub use legend::{legend_for, GeneratedLegend, Legend, LegendTick};
pub use ramp::{interpolate, ColorRamp, RampColor};
pub use raster::{DatasetBands, PixelBands, RgbaTile};
pub use style::CompiledStyle;
