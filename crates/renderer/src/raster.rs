//! Band rasters handed to the renderer and the RGBA tiles it produces.

use crate::index::IndexError;
use crate::png;
use ows_common::{AvailableBands, BandAliasMap, RenderError};
use std::collections::HashMap;

/// Band grids of one dataset, keyed by the dataset's own band names.
///
/// Every grid is `width * height` values in row-major order. `NaN` marks
/// no-data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetBands {
    width: usize,
    height: usize,
    bands: HashMap<String, Vec<f32>>,
}

impl DatasetBands {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: HashMap::new(),
        }
    }

    /// Add a band grid, checking it matches the dataset shape.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f32>) -> Result<(), RenderError> {
        let name = name.into();
        // no grid can hold an overflowing shape
        let expected = self.width.checked_mul(self.height);
        if expected != Some(values.len()) {
            return Err(RenderError::ShapeMismatch {
                band: name,
                width: self.width,
                height: self.height,
                expected: expected.unwrap_or(usize::MAX),
                actual: values.len(),
            });
        }
        self.bands.insert(name, values);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_band(mut self, name: impl Into<String>, values: Vec<f32>) -> Result<Self, RenderError> {
        self.insert(name, values)?;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn band(&self, name: &str) -> Option<&[f32]> {
        self.bands.get(name).map(Vec::as_slice)
    }

    /// Source band names, sorted.
    pub fn band_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.bands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl AvailableBands for DatasetBands {
    fn has_band(&self, name: &str) -> bool {
        self.bands.contains_key(name)
    }
}

/// Canonical band name -> grid, after alias resolution.
#[derive(Debug, Clone)]
pub struct ResolvedBands<'a> {
    entries: Vec<(&'a str, &'a [f32])>,
}

impl<'a> ResolvedBands<'a> {
    /// Resolve each of `canonical` through `aliases` against `data`.
    pub fn resolve(
        style: &str,
        aliases: &BandAliasMap,
        canonical: &'a [String],
        data: &'a DatasetBands,
    ) -> Result<Self, RenderError> {
        let mut entries = Vec::with_capacity(canonical.len());
        for band in canonical {
            let missing = |source| RenderError::MissingBand {
                style: style.to_string(),
                source,
            };
            let source = aliases.resolve(band, data).map_err(missing)?;
            let grid = data.band(source).ok_or_else(|| {
                missing(ows_common::BandNotFoundError {
                    band: band.clone(),
                    tried: vec![source.to_string()],
                })
            })?;
            entries.push((band.as_str(), grid));
        }
        Ok(Self { entries })
    }

    /// Band values at one pixel.
    pub fn pixel(&self, index: usize) -> PixelBands<'_> {
        PixelBands {
            entries: &self.entries,
            index,
        }
    }

    /// Whether any resolved band is no-data at `index`.
    pub fn is_nodata(&self, index: usize) -> bool {
        self.entries.iter().any(|(_, grid)| grid[index].is_nan())
    }
}

/// Band lookup for a single pixel, by canonical name.
#[derive(Debug, Clone, Copy)]
pub struct PixelBands<'a> {
    entries: &'a [(&'a str, &'a [f32])],
    index: usize,
}

impl<'a> PixelBands<'a> {
    pub fn value(&self, band: &str) -> Result<f64, IndexError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == band)
            .map(|(_, grid)| f64::from(grid[self.index]))
            .ok_or_else(|| IndexError::UnknownBand(band.to_string()))
    }
}

/// A rendered RGBA8 image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaTile {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

fn pixel_count(width: usize, height: usize) -> Result<usize, RenderError> {
    width
        .checked_mul(height)
        .filter(|count| count.checked_mul(4).is_some())
        .ok_or_else(|| RenderError::Encode(format!("{}x{} tile is too large", width, height)))
}

impl RgbaTile {
    /// A fully transparent tile.
    pub fn transparent(width: usize, height: usize) -> Result<Self, RenderError> {
        let count = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; count * 4],
        })
    }

    /// A tile filled with one colour.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Result<Self, RenderError> {
        let count = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: rgba.repeat(count),
        })
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        png::encode(&self.pixels, self.width, self.height)
    }
}
