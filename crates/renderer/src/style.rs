//! Style compilation and per-tile rendering.
//!
//! A [`StyleDefinition`] from configuration is compiled once at startup into
//! a [`CompiledStyle`]: index functions are looked up and their parameters
//! bound, ramps are validated, and the list of canonical bands to fetch is
//! fixed. Rendering a tile is then a pure function of the compiled style and
//! the dataset's band grids.

use crate::index::{BoundIndexFunction, IndexRegistry};
use crate::ramp::ColorRamp;
use crate::raster::{DatasetBands, ResolvedBands, RgbaTile};
use ows_common::{
    BandAliasMap, ConfigError, LegendConfig, RenderError, ScaleRange, StyleDefinition, StyleKind,
};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Band weights of one output channel, in canonical names.
type Weights = Vec<(String, f64)>;

#[derive(Debug, Clone)]
enum Shader {
    Linear {
        /// red, green, blue, alpha
        channels: [Option<Weights>; 4],
        scale_range: ScaleRange,
    },
    Ramp {
        function: BoundIndexFunction,
        ramp: ColorRamp,
    },
}

/// A style ready to render tiles.
#[derive(Debug, Clone)]
pub struct CompiledStyle {
    name: String,
    title: String,
    needed_bands: Vec<String>,
    legend: LegendConfig,
    shows_legend: bool,
    shader: Shader,
}

impl CompiledStyle {
    /// Compile `definition` for a layer with the given band aliases.
    ///
    /// Every band the style reads must be declared in `aliases`; a ramp
    /// style's index function may only read bands listed in `needed_bands`.
    pub fn compile(
        layer: &str,
        definition: &StyleDefinition,
        aliases: &BandAliasMap,
        registry: &IndexRegistry,
    ) -> Result<Self, ConfigError> {
        definition.validate()?;
        let undeclared = |band: &str| ConfigError::UndeclaredBand {
            layer: layer.to_string(),
            style: definition.name.clone(),
            band: band.to_string(),
        };

        // styles may name a band by any of its aliases
        let canonical = |band: &str| {
            aliases
                .canonical_for(band)
                .map(str::to_string)
                .ok_or_else(|| undeclared(band))
        };

        let needed_bands = definition
            .declared_bands()
            .into_iter()
            .map(&canonical)
            .collect::<Result<BTreeSet<String>, _>>()?;

        let shader = match &definition.kind {
            StyleKind::Linear(linear) => {
                let mut channels: [Option<Weights>; 4] = Default::default();
                for (out, weights) in channels.iter_mut().zip(linear.components.channels()) {
                    if let Some(weights) = weights {
                        *out = Some(
                            weights
                                .iter()
                                .map(|(band, weight)| Ok((canonical(band.as_str())?, *weight)))
                                .collect::<Result<Weights, ConfigError>>()?,
                        );
                    }
                }
                Shader::Linear {
                    channels,
                    scale_range: linear.scale_range,
                }
            }
            StyleKind::Ramp(ramp) => {
                let function =
                    BoundIndexFunction::bind(registry, &definition.name, &ramp.index_function)?
                        .map_bands(&canonical)?;
                if let Some(band) = function.bands().iter().find(|b| !needed_bands.contains(*b)) {
                    return Err(undeclared(band));
                }
                Shader::Ramp {
                    function,
                    ramp: ColorRamp::new(&definition.name, ramp.color_ramp.clone())?,
                }
            }
        };

        Ok(Self {
            name: definition.name.clone(),
            title: definition.title.clone(),
            needed_bands: needed_bands.into_iter().collect(),
            legend: definition.legend.clone(),
            shows_legend: definition.shows_legend(),
            shader,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Canonical bands the style reads, sorted.
    pub fn needed_bands(&self) -> &[String] {
        &self.needed_bands
    }

    pub fn legend_config(&self) -> &LegendConfig {
        &self.legend
    }

    /// `show_legend` resolved against the style kind.
    pub fn shows_legend(&self) -> bool {
        self.shows_legend
    }

    /// The colour ramp, for ramp styles.
    pub fn color_ramp(&self) -> Option<&ColorRamp> {
        match &self.shader {
            Shader::Ramp { ramp, .. } => Some(ramp),
            Shader::Linear { .. } => None,
        }
    }

    /// Render one tile from `data`, resolving bands through `aliases`.
    ///
    /// Pixels where a band is NaN, or where the index function yields NaN,
    /// come out fully transparent. Any band that cannot be resolved fails
    /// the whole tile.
    pub fn render(&self, aliases: &BandAliasMap, data: &DatasetBands) -> Result<RgbaTile, RenderError> {
        let (width, height) = (data.width(), data.height());
        let bands = ResolvedBands::resolve(&self.name, aliases, &self.needed_bands, data)?;

        let mut tile = RgbaTile::transparent(width, height)?;
        if width == 0 || height == 0 {
            return Ok(tile);
        }

        tile.pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .try_for_each(|(y, row)| {
                for (x, out) in row.chunks_exact_mut(4).enumerate() {
                    out.copy_from_slice(&self.shade(&bands, y * width + x)?);
                }
                Ok::<(), RenderError>(())
            })?;

        debug!(style = %self.name, width, height, "Rendered tile");
        Ok(tile)
    }

    fn shade(&self, bands: &ResolvedBands<'_>, index: usize) -> Result<[u8; 4], RenderError> {
        if bands.is_nodata(index) {
            return Ok(TRANSPARENT);
        }
        let pixel = bands.pixel(index);

        match &self.shader {
            Shader::Linear {
                channels,
                scale_range,
            } => {
                let mut rgba = [0, 0, 0, 255];
                for (out, weights) in rgba.iter_mut().zip(channels) {
                    if let Some(weights) = weights {
                        let mut sum = 0.0;
                        for (band, weight) in weights {
                            sum += weight * pixel.value(band).map_err(|e| self.index_error(e))?;
                        }
                        *out = scale_range.to_byte(sum);
                    }
                }
                Ok(rgba)
            }
            Shader::Ramp { function, ramp } => {
                let value = function.evaluate(&pixel).map_err(|e| self.index_error(e))?;
                if value.is_nan() {
                    Ok(TRANSPARENT)
                } else {
                    Ok(ramp.rgba(value))
                }
            }
        }
    }

    fn index_error(&self, error: crate::index::IndexError) -> RenderError {
        let function = match &self.shader {
            Shader::Ramp { function, .. } => function.name(),
            Shader::Linear { .. } => "linear",
        };
        RenderError::IndexFunction {
            style: self.name.clone(),
            function: function.to_string(),
            message: error.to_string(),
        }
    }
}
