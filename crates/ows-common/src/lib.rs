//! Configuration types and shared primitives for the OWS rendering engines.

pub mod bands;
pub mod color;
pub mod config;
pub mod error;
pub mod layer;
pub mod limits;
pub mod style;

pub use bands::{AvailableBands, BandAliasMap};
pub use color::{Rgb, Rgba};
pub use config::{GlobalConfig, OwsConfig, ServicesConfig};
pub use error::{BandNotFoundError, ConfigError, OwsError, OwsResult, RenderError};
pub use layer::{LayerConfig, LayerFolder, LayerNode, StylingConfig};
pub use limits::{CacheRule, ResourceLimits, Service, ServiceLimits};
pub use style::{
    Components, ControlPoint, IndexFunctionRef, LegendConfig, LinearStyle, RampStyle, ScaleRange,
    StyleDefinition, StyleKind,
};
