//! Resource limit configuration for the WMS and WCS services.

use crate::color::Rgba;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service a request arrived through. Each has its own limit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Wms,
    Wcs,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Wms => "wms",
            Service::Wcs => "wcs",
        }
    }

    /// Whether requests on this service carry a zoom factor.
    pub fn has_zoom_axis(&self) -> bool {
        matches!(self, Service::Wms)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket of the dataset-count cache table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRule {
    /// Lower bound (inclusive) of the bucket. Must be greater than zero.
    pub min_datasets: u32,
    /// `max-age` in seconds for responses in this bucket.
    pub max_age: u32,
}

impl CacheRule {
    pub const fn new(min_datasets: u32, max_age: u32) -> Self {
        Self {
            min_datasets,
            max_age,
        }
    }
}

/// Limits for a single service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLimits {
    /// Requests zoomed out further than this are over the limit (WMS only).
    #[serde(default = "default_min_zoom_factor")]
    pub min_zoom_factor: f64,

    /// Maximum datasets a request may touch; 0 disables the check.
    #[serde(default)]
    pub max_datasets: u32,

    #[serde(default = "default_fill_colour")]
    pub zoomed_out_fill_colour: Rgba,

    /// `None`: never emit a cache header. `Some([])`: always `no-cache`.
    #[serde(default)]
    pub dataset_cache_rules: Option<Vec<CacheRule>>,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            min_zoom_factor: default_min_zoom_factor(),
            max_datasets: 0,
            zoomed_out_fill_colour: default_fill_colour(),
            dataset_cache_rules: None,
        }
    }
}

impl ServiceLimits {
    pub fn cache_rules(&self) -> Option<&[CacheRule]> {
        self.dataset_cache_rules.as_deref()
    }

    pub fn validate(&self, service: Service) -> Result<(), ConfigError> {
        if !self.min_zoom_factor.is_finite() || self.min_zoom_factor < 0.0 {
            return Err(ConfigError::InvalidZoomFactor {
                service: service.to_string(),
                value: self.min_zoom_factor,
            });
        }
        validate_cache_rules(service, self.cache_rules().unwrap_or(&[]))
    }
}

fn default_min_zoom_factor() -> f64 {
    300.0
}

fn default_fill_colour() -> Rgba {
    Rgba::new(150, 180, 200, 160)
}

/// Per-service resource limits of a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default)]
    pub wms: ServiceLimits,
    #[serde(default)]
    pub wcs: ServiceLimits,
}

impl ResourceLimits {
    pub fn for_service(&self, service: Service) -> &ServiceLimits {
        match service {
            Service::Wms => &self.wms,
            Service::Wcs => &self.wcs,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wms.validate(Service::Wms)?;
        self.wcs.validate(Service::Wcs)
    }
}

/// Rules must have `min_datasets > 0` and be strictly ascending.
pub fn validate_cache_rules(service: Service, rules: &[CacheRule]) -> Result<(), ConfigError> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.min_datasets == 0 {
            return Err(ConfigError::ZeroMinDatasets {
                service: service.to_string(),
                index,
            });
        }
        if index > 0 && rule.min_datasets <= rules[index - 1].min_datasets {
            return Err(ConfigError::UnsortedCacheRules {
                service: service.to_string(),
                index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_empty_and_populated_rules_stay_distinct() {
        let yaml = r#"
wms:
  min_zoom_factor: 500.0
  dataset_cache_rules: []
wcs:
  max_datasets: 0
"#;
        let limits: ResourceLimits = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(limits.wms.cache_rules(), Some(&[][..]));
        assert_eq!(limits.wcs.cache_rules(), None);
        assert_eq!(limits.wms.min_zoom_factor, 500.0);
        assert_eq!(limits.wcs.zoomed_out_fill_colour, Rgba::new(150, 180, 200, 160));
    }

    #[test]
    fn test_rules_must_be_positive_and_ascending() {
        assert!(validate_cache_rules(Service::Wms, &[CacheRule::new(4, 1), CacheRule::new(8, 2)]).is_ok());
        assert!(matches!(
            validate_cache_rules(Service::Wms, &[CacheRule::new(0, 1)]),
            Err(ConfigError::ZeroMinDatasets { index: 0, .. })
        ));
        assert!(matches!(
            validate_cache_rules(Service::Wcs, &[CacheRule::new(8, 1), CacheRule::new(4, 2)]),
            Err(ConfigError::UnsortedCacheRules { index: 1, .. })
        ));
        assert!(matches!(
            validate_cache_rules(Service::Wcs, &[CacheRule::new(4, 1), CacheRule::new(4, 2)]),
            Err(ConfigError::UnsortedCacheRules { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_zoom_factor_rejected() {
        let limits = ServiceLimits {
            min_zoom_factor: -1.0,
            ..Default::default()
        };
        assert!(limits.validate(Service::Wms).is_err());
    }
}
