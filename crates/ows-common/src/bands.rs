//! Band alias maps and band resolution.
//!
//! A layer declares its bands as canonical names, each with an ordered list
//! of source names the underlying products may use for it. Datasets from
//! different products spell the same band differently (`band_04`, `red`,
//! `B04`); resolution picks the first candidate the dataset actually has.

use crate::error::{BandNotFoundError, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Anything that can answer "does this dataset contain a band called `name`?".
pub trait AvailableBands {
    fn has_band(&self, name: &str) -> bool;
}

impl<S: AsRef<str>> AvailableBands for [S] {
    fn has_band(&self, name: &str) -> bool {
        self.iter().any(|s| s.as_ref() == name)
    }
}

impl<S: AsRef<str>> AvailableBands for Vec<S> {
    fn has_band(&self, name: &str) -> bool {
        self.as_slice().has_band(name)
    }
}

impl AvailableBands for HashSet<String> {
    fn has_band(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl AvailableBands for BTreeSet<String> {
    fn has_band(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<V> AvailableBands for HashMap<String, V> {
    fn has_band(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// Canonical band name -> ordered candidate source names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandAliasMap(BTreeMap<String, Vec<String>>);

impl BandAliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a canonical band with its candidate source names.
    pub fn insert<I, S>(&mut self, canonical: impl Into<String>, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(canonical.into(), aliases.into_iter().map(Into::into).collect());
    }

    /// Whether `canonical` is declared in this map.
    pub fn contains(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }

    /// The canonical band `name` refers to: `name` itself when declared,
    /// otherwise the band whose candidate list contains it.
    pub fn canonical_for(&self, name: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.0.get_key_value(name) {
            return Some(canonical.as_str());
        }
        self.0
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| alias == name))
            .map(|(canonical, _)| canonical.as_str())
    }

    pub fn aliases(&self, canonical: &str) -> Option<&[String]> {
        self.0.get(canonical).map(Vec::as_slice)
    }

    /// Canonical band names, sorted.
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a canonical band to the source name present in `available`.
    ///
    /// Candidates are tried in declaration order; the first present wins.
    pub fn resolve<A>(&self, canonical: &str, available: &A) -> Result<&str, BandNotFoundError>
    where
        A: AvailableBands + ?Sized,
    {
        let candidates = self.aliases(canonical).unwrap_or(&[]);
        candidates
            .iter()
            .find(|candidate| available.has_band(candidate))
            .map(String::as_str)
            .ok_or_else(|| BandNotFoundError {
                band: canonical.to_string(),
                tried: candidates.to_vec(),
            })
    }

    /// Check that every band has at least one candidate and that no source
    /// name is claimed by two canonical bands.
    pub fn validate(&self, layer: &str) -> Result<(), ConfigError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (canonical, aliases) in &self.0 {
            if aliases.is_empty() {
                return Err(ConfigError::EmptyAliasList {
                    layer: layer.to_string(),
                    band: canonical.clone(),
                });
            }
            for alias in aliases {
                if let Some(first) = owners.insert(alias.as_str(), canonical.as_str()) {
                    if first != canonical.as_str() {
                        return Err(ConfigError::DuplicateAlias {
                            layer: layer.to_string(),
                            alias: alias.clone(),
                            first: first.to_string(),
                            second: canonical.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl<K, V, S> FromIterator<(K, V)> for BandAliasMap
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BandAliasMap::new();
        for (canonical, aliases) in iter {
            map.insert(canonical, aliases);
        }
        map
    }
}

/// Resolve `canonical` through `alias_map` against the bands a dataset provides.
pub fn resolve<'a, A>(
    alias_map: &'a BandAliasMap,
    canonical: &str,
    available: &A,
) -> Result<&'a str, BandNotFoundError>
where
    A: AvailableBands + ?Sized,
{
    alias_map.resolve(canonical, available)
}
