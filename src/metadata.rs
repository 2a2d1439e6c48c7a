//! General-purpose metadata dictionary.
//!
//! Generalizes `gdal::Metadata` (a trait over an FFI major-object pointer,
//! backed by `GDALGetMetadataItem`/`GDALGetMetadataDomainList`) to a plain
//! in-memory dictionary: this driver never hands a `Product` to libgdal, so
//! there is no `GDALMajorObjectH` to query. The domain/key-value shape and
//! the `MetadataEntry`/iterator surface are kept so callers migrating from
//! `gdal::Metadata` feel at home.

use std::collections::BTreeMap;

/// Standalone metadata entry, as produced by [`MetadataDict::iter`].
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct MetadataEntry {
    pub domain: String,
    pub key: String,
    pub value: String,
}

/// A domain-organized string dictionary, the root domain keyed by `""`.
#[derive(Debug, Clone, Default)]
pub struct MetadataDict {
    domains: BTreeMap<String, Vec<(String, String)>>,
}

impl MetadataDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key` in the root (`""`) domain.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set_in(String::new(), key, value);
    }

    /// Insert or overwrite `key` in `domain`.
    pub fn set_in(&mut self, domain: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        let domain = domain.into();
        let key = key.into();
        let value = value.into();
        let entries = self.domains.entry(domain).or_default();
        if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    pub fn item(&self, key: &str, domain: &str) -> Option<&str> {
        self.domains
            .get(domain)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn domain(&self, domain: &str) -> Option<&[(String, String)]> {
        self.domains.get(domain).map(Vec::as_slice)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = MetadataEntry> + '_ {
        self.domains.iter().flat_map(|(domain, entries)| {
            entries.iter().map(move |(key, value)| MetadataEntry {
                domain: domain.clone(),
                key: key.clone(),
                value: value.clone(),
            })
        })
    }
}
