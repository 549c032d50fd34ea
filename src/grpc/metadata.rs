//! Outbound request metadata
//!
//! Unlike a request body, metadata is a multimap: adding the same key
//! twice keeps both values, in insertion order.

use serde::Serialize;
use tonic::metadata::{
    AsciiMetadataKey, AsciiMetadataValue, BinaryMetadataKey, BinaryMetadataValue, MetadataMap,
};

use crate::common::{Error, Result};

/// Ordered collection of metadata entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; keys are normalised to lower case
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_ascii_lowercase(), value.into()));
    }

    /// All values recorded for `key`, in insertion order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to a tonic metadata map
    ///
    /// Keys ending in `-bin` carry binary values, everything else must be
    /// valid ASCII header text.
    pub fn to_metadata_map(&self) -> Result<MetadataMap> {
        let mut map = MetadataMap::new();
        for (key, value) in self.iter() {
            if key.ends_with("-bin") {
                let name = BinaryMetadataKey::from_bytes(key.as_bytes())
                    .map_err(|e| Error::invalid_metadata(key, e))?;
                map.append_bin(name, BinaryMetadataValue::from_bytes(value.as_bytes()));
            } else {
                let name = AsciiMetadataKey::from_bytes(key.as_bytes())
                    .map_err(|e| Error::invalid_metadata(key, e))?;
                let value = AsciiMetadataValue::try_from(value)
                    .map_err(|e| Error::invalid_metadata(key, e))?;
                map.append(name, value);
            }
        }
        Ok(map)
    }
}
