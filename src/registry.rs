//! Channel registry access
//!
//! The registry itself is an external collaborator; the proxy only depends
//! on a lookup-by-id read. [`ChannelRegistry`] is that seam, and
//! [`StaticChannelRegistry`] is a read-only in-process implementation
//! loaded from a JSON file at startup so the binary can serve requests and
//! tests can inject fixtures.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A single channel entry as stored by the registry.
///
/// `id` and `origin_url` are required; the display metadata is carried for
/// registry consumers but unused by the proxy logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub logo: String,
    /// Absolute URL of the channel's primary manifest on the origin server.
    /// Malformed values are tolerated downstream by the path resolver's
    /// concatenation fallback, but an empty value is rejected on load.
    #[serde(rename = "url")]
    pub origin_url: String,
}

/// Read interface the proxy consumes.
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    async fn lookup(&self, id: &str) -> Option<ChannelRecord>;
}

/// In-memory registry built once at startup.
pub struct StaticChannelRegistry {
    channels: HashMap<String, ChannelRecord>,
}

impl StaticChannelRegistry {
    /// Build a registry from channel records, validating required fields.
    pub fn new(records: Vec<ChannelRecord>) -> Result<Self> {
        let mut channels = HashMap::with_capacity(records.len());
        for record in records {
            if record.id.is_empty() {
                return Err(Error::invalid_channel("channel record with empty id"));
            }
            if record.origin_url.is_empty() {
                return Err(Error::invalid_channel(format!(
                    "channel '{}' has an empty origin url",
                    record.id
                )));
            }
            channels.insert(record.id.clone(), record);
        }
        Ok(Self { channels })
    }

    /// Load channel records from a JSON file (an array of records).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let records: Vec<ChannelRecord> = serde_json::from_str(&contents)?;
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl ChannelRegistry for StaticChannelRegistry {
    async fn lookup(&self, id: &str) -> Option<ChannelRecord> {
        self.channels.get(id).cloned()
    }
}
