//! The `{ lastUpdated, profiles }` document and the immutable catalog built from it.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::model::Profile;

/// A record that could not be turned into a [`Profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    /// Position in the feed's `profiles` array.
    pub index: usize,
    pub reason: String,
}

/// Decoded feed document.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub last_updated: Option<String>,
    pub profiles: Vec<Profile>,
    pub dropped: Vec<DroppedRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeed {
    #[serde(default)]
    last_updated: Option<Value>,
    #[serde(default)]
    profiles: Option<Vec<Value>>,
}

impl Feed {
    /// Decode a feed. Records are decoded one by one; a record that has no
    /// usable `id` is dropped and reported in [`Feed::dropped`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawFeed = serde_json::from_str(json)?;
        let records = raw.profiles.ok_or(CatalogError::MissingProfiles)?;

        let last_updated = match raw.last_updated {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        };

        let mut profiles = Vec::with_capacity(records.len());
        let mut dropped = Vec::new();
        for (index, value) in records.into_iter().enumerate() {
            match serde_json::from_value::<Profile>(value) {
                Ok(p) if !p.id.trim().is_empty() => profiles.push(p),
                Ok(_) => dropped.push(DroppedRecord { index, reason: "empty id".into() }),
                Err(e) => dropped.push(DroppedRecord { index, reason: e.to_string() }),
            }
        }
        for d in &dropped {
            warn!(index = d.index, reason = %d.reason, "dropping feed record");
        }

        // Feed order is by id text
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(profiles = profiles.len(), dropped = dropped.len(), "feed decoded");

        Ok(Feed { last_updated, profiles, dropped })
    }
}

/// The full record set. Built once at startup and never mutated afterward;
/// every filtered or sorted view borrows from it.
#[derive(Debug, Default)]
pub struct Catalog {
    profiles: Vec<Profile>,
    last_updated: Option<String>,
}

impl Catalog {
    pub fn new(profiles: Vec<Profile>, last_updated: Option<String>) -> Self {
        Self { profiles, last_updated }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }
}

impl From<Feed> for Catalog {
    fn from(feed: Feed) -> Self {
        Catalog::new(feed.profiles, feed.last_updated)
    }
}
