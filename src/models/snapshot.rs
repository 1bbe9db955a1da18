// Package snapshot pushed by the upstream channel

use serde::{Deserialize, Serialize};

use super::lenient;

/// Session identifier minted by each track request; inbound updates carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Maintainer {
    /// Registry username when present, otherwise the display name.
    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.name.as_deref())
    }
}

/// Latest statistics for the tracked package. Superseded wholesale by the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub estimated_downloads: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub weekly_downloads: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub total_downloads: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub current_version: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_published: Option<String>,
    #[serde(default, deserialize_with = "lenient::maintainers")]
    pub maintainers: Vec<Maintainer>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub repository: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub maintenance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub popularity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub quality: Option<f64>,
}

impl Snapshot {
    /// Comma-joined maintainer names, skipping entries with neither field.
    pub fn maintainer_names(&self) -> String {
        self.maintainers
            .iter()
            .filter_map(Maintainer::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Publish date of the current version, if `lastPublished` is an RFC 3339 timestamp.
    pub fn last_published_date(&self) -> Option<chrono::NaiveDate> {
        let raw = self.last_published.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

/// A snapshot plus the session it was delivered for.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSnapshot {
    pub session: SessionId,
    pub snapshot: Snapshot,
}

/// Outbound subscribe request forwarded to the channel client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub session: SessionId,
    pub name: String,
}
