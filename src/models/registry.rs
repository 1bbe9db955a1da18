// Package registry documents (version history per package)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A person field: npm allows either "Name <mail>" strings or objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Raw(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl Person {
    pub fn name(&self) -> Option<&str> {
        match self {
            Person::Raw(s) => Some(s.as_str()),
            Person::Detailed { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contributors {
    Many(Vec<Person>),
    One(Person),
}

impl Contributors {
    pub fn names(&self) -> Vec<String> {
        let people: &[Person] = match self {
            Contributors::Many(v) => v,
            Contributors::One(p) => std::slice::from_ref(p),
        };
        people
            .iter()
            .filter_map(Person::name)
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    Spdx(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl License {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            License::Spdx(s) => Some(s.as_str()),
            License::Detailed { kind, .. } => kind.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bugs {
    Url(String),
    Detailed {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl Bugs {
    pub fn url(&self) -> Option<&str> {
        match self {
            Bugs::Url(s) => Some(s.as_str()),
            Bugs::Detailed { url, .. } => url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dist {
    #[serde(default)]
    pub tarball: Option<String>,
    #[serde(default)]
    pub shasum: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub author: Option<Person>,
    #[serde(default)]
    pub contributors: Option<Contributors>,
    #[serde(default)]
    pub bugs: Option<Bugs>,
    #[serde(default)]
    pub dist: Option<Dist>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// Full registry document keyed by version string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionEntry>,
    /// Publish timestamps by version, plus `created`/`modified`.
    #[serde(default)]
    pub time: BTreeMap<String, String>,
}

/// One flattened row per version, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version: String,
    pub published: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
    pub contributors: Vec<String>,
    pub bugs_url: Option<String>,
    pub tarball: Option<String>,
    pub shasum: Option<String>,
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHistory {
    pub name: String,
    pub dist_tags: BTreeMap<String, String>,
    pub versions: Vec<VersionSummary>,
}

impl PackageDocument {
    pub fn version_summaries(&self) -> Vec<VersionSummary> {
        self.versions
            .iter()
            .map(|(version, entry)| {
                let dist = entry.dist.clone().unwrap_or_default();
                VersionSummary {
                    version: version.clone(),
                    published: self.time.get(version).cloned(),
                    description: entry.description.clone(),
                    license: entry
                        .license
                        .as_ref()
                        .and_then(License::as_str)
                        .map(str::to_owned),
                    author: entry.author.as_ref().and_then(Person::name).map(str::to_owned),
                    contributors: entry
                        .contributors
                        .as_ref()
                        .map(Contributors::names)
                        .unwrap_or_default(),
                    bugs_url: entry.bugs.as_ref().and_then(Bugs::url).map(str::to_owned),
                    tarball: dist.tarball,
                    shasum: dist.shasum,
                    dependencies: entry.dependencies.clone(),
                }
            })
            .collect()
    }

    pub fn into_history(self) -> VersionHistory {
        VersionHistory {
            versions: self.version_summaries(),
            name: self.name,
            dist_tags: self.dist_tags,
        }
    }
}
