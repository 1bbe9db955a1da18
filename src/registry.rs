// Registry client: fetches the version-history document for a package.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::instrument;

use crate::models::PackageDocument;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("package not found: {0}")]
    NotFound(String),
    #[error("invalid package name")]
    InvalidName,
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Document URL for `name`; scoped names keep `@` and encode the slash.
    pub fn document_url(&self, name: &str) -> Result<String, RegistryError> {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidName);
        }
        Ok(format!("{}/{}", self.base_url, name.replace('/', "%2F")))
    }

    #[instrument(skip(self), fields(operation = "fetch_document"))]
    pub async fn fetch(&self, name: &str) -> Result<PackageDocument, RegistryError> {
        let url = self.document_url(name)?;
        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(name.trim().to_owned()));
        }
        let document = response.error_for_status()?.json::<PackageDocument>().await?;
        tracing::debug!(versions = document.versions.len(), "registry document fetched");
        Ok(document)
    }
}
