//! Output artifact references
//!
//! Turns artifact identifiers into references to the backend's
//! `GET /download/{identifier}` operation. The registry never fetches content;
//! [`save_artifact`] is the separate helper that does.

use crate::client::{Gateway, GatewayError};
use crate::extraction::ExtractionOutputs;
use crate::state::LoadState;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// A retrievable output artifact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadReference {
    pub identifier: String,
    pub url: Url,
}

impl std::fmt::Display for DownloadReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.identifier, self.url)
    }
}

/// Renders artifact identifiers as download references
#[derive(Clone, Debug)]
pub struct OutputRegistry {
    gateway: Gateway,
}

impl OutputRegistry {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// One reference per identifier, in the given order.
    pub fn references(
        &self,
        identifiers: &[String],
    ) -> Result<Vec<DownloadReference>, GatewayError> {
        identifiers
            .iter()
            .map(|identifier| {
                Ok(DownloadReference {
                    identifier: identifier.clone(),
                    url: self.gateway.download_url(identifier)?,
                })
            })
            .collect()
    }

    /// References for a submitter state. Anything but `Success` renders nothing.
    pub fn references_for(
        &self,
        state: &LoadState<ExtractionOutputs>,
    ) -> Result<Vec<DownloadReference>, GatewayError> {
        match state.success() {
            Some(result) => self.references(&result.outputs),
            None => Ok(Vec::new()),
        }
    }
}

/// Local file name for an identifier: its last non-empty `/` segment.
pub fn local_file_name(identifier: &str) -> Option<&str> {
    identifier
        .rsplit('/')
        .find(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
}

/// Download one artifact into `dir`, returning the written path.
pub async fn save_artifact(
    gateway: &Gateway,
    identifier: &str,
    dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let name = local_file_name(identifier)
        .ok_or_else(|| eyre::eyre!("Artifact identifier '{}' has no file name", identifier))?;

    let bytes = gateway
        .download(identifier)
        .await
        .with_context(|| format!("Failed to download artifact '{}'", identifier))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))?;

    log::debug!("Wrote {} byte(s) to {}", bytes.len(), path.display());
    Ok(path)
}
