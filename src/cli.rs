//! CLI helper functions
//!
//! The binding layer between the terminal and the library components. Each
//! helper builds the components it needs, drives them, and hands back
//! something `main` can print.

use crate::{
    capabilities::{CapabilityFetcher, CapabilityView},
    client::Gateway,
    config::BackendConfig,
    extraction::ExtractionSubmitter,
    outputs::{DownloadReference, OutputRegistry, save_artifact},
    selection::{FileSelectionStore, SelectedFile},
};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Build a gateway from an explicit URL or the environment
///
/// Expected environment variables:
/// - QDI_API_BASE_URL: extraction service origin (required unless `api_url` is given)
pub fn load_gateway(api_url: Option<&str>) -> Result<Gateway> {
    let config = match api_url {
        Some(url) => BackendConfig::parse(url)?,
        None => BackendConfig::from_env()?,
    };
    log::debug!("Using extraction service at {}", config);
    Gateway::try_new(&config).context("Failed to create gateway")
}

/// Submit JSON task exports plus a mapping file and list the artifacts
///
/// When `download_dir` is given every artifact is also saved there.
pub async fn run_extraction(
    gateway: &Gateway,
    json_files: &[PathBuf],
    mapping_file: Option<&Path>,
    download_dir: Option<&Path>,
) -> Result<Vec<DownloadReference>> {
    let store = FileSelectionStore::new();

    let files = json_files
        .iter()
        .map(SelectedFile::from_path)
        .collect::<Result<Vec<_>>>()?;
    store.set_json_files(files);

    match mapping_file {
        Some(path) => store.set_mapping_file(Some(SelectedFile::from_path(path)?)),
        None => log::warn!("No mapping file selected, the service will likely reject this"),
    }
    if json_files.is_empty() {
        log::warn!("No JSON files selected");
    }

    let submitter = ExtractionSubmitter::new(gateway.clone());
    if let Err(failure) = submitter.submit(&store.snapshot()).await {
        eyre::bail!("{}", failure);
    }

    let registry = OutputRegistry::new(gateway.clone());
    let references = registry.references_for(&submitter.state())?;

    if let Some(dir) = download_dir {
        download_artifacts(
            gateway,
            references.iter().map(|r| r.identifier.as_str()),
            dir,
        )
        .await?;
    }

    Ok(references)
}

/// Activate capability discovery and return the view to render
pub async fn show_capabilities(gateway: &Gateway) -> CapabilityView {
    let fetcher = CapabilityFetcher::new(gateway.clone());
    fetcher.activate().await;
    fetcher.view()
}

/// Download artifacts into `dir`, returning the written paths in order
pub async fn download_artifacts<'a>(
    gateway: &Gateway,
    identifiers: impl IntoIterator<Item = &'a str>,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::new();
    for identifier in identifiers {
        let path = save_artifact(gateway, identifier, dir).await?;
        log::info!("✓ Downloaded {} to {}", identifier, path.display());
        written.push(path);
    }
    Ok(written)
}
