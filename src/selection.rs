//! Operator file selection
//!
//! Holds the JSON task exports and the delimited mapping file chosen for the
//! next submission. Setters replace the current value wholesale; nothing here
//! validates names, sizes, or contents.

use eyre::{Context, Result};
use std::path::Path;
use tokio::sync::watch;

/// One file picked by the operator, held in memory until submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Create a file from in-memory content, inferring its content type from
    /// the name's extension.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).to_string();
        Self {
            name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The part name is the path's file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Content type used when packaging a part. Informational only.
fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => "application/json",
        "tsv" => "text/tab-separated-values",
        "csv" => "text/csv",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// The JSON file set plus the single mapping file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSelection {
    pub json_files: Vec<SelectedFile>,
    pub mapping_file: Option<SelectedFile>,
}

impl FileSelection {
    /// A submission is well-formed only when the mapping file is present.
    pub fn is_well_formed(&self) -> bool {
        self.mapping_file.is_some()
    }

    /// Number of file parts a submission of this selection carries
    pub fn part_count(&self) -> usize {
        self.json_files.len() + usize::from(self.mapping_file.is_some())
    }
}

/// Session-scoped holder of the current [`FileSelection`].
///
/// Every replacement is published so dependent views can re-render.
#[derive(Debug)]
pub struct FileSelectionStore {
    tx: watch::Sender<FileSelection>,
}

impl FileSelectionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(FileSelection::default());
        Self { tx }
    }

    /// Replace the JSON file set. No merge with the previous set.
    pub fn set_json_files(&self, files: Vec<SelectedFile>) {
        log::debug!("Selected {} JSON file(s)", files.len());
        self.tx.send_modify(|selection| selection.json_files = files);
    }

    /// Replace (or clear) the mapping file.
    pub fn set_mapping_file(&self, file: Option<SelectedFile>) {
        match &file {
            Some(f) => log::debug!("Selected mapping file {}", f.name),
            None => log::debug!("Cleared mapping file"),
        }
        self.tx.send_modify(|selection| selection.mapping_file = file);
    }

    /// Clone of the current selection
    pub fn snapshot(&self) -> FileSelection {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FileSelection> {
        self.tx.subscribe()
    }
}

impl Default for FileSelectionStore {
    fn default() -> Self {
        Self::new()
    }
}
