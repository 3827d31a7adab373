//! Multipart packaging of a file selection

use crate::client::GatewayError;
use crate::selection::{FileSelection, SelectedFile};
use reqwest::multipart::{Form, Part};

/// Repeated form field carrying each JSON task export
pub const JSON_FILES_FIELD: &str = "json_files";

/// Single form field carrying the delimited mapping file
pub const MAPPING_FILE_FIELD: &str = "tsv_file";

/// One outbound extraction request, built per submit and then consumed.
///
/// The selection is forwarded as-is: an empty JSON set or a missing mapping
/// file simply yields fewer parts, and the backend decides what to reject.
#[derive(Debug)]
pub struct ExtractionRequest {
    parts: Vec<(&'static str, SelectedFile)>,
}

impl ExtractionRequest {
    pub fn from_selection(selection: &FileSelection) -> Self {
        let parts = selection
            .json_files
            .iter()
            .cloned()
            .map(|file| (JSON_FILES_FIELD, file))
            .chain(
                selection
                    .mapping_file
                    .clone()
                    .map(|file| (MAPPING_FILE_FIELD, file)),
            )
            .collect();
        Self { parts }
    }

    /// Number of file parts in the payload
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Field name and file name of each part, in payload order
    pub fn manifest(&self) -> Vec<(&'static str, &str)> {
        self.parts
            .iter()
            .map(|(field, file)| (*field, file.name.as_str()))
            .collect()
    }

    /// Total payload size in bytes, excluding multipart framing
    pub fn payload_len(&self) -> usize {
        self.parts.iter().map(|(_, file)| file.len()).sum()
    }

    /// Build the multipart body.
    pub fn into_form(self) -> Result<Form, GatewayError> {
        self.parts
            .into_iter()
            .try_fold(Form::new(), |form, (field, file)| {
                let part = Part::bytes(file.bytes)
                    .file_name(file.name.clone())
                    .mime_str(&file.content_type)
                    .map_err(|e| {
                        GatewayError::InvalidRequest(format!(
                            "content type '{}' for {}: {}",
                            file.content_type, file.name, e
                        ))
                    })?;
                Ok(form.part(field, part))
            })
    }
}
