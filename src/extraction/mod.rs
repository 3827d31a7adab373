//! Extraction submission
//!
//! Packages the current [`FileSelection`](crate::selection::FileSelection)
//! into one multipart request against `POST /extract/run` and tracks the
//! outcome in a [`StateCell`](crate::state::StateCell).

mod request;
mod submitter;

pub use request::{ExtractionRequest, JSON_FILES_FIELD, MAPPING_FILE_FIELD};
pub use submitter::{
    EXTRACTION_FAILED_MESSAGE, ExtractionOutputs, ExtractionResult, ExtractionSubmitter,
};
