//! QDI PS Client
//!
//! Submits replication task exports plus a mapping file to the QDI extraction
//! service, tracks the outcome, and exposes the resulting artifacts.

pub mod capabilities;
pub mod cli;
pub mod client;
pub mod config;
pub mod extraction;
pub mod outputs;
pub mod selection;
pub mod state;

// Re-exports for convenience
pub use capabilities::{CapabilityFetcher, CapabilitySet, CapabilityView};
pub use client::{ErrorKind, Gateway, GatewayError};
pub use config::BackendConfig;
pub use extraction::{ExtractionOutputs, ExtractionResult, ExtractionSubmitter};
pub use outputs::{DownloadReference, OutputRegistry};
pub use selection::{FileSelection, FileSelectionStore, SelectedFile};
pub use state::{Event, Failure, LoadState, StateCell};
