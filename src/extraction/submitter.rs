//! Extraction submitter

use super::ExtractionRequest;
use crate::client::{Gateway, GatewayError};
use crate::selection::FileSelection;
use crate::state::{Event, Failure, LoadState, StateCell};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Message shown to the operator when a submission fails
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Extraction failed. Check the selected files and that the API is running.";

/// Successful body of `POST /extract/run`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutputs {
    /// Artifact identifiers, in the order the backend produced them
    #[serde(default, deserialize_with = "crate::client::null_as_empty")]
    pub outputs: Vec<String>,
}

pub type ExtractionResult = Result<ExtractionOutputs, Failure>;

/// Submits file selections and publishes their outcome.
///
/// Each call to [`submit`](Self::submit) takes a new submission token. Only
/// the outcome carrying the most recently issued token may be committed to
/// the shared state; an older submission that resolves late is still
/// returned to its caller but never overwrites newer state.
///
/// # Example
/// ```no_run
/// use qdi_ps_client::client::Gateway;
/// use qdi_ps_client::config::BackendConfig;
/// use qdi_ps_client::extraction::ExtractionSubmitter;
/// use qdi_ps_client::selection::{FileSelection, SelectedFile};
///
/// # async fn example() -> eyre::Result<()> {
/// let gateway = Gateway::try_new(&BackendConfig::parse("http://localhost:8000")?)?;
/// let submitter = ExtractionSubmitter::new(gateway);
///
/// let selection = FileSelection {
///     json_files: vec![SelectedFile::from_path("Replication_Task.json")?],
///     mapping_file: Some(SelectedFile::from_path("mapping.tsv")?),
/// };
/// if let Ok(result) = submitter.submit(&selection).await {
///     println!("{} artifact(s)", result.outputs.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExtractionSubmitter {
    gateway: Gateway,
    state: StateCell<ExtractionOutputs>,
    latest: AtomicU64,
    failure_message: String,
}

impl ExtractionSubmitter {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: StateCell::new(),
            latest: AtomicU64::new(0),
            failure_message: EXTRACTION_FAILED_MESSAGE.to_string(),
        }
    }

    /// Replace the operator-facing failure message.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn state(&self) -> LoadState<ExtractionOutputs> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<ExtractionOutputs>> {
        self.state.subscribe()
    }

    /// Submit a selection and wait for the backend's answer.
    ///
    /// Issues exactly one request, with no retry. Failures are logged in full
    /// and surfaced as a [`Failure`] carrying the generic message.
    pub async fn submit(&self, selection: &FileSelection) -> ExtractionResult {
        let token = self.next_token();
        self.start(token);

        log::info!(
            "Submitting extraction #{}: {} JSON file(s), mapping file {}",
            token,
            selection.json_files.len(),
            selection
                .mapping_file
                .as_ref()
                .map(|f| f.name.as_str())
                .unwrap_or("<none>")
        );

        let result = match self.send(selection).await {
            Ok(outputs) => {
                log::info!(
                    "Extraction #{} produced {} artifact(s)",
                    token,
                    outputs.outputs.len()
                );
                Ok(outputs)
            }
            Err(e) => {
                log::error!("Extraction #{} failed: {}", token, e);
                Err(Failure::from_gateway(&e, self.failure_message.as_str()))
            }
        };

        self.commit(token, &result);
        result
    }

    fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Move to `Loading`, unless a newer submission has already taken over.
    fn start(&self, token: u64) -> bool {
        let started = self.state.apply_if(Event::Start, |_| self.is_latest(token));
        if !started {
            log::debug!("Extraction #{} superseded before it started", token);
        }
        started
    }

    /// Publish an outcome, unless a newer submission has taken over.
    fn commit(&self, token: u64, result: &ExtractionResult) -> bool {
        let event = match result {
            Ok(outputs) => Event::Succeed(outputs.clone()),
            Err(failure) => Event::Fail(failure.clone()),
        };
        let committed = self.state.apply_if(event, |_| self.is_latest(token));
        if !committed {
            log::debug!("Discarding outcome of superseded extraction #{}", token);
        }
        committed
    }

    async fn send(&self, selection: &FileSelection) -> Result<ExtractionOutputs, GatewayError> {
        let request = ExtractionRequest::from_selection(selection);
        log::debug!(
            "Packaging {} part(s), {} byte(s)",
            request.part_count(),
            request.payload_len()
        );
        let form = request.into_form()?;
        self.gateway
            .post_multipart_json(&["extract", "run"], form)
            .await
    }
}
