//! Supported connector discovery
//!
//! Fetches `GET /info/supported` once per activation and renders the
//! source/target connector names with distinct loading, error, and empty
//! notices.

use crate::client::{Gateway, GatewayError};
use crate::state::{Event, Failure, LoadState, StateCell};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Default message shown when the capability request fails
pub const CAPABILITIES_FAILED_MESSAGE: &str =
    "Could not load supported components. Is the API running?";

pub const LOADING_NOTICE: &str = "Loading supported components...";
pub const EMPTY_NOTICE: &str = "No supported sources or targets were returned from the API.";
pub const NONE_CONFIGURED: &str = "None configured.";
pub const HEADING: &str = "Supported Data Connectors";
pub const SOURCES_HEADING: &str = "Source Connectors (Data Input)";
pub const TARGETS_HEADING: &str = "Target Connectors (Data Output)";

/// Connector names supported by the backend
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(default, deserialize_with = "crate::client::null_as_empty")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "crate::client::null_as_empty")]
    pub targets: Vec<String>,
}

impl CapabilitySet {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }
}

/// The underlying capability request. Stateless, so repeated calls against
/// the same backend state yield the same set.
pub async fn fetch_supported(gateway: &Gateway) -> Result<CapabilitySet, GatewayError> {
    gateway.get_json(&["info", "supported"]).await
}

/// What a capability panel should show for a given state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapabilityView {
    /// Nothing requested yet
    Hidden,
    Loading,
    Error(String),
    /// Fetch succeeded with no sources and no targets
    Empty,
    Lists {
        sources: Vec<String>,
        targets: Vec<String>,
    },
}

impl CapabilityView {
    pub fn from_state(state: &LoadState<CapabilitySet>) -> Self {
        match state {
            LoadState::Idle => Self::Hidden,
            LoadState::Loading => Self::Loading,
            LoadState::Error(failure) => Self::Error(failure.message.clone()),
            LoadState::Success(set) if set.is_empty() => Self::Empty,
            LoadState::Success(set) => Self::Lists {
                sources: set.sources.clone(),
                targets: set.targets.clone(),
            },
        }
    }

    /// Plain-text rendering, one line per entry.
    ///
    /// Each list falls back to its own placeholder when empty, even if the
    /// other list has entries.
    pub fn render(&self) -> Vec<String> {
        match self {
            Self::Hidden => Vec::new(),
            Self::Loading => vec![LOADING_NOTICE.to_string()],
            Self::Error(message) => vec![format!("Error: {}", message)],
            Self::Empty => vec![EMPTY_NOTICE.to_string()],
            Self::Lists { sources, targets } => {
                let mut lines = vec![HEADING.to_string()];
                for (heading, items) in [(SOURCES_HEADING, sources), (TARGETS_HEADING, targets)] {
                    lines.push(heading.to_string());
                    if items.is_empty() {
                        lines.push(format!("  {}", NONE_CONFIGURED));
                    } else {
                        lines.extend(items.iter().map(|item| format!("  - {}", item)));
                    }
                }
                lines
            }
        }
    }
}

/// Fetch-once capability discovery.
///
/// The first [`activate`](Self::activate) moves `Idle → Loading` and issues
/// the request; later activations return the current state without touching
/// the network. There is no automatic retry.
#[derive(Debug)]
pub struct CapabilityFetcher {
    gateway: Gateway,
    state: StateCell<CapabilitySet>,
    failure_message: String,
}

impl CapabilityFetcher {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: StateCell::new(),
            failure_message: CAPABILITIES_FAILED_MESSAGE.to_string(),
        }
    }

    /// Replace the operator-facing failure message.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn state(&self) -> LoadState<CapabilitySet> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<CapabilitySet>> {
        self.state.subscribe()
    }

    pub fn view(&self) -> CapabilityView {
        CapabilityView::from_state(&self.state.get())
    }

    /// Activate the fetcher, issuing the request only on first activation.
    pub async fn activate(&self) -> LoadState<CapabilitySet> {
        if !self.state.apply_if(Event::Start, LoadState::is_idle) {
            log::debug!("Capabilities already requested, skipping fetch");
            return self.state.get();
        }

        let event = match fetch_supported(&self.gateway).await {
            Ok(set) => {
                log::info!(
                    "Backend supports {} source(s) and {} target(s)",
                    set.sources.len(),
                    set.targets.len()
                );
                Event::Succeed(set)
            }
            Err(e) => {
                log::error!("Error fetching supported sources/targets: {}", e);
                Event::Fail(Failure::from_gateway(&e, self.failure_message.as_str()))
            }
        };
        self.state.apply(event);
        self.state.get()
    }
}
