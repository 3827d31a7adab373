//! Per-component load state
//!
//! Each component owns one [`StateCell`]. Transitions are computed by the pure
//! [`LoadState::transition`] function and published through a `watch`
//! channel, so any binding layer can subscribe instead of polling.

use crate::client::{ErrorKind, GatewayError};
use tokio::sync::watch;

/// A user-facing failure with its classification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a gateway error while replacing its detail with `message`.
    pub fn from_gateway(error: &GatewayError, message: impl Into<String>) -> Self {
        Self::new(error.kind(), message)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Lifecycle of one asynchronous operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Success(T),
    Error(Failure),
}

/// Inputs to [`LoadState::transition`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<T> {
    Start,
    Succeed(T),
    Fail(Failure),
}

impl<T: Clone> LoadState<T> {
    /// Compute the next state, or `None` if `event` is not legal here.
    ///
    /// `Start` is accepted from any state. Terminal events are only accepted
    /// while `Loading`, so a result can never skip the loading phase.
    pub fn transition(&self, event: Event<T>) -> Option<LoadState<T>> {
        match (self, event) {
            (_, Event::Start) => Some(LoadState::Loading),
            (LoadState::Loading, Event::Succeed(value)) => Some(LoadState::Success(value)),
            (LoadState::Loading, Event::Fail(failure)) => Some(LoadState::Error(failure)),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            LoadState::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Observable state container owned by a single component.
///
/// Only the owner holds the cell itself; everyone else gets a
/// [`watch::Receiver`] from [`StateCell::subscribe`].
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<LoadState<T>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LoadState::Idle);
        Self { tx }
    }

    /// Snapshot of the current state
    pub fn get(&self) -> LoadState<T> {
        self.tx.borrow().clone()
    }

    /// Receive every committed transition
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.tx.subscribe()
    }

    /// Apply an event, returning whether it was accepted.
    pub(crate) fn apply(&self, event: Event<T>) -> bool {
        self.apply_if(event, |_| true)
    }

    /// Apply an event only if `guard` approves the current state.
    ///
    /// The check and the write happen under the same lock.
    pub(crate) fn apply_if(
        &self,
        event: Event<T>,
        guard: impl FnOnce(&LoadState<T>) -> bool,
    ) -> bool {
        self.tx.send_if_modified(|state| {
            if !guard(&*state) {
                return false;
            }
            match state.transition(event) {
                Some(next) => {
                    *state = next;
                    true
                }
                None => false,
            }
        })
    }
}

impl<T: Clone> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> Failure {
        Failure::new(ErrorKind::Transport, "unreachable")
    }

    #[test]
    fn test_transition_table() {
        let idle: LoadState<u8> = LoadState::Idle;
        assert_eq!(idle.transition(Event::Start), Some(LoadState::Loading));
        assert_eq!(idle.transition(Event::Succeed(1)), None);
        assert_eq!(idle.transition(Event::Fail(failure())), None);

        let loading: LoadState<u8> = LoadState::Loading;
        assert_eq!(
            loading.transition(Event::Succeed(1)),
            Some(LoadState::Success(1))
        );
        assert_eq!(
            loading.transition(Event::Fail(failure())),
            Some(LoadState::Error(failure()))
        );

        let done: LoadState<u8> = LoadState::Success(1);
        assert_eq!(done.transition(Event::Succeed(2)), None);
        assert_eq!(done.transition(Event::Start), Some(LoadState::Loading));

        let failed: LoadState<u8> = LoadState::Error(failure());
        assert_eq!(failed.transition(Event::Fail(failure())), None);
        assert_eq!(failed.transition(Event::Start), Some(LoadState::Loading));
    }

    #[test]
    fn test_cell_rejects_terminal_from_idle() {
        let cell: StateCell<u8> = StateCell::new();
        assert!(!cell.apply(Event::Succeed(3)));
        assert!(cell.get().is_idle());
    }

    #[test]
    fn test_cell_notifies_subscribers() {
        let cell: StateCell<u8> = StateCell::new();
        let mut rx = cell.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(cell.apply(Event::Start));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading());

        assert!(cell.apply(Event::Succeed(7)));
        assert_eq!(rx.borrow_and_update().success(), Some(&7));
    }

    #[test]
    fn test_guard_blocks_transition() {
        let cell: StateCell<u8> = StateCell::new();
        let mut rx = cell.subscribe();
        assert!(!cell.apply_if(Event::Start, |state| !state.is_idle()));
        assert!(cell.get().is_idle());
        assert!(!rx.has_changed().unwrap());
    }
}
