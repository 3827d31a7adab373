//! Extraction service transport.
//!
//! This module provides the [`Gateway`] for issuing requests against the
//! configured backend origin, along with its error taxonomy ([`GatewayError`],
//! [`ErrorKind`]).

mod error;
mod gateway;

pub use error::{ErrorKind, GatewayError};
pub use gateway::Gateway;
pub(crate) use gateway::null_as_empty;
