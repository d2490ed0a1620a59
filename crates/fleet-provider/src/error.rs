//! Provider error types.

use fleet_core::InstanceId;
use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors a compute provider can report.
///
/// These are terminal for the invocation that triggered them; no layer
/// of this system retries provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("enumeration failed: {0}")]
    Enumerate(String),

    #[error("transition request failed: {0}")]
    Transition(String),

    #[error("wait for state failed: {0}")]
    Wait(String),

    #[error("unknown instance: {0}")]
    UnknownInstance(InstanceId),
}
