//! Pool error types.

use fleet_core::RunState;
use fleet_provider::ProviderError;
use thiserror::Error;

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("group identifier must not be empty")]
    EmptyGroup,

    #[error("invalid name filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("[{group} - {filter}] pool unavailable")]
    Unavailable { group: String, filter: String },

    #[error("[{group} - {filter}] no {state} instances available")]
    NoCandidates {
        group: String,
        filter: String,
        state: RunState,
    },

    #[error("[{group} - {filter}] timed out waiting for instances to reach {state}")]
    WaitTimeout {
        group: String,
        filter: String,
        state: RunState,
    },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
