//! The `ComputeProvider` capability trait.

use async_trait::async_trait;
use fleet_core::{InstanceId, InstanceRecord, RunState};

use crate::error::ProviderResult;

/// A pluggable compute backend.
///
/// All calls are scoped by a group identifier (the membership boundary,
/// e.g. a network identifier). Implementations must be safe to share
/// across tasks (`Send + Sync`); the pool holds one behind an `Arc`.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Enumerate instances in `group`, up to `max_results` (one page;
    /// deeper pagination is the implementation's concern, not the
    /// caller's).
    async fn describe_instances(
        &self,
        group: &str,
        max_results: u32,
    ) -> ProviderResult<Vec<InstanceRecord>>;

    /// Submit one bulk start request for exactly `ids`.
    async fn start_instances(&self, ids: &[InstanceId]) -> ProviderResult<()>;

    /// Submit one bulk stop request for exactly `ids`.
    async fn stop_instances(&self, ids: &[InstanceId]) -> ProviderResult<()>;

    /// Block until every instance in `ids` reaches `target`, or the
    /// provider reports the transition failed. Callers bound this with
    /// their own deadline; the trait itself imposes none.
    async fn await_state(&self, ids: &[InstanceId], target: RunState) -> ProviderResult<()>;
}
