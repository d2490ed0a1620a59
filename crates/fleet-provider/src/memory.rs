//! In-memory simulation provider.
//!
//! Backs the `memory` provider kind in fleetctl and the happy-path tests
//! in fleet-pool. Instances live in a group-scoped table; start/stop move
//! them into the `Pending`/`Stopping` transitional states and
//! `await_state` completes the transition, so the pool exercises the same
//! submit-then-wait sequence a real backend requires.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use fleet_core::{InstanceId, InstanceRecord, RunState};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::ComputeProvider;

/// Group-scoped in-memory instance table.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    groups: RwLock<HashMap<String, Vec<InstanceRecord>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group with records at construction.
    pub fn with_instances(group: &str, records: Vec<InstanceRecord>) -> Self {
        let provider = Self::new();
        for record in records {
            provider.insert(group, record);
        }
        provider
    }

    /// Add one instance to a group.
    pub fn insert(&self, group: &str, record: InstanceRecord) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        groups.entry(group.to_string()).or_default().push(record);
    }

    /// Remove every instance in a group.
    pub fn clear_group(&self, group: &str) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        groups.remove(group);
    }

    /// Current run state of an instance, if it exists in any group.
    pub fn state_of(&self, id: &InstanceId) -> Option<RunState> {
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        groups
            .values()
            .flatten()
            .find(|r| &r.id == id)
            .map(|r| r.state)
    }

    /// Apply `apply` to each of `ids`, erroring on the first unknown id.
    fn transition(
        &self,
        ids: &[InstanceId],
        apply: impl Fn(RunState) -> RunState,
    ) -> ProviderResult<()> {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            let record = groups
                .values_mut()
                .flatten()
                .find(|r| &r.id == id)
                .ok_or_else(|| ProviderError::UnknownInstance(id.clone()))?;
            record.state = apply(record.state);
        }
        Ok(())
    }
}

#[async_trait]
impl ComputeProvider for MemoryProvider {
    async fn describe_instances(
        &self,
        group: &str,
        max_results: u32,
    ) -> ProviderResult<Vec<InstanceRecord>> {
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        let records = groups
            .get(group)
            .map(|records| {
                records
                    .iter()
                    .take(max_results as usize)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        debug!(group, count = records.len(), "described instances");
        Ok(records)
    }

    async fn start_instances(&self, ids: &[InstanceId]) -> ProviderResult<()> {
        debug!(?ids, "bulk start submitted");
        self.transition(ids, |state| match state {
            RunState::Running => RunState::Running,
            _ => RunState::Pending,
        })
    }

    async fn stop_instances(&self, ids: &[InstanceId]) -> ProviderResult<()> {
        debug!(?ids, "bulk stop submitted");
        self.transition(ids, |state| match state {
            RunState::Stopped => RunState::Stopped,
            _ => RunState::Stopping,
        })
    }

    async fn await_state(&self, ids: &[InstanceId], target: RunState) -> ProviderResult<()> {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            let record = groups
                .values_mut()
                .flatten()
                .find(|r| &r.id == id)
                .ok_or_else(|| ProviderError::UnknownInstance(id.clone()))?;

            // Complete an in-flight transition, or verify the target.
            match (record.state, target) {
                (state, target) if state == target => {}
                (RunState::Pending, RunState::Running) => record.state = RunState::Running,
                (RunState::Stopping, RunState::Stopped) => record.state = RunState::Stopped,
                (state, target) => {
                    return Err(ProviderError::Wait(format!(
                        "instance {id} is {state}, will not reach {target}"
                    )));
                }
            }
        }
        debug!(?ids, %target, "instances converged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryProvider {
        MemoryProvider::with_instances(
            "vpc-1",
            vec![
                InstanceRecord::new("i-1", RunState::Running).with_name("web-1"),
                InstanceRecord::new("i-2", RunState::Stopped).with_name("web-2"),
            ],
        )
    }

    #[tokio::test]
    async fn describe_is_scoped_by_group() {
        let provider = seeded();
        provider.insert(
            "vpc-2",
            InstanceRecord::new("i-9", RunState::Running).with_name("web-9"),
        );

        let records = provider.describe_instances("vpc-1", 100).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.id.as_str() != "i-9"));
    }

    #[tokio::test]
    async fn describe_respects_max_results() {
        let provider = seeded();
        let records = provider.describe_instances("vpc-1", 1).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn describe_unknown_group_is_empty() {
        let provider = seeded();
        let records = provider.describe_instances("vpc-404", 100).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn start_moves_through_pending_to_running() {
        let provider = seeded();
        let ids = vec![InstanceId::from("i-2")];

        provider.start_instances(&ids).await.unwrap();
        assert_eq!(provider.state_of(&ids[0]), Some(RunState::Pending));

        provider.await_state(&ids, RunState::Running).await.unwrap();
        assert_eq!(provider.state_of(&ids[0]), Some(RunState::Running));
    }

    #[tokio::test]
    async fn stop_moves_through_stopping_to_stopped() {
        let provider = seeded();
        let ids = vec![InstanceId::from("i-1")];

        provider.stop_instances(&ids).await.unwrap();
        assert_eq!(provider.state_of(&ids[0]), Some(RunState::Stopping));

        provider.await_state(&ids, RunState::Stopped).await.unwrap();
        assert_eq!(provider.state_of(&ids[0]), Some(RunState::Stopped));
    }

    #[tokio::test]
    async fn transition_on_unknown_id_errors() {
        let provider = seeded();
        let result = provider
            .start_instances(&[InstanceId::from("i-404")])
            .await;
        assert!(matches!(result, Err(ProviderError::UnknownInstance(_))));
    }

    #[tokio::test]
    async fn await_state_rejects_diverged_instance() {
        let provider = seeded();
        // i-2 is stopped and no start was submitted.
        let result = provider
            .await_state(&[InstanceId::from("i-2")], RunState::Running)
            .await;
        assert!(matches!(result, Err(ProviderError::Wait(_))));
    }

    #[tokio::test]
    async fn clear_group_removes_all_instances() {
        let provider = seeded();
        provider.clear_group("vpc-1");
        let records = provider.describe_instances("vpc-1", 100).await.unwrap();
        assert!(records.is_empty());
    }
}
