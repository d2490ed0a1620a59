//! The pool: guarded bucket state, refresh, and bulk start/stop.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use fleet_core::{InstanceId, InstanceRecord, RunState};
use fleet_provider::ComputeProvider;

use crate::error::{PoolError, PoolResult};

/// Construction parameters for a pool.
#[derive(Debug, Clone)]
pub struct PoolSpec {
    /// Scoping boundary for membership (e.g. a network identifier).
    pub group: String,
    /// Regular expression tested against instance display names.
    pub filter: String,
    /// Maximum instances fetched per enumeration (single page).
    pub max_results: u32,
    /// Deadline for wait-for-convergence after a bulk transition.
    pub wait_timeout: Duration,
}

impl PoolSpec {
    /// A spec with default page bound (1000) and wait deadline (300s).
    pub fn new(group: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            filter: filter.into(),
            max_results: 1000,
            wait_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }
}

/// The state the data guard protects, as a single unit.
#[derive(Debug, Default)]
struct Buckets {
    /// True iff the most recent refresh found at least one match.
    available: bool,
    running: Vec<InstanceRecord>,
    stopped: Vec<InstanceRecord>,
}

impl Buckets {
    fn bucket(&self, state: RunState) -> &[InstanceRecord] {
        match state {
            RunState::Running => &self.running,
            RunState::Stopped => &self.stopped,
            _ => &[],
        }
    }
}

/// Direction of a bulk transition.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Start,
    Stop,
}

impl Direction {
    /// The bucket candidates are drawn from.
    fn source(self) -> RunState {
        match self {
            Direction::Start => RunState::Stopped,
            Direction::Stop => RunState::Running,
        }
    }

    /// The state candidates converge on.
    fn target(self) -> RunState {
        match self {
            Direction::Start => RunState::Running,
            Direction::Stop => RunState::Stopped,
        }
    }
}

/// A cached, name-filtered view of one group's instances, plus the bulk
/// operations that mutate provider state.
///
/// The data guard (`buckets`) is held only for in-memory reads/writes.
/// The mutation lock serializes `start`/`stop` end-to-end, so two
/// mutations on the same pool cannot select overlapping candidates.
/// Provider calls are never made under the data guard.
pub struct Pool {
    provider: Arc<dyn ComputeProvider>,
    group: String,
    filter: Regex,
    filter_str: String,
    max_results: u32,
    wait_timeout: Duration,
    buckets: Mutex<Buckets>,
    mutation: Mutex<()>,
}

impl Pool {
    /// Create a pool and perform its initial refresh.
    ///
    /// Blocks on one provider round trip. A malformed filter or an empty
    /// group identifier is fatal; so is an enumeration failure here,
    /// since the pool would otherwise start from nothing.
    pub async fn new(provider: Arc<dyn ComputeProvider>, spec: PoolSpec) -> PoolResult<Self> {
        if spec.group.is_empty() {
            return Err(PoolError::EmptyGroup);
        }
        let filter = Regex::new(&spec.filter)?;

        let pool = Self {
            provider,
            group: spec.group,
            filter,
            filter_str: spec.filter,
            max_results: spec.max_results,
            wait_timeout: spec.wait_timeout,
            buckets: Mutex::new(Buckets::default()),
            mutation: Mutex::new(()),
        };
        pool.update().await?;

        info!(group = %pool.group, filter = %pool.filter_str, "pool created");
        Ok(pool)
    }

    /// Start up to `n` stopped instances and wait for them to run.
    pub async fn start(&self, n: usize) -> PoolResult<()> {
        self.transition(n, Direction::Start).await
    }

    /// Stop up to `n` running instances and wait for them to stop.
    pub async fn stop(&self, n: usize) -> PoolResult<()> {
        self.transition(n, Direction::Stop).await
    }

    /// Resynchronize both buckets from the provider.
    ///
    /// All-or-nothing: on enumeration failure the buckets and the
    /// availability flag keep their pre-call values.
    pub async fn update(&self) -> PoolResult<()> {
        let records = self
            .provider
            .describe_instances(&self.group, self.max_results)
            .await?;

        let mut running = Vec::new();
        let mut stopped = Vec::new();
        for record in records {
            // Membership is name-tag match only; untagged instances are
            // not members.
            let is_member = record.name().is_some_and(|name| self.filter.is_match(name));
            if !is_member {
                continue;
            }
            match record.state {
                RunState::Running => running.push(record),
                RunState::Stopped => stopped.push(record),
                // Other states are invisible to the pool.
                _ => {}
            }
        }

        let (n_running, n_stopped) = (running.len(), stopped.len());
        {
            let mut buckets = self.buckets.lock().await;
            buckets.running = running;
            buckets.stopped = stopped;
            // A pool whose last matching instance disappears reverts to
            // unavailable.
            buckets.available = n_running > 0 || n_stopped > 0;
        }

        info!(
            group = %self.group,
            filter = %self.filter_str,
            running = n_running,
            stopped = n_stopped,
            "pool updated"
        );
        Ok(())
    }

    /// Identifiers in the named bucket ("running" or "stopped").
    ///
    /// Unrecognized names yield an empty list, not an error. The result
    /// is an independent copy.
    pub async fn list(&self, state: &str) -> Vec<InstanceId> {
        let buckets = self.buckets.lock().await;
        let bucket = match state {
            "running" => &buckets.running,
            "stopped" => &buckets.stopped,
            _ => return Vec::new(),
        };
        bucket.iter().map(|record| record.id.clone()).collect()
    }

    /// Identifiers in the named bucket, as plain strings.
    pub async fn list_ids(&self, state: &str) -> Vec<String> {
        self.list(state)
            .await
            .into_iter()
            .map(InstanceId::into_string)
            .collect()
    }

    /// Whether the most recent refresh found at least one match.
    pub async fn available(&self) -> bool {
        self.buckets.lock().await.available
    }

    /// Current (running, stopped) bucket sizes.
    pub async fn counts(&self) -> (usize, usize) {
        let buckets = self.buckets.lock().await;
        (buckets.running.len(), buckets.stopped.len())
    }

    /// The group identifier this pool is scoped to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The membership filter, as configured.
    pub fn filter(&self) -> &str {
        &self.filter_str
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Select up to `n` candidates from the source bucket, submit one
    /// bulk transition, wait for convergence, then refresh.
    async fn transition(&self, n: usize, direction: Direction) -> PoolResult<()> {
        let _op = self.mutation.lock().await;
        let (source, target) = (direction.source(), direction.target());

        // Point-in-time selection under the data guard; the guard is
        // released before any provider call.
        let selected: Vec<InstanceId> = {
            let buckets = self.buckets.lock().await;
            if !buckets.available {
                return Err(PoolError::Unavailable {
                    group: self.group.clone(),
                    filter: self.filter_str.clone(),
                });
            }

            let candidates = buckets.bucket(source);
            if candidates.is_empty() {
                return Err(PoolError::NoCandidates {
                    group: self.group.clone(),
                    filter: self.filter_str.clone(),
                    state: source,
                });
            }

            info!(
                group = %self.group,
                filter = %self.filter_str,
                requested = n,
                target = %target,
                "transition requested"
            );
            if n > candidates.len() {
                // Partial fulfillment: act on everything we have.
                warn!(
                    group = %self.group,
                    filter = %self.filter_str,
                    requested = n,
                    available = candidates.len(),
                    "fewer instances than requested, selecting all"
                );
            }

            candidates
                .iter()
                .take(n)
                .map(|record| record.id.clone())
                .collect()
        };

        debug!(
            group = %self.group,
            filter = %self.filter_str,
            ids = ?selected,
            target = %target,
            "submitting bulk transition"
        );
        match direction {
            Direction::Start => self.provider.start_instances(&selected).await?,
            Direction::Stop => self.provider.stop_instances(&selected).await?,
        }

        let wait = self.provider.await_state(&selected, target);
        match tokio::time::timeout(self.wait_timeout, wait).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(PoolError::WaitTimeout {
                    group: self.group.clone(),
                    filter: self.filter_str.clone(),
                    state: target,
                });
            }
        }

        self.update().await?;
        info!(
            group = %self.group,
            filter = %self.filter_str,
            transitioned = selected.len(),
            state = %target,
            "transition complete"
        );
        Ok(())
    }
}
