//! fleet-pool — a live, filtered view of one group's instances.
//!
//! A [`Pool`] caches the running/stopped instances of one
//! (group, name-filter) pair and issues bulk start/stop operations
//! against that group. Each mutating operation selects from the cache,
//! submits one bulk transition to the provider, waits (with a deadline)
//! for convergence, then refreshes the cache from the provider's
//! authoritative state.
//!
//! # Architecture
//!
//! ```text
//! Pool
//!   ├── Arc<dyn ComputeProvider> (enumerate, start, stop, await_state)
//!   ├── Mutex<Buckets>           (data guard: available/running/stopped)
//!   └── Mutex<()>                (mutation lock: serializes start/stop)
//! ```
//!
//! The data guard is held only across in-memory reads and writes, never
//! across provider calls. The mutation lock is held end-to-end by
//! `start`/`stop` so two mutations on one pool cannot select overlapping
//! candidates.

pub mod error;
pub mod pool;

pub use error::{PoolError, PoolResult};
pub use pool::{Pool, PoolSpec};
