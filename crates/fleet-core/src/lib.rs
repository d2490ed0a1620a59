//! fleet-core — domain types and configuration for fleetpool.
//!
//! Defines the instance model shared by every other crate:
//!
//! - [`InstanceId`] — opaque provider-assigned identifier
//! - [`RunState`] — provider run states (only `Running`/`Stopped` are
//!   meaningful to a pool)
//! - [`InstanceRecord`] — one instance as the provider reports it
//! - [`FleetConfig`] — the parsed `fleet.toml` configuration

pub mod config;
pub mod types;

pub use config::{FleetConfig, PoolConfig, ProviderConfig, SeedInstance, WaitConfig};
pub use types::{InstanceId, InstanceRecord, RunState, UnknownRunState, NAME_TAG};
