//! fleet-provider — the compute provider seam.
//!
//! A pool never talks to a cloud API directly; it goes through the
//! [`ComputeProvider`] trait: enumerate instances by group, submit bulk
//! start/stop requests, and block until an identifier set converges on a
//! target run state. Real cloud backends implement this trait out of
//! tree; [`MemoryProvider`] ships in-tree for tests and local dry runs.

pub mod error;
pub mod memory;
pub mod provider;

pub use error::{ProviderError, ProviderResult};
pub use memory::MemoryProvider;
pub use provider::ComputeProvider;
