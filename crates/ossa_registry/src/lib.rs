//! # ossa_registry
//!
//! Caches translated agents between runs.
//!
//! - `update` merges fresh discoveries while keeping access bookkeeping,
//!   then evicts the least-accessed agents beyond `max_size`
//! - `get` counts hits and misses and bumps the agent's access count
//! - `search` filters conjunctively, sorts and limits
//! - snapshots older than the TTL are discarded whole on load
//!
//! ```rust
//! use ossa_registry::{AgentRegistry, SearchFilters};
//!
//! let registry = AgentRegistry::in_memory();
//! assert!(registry.is_empty());
//! assert!(registry.search(&SearchFilters::new()).unwrap().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod search;
pub mod store;

pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use models::{cache_key, AgentEntry, CachedAgent, RegistryStats, UpdateSummary};
pub use registry::AgentRegistry;
pub use search::{SearchFilters, SortField};
pub use store::Snapshot;
