//! # ossa_discovery
//!
//! Finds agent definitions across ecosystems in a directory tree.
//!
//! Each ecosystem has a [`Detector`] that selects candidate files by name,
//! decides how strong the evidence is, and extracts a [`RawFragment`]. The
//! [`DiscoveryEngine`] walks the tree once and runs every detector category
//! concurrently, each under a deadline, then merges the sightings.
//!
//! ## Confidence
//!
//! | Evidence | Default |
//! |----------|---------|
//! | Annotation or structured config | 0.95 |
//! | Import plus constructor | 0.80 |
//! | Import plus weaker signal | 0.70 |
//! | File name or location only | 0.30 |

pub mod config;
pub mod detector;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod record;

pub use config::{ConfidenceLevels, DiscoveryConfig};
pub use detector::{Detector, Sighting};
pub use engine::{DiscoveryEngine, DiscoverySummary};
pub use error::{DiscoveryError, DiscoveryResult};
pub use fragment::*;
pub use record::{deduplicate, AgentFormat, DiscoveryRecord};
