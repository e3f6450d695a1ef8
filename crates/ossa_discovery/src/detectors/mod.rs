//! Built-in detectors, one per agent ecosystem.

mod crewai;
mod drupal;
mod heuristic;
mod langchain;
mod mcp;
mod vendor;

use std::sync::Arc;

pub use crewai::CrewAiDetector;
pub use drupal::DrupalDetector;
pub use heuristic::FilenameHeuristicDetector;
pub use langchain::LangChainDetector;
pub use mcp::McpDetector;
pub use vendor::{Vendor, VendorDetector};

use crate::config::DiscoveryConfig;
use crate::detector::Detector;
use crate::error::DiscoveryResult;

/// Every built-in detector enabled by `config`.
pub fn default_detectors(config: &DiscoveryConfig) -> DiscoveryResult<Vec<Arc<dyn Detector>>> {
    let levels = config.confidence;
    let all: Vec<Arc<dyn Detector>> = vec![
        Arc::new(DrupalDetector::new(levels)?),
        Arc::new(McpDetector::new(levels)?),
        Arc::new(LangChainDetector::new(levels)?),
        Arc::new(CrewAiDetector::new(levels)?),
        Arc::new(VendorDetector::openai(levels)?),
        Arc::new(VendorDetector::anthropic(levels)?),
        Arc::new(FilenameHeuristicDetector::new(levels)),
    ];
    Ok(all
        .into_iter()
        .filter(|d| config.format_enabled(d.format()))
        .collect())
}
