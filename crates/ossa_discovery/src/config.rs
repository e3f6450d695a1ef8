//! Discovery configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::record::AgentFormat;

/// Directories never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".ossa",
];

/// Confidence assigned per strength of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceLevels {
    /// Annotation or structured config.
    pub structural: f64,
    /// Import plus a constructor or registration call.
    pub pattern: f64,
    /// Import plus a weaker secondary signal.
    pub weak_pattern: f64,
    /// File name or location only.
    pub filename: f64,
}

impl Default for ConfidenceLevels {
    fn default() -> Self {
        Self {
            structural: 0.95,
            pattern: 0.80,
            weak_pattern: 0.70,
            filename: 0.30,
        }
    }
}

impl ConfidenceLevels {
    /// Between two pattern levels, used for signals like `crewai` without a `Crew(`.
    pub fn mid_pattern(&self) -> f64 {
        (self.pattern + self.weak_pattern) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub exclude_dirs: Vec<String>,
    pub max_file_bytes: u64,
    /// Per-category deadline, in seconds.
    pub detector_timeout_secs: u64,
    pub include_filename_heuristics: bool,
    /// Restrict discovery to these formats; empty means all.
    pub formats: Vec<AgentFormat>,
    /// Records below this confidence are dropped after merging.
    pub min_confidence: f64,
    pub follow_links: bool,
    pub confidence: ConfidenceLevels,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            max_file_bytes: 1024 * 1024,
            detector_timeout_secs: 30,
            include_filename_heuristics: false,
            formats: Vec::new(),
            min_confidence: 0.0,
            follow_links: false,
            confidence: ConfidenceLevels::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_secs)
    }

    pub fn with_filename_heuristics(mut self, enabled: bool) -> Self {
        self.include_filename_heuristics = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.detector_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_formats(mut self, formats: Vec<AgentFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn format_enabled(&self, format: AgentFormat) -> bool {
        if format == AgentFormat::Unknown && !self.include_filename_heuristics {
            return false;
        }
        self.formats.is_empty() || self.formats.contains(&format)
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Check the confidence ladder and numeric bounds.
    pub fn validate(&self) -> DiscoveryResult<()> {
        let c = &self.confidence;
        let ladder = [c.structural, c.pattern, c.weak_pattern, c.filename];
        if ladder.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(DiscoveryError::InvalidConfig(
                "confidence levels must lie in [0, 1]".to_string(),
            ));
        }
        if ladder.windows(2).any(|w| w[0] < w[1]) {
            return Err(DiscoveryError::InvalidConfig(
                "confidence levels must not increase from structural to filename".to_string(),
            ));
        }
        if self.detector_timeout_secs == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "detector_timeout_secs must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(DiscoveryError::InvalidConfig(
                "min_confidence must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
