//! Scoring weights and thresholds.
//!
//! Every number the validator uses lives here so deployments can tune the
//! scoring from configuration. `Default` carries the standard values.

use serde::{Deserialize, Serialize};

use ossa_spec::Severity;

use crate::error::{PolicyError, PolicyResult};

/// Points deducted per finding, by severity.
///
/// A table given in configuration must list all five severities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub info: f64,
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    fn errors() -> Self {
        Self {
            critical: 25.0,
            high: 15.0,
            medium: 10.0,
            low: 5.0,
            info: 0.0,
        }
    }

    fn warnings() -> Self {
        // Critical warnings are weighed like high ones.
        Self {
            critical: 10.0,
            high: 10.0,
            medium: 5.0,
            low: 2.0,
            info: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityWeights {
    /// Lowercase substrings that indicate sensitive data in a manifest.
    pub sensitive_patterns: Vec<String>,
    pub sensitive_penalty: f64,
    pub insecure_url_penalty: f64,
    pub missing_auth_penalty: f64,
    /// URL schemes considered transport-secured.
    pub secure_schemes: Vec<String>,
    pub threshold: f64,
}

impl Default for SecurityWeights {
    fn default() -> Self {
        Self {
            sensitive_patterns: ["credential", "secret", "token", "password", "key"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sensitive_penalty: 20.0,
            insecure_url_penalty: 15.0,
            missing_auth_penalty: 10.0,
            secure_schemes: vec!["https".into(), "wss".into()],
            threshold: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceWeights {
    pub chars_per_token: usize,
    pub token_threshold: usize,
    pub token_penalty: f64,
    pub max_capabilities: usize,
    pub capability_penalty: f64,
    /// Cost of one capability in the response-time proxy.
    pub capability_cost: f64,
    /// Cost of one token in the response-time proxy.
    pub token_cost: f64,
    pub response_time_threshold: f64,
    pub response_time_penalty: f64,
    pub threshold: f64,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            token_threshold: 2000,
            token_penalty: 15.0,
            max_capabilities: 20,
            capability_penalty: 10.0,
            capability_cost: 100.0,
            token_cost: 0.1,
            response_time_threshold: 5000.0,
            response_time_penalty: 20.0,
            threshold: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityWeights {
    pub missing_description_penalty: f64,
    pub capability_description_penalty: f64,
    pub missing_examples_penalty: f64,
    pub threshold: f64,
}

impl Default for AccessibilityWeights {
    fn default() -> Self {
        Self {
            missing_description_penalty: 20.0,
            capability_description_penalty: 5.0,
            missing_examples_penalty: 10.0,
            threshold: 80.0,
        }
    }
}

/// Lower bounds of the upper three tiers; everything below silver is bronze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub platinum: f64,
    pub gold: f64,
    pub silver: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            platinum: 95.0,
            gold: 85.0,
            silver: 70.0,
        }
    }
}

/// All weights and thresholds used by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub errors: SeverityWeights,
    pub warnings: SeverityWeights,
    /// Bonus per compliance dimension that clears its own threshold.
    pub compliance_bonus: f64,
    pub security: SecurityWeights,
    pub performance: PerformanceWeights,
    pub accessibility: AccessibilityWeights,
    pub tiers: TierThresholds,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            errors: SeverityWeights::errors(),
            warnings: SeverityWeights::warnings(),
            compliance_bonus: 5.0,
            security: SecurityWeights::default(),
            performance: PerformanceWeights::default(),
            accessibility: AccessibilityWeights::default(),
            tiers: TierThresholds::default(),
        }
    }
}

impl ScoringWeights {
    /// Reject configurations that would break scoring invariants.
    pub fn validate(&self) -> PolicyResult<()> {
        let severity_tables = [("errors", &self.errors), ("warnings", &self.warnings)];
        for (name, table) in severity_tables {
            let weights = [table.critical, table.high, table.medium, table.low, table.info];
            if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
                return Err(PolicyError::InvalidWeights(format!(
                    "{} weights must be finite and non-negative",
                    name
                )));
            }
        }

        let tiers = &self.tiers;
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !(in_range(tiers.platinum) && in_range(tiers.gold) && in_range(tiers.silver)) {
            return Err(PolicyError::InvalidWeights(
                "tier thresholds must lie within 0..=100".into(),
            ));
        }
        if !(tiers.platinum > tiers.gold && tiers.gold > tiers.silver) {
            return Err(PolicyError::InvalidWeights(format!(
                "tier thresholds must strictly decrease (platinum {}, gold {}, silver {})",
                tiers.platinum, tiers.gold, tiers.silver
            )));
        }

        if self.performance.chars_per_token == 0 {
            return Err(PolicyError::InvalidWeights("chars_per_token must be positive".into()));
        }
        if self.compliance_bonus < 0.0 {
            return Err(PolicyError::InvalidWeights("compliance_bonus must be non-negative".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let weights = ScoringWeights::default();
        assert!(weights.validate().is_ok());
        assert_eq!(weights.errors.weight(Severity::Critical), 25.0);
        assert_eq!(weights.warnings.weight(Severity::Critical), 10.0);
        assert_eq!(weights.warnings.weight(Severity::Low), 2.0);
        assert_eq!(weights.errors.weight(Severity::Info), 0.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let weights: ScoringWeights =
            serde_json::from_str(r#"{"tiers": {"platinum": 98}, "security": {"threshold": 90}}"#).unwrap();
        assert_eq!(weights.tiers.platinum, 98.0);
        assert_eq!(weights.tiers.gold, 85.0);
        assert_eq!(weights.security.threshold, 90.0);
        assert_eq!(weights.security.sensitive_patterns.len(), 5);
        assert_eq!(weights.errors.critical, 25.0);
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let mut weights = ScoringWeights::default();
        weights.tiers.gold = 96.0;
        assert!(matches!(weights.validate(), Err(PolicyError::InvalidWeights(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut weights = ScoringWeights::default();
        weights.errors.critical = -1.0;
        assert!(weights.validate().is_err());
    }
}
