//! Validation results, compliance tiers and reporting.

use serde::{Deserialize, Serialize};

use ossa_spec::ValidationIssue;

use crate::error::PolicyResult;
use crate::weights::TierThresholds;

/// Round a raw point total onto the integer 0..=100 score scale.
pub fn round_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Compliance tier derived from the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ComplianceLevel {
    /// Map a score onto the tier ladder. The bands partition the whole range.
    pub fn from_score(score: u8, tiers: &TierThresholds) -> Self {
        let score = f64::from(score);
        if score >= tiers.platinum {
            ComplianceLevel::Platinum
        } else if score >= tiers.gold {
            ComplianceLevel::Gold
        } else if score >= tiers.silver {
            ComplianceLevel::Silver
        } else {
            ComplianceLevel::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceLevel::Bronze => "bronze",
            ComplianceLevel::Silver => "silver",
            ComplianceLevel::Gold => "gold",
            ComplianceLevel::Platinum => "platinum",
        }
    }
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score and findings for one compliance dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub score: u8,
    pub compliant: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// Points deducted so far; folded into `score` by `finish`.
    #[serde(skip)]
    penalty: f64,
}

impl DimensionResult {
    /// A full-score dimension; passes deduct from here.
    pub fn perfect() -> Self {
        Self {
            score: 100,
            compliant: true,
            issues: Vec::new(),
            recommendations: Vec::new(),
            penalty: 0.0,
        }
    }

    pub fn deduct(&mut self, points: f64, issue: impl Into<String>) {
        self.penalty += points;
        self.issues.push(issue.into());
    }

    pub fn recommend(&mut self, recommendation: impl Into<String>) {
        self.recommendations.push(recommendation.into());
    }

    /// Round the score onto 0..=100 and decide compliance against `threshold`.
    pub fn finish(mut self, threshold: f64) -> Self {
        self.score = round_score(100.0 - self.penalty);
        self.penalty = 0.0;
        self.compliant = f64::from(self.score) >= threshold;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    pub security: DimensionResult,
    pub performance: DimensionResult,
    pub accessibility: DimensionResult,
}

impl Compliance {
    pub fn compliant_count(&self) -> usize {
        [&self.security, &self.performance, &self.accessibility]
            .iter()
            .filter(|d| d.compliant)
            .count()
    }
}

/// Cost estimates echoed for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetrics {
    pub estimated_tokens: usize,
    pub capability_count: usize,
    pub response_time_proxy: f64,
}

/// Full outcome of validating one manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub level: ComplianceLevel,
    pub score: u8,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<ValidationIssue>,
    pub compliance: Compliance,
    pub metrics: ValidationMetrics,
}

impl ValidationResult {
    pub fn to_json(&self) -> PolicyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable report.
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "Status: {}\n",
            if self.valid { "✅ VALID" } else { "❌ INVALID" }
        ));
        report.push_str(&format!("Score: {}/100 ({})\n", self.score, self.level));
        report.push_str(&format!(
            "Metrics: ~{} tokens, {} capabilities, response-time proxy {:.0}\n",
            self.metrics.estimated_tokens, self.metrics.capability_count, self.metrics.response_time_proxy
        ));

        if !self.errors.is_empty() {
            report.push_str("\nErrors:\n");
            for error in &self.errors {
                report.push_str(&format!("  ❌ {}\n", error));
            }
        }

        if !self.warnings.is_empty() {
            report.push_str("\nWarnings:\n");
            for warning in &self.warnings {
                report.push_str(&format!("  ⚠️ {}\n", warning));
            }
        }

        if !self.suggestions.is_empty() {
            report.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                report.push_str(&format!("  💡 {}: {}\n", suggestion.path, suggestion.message));
            }
        }

        report.push_str("\nCompliance:\n");
        let dimensions = [
            ("security", &self.compliance.security),
            ("performance", &self.compliance.performance),
            ("accessibility", &self.compliance.accessibility),
        ];
        for (name, dimension) in dimensions {
            let status = if dimension.compliant { "✅" } else { "⚠️" };
            report.push_str(&format!("  {} {}: {}\n", status, name, dimension.score));
            for issue in &dimension.issues {
                report.push_str(&format!("     - {}\n", issue));
            }
            for recommendation in &dimension.recommendations {
                report.push_str(&format!("     → {}\n", recommendation));
            }
        }

        report
    }
}
