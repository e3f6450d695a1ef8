//! The policy validator: structural passes, compliance passes and scoring.

use tracing::{debug, warn};

use ossa_spec::{AgentManifest, StructuralValidator, ValidationIssue};

use crate::error::PolicyResult;
use crate::passes;
use crate::result::{round_score, Compliance, ComplianceLevel, ValidationResult};
use crate::weights::ScoringWeights;

/// Aggregate score: 100 minus finding weights plus the compliance bonus, rounded and clamped to 0..=100.
pub fn aggregate_score(
    errors: &[ValidationIssue],
    warnings: &[ValidationIssue],
    compliant_dimensions: usize,
    weights: &ScoringWeights,
) -> u8 {
    let error_penalty: f64 = errors.iter().map(|e| weights.errors.weight(e.severity)).sum();
    let warning_penalty: f64 = warnings.iter().map(|w| weights.warnings.weight(w.severity)).sum();
    let bonus = compliant_dimensions as f64 * weights.compliance_bonus;
    round_score(100.0 - error_penalty - warning_penalty + bonus)
}

/// Stateless manifest validator.
#[derive(Debug, Clone, Default)]
pub struct AgentValidator {
    weights: ScoringWeights,
}

impl AgentValidator {
    pub fn new(weights: ScoringWeights) -> PolicyResult<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Validate a manifest. Never fails; non-compliance only lowers the score.
    pub fn validate(&self, manifest: &AgentManifest) -> ValidationResult {
        let mut structural = StructuralValidator::check_required(manifest);
        structural.merge(StructuralValidator::check_capabilities(manifest));

        let serialized = manifest.to_json().unwrap_or_else(|e| {
            warn!("Cannot serialize manifest '{}' for scoring: {}", manifest.metadata.name, e);
            String::new()
        });

        let metrics = passes::metrics(manifest, &serialized, &self.weights.performance);
        let compliance = Compliance {
            security: passes::security(manifest, &serialized, &self.weights.security),
            performance: passes::performance(&metrics, &self.weights.performance),
            accessibility: passes::accessibility(manifest, &self.weights.accessibility),
        };

        let score = aggregate_score(
            &structural.errors,
            &structural.warnings,
            compliance.compliant_count(),
            &self.weights,
        );
        let level = ComplianceLevel::from_score(score, &self.weights.tiers);
        let valid = !structural.errors.iter().any(|e| e.severity.blocks());

        debug!(
            "Validated '{}': score {} ({}), {} errors, {} warnings",
            manifest.metadata.name,
            score,
            level,
            structural.errors.len(),
            structural.warnings.len()
        );

        ValidationResult {
            valid,
            level,
            score,
            errors: structural.errors,
            warnings: structural.warnings,
            suggestions: structural.suggestions,
            compliance,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_spec::structural::codes;
    use ossa_spec::{Authentication, Capability, SecurityConfig, Severity, UsageExample};

    fn exemplary() -> AgentManifest {
        let mut manifest = AgentManifest::new("research-assistant", "2.1.0")
            .with_description("Finds and summarises papers")
            .with_agent("Research Assistant", "Literature review")
            .with_capability(
                Capability::new("find_papers")
                    .with_description("Find papers on a topic")
                    .with_framework("langchain")
                    .with_input_schema(serde_json::json!({"type": "object"})),
            );
        manifest.spec.security = Some(SecurityConfig {
            authentication: Some(Authentication {
                method: "oauth2".into(),
                required: true,
            }),
        });
        manifest.spec.examples.push(UsageExample {
            name: "basic".into(),
            input: serde_json::json!({"topic": "rust"}),
            output: None,
        });
        manifest
    }

    #[test]
    fn test_exemplary_manifest_is_platinum() {
        let result = AgentValidator::default().validate(&exemplary());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.score, 100);
        assert_eq!(result.level, ComplianceLevel::Platinum);
        assert_eq!(result.compliance.compliant_count(), 3);
    }

    #[test]
    fn test_uppercase_name_is_critical() {
        let mut manifest = exemplary();
        manifest.metadata.name = "My-Agent".into();
        let result = AgentValidator::default().validate(&manifest);

        assert!(!result.valid);
        let error = &result.errors[0];
        assert_eq!(error.code, codes::INVALID_NAME_FORMAT);
        assert_eq!(error.severity, Severity::Critical);
        assert!(error.message.contains("name must be kebab-case"));
        assert_eq!(result.score, 90);
        assert_eq!(result.level, ComplianceLevel::Gold);
    }

    #[test]
    fn test_missing_frameworks_warns_and_suggests() {
        let mut manifest = exemplary();
        manifest.spec.capabilities[0].frameworks.clear();
        let result = AgentValidator::default().validate(&manifest);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, codes::CAPABILITY_MISSING_FRAMEWORKS);
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.code == codes::CAPABILITY_MISSING_FRAMEWORKS));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_empty_capabilities_only_warn() {
        let mut manifest = exemplary();
        manifest.spec.capabilities.clear();
        let result = AgentValidator::default().validate(&manifest);
        assert!(result.valid);
        assert_eq!(result.warnings[0].code, codes::NO_CAPABILITIES);
        assert_eq!(result.warnings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_bare_manifest_is_bronze() {
        let manifest = AgentManifest {
            api_version: String::new(),
            kind: "Tool".into(),
            metadata: Default::default(),
            spec: Default::default(),
        };
        let result = AgentValidator::default().validate(&manifest);
        assert!(!result.valid);
        assert_eq!(result.level, ComplianceLevel::Bronze);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_custom_weights() {
        let mut weights = ScoringWeights::default();
        weights.errors.critical = 50.0;
        let validator = AgentValidator::new(weights).unwrap();
        let mut manifest = exemplary();
        manifest.metadata.name = "Bad Name".into();
        assert_eq!(validator.validate(&manifest).score, 65);
    }

    #[test]
    fn test_fractional_weights_round_to_integer_score() {
        let mut weights = ScoringWeights::default();
        weights.errors.critical = 27.4;
        let validator = AgentValidator::new(weights).unwrap();
        let mut manifest = exemplary();
        manifest.metadata.name = "Bad Name".into();
        let result = validator.validate(&manifest);
        assert_eq!(result.score, 88);
        assert_eq!(result.level, ComplianceLevel::Gold);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["score"].is_u64());
        assert_eq!(json["score"], 88);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut weights = ScoringWeights::default();
        weights.tiers.silver = 90.0;
        assert!(AgentValidator::new(weights).is_err());
    }
}
