//! Integration tests for manifest validation and tiering.

use proptest::prelude::*;

use ossa_policy::{aggregate_score, AgentValidator, ComplianceLevel, ScoringWeights, TierThresholds};
use ossa_spec::{AgentManifest, Capability, Severity, ValidationIssue};

fn manifest_with(name: &str, description: Option<&str>, capabilities: usize) -> AgentManifest {
    let mut manifest = AgentManifest::new(name, "1.0.0").with_agent("Agent", "General");
    if let Some(description) = description {
        manifest = manifest.with_description(description);
    }
    for i in 0..capabilities {
        manifest = manifest.with_capability(
            Capability::new(format!("capability_{}", i))
                .with_description("Does one thing")
                .with_framework("langchain"),
        );
    }
    manifest
}

/// "My-Agent" fails with a critical kebab-case error whatever else is present.
#[test]
fn test_my_agent_is_invalid() {
    let validator = AgentValidator::default();
    for manifest in [
        manifest_with("My-Agent", Some("A well described agent"), 3),
        manifest_with("My-Agent", None, 0),
    ] {
        let result = validator.validate(&manifest);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| {
            e.severity == Severity::Critical && e.message.contains("name must be kebab-case")
        }));
    }
}

#[test]
fn test_many_capabilities_hurt_performance() {
    let result = AgentValidator::default().validate(&manifest_with("big-agent", Some("Big"), 60));
    assert!(result.valid);
    assert_eq!(result.metrics.capability_count, 60);
    let performance = &result.compliance.performance;
    assert_eq!(performance.issues.len(), 2);
    assert_eq!(performance.score, 70);
    assert!(performance.compliant);
}

#[test]
fn test_result_serializes() {
    let result = AgentValidator::default().validate(&manifest_with("small-agent", Some("Small"), 1));
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert!(json["score"].is_u64());
    assert!(json["compliance"]["security"]["score"].is_u64());
    assert!(json["metrics"]["estimatedTokens"].is_number());
    assert!(json["level"].is_string());
    assert!(result.report().contains("Compliance:"));
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Critical),
        Just(Severity::High),
        Just(Severity::Medium),
        Just(Severity::Low),
        Just(Severity::Info),
    ]
}

fn issues() -> impl Strategy<Value = Vec<ValidationIssue>> {
    proptest::collection::vec(
        severity().prop_map(|s| ValidationIssue::new("CODE", "path", s, "message")),
        0..12,
    )
}

proptest! {
    /// One more critical error never raises the score.
    #[test]
    fn prop_critical_error_never_raises_score(
        errors in issues(),
        warnings in issues(),
        compliant in 0usize..=3,
    ) {
        let weights = ScoringWeights::default();
        let before = aggregate_score(&errors, &warnings, compliant, &weights);
        let mut more = errors.clone();
        more.push(ValidationIssue::new("EXTRA", "path", Severity::Critical, "extra"));
        let after = aggregate_score(&more, &warnings, compliant, &weights);
        prop_assert!(after <= before);
        prop_assert!(after <= 100);
    }

    /// The tier bands partition 0..=100 and platinum is exactly score >= 95.
    #[test]
    fn prop_tiers_partition_scores(score in 0u8..=100) {
        let tiers = TierThresholds::default();
        let level = ComplianceLevel::from_score(score, &tiers);
        prop_assert_eq!(score >= 95, level == ComplianceLevel::Platinum);
        let bands = [
            score >= 95,
            (85..95).contains(&score),
            (70..85).contains(&score),
            score < 70,
        ];
        prop_assert_eq!(bands.iter().filter(|b| **b).count(), 1);
        let expected = if bands[0] {
            ComplianceLevel::Platinum
        } else if bands[1] {
            ComplianceLevel::Gold
        } else if bands[2] {
            ComplianceLevel::Silver
        } else {
            ComplianceLevel::Bronze
        };
        prop_assert_eq!(level, expected);
    }

    /// Renaming a manifest to a non-kebab name never improves its score.
    #[test]
    fn prop_bad_name_never_improves(caps in 0usize..6, described in any::<bool>()) {
        let validator = AgentValidator::default();
        let description = if described { Some("Described") } else { None };
        let good = validator.validate(&manifest_with("good-name", description, caps));
        let bad = validator.validate(&manifest_with("Good-Name", description, caps));
        prop_assert!(bad.score <= good.score);
        prop_assert!(!bad.valid);
    }
}
