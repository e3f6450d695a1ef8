//! Compliance passes. Each is a pure function of the manifest.

use ossa_spec::AgentManifest;

use crate::result::{DimensionResult, ValidationMetrics};
use crate::weights::{AccessibilityWeights, PerformanceWeights, SecurityWeights};

fn scheme(url: &str) -> Option<String> {
    url.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase())
}

/// Sensitive-data indicators, insecure server URLs and missing authentication.
///
/// `serialized` is the compact JSON form of `manifest`.
pub fn security(manifest: &AgentManifest, serialized: &str, weights: &SecurityWeights) -> DimensionResult {
    let mut result = DimensionResult::perfect();
    let text = serialized.to_lowercase();

    let mut seen: Vec<&str> = Vec::new();
    for pattern in &weights.sensitive_patterns {
        let pattern = pattern.as_str();
        if pattern.is_empty() || seen.contains(&pattern) || !text.contains(pattern) {
            continue;
        }
        seen.push(pattern);
        result.deduct(
            weights.sensitive_penalty,
            format!("Manifest text mentions '{}'", pattern),
        );
    }
    if !seen.is_empty() {
        result.recommend("Keep credentials out of the manifest; reference them by environment variable");
    }

    for url in manifest.server_urls() {
        let secured = scheme(url).is_some_and(|s| weights.secure_schemes.iter().any(|ok| *ok == s));
        if !secured {
            result.deduct(
                weights.insecure_url_penalty,
                format!("Server URL '{}' is not transport-secured", url),
            );
            result.recommend(format!("Serve '{}' over https or wss", url));
        }
    }

    let authenticated = manifest
        .spec
        .security
        .as_ref()
        .is_some_and(|s| s.authentication.is_some());
    if !authenticated {
        result.deduct(weights.missing_auth_penalty, "No authentication mechanism declared");
        result.recommend("Declare spec.security.authentication");
    }

    result.finish(weights.threshold)
}

/// Token and response-time estimates for a manifest.
pub fn metrics(manifest: &AgentManifest, serialized: &str, weights: &PerformanceWeights) -> ValidationMetrics {
    let estimated_tokens = serialized.chars().count() / weights.chars_per_token.max(1);
    let capability_count = manifest.spec.capabilities.len();
    let response_time_proxy =
        capability_count as f64 * weights.capability_cost + estimated_tokens as f64 * weights.token_cost;
    ValidationMetrics {
        estimated_tokens,
        capability_count,
        response_time_proxy,
    }
}

pub fn performance(metrics: &ValidationMetrics, weights: &PerformanceWeights) -> DimensionResult {
    let mut result = DimensionResult::perfect();

    if metrics.estimated_tokens > weights.token_threshold {
        result.deduct(
            weights.token_penalty,
            format!(
                "Estimated token cost {} exceeds {}",
                metrics.estimated_tokens, weights.token_threshold
            ),
        );
        result.recommend("Shorten descriptions and schemas");
    }

    if metrics.capability_count > weights.max_capabilities {
        result.deduct(
            weights.capability_penalty,
            format!(
                "{} capabilities exceed the recommended {}",
                metrics.capability_count, weights.max_capabilities
            ),
        );
        result.recommend("Split the agent into smaller agents");
    }

    if metrics.response_time_proxy > weights.response_time_threshold {
        result.deduct(
            weights.response_time_penalty,
            format!(
                "Response-time estimate {:.0} exceeds {:.0}",
                metrics.response_time_proxy, weights.response_time_threshold
            ),
        );
    }

    result.finish(weights.threshold)
}

/// Descriptions and usage examples.
pub fn accessibility(manifest: &AgentManifest, weights: &AccessibilityWeights) -> DimensionResult {
    let mut result = DimensionResult::perfect();

    let described = manifest
        .metadata
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !described {
        result.deduct(weights.missing_description_penalty, "Missing agent description");
        result.recommend("Add metadata.description");
    }

    for capability in &manifest.spec.capabilities {
        if capability.description.trim().is_empty() {
            result.deduct(
                weights.capability_description_penalty,
                format!("Capability '{}' has no description", capability.name),
            );
        }
    }

    if !manifest.has_examples() {
        result.deduct(weights.missing_examples_penalty, "No usage examples");
        result.recommend("Add usage examples to spec.examples or to capabilities");
    }

    result.finish(weights.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_spec::{Authentication, Capability, HttpBinding, SecurityConfig, ServerEndpoint, UsageExample};

    fn base() -> AgentManifest {
        AgentManifest::new("clean-agent", "1.0.0")
            .with_description("Summarises documents")
            .with_agent("Clean", "Summaries")
            .with_capability(Capability::new("summarise").with_description("Summarise a document"))
    }

    fn secured(mut manifest: AgentManifest) -> AgentManifest {
        manifest.spec.security = Some(SecurityConfig {
            authentication: Some(Authentication {
                method: "oauth2".into(),
                required: true,
            }),
        });
        manifest
    }

    fn serialized(manifest: &AgentManifest) -> String {
        manifest.to_json().unwrap()
    }

    #[test]
    fn test_security_missing_auth_only() {
        let manifest = base();
        let result = security(&manifest, &serialized(&manifest), &SecurityWeights::default());
        assert_eq!(result.score, 90);
        assert!(result.compliant);
        assert_eq!(result.issues, vec!["No authentication mechanism declared"]);
    }

    #[test]
    fn test_security_patterns_count_once_each() {
        let manifest = secured(
            base().with_capability(
                Capability::new("rotate")
                    .with_description("Rotate the secret token; the old token and old secret expire"),
            ),
        );
        let result = security(&manifest, &serialized(&manifest), &SecurityWeights::default());
        assert_eq!(result.score, 60);
        assert!(!result.compliant);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_security_insecure_urls() {
        let mut manifest = secured(base());
        manifest.spec.protocols.http = Some(HttpBinding {
            enabled: true,
            servers: vec![
                ServerEndpoint { url: "http://a.example.com".into(), description: None },
                ServerEndpoint { url: "https://b.example.com".into(), description: None },
                ServerEndpoint { url: "ws://c.example.com".into(), description: None },
            ],
        });
        let result = security(&manifest, &serialized(&manifest), &SecurityWeights::default());
        assert_eq!(result.score, 70);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_security_floors_at_zero() {
        let manifest = base().with_description("credential secret token password key");
        let result = security(&manifest, &serialized(&manifest), &SecurityWeights::default());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_performance_large_manifest() {
        let weights = PerformanceWeights::default();
        let metrics = ValidationMetrics {
            estimated_tokens: 40_000,
            capability_count: 25,
            response_time_proxy: 25.0 * 100.0 + 40_000.0 * 0.1,
        };
        let result = performance(&metrics, &weights);
        assert_eq!(result.score, 55);
        assert!(!result.compliant);
    }

    #[test]
    fn test_metrics_estimate() {
        let manifest = base();
        let text = serialized(&manifest);
        let m = metrics(&manifest, &text, &PerformanceWeights::default());
        assert_eq!(m.estimated_tokens, text.len() / 4);
        assert_eq!(m.capability_count, 1);
        assert_eq!(m.response_time_proxy, 100.0 + m.estimated_tokens as f64 * 0.1);
        assert!(performance(&m, &PerformanceWeights::default()).compliant);
    }

    #[test]
    fn test_accessibility_penalties_add_up() {
        let manifest = AgentManifest::new("bare", "1.0.0")
            .with_capability(Capability::new("a"))
            .with_capability(Capability::new("b"));
        let result = accessibility(&manifest, &AccessibilityWeights::default());
        assert_eq!(result.score, 60);
        assert_eq!(result.issues.len(), 4);
    }

    #[test]
    fn test_accessibility_capability_example_counts() {
        let mut manifest = base();
        manifest.spec.capabilities[0].examples.push(UsageExample {
            name: "short".into(),
            input: serde_json::json!({"text": "hello"}),
            output: None,
        });
        let result = accessibility(&manifest, &AccessibilityWeights::default());
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
    }
}
