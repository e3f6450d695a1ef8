//! Translator output and the manifest scaffolding every translator shares.

use serde_json::{json, Value};

use ossa_discovery::DiscoveryRecord;
use ossa_spec::naming::kebab_case;
use ossa_spec::structural::is_semver;
use ossa_spec::{annotations, AgentManifest, Authentication, SecurityConfig, DEFAULT_AGENT_VERSION};

/// A manifest plus the non-fatal problems met while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub manifest: AgentManifest,
    pub warnings: Vec<String>,
}

impl Translation {
    pub fn new(manifest: AgentManifest) -> Self {
        Self {
            manifest,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Manifest name for a record: its kebab-cased name, or a format-based fallback.
pub fn manifest_name(record: &DiscoveryRecord) -> String {
    let name = kebab_case(&record.name);
    if name.is_empty() {
        format!("{}-agent", record.format.as_str())
    } else {
        name
    }
}

/// `version` when it is a plain semantic version, the default otherwise.
pub fn manifest_version(version: Option<&str>) -> String {
    version
        .map(|v| v.trim_start_matches('v'))
        .filter(|v| is_semver(v))
        .unwrap_or(DEFAULT_AGENT_VERSION)
        .to_string()
}

/// Empty manifest carrying provenance annotations and the framework label.
pub fn scaffold(record: &DiscoveryRecord, version: Option<&str>) -> AgentManifest {
    AgentManifest::new(manifest_name(record), manifest_version(version))
        .with_annotation(annotations::SOURCE_FORMAT, record.format.as_str())
        .with_annotation(
            annotations::SOURCE_FILE,
            record.source_path.to_string_lossy().to_string(),
        )
        .with_annotation(annotations::DETECTOR, record.detector.clone())
        .with_label("framework", record.format.as_str())
}

/// API-key authentication, for agents that authenticate with an environment secret.
pub fn api_key_auth() -> SecurityConfig {
    SecurityConfig {
        authentication: Some(Authentication {
            method: "api_key".to_string(),
            required: true,
        }),
    }
}

/// Object schema with one required string property.
pub fn string_input(property: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            property: { "type": "string", "description": description }
        },
        "required": [property]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_discovery::{AgentFormat, RawFragment};

    fn record(name: &str) -> DiscoveryRecord {
        DiscoveryRecord::new(
            AgentFormat::Mcp,
            name,
            "/repo/mcp.json",
            RawFragment::Unknown(json!({})),
            0.95,
            "mcp-server",
        )
    }

    #[test]
    fn test_manifest_name_fallback() {
        assert_eq!(manifest_name(&record("Weather Server")), "weather-server");
        assert_eq!(manifest_name(&record("???")), "mcp-agent");
    }

    #[test]
    fn test_manifest_version() {
        assert_eq!(manifest_version(Some("v2.1.0")), "2.1.0");
        assert_eq!(manifest_version(Some("latest")), "1.0.0");
        assert_eq!(manifest_version(None), "1.0.0");
    }

    #[test]
    fn test_scaffold_provenance() {
        let manifest = scaffold(&record("docs"), None);
        assert_eq!(manifest.metadata.annotations[annotations::SOURCE_FORMAT], "mcp");
        assert_eq!(manifest.metadata.annotations[annotations::SOURCE_FILE], "/repo/mcp.json");
        assert_eq!(manifest.metadata.annotations[annotations::DETECTOR], "mcp-server");
        assert_eq!(manifest.metadata.labels["framework"], "mcp");
    }
}
