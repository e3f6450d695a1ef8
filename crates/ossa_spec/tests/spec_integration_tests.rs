//! Integration tests for manifest I/O, structural checks and schema conformance.

use std::fs;
use tempfile::tempdir;

use ossa_spec::{
    structural::codes, validate_schema, AgentManifest, Capability, FrameworkBinding,
    ManifestReader, ManifestWriter, Severity, StructuralValidator,
};

fn complete_manifest() -> AgentManifest {
    let mut manifest = AgentManifest::new("research-crew", "1.0.0")
        .with_description("Researches and writes reports")
        .with_agent("Research Crew", "Research and reporting")
        .with_label("framework", "crewai")
        .with_capability(
            Capability::new("run_research_crew")
                .with_description("Run the whole crew")
                .with_framework("crewai")
                .with_input_schema(serde_json::json!({"type": "object"})),
        );
    manifest.spec.frameworks.crewai = Some(FrameworkBinding::enabled("crew"));
    manifest
}

/// A manifest written to disk can be read back, and passes every check.
#[test]
fn test_manifest_full_workflow() {
    let temp = tempdir().unwrap();
    let manifest = complete_manifest();

    let yaml_path = temp.path().join("out").join("agent.yaml");
    ManifestWriter::write(&yaml_path, &manifest).unwrap();
    let json_path = temp.path().join("agent.json");
    ManifestWriter::write(&json_path, &manifest).unwrap();

    let from_yaml = ManifestReader::read(&yaml_path).unwrap();
    let from_json = ManifestReader::read(&json_path).unwrap();
    assert_eq!(from_yaml, manifest);
    assert_eq!(from_json, manifest);

    let structural = StructuralValidator::check_strict(&from_yaml);
    assert!(structural.valid, "{:?}", structural.errors);

    let schema = validate_schema(&from_yaml).unwrap();
    assert!(schema.valid, "{:?}", schema.errors);
}

/// A hand-written manifest with several problems reports each of them.
#[test]
fn test_broken_manifest_from_disk() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.yaml");
    fs::write(
        &path,
        r#"
apiVersion: ossa/v0.3.3
kind: Workflow
metadata:
  name: My-Agent
  version: "1"
spec:
  capabilities:
    - name: Do Things
"#,
    )
    .unwrap();

    let manifest = ManifestReader::read(&path).unwrap();
    let report = StructuralValidator::check_strict(&manifest);

    assert!(!report.valid);
    let codes_found: Vec<&str> = report.errors.iter().map(|e| e.code.as_str()).collect();
    assert!(codes_found.contains(&codes::INVALID_KIND));
    assert!(codes_found.contains(&codes::INVALID_NAME_FORMAT));
    assert!(codes_found.contains(&codes::INVALID_VERSION_FORMAT));
    assert!(codes_found.contains(&codes::MISSING_AGENT));
    assert!(codes_found.contains(&codes::INVALID_CAPABILITY_NAME));

    let name_error = report
        .errors
        .iter()
        .find(|e| e.code == codes::INVALID_NAME_FORMAT)
        .unwrap();
    assert_eq!(name_error.severity, Severity::Critical);

    let schema = validate_schema(&manifest).unwrap();
    assert!(!schema.valid);
}

/// Serialization is byte-stable across repeated renders.
#[test]
fn test_serialization_is_deterministic() {
    let mut manifest = complete_manifest();
    for key in ["z", "a", "m"] {
        manifest
            .metadata
            .annotations
            .insert(format!("ossa.io/{}", key), key.to_string());
    }

    let first = manifest.to_json().unwrap();
    let second = manifest.clone().to_json().unwrap();
    assert_eq!(first, second);

    let a = first.find("ossa.io/a").unwrap();
    let z = first.find("ossa.io/z").unwrap();
    assert!(a < z);
}
