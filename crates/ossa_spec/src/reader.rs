//! Manifest file reading utilities.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::AgentManifest;

/// On-disk encodings understood by the reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Pick the encoding from a file extension.
    pub fn from_path(path: &Path) -> SpecResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(SpecError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Reader for manifest files.
pub struct ManifestReader;

impl ManifestReader {
    /// Read a manifest from a YAML or JSON file.
    pub fn read(path: impl AsRef<Path>) -> SpecResult<AgentManifest> {
        let path = path.as_ref();
        debug!("Reading manifest from {:?}", path);

        if !path.exists() {
            return Err(SpecError::NotFound(path.to_path_buf()));
        }

        let format = ManifestFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        Self::parse(&content, format).map_err(|e| SpecError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse manifest text in the given encoding.
    pub fn parse(content: &str, format: ManifestFormat) -> SpecResult<AgentManifest> {
        let manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
        };
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_yaml_manifest() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("agent.ossa.yaml");
        fs::write(
            &path,
            r#"
apiVersion: ossa/v0.3.3
kind: Agent
metadata:
  name: triage-agent
  version: 1.0.0
  description: Triage incoming issues
spec:
  agent:
    name: Triage Agent
    expertise: Issue triage
  capabilities:
    - name: classify_issue
      description: Classify an issue
      inputSchema:
        type: object
"#,
        )
        .unwrap();

        let manifest = ManifestReader::read(&path).unwrap();
        assert_eq!(manifest.metadata.name, "triage-agent");
        assert_eq!(manifest.spec.capabilities.len(), 1);
        assert!(manifest.spec.capabilities[0].input_schema.is_some());
    }

    #[test]
    fn test_unsupported_extension() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("agent.txt");
        fs::write(&path, "kind: Agent").unwrap();

        let err = ManifestReader::read(&path).unwrap_err();
        assert!(matches!(err, SpecError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ManifestReader::read("/nonexistent/agent.yaml").unwrap_err();
        assert!(matches!(err, SpecError::NotFound(_)));
    }

    #[test]
    fn test_malformed_json_reports_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("agent.json");
        fs::write(&path, "{not json").unwrap();

        let err = ManifestReader::read(&path).unwrap_err();
        assert!(matches!(err, SpecError::InvalidFormat { .. }));
    }
}
