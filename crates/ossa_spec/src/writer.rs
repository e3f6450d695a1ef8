//! Manifest file writing utilities.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SpecResult;
use crate::models::AgentManifest;
use crate::reader::ManifestFormat;

/// Writer for manifest files.
pub struct ManifestWriter;

impl ManifestWriter {
    /// Write a manifest, choosing YAML or JSON from the file extension.
    pub fn write(path: impl AsRef<Path>, manifest: &AgentManifest) -> SpecResult<()> {
        let path = path.as_ref();
        debug!("Writing manifest to {:?}", path);

        let content = Self::render(manifest, ManifestFormat::from_path(path)?)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Render a manifest in the given encoding.
    pub fn render(manifest: &AgentManifest, format: ManifestFormat) -> SpecResult<String> {
        let content = match format {
            ManifestFormat::Yaml => serde_yaml::to_string(manifest)?,
            ManifestFormat::Json => serde_json::to_string_pretty(manifest)?,
        };
        Ok(content)
    }

    /// Conventional output path for a manifest inside `dir`.
    pub fn manifest_path(dir: &Path, manifest: &AgentManifest) -> PathBuf {
        dir.join(format!("{}.ossa.yaml", manifest.metadata.name))
    }
}
