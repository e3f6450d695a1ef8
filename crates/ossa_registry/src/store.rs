//! On-disk snapshot of the registry.
//!
//! ```text
//! <cache dir>/
//! ├── agents.json          # {agents[], lastDiscovery, stats}
//! └── agents.access.json   # {id: accessCount}
//! ```
//!
//! Both files are written to a temp file in the same directory and renamed
//! into place, so a crash never leaves a half-written snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::models::{CachedAgent, RegistryStats};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub agents: Vec<CachedAgent>,
    pub last_discovery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: RegistryStats,
}

impl Snapshot {
    /// Whether the snapshot is older than the configured TTL.
    pub fn is_expired(&self, config: &RegistryConfig, now: DateTime<Utc>) -> bool {
        match self.last_discovery {
            Some(last) => match (now - last).to_std() {
                Ok(age) => age > config.ttl(),
                // Stamped in the future; treat as fresh.
                Err(_) => false,
            },
            None => !self.agents.is_empty(),
        }
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> RegistryResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| RegistryError::Persist {
        path: path.display().to_string(),
        message: e.error.to_string(),
    })?;
    Ok(())
}

/// Write only the access-count sidecar.
pub fn save_access<'a>(
    config: &RegistryConfig,
    agents: impl IntoIterator<Item = &'a CachedAgent>,
) -> RegistryResult<()> {
    let access: BTreeMap<&str, u64> = agents
        .into_iter()
        .map(|a| (a.id(), a.access_count))
        .collect();
    write_atomic(&config.access_path(), &serde_json::to_vec_pretty(&access)?)
}

/// Write the snapshot and the access-count sidecar.
pub fn save(config: &RegistryConfig, snapshot: &Snapshot) -> RegistryResult<()> {
    write_atomic(&config.cache_path, &serde_json::to_vec_pretty(snapshot)?)?;
    save_access(config, &snapshot.agents)?;
    debug!(
        "Saved {} agents to {}",
        snapshot.agents.len(),
        config.cache_path.display()
    );
    Ok(())
}

fn read_optional(path: &Path) -> RegistryResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load a snapshot, discarding it wholesale when expired.
///
/// Returns `None` when nothing usable is on disk.
pub fn load(config: &RegistryConfig, now: DateTime<Utc>) -> RegistryResult<Option<Snapshot>> {
    let Some(content) = read_optional(&config.cache_path)? else {
        debug!("No registry snapshot at {}", config.cache_path.display());
        return Ok(None);
    };
    let mut snapshot: Snapshot = serde_json::from_str(&content)?;

    if snapshot.is_expired(config, now) {
        info!(
            "Discarding registry snapshot at {}: older than {}s",
            config.cache_path.display(),
            config.ttl_secs
        );
        return Ok(None);
    }

    match read_optional(&config.access_path()) {
        Ok(Some(content)) => match serde_json::from_str::<BTreeMap<String, u64>>(&content) {
            Ok(access) => {
                for agent in &mut snapshot.agents {
                    if let Some(count) = access.get(agent.id()) {
                        agent.access_count = *count;
                    }
                }
            }
            Err(e) => warn!("Ignoring unreadable access counts: {}", e),
        },
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable access counts: {}", e),
    }

    Ok(Some(snapshot))
}

/// Remove both cache files; missing files are fine.
pub fn remove(config: &RegistryConfig) -> RegistryResult<()> {
    for path in [config.cache_path.clone(), config.access_path()] {
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
