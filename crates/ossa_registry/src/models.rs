//! Registry entries, statistics and update summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ossa_discovery::DiscoveryRecord;
use ossa_policy::ValidationResult;
use ossa_spec::AgentManifest;

/// A translated agent offered to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub record: DiscoveryRecord,
    pub spec: AgentManifest,
    pub validation: Option<ValidationResult>,
}

impl AgentEntry {
    pub fn new(record: DiscoveryRecord, spec: AgentManifest) -> Self {
        Self {
            record,
            spec,
            validation: None,
        }
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// A registered agent with its access bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAgent {
    pub record: DiscoveryRecord,
    pub spec: AgentManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub cache_key: String,
}

impl CachedAgent {
    pub fn new(entry: AgentEntry, now: DateTime<Utc>) -> Self {
        let cache_key = cache_key(&entry.record, &entry.spec);
        Self {
            record: entry.record,
            spec: entry.spec,
            validation: entry.validation,
            cached_at: now,
            last_accessed: now,
            access_count: 0,
            cache_key,
        }
    }

    /// Replace content from a fresh discovery, keeping bookkeeping.
    pub fn refresh(&mut self, entry: AgentEntry) {
        self.cache_key = cache_key(&entry.record, &entry.spec);
        self.record = entry.record;
        self.spec = entry.spec;
        self.validation = entry.validation;
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed = now;
    }
}

/// `<format>:<sourcePath>:<version>`
pub fn cache_key(record: &DiscoveryRecord, spec: &AgentManifest) -> String {
    format!(
        "{}:{}:{}",
        record.format,
        record.source_path.display(),
        spec.metadata.version
    )
}

/// Counters describing the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_agents: usize,
    pub by_format: BTreeMap<String, usize>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub last_discovery: Option<DateTime<Utc>>,
}

impl RegistryStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// What an `update` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Ids removed to bring the registry back within its size limit.
    pub evicted: Vec<String>,
    /// Ids now served from a different source file than before.
    #[serde(default)]
    pub relocated: Vec<String>,
}
