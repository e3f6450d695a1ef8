//! Registry search filters and ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use ossa_discovery::AgentFormat;

use crate::error::{RegistryError, RegistryResult};
use crate::models::CachedAgent;

/// Sort order for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Manifest name, ascending.
    #[default]
    Name,
    /// Discovery confidence, descending.
    Confidence,
    /// Access count, descending.
    AccessCount,
    /// Discovery time, most recent first.
    LastDiscovered,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "name" => Ok(SortField::Name),
            "confidence" => Ok(SortField::Confidence),
            "accesscount" => Ok(SortField::AccessCount),
            "lastdiscovered" => Ok(SortField::LastDiscovered),
            other => Err(format!("Unknown sort field: {}", other)),
        }
    }
}

impl SortField {
    fn compare(&self, a: &CachedAgent, b: &CachedAgent) -> Ordering {
        let primary = match self {
            SortField::Name => a.spec.metadata.name.cmp(&b.spec.metadata.name),
            SortField::Confidence => b.record.confidence.total_cmp(&a.record.confidence),
            SortField::AccessCount => b.access_count.cmp(&a.access_count),
            SortField::LastDiscovered => b.record.discovered_at.cmp(&a.record.discovered_at),
        };
        primary.then_with(|| a.id().cmp(b.id()))
    }
}

/// Conjunctive search filters. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilters {
    pub format: Option<AgentFormat>,
    /// Each entry must be a substring of some capability name.
    pub capabilities: Vec<String>,
    /// Regex over the manifest name or the discovered name.
    pub name_pattern: Option<String>,
    pub source_path_pattern: Option<String>,
    pub min_confidence: Option<f64>,
    pub sort: SortField,
    pub limit: Option<usize>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: AgentFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = Some(pattern.into());
        self
    }

    pub fn with_source_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.source_path_pattern = Some(pattern.into());
        self
    }

    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = Some(confidence);
        self
    }

    pub fn sorted_by(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compile the patterns once for a search pass.
    pub(crate) fn compile(&self) -> RegistryResult<CompiledFilters<'_>> {
        Ok(CompiledFilters {
            filters: self,
            name: compile(self.name_pattern.as_deref())?,
            source_path: compile(self.source_path_pattern.as_deref())?,
        })
    }
}

fn compile(pattern: Option<&str>) -> RegistryResult<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|e| RegistryError::InvalidPattern {
                pattern: p.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

pub(crate) struct CompiledFilters<'a> {
    filters: &'a SearchFilters,
    name: Option<Regex>,
    source_path: Option<Regex>,
}

impl CompiledFilters<'_> {
    pub fn matches(&self, agent: &CachedAgent) -> bool {
        let f = self.filters;
        if f.format.is_some_and(|format| agent.record.format != format) {
            return false;
        }
        if f.min_confidence.is_some_and(|min| agent.record.confidence < min) {
            return false;
        }
        if let Some(name) = &self.name {
            if !name.is_match(&agent.spec.metadata.name) && !name.is_match(&agent.record.name) {
                return false;
            }
        }
        if let Some(path) = &self.source_path {
            if !path.is_match(&agent.record.source_path.to_string_lossy()) {
                return false;
            }
        }
        f.capabilities.iter().all(|wanted| {
            let wanted = wanted.to_lowercase();
            agent
                .spec
                .spec
                .capabilities
                .iter()
                .any(|c| c.name.to_lowercase().contains(&wanted))
        })
    }

    /// Sort then truncate.
    pub fn finish(&self, mut agents: Vec<CachedAgent>) -> Vec<CachedAgent> {
        let sort = self.filters.sort;
        agents.sort_by(|a, b| sort.compare(a, b));
        if let Some(limit) = self.filters.limit {
            agents.truncate(limit);
        }
        agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("name".parse::<SortField>().unwrap(), SortField::Name);
        assert_eq!("access-count".parse::<SortField>().unwrap(), SortField::AccessCount);
        assert_eq!("lastDiscovered".parse::<SortField>().unwrap(), SortField::LastDiscovered);
        assert!("size".parse::<SortField>().is_err());
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let filters = SearchFilters::new().with_name_pattern("(unclosed");
        match filters.compile() {
            Err(RegistryError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }
}
