//! Discovery records and the merge rules applied to them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ossa_spec::naming::kebab_case;

use crate::error::DiscoveryError;
use crate::fragment::RawFragment;

/// Agent ecosystems the discovery engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentFormat {
    Drupal,
    Mcp,
    #[serde(rename = "langchain")]
    LangChain,
    #[serde(rename = "crewai")]
    CrewAi,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Unknown,
}

impl AgentFormat {
    pub const ALL: [AgentFormat; 7] = [
        AgentFormat::Drupal,
        AgentFormat::Mcp,
        AgentFormat::LangChain,
        AgentFormat::CrewAi,
        AgentFormat::OpenAi,
        AgentFormat::Anthropic,
        AgentFormat::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentFormat::Drupal => "drupal",
            AgentFormat::Mcp => "mcp",
            AgentFormat::LangChain => "langchain",
            AgentFormat::CrewAi => "crewai",
            AgentFormat::OpenAi => "openai",
            AgentFormat::Anthropic => "anthropic",
            AgentFormat::Unknown => "unknown",
        }
    }

    /// Vendor SDK formats translate to experimental manifests.
    pub fn is_vendor(&self) -> bool {
        matches!(self, AgentFormat::OpenAi | AgentFormat::Anthropic)
    }
}

impl fmt::Display for AgentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentFormat {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        AgentFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| DiscoveryError::UnknownFormat(s.to_string()))
    }
}

/// One sighting of an agent definition in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    /// `<format>-<kebab name>`.
    pub id: String,
    pub format: AgentFormat,
    pub name: String,
    pub source_path: PathBuf,
    pub fragment: RawFragment,
    pub confidence: f64,
    pub detector: String,
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveryRecord {
    pub fn new(
        format: AgentFormat,
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        fragment: RawFragment,
        confidence: f64,
        detector: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: Self::make_id(format, &name),
            format,
            name,
            source_path: source_path.into(),
            fragment,
            confidence: confidence.clamp(0.0, 1.0),
            detector: detector.into(),
            discovered_at: Utc::now(),
        }
    }

    /// Deterministic record id for a format and human name.
    pub fn make_id(format: AgentFormat, name: &str) -> String {
        let slug = kebab_case(name);
        let slug = if slug.is_empty() { "unnamed".to_string() } else { slug };
        format!("{}-{}", format.as_str(), slug)
    }
}

/// Collapse sightings sharing `(source_path, id)`, keeping the most confident,
/// then order the survivors with [`rank`].
pub fn deduplicate(records: Vec<DiscoveryRecord>) -> Vec<DiscoveryRecord> {
    let mut best: HashMap<(PathBuf, String), DiscoveryRecord> = HashMap::new();
    for record in records {
        let key = (record.source_path.clone(), record.id.clone());
        match best.get(&key) {
            Some(existing) if existing.confidence >= record.confidence => {}
            _ => {
                best.insert(key, record);
            }
        }
    }
    let mut merged: Vec<_> = best.into_values().collect();
    rank(&mut merged);
    merged
}

/// Confidence descending, then id, then path.
pub fn rank(records: &mut [DiscoveryRecord]) {
    records.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.source_path.cmp(&b.source_path))
    });
}

/// Drop filename-only sightings for files another detector already explained.
pub fn drop_shadowed_heuristics(records: Vec<DiscoveryRecord>) -> Vec<DiscoveryRecord> {
    let explained: std::collections::HashSet<PathBuf> = records
        .iter()
        .filter(|r| r.format != AgentFormat::Unknown)
        .map(|r| r.source_path.clone())
        .collect();
    records
        .into_iter()
        .filter(|r| r.format != AgentFormat::Unknown || !explained.contains(&r.source_path))
        .collect()
}

/// Compare two records by confidence only.
pub fn by_confidence(a: &DiscoveryRecord, b: &DiscoveryRecord) -> Ordering {
    a.confidence.total_cmp(&b.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(format: AgentFormat, name: &str, path: &str, confidence: f64) -> DiscoveryRecord {
        DiscoveryRecord::new(
            format,
            name,
            path,
            RawFragment::Unknown(serde_json::json!({})),
            confidence,
            "test",
        )
    }

    #[test]
    fn test_make_id() {
        assert_eq!(DiscoveryRecord::make_id(AgentFormat::CrewAi, "Research Crew"), "crewai-research-crew");
        assert_eq!(DiscoveryRecord::make_id(AgentFormat::Mcp, "weather_server"), "mcp-weather-server");
        assert_eq!(DiscoveryRecord::make_id(AgentFormat::Unknown, "???"), "unknown-unnamed");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CrewAI".parse::<AgentFormat>().unwrap(), AgentFormat::CrewAi);
        assert_eq!("langchain".parse::<AgentFormat>().unwrap(), AgentFormat::LangChain);
        assert!("autogen".parse::<AgentFormat>().is_err());
        assert_eq!(AgentFormat::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(record(AgentFormat::Mcp, "x", "/a", 1.7).confidence, 1.0);
        assert_eq!(record(AgentFormat::Mcp, "x", "/a", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_dedup_keeps_highest_confidence() {
        let records = vec![
            record(AgentFormat::CrewAi, "crew", "/p/crew.py", 0.75),
            record(AgentFormat::CrewAi, "crew", "/p/crew.py", 0.95),
            record(AgentFormat::CrewAi, "crew", "/p/other.py", 0.70),
        ];
        let merged = deduplicate(records);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].confidence, 0.95);
        assert_eq!(merged[1].source_path, PathBuf::from("/p/other.py"));
    }

    #[test]
    fn test_rank_breaks_ties_by_id_then_path() {
        let mut records = vec![
            record(AgentFormat::Mcp, "b", "/2", 0.8),
            record(AgentFormat::Mcp, "a", "/2", 0.8),
            record(AgentFormat::Mcp, "a", "/1", 0.8),
        ];
        rank(&mut records);
        let order: Vec<_> = records
            .iter()
            .map(|r| (r.id.as_str(), r.source_path.to_str().unwrap()))
            .collect();
        assert_eq!(order, vec![("mcp-a", "/1"), ("mcp-a", "/2"), ("mcp-b", "/2")]);
    }

    #[test]
    fn test_drop_shadowed_heuristics() {
        let records = vec![
            record(AgentFormat::Unknown, "agent", "/p/agent.py", 0.3),
            record(AgentFormat::LangChain, "agent", "/p/agent.py", 0.8),
            record(AgentFormat::Unknown, "helper", "/p/helper_agent.py", 0.3),
        ];
        let kept = drop_shadowed_heuristics(records);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().any(|r| r.id == "unknown-helper"));
    }

    proptest! {
        #[test]
        fn prop_dedup_unique_keys_and_max_confidence(
            entries in proptest::collection::vec((0usize..4, 0usize..3, 0.0f64..=1.0), 0..40)
        ) {
            let records: Vec<_> = entries
                .iter()
                .map(|(n, p, c)| record(AgentFormat::LangChain, &format!("agent {}", n), &format!("/src/{}.py", p), *c))
                .collect();
            let merged = deduplicate(records.clone());

            let mut keys = std::collections::HashSet::new();
            for r in &merged {
                prop_assert!(keys.insert((r.source_path.clone(), r.id.clone())));
                let max = records
                    .iter()
                    .filter(|o| o.source_path == r.source_path && o.id == r.id)
                    .map(|o| o.confidence)
                    .fold(f64::MIN, f64::max);
                prop_assert_eq!(r.confidence, max);
            }
            for pair in merged.windows(2) {
                prop_assert!(by_confidence(&pair[0], &pair[1]) != Ordering::Less);
            }
        }
    }
}
