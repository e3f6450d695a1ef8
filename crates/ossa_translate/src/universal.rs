//! Dispatch, optional structural re-validation, memoization and batching.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ossa_discovery::{AgentFormat, DiscoveryRecord, RawFragment};
use ossa_spec::{AgentManifest, StructuralValidator};

use crate::error::TranslateError;
use crate::translators::dispatch;

/// Translator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Require structural validity for `validation_passed`.
    pub strict: bool,
    /// Memoize structurally valid results by agent id.
    pub cache: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            strict: true,
            cache: true,
        }
    }
}

/// Outcome of translating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub agent_id: String,
    pub format: AgentFormat,
    pub spec: Option<AgentManifest>,
    pub duration_ms: u64,
    pub validation_passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TranslationResult {
    pub fn failure(record: &DiscoveryRecord, error: impl ToString) -> Self {
        Self {
            agent_id: record.id.clone(),
            format: record.format,
            spec: None,
            duration_ms: 0,
            validation_passed: false,
            errors: vec![error.to_string()],
            warnings: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.spec.is_some() && self.validation_passed
    }
}

struct CacheEntry {
    fragment: RawFragment,
    result: TranslationResult,
}

/// Translates discovery records into manifests.
pub struct UniversalTranslator {
    config: TranslatorConfig,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for UniversalTranslator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl UniversalTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate one record, serving a memoized result when the fragment is unchanged.
    pub fn translate_to_spec(&self, record: &DiscoveryRecord) -> TranslationResult {
        if self.config.cache {
            let cache = self.cache.lock();
            if let Some(entry) = cache.get(&record.id) {
                if entry.fragment == record.fragment {
                    debug!("Translation cache hit for {}", record.id);
                    return entry.result.clone();
                }
            }
        }

        let result = self.translate_fresh(record);
        if self.config.cache && result.validation_passed {
            self.cache.lock().insert(
                record.id.clone(),
                CacheEntry {
                    fragment: record.fragment.clone(),
                    result: result.clone(),
                },
            );
        }
        result
    }

    /// Translate one record without consulting or filling the cache.
    pub fn translate_fresh(&self, record: &DiscoveryRecord) -> TranslationResult {
        let started = Instant::now();
        let mut result = match dispatch(record) {
            Ok(translation) => {
                let (validation_passed, errors) = if self.config.strict {
                    let report = StructuralValidator::check_strict(&translation.manifest);
                    (report.valid, report.error_messages())
                } else {
                    (true, Vec::new())
                };
                TranslationResult {
                    agent_id: record.id.clone(),
                    format: record.format,
                    spec: Some(translation.manifest),
                    duration_ms: 0,
                    validation_passed,
                    errors,
                    warnings: translation.warnings,
                }
            }
            Err(e) => {
                warn!("Cannot translate {}: {}", record.id, e);
                TranslationResult::failure(record, e)
            }
        };
        result.duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            "Translated {} in {}ms (passed: {})",
            record.id, result.duration_ms, result.validation_passed
        );
        result
    }

    /// Drop the memoized result for one agent.
    pub fn invalidate(&self, agent_id: &str) -> bool {
        self.cache.lock().remove(agent_id).is_some()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Translate many records, one blocking worker per format.
    ///
    /// Always returns exactly one result per input, in input order. A worker
    /// that panics yields failure results for every record it owned.
    pub async fn translate_batch(self: &Arc<Self>, records: Vec<DiscoveryRecord>) -> Vec<TranslationResult> {
        let records = Arc::new(records);
        let mut groups: BTreeMap<AgentFormat, Vec<usize>> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            groups.entry(record.format).or_default().push(i);
        }

        let mut workers = Vec::with_capacity(groups.len());
        for (format, indices) in groups {
            let translator = Arc::clone(self);
            let shared = Arc::clone(&records);
            let owned = indices.clone();
            let handle = tokio::task::spawn_blocking(move || {
                owned
                    .into_iter()
                    .map(|i| (i, translator.translate_to_spec(&shared[i])))
                    .collect::<Vec<_>>()
            });
            workers.push((format, indices, handle));
        }

        let mut slots: Vec<Option<TranslationResult>> = vec![None; records.len()];
        for (format, indices, handle) in workers {
            match handle.await {
                Ok(done) => {
                    for (i, result) in done {
                        slots[i] = Some(result);
                    }
                }
                Err(e) => {
                    warn!("Translation worker for {} failed: {}", format, e);
                    let error = TranslateError::WorkerFailed(e.to_string());
                    for i in indices {
                        slots[i] = Some(TranslationResult::failure(&records[i], &error));
                    }
                }
            }
        }

        let results: Vec<TranslationResult> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    TranslationResult::failure(&records[i], TranslateError::WorkerFailed("no result".into()))
                })
            })
            .collect();
        let passed = results.iter().filter(|r| r.validation_passed).count();
        info!("Translated batch of {} records ({} passed)", results.len(), passed);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_discovery::{CrewFragment, CrewMember, McpFragment};

    fn mcp_record(name: &str, tools: &[&str]) -> DiscoveryRecord {
        let fragment = McpFragment {
            server_name: name.to_string(),
            transport: "stdio".into(),
            command: Some("node".into()),
            tools: tools.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        DiscoveryRecord::new(AgentFormat::Mcp, name, "/p/mcp.json", RawFragment::Mcp(fragment), 0.95, "mcp-server")
    }

    #[test]
    fn test_successful_translation_is_cached() {
        let translator = UniversalTranslator::default();
        let record = mcp_record("weather", &["forecast"]);

        let first = translator.translate_to_spec(&record);
        assert!(first.is_success());
        assert_eq!(translator.cache_len(), 1);

        let second = translator.translate_to_spec(&record);
        assert_eq!(first, second);
        assert!(translator.invalidate(&record.id));
        assert_eq!(translator.cache_len(), 0);
    }

    #[test]
    fn test_changed_fragment_is_retranslated() {
        let translator = UniversalTranslator::default();
        let before = mcp_record("weather", &["forecast"]);
        let after = mcp_record("weather", &["forecast", "alerts"]);
        assert_eq!(before.id, after.id);

        translator.translate_to_spec(&before);
        let result = translator.translate_to_spec(&after);
        let schema = result.spec.unwrap().spec.capabilities[0].input_schema.clone().unwrap();
        assert_eq!(schema["properties"]["tool"]["enum"], serde_json::json!(["forecast", "alerts"]));
    }

    #[test]
    fn test_structurally_invalid_results_are_not_cached() {
        let translator = UniversalTranslator::default();
        let crew = CrewFragment {
            crew_name: "empty".into(),
            ..Default::default()
        };
        let record = DiscoveryRecord::new(
            AgentFormat::CrewAi,
            "empty",
            "/p/crew.py",
            RawFragment::CrewAi(crew),
            0.8,
            "crewai-crew",
        );

        let result = translator.translate_to_spec(&record);
        assert!(result.spec.is_some());
        assert!(!result.validation_passed);
        assert!(!result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(translator.cache_len(), 0);
    }

    #[test]
    fn test_non_strict_passes_any_spec() {
        let translator = UniversalTranslator::new(TranslatorConfig {
            strict: false,
            cache: false,
        });
        let crew = CrewFragment {
            crew_name: "empty".into(),
            ..Default::default()
        };
        let record = DiscoveryRecord::new(AgentFormat::CrewAi, "empty", "/p/c.py", RawFragment::CrewAi(crew), 0.8, "t");
        let result = translator.translate_to_spec(&record);
        assert!(result.validation_passed);
        assert_eq!(translator.cache_len(), 0);
    }

    #[test]
    fn test_unknown_record_fails_alone() {
        let translator = UniversalTranslator::default();
        let record = DiscoveryRecord::new(
            AgentFormat::Unknown,
            "x",
            "/p/x_agent.py",
            RawFragment::Unknown(serde_json::json!({})),
            0.3,
            "filename-heuristic",
        );
        let result = translator.translate_to_spec(&record);
        assert!(result.spec.is_none());
        assert!(!result.validation_passed);
        assert_eq!(result.errors, vec!["No translator for format 'unknown'"]);
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let translator = Arc::new(UniversalTranslator::default());
        let crew = CrewFragment {
            crew_name: "duo".into(),
            members: vec![CrewMember { role: "A".into(), ..Default::default() }],
            ..Default::default()
        };
        let records = vec![
            mcp_record("one", &[]),
            DiscoveryRecord::new(AgentFormat::CrewAi, "duo", "/p/crew.py", RawFragment::CrewAi(crew), 0.8, "t"),
            mcp_record("two", &[]),
        ];
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();

        let results = translator.translate_batch(records).await;
        assert_eq!(results.iter().map(|r| r.agent_id.clone()).collect::<Vec<_>>(), ids);
        assert!(results.iter().all(|r| r.is_success()));
    }
}
