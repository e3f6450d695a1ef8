//! Discovery → translation → validation → registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;
use walkdir::WalkDir;

use ossa_discovery::{AgentFormat, DiscoveryEngine, DiscoveryRecord, DiscoverySummary};
use ossa_policy::{AgentValidator, ValidationResult};
use ossa_registry::{AgentEntry, AgentRegistry, UpdateSummary};
use ossa_translate::{TranslationResult, UniversalTranslator};

use crate::config::OssaConfig;
use crate::error::{CoreError, CoreResult};

/// What a single run should do.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict discovery to one ecosystem.
    pub format: Option<AgentFormat>,
    /// Store valid agents in the registry.
    pub register: bool,
}

impl RunOptions {
    pub fn for_format(format: AgentFormat) -> Self {
        Self {
            format: Some(format),
            ..Default::default()
        }
    }

    pub fn registering(mut self) -> Self {
        self.register = true;
        self
    }
}

/// Everything the pipeline learned about one discovered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReport {
    pub record: DiscoveryRecord,
    pub translation: TranslationResult,
    pub validation: Option<ValidationResult>,
}

impl AgentReport {
    /// Translated, structurally sound and free of blocking findings.
    pub fn is_valid(&self) -> bool {
        self.translation.is_success() && self.validation.as_ref().is_some_and(|v| v.valid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub roots: Vec<PathBuf>,
    pub files_scanned: usize,
    pub failed_categories: Vec<String>,
    pub agents: Vec<AgentReport>,
    pub registered: Option<UpdateSummary>,
    pub duration_ms: u64,
}

impl PipelineReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            roots: Vec::new(),
            files_scanned: 0,
            failed_categories: Vec::new(),
            agents: Vec::new(),
            registered: None,
            duration_ms: 0,
        }
    }

    fn absorb(&mut self, summary: &DiscoverySummary) {
        self.roots.push(summary.root.clone());
        self.files_scanned += summary.files_scanned;
        for category in &summary.failed_categories {
            if !self.failed_categories.contains(category) {
                self.failed_categories.push(category.clone());
            }
        }
    }

    pub fn translated_count(&self) -> usize {
        self.agents.iter().filter(|a| a.translation.is_success()).count()
    }

    pub fn valid_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_valid()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AgentReport> {
        self.agents.iter().filter(|a| !a.translation.is_success())
    }
}

/// Translation timing in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub min_us: u128,
    pub max_us: u128,
    pub mean_us: u128,
}

/// Outcome of repeated translation of the same records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterminismReport {
    pub records: usize,
    pub iterations: usize,
    /// Ids whose output differed between iterations.
    pub mismatched: Vec<String>,
    /// Ids that could not be translated at all.
    pub untranslatable: Vec<String>,
    pub timing: TimingStats,
}

impl DeterminismReport {
    pub fn is_deterministic(&self) -> bool {
        self.mismatched.is_empty()
    }
}

pub struct Pipeline {
    config: OssaConfig,
    engine: DiscoveryEngine,
    translator: Arc<UniversalTranslator>,
    validator: AgentValidator,
    registry: Option<Arc<AgentRegistry>>,
}

impl Pipeline {
    pub fn new(config: OssaConfig) -> CoreResult<Self> {
        let engine = DiscoveryEngine::with_default_detectors(config.discovery.clone())?;
        let translator = Arc::new(UniversalTranslator::new(config.translation.clone()));
        let validator = AgentValidator::new(config.validation.clone())?;
        Ok(Self {
            config,
            engine,
            translator,
            validator,
            registry: None,
        })
    }

    pub fn with_registry(mut self, registry: Arc<AgentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Open the registry described by the config and attach it.
    pub fn with_configured_registry(self) -> CoreResult<Self> {
        let registry = AgentRegistry::open(self.config.registry.clone())?;
        Ok(self.with_registry(Arc::new(registry)))
    }

    pub fn config(&self) -> &OssaConfig {
        &self.config
    }

    pub fn engine(&self) -> &DiscoveryEngine {
        &self.engine
    }

    pub fn translator(&self) -> &Arc<UniversalTranslator> {
        &self.translator
    }

    pub fn validator(&self) -> &AgentValidator {
        &self.validator
    }

    pub fn registry(&self) -> Option<&Arc<AgentRegistry>> {
        self.registry.as_ref()
    }

    /// Discover under `root`, translate, validate and optionally register.
    #[instrument(skip(self, options), fields(root = %root.display(), run_id = field::Empty))]
    pub async fn run(&self, root: &Path, options: &RunOptions) -> CoreResult<PipelineReport> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));
        let started = Instant::now();

        let mut report = PipelineReport::new(run_id);
        let summary = self.discover(root, options.format).await?;
        report.absorb(&summary);
        report.agents = self.process(summary.records).await;

        if options.register {
            report.registered = self.register(&report.agents).await?;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Run {}: {} discovered, {} translated, {} valid ({}ms)",
            run_id,
            report.agents.len(),
            report.translated_count(),
            report.valid_count(),
            report.duration_ms
        );
        Ok(report)
    }

    /// Run the pipeline over every directory named `module` under `root`.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn analyze_module(&self, root: &Path, module: &str) -> CoreResult<PipelineReport> {
        let started = Instant::now();
        let module_dirs = self.find_module_dirs(root, module);
        if module_dirs.is_empty() {
            return Err(CoreError::ModuleNotFound(module.to_string()));
        }
        debug!("Module '{}' found at {} locations", module, module_dirs.len());

        let mut report = PipelineReport::new(Uuid::new_v4());
        let mut records = Vec::new();
        for dir in &module_dirs {
            let summary = self.discover(dir, None).await?;
            report.absorb(&summary);
            records.extend(summary.records);
        }
        report.agents = self.process(records).await;
        report.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Translate every discovered record `iterations` times and compare outputs.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn test_translation(&self, root: &Path, iterations: usize) -> CoreResult<DeterminismReport> {
        let iterations = iterations.max(1);
        let records = self.discover(root, None).await?.records;

        let mut mismatched = Vec::new();
        let mut untranslatable = Vec::new();
        let mut samples: Vec<u128> = Vec::with_capacity(records.len() * iterations);

        for record in &records {
            let mut baseline: Option<String> = None;
            let mut diverged = false;
            for _ in 0..iterations {
                let started = Instant::now();
                let result = self.translator.translate_fresh(record);
                samples.push(started.elapsed().as_micros());

                let Some(spec) = result.spec else {
                    untranslatable.push(record.id.clone());
                    break;
                };
                let json = match spec.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Cannot serialize manifest for {}: {}", record.id, e);
                        untranslatable.push(record.id.clone());
                        break;
                    }
                };
                match &baseline {
                    None => baseline = Some(json),
                    Some(first) if *first != json => diverged = true,
                    Some(_) => {}
                }
            }
            if diverged {
                warn!("Translation of {} is not deterministic", record.id);
                mismatched.push(record.id.clone());
            }
        }

        let timing = if samples.is_empty() {
            TimingStats::default()
        } else {
            TimingStats {
                min_us: samples.iter().copied().min().unwrap_or_default(),
                max_us: samples.iter().copied().max().unwrap_or_default(),
                mean_us: samples.iter().sum::<u128>() / samples.len() as u128,
            }
        };

        Ok(DeterminismReport {
            records: records.len(),
            iterations,
            mismatched,
            untranslatable,
            timing,
        })
    }

    async fn discover(&self, root: &Path, format: Option<AgentFormat>) -> CoreResult<DiscoverySummary> {
        let summary = match format {
            Some(format) => self.engine.run_format(root, format).await?,
            None => self.engine.run(root).await?,
        };
        Ok(summary)
    }

    async fn process(&self, records: Vec<DiscoveryRecord>) -> Vec<AgentReport> {
        let translations = self.translator.translate_batch(records.clone()).await;
        records
            .into_iter()
            .zip(translations)
            .map(|(record, translation)| {
                let validation = translation.spec.as_ref().map(|spec| self.validator.validate(spec));
                AgentReport {
                    record,
                    translation,
                    validation,
                }
            })
            .collect()
    }

    async fn register(&self, agents: &[AgentReport]) -> CoreResult<Option<UpdateSummary>> {
        let Some(registry) = self.registry.clone() else {
            warn!("Registration requested but no registry is configured");
            return Ok(None);
        };

        let entries: Vec<AgentEntry> = agents
            .iter()
            .filter(|a| a.translation.is_success())
            .filter_map(|a| {
                let spec = a.translation.spec.clone()?;
                let entry = AgentEntry::new(a.record.clone(), spec);
                Some(match &a.validation {
                    Some(validation) => entry.with_validation(validation.clone()),
                    None => entry,
                })
            })
            .collect();

        let summary = tokio::task::spawn_blocking(move || registry.update(entries))
            .await
            .map_err(|e| CoreError::TaskFailed(e.to_string()))?;
        Ok(Some(summary))
    }

    fn find_module_dirs(&self, root: &Path, module: &str) -> Vec<PathBuf> {
        let discovery = &self.config.discovery;
        let mut dirs: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(discovery.follow_links)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir()
                        && e.file_name().to_str().is_some_and(|n| discovery.is_excluded_dir(n)))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.depth() > 0 && e.file_type().is_dir() && e.file_name() == module)
            .map(|e| e.into_path())
            .collect();
        dirs.sort();
        // A module nested inside another match is already covered.
        let mut outer: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            if !outer.iter().any(|o| dir.starts_with(o)) {
                outer.push(dir);
            }
        }
        outer
    }
}
