//! The discovery engine: one walk, concurrent detector categories, merged output.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryConfig;
use crate::detector::{compile_patterns, is_candidate, Detector};
use crate::detectors::default_detectors;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::record::{deduplicate, drop_shadowed_heuristics, AgentFormat, DiscoveryRecord};

/// Outcome of a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySummary {
    pub root: PathBuf,
    pub records: Vec<DiscoveryRecord>,
    pub files_scanned: usize,
    pub categories_run: Vec<String>,
    /// Categories that timed out or panicked and contributed nothing.
    pub failed_categories: Vec<String>,
    pub duration_ms: u64,
}

impl DiscoverySummary {
    pub fn count_by_format(&self, format: AgentFormat) -> usize {
        self.records.iter().filter(|r| r.format == format).count()
    }
}

/// A detector with its compiled file globs.
struct Category {
    detector: Arc<dyn Detector>,
    patterns: Arc<Vec<Pattern>>,
}

/// Scans a directory tree with a set of detectors.
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    categories: Vec<Category>,
}

impl DiscoveryEngine {
    /// An engine with no detectors; add them with [`DiscoveryEngine::register`].
    pub fn new(config: DiscoveryConfig) -> DiscoveryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            categories: Vec::new(),
        })
    }

    /// An engine with every built-in detector enabled by `config`.
    pub fn with_default_detectors(config: DiscoveryConfig) -> DiscoveryResult<Self> {
        let detectors = default_detectors(&config)?;
        let mut engine = Self::new(config)?;
        for detector in detectors {
            engine.register(detector)?;
        }
        Ok(engine)
    }

    pub fn register(&mut self, detector: Arc<dyn Detector>) -> DiscoveryResult<()> {
        let patterns = compile_patterns(detector.as_ref())?;
        debug!("Registered detector {} ({} patterns)", detector.name(), patterns.len());
        self.categories.push(Category {
            detector,
            patterns: Arc::new(patterns),
        });
        Ok(())
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| c.detector.name()).collect()
    }

    /// All sightings under `root`, merged and ranked.
    pub async fn discover_all(&self, root: impl AsRef<Path>) -> DiscoveryResult<Vec<DiscoveryRecord>> {
        Ok(self.scan(root.as_ref(), None).await?.records)
    }

    /// Sightings of a single ecosystem.
    pub async fn discover_format(
        &self,
        root: impl AsRef<Path>,
        format: AgentFormat,
    ) -> DiscoveryResult<Vec<DiscoveryRecord>> {
        Ok(self.scan(root.as_ref(), Some(format)).await?.records)
    }

    /// Full run with scan statistics.
    pub async fn run(&self, root: impl AsRef<Path>) -> DiscoveryResult<DiscoverySummary> {
        self.scan(root.as_ref(), None).await
    }

    /// Full run restricted to one ecosystem.
    pub async fn run_format(&self, root: impl AsRef<Path>, format: AgentFormat) -> DiscoveryResult<DiscoverySummary> {
        self.scan(root.as_ref(), Some(format)).await
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    async fn scan(&self, root: &Path, only: Option<AgentFormat>) -> DiscoveryResult<DiscoverySummary> {
        let started = Instant::now();
        if !root.is_dir() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize()?;

        let files = {
            let root = root.clone();
            let config = self.config.clone();
            tokio::task::spawn_blocking(move || collect_files(&root, &config))
                .await
                .map_err(|e| DiscoveryError::TaskFailed(e.to_string()))?
        };
        let files = Arc::new(files);
        debug!("Collected {} candidate files", files.len());

        let deadline = tokio::time::Instant::now() + self.config.detector_timeout();
        let mut running: Vec<(&'static str, Arc<AtomicBool>, JoinHandle<Vec<DiscoveryRecord>>)> = Vec::new();

        for category in &self.categories {
            let format = category.detector.format();
            if only.is_some_and(|f| f != format) || (only.is_none() && !self.config.format_enabled(format)) {
                continue;
            }
            let cancelled = Arc::new(AtomicBool::new(false));
            let handle = {
                let detector = Arc::clone(&category.detector);
                let patterns = Arc::clone(&category.patterns);
                let files = Arc::clone(&files);
                let cancelled = Arc::clone(&cancelled);
                tokio::task::spawn_blocking(move || {
                    scan_category(detector.as_ref(), &patterns, &files, &cancelled)
                })
            };
            running.push((category.detector.name(), cancelled, handle));
        }

        let mut records = Vec::new();
        let mut categories_run = Vec::new();
        let mut failed_categories = Vec::new();
        for (name, cancelled, handle) in running {
            categories_run.push(name.to_string());
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(found)) => {
                    debug!("Detector {} produced {} sightings", name, found.len());
                    records.extend(found);
                }
                Ok(Err(e)) => {
                    warn!("Detector {} failed: {}", name, e);
                    failed_categories.push(name.to_string());
                }
                Err(_) => {
                    cancelled.store(true, Ordering::Relaxed);
                    warn!(
                        "Detector {} exceeded {}s deadline, discarding its results",
                        name, self.config.detector_timeout_secs
                    );
                    failed_categories.push(name.to_string());
                }
            }
        }

        let min_confidence = self.config.min_confidence;
        let records: Vec<_> = drop_shadowed_heuristics(deduplicate(records))
            .into_iter()
            .filter(|r| r.confidence >= min_confidence)
            .collect();

        let summary = DiscoverySummary {
            root,
            files_scanned: files.len(),
            categories_run,
            failed_categories,
            duration_ms: started.elapsed().as_millis() as u64,
            records,
        };
        info!(
            "Discovered {} agents in {} files ({}ms)",
            summary.records.len(),
            summary.files_scanned,
            summary.duration_ms
        );
        Ok(summary)
    }
}

fn is_excluded(entry: &DirEntry, config: &DiscoveryConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| config.is_excluded_dir(name))
            .unwrap_or(false)
}

/// Regular files under `root` outside excluded directories and within the size limit.
fn collect_files(root: &Path, config: &DiscoveryConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(config.follow_links)
        .into_iter()
        .filter_entry(|e| !is_excluded(e, config))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| match e.metadata() {
            Ok(meta) if meta.len() > config.max_file_bytes => {
                debug!("Skipping oversized file {:?} ({} bytes)", e.path(), meta.len());
                false
            }
            Ok(_) => true,
            Err(_) => false,
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Run one detector over every candidate file, stopping early once cancelled.
fn scan_category(
    detector: &dyn Detector,
    patterns: &[Pattern],
    files: &[PathBuf],
    cancelled: &AtomicBool,
) -> Vec<DiscoveryRecord> {
    let mut records = Vec::new();
    for path in files {
        if cancelled.load(Ordering::Relaxed) {
            debug!("Detector {} cancelled", detector.name());
            break;
        }
        if !is_candidate(path, patterns) {
            continue;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };
        let Some(confidence) = detector.matches(path, &content) else {
            continue;
        };
        for sighting in detector.extract(path, &content) {
            records.push(DiscoveryRecord::new(
                detector.format(),
                sighting.name,
                path.clone(),
                sighting.fragment,
                confidence,
                detector.name(),
            ));
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{MockDetector, Sighting};
    use crate::fragment::RawFragment;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn mock(name: &'static str, format: AgentFormat, confidence: f64) -> MockDetector {
        let mut detector = MockDetector::new();
        detector.expect_name().return_const(name);
        detector.expect_format().return_const(format);
        detector
            .expect_file_patterns()
            .returning(|| vec!["*.agent".to_string()]);
        detector.expect_matches().returning(move |_, _| Some(confidence));
        detector.expect_extract().returning(|path, _| {
            vec![Sighting::new(
                path.file_stem().unwrap().to_str().unwrap(),
                RawFragment::Unknown(serde_json::json!({})),
            )]
        });
        detector
    }

    fn tree() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("alpha.agent"), "a").unwrap();
        fs::write(temp.path().join("beta.agent"), "b").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(temp.path().join("node_modules")).unwrap();
        fs::write(temp.path().join("node_modules").join("gamma.agent"), "c").unwrap();
        temp
    }

    #[tokio::test]
    async fn test_mock_detector_sees_only_candidates() {
        let temp = tree();
        let mut engine = DiscoveryEngine::new(DiscoveryConfig::default()).unwrap();
        engine
            .register(Arc::new(mock("mock-mcp", AgentFormat::Mcp, 0.9)))
            .unwrap();

        let records = engine.discover_all(temp.path()).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mcp-alpha", "mcp-beta"]);
        assert!(records.iter().all(|r| r.detector == "mock-mcp"));
        assert!(records.iter().all(|r| r.source_path.is_absolute()));
    }

    #[tokio::test]
    async fn test_panicking_detector_contributes_nothing() {
        let temp = tree();
        let mut broken = MockDetector::new();
        broken.expect_name().return_const("broken");
        broken.expect_format().return_const(AgentFormat::Drupal);
        broken
            .expect_file_patterns()
            .returning(|| vec!["*.agent".to_string()]);
        broken.expect_matches().returning(|_, _| panic!("detector bug"));

        let mut engine = DiscoveryEngine::new(DiscoveryConfig::default()).unwrap();
        engine.register(Arc::new(broken)).unwrap();
        engine
            .register(Arc::new(mock("healthy", AgentFormat::LangChain, 0.8)))
            .unwrap();

        let summary = engine.run(temp.path()).await.unwrap();
        assert_eq!(summary.failed_categories, vec!["broken"]);
        assert_eq!(summary.records.len(), 2);
        assert!(summary.records.iter().all(|r| r.format == AgentFormat::LangChain));
    }

    #[tokio::test]
    async fn test_slow_detector_times_out() {
        let temp = tree();
        let mut slow = MockDetector::new();
        slow.expect_name().return_const("slow");
        slow.expect_format().return_const(AgentFormat::CrewAi);
        slow.expect_file_patterns()
            .returning(|| vec!["*.agent".to_string()]);
        slow.expect_matches().returning(|_, _| {
            std::thread::sleep(Duration::from_millis(1500));
            Some(0.9)
        });
        slow.expect_extract().returning(|_, _| Vec::new());

        let config = DiscoveryConfig::default().with_timeout(Duration::from_secs(1));
        let mut engine = DiscoveryEngine::new(config).unwrap();
        engine.register(Arc::new(slow)).unwrap();

        let summary = engine.run(temp.path()).await.unwrap();
        assert!(summary.records.is_empty());
        assert_eq!(summary.failed_categories, vec!["slow"]);
    }

    #[tokio::test]
    async fn test_discover_format_restricts_categories() {
        let temp = tree();
        let mut engine = DiscoveryEngine::new(DiscoveryConfig::default()).unwrap();
        engine
            .register(Arc::new(mock("a", AgentFormat::Mcp, 0.9)))
            .unwrap();
        engine
            .register(Arc::new(mock("b", AgentFormat::CrewAi, 0.7)))
            .unwrap();

        let records = engine
            .discover_format(temp.path(), AgentFormat::CrewAi)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.format == AgentFormat::CrewAi));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let engine = DiscoveryEngine::new(DiscoveryConfig::default()).unwrap();
        let result = engine.discover_all("/definitely/not/here").await;
        assert!(matches!(result, Err(DiscoveryError::RootNotFound(_))));
    }

    #[test]
    fn test_collect_files_skips_oversized_and_excluded() {
        let temp = tree();
        fs::write(temp.path().join("huge.agent"), vec![b'x'; 64]).unwrap();
        let config = DiscoveryConfig {
            max_file_bytes: 32,
            ..Default::default()
        };
        let files = collect_files(temp.path(), &config);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["alpha.agent", "beta.agent", "notes.txt"]);
    }
}
