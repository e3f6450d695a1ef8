//! End-to-end pipeline tests over a small project tree.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use ossa_core::{CoreError, OssaConfig, Pipeline, RunOptions};
use ossa_discovery::AgentFormat;
use ossa_registry::{AgentRegistry, RegistryConfig, SearchFilters};

const PLUGIN: &str = r#"<?php

namespace Drupal\content_helper\Plugin\AiAgent;

/**
 * @AiAgent(
 *   id = "content_helper",
 *   label = @Translation("Content Helper"),
 *   description = @Translation("Drafts and reviews site content"),
 * )
 */
class ContentHelper extends AiAgentBase {

  public function draftArticle() {}

  public function reviewArticle() {}

}
"#;

const MCP: &str = r#"{
  "mcpServers": {
    "weather": { "command": "node", "args": ["build/index.js"] },
    "notes": { "url": "https://notes.example.com/mcp" }
  }
}"#;

fn project(root: &Path) {
    let plugin_dir = root.join("web/modules/custom/content_helper/src/Plugin/AiAgent");
    fs::create_dir_all(&plugin_dir).unwrap();
    fs::write(plugin_dir.join("ContentHelper.php"), PLUGIN).unwrap();
    fs::write(root.join(".mcp.json"), MCP).unwrap();
}

fn in_memory_config() -> OssaConfig {
    OssaConfig {
        registry: RegistryConfig::in_memory(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_translates_and_validates_everything() {
    let temp = tempdir().unwrap();
    project(temp.path());

    let pipeline = Pipeline::new(in_memory_config()).unwrap();
    let report = pipeline.run(temp.path(), &RunOptions::default()).await.unwrap();

    assert_eq!(report.agents.len(), 3);
    assert_eq!(report.translated_count(), 3);
    assert!(report.agents.iter().all(|a| a.validation.is_some()));
    assert!(report.registered.is_none());
    assert_eq!(report.failures().count(), 0);
}

#[tokio::test]
async fn test_run_registers_valid_agents() {
    let temp = tempdir().unwrap();
    project(temp.path());

    let registry = Arc::new(AgentRegistry::in_memory());
    let pipeline = Pipeline::new(in_memory_config())
        .unwrap()
        .with_registry(Arc::clone(&registry));

    let options = RunOptions::for_format(AgentFormat::Mcp).registering();
    let report = pipeline.run(temp.path(), &options).await.unwrap();

    assert_eq!(report.agents.len(), 2);
    let summary = report.registered.unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(registry.len(), 2);

    let found = registry
        .search(&SearchFilters::new().with_capability("tool_access"))
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|a| a.validation.is_some()));

    let again = pipeline.run(temp.path(), &options).await.unwrap();
    assert_eq!(again.registered.unwrap().updated, 2);
}

#[tokio::test]
async fn test_analyze_module() {
    let temp = tempdir().unwrap();
    project(temp.path());

    let pipeline = Pipeline::new(in_memory_config()).unwrap();
    let report = pipeline.analyze_module(temp.path(), "content_helper").await.unwrap();
    assert_eq!(report.agents.len(), 1);
    assert_eq!(report.agents[0].record.format, AgentFormat::Drupal);
    assert_eq!(report.roots.len(), 1);

    let missing = pipeline.analyze_module(temp.path(), "no_such_module").await;
    assert!(matches!(missing, Err(CoreError::ModuleNotFound(_))));
}

#[tokio::test]
async fn test_translation_is_deterministic() {
    let temp = tempdir().unwrap();
    project(temp.path());

    let pipeline = Pipeline::new(in_memory_config()).unwrap();
    let report = pipeline.test_translation(temp.path(), 5).await.unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.iterations, 5);
    assert!(report.is_deterministic());
    assert!(report.untranslatable.is_empty());
    assert!(report.timing.max_us >= report.timing.min_us);
}

#[tokio::test]
async fn test_missing_root_is_an_error() {
    let pipeline = Pipeline::new(in_memory_config()).unwrap();
    let result = pipeline
        .run(Path::new("/definitely/not/here"), &RunOptions::default())
        .await;
    assert!(matches!(result, Err(CoreError::Discovery(_))));
}
