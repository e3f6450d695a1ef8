//! Discover command - run the full pipeline over a project tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use ossa_core::{AgentReport, OssaConfig, Pipeline, PipelineReport, RunOptions};
use ossa_discovery::AgentFormat;
use ossa_spec::ManifestWriter;

use super::print_json;

#[derive(Args)]
pub struct DiscoverArgs {
    /// Only discover one format (drupal, mcp, langchain, crewai, openai, anthropic)
    pub format: Option<AgentFormat>,

    /// Project root to scan
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,

    /// Store translated agents in the registry
    #[arg(long)]
    pub register: bool,

    /// Write each translated manifest as `<name>.ossa.yaml` into this directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: DiscoverArgs, config: OssaConfig) -> Result<()> {
    info!("Discovering agents under {}", args.root.display());

    let mut pipeline = Pipeline::new(config)?;
    if args.register {
        pipeline = pipeline.with_configured_registry()?;
    }

    let mut options = args.format.map(RunOptions::for_format).unwrap_or_default();
    if args.register {
        options = options.registering();
    }

    let report = pipeline.run(&args.root, &options).await?;

    if let Some(dir) = &args.output {
        write_manifests(&report, dir)?;
    }

    if args.json {
        return print_json(&report);
    }

    print_report(&report);
    if let Some(dir) = &args.output {
        println!("📁 Manifests written to {}", dir.display());
    }
    Ok(())
}

fn write_manifests(report: &PipelineReport, dir: &Path) -> Result<()> {
    for spec in report.agents.iter().filter_map(|a| a.translation.spec.as_ref()) {
        let path = ManifestWriter::manifest_path(dir, spec);
        ManifestWriter::write(&path, spec)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    }
    Ok(())
}

pub(crate) fn print_report(report: &PipelineReport) {
    println!(
        "🔍 Scanned {} files in {} ({}ms)",
        report.files_scanned,
        report
            .roots
            .iter()
            .map(|r| r.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        report.duration_ms
    );
    for category in &report.failed_categories {
        println!("   ⚠️  Detector '{}' did not finish", category);
    }

    if report.agents.is_empty() {
        println!("\nNo agents found.");
        return;
    }

    println!();
    for agent in &report.agents {
        print_agent(agent);
    }

    println!();
    println!(
        "📊 {} discovered, {} translated, {} valid",
        report.agents.len(),
        report.translated_count(),
        report.valid_count()
    );
    if let Some(summary) = &report.registered {
        println!(
            "🗂️  Registry: {} inserted, {} updated, {} evicted",
            summary.inserted,
            summary.updated,
            summary.evicted.len()
        );
    }
}

fn print_agent(agent: &AgentReport) {
    let icon = if agent.is_valid() {
        "✅"
    } else if agent.translation.is_success() {
        "⚠️ "
    } else {
        "❌"
    };
    let score = agent
        .validation
        .as_ref()
        .map(|v| format!("{} {}", v.score, v.level))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{} {:<40} {:<10} {:>4.2}  {}",
        icon, agent.record.id, agent.record.format, agent.record.confidence, score
    );
    println!("      {}", agent.record.source_path.display());
    for error in &agent.translation.errors {
        println!("      ❌ {}", error);
    }
    for warning in &agent.translation.warnings {
        println!("      ⚠️  {}", warning);
    }
}
