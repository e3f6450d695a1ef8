//! Analyze-module command - run the pipeline over directories with a given name.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use ossa_core::{OssaConfig, Pipeline};

use super::discover::print_report;
use super::print_json;

#[derive(Args)]
pub struct AnalyzeModuleArgs {
    /// Directory name to look for, e.g. a Drupal module machine name
    pub name: String,

    /// Project root to search under
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AnalyzeModuleArgs, config: OssaConfig) -> Result<()> {
    info!("Analyzing module '{}' under {}", args.name, args.root.display());

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.analyze_module(&args.root, &args.name).await?;

    if args.json {
        return print_json(&report);
    }

    print_report(&report);
    for agent in &report.agents {
        if let Some(validation) = &agent.validation {
            println!("\n── {} ──", agent.record.id);
            print!("{}", validation.report());
        }
    }
    Ok(())
}
