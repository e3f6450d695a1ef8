//! Test-translation command - verify that translation is repeatable.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use ossa_core::{OssaConfig, Pipeline};

use super::print_json;

#[derive(Args)]
pub struct TestTranslationArgs {
    /// Project root to scan
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Translations per discovered agent
    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: usize,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: TestTranslationArgs, config: OssaConfig) -> Result<()> {
    info!(
        "Testing translation determinism under {} ({} iterations)",
        args.root.display(),
        args.iterations
    );

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.test_translation(&args.root, args.iterations).await?;

    if args.json {
        print_json(&report)?;
    } else {
        println!(
            "🔁 {} agents × {} iterations",
            report.records, report.iterations
        );
        println!(
            "⏱️  min {}µs, mean {}µs, max {}µs",
            report.timing.min_us, report.timing.mean_us, report.timing.max_us
        );
        for id in &report.untranslatable {
            println!("   ⚠️  {} could not be translated", id);
        }
        for id in &report.mismatched {
            println!("   ❌ {} produced different output between runs", id);
        }
    }

    if !report.is_deterministic() {
        anyhow::bail!(
            "Translation is not deterministic for {} agent(s)",
            report.mismatched.len()
        );
    }

    if !args.json {
        println!("✅ Translation output is identical across runs");
    }
    Ok(())
}
