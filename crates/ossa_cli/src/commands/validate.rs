//! Validate command - check an OSSA manifest file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use ossa_core::OssaConfig;
use ossa_policy::AgentValidator;
use ossa_spec::{ManifestReader, SchemaValidator};

use super::print_json;

#[derive(Args)]
pub struct ValidateArgs {
    /// Manifest file (.yaml, .yml or .json)
    pub file: PathBuf,

    /// Skip JSON Schema conformance
    #[arg(long)]
    pub skip_schema: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: ValidateArgs, config: OssaConfig) -> Result<()> {
    info!("Validating manifest: {}", args.file.display());

    let manifest = ManifestReader::read(&args.file)
        .with_context(|| format!("Cannot load manifest {}", args.file.display()))?;

    let schema = if args.skip_schema {
        None
    } else {
        Some(SchemaValidator::new()?.validate(&manifest)?)
    };
    let validator = AgentValidator::new(config.validation)?;
    let result = validator.validate(&manifest);

    let schema_ok = schema.as_ref().map_or(true, |s| s.valid);
    let passed = schema_ok && result.valid;

    if args.json {
        print_json(&json!({
            "file": args.file,
            "schema": schema,
            "validation": result,
        }))?;
    } else {
        if let Some(schema) = &schema {
            println!("📋 Checking schema conformance...");
            if schema.valid {
                println!("   ✅ Schema conformance passed");
            } else {
                println!("   ❌ Schema violations:");
                for violation in &schema.errors {
                    println!("      - {}: {}", violation.path, violation.message);
                }
            }
            println!();
        }
        print!("{}", result.report());
        println!();
    }

    if !passed {
        let errors = result.errors.len() + schema.map_or(0, |s| s.errors.len());
        anyhow::bail!(
            "Manifest validation failed: {} error(s) in {}",
            errors,
            args.file.display()
        );
    }

    if !args.json {
        println!("✅ All validations passed!");
    }
    Ok(())
}
