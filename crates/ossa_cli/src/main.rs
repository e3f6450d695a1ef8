//! OSSA CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Validation failure
//! - 4: Non-deterministic translation

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ossa_core::OssaConfig;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const NOT_DETERMINISTIC: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match OssaConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            return ExitCode::from(ExitCodes::INVALID_ARGS);
        }
    };

    let result = match cli.command {
        Commands::Discover(args) => commands::discover::execute(args, config).await,
        Commands::AnalyzeModule(args) => commands::analyze_module::execute(args, config).await,
        Commands::Validate(args) => commands::validate::execute(args, config).await,
        Commands::TestTranslation(args) => commands::test_translation::execute(args, config).await,
        Commands::Search(args) => commands::search::execute(args, config).await,
        Commands::Stats(args) => commands::stats::execute(args, config).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "ossa=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "ossa=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let (plain, json) = if cli.log_json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        )
    };

    // Already initialized (e.g. under a test harness) is fine.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = format!("{:#}", e).to_lowercase();

    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("deterministic") {
        ExitCodes::NOT_DETERMINISTIC
    } else if msg.contains("argument")
        || msg.contains("not found")
        || msg.contains("not a directory")
        || msg.contains("pattern")
        || msg.contains("unknown")
    {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Manifest validation failed: bad name")),
            ExitCodes::VALIDATION_FAILURE
        );
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Translation is not deterministic for 2 agents")),
            ExitCodes::NOT_DETERMINISTIC
        );
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Module not found: content_helper")),
            ExitCodes::INVALID_ARGS
        );
        assert_eq!(
            categorize_error(&anyhow::anyhow!("disk on fire")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
