//! CLI command definitions.
//!
//! Each subcommand maps to one pipeline workflow.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod analyze_module;
pub mod discover;
pub mod search;
pub mod stats;
pub mod test_translation;
pub mod validate;

/// OSSA - discover AI agents and translate them into OSSA manifests
#[derive(Parser)]
#[command(name = "ossa")]
#[command(version, about = "OSSA - discover AI agents and translate them into OSSA manifests")]
#[command(long_about = r#"
Scans a project tree for AI agent definitions across ecosystems (Drupal plugins,
MCP servers, LangChain, CrewAI, OpenAI, Anthropic), translates each one into a
canonical OSSA agent manifest, scores it, and keeps a searchable registry.

WORKFLOWS:
  discover          → Discover, translate and validate agents under a root
  analyze-module    → Same, restricted to directories with a given name
  validate          → Validate an OSSA manifest file
  test-translation  → Check that translation output is byte-identical across runs
  search            → Query the agent registry
  stats             → Show registry statistics

CONFIGURATION:
  --config FILE or OSSA_CONFIG, else ./ossa.toml, else built-in defaults.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Validation failure
  4 - Non-deterministic translation
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "OSSA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover, translate and validate agents
    Discover(discover::DiscoverArgs),

    /// Analyze every directory with the given name (e.g. a Drupal module)
    #[command(name = "analyze-module")]
    AnalyzeModule(analyze_module::AnalyzeModuleArgs),

    /// Validate an OSSA manifest file
    Validate(validate::ValidateArgs),

    /// Verify that translation is deterministic
    #[command(name = "test-translation")]
    TestTranslation(test_translation::TestTranslationArgs),

    /// Search the agent registry
    Search(search::SearchArgs),

    /// Show registry statistics
    Stats(stats::StatsArgs),
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_flags() {
        let cli = Cli::try_parse_from([
            "ossa",
            "search",
            "--format",
            "mcp",
            "--capability",
            "tool",
            "--capability",
            "weather",
            "--sort",
            "confidence",
            "--limit",
            "5",
        ])
        .unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.capability, vec!["tool", "weather"]);
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["ossa", "discover", "cobol"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ossa", "stats", "--verbose", "--config", "ossa.yaml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ossa.yaml")));
    }
}
