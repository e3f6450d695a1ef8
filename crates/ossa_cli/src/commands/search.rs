//! Search command - query the agent registry.

use anyhow::Result;
use clap::Args;
use tracing::debug;

use ossa_core::OssaConfig;
use ossa_discovery::AgentFormat;
use ossa_registry::{AgentRegistry, SearchFilters, SortField};

use super::print_json;

#[derive(Args)]
pub struct SearchArgs {
    /// Only agents of this format
    #[arg(short, long)]
    pub format: Option<AgentFormat>,

    /// Capability name substring; repeat to require several
    #[arg(long = "capability", value_name = "CAPABILITY")]
    pub capability: Vec<String>,

    /// Regex over the agent name
    #[arg(long, value_name = "REGEX")]
    pub name: Option<String>,

    /// Regex over the source path
    #[arg(long, value_name = "REGEX")]
    pub path: Option<String>,

    /// Minimum discovery confidence (0.0 - 1.0)
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Sort by name, confidence, access-count or last-discovered
    #[arg(long, default_value = "name")]
    pub sort: SortField,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new().sorted_by(self.sort);
        if let Some(format) = self.format {
            filters = filters.with_format(format);
        }
        for capability in &self.capability {
            filters = filters.with_capability(capability.as_str());
        }
        if let Some(name) = &self.name {
            filters = filters.with_name_pattern(name.as_str());
        }
        if let Some(path) = &self.path {
            filters = filters.with_source_path_pattern(path.as_str());
        }
        if let Some(min) = self.min_confidence {
            filters = filters.with_min_confidence(min);
        }
        if let Some(limit) = self.limit {
            filters = filters.with_limit(limit);
        }
        filters
    }
}

pub async fn execute(args: SearchArgs, config: OssaConfig) -> Result<()> {
    let registry = AgentRegistry::open(config.registry)?;
    debug!("Registry holds {} agents", registry.len());

    let results = registry.search(&args.filters())?;

    if args.json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No matching agents. Run `ossa discover --register` to populate the registry.");
        return Ok(());
    }

    for agent in &results {
        let level = agent
            .validation
            .as_ref()
            .map(|v| v.level.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "🤖 {:<40} {:<10} {:>4.2}  {:<8} {}",
            agent.id(),
            agent.record.format,
            agent.record.confidence,
            level,
            agent.record.source_path.display()
        );
        let capabilities: Vec<&str> = agent.spec.spec.capabilities.iter().map(|c| c.name.as_str()).collect();
        if !capabilities.is_empty() {
            println!("      {}", capabilities.join(", "));
        }
    }
    println!("\n{} agent(s)", results.len());
    Ok(())
}
