//! Stats command - show registry statistics.

use anyhow::Result;
use clap::Args;

use ossa_core::OssaConfig;
use ossa_registry::AgentRegistry;

use super::print_json;

#[derive(Args)]
pub struct StatsArgs {
    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Delete the registry cache after printing
    #[arg(long)]
    pub clear: bool,
}

pub async fn execute(args: StatsArgs, config: OssaConfig) -> Result<()> {
    let cache_path = config.registry.cache_path.clone();
    let registry = AgentRegistry::open(config.registry)?;
    let stats = registry.stats();

    if args.json {
        print_json(&stats)?;
    } else {
        println!("🗂️  Registry: {}", cache_path.display());
        println!("   Agents:         {}", stats.total_agents);
        for (format, count) in &stats.by_format {
            println!("     {:<14} {}", format, count);
        }
        println!(
            "   Hits / misses:  {} / {} ({:.0}% hit rate)",
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0
        );
        println!("   Evictions:      {}", stats.evictions);
        match stats.last_discovery {
            Some(at) => println!("   Last discovery: {}", at.to_rfc3339()),
            None => println!("   Last discovery: never"),
        }
    }

    if args.clear {
        registry.clear_cache();
        if !args.json {
            println!("\n🧹 Registry cache cleared");
        }
    }
    Ok(())
}
