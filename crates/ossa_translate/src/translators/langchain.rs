//! LangChain agents: one capability per tool, or `invoke_agent` when none were found.

use serde_json::json;

use ossa_discovery::{DiscoveryRecord, ToolFrameworkFragment};
use ossa_spec::naming::{capability_slug, UniqueNames};
use ossa_spec::{Capability, FrameworkBinding};

use crate::translation::{scaffold, string_input, Translation};

const FRAMEWORK: &str = "langchain";

pub fn translate(record: &DiscoveryRecord, agent: &ToolFrameworkFragment) -> Translation {
    let display = if agent.agent_name.trim().is_empty() {
        record.name.clone()
    } else {
        agent.agent_name.clone()
    };
    let expertise = if agent.tools.is_empty() {
        "LangChain agent".to_string()
    } else {
        agent
            .tools
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut binding = FrameworkBinding::enabled(if agent.agent_type.is_some() { "agent" } else { "tools" })
        .with_config("language", json!(agent.language));
    if let Some(agent_type) = &agent.agent_type {
        binding = binding.with_config("agentType", json!(agent_type));
    }
    if let Some(model) = &agent.model {
        binding = binding.with_config("model", json!(model));
    }

    let mut manifest = scaffold(record, None)
        .with_description(format!(
            "LangChain {} agent '{}' with {} tools",
            agent.language,
            display,
            agent.tools.len()
        ))
        .with_agent(&display, expertise)
        .with_label("domain", "tooling")
        .with_label("category", "tool-agent");
    manifest.spec.frameworks.langchain = Some(binding);

    let mut translation = Translation::new(manifest);
    let capabilities = if agent.tools.is_empty() {
        if agent.agent_type.is_none() {
            translation.warn(format!("LangChain agent '{}' has no tools and no constructor", display));
        }
        vec![Capability::new("invoke_agent")
            .with_description(format!("Invoke the '{}' agent", display))
            .with_input_schema(string_input("input", "User input for the agent"))
            .with_framework(FRAMEWORK)]
    } else {
        let mut names = UniqueNames::new();
        agent
            .tools
            .iter()
            .map(|tool| {
                let description = tool
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Run the {} tool", tool.name));
                Capability::new(names.allocate(&capability_slug(&tool.name, "tool")))
                    .with_description(description)
                    .with_input_schema(string_input("input", "Tool input"))
                    .with_framework(FRAMEWORK)
            })
            .collect()
    };

    translation.manifest.spec.capabilities = capabilities;
    translation
}
