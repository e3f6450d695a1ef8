//! Crews: one capability to run the crew, one per member and one per step.

use serde_json::json;

use ossa_discovery::{CrewFragment, DiscoveryRecord};
use ossa_spec::naming::{capability_slug, capability_slug_words, UniqueNames};
use ossa_spec::{Capability, FrameworkBinding};

use crate::translation::{scaffold, string_input, Translation};

const FRAMEWORK: &str = "crewai";

pub fn translate(record: &DiscoveryRecord, crew: &CrewFragment) -> Translation {
    let display = if crew.crew_name.trim().is_empty() {
        record.name.as_str()
    } else {
        crew.crew_name.as_str()
    };
    let roles: Vec<&str> = crew.members.iter().map(|m| m.role.as_str()).collect();
    let expertise = if roles.is_empty() {
        "Multi-agent crew".to_string()
    } else {
        roles.join(", ")
    };

    let mut binding = FrameworkBinding::enabled("crew")
        .with_config("members", json!(crew.members.len()))
        .with_config("steps", json!(crew.steps.len()));
    if let Some(process) = &crew.process {
        binding = binding.with_config("process", json!(process));
    }

    let mut manifest = scaffold(record, None)
        .with_description(format!(
            "Crew '{}' with {} members and {} steps",
            display,
            crew.members.len(),
            crew.steps.len()
        ))
        .with_agent(display, expertise)
        .with_label("domain", "multi-agent")
        .with_label("category", "crew");
    manifest.spec.frameworks.crewai = Some(binding);

    let mut translation = Translation::new(manifest);
    if crew.members.is_empty() && crew.steps.is_empty() {
        translation.warn(format!(
            "Crew '{}' declares no members or steps; no capabilities produced",
            display
        ));
        return translation;
    }

    let mut names = UniqueNames::new();
    let mut capabilities = Vec::with_capacity(1 + crew.members.len() + crew.steps.len());

    capabilities.push(
        Capability::new(names.allocate(&format!("run_{}", capability_slug(display, "crew"))))
            .with_description(format!("Run the full '{}' crew", display))
            .with_input_schema(json!({
                "type": "object",
                "properties": { "inputs": { "type": "object" } }
            }))
            .with_framework(FRAMEWORK),
    );

    for member in &crew.members {
        let description = member
            .goal
            .clone()
            .or_else(|| member.backstory.clone())
            .unwrap_or_else(|| format!("Act as {}", member.role));
        let mut capability = Capability::new(names.allocate(&capability_slug(&member.role, "member")))
            .with_description(description)
            .with_input_schema(string_input("task", "Task for this crew member"))
            .with_framework(FRAMEWORK);
        if !member.tools.is_empty() {
            capability = capability.with_output_schema(json!({
                "type": "object",
                "x-tools": member.tools
            }));
        }
        capabilities.push(capability);
    }

    for (i, step) in crew.steps.iter().enumerate() {
        let base = match &step.name {
            Some(name) => capability_slug(name, "step"),
            None => capability_slug_words(&step.description, 4, "step"),
        };
        let description = if step.description.trim().is_empty() {
            format!("Step {} of the crew", i + 1)
        } else {
            step.description.clone()
        };
        let mut capability = Capability::new(names.allocate(&base))
            .with_description(description)
            .with_input_schema(string_input("context", "Context passed to this step"))
            .with_framework(FRAMEWORK);
        if let Some(expected) = &step.expected_output {
            capability = capability.with_output_schema(json!({
                "type": "string",
                "description": expected
            }));
        }
        capabilities.push(capability);
    }

    translation.manifest.spec.capabilities = capabilities;
    translation
}
