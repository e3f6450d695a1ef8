//! Vendor SDK agents: a fixed capability set per vendor, marked experimental.

use serde_json::json;

use ossa_discovery::{AgentFormat, DiscoveryRecord, VendorFragment};
use ossa_spec::{annotations, Capability, FrameworkBinding};

use crate::translation::{api_key_auth, scaffold, string_input, Translation};

/// Capability name and description for each vendor's native features.
const OPENAI_CAPABILITIES: &[(&str, &str)] = &[
    ("chat_completion", "Generate chat completions"),
    ("function_calling", "Call developer-defined functions"),
    ("code_interpreter", "Run code in a sandboxed interpreter"),
];

const ANTHROPIC_CAPABILITIES: &[(&str, &str)] = &[
    ("messages", "Generate responses with the Messages API"),
    ("tool_use", "Call client-defined tools"),
    ("vision", "Understand image inputs"),
];

fn translate_vendor(
    record: &DiscoveryRecord,
    fragment: &VendorFragment,
    vendor: &str,
    integration: &str,
    fixed: &[(&str, &str)],
) -> Translation {
    let display = if fragment.name.trim().is_empty() {
        record.name.clone()
    } else {
        fragment.name.clone()
    };
    let expertise = fragment
        .instructions
        .clone()
        .unwrap_or_else(|| format!("{} {}", vendor, integration));

    let mut binding = FrameworkBinding::enabled(integration)
        .with_config("language", json!(fragment.language))
        .with_config("patterns", json!(fragment.patterns));
    if let Some(model) = &fragment.model {
        binding = binding.with_config("model", json!(model));
    }

    let mut manifest = scaffold(record, None)
        .with_description(format!("{} {} '{}'", vendor, integration, display))
        .with_agent(&display, expertise)
        .with_annotation(annotations::EXPERIMENTAL, "true")
        .with_label("domain", "assistant")
        .with_label("category", integration);
    if !fragment.patterns.is_empty() {
        manifest = manifest.with_annotation(annotations::DETECTED_PATTERNS, fragment.patterns.join(","));
    }
    manifest.spec.security = Some(api_key_auth());
    match record.format {
        AgentFormat::Anthropic => manifest.spec.frameworks.anthropic = Some(binding),
        _ => manifest.spec.frameworks.openai = Some(binding),
    }
    manifest.spec.capabilities = fixed
        .iter()
        .map(|(name, description)| {
            Capability::new(*name)
                .with_description(*description)
                .with_input_schema(string_input("input", "Request payload"))
                .with_framework(record.format.as_str())
        })
        .collect();

    Translation::new(manifest)
}

pub fn translate_openai(record: &DiscoveryRecord, fragment: &VendorFragment) -> Translation {
    translate_vendor(record, fragment, "OpenAI", "assistant", OPENAI_CAPABILITIES)
}

pub fn translate_anthropic(record: &DiscoveryRecord, fragment: &VendorFragment) -> Translation {
    translate_vendor(record, fragment, "Anthropic", "messages", ANTHROPIC_CAPABILITIES)
}
