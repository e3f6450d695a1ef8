//! MCP servers: `tool_access` and `resource_access` plus the protocol binding.

use serde_json::{json, Value};

use ossa_discovery::{DiscoveryRecord, McpFragment, McpOrigin};
use ossa_spec::{Capability, McpBinding};

use crate::translation::{api_key_auth, scaffold, Translation};

const FRAMEWORK: &str = "mcp";

/// Env var name fragments that mark a server as authenticating with a secret.
const SECRET_HINTS: &[&str] = &["KEY", "TOKEN", "SECRET", "PASSWORD"];

fn enum_schema(property: &str, values: &[String], description: &str) -> Value {
    let mut field = json!({ "type": "string", "description": description });
    if !values.is_empty() {
        field["enum"] = json!(values);
    }
    json!({
        "type": "object",
        "properties": { property: field, "arguments": { "type": "object" } },
        "required": [property]
    })
}

pub fn translate(record: &DiscoveryRecord, server: &McpFragment) -> Translation {
    let display = if server.server_name.trim().is_empty() {
        record.name.clone()
    } else {
        server.server_name.clone()
    };
    let expertise = if server.tools.is_empty() {
        "Model Context Protocol server".to_string()
    } else {
        format!("MCP tools: {}", server.tools.join(", "))
    };

    let mut manifest = scaffold(record, server.version.as_deref())
        .with_description(format!(
            "MCP server '{}' over {} exposing {} tools and {} resources",
            display,
            server.transport,
            server.tools.len(),
            server.resources.len()
        ))
        .with_agent(&display, expertise)
        .with_label("domain", "integration")
        .with_label(
            "category",
            match server.origin {
                McpOrigin::Config => "server-config",
                McpOrigin::Source => "server",
            },
        );
    manifest.spec.protocols.mcp = Some(McpBinding {
        enabled: true,
        transport: server.transport.clone(),
        command: server.command.clone(),
        args: server.args.clone(),
        url: server.url.clone(),
        env: server.env.clone(),
    });
    if server
        .env
        .iter()
        .any(|var| SECRET_HINTS.iter().any(|hint| var.to_uppercase().contains(hint)))
    {
        manifest.spec.security = Some(api_key_auth());
    }

    let mut translation = Translation::new(manifest);
    if display.trim().is_empty() {
        translation.warn(format!(
            "MCP server entry in {} has no name; no capabilities produced",
            record.source_path.display()
        ));
        return translation;
    }
    if server.command.is_none() && server.url.is_none() && server.origin == McpOrigin::Config {
        translation.warn(format!("MCP server '{}' declares neither command nor url", display));
    }

    let mut capabilities = vec![Capability::new("tool_access")
        .with_description(format!("Call tools exposed by the '{}' MCP server", display))
        .with_input_schema(enum_schema("tool", &server.tools, "Tool to invoke"))
        .with_framework(FRAMEWORK)];
    if !server.resources.is_empty() {
        capabilities.push(
            Capability::new("resource_access")
                .with_description(format!("Read resources published by the '{}' MCP server", display))
                .with_input_schema(enum_schema("resource", &server.resources, "Resource to read"))
                .with_framework(FRAMEWORK),
        );
    }

    translation.manifest.spec.capabilities = capabilities;
    translation
}
