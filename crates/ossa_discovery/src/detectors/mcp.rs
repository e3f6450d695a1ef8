//! Model Context Protocol servers, from client configs and from server source.

use std::path::Path;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::ConfidenceLevels;
use crate::detector::{capture, capture_all, file_stem, regex, Detector, Sighting};
use crate::error::DiscoveryResult;
use crate::fragment::{McpFragment, McpOrigin, RawFragment};
use crate::record::AgentFormat;

pub struct McpDetector {
    levels: ConfidenceLevels,
    sdk_import: Regex,
    server_ctor: Regex,
    ctor_name: Regex,
    version: Regex,
    tool_call: Regex,
    tool_decorator: Regex,
    resource_call: Regex,
    prompt_call: Regex,
    prompt_decorator: Regex,
}

impl McpDetector {
    pub fn new(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        Ok(Self {
            levels,
            sdk_import: regex(
                r#"(?m)(@modelcontextprotocol/sdk|^\s*from\s+(?:mcp|fastmcp)[\w.]*\s+import|^\s*import\s+(?:mcp|fastmcp)\b)"#,
            )?,
            server_ctor: regex(r"\b(?:McpServer|Server|FastMCP)\s*\(")?,
            ctor_name: regex(
                r#"(?s)\b(?:McpServer|Server|FastMCP)\s*\(\s*(?:\{[^}]*?\bname\s*:\s*["']([^"']+)["']|["']([^"']+)["']|name\s*=\s*["']([^"']+)["'])"#,
            )?,
            version: regex(r#"\bversion\s*[:=]\s*["']([^"']+)["']"#)?,
            tool_call: regex(r#"\.(?:tool|registerTool)\(\s*["']([^"']+)["']"#)?,
            tool_decorator: regex(r"@\w+\.tool\([^)]*\)\s*\n\s*(?:async\s+)?def\s+(\w+)")?,
            resource_call: regex(r#"\.(?:resource|registerResource)\(\s*["']([^"']+)["']"#)?,
            prompt_call: regex(r#"\.(?:prompt|registerPrompt)\(\s*["']([^"']+)["']"#)?,
            prompt_decorator: regex(r"@\w+\.prompt\([^)]*\)\s*\n\s*(?:async\s+)?def\s+(\w+)")?,
        })
    }

    fn is_config_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
    }

    /// The server map of a client config: `mcpServers`, or `servers` in `mcp.json`.
    fn server_map(path: &Path, content: &str) -> Option<serde_json::Map<String, Value>> {
        let value: Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping unparsable MCP config {:?}: {}", path, e);
                return None;
            }
        };
        let is_mcp_json = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n == "mcp.json" || n == ".mcp.json")
            .unwrap_or(false);
        let servers = value
            .get("mcpServers")
            .or_else(|| if is_mcp_json { value.get("servers") } else { None })?;
        servers.as_object().filter(|m| !m.is_empty()).cloned()
    }

    fn server_from_config(name: &str, entry: &Value) -> McpFragment {
        let str_field = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
        let str_list = |key: &str| -> Vec<String> {
            entry
                .get(key)
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default()
        };

        let command = str_field("command");
        let url = str_field("url").or_else(|| str_field("serverUrl"));
        let transport = str_field("type")
            .or_else(|| str_field("transport"))
            .unwrap_or_else(|| match (&command, &url) {
                (Some(_), _) => "stdio".to_string(),
                (None, Some(u)) if u.trim_end_matches('/').ends_with("/sse") => "sse".to_string(),
                (None, Some(_)) => "streamable-http".to_string(),
                (None, None) => "stdio".to_string(),
            });
        let mut tools = str_list("tools");
        extend_unique(&mut tools, str_list("alwaysAllow"));

        McpFragment {
            server_name: name.to_string(),
            transport,
            command,
            args: str_list("args"),
            url,
            env: entry
                .get("env")
                .and_then(Value::as_object)
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default(),
            tools,
            resources: str_list("resources"),
            prompts: Vec::new(),
            version: str_field("version"),
            origin: McpOrigin::Config,
        }
    }

    fn server_from_source(&self, path: &Path, content: &str) -> McpFragment {
        let name = self
            .ctor_name
            .captures(content)
            .and_then(|c| c.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
            .unwrap_or_else(|| file_stem(path));

        let mut tools = capture_all(&self.tool_call, content);
        extend_unique(&mut tools, capture_all(&self.tool_decorator, content));
        let resources = capture_all(&self.resource_call, content);
        let mut prompts = capture_all(&self.prompt_call, content);
        extend_unique(&mut prompts, capture_all(&self.prompt_decorator, content));

        let transport = if content.contains("SSEServerTransport") || content.contains("transport=\"sse\"") {
            "sse"
        } else if content.contains("StreamableHTTPServerTransport") || content.contains("streamable-http") {
            "streamable-http"
        } else {
            "stdio"
        };

        McpFragment {
            server_name: name,
            transport: transport.to_string(),
            version: capture(&self.version, content),
            tools,
            resources,
            prompts,
            origin: McpOrigin::Source,
            ..Default::default()
        }
    }
}

fn extend_unique(into: &mut Vec<String>, more: Vec<String>) {
    for item in more {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

impl Detector for McpDetector {
    fn name(&self) -> &'static str {
        "mcp-server"
    }

    fn format(&self) -> AgentFormat {
        AgentFormat::Mcp
    }

    fn file_patterns(&self) -> Vec<String> {
        [
            "mcp.json",
            ".mcp.json",
            "*mcp*.json",
            "claude_desktop_config.json",
            "*.ts",
            "*.js",
            "*.mjs",
            "*.py",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn matches(&self, path: &Path, content: &str) -> Option<f64> {
        if Self::is_config_file(path) {
            return Self::server_map(path, content).map(|_| self.levels.structural);
        }
        if self.sdk_import.is_match(content) && self.server_ctor.is_match(content) {
            Some(self.levels.pattern)
        } else {
            None
        }
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting> {
        if Self::is_config_file(path) {
            return Self::server_map(path, content)
                .map(|servers| {
                    servers
                        .iter()
                        .map(|(name, entry)| {
                            Sighting::new(name.clone(), RawFragment::Mcp(Self::server_from_config(name, entry)))
                        })
                        .collect()
                })
                .unwrap_or_default();
        }
        let fragment = self.server_from_source(path, content);
        vec![Sighting::new(fragment.server_name.clone(), RawFragment::Mcp(fragment))]
    }
}
