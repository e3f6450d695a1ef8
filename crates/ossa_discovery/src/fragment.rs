//! Raw, ecosystem-specific data captured by detectors.
//!
//! Fragments hold exactly what a detector could read out of a file and
//! nothing derived. Translators turn them into manifests.

use serde::{Deserialize, Serialize};

use crate::record::AgentFormat;

/// Detector output, one variant per ecosystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RawFragment {
    Drupal(PluginFragment),
    Mcp(McpFragment),
    #[serde(rename = "langchain")]
    LangChain(ToolFrameworkFragment),
    #[serde(rename = "crewai")]
    CrewAi(CrewFragment),
    #[serde(rename = "openai")]
    OpenAi(VendorFragment),
    Anthropic(VendorFragment),
    Unknown(serde_json::Value),
}

impl RawFragment {
    /// The ecosystem this fragment variant belongs to.
    pub fn format(&self) -> AgentFormat {
        match self {
            RawFragment::Drupal(_) => AgentFormat::Drupal,
            RawFragment::Mcp(_) => AgentFormat::Mcp,
            RawFragment::LangChain(_) => AgentFormat::LangChain,
            RawFragment::CrewAi(_) => AgentFormat::CrewAi,
            RawFragment::OpenAi(_) => AgentFormat::OpenAi,
            RawFragment::Anthropic(_) => AgentFormat::Anthropic,
            RawFragment::Unknown(_) => AgentFormat::Unknown,
        }
    }
}

/// A Drupal AI agent plugin class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginFragment {
    pub plugin_id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Actions declared in the annotation, or public methods when none are declared.
    #[serde(default)]
    pub actions: Vec<PluginAction>,
    /// False when the file was picked up by location only.
    #[serde(default)]
    pub annotated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginAction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where an MCP server sighting came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpOrigin {
    #[default]
    Config,
    Source,
}

/// One MCP server, from a client config entry or from server source code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpFragment {
    pub server_name: String,
    pub transport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Environment variable names only; values are never captured.
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub origin: McpOrigin,
}

/// A LangChain-style agent and the tools defined next to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolFrameworkFragment {
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolDecl>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A crew: cooperating role-based members and the steps assigned to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewFragment {
    pub crew_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default)]
    pub members: Vec<CrewMember>,
    #[serde(default)]
    pub steps: Vec<CrewStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Direct use of a vendor model SDK.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFragment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// SDK features seen in the file, e.g. `assistants`, `tool_use`.
    #[serde(default)]
    pub patterns: Vec<String>,
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_format() {
        let fragment = RawFragment::CrewAi(CrewFragment::default());
        assert_eq!(fragment.format(), AgentFormat::CrewAi);
        let fragment = RawFragment::Unknown(serde_json::json!({}));
        assert_eq!(fragment.format(), AgentFormat::Unknown);
    }

    #[test]
    fn test_fragment_serde_tagging() {
        let fragment = RawFragment::LangChain(ToolFrameworkFragment {
            agent_name: "support".into(),
            language: "python".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["kind"], "langchain");
        assert_eq!(json["data"]["agentName"], "support");

        let back: RawFragment = serde_json::from_value(json).unwrap();
        assert_eq!(back, fragment);
    }
}
