//! Data models for canonical OSSA agent manifests.
//!
//! Every translator converges on [`AgentManifest`]. Maps are `BTreeMap` so that
//! two translations of the same fragment serialize to identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default manifest API version emitted by translators.
pub const DEFAULT_API_VERSION: &str = "ossa/v0.3.3";

/// The only manifest kind handled by this pipeline.
pub const AGENT_KIND: &str = "Agent";

/// Default version assigned when a source does not declare one.
pub const DEFAULT_AGENT_VERSION: &str = "1.0.0";

/// Well-known annotation keys.
pub mod annotations {
    pub const SOURCE_FORMAT: &str = "ossa.io/source-format";
    pub const SOURCE_FILE: &str = "ossa.io/source-file";
    pub const SOURCE_CLASS: &str = "ossa.io/class";
    pub const DETECTOR: &str = "ossa.io/detector";
    pub const EXPERIMENTAL: &str = "ossa.io/experimental";
    pub const DETECTED_PATTERNS: &str = "ossa.io/detected-patterns";
    pub const MODULE: &str = "ossa.io/module";
}

/// Canonical, ecosystem-neutral agent manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentManifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AgentSpec,
}

impl AgentManifest {
    /// Create a manifest with the default API version and kind.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            kind: AGENT_KIND.to_string(),
            metadata: Metadata {
                name: name.into(),
                version: version.into(),
                ..Default::default()
            },
            spec: AgentSpec::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn with_agent(mut self, name: impl Into<String>, expertise: impl Into<String>) -> Self {
        self.spec.agent = Some(AgentIdentity {
            name: name.into(),
            expertise: expertise.into(),
        });
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.spec.capabilities.push(capability);
        self
    }

    /// Look up a capability by name.
    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.spec.capabilities.iter().find(|c| c.name == name)
    }

    /// Names of all declared capabilities, in declaration order.
    pub fn capability_names(&self) -> Vec<&str> {
        self.spec.capabilities.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether the manifest declares any usage example, at spec or capability level.
    pub fn has_examples(&self) -> bool {
        !self.spec.examples.is_empty()
            || self.spec.capabilities.iter().any(|c| !c.examples.is_empty())
    }

    /// All server URLs declared by protocol bindings.
    pub fn server_urls(&self) -> Vec<&str> {
        let mut urls = Vec::new();
        if let Some(mcp) = &self.spec.protocols.mcp {
            if let Some(url) = &mcp.url {
                urls.push(url.as_str());
            }
        }
        if let Some(http) = &self.spec.protocols.http {
            urls.extend(http.servers.iter().map(|s| s.url.as_str()));
        }
        urls
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Manifest metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form provenance tags (source format, class, file).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Domain, category and framework labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// The `spec` block of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentIdentity>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub protocols: Protocols,
    #[serde(default)]
    pub frameworks: Frameworks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<UsageExample>,
}

/// Free-text role summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    #[serde(default)]
    pub expertise: String,
}

/// One declared unit of agent functionality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<UsageExample>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.frameworks.push(framework.into());
        self
    }

    pub fn with_compliance_tag(mut self, tag: impl Into<String>) -> Self {
        self.compliance_tags.push(tag.into());
        self
    }
}

/// A usage example attached to the spec or to a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

/// Per-protocol enablement and connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocols {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpBinding>,
}

/// Model Context Protocol binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpBinding {
    pub enabled: bool,
    /// `stdio`, `sse` or `streamable-http`
    pub transport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Names of environment variables the server expects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

/// Plain HTTP binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpBinding {
    pub enabled: bool,
    #[serde(default)]
    pub servers: Vec<ServerEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Per-ecosystem framework bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frameworks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drupal: Option<FrameworkBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langchain: Option<FrameworkBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crewai: Option<FrameworkBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<FrameworkBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<FrameworkBinding>,
}

impl Frameworks {
    /// Names of the enabled framework bindings.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("drupal", &self.drupal),
            ("langchain", &self.langchain),
            ("crewai", &self.crewai),
            ("openai", &self.openai),
            ("anthropic", &self.anthropic),
        ]
        .into_iter()
        .filter(|(_, binding)| binding.as_ref().is_some_and(|b| b.enabled))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Enablement flag plus free-form integration parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkBinding {
    pub enabled: bool,
    /// How the agent hooks into the framework (`plugin`, `decorator`, `crew`, `assistant`, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub integration: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl FrameworkBinding {
    pub fn enabled(integration: impl Into<String>) -> Self {
        Self {
            enabled: true,
            integration: integration.into(),
            config: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// Security declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
    /// `api_key`, `oauth2`, `mtls`, ...
    pub method: String,
    #[serde(default)]
    pub required: bool,
}
