//! Structural checks over agent manifests.
//!
//! These are the shape rules shared by the translator's strict mode and the
//! full policy validator: required fields, naming patterns and capability
//! hygiene. They never look at policy concerns such as security or cost.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{AgentManifest, AGENT_KIND};

/// Stable machine codes for structural findings.
pub mod codes {
    pub const MISSING_API_VERSION: &str = "MISSING_API_VERSION";
    pub const INVALID_API_VERSION: &str = "INVALID_API_VERSION";
    pub const INVALID_KIND: &str = "INVALID_KIND";
    pub const MISSING_NAME: &str = "MISSING_NAME";
    pub const INVALID_NAME_FORMAT: &str = "INVALID_NAME_FORMAT";
    pub const MISSING_VERSION: &str = "MISSING_VERSION";
    pub const INVALID_VERSION_FORMAT: &str = "INVALID_VERSION_FORMAT";
    pub const MISSING_AGENT: &str = "MISSING_AGENT";
    pub const MISSING_DESCRIPTION: &str = "MISSING_DESCRIPTION";
    pub const NO_CAPABILITIES: &str = "NO_CAPABILITIES";
    pub const DUPLICATE_CAPABILITY: &str = "DUPLICATE_CAPABILITY";
    pub const INVALID_CAPABILITY_NAME: &str = "INVALID_CAPABILITY_NAME";
    pub const CAPABILITY_MISSING_DESCRIPTION: &str = "CAPABILITY_MISSING_DESCRIPTION";
    pub const CAPABILITY_MISSING_FRAMEWORKS: &str = "CAPABILITY_MISSING_FRAMEWORKS";
    pub const CAPABILITY_MISSING_INPUT_SCHEMA: &str = "CAPABILITY_MISSING_INPUT_SCHEMA";
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Critical and high errors make a manifest invalid.
    pub fn blocks(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single error, warning or suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        path: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            severity,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} at {}: {}", self.severity, self.code, self.path, self.message)
    }
}

/// Outcome of a structural check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<ValidationIssue>,
}

impl StructuralReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn add_error(&mut self, issue: ValidationIssue) {
        if issue.severity.blocks() {
            self.valid = false;
        }
        self.errors.push(issue);
    }

    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub fn add_suggestion(&mut self, issue: ValidationIssue) {
        self.suggestions.push(issue);
    }

    pub fn merge(&mut self, other: StructuralReport) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
    }

    /// Error messages, for callers that only surface text.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// `^[a-z0-9-]+$`
pub fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// `^\d+\.\d+\.\d+$`
pub fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// `^[a-z][a-z0-9_]*$`
pub fn is_capability_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}

/// `ossa/v<semver>`
pub fn is_api_version(api_version: &str) -> bool {
    api_version
        .strip_prefix("ossa/v")
        .is_some_and(is_semver)
}

/// Validator for manifest structure.
pub struct StructuralValidator;

impl StructuralValidator {
    /// Required fields and recommended metadata.
    pub fn check_required(manifest: &AgentManifest) -> StructuralReport {
        let mut report = StructuralReport::new();

        if manifest.api_version.trim().is_empty() {
            report.add_error(ValidationIssue::new(
                codes::MISSING_API_VERSION,
                "apiVersion",
                Severity::Critical,
                "apiVersion is required",
            ));
        } else if !is_api_version(&manifest.api_version) {
            report.add_error(ValidationIssue::new(
                codes::INVALID_API_VERSION,
                "apiVersion",
                Severity::Medium,
                format!(
                    "apiVersion '{}' should look like ossa/v<major>.<minor>.<patch>",
                    manifest.api_version
                ),
            ));
        }

        if manifest.kind != AGENT_KIND {
            report.add_error(ValidationIssue::new(
                codes::INVALID_KIND,
                "kind",
                Severity::Critical,
                format!("kind must be '{}', found '{}'", AGENT_KIND, manifest.kind),
            ));
        }

        let name = &manifest.metadata.name;
        if name.trim().is_empty() {
            report.add_error(ValidationIssue::new(
                codes::MISSING_NAME,
                "metadata.name",
                Severity::Critical,
                "metadata.name is required",
            ));
        } else if !is_kebab_case(name) {
            report.add_error(ValidationIssue::new(
                codes::INVALID_NAME_FORMAT,
                "metadata.name",
                Severity::Critical,
                format!("name must be kebab-case (got '{}')", name),
            ));
        }

        let version = &manifest.metadata.version;
        if version.trim().is_empty() {
            report.add_error(ValidationIssue::new(
                codes::MISSING_VERSION,
                "metadata.version",
                Severity::High,
                "metadata.version is required",
            ));
        } else if !is_semver(version) {
            report.add_error(ValidationIssue::new(
                codes::INVALID_VERSION_FORMAT,
                "metadata.version",
                Severity::High,
                format!("version must be semantic (x.y.z), found '{}'", version),
            ));
        }

        let agent_missing = manifest
            .spec
            .agent
            .as_ref()
            .map_or(true, |a| a.name.trim().is_empty());
        if agent_missing {
            report.add_error(ValidationIssue::new(
                codes::MISSING_AGENT,
                "spec.agent",
                Severity::High,
                "spec.agent with a name is required",
            ));
        }

        let has_description = manifest
            .metadata
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if !has_description {
            report.add_warning(ValidationIssue::new(
                codes::MISSING_DESCRIPTION,
                "metadata.description",
                Severity::Medium,
                "A description is recommended",
            ));
        }

        report
    }

    /// Capability naming, uniqueness and documentation hygiene.
    pub fn check_capabilities(manifest: &AgentManifest) -> StructuralReport {
        Self::capability_checks(manifest, false)
    }

    /// Everything the translator's strict mode requires: required fields plus
    /// a non-empty, well-named capability list.
    pub fn check_strict(manifest: &AgentManifest) -> StructuralReport {
        let mut report = Self::check_required(manifest);
        report.merge(Self::capability_checks(manifest, true));
        report
    }

    fn capability_checks(manifest: &AgentManifest, require_capabilities: bool) -> StructuralReport {
        let mut report = StructuralReport::new();
        let capabilities = &manifest.spec.capabilities;

        if capabilities.is_empty() {
            let issue = ValidationIssue::new(
                codes::NO_CAPABILITIES,
                "spec.capabilities",
                if require_capabilities { Severity::High } else { Severity::Medium },
                "No capabilities declared",
            );
            if require_capabilities {
                report.add_error(issue);
            } else {
                report.add_warning(issue);
            }
            return report;
        }

        let mut seen = HashSet::new();
        for (index, capability) in capabilities.iter().enumerate() {
            let path = format!("spec.capabilities[{}]", index);

            if !is_capability_name(&capability.name) {
                report.add_error(ValidationIssue::new(
                    codes::INVALID_CAPABILITY_NAME,
                    format!("{}.name", path),
                    Severity::High,
                    format!(
                        "Capability name '{}' must match ^[a-z][a-z0-9_]*$",
                        capability.name
                    ),
                ));
            }

            if !seen.insert(capability.name.as_str()) {
                report.add_error(ValidationIssue::new(
                    codes::DUPLICATE_CAPABILITY,
                    format!("{}.name", path),
                    Severity::High,
                    format!("Duplicate capability name '{}'", capability.name),
                ));
            }

            if capability.description.trim().is_empty() {
                report.add_warning(ValidationIssue::new(
                    codes::CAPABILITY_MISSING_DESCRIPTION,
                    format!("{}.description", path),
                    Severity::Low,
                    format!("Capability '{}' has no description", capability.name),
                ));
            }

            if capability.frameworks.is_empty() {
                report.add_warning(ValidationIssue::new(
                    codes::CAPABILITY_MISSING_FRAMEWORKS,
                    format!("{}.frameworks", path),
                    Severity::Low,
                    format!("Capability '{}' lists no frameworks", capability.name),
                ));
                report.add_suggestion(ValidationIssue::new(
                    codes::CAPABILITY_MISSING_FRAMEWORKS,
                    format!("{}.frameworks", path),
                    Severity::Info,
                    format!(
                        "Declare which frameworks can serve capability '{}'",
                        capability.name
                    ),
                ));
            }

            if capability.input_schema.is_none() {
                report.add_suggestion(ValidationIssue::new(
                    codes::CAPABILITY_MISSING_INPUT_SCHEMA,
                    format!("{}.inputSchema", path),
                    Severity::Info,
                    format!("Add an inputSchema to capability '{}'", capability.name),
                ));
            }
        }

        report
    }
}
