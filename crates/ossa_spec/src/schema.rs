//! JSON-Schema conformance for agent manifests.
//!
//! Exposes `validate_schema(manifest) -> SchemaReport` as a pure function over
//! an embedded schema. This is the final conformance gate used by the CLI; the
//! scoring validator in `ossa_policy` is independent of it.

use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::AgentManifest;

const AGENT_SCHEMA: &str = include_str!("../schema/agent.schema.json");

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer into the manifest.
    pub path: String,
    pub message: String,
}

/// Outcome of schema validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<SchemaViolation>,
}

/// Compiled agent manifest schema.
pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    /// Compile the embedded schema.
    pub fn new() -> SpecResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(AGENT_SCHEMA)?;
        let schema = JSONSchema::compile(&raw).map_err(|e| SpecError::Schema(e.to_string()))?;
        Ok(Self { schema })
    }

    /// Validate a manifest against the schema.
    pub fn validate(&self, manifest: &AgentManifest) -> SpecResult<SchemaReport> {
        let instance = serde_json::to_value(manifest)?;
        Ok(self.validate_value(&instance))
    }

    /// Validate an arbitrary JSON document against the schema.
    pub fn validate_value(&self, instance: &serde_json::Value) -> SchemaReport {
        match self.schema.validate(instance) {
            Ok(()) => SchemaReport {
                valid: true,
                errors: Vec::new(),
            },
            Err(errors) => {
                let errors: Vec<SchemaViolation> = errors
                    .map(|e| SchemaViolation {
                        path: e.instance_path.to_string(),
                        message: e.to_string(),
                    })
                    .collect();
                debug!("Schema validation found {} violation(s)", errors.len());
                SchemaReport {
                    valid: false,
                    errors,
                }
            }
        }
    }
}

/// Convenience wrapper compiling the schema on every call.
pub fn validate_schema(manifest: &AgentManifest) -> SpecResult<SchemaReport> {
    SchemaValidator::new()?.validate(manifest)
}
