//! # ossa_spec
//!
//! The canonical OSSA agent manifest every discovered agent is translated into.
//!
//! ## Features
//!
//! - **Models**: [`AgentManifest`] with capabilities, protocol and framework bindings
//! - **Structural checks**: required fields, naming patterns, capability hygiene
//! - **Schema conformance**: embedded JSON Schema via [`SchemaValidator`]
//! - **I/O**: YAML/JSON [`ManifestReader`] and [`ManifestWriter`]
//!
//! ## Example
//!
//! ```rust
//! use ossa_spec::{AgentManifest, Capability, StructuralValidator};
//!
//! let manifest = AgentManifest::new("triage-agent", "1.0.0")
//!     .with_agent("Triage Agent", "Issue triage")
//!     .with_capability(Capability::new("classify_issue").with_framework("langchain"));
//!
//! let report = StructuralValidator::check_strict(&manifest);
//! assert!(report.valid);
//! ```

pub mod error;
pub mod models;
pub mod naming;
pub mod reader;
pub mod schema;
pub mod structural;
pub mod writer;

pub use error::{SpecError, SpecResult};
pub use models::*;
pub use reader::{ManifestFormat, ManifestReader};
pub use schema::{validate_schema, SchemaReport, SchemaValidator, SchemaViolation};
pub use structural::{Severity, StructuralReport, StructuralValidator, ValidationIssue};
pub use writer::ManifestWriter;
