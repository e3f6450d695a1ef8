//! # ossa_policy
//!
//! Policy validation and compliance tiering for OSSA agent manifests.
//!
//! [`AgentValidator::validate`] runs the structural and capability checks from
//! `ossa_spec`, then three compliance passes:
//!
//! | Pass          | Deductions                                                    | Compliant at |
//! |---------------|---------------------------------------------------------------|--------------|
//! | security      | sensitive terms, plain-text server URLs, no authentication    | ≥ 80         |
//! | performance   | token cost, capability count, response-time proxy             | ≥ 70         |
//! | accessibility | missing descriptions, no usage examples                       | ≥ 80         |
//!
//! The final score starts at 100, loses the weight of every error and
//! warning, gains a bonus per compliant dimension, is rounded to an integer
//! in 0..=100, and maps onto the bronze/silver/gold/platinum ladder. Every number is a field of
//! [`ScoringWeights`].
//!
//! ## Example
//!
//! ```rust
//! use ossa_policy::{AgentValidator, ComplianceLevel};
//! use ossa_spec::AgentManifest;
//!
//! let manifest = AgentManifest::new("My-Agent", "1.0.0");
//! let result = AgentValidator::default().validate(&manifest);
//! assert!(!result.valid);
//! assert_eq!(result.level, ComplianceLevel::Bronze);
//! ```

pub mod error;
pub mod passes;
pub mod result;
pub mod validator;
pub mod weights;

pub use error::{PolicyError, PolicyResult};
pub use result::{round_score, Compliance, ComplianceLevel, DimensionResult, ValidationMetrics, ValidationResult};
pub use validator::{aggregate_score, AgentValidator};
pub use weights::{
    AccessibilityWeights, PerformanceWeights, ScoringWeights, SecurityWeights, SeverityWeights, TierThresholds,
};
