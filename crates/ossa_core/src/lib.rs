//! # ossa_core
//!
//! Wires the OSSA crates into one pipeline:
//!
//! ```text
//! DiscoveryEngine → UniversalTranslator → AgentValidator → AgentRegistry
//! ```
//!
//! - [`OssaConfig`]: one file configuring every stage
//! - [`Pipeline`]: `run`, `analyze_module` and `test_translation`
//!
//! ## Example
//!
//! ```rust,ignore
//! use ossa_core::{OssaConfig, Pipeline, RunOptions};
//!
//! let config = OssaConfig::load(None)?;
//! let pipeline = Pipeline::new(config)?.with_configured_registry()?;
//! let report = pipeline.run(Path::new("."), &RunOptions::default().registering()).await?;
//! println!("{} valid agents", report.valid_count());
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{OssaConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE};
pub use error::{CoreError, CoreResult};
pub use pipeline::{AgentReport, DeterminismReport, Pipeline, PipelineReport, RunOptions, TimingStats};
