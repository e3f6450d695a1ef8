//! # ossa_translate
//!
//! Turns [`DiscoveryRecord`](ossa_discovery::DiscoveryRecord)s into canonical
//! [`AgentManifest`](ossa_spec::AgentManifest)s.
//!
//! - [`translators`]: one total translator per ecosystem
//! - [`UniversalTranslator`]: dispatch, strict structural re-check, memoization
//!   and concurrent batch translation
//!
//! Translation is deterministic: the same record always yields a
//! byte-identical manifest.

pub mod error;
pub mod translation;
pub mod translators;
pub mod universal;

pub use error::{TranslateError, TranslateResult};
pub use translation::Translation;
pub use translators::dispatch;
pub use universal::{TranslationResult, TranslatorConfig, UniversalTranslator};
