//! Per-ecosystem translators.
//!
//! Every translator is total: malformed or empty fragments still yield a
//! manifest, with warnings and possibly no capabilities.

pub mod crewai;
pub mod drupal;
pub mod langchain;
pub mod mcp;
pub mod vendor;

use ossa_discovery::{AgentFormat, DiscoveryRecord, RawFragment};

use crate::error::{TranslateError, TranslateResult};
use crate::translation::Translation;

/// Route a record to the translator for its fragment.
///
/// Fails only for `unknown` records and for records whose declared format
/// disagrees with their fragment.
pub fn dispatch(record: &DiscoveryRecord) -> TranslateResult<Translation> {
    let fragment_format = record.fragment.format();
    if fragment_format != record.format {
        return Err(TranslateError::FormatMismatch {
            declared: record.format,
            fragment: fragment_format,
        });
    }
    match &record.fragment {
        RawFragment::Drupal(plugin) => Ok(drupal::translate(record, plugin)),
        RawFragment::Mcp(server) => Ok(mcp::translate(record, server)),
        RawFragment::LangChain(agent) => Ok(langchain::translate(record, agent)),
        RawFragment::CrewAi(crew) => Ok(crewai::translate(record, crew)),
        RawFragment::OpenAi(fragment) => Ok(vendor::translate_openai(record, fragment)),
        RawFragment::Anthropic(fragment) => Ok(vendor::translate_anthropic(record, fragment)),
        RawFragment::Unknown(_) => Err(TranslateError::UnsupportedFormat(AgentFormat::Unknown)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_discovery::CrewFragment;

    #[test]
    fn test_unknown_is_unsupported() {
        let record = DiscoveryRecord::new(
            AgentFormat::Unknown,
            "billing_agent",
            "/p/billing_agent.py",
            RawFragment::Unknown(serde_json::json!({})),
            0.3,
            "filename-heuristic",
        );
        assert_eq!(
            dispatch(&record),
            Err(TranslateError::UnsupportedFormat(AgentFormat::Unknown))
        );
    }

    #[test]
    fn test_mismatched_fragment_is_rejected() {
        let record = DiscoveryRecord::new(
            AgentFormat::Mcp,
            "crew",
            "/p/crew.py",
            RawFragment::CrewAi(CrewFragment::default()),
            0.8,
            "test",
        );
        assert!(matches!(
            dispatch(&record),
            Err(TranslateError::FormatMismatch { declared: AgentFormat::Mcp, fragment: AgentFormat::CrewAi })
        ));
    }
}
