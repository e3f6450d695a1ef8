//! Direct use of vendor model SDKs (OpenAI assistants, Anthropic messages with tools).

use std::path::Path;

use regex::Regex;

use crate::config::ConfidenceLevels;
use crate::detector::{call_bodies, capture, file_stem, language_of, regex, Detector, Sighting};
use crate::error::DiscoveryResult;
use crate::fragment::{RawFragment, VendorFragment};
use crate::record::AgentFormat;

/// Supported vendor SDKs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAi,
    Anthropic,
}

/// A named SDK feature and the regex that reveals it.
struct Signal {
    tag: &'static str,
    re: Regex,
}

pub struct VendorDetector {
    vendor: Vendor,
    levels: ConfidenceLevels,
    import: Regex,
    client: Regex,
    /// Call whose presence alongside the import is strong evidence.
    primary: Regex,
    signals: Vec<Signal>,
    name: Regex,
    model: Regex,
    instructions: Regex,
}

impl VendorDetector {
    pub fn openai(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        Ok(Self {
            vendor: Vendor::OpenAi,
            levels,
            import: regex(
                r#"(?m)^\s*(?:from\s+openai\b[\w.]*\s+import|import\s+openai\b|import\s+\w+\s+from\s+["']openai["']|.*require\(["']openai["']\))"#,
            )?,
            client: regex(r"\b(?:OpenAI|AsyncOpenAI|AzureOpenAI)\s*\(")?,
            primary: regex(r"\bassistants\.create\s*\(")?,
            signals: vec![
                Signal { tag: "assistants", re: regex(r"\bassistants\.create\s*\(")? },
                Signal {
                    tag: "function_calling",
                    re: regex(r#"["']?type["']?\s*:\s*["']function["']|\bfunctions\s*="#)?,
                },
                Signal { tag: "code_interpreter", re: regex(r"\bcode_interpreter\b")? },
                Signal { tag: "file_search", re: regex(r"\bfile_search\b")? },
                Signal { tag: "chat_completions", re: regex(r"\bchat\.completions\.create\s*\(")? },
            ],
            name: regex(r#"\bname\s*[=:]\s*["']([^"']+)["']"#)?,
            model: regex(r#"\bmodel\s*[=:]\s*["']([^"']+)["']"#)?,
            instructions: regex(r#"\binstructions\s*[=:]\s*["']([^"']+)["']"#)?,
        })
    }

    pub fn anthropic(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        Ok(Self {
            vendor: Vendor::Anthropic,
            levels,
            import: regex(
                r#"(?m)^\s*(?:from\s+anthropic\b[\w.]*\s+import|import\s+anthropic\b|import\s+\w+\s+from\s+["']@anthropic-ai/sdk["']|.*require\(["']@anthropic-ai/sdk["']\))"#,
            )?,
            client: regex(r"\b(?:Anthropic|AsyncAnthropic|AnthropicBedrock|AnthropicVertex)\s*\(")?,
            primary: regex(r"\bmessages\.create\s*\(")?,
            signals: vec![
                Signal { tag: "messages", re: regex(r"\bmessages\.(?:create|stream)\s*\(")? },
                Signal { tag: "tool_use", re: regex(r"\btools\s*[=:]|\btool_use\b")? },
                Signal { tag: "vision", re: regex(r#"["']?type["']?\s*:\s*["']image["']"#)? },
                Signal { tag: "streaming", re: regex(r"\bmessages\.stream\s*\(|\bstream\s*[=:]\s*(?:True|true)")? },
            ],
            name: regex(r#"\bname\s*[=:]\s*["']([^"']+)["']"#)?,
            model: regex(r#"\bmodel\s*[=:]\s*["']([^"']+)["']"#)?,
            instructions: regex(r#"\bsystem\s*[=:]\s*["']([^"']+)["']"#)?,
        })
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn patterns(&self, content: &str) -> Vec<String> {
        self.signals
            .iter()
            .filter(|s| s.re.is_match(content))
            .map(|s| s.tag.to_string())
            .collect()
    }

    fn has(&self, content: &str, tag: &str) -> bool {
        self.signals.iter().any(|s| s.tag == tag && s.re.is_match(content))
    }

    /// Argument text of the first primary call.
    fn primary_scope<'a>(&self, content: &'a str) -> Option<&'a str> {
        call_bodies(&self.primary, content).into_iter().next()
    }
}

impl Detector for VendorDetector {
    fn name(&self) -> &'static str {
        match self.vendor {
            Vendor::OpenAi => "openai-sdk",
            Vendor::Anthropic => "anthropic-sdk",
        }
    }

    fn format(&self) -> AgentFormat {
        match self.vendor {
            Vendor::OpenAi => AgentFormat::OpenAi,
            Vendor::Anthropic => AgentFormat::Anthropic,
        }
    }

    fn file_patterns(&self) -> Vec<String> {
        vec!["*.py".to_string(), "*.ts".to_string(), "*.js".to_string()]
    }

    fn matches(&self, _path: &Path, content: &str) -> Option<f64> {
        if !self.import.is_match(content) {
            return None;
        }
        match self.vendor {
            Vendor::OpenAi => {
                if self.primary.is_match(content) {
                    Some(self.levels.pattern)
                } else if self.has(content, "function_calling") {
                    Some(self.levels.weak_pattern)
                } else {
                    None
                }
            }
            Vendor::Anthropic => {
                if self.primary.is_match(content) && self.has(content, "tool_use") {
                    Some(self.levels.pattern)
                } else if self.client.is_match(content) || self.primary.is_match(content) {
                    Some(self.levels.weak_pattern)
                } else {
                    None
                }
            }
        }
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting> {
        let primary = self.primary_scope(content);
        let scope = primary.unwrap_or(content);
        // Outside an assistant definition, and for Anthropic, `name` fields belong to tools.
        let name = match (self.vendor, primary) {
            (Vendor::OpenAi, Some(body)) => capture(&self.name, body),
            _ => None,
        }
        .unwrap_or_else(|| file_stem(path));

        let fragment = VendorFragment {
            name: name.clone(),
            model: capture(&self.model, scope).or_else(|| capture(&self.model, content)),
            instructions: capture(&self.instructions, scope),
            patterns: self.patterns(content),
            language: language_of(path).to_string(),
        };
        let fragment = match self.vendor {
            Vendor::OpenAi => RawFragment::OpenAi(fragment),
            Vendor::Anthropic => RawFragment::Anthropic(fragment),
        };
        vec![Sighting::new(name, fragment)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_assistant() {
        let src = r#"
from openai import OpenAI

client = OpenAI()
assistant = client.beta.assistants.create(
    name="Math Tutor",
    instructions="You are a personal math tutor.",
    tools=[{"type": "code_interpreter"}],
    model="gpt-4o",
)
"#;
        let d = VendorDetector::openai(ConfidenceLevels::default()).unwrap();
        let path = Path::new("/p/tutor.py");
        assert_eq!(d.matches(path, src), Some(0.80));

        let sightings = d.extract(path, src);
        assert_eq!(sightings[0].name, "Math Tutor");
        let RawFragment::OpenAi(f) = &sightings[0].fragment else {
            panic!("expected openai fragment");
        };
        assert_eq!(f.model.as_deref(), Some("gpt-4o"));
        assert_eq!(f.instructions.as_deref(), Some("You are a personal math tutor."));
        assert_eq!(f.patterns, vec!["assistants", "code_interpreter"]);
    }

    #[test]
    fn test_openai_function_tools_is_weaker() {
        let src = r#"
import OpenAI from "openai";
const tools = [{ type: "function", function: { name: "get_weather" } }];
await client.chat.completions.create({ model: "gpt-4o-mini", tools });
"#;
        let d = VendorDetector::openai(ConfidenceLevels::default()).unwrap();
        let path = Path::new("/p/weather.ts");
        assert_eq!(d.matches(path, src), Some(0.70));
        let sightings = d.extract(path, src);
        assert_eq!(sightings[0].name, "weather");
    }

    #[test]
    fn test_openai_plain_completion_is_ignored() {
        let src = "from openai import OpenAI\nclient.chat.completions.create(model='gpt-4o')\n";
        let d = VendorDetector::openai(ConfidenceLevels::default()).unwrap();
        assert_eq!(d.matches(Path::new("/p/x.py"), src), None);
    }

    #[test]
    fn test_anthropic_levels() {
        let d = VendorDetector::anthropic(ConfidenceLevels::default()).unwrap();
        let with_tools = r#"
import anthropic
client = anthropic.Anthropic()
message = client.messages.create(
    model="claude-sonnet-4-5",
    system="You triage support tickets.",
    tools=[{"name": "lookup_ticket", "input_schema": {}}],
    messages=[],
)
"#;
        let path = Path::new("/p/triage.py");
        assert_eq!(d.matches(path, with_tools), Some(0.80));
        let sightings = d.extract(path, with_tools);
        assert_eq!(sightings[0].name, "triage");
        let RawFragment::Anthropic(f) = &sightings[0].fragment else {
            panic!("expected anthropic fragment");
        };
        assert_eq!(f.model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(f.instructions.as_deref(), Some("You triage support tickets."));
        assert!(f.patterns.contains(&"tool_use".to_string()));

        let bare = "from anthropic import Anthropic\nclient = Anthropic()\n";
        assert_eq!(d.matches(path, bare), Some(0.70));
        assert_eq!(d.matches(path, "client = Anthropic()\n"), None);
    }
}
