//! LangChain agents and `@tool` functions, in Python and JavaScript.

use std::path::Path;

use regex::Regex;

use crate::config::ConfidenceLevels;
use crate::detector::{capture, docstring_after, file_stem, language_of, regex, Detector, Sighting};
use crate::error::DiscoveryResult;
use crate::fragment::{RawFragment, ToolDecl, ToolFrameworkFragment};
use crate::record::AgentFormat;

pub struct LangChainDetector {
    levels: ConfidenceLevels,
    import: Regex,
    tool_decorator: Regex,
    py_tool: Regex,
    js_tool: Regex,
    constructor: Regex,
    model: Regex,
}

impl LangChainDetector {
    pub fn new(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        Ok(Self {
            levels,
            import: regex(
                r#"(?m)^\s*(?:from\s+langchain[\w.]*\s+import|import\s+langchain\b|import\s+.*\bfrom\s+["']@?langchain[\w/.-]*["']|.*require\(["']@?langchain[\w/.-]*["']\))"#,
            )?,
            tool_decorator: regex(r"(?m)^\s*@tool\b")?,
            py_tool: regex(r"(?m)^[ \t]*@tool(?:\([^)]*\))?[ \t]*\r?\n[ \t]*(?:async\s+)?def\s+(\w+)")?,
            js_tool: regex(
                r#"(?s)\bname\s*:\s*["']([\w-]+)["']\s*,\s*description\s*:\s*["']([^"']+)["']"#,
            )?,
            constructor: regex(
                r"\b(create_react_agent|create_openai_tools_agent|create_tool_calling_agent|AgentExecutor|initialize_agent|createReactAgent|createToolCallingAgent)\b",
            )?,
            model: regex(r#"\bmodel(?:_name)?\s*[=:]\s*["']([^"']+)["']"#)?,
        })
    }

    fn tools(&self, content: &str) -> Vec<ToolDecl> {
        let mut tools: Vec<ToolDecl> = Vec::new();
        for caps in self.py_tool.captures_iter(content) {
            let Some(name) = caps.get(1) else {
                continue;
            };
            tools.push(ToolDecl {
                name: name.as_str().to_string(),
                description: docstring_after(content, name.start()),
            });
        }
        for caps in self.js_tool.captures_iter(content) {
            let (Some(name), description) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if tools.iter().any(|t| t.name == name.as_str()) {
                continue;
            }
            tools.push(ToolDecl {
                name: name.as_str().to_string(),
                description: description.map(|d| d.as_str().to_string()),
            });
        }
        tools
    }
}

impl Detector for LangChainDetector {
    fn name(&self) -> &'static str {
        "langchain-agent"
    }

    fn format(&self) -> AgentFormat {
        AgentFormat::LangChain
    }

    fn file_patterns(&self) -> Vec<String> {
        vec!["*.py".to_string(), "*.ts".to_string(), "*.js".to_string()]
    }

    fn matches(&self, _path: &Path, content: &str) -> Option<f64> {
        if !self.import.is_match(content) {
            return None;
        }
        if self.constructor.is_match(content) {
            Some(self.levels.pattern)
        } else if self.tool_decorator.is_match(content) || self.js_tool.is_match(content) {
            Some(self.levels.weak_pattern)
        } else {
            None
        }
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting> {
        let fragment = ToolFrameworkFragment {
            agent_name: file_stem(path),
            agent_type: capture(&self.constructor, content),
            model: capture(&self.model, content),
            tools: self.tools(content),
            language: language_of(path).to_string(),
        };
        vec![Sighting::new(fragment.agent_name.clone(), RawFragment::LangChain(fragment))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = r#"
from langchain.agents import AgentExecutor, create_react_agent
from langchain_core.tools import tool
from langchain_openai import ChatOpenAI

@tool
def search_docs(query: str) -> str:
    """Search the product documentation."""
    return ""

@tool("lookup")
async def lookup_order(order_id: str) -> str:
    return ""

llm = ChatOpenAI(model="gpt-4o")
agent = create_react_agent(llm, [search_docs, lookup_order], prompt)
"#;

    fn detector() -> LangChainDetector {
        LangChainDetector::new(ConfidenceLevels::default()).unwrap()
    }

    #[test]
    fn test_agent_with_tools() {
        let path = Path::new("/p/support_agent.py");
        let d = detector();
        assert_eq!(d.matches(path, AGENT), Some(0.80));

        let sightings = d.extract(path, AGENT);
        assert_eq!(sightings.len(), 1);
        assert_eq!(sightings[0].name, "support_agent");
        let RawFragment::LangChain(f) = &sightings[0].fragment else {
            panic!("expected langchain fragment");
        };
        assert_eq!(f.agent_type.as_deref(), Some("create_react_agent"));
        assert_eq!(f.model.as_deref(), Some("gpt-4o"));
        assert_eq!(f.language, "python");
        assert_eq!(f.tools.len(), 2);
        assert_eq!(f.tools[0].name, "search_docs");
        assert_eq!(f.tools[0].description.as_deref(), Some("Search the product documentation."));
        assert_eq!(f.tools[1].name, "lookup_order");
        assert!(f.tools[1].description.is_none());
    }

    #[test]
    fn test_tools_only_is_weaker() {
        let src = "from langchain.tools import tool\n\n@tool\ndef ping() -> str:\n    return 'pong'\n";
        assert_eq!(detector().matches(Path::new("/p/tools.py"), src), Some(0.70));
    }

    #[test]
    fn test_javascript_tools() {
        let src = r#"
import { DynamicTool } from "@langchain/core/tools";
import { createReactAgent } from "@langchain/langgraph/prebuilt";

const weather = new DynamicTool({
  name: "get_weather",
  description: "Current weather for a city",
  func: async () => "sunny",
});
const agent = createReactAgent({ llm, tools: [weather] });
"#;
        let path = Path::new("/p/agent.ts");
        let d = detector();
        assert_eq!(d.matches(path, src), Some(0.80));
        let RawFragment::LangChain(f) = &d.extract(path, src)[0].fragment else {
            panic!("expected langchain fragment");
        };
        assert_eq!(f.language, "typescript");
        assert_eq!(f.tools[0].name, "get_weather");
        assert_eq!(f.tools[0].description.as_deref(), Some("Current weather for a city"));
    }

    #[test]
    fn test_no_import_no_match() {
        let src = "@tool\ndef ping():\n    pass\nAgentExecutor()\n";
        assert_eq!(detector().matches(Path::new("/p/x.py"), src), None);
    }
}
