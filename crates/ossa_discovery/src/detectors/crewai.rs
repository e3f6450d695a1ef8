//! CrewAI crews, from Python source and from `agents.yaml` / `tasks.yaml` configs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::config::ConfidenceLevels;
use crate::detector::{call_body, capture, capture_all, file_stem, regex, Detector, Sighting};
use crate::error::DiscoveryResult;
use crate::fragment::{CrewFragment, CrewMember, CrewStep, RawFragment};
use crate::record::AgentFormat;

/// File stems too generic to name a crew after.
const GENERIC_STEMS: &[&str] = &["crew", "main", "app", "agents", "__init__"];

/// Python string literal after `key=`: triple-quoted, double or single quoted.
fn string_kwarg(key: &str) -> String {
    format!(
        r#"(?s)\b{key}\s*=\s*[rfbuRFBU]?(?:"""(.*?)"""|'''(.*?)'''|"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#
    )
}

pub struct CrewAiDetector {
    levels: ConfidenceLevels,
    import: Regex,
    agent_call: Regex,
    task_call: Regex,
    crew_call: Regex,
    crew_class: Regex,
    role: Regex,
    goal: Regex,
    backstory: Regex,
    description: Regex,
    expected_output: Regex,
    name: Regex,
    agent_ref: Regex,
    tools_list: Regex,
    identifier: Regex,
    process: Regex,
    agents_config: Regex,
    tasks_config: Regex,
    def_name: Regex,
}

impl CrewAiDetector {
    pub fn new(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        Ok(Self {
            levels,
            import: regex(r"(?m)^\s*(?:from\s+crewai(?:\.[\w.]+)?\s+import|import\s+crewai\b)")?,
            agent_call: regex(r"(?:\b(\w+)\s*=\s*)?\bAgent\s*\(")?,
            task_call: regex(r"(?:\b(\w+)\s*=\s*)?\bTask\s*\(")?,
            crew_call: regex(r"\bCrew\s*\(")?,
            crew_class: regex(r"@CrewBase\s*\n\s*class\s+(\w+)")?,
            role: regex(&string_kwarg("role"))?,
            goal: regex(&string_kwarg("goal"))?,
            backstory: regex(&string_kwarg("backstory"))?,
            description: regex(&string_kwarg("description"))?,
            expected_output: regex(&string_kwarg("expected_output"))?,
            name: regex(&string_kwarg("name"))?,
            agent_ref: regex(r"\bagent\s*=\s*(?:self\.)?(\w+)")?,
            tools_list: regex(r"(?s)\btools\s*=\s*\[(.*?)\]")?,
            identifier: regex(r"(?:self\.)?([A-Za-z_]\w*)")?,
            process: regex(r"\bprocess\s*=\s*Process\.(\w+)")?,
            agents_config: regex(r#"agents_config\[\s*["'](\w+)["']\s*\]"#)?,
            tasks_config: regex(r#"tasks_config\[\s*["'](\w+)["']\s*\]"#)?,
            def_name: regex(r"def\s+(\w+)\s*\(")?,
        })
    }

    fn is_yaml(path: &Path) -> bool {
        matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
    }

    fn is_agents_yaml(path: &Path) -> bool {
        Self::is_yaml(path) && file_stem(path) == "agents"
    }

    fn kwarg(re: &Regex, body: &str) -> Option<String> {
        re.captures(body)
            .and_then(|c| c.iter().skip(1).flatten().next().map(|m| m.as_str().trim().to_string()))
            .filter(|s| !s.is_empty())
    }

    /// Name of the method whose body contains `pos`, for `@agent def researcher(self)` styles.
    fn enclosing_def(&self, content: &str, pos: usize) -> Option<String> {
        let window_start = pos.saturating_sub(300);
        let window = content.get(window_start..pos)?;
        self.def_name
            .captures_iter(window)
            .last()
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn crew_name(&self, path: &Path, content: &str) -> String {
        if let Some(class) = capture(&self.crew_class, content) {
            return class;
        }
        let stem = file_stem(path);
        if GENERIC_STEMS.contains(&stem.as_str()) {
            if let Some(dir) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
                return dir.to_string();
            }
        }
        stem
    }

    fn tools(&self, body: &str) -> Vec<String> {
        capture(&self.tools_list, body)
            .map(|list| capture_all(&self.identifier, &list))
            .unwrap_or_default()
    }

    fn extract_python(&self, path: &Path, content: &str) -> CrewFragment {
        let mut members = Vec::new();
        let mut role_by_ref: HashMap<String, String> = HashMap::new();

        for caps in self.agent_call.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(body) = call_body(content, whole.end() - 1) else { continue };
            let reference = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .or_else(|| self.enclosing_def(content, whole.start()));
            let role = Self::kwarg(&self.role, body)
                .or_else(|| capture(&self.agents_config, body))
                .or_else(|| reference.clone())
                .unwrap_or_else(|| format!("agent {}", members.len() + 1));
            if let Some(r) = reference {
                role_by_ref.insert(r, role.clone());
            }
            members.push(CrewMember {
                role,
                goal: Self::kwarg(&self.goal, body),
                backstory: Self::kwarg(&self.backstory, body),
                tools: self.tools(body),
            });
        }

        let mut steps = Vec::new();
        for caps in self.task_call.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(body) = call_body(content, whole.end() - 1) else { continue };
            let reference = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .or_else(|| self.enclosing_def(content, whole.start()));
            let description = Self::kwarg(&self.description, body)
                .or_else(|| capture(&self.tasks_config, body))
                .or_else(|| reference.clone())
                .unwrap_or_default();
            let agent = capture(&self.agent_ref, body)
                .map(|r| role_by_ref.get(&r).cloned().unwrap_or(r));
            steps.push(CrewStep {
                name: Self::kwarg(&self.name, body).or(reference),
                description,
                expected_output: Self::kwarg(&self.expected_output, body),
                agent,
            });
        }

        CrewFragment {
            crew_name: self.crew_name(path, content),
            process: capture(&self.process, content).map(|p| p.to_lowercase()),
            members,
            steps,
        }
    }

    fn yaml_mapping(path: &Path, content: &str) -> Option<Mapping> {
        match serde_yaml::from_str::<Value>(content) {
            Ok(Value::Mapping(m)) => Some(m),
            Ok(_) => None,
            Err(e) => {
                debug!("Skipping unparsable CrewAI config {:?}: {}", path, e);
                None
            }
        }
    }

    fn yaml_str(entry: &Value, key: &str) -> Option<String> {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn has_roles(agents: &Mapping) -> bool {
        agents.values().any(|v| v.get("role").is_some())
    }

    fn sibling_tasks(path: &Path) -> Option<Mapping> {
        let dir = path.parent()?;
        ["tasks.yaml", "tasks.yml"].iter().find_map(|name| {
            let tasks_path = dir.join(name);
            let content = fs::read_to_string(&tasks_path).ok()?;
            Self::yaml_mapping(&tasks_path, &content)
        })
    }

    fn crew_name_for_config(path: &Path) -> String {
        let mut dir = path.parent();
        if dir.and_then(|d| d.file_name()).and_then(|n| n.to_str()) == Some("config") {
            dir = dir.and_then(Path::parent);
        }
        dir.and_then(|d| d.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("crew")
            .to_string()
    }

    fn extract_yaml(path: &Path, agents: &Mapping) -> CrewFragment {
        let mut role_by_key: HashMap<String, String> = HashMap::new();
        let mut members = Vec::new();
        for (key, entry) in agents {
            let key = key.as_str().unwrap_or_default().to_string();
            let role = Self::yaml_str(entry, "role").unwrap_or_else(|| key.clone());
            role_by_key.insert(key, role.clone());
            members.push(CrewMember {
                role,
                goal: Self::yaml_str(entry, "goal"),
                backstory: Self::yaml_str(entry, "backstory"),
                tools: entry
                    .get("tools")
                    .and_then(Value::as_sequence)
                    .map(|s| s.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default(),
            });
        }

        let steps = Self::sibling_tasks(path)
            .map(|tasks| {
                tasks
                    .iter()
                    .map(|(key, entry)| {
                        let key = key.as_str().map(str::to_string);
                        CrewStep {
                            description: Self::yaml_str(entry, "description")
                                .or_else(|| key.clone())
                                .unwrap_or_default(),
                            expected_output: Self::yaml_str(entry, "expected_output"),
                            agent: Self::yaml_str(entry, "agent")
                                .map(|a| role_by_key.get(&a).cloned().unwrap_or(a)),
                            name: key,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        CrewFragment {
            crew_name: Self::crew_name_for_config(path),
            process: None,
            members,
            steps,
        }
    }
}

impl Detector for CrewAiDetector {
    fn name(&self) -> &'static str {
        "crewai-crew"
    }

    fn format(&self) -> AgentFormat {
        AgentFormat::CrewAi
    }

    fn file_patterns(&self) -> Vec<String> {
        ["*.py", "agents.yaml", "agents.yml", "tasks.yaml", "tasks.yml"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn matches(&self, path: &Path, content: &str) -> Option<f64> {
        if Self::is_yaml(path) {
            // Task files are read through their sibling agents file.
            if !Self::is_agents_yaml(path) {
                return None;
            }
            return Self::yaml_mapping(path, content)
                .filter(Self::has_roles)
                .map(|_| self.levels.structural);
        }
        if !self.import.is_match(content) || !self.agent_call.is_match(content) {
            return None;
        }
        if self.crew_call.is_match(content) {
            Some(self.levels.pattern)
        } else {
            Some(self.levels.mid_pattern())
        }
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting> {
        let fragment = if Self::is_yaml(path) {
            match Self::yaml_mapping(path, content) {
                Some(agents) => Self::extract_yaml(path, &agents),
                None => return Vec::new(),
            }
        } else {
            self.extract_python(path, content)
        };
        vec![Sighting::new(fragment.crew_name.clone(), RawFragment::CrewAi(fragment))]
    }
}
