//! Drupal AI agent plugins (`@AiAgent` annotations and `#[AiAgent]` attributes).

use std::path::{Component, Path};

use regex::Regex;

use crate::config::ConfidenceLevels;
use crate::detector::{capture, capture_all, regex, Detector, Sighting};
use crate::error::DiscoveryResult;
use crate::fragment::{PluginAction, PluginFragment, RawFragment};
use crate::record::AgentFormat;

/// Base class methods that are not agent actions.
const LIFECYCLE_METHODS: &[&str] = &["create", "build", "setup", "initialize"];

pub struct DrupalDetector {
    levels: ConfidenceLevels,
    annotation: Regex,
    attribute: Regex,
    class: Regex,
    id: Regex,
    label: Regex,
    description: Regex,
    category: Regex,
    actions: Regex,
    quoted: Regex,
    public_method: Regex,
}

impl DrupalDetector {
    pub fn new(levels: ConfidenceLevels) -> DiscoveryResult<Self> {
        let text_value = r#"\s*[=:]\s*(?:@Translation\(|new\s+TranslatableMarkup\()?\s*["']([^"']+)["']"#;
        Ok(Self {
            levels,
            annotation: regex(r"(?s)@AiAgent\s*\((.*?)\)\s*\n?\s*\*/")?,
            attribute: regex(r"(?s)#\[AiAgent\s*\((.*?)\)\]")?,
            class: regex(r"(?m)^\s*(?:final\s+|abstract\s+)?class\s+(\w+)")?,
            id: regex(r#"\bid\s*[=:]\s*["']([^"']+)["']"#)?,
            label: regex(&format!(r"\blabel{}", text_value))?,
            description: regex(&format!(r"\bdescription{}", text_value))?,
            category: regex(&format!(r"\bcategory{}", text_value))?,
            actions: regex(r"(?s)\bactions\s*[=:]\s*[\{\[](.*?)[\}\]]")?,
            quoted: regex(r#"["']([^"']+)["']"#)?,
            public_method: regex(r"public\s+function\s+(\w+)\s*\(")?,
        })
    }

    fn annotation_body<'a>(&self, content: &'a str) -> Option<&'a str> {
        self.annotation
            .captures(content)
            .or_else(|| self.attribute.captures(content))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn in_plugin_dir(path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        normalized.contains("/Plugin/AiAgent/")
    }

    /// Module name from a `modules/[custom|contrib/]<module>/` path segment.
    fn module_of(path: &Path) -> Option<String> {
        let parts: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str().map(str::to_string),
                _ => None,
            })
            .collect();
        let idx = parts.iter().rposition(|p| p == "modules")?;
        let mut rest = parts.iter().skip(idx + 1);
        let mut candidate = rest.next()?;
        if candidate == "custom" || candidate == "contrib" {
            candidate = rest.next()?;
        }
        // The module directory must not be the file itself.
        if parts.last() == Some(candidate) {
            return None;
        }
        Some(candidate.clone())
    }

    fn actions(&self, annotation: Option<&str>, content: &str) -> Vec<PluginAction> {
        if let Some(list) = annotation.and_then(|body| capture(&self.actions, body)) {
            let declared = capture_all(&self.quoted, &list);
            if !declared.is_empty() {
                return declared
                    .into_iter()
                    .map(|name| PluginAction { name, description: None })
                    .collect();
            }
        }
        capture_all(&self.public_method, content)
            .into_iter()
            .filter(|m| {
                !m.starts_with("__")
                    && !m.starts_with("get")
                    && !m.starts_with("set")
                    && !m.starts_with("is")
                    && !LIFECYCLE_METHODS.contains(&m.as_str())
            })
            .map(|name| PluginAction { name, description: None })
            .collect()
    }
}

impl Detector for DrupalDetector {
    fn name(&self) -> &'static str {
        "drupal-plugin"
    }

    fn format(&self) -> AgentFormat {
        AgentFormat::Drupal
    }

    fn file_patterns(&self) -> Vec<String> {
        vec!["*.php".to_string()]
    }

    fn matches(&self, path: &Path, content: &str) -> Option<f64> {
        let has_class = self.class.is_match(content);
        if self.annotation_body(content).is_some() && has_class {
            Some(self.levels.structural)
        } else if has_class && Self::in_plugin_dir(path) {
            Some(self.levels.filename)
        } else {
            None
        }
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting> {
        let annotation = self.annotation_body(content);
        let class_name = capture(&self.class, content);
        let field = |re: &Regex| annotation.and_then(|body| capture(re, body));

        let plugin_id = field(&self.id)
            .or_else(|| class_name.as_deref().map(ossa_spec::naming::kebab_case).map(|s| s.replace('-', "_")))
            .unwrap_or_default();
        let label = field(&self.label)
            .or_else(|| class_name.clone())
            .unwrap_or_else(|| plugin_id.clone());
        if plugin_id.is_empty() && label.is_empty() {
            return Vec::new();
        }

        let fragment = PluginFragment {
            plugin_id: plugin_id.clone(),
            label: label.clone(),
            description: field(&self.description),
            class_name,
            module: Self::module_of(path),
            category: field(&self.category),
            actions: self.actions(annotation, content),
            annotated: annotation.is_some(),
        };
        let name = if plugin_id.is_empty() { label } else { plugin_id };
        vec![Sighting::new(name, RawFragment::Drupal(fragment))]
    }
}
