//! Drupal AI agent plugins: the plugin itself plus one capability per action.

use serde_json::json;

use ossa_discovery::{DiscoveryRecord, PluginFragment};
use ossa_spec::naming::{capability_slug, UniqueNames};
use ossa_spec::{annotations, Capability, FrameworkBinding};

use crate::translation::{scaffold, string_input, Translation};

const FRAMEWORK: &str = "drupal";

pub fn translate(record: &DiscoveryRecord, plugin: &PluginFragment) -> Translation {
    let label = [plugin.label.as_str(), plugin.plugin_id.as_str(), record.name.as_str()]
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("Drupal agent")
        .to_string();
    let description = plugin
        .description
        .clone()
        .unwrap_or_else(|| format!("Drupal AI agent plugin '{}'", label));

    let mut manifest = scaffold(record, None)
        .with_description(description.clone())
        .with_agent(&label, plugin.category.clone().unwrap_or_else(|| description.clone()))
        .with_label("domain", "cms")
        .with_label("category", plugin.category.clone().unwrap_or_else(|| "plugin".to_string()));
    if let Some(class) = &plugin.class_name {
        manifest = manifest.with_annotation(annotations::SOURCE_CLASS, class.clone());
    }
    if let Some(module) = &plugin.module {
        manifest = manifest.with_annotation(annotations::MODULE, module.clone());
    }

    let mut binding = FrameworkBinding::enabled("plugin")
        .with_config("pluginId", json!(plugin.plugin_id))
        .with_config("annotated", json!(plugin.annotated));
    if let Some(module) = &plugin.module {
        binding = binding.with_config("module", json!(module));
    }
    manifest.spec.frameworks.drupal = Some(binding);

    let mut translation = Translation::new(manifest);
    if plugin.plugin_id.trim().is_empty() && plugin.label.trim().is_empty() {
        translation.warn(format!(
            "Drupal plugin in {} has neither id nor label; no capabilities produced",
            record.source_path.display()
        ));
        return translation;
    }
    if !plugin.annotated {
        translation.warn(format!(
            "Drupal plugin '{}' has no @AiAgent annotation; metadata inferred from the class",
            label
        ));
    }

    let mut names = UniqueNames::new();
    let group_base = format!("run_{}", capability_slug(&plugin.plugin_id, "plugin"));
    let mut capabilities = vec![Capability::new(names.allocate(&group_base))
        .with_description(format!("Run the '{}' agent plugin", label))
        .with_input_schema(string_input("prompt", "Instruction for the agent"))
        .with_framework(FRAMEWORK)];

    for action in &plugin.actions {
        capabilities.push(
            Capability::new(names.allocate(&capability_slug(&action.name, "action")))
                .with_description(
                    action
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("{} action of '{}'", action.name, label)),
                )
                .with_input_schema(json!({ "type": "object" }))
                .with_framework(FRAMEWORK),
        );
    }

    translation.manifest.spec.capabilities = capabilities;
    translation
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossa_discovery::{AgentFormat, PluginAction, RawFragment};

    fn plugin() -> PluginFragment {
        PluginFragment {
            plugin_id: "content_summarizer".into(),
            label: "Content Summarizer".into(),
            description: Some("Summarizes nodes".into()),
            class_name: Some("ContentSummarizer".into()),
            module: Some("editorial".into()),
            category: Some("content".into()),
            actions: vec![
                PluginAction { name: "summarize".into(), description: None },
                PluginAction { name: "tagContent".into(), description: Some("Tag a node".into()) },
            ],
            annotated: true,
        }
    }

    fn record(plugin: &PluginFragment) -> DiscoveryRecord {
        DiscoveryRecord::new(
            AgentFormat::Drupal,
            plugin.plugin_id.clone(),
            "/site/modules/editorial/src/Plugin/AiAgent/ContentSummarizer.php",
            RawFragment::Drupal(plugin.clone()),
            0.95,
            "drupal-plugin",
        )
    }

    #[test]
    fn test_plugin_capabilities_and_provenance() {
        let plugin = plugin();
        let t = translate(&record(&plugin), &plugin);
        assert!(t.warnings.is_empty());
        assert_eq!(
            t.manifest.capability_names(),
            vec!["run_content_summarizer", "summarize", "tag_content"]
        );
        let m = &t.manifest.metadata;
        assert_eq!(m.name, "content-summarizer");
        assert_eq!(m.annotations[annotations::SOURCE_CLASS], "ContentSummarizer");
        assert_eq!(m.annotations[annotations::MODULE], "editorial");
        assert_eq!(m.labels["category"], "content");
        assert!(t.manifest.spec.frameworks.drupal.as_ref().unwrap().enabled);
    }

    #[test]
    fn test_unannotated_plugin_warns() {
        let mut plugin = plugin();
        plugin.annotated = false;
        plugin.actions.clear();
        let t = translate(&record(&plugin), &plugin);
        assert_eq!(t.warnings.len(), 1);
        assert_eq!(t.manifest.capability_names(), vec!["run_content_summarizer"]);
    }

    #[test]
    fn test_nameless_plugin_is_degenerate() {
        let plugin = PluginFragment::default();
        let t = translate(&record(&plugin), &plugin);
        assert!(t.manifest.spec.capabilities.is_empty());
        assert_eq!(t.warnings.len(), 1);
    }
}
