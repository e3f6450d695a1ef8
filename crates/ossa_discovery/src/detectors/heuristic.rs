//! Filename-only sightings for files that look like agents but match no ecosystem.

use std::path::Path;

use serde_json::json;

use crate::config::ConfidenceLevels;
use crate::detector::{file_stem, language_of, Detector, Sighting};
use crate::fragment::RawFragment;
use crate::record::AgentFormat;

pub struct FilenameHeuristicDetector {
    levels: ConfidenceLevels,
}

impl FilenameHeuristicDetector {
    pub fn new(levels: ConfidenceLevels) -> Self {
        Self { levels }
    }
}

impl Detector for FilenameHeuristicDetector {
    fn name(&self) -> &'static str {
        "filename-heuristic"
    }

    fn format(&self) -> AgentFormat {
        AgentFormat::Unknown
    }

    fn file_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();
        for stem in ["*agent*", "*Agent*"] {
            for ext in ["py", "ts", "js", "php"] {
                patterns.push(format!("{}.{}", stem, ext));
            }
        }
        patterns
    }

    fn matches(&self, _path: &Path, content: &str) -> Option<f64> {
        (!content.trim().is_empty()).then_some(self.levels.filename)
    }

    fn extract(&self, path: &Path, _content: &str) -> Vec<Sighting> {
        let name = file_stem(path);
        let fragment = RawFragment::Unknown(json!({
            "fileName": path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            "language": language_of(path),
            "reason": "filename",
        }));
        vec![Sighting::new(name, fragment)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_sighting() {
        let d = FilenameHeuristicDetector::new(ConfidenceLevels::default());
        let path = Path::new("/p/billing_agent.py");
        assert_eq!(d.matches(path, "print('hi')"), Some(0.30));
        assert_eq!(d.matches(path, "   \n"), None);

        let sightings = d.extract(path, "");
        assert_eq!(sightings[0].name, "billing_agent");
        let RawFragment::Unknown(value) = &sightings[0].fragment else {
            panic!("expected unknown fragment");
        };
        assert_eq!(value["language"], "python");
    }
}
