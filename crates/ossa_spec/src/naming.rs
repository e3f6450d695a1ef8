//! Name normalization shared by discovery ids, manifest names and capability names.

/// Lowercase ASCII slug with runs of non-alphanumerics collapsed into `sep`.
fn slugify(s: &str, sep: char) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}

/// Split `CamelCase` words so `ResearchAgent` becomes `Research Agent`.
fn split_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if let Some(p) = prev {
            if c.is_ascii_uppercase() && (p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// `^[a-z0-9-]+$` form, e.g. `Research Crew` → `research-crew`.
///
/// Returns an empty string when the input has no ASCII alphanumerics.
pub fn kebab_case(s: &str) -> String {
    slugify(&split_camel(s), '-')
}

/// `^[a-z][a-z0-9_]*$` form, e.g. `Senior Data Analyst` → `senior_data_analyst`.
///
/// A leading digit is prefixed with `n_`; an empty result falls back to `fallback`.
pub fn capability_slug(s: &str, fallback: &str) -> String {
    let slug = slugify(&split_camel(s), '_');
    match slug.chars().next() {
        None => fallback.to_string(),
        Some(c) if c.is_ascii_digit() => format!("n_{}", slug),
        Some(_) => slug,
    }
}

/// Capability slug limited to the first `max_words` words of a long label.
pub fn capability_slug_words(s: &str, max_words: usize, fallback: &str) -> String {
    let short = s.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ");
    capability_slug(&short, fallback)
}

/// Allocates unique capability names, suffixing collisions with their
/// position among equal names (`_2`, `_3`, ...).
#[derive(Debug, Default)]
pub struct UniqueNames {
    seen: std::collections::HashMap<String, usize>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name that must not be reused by later calls.
    pub fn reserve(&mut self, name: &str) {
        self.seen.entry(name.to_string()).or_insert(1);
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let count = self.seen.entry(base.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return base.to_string();
        }
        let mut n = *count;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 1);
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::{is_capability_name, is_kebab_case};

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("Research Crew"), "research-crew");
        assert_eq!(kebab_case("ResearchAgent"), "research-agent");
        assert_eq!(kebab_case("  weather_server!! "), "weather-server");
        assert_eq!(kebab_case("日本"), "");
    }

    #[test]
    fn test_capability_slug() {
        assert_eq!(capability_slug("Senior Data Analyst", "member"), "senior_data_analyst");
        assert_eq!(capability_slug("3D modeller", "member"), "n_3d_modeller");
        assert_eq!(capability_slug("!!!", "member"), "member");
        assert_eq!(
            capability_slug_words("Research the latest AI trends in 2024 and report", 4, "step"),
            "research_the_latest_ai"
        );
    }

    #[test]
    fn test_slugs_satisfy_patterns() {
        for input in ["Hello World", "API Key Manager", "x", "9lives", "CamelCaseName"] {
            assert!(is_capability_name(&capability_slug(input, "fallback")), "{}", input);
            assert!(is_kebab_case(&kebab_case(input)), "{}", input);
        }
    }

    #[test]
    fn test_unique_names_suffix_by_position() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("writer"), "writer");
        assert_eq!(names.allocate("writer"), "writer_2");
        assert_eq!(names.allocate("writer"), "writer_3");
        assert_eq!(names.allocate("editor"), "editor");
    }

    #[test]
    fn test_unique_names_avoid_reserved() {
        let mut names = UniqueNames::new();
        names.reserve("writer_2");
        assert_eq!(names.allocate("writer"), "writer");
        assert_eq!(names.allocate("writer"), "writer_3");
    }
}
