//! The detector strategy interface and text helpers shared by detectors.

use std::path::Path;

use glob::Pattern;
use regex::Regex;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::fragment::RawFragment;
use crate::record::AgentFormat;

/// One agent definition extracted from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub name: String,
    pub fragment: RawFragment,
}

impl Sighting {
    pub fn new(name: impl Into<String>, fragment: RawFragment) -> Self {
        Self {
            name: name.into(),
            fragment,
        }
    }
}

/// A pluggable, per-ecosystem file recognizer.
///
/// `matches` decides whether a candidate file holds an agent and how strong
/// the evidence is; `extract` is only called on files that matched and
/// returns one sighting per agent definition in the file.
#[cfg_attr(test, mockall::automock)]
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    fn format(&self) -> AgentFormat;

    /// File-name globs selecting candidate files.
    fn file_patterns(&self) -> Vec<String>;

    fn matches(&self, path: &Path, content: &str) -> Option<f64>;

    fn extract(&self, path: &Path, content: &str) -> Vec<Sighting>;
}

/// Compile a detector's file-name globs.
pub fn compile_patterns(detector: &dyn Detector) -> DiscoveryResult<Vec<Pattern>> {
    detector
        .file_patterns()
        .into_iter()
        .map(|p| Pattern::new(&p).map_err(|e| DiscoveryError::invalid_pattern(p.clone(), e)))
        .collect()
}

/// Whether the file name of `path` matches any of `patterns`.
pub fn is_candidate(path: &Path, patterns: &[Pattern]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| patterns.iter().any(|p| p.matches(name)))
        .unwrap_or(false)
}

pub(crate) fn regex(pattern: &str) -> DiscoveryResult<Regex> {
    Regex::new(pattern).map_err(|e| DiscoveryError::invalid_pattern(pattern, e))
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("agent")
        .to_string()
}

/// Source language by file extension.
pub(crate) fn language_of(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => "python",
        Some("ts") | Some("mts") | Some("tsx") => "typescript",
        Some("js") | Some("mjs") | Some("cjs") => "javascript",
        Some("php") => "php",
        _ => "unknown",
    }
}

/// First capture group of `re` in `haystack`, trimmed.
pub(crate) fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Every first capture group of `re`, de-duplicated in order of appearance.
pub(crate) fn capture_all(re: &Regex, haystack: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for caps in re.captures_iter(haystack) {
        if let Some(m) = caps.get(1) {
            let value = m.as_str().trim().to_string();
            if !value.is_empty() && !out.contains(&value) {
                out.push(value);
            }
        }
    }
    out
}

/// Argument text of each call whose opening parenthesis ends a match of `re`.
pub(crate) fn call_bodies<'a>(re: &Regex, content: &'a str) -> Vec<&'a str> {
    re.find_iter(content)
        .filter_map(|m| call_body(content, m.end().saturating_sub(1)))
        .collect()
}

/// Text between the parenthesis at `open` and its match, honoring quotes.
pub(crate) fn call_body(content: &str, open: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return content.get(open + 1..i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Python docstring directly following the `def` header that starts at `offset`.
pub(crate) fn docstring_after(content: &str, offset: usize) -> Option<String> {
    let rest = content.get(offset..)?;
    let header_end = rest.find(":\n").or_else(|| rest.find(":\r\n"))?;
    let body = rest[header_end + 1..].trim_start();
    let delim = ["\"\"\"", "'''"].into_iter().find(|d| body.starts_with(d))?;
    let inner = &body[delim.len()..];
    let end = inner.find(delim)?;
    let doc = inner[..end]
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?
        .to_string();
    Some(doc)
}
