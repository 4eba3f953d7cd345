//! Express-style path patterns.
//!
//! # Responsibilities
//! - Parse patterns such as `/sites/:site/:section`
//! - Match request paths exactly or by segment prefix
//! - Extract named parameters and the unmatched remainder
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A single trailing slash is ignored
//! - Prefix matching respects segment boundaries (`/stats` never matches `/statsx`)

use percent_encoding::percent_decode_str;
use std::fmt;
use thiserror::Error;

/// Error returned for malformed patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern '{0}' has an unnamed parameter")]
    UnnamedParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Exact,
    Prefix,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    mode: Mode,
}

/// Parameters captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, String)>,
    rest: String,
}

impl PathParams {
    /// Get a captured parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The part of the path after the matched segments (empty or starting with `/`).
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// All captured parameters in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PathPattern {
    /// Pattern that matches the whole path.
    pub fn exact(pattern: &str) -> Result<Self, PatternError> {
        Self::compile(pattern, Mode::Exact)
    }

    /// Pattern that matches the path and everything below it.
    pub fn prefix(pattern: &str) -> Result<Self, PatternError> {
        Self::compile(pattern, Mode::Prefix)
    }

    /// Pattern for a section path: `/` only matches the root, anything else
    /// matches itself and its sub-paths.
    pub fn section(pattern: &str) -> Result<Self, PatternError> {
        if pattern == "/" {
            Self::exact(pattern)
        } else {
            Self::prefix(pattern)
        }
    }

    fn compile(pattern: &str, mode: Mode) -> Result<Self, PatternError> {
        let segments = split(pattern)
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?
            .into_iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some("") => Err(PatternError::UnnamedParam(pattern.to_string())),
                Some(name) => Ok(Segment::Param(name.to_string())),
                None => Ok(Segment::Literal(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
            mode,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request path, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts = split(path)?;

        let fits = match self.mode {
            Mode::Exact => parts.len() == self.segments.len(),
            Mode::Prefix => parts.len() >= self.segments.len(),
        };
        if !fits {
            return None;
        }

        let mut values = Vec::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    values.push((name.clone(), decode(part)));
                }
                _ => return None,
            }
        }

        let remaining = &parts[self.segments.len()..];
        let rest = if remaining.is_empty() {
            String::new()
        } else {
            format!("/{}", remaining.join("/"))
        };

        Some(PathParams { values, rest })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a path into segments, dropping one trailing slash.
fn split(path: &str) -> Option<Vec<&str>> {
    let trimmed = path.strip_prefix('/')?;
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    Some(trimmed.split('/').collect())
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_with_params() {
        let pattern = PathPattern::exact("/sites/:site/:section").unwrap();

        let params = pattern.matches("/sites/123/upgrade").unwrap();
        assert_eq!(params.get("site"), Some("123"));
        assert_eq!(params.get("section"), Some("upgrade"));
        assert_eq!(params.rest(), "");

        assert!(pattern.matches("/sites/123/upgrade/").is_some());
        assert!(pattern.matches("/sites/123").is_none());
        assert!(pattern.matches("/sites/123/upgrade/more").is_none());
        assert!(pattern.matches("/sites//upgrade").is_none());
    }

    #[test]
    fn test_prefix_match_respects_segments() {
        let pattern = PathPattern::prefix("/stats").unwrap();

        assert!(pattern.matches("/stats").is_some());
        assert!(pattern.matches("/stats/").is_some());
        assert_eq!(pattern.matches("/stats/day/example.com").unwrap().rest(), "/day/example.com");
        assert!(pattern.matches("/statsx").is_none());
        assert!(pattern.matches("/").is_none());
    }

    #[test]
    fn test_section_root_is_exact() {
        let root = PathPattern::section("/").unwrap();
        assert!(root.matches("/").is_some());
        assert!(root.matches("/stats").is_none());

        let stats = PathPattern::section("/stats").unwrap();
        assert!(stats.matches("/stats/insights").is_some());
    }

    #[test]
    fn test_params_are_decoded() {
        let pattern = PathPattern::exact("/tag/:slug").unwrap();
        let params = pattern.matches("/tag/caf%C3%A9").unwrap();
        assert_eq!(params.get("slug"), Some("café"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            PathPattern::exact("stats"),
            Err(PatternError::MissingLeadingSlash("stats".into()))
        );
        assert_eq!(
            PathPattern::exact("/sites/:"),
            Err(PatternError::UnnamedParam("/sites/:".into()))
        );
    }
}
