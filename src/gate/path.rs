//! Segment-aware path patterns.
//!
//! # Responsibilities
//! - Normalize request paths into `/`-delimited segments
//! - Match a pattern as a segment prefix or as an exact path
//! - Detect nesting between patterns (used by config validation)
//!
//! # Design Decisions
//! - Matching is done on whole segments, never on raw string prefixes:
//!   `/admin` covers `/admin/dashboard` but not `/administration`
//! - Percent-escapes are decoded before splitting, so `%61dmin`, `%2e%2e` and
//!   `admin%2Fdashboard` are seen the way the renderer sees them
//! - Empty and `.` segments are dropped, `..` pops (RFC 3986 dot-segment removal)
//! - Query and fragment are ignored
//! - Case-sensitive
//! - A path that does not start with `/` matches nothing

use std::fmt;

/// Reasons a configured pattern is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern {0:?} must start with '/'")]
    NotAbsolute(String),

    #[error("pattern {0:?} contains a query, fragment or control character")]
    InvalidCharacter(String),
}

/// A normalized path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<String>,
}

impl PathPattern {
    /// Parse a configured pattern such as `/admin` or `/adminlogin`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }
        if raw.chars().any(|c| c == '?' || c == '#' || c.is_control() || c.is_whitespace()) {
            return Err(PatternError::InvalidCharacter(raw.to_string()));
        }

        let segments = normalized_segments(raw)
            .unwrap_or_default();

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the pattern's segments are a leading run of the path's segments.
    pub fn matches_prefix(&self, path: &str) -> bool {
        match normalized_segments(path) {
            Some(segments) => starts_with_segments(&segments, &self.segments),
            None => false,
        }
    }

    /// True when the path normalizes to exactly the pattern's segments.
    pub fn matches_exact(&self, path: &str) -> bool {
        match normalized_segments(path) {
            Some(segments) => {
                segments.len() == self.segments.len()
                    && starts_with_segments(&segments, &self.segments)
            }
            None => false,
        }
    }

    /// True when every path under `other` is also under `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        other.segments.len() >= self.segments.len()
            && other
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(a, b)| a == b)
    }

    /// True when both patterns describe the same normalized path.
    pub fn same_path(&self, other: &PathPattern) -> bool {
        self.segments == other.segments
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a request path into decoded, normalized segments.
///
/// Returns `None` for paths that are not absolute. Escapes that do not form
/// valid UTF-8 are replaced with U+FFFD.
pub fn normalized_segments(path: &str) -> Option<Vec<String>> {
    let path = strip_query(path);
    if !path.starts_with('/') {
        return None;
    }

    let decoded = urlencoding::decode_binary(path.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s.to_string()),
        }
    }
    Some(segments)
}

/// Rebuild a request path from its normalized segments.
///
/// Each segment is percent-encoded again, so the result normalizes to the
/// same segments and contains no dot-segments or encoded separators. A
/// trailing slash on the input is kept. Returns `None` for paths that are
/// not absolute.
pub fn canonical_path(path: &str) -> Option<String> {
    let segments = normalized_segments(path)?;

    let mut canonical = String::with_capacity(path.len());
    for segment in &segments {
        canonical.push('/');
        canonical.push_str(&urlencoding::encode(segment));
    }
    if canonical.is_empty() || strip_query(path).ends_with('/') {
        canonical.push('/');
    }
    Some(canonical)
}

fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

fn starts_with_segments(path: &[String], prefix: &[String]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(segments: &[&str]) -> Option<Vec<String>> {
        Some(segments.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_normalized_segments() {
        assert_eq!(normalized_segments("/"), owned(&[]));
        assert_eq!(normalized_segments("/admin/dashboard"), owned(&["admin", "dashboard"]));
        assert_eq!(normalized_segments("/admin//x/"), owned(&["admin", "x"]));
        assert_eq!(normalized_segments("/admin/./x"), owned(&["admin", "x"]));
        assert_eq!(normalized_segments("/cars/../admin"), owned(&["admin"]));
        assert_eq!(normalized_segments("/../../admin"), owned(&["admin"]));
        assert_eq!(normalized_segments("/admin?next=/cars"), owned(&["admin"]));
        assert_eq!(normalized_segments("admin"), None);
        assert_eq!(normalized_segments(""), None);
    }

    #[test]
    fn test_escapes_are_decoded_before_matching() {
        assert_eq!(normalized_segments("/%61dmin/dashboard"), owned(&["admin", "dashboard"]));
        assert_eq!(normalized_segments("/admin%2Fdashboard"), owned(&["admin", "dashboard"]));
        assert_eq!(normalized_segments("/cars/%2e%2e/admin"), owned(&["admin"]));
        assert_eq!(normalized_segments("/cars/%2E/x"), owned(&["cars", "x"]));
        assert_eq!(normalized_segments("/admin/%FF"), owned(&["admin", "\u{FFFD}"]));

        let admin = PathPattern::parse("/admin").unwrap();
        assert!(admin.matches_prefix("/%61dmin/dashboard"));
        assert!(admin.matches_prefix("/%2e%2e/admin/dashboard"));
        assert!(admin.matches_prefix("/admin%2Fdashboard"));
        assert!(admin.matches_prefix("/%61%64%6D%69%6E"));
        assert!(!admin.matches_prefix("/%61dministration"));
        // Decoded once, like the renderer does.
        assert!(!admin.matches_prefix("/%2561dmin"));
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("/").as_deref(), Some("/"));
        assert_eq!(canonical_path("/cars").as_deref(), Some("/cars"));
        assert_eq!(canonical_path("/cars/").as_deref(), Some("/cars/"));
        assert_eq!(canonical_path("/cars?make=toyota").as_deref(), Some("/cars"));
        assert_eq!(canonical_path("/admin/dashboard/../../cars").as_deref(), Some("/cars"));
        assert_eq!(canonical_path("/%61dmin//dashboard").as_deref(), Some("/admin/dashboard"));
        assert_eq!(canonical_path("/admin%2Fdashboard").as_deref(), Some("/admin/dashboard"));
        assert_eq!(canonical_path("/blog/spring%20deals").as_deref(), Some("/blog/spring%20deals"));
        assert_eq!(canonical_path("/cars/..").as_deref(), Some("/"));
        assert_eq!(canonical_path("/%2561dmin").as_deref(), Some("/%2561dmin"));
        assert_eq!(canonical_path("admin"), None);
        assert_eq!(canonical_path("*"), None);
    }

    #[test]
    fn test_canonical_path_is_stable() {
        for path in ["/%61dmin/x/", "/a/./b/../c%2Fd", "/blog/caf%C3%A9", "/x/%FF"] {
            let once = canonical_path(path).unwrap();
            assert_eq!(canonical_path(&once).as_deref(), Some(once.as_str()), "{path}");
            assert_eq!(normalized_segments(&once), normalized_segments(path), "{path}");
        }
    }

    #[test]
    fn test_prefix_respects_segment_boundary() {
        let admin = PathPattern::parse("/admin").unwrap();

        assert!(admin.matches_prefix("/admin"));
        assert!(admin.matches_prefix("/admin/"));
        assert!(admin.matches_prefix("/admin/dashboard"));
        assert!(admin.matches_prefix("/admin/cars/42/edit"));

        assert!(!admin.matches_prefix("/administration"));
        assert!(!admin.matches_prefix("/adminpanel"));
        assert!(!admin.matches_prefix("/adminlogin"));
        assert!(!admin.matches_prefix("/cars/admin"));
        assert!(!admin.matches_prefix("/"));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let admin = PathPattern::parse("/admin").unwrap();
        assert!(!admin.matches_prefix("/Admin/dashboard"));
    }

    #[test]
    fn test_malformed_paths_match_nothing() {
        let admin = PathPattern::parse("/admin").unwrap();
        assert!(!admin.matches_prefix("admin/dashboard"));
        assert!(!admin.matches_prefix(""));
        assert!(!admin.matches_exact("admin"));
    }

    #[test]
    fn test_exact_match() {
        let login = PathPattern::parse("/adminlogin").unwrap();

        assert!(login.matches_exact("/adminlogin"));
        assert!(login.matches_exact("/adminlogin/"));
        assert!(login.matches_exact("/adminlogin?error=1"));
        assert!(!login.matches_exact("/adminlogin/reset"));
        assert!(!login.matches_exact("/admin"));
    }

    #[test]
    fn test_root_pattern_covers_everything() {
        let root = PathPattern::parse("/").unwrap();
        assert!(root.matches_prefix("/"));
        assert!(root.matches_prefix("/cars"));
        assert!(root.matches_exact("/"));
        assert!(!root.matches_exact("/cars"));
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        assert_eq!(PathPattern::parse(""), Err(PatternError::Empty));
        assert_eq!(PathPattern::parse("   "), Err(PatternError::Empty));
        assert_eq!(
            PathPattern::parse("admin"),
            Err(PatternError::NotAbsolute("admin".into()))
        );
        assert!(matches!(
            PathPattern::parse("/admin?x=1"),
            Err(PatternError::InvalidCharacter(_))
        ));
        assert!(matches!(
            PathPattern::parse("/ad min"),
            Err(PatternError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_covers_and_same_path() {
        let admin = PathPattern::parse("/admin").unwrap();
        let users = PathPattern::parse("/admin/users").unwrap();
        let trailing = PathPattern::parse("/admin/").unwrap();
        let other = PathPattern::parse("/administration").unwrap();

        assert!(admin.covers(&users));
        assert!(!users.covers(&admin));
        assert!(!admin.covers(&other));
        assert!(admin.same_path(&trailing));
        assert_eq!(trailing.as_str(), "/admin/");
    }
}
