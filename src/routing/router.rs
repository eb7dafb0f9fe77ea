//! Servlet mapping resolution.
//!
//! # Responsibilities
//! - Store the servlet-name ↔ URL-pattern mappings of an application
//! - Select exactly one servlet for a request path
//! - Split the path into servlet path and path info
//!
//! # Design Decisions
//! - Immutable after construction
//! - Only prefix, extension and default patterns take part; exact patterns
//!   are reserved for filter selection
//! - Ties are broken by the longest pattern *string*, not the longest matched
//!   prefix. Among equally long patterns the first declared wins
//! - Explicit `NoHandlerAvailable` rather than a silent default

use crate::error::ServletError;
use crate::routing::matcher::{matches_extension, matches_prefix, PatternKind};

/// URL patterns declared for one servlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServletMapping {
    pub servlet_name: String,
    pub url_patterns: Vec<String>,
}

/// Result of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub servlet_name: String,
    /// The winning pattern.
    pub pattern: String,
    pub servlet_path: String,
    /// Always starts with `/`.
    pub path_info: String,
}

/// Resolves request paths against servlet mappings.
#[derive(Debug, Clone, Default)]
pub struct Router {
    mappings: Vec<ServletMapping>,
}

impl Router {
    pub fn new(mappings: Vec<ServletMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[ServletMapping] {
        &self.mappings
    }

    /// Select the servlet for `path`.
    pub fn resolve(&self, path: &str) -> Result<ResolvedMapping, ServletError> {
        // Candidate set keyed by pattern string: a later servlet declaring the
        // same pattern replaces the earlier one but keeps its position.
        let mut candidates: Vec<(&str, &str)> = Vec::new();
        for mapping in &self.mappings {
            for pattern in &mapping.url_patterns {
                if !Self::is_candidate(pattern, path) {
                    continue;
                }
                match candidates.iter_mut().find(|(p, _)| *p == pattern.as_str()) {
                    Some(entry) => entry.1 = mapping.servlet_name.as_str(),
                    None => candidates.push((pattern.as_str(), mapping.servlet_name.as_str())),
                }
            }
        }

        let mut winner: Option<(&str, &str)> = None;
        for (pattern, servlet) in candidates {
            if winner.map_or(true, |(best, _)| pattern.len() > best.len()) {
                winner = Some((pattern, servlet));
            }
        }

        let Some((pattern, servlet_name)) = winner else {
            tracing::debug!(path = %path, "No servlet mapping matched");
            return Err(ServletError::NoHandlerAvailable {
                path: path.to_string(),
            });
        };

        let (servlet_path, path_info) = split_path(pattern, path);
        tracing::debug!(
            path = %path,
            servlet = %servlet_name,
            pattern = %pattern,
            servlet_path = %servlet_path,
            path_info = %path_info,
            "Resolved servlet mapping"
        );

        Ok(ResolvedMapping {
            servlet_name: servlet_name.to_string(),
            pattern: pattern.to_string(),
            servlet_path,
            path_info,
        })
    }

    fn is_candidate(pattern: &str, path: &str) -> bool {
        match PatternKind::of(pattern) {
            PatternKind::PathPrefix => matches_prefix(pattern, path),
            PatternKind::Extension => !path.is_empty() && matches_extension(pattern, path),
            PatternKind::Default => true,
            PatternKind::Exact => false,
        }
    }
}

/// Split `path` into (servlet path, path info) for the winning `pattern`.
fn split_path(pattern: &str, path: &str) -> (String, String) {
    let (servlet_path, rest) = match PatternKind::of(pattern) {
        PatternKind::Extension => {
            let suffix_len = pattern.len() - 1;
            (String::new(), &path[..path.len().saturating_sub(suffix_len)])
        }
        PatternKind::PathPrefix => {
            let servlet_path = &pattern[..pattern.len() - 2];
            (servlet_path.to_string(), &path[servlet_path.len().min(path.len())..])
        }
        PatternKind::Default | PatternKind::Exact => (String::new(), path),
    };

    let path_info = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    };
    (servlet_path, path_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::matches;

    fn router(entries: &[(&str, &[&str])]) -> Router {
        Router::new(
            entries
                .iter()
                .map(|(name, patterns)| ServletMapping {
                    servlet_name: name.to_string(),
                    url_patterns: patterns.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_longest_pattern_wins() {
        let r = router(&[("outer", &["/a/*"]), ("inner", &["/a/b/*"])]);
        let m = r.resolve("/a/b/c").unwrap();
        assert_eq!(m.servlet_name, "inner");
        assert_eq!(m.pattern, "/a/b/*");
        assert_eq!(m.servlet_path, "/a/b");
        assert_eq!(m.path_info, "/c");
    }

    #[test]
    fn test_extension_beats_shorter_prefix() {
        let r = router(&[("pages", &["*.jsp"]), ("x", &["/x/*"])]);
        let m = r.resolve("/x/y.jsp").unwrap();
        assert_eq!(m.servlet_name, "pages");
        assert_eq!(m.servlet_path, "");
        assert_eq!(m.path_info, "/x/y");
    }

    #[test]
    fn test_prefix_round_trip() {
        let r = router(&[("app", &["/app/*"])]);
        let m = r.resolve("/app/sub/page").unwrap();
        assert_eq!(m.servlet_path, "/app");
        assert_eq!(format!("{}{}", m.servlet_path, m.path_info), "/app/sub/page");

        let m = r.resolve("/app").unwrap();
        assert_eq!(m.servlet_path, "/app");
        assert_eq!(m.path_info, "/");
    }

    #[test]
    fn test_root_wildcard() {
        let r = router(&[("front", &["/*"])]);
        let m = r.resolve("/whatever/here").unwrap();
        assert_eq!(m.servlet_path, "");
        assert_eq!(m.path_info, "/whatever/here");
    }

    #[test]
    fn test_no_match() {
        let r = router(&[("app", &["/app/*", "/login"])]);
        assert!(matches!(
            r.resolve("/login"),
            Err(ServletError::NoHandlerAvailable { .. })
        ));
        assert!(matches!(
            r.resolve("/other"),
            Err(ServletError::NoHandlerAvailable { .. })
        ));
    }

    #[test]
    fn test_default_pattern_is_last_resort() {
        let r = router(&[("default", &["/"]), ("app", &["/app/*"])]);
        assert_eq!(r.resolve("/app/x").unwrap().servlet_name, "app");
        let m = r.resolve("/static/site.css").unwrap();
        assert_eq!(m.servlet_name, "default");
        assert_eq!(m.path_info, "/static/site.css");
    }

    #[test]
    fn test_duplicate_pattern_last_declaration_wins() {
        let r = router(&[("first", &["/dup/*"]), ("second", &["/dup/*"])]);
        assert_eq!(r.resolve("/dup/x").unwrap().servlet_name, "second");
    }

    #[test]
    fn test_equal_length_first_declared_wins() {
        let r = router(&[("ab", &["/ab/*"]), ("jsp", &["*.jsp"])]);
        // "/ab/*" and "*.jsp" are both 5 characters long.
        assert_eq!(r.resolve("/ab/page.jsp").unwrap().servlet_name, "ab");
    }

    #[test]
    fn test_winner_matches_under_matcher_rules() {
        let r = router(&[
            ("a", &["/a/*", "*.html"]),
            ("b", &["/a/b/*"]),
            ("c", &["*.do", "/c/*"]),
        ]);
        for path in ["/a", "/a/x.html", "/a/b/c.do", "/c/d", "/z/q.do", "/q/r.html"] {
            let m = r.resolve(path).unwrap();
            assert!(matches(&m.pattern, path, true), "{} should match {}", m.pattern, path);
        }
        assert!(r.resolve("/nothing").is_err());
    }
}
