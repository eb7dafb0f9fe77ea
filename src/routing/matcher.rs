//! URL pattern matching.
//!
//! # Responsibilities
//! - Classify a URL pattern as exact, path-prefix, extension or default
//! - Decide whether a request path matches a pattern
//!
//! # Design Decisions
//! - Classification is structural, never declared in configuration
//! - Matching is a pure function with no allocation on the case-sensitive path
//! - The default pattern (`/`) never matches here; only the router treats it
//!   as a fallback

/// Structural class of a URL pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Matches one path exactly (e.g. `/login`).
    Exact,
    /// `/prefix/*` or the bare `/*`.
    PathPrefix,
    /// `*.ext`.
    Extension,
    /// The bare `/`.
    Default,
}

impl PatternKind {
    /// Classify a pattern string.
    pub fn of(pattern: &str) -> Self {
        if pattern == "/" {
            PatternKind::Default
        } else if pattern.ends_with("/*") {
            PatternKind::PathPrefix
        } else if pattern.starts_with("*.") {
            PatternKind::Extension
        } else {
            PatternKind::Exact
        }
    }
}

/// Whether a pattern is well formed: `/`-rooted paths with at most a trailing
/// `/*`, or `*.ext` with a non-empty extension.
pub fn is_valid_pattern(pattern: &str) -> bool {
    match PatternKind::of(pattern) {
        PatternKind::Default => true,
        PatternKind::PathPrefix => !pattern[..pattern.len() - 1].contains('*') && pattern.starts_with('/'),
        PatternKind::Extension => {
            let ext = &pattern[2..];
            !ext.is_empty() && !ext.contains(['*', '/', '.'])
        }
        PatternKind::Exact => pattern.starts_with('/') && !pattern.contains('*'),
    }
}

/// Decide whether `path` matches `pattern`.
///
/// Precedence: exact, path-prefix, extension. Anything else (including the
/// default pattern) does not match.
pub fn matches(pattern: &str, path: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        matches_exact(pattern, path) || matches_prefix(pattern, path) || matches_extension(pattern, path)
    } else {
        let pattern = pattern.to_lowercase();
        let path = path.to_lowercase();
        matches_exact(&pattern, &path)
            || matches_prefix(&pattern, &path)
            || matches_extension(&pattern, &path)
    }
}

pub(crate) fn matches_exact(pattern: &str, path: &str) -> bool {
    pattern == path
}

/// `/prefix/*` matches `/prefix` itself and anything below `/prefix/`.
pub(crate) fn matches_prefix(pattern: &str, path: &str) -> bool {
    if pattern == "/*" {
        return true;
    }
    let Some(base) = pattern.strip_suffix("/*") else {
        return false;
    };
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// `*.ext` matches when the last segment of `path` ends in `.ext`.
pub(crate) fn matches_extension(pattern: &str, path: &str) -> bool {
    let Some(ext) = pattern.strip_prefix("*.") else {
        return false;
    };
    let (Some(slash), Some(period)) = (path.rfind('/'), path.rfind('.')) else {
        return false;
    };
    if period < slash || period == path.len() - 1 {
        return false;
    }
    &path[period + 1..] == ext
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(PatternKind::of("/"), PatternKind::Default);
        assert_eq!(PatternKind::of("/*"), PatternKind::PathPrefix);
        assert_eq!(PatternKind::of("/app/*"), PatternKind::PathPrefix);
        assert_eq!(PatternKind::of("*.jsp"), PatternKind::Extension);
        assert_eq!(PatternKind::of("/login"), PatternKind::Exact);
    }

    #[test]
    fn test_validity() {
        assert!(is_valid_pattern("/app/*"));
        assert!(is_valid_pattern("*.do"));
        assert!(is_valid_pattern("/exact/path"));
        assert!(!is_valid_pattern("*."));
        assert!(!is_valid_pattern("/a*/b"));
        assert!(!is_valid_pattern("app/*"));
        assert!(!is_valid_pattern("*.tar.gz"));
    }

    #[test]
    fn test_exact_match() {
        assert!(matches("/login", "/login", true));
        assert!(!matches("/login", "/login/x", true));
        assert!(!matches("/Login", "/login", true));
        assert!(matches("/Login", "/login", false));
    }

    #[test]
    fn test_prefix_match() {
        assert!(matches("/*", "/anything/at/all", true));
        assert!(matches("/*", "", true));
        assert!(matches("/app/*", "/app", true));
        assert!(matches("/app/*", "/app/", true));
        assert!(matches("/app/*", "/app/sub/page", true));
        assert!(!matches("/app/*", "/application", true));
        assert!(!matches("/app/*", "/ap", true));
    }

    #[test]
    fn test_extension_match() {
        assert!(matches("*.jsp", "/x/y.jsp", true));
        assert!(!matches("*.jsp", "/x/y.jspx", true));
        assert!(!matches("*.jsp", "/x.jsp/y", true));
        assert!(!matches("*.jsp", "/x/y.", true));
        assert!(!matches("*.jsp", "y.jsp", true));
        assert!(matches("*.JSP", "/x/y.jsp", false));
    }

    #[test]
    fn test_default_pattern_never_matches() {
        assert!(!matches("/", "/x", true));
        assert!(matches("/", "/", true));
    }
}
