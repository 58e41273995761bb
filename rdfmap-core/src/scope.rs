//! Scope identifiers for indexed terms.
//!
//! A scope is the tenant boundary of the term index: each project indexes
//! into its own scope, and one distinguished scope holds the shared
//! predefined baseline. Project identifiers are non-empty decimal-digit
//! strings, so the global sentinel (which contains letters) can never
//! collide with a real project.

/// Scope under which the shared predefined vocabularies are indexed.
///
/// Syntactically distinct from every project scope: project identifiers
/// are decimal-digit strings and this value is not.
pub const GLOBAL_SCOPE: &str = "global";

/// True when `scope` is a well-formed project identifier.
///
/// Project scopes are non-empty ASCII decimal-digit strings. The global
/// sentinel and the empty string are not project scopes.
pub fn is_project_scope(scope: &str) -> bool {
    !scope.is_empty() && scope.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_scopes_are_decimal_strings() {
        assert!(is_project_scope("1"));
        assert!(is_project_scope("0042"));
        assert!(is_project_scope("1734882793921"));
    }

    #[test]
    fn global_sentinel_is_not_a_project_scope() {
        assert!(!is_project_scope(GLOBAL_SCOPE));
    }

    #[test]
    fn empty_and_mixed_scopes_rejected() {
        assert!(!is_project_scope(""));
        assert!(!is_project_scope("12a"));
        assert!(!is_project_scope("project-7"));
    }
}
