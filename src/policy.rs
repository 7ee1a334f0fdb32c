//! Path-prefix placeholder policy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::patterns::slash_path;

/// What a matching rule asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Placeholders are created even under `--zen`
    Enforce,
    /// Empty directories left without a placeholder are logged
    Warn,
    /// No effect on decisions
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub prefix: String,
    pub action: PolicyAction,
}

/// Rule table evaluated with OR semantics: a path is enforced as soon as any
/// `Enforce` rule's prefix is a literal prefix of it, whatever else matches.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, PolicyAction)>,
        S: Into<String>,
    {
        Policy {
            rules: rules
                .into_iter()
                .map(|(prefix, action)| PolicyRule {
                    prefix: prefix.into(),
                    action,
                })
                .collect(),
        }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn should_enforce(&self, path: &str) -> bool {
        self.any_match(path, PolicyAction::Enforce)
    }

    pub fn warns(&self, path: &str) -> bool {
        self.any_match(path, PolicyAction::Warn)
    }

    fn any_match(&self, path: &str, action: PolicyAction) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.action == action && path.starts_with(&rule.prefix))
    }

    /// Key a root-relative directory is evaluated under: `/`-joined with a trailing `/`,
    /// so the rule `assets/` covers `assets` itself as well as everything below it
    pub fn directory_key(relative: &Path) -> String {
        let mut key = slash_path(relative);
        key.push('/');
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce_wins_over_more_specific_ignore() {
        let policy = Policy::new([
            ("a/", PolicyAction::Enforce),
            ("a/b/", PolicyAction::Ignore),
        ]);
        assert!(policy.should_enforce("a/b/c"));
    }

    #[test]
    fn test_ignore_alone_does_not_enforce() {
        let policy = Policy::new([("a/b/", PolicyAction::Ignore)]);
        assert!(!policy.should_enforce("a/b/c"));
    }

    #[test]
    fn test_prefix_is_literal() {
        let policy = Policy::new([("assets/", PolicyAction::Enforce)]);
        assert!(policy.should_enforce("assets/icons/"));
        assert!(!policy.should_enforce("src/assets/icons/"));
        assert!(!policy.should_enforce("asset/"));
    }

    #[test]
    fn test_warn_rules_are_separate_from_enforcement() {
        let policy = Policy::new([("logs/", PolicyAction::Warn)]);
        assert!(policy.warns("logs/archive/"));
        assert!(!policy.should_enforce("logs/archive/"));
    }

    #[test]
    fn test_empty_policy_enforces_nothing() {
        let policy = Policy::default();
        assert!(!policy.should_enforce(""));
        assert!(!policy.warns("anything/"));
    }

    #[test]
    fn test_directory_key_has_trailing_slash() {
        assert_eq!(Policy::directory_key(Path::new("assets")), "assets/");
        assert_eq!(Policy::directory_key(Path::new("a/b/c")), "a/b/c/");
    }
}
