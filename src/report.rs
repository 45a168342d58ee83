//! Issues, modes, and the failure-promotion rule.

use serde::Serialize;
use std::fmt;

/// Subject used for bundle-level issues.
pub const TOP: &str = "TOP";

/// The one top-level file whose absence relaxed mode does not fail on.
///
/// This exemption is narrow and deliberate: it applies to exactly this file
/// under the `TOP` subject in relaxed mode, and to nothing else. Strict mode
/// fails on it like any other missing file.
pub const RELAXED_EXEMPT_TOP_FILE: &str = "CMakeLists.txt";

pub const MISSING: &str = "missing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    Relaxed,
}

impl Mode {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Relaxed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        })
    }
}

/// A single finding: `(subject, field, message)`. Serialized as a
/// three-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "(String, String, String)")]
pub struct Issue {
    pub subject: String,
    pub field: String,
    pub message: String,
}

impl Issue {
    pub fn new(subject: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(subject: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(subject, field, MISSING)
    }

    pub fn is_warning(&self) -> bool {
        self.message.starts_with("warn")
    }

    /// Whether this issue fails the run under `mode`.
    pub fn is_hardfail(&self, mode: Mode) -> bool {
        match mode {
            Mode::Strict => self.message.contains(MISSING) || self.message.contains("expect"),
            Mode::Relaxed => {
                self.message.contains(MISSING)
                    && !(self.subject == TOP && self.field == RELAXED_EXEMPT_TOP_FILE)
            }
        }
    }
}

impl From<Issue> for (String, String, String) {
    fn from(i: Issue) -> Self {
        (i.subject, i.field, i.message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.subject, self.field, self.message)
    }
}

/// Structural verdict for one pass over a bundle.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub mode: Mode,
    pub status: Status,
    pub issues: Vec<Issue>,
    pub hardfails: Vec<Issue>,
}

impl Verdict {
    /// Applies the promotion rule for `mode` to `issues`, keeping order.
    pub fn from_issues(mode: Mode, issues: Vec<Issue>) -> Self {
        let hardfails: Vec<Issue> = issues
            .iter()
            .filter(|i| i.is_hardfail(mode))
            .cloned()
            .collect();
        Self {
            mode,
            status: Status::from_ok(hardfails.is_empty()),
            issues,
            hardfails,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_promotes_missing_and_expect() {
        assert!(Issue::missing("A", "dir").is_hardfail(Mode::Strict));
        assert!(Issue::new("A", "weights", "expect 1 .bin, found 0").is_hardfail(Mode::Strict));
        assert!(!Issue::new("A", "weights", "warn: no .bin present").is_hardfail(Mode::Strict));
    }

    #[test]
    fn test_relaxed_ignores_expect_and_warn() {
        assert!(!Issue::new("A", "weights", "expect 1 .bin, found 2").is_hardfail(Mode::Relaxed));
        assert!(!Issue::new("A", "weights", "warn: no .bin present (relaxed mode)")
            .is_hardfail(Mode::Relaxed));
        assert!(Issue::missing("A", "policy.seal").is_hardfail(Mode::Relaxed));
    }

    #[test]
    fn test_relaxed_exempts_only_top_cmakelists() {
        assert!(!Issue::missing(TOP, "CMakeLists.txt").is_hardfail(Mode::Relaxed));
        assert!(Issue::missing(TOP, "CMakeLists.txt").is_hardfail(Mode::Strict));
        assert!(Issue::missing(TOP, "README.md").is_hardfail(Mode::Relaxed));
        // Same field under an agent subject is not exempt.
        assert!(Issue::missing("DroneAgent", "CMakeLists.txt").is_hardfail(Mode::Relaxed));
    }

    #[test]
    fn test_warning_is_not_missing() {
        assert!(Issue::new("A", "weights", "warn: no .bin present (relaxed mode)").is_warning());
        assert!(!Issue::missing("A", "weights").is_warning());
        assert!(!Issue::new("A", "weights", "expect 1 .bin, found 2").is_warning());
    }

    #[test]
    fn test_verdict_status_follows_hardfails() {
        let v = Verdict::from_issues(
            Mode::Relaxed,
            vec![
                Issue::new("A", "weights", "warn: no .bin present (relaxed mode)"),
                Issue::missing(TOP, "CMakeLists.txt"),
            ],
        );
        assert_eq!(v.status, Status::Pass);
        assert_eq!(v.issues.len(), 2);
        assert!(v.hardfails.is_empty());

        let v = Verdict::from_issues(Mode::Strict, v.issues);
        assert_eq!(v.status, Status::Fail);
        assert_eq!(v.hardfails, vec![Issue::missing(TOP, "CMakeLists.txt")]);
    }

    #[test]
    fn test_serializes_as_triples() {
        let v = Verdict::from_issues(Mode::Strict, vec![Issue::missing("A", "dir")]);
        let j = serde_json::to_value(&v).unwrap();
        assert_eq!(j["mode"], "strict");
        assert_eq!(j["status"], "FAIL");
        assert_eq!(j["issues"][0], serde_json::json!(["A", "dir", "missing"]));
        assert_eq!(j["hardfails"][0], serde_json::json!(["A", "dir", "missing"]));
    }
}
