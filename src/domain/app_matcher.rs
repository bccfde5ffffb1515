//! App pattern matching
//!
//! Each app registration carries an `AppRegex`. The candidate string for an
//! identity is `prn:<portfolio>:<app>:<branch-short|*>:<build|*>` and the
//! first registration (in stored order) whose pattern matches at the start
//! of it owns the deployment.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::identity::{Identity, PRN_ROOT};
use super::records::AppFacts;

const WILDCARD: &str = "*";

/// A registration skipped while matching (bad pattern or malformed record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternWarning {
    pub app_regex: String,
    pub message: String,
}

/// Outcome of a match run
#[derive(Debug, Clone)]
pub struct MatchOutcome<'a> {
    /// Position and record of the first match
    pub matched: Option<(usize, &'a AppFacts)>,
    /// Patterns skipped along the way
    pub warnings: Vec<PatternWarning>,
}

/// Candidate string an identity is matched with
pub fn candidate_string(identity: &Identity) -> String {
    let branch = identity
        .branch_short_name()
        .unwrap_or_else(|| WILDCARD.to_string());
    format!(
        "{}:{}:{}:{}:{}",
        PRN_ROOT,
        identity.portfolio().unwrap_or(""),
        identity.app().unwrap_or(""),
        branch,
        identity.build().unwrap_or(WILDCARD)
    )
}

/// First-match-wins selector over an ordered list of app registrations
#[derive(Debug, Clone, Default)]
pub struct AppMatcher;

impl AppMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Select the first registration whose pattern matches `candidate`
    ///
    /// Patterns that fail to compile are skipped and reported as warnings.
    pub fn match_app<'a>(&self, apps: &'a [AppFacts], candidate: &str) -> MatchOutcome<'a> {
        let mut warnings = Vec::new();

        for (index, app) in apps.iter().enumerate() {
            match self.matches(app, candidate) {
                Ok(true) => {
                    return MatchOutcome {
                        matched: Some((index, app)),
                        warnings,
                    }
                }
                Ok(false) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        MatchOutcome {
            matched: None,
            warnings,
        }
    }

    /// Test a single registration against `candidate`
    pub fn matches(&self, app: &AppFacts, candidate: &str) -> Result<bool, PatternWarning> {
        match compile_anchored(&app.app_regex) {
            Ok(pattern) => Ok(pattern.is_match(candidate)),
            Err(e) => {
                warn!(app_regex = %app.app_regex, error = %e, "Skipping invalid app pattern");
                Err(PatternWarning {
                    app_regex: app.app_regex.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

fn compile_anchored(app_regex: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", app_regex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(regex: &str, zone: &str) -> AppFacts {
        AppFacts {
            client_portfolio: "acme:core".to_string(),
            app_regex: regex.to_string(),
            zone: Some(zone.to_string()),
            ..Default::default()
        }
    }

    fn identity(branch: Option<&str>, build: Option<&str>) -> Identity {
        Identity::new("acme", Some("core"), Some("api"), branch, build, None).unwrap()
    }

    #[test]
    fn test_candidate_string() {
        assert_eq!(
            candidate_string(&identity(Some("Feature/X"), Some("42"))),
            "prn:core:api:feature-x:42"
        );
        assert_eq!(candidate_string(&identity(None, None)), "prn:core:api:*:*");
    }

    #[test]
    fn test_first_match_wins_and_flips_on_reorder() {
        let broad = app("prn:core:.*", "z-broad");
        let narrow = app("prn:core:api:.*", "z-narrow");
        let candidate = "prn:core:api:main:42";
        let matcher = AppMatcher::new();

        let apps = vec![broad.clone(), narrow.clone()];
        let outcome = matcher.match_app(&apps, candidate);
        assert_eq!(outcome.matched.map(|(_, a)| a.zone.as_deref()), Some(Some("z-broad")));

        let apps = vec![narrow, broad];
        let outcome = matcher.match_app(&apps, candidate);
        assert_eq!(outcome.matched.map(|(i, _)| i), Some(0));
        assert_eq!(outcome.matched.map(|(_, a)| a.zone.as_deref()), Some(Some("z-narrow")));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let apps = vec![app("prn:core:(api", "z-bad"), app("prn:core:api.*", "z-good")];
        let outcome = AppMatcher::new().match_app(&apps, "prn:core:api:main:42");

        assert_eq!(outcome.matched.map(|(i, _)| i), Some(1));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].app_regex, "prn:core:(api");
    }

    #[test]
    fn test_patterns_anchored_at_start() {
        let apps = vec![app("core:api.*", "z1")];
        let outcome = AppMatcher::new().match_app(&apps, "prn:core:api:main:42");
        assert!(outcome.matched.is_none());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_single_registration() {
        let matcher = AppMatcher::new();
        assert_eq!(matcher.matches(&app("prn:core:api.*", "z1"), "prn:core:api:*:*"), Ok(true));
        assert_eq!(matcher.matches(&app("prn:core:web.*", "z1"), "prn:core:api:*:*"), Ok(false));

        let warning = matcher.matches(&app("(", "z1"), "prn:core:api:*:*").unwrap_err();
        assert_eq!(warning.app_regex, "(");
    }

    #[test]
    fn test_no_match_keeps_warnings() {
        let apps = vec![app("[", "z1"), app("prn:other:.*", "z2")];
        let outcome = AppMatcher::new().match_app(&apps, "prn:core:api:*:*");
        assert!(outcome.matched.is_none());
        assert_eq!(outcome.warnings.len(), 1);
    }
}
