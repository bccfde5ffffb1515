//! Deployment identity and PRN parsing
//!
//! An identity is the hierarchical path `client → portfolio → app → branch →
//! build → component`. Its string form is a PRN:
//! `prn:<portfolio>:<app>:<branch>:<build>:<component>`, with the client
//! carried separately. `prn` on its own addresses the client scope.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::IdentityError;

/// Root token every PRN starts with
pub const PRN_ROOT: &str = "prn";

const SLUG: &str = "[a-z0-9][a-z0-9-]*";
const BUILD: &str = "[a-zA-Z0-9][a-zA-Z0-9._-]*";

static SLUG_RE: OnceLock<Option<Regex>> = OnceLock::new();
static BUILD_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Depth of an identity in the deployment hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Client,
    Portfolio,
    App,
    Branch,
    Build,
    Component,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Client,
        Scope::Portfolio,
        Scope::App,
        Scope::Branch,
        Scope::Build,
        Scope::Component,
    ];

    /// Lower-case name used in messages and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Portfolio => "portfolio",
            Self::App => "app",
            Self::Branch => "branch",
            Self::Build => "build",
            Self::Component => "component",
        }
    }

    /// Number of hierarchy parts after the `prn` root
    pub fn depth(&self) -> usize {
        *self as usize
    }

    /// Scope for a PRN with `depth` parts after the root
    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable deployment identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    client: String,
    portfolio: Option<String>,
    app: Option<String>,
    branch: Option<String>,
    build: Option<String>,
    component: Option<String>,
}

impl Identity {
    /// Build an identity from its fields.
    ///
    /// Empty strings count as absent. Once a field is present every field
    /// above it must be present too.
    pub fn new(
        client: &str,
        portfolio: Option<&str>,
        app: Option<&str>,
        branch: Option<&str>,
        build: Option<&str>,
        component: Option<&str>,
    ) -> Result<Self, IdentityError> {
        let client = client.trim();
        if client.is_empty() {
            return Err(IdentityError::MissingClient);
        }
        check_component("client", client, &SLUG_RE, SLUG)?;

        let fields = [
            ("portfolio", non_empty(portfolio)),
            ("app", non_empty(app)),
            ("branch", non_empty(branch)),
            ("build", non_empty(build)),
            ("component", non_empty(component)),
        ];

        let mut missing: Option<&'static str> = None;
        for &(name, value) in fields.iter() {
            match (value, missing) {
                (Some(_), Some(gap)) => {
                    return Err(IdentityError::Sparse {
                        field: name,
                        missing: gap,
                    })
                }
                (None, None) => missing = Some(name),
                _ => {}
            }
        }

        let [portfolio, app, branch, build, component] = fields.map(|(_, v)| v);

        if let Some(p) = portfolio {
            check_component("portfolio", p, &SLUG_RE, SLUG)?;
        }
        if let Some(a) = app {
            check_component("app", a, &SLUG_RE, SLUG)?;
        }
        if let Some(b) = branch {
            if b.contains(':') {
                return Err(IdentityError::InvalidComponent {
                    field: "branch",
                    value: b.to_string(),
                });
            }
        }
        if let Some(b) = build {
            check_component("build", b, &BUILD_RE, BUILD)?;
        }
        if let Some(c) = component {
            check_component("component", c, &SLUG_RE, SLUG)?;
        }

        Ok(Self {
            client: client.to_string(),
            portfolio: portfolio.map(str::to_string),
            app: app.map(str::to_string),
            branch: branch.map(str::to_string),
            build: build.map(str::to_string),
            component: component.map(str::to_string),
        })
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn portfolio(&self) -> Option<&str> {
        self.portfolio.as_deref()
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    /// Raw branch name as given (e.g. `feature1/dev-sin`)
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Branch name made safe for keys and resource names
    ///
    /// Example: `feature1/Dev_sin` → `feature1-dev-sin`
    pub fn branch_short_name(&self) -> Option<String> {
        self.branch.as_deref().map(short_name)
    }

    /// Deepest populated level
    pub fn scope(&self) -> Scope {
        if self.component.is_some() {
            Scope::Component
        } else if self.build.is_some() {
            Scope::Build
        } else if self.branch.is_some() {
            Scope::Branch
        } else if self.app.is_some() {
            Scope::App
        } else if self.portfolio.is_some() {
            Scope::Portfolio
        } else {
            Scope::Client
        }
    }

    /// PRN form, using the branch short name
    ///
    /// Example: `prn:core:api:main:42`
    pub fn prn(&self) -> String {
        let mut parts = vec![PRN_ROOT.to_string()];
        parts.extend(self.portfolio.clone());
        parts.extend(self.app.clone());
        parts.extend(self.branch_short_name());
        parts.extend(self.build.clone());
        parts.extend(self.component.clone());
        parts.join(":")
    }

    /// `client:portfolio` partition key of the app registry
    pub fn client_portfolio_key(&self) -> Option<String> {
        self.portfolio
            .as_deref()
            .map(|p| format!("{}:{}", self.client, p))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prn())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whole-value regex for a component pattern, compiled on first use
fn component_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(&format!("^{}$", pattern)).ok())
        .as_ref()
}

fn check_component(
    field: &'static str,
    value: &str,
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Result<(), IdentityError> {
    let valid = component_regex(cell, pattern).map_or(false, |re| re.is_match(value));
    if valid {
        Ok(())
    } else {
        Err(IdentityError::InvalidComponent {
            field,
            value: value.to_string(),
        })
    }
}

/// Lower-case a branch and replace anything outside `[a-z0-9-]` with `-`
pub fn short_name(branch: &str) -> String {
    branch
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Structural check applied to a PRN of a given scope
pub trait ScopeValidator: Send + Sync {
    fn validate(&self, prn: &str) -> bool;
}

/// Regex-backed validator (the default for every scope)
pub struct PatternValidator(pub Regex);

impl ScopeValidator for PatternValidator {
    fn validate(&self, prn: &str) -> bool {
        self.0.is_match(prn)
    }
}

impl<F> ScopeValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, prn: &str) -> bool {
        self(prn)
    }
}

/// Parses PRNs into identities with per-scope validation
pub struct IdentityParser {
    validators: BTreeMap<Scope, Box<dyn ScopeValidator>>,
}

impl IdentityParser {
    /// Parser with the default regex validators
    pub fn new() -> Self {
        let mut validators: BTreeMap<Scope, Box<dyn ScopeValidator>> = BTreeMap::new();
        for scope in &Scope::ALL[1..] {
            if let Ok(pattern) = default_pattern(*scope) {
                validators.insert(*scope, Box::new(PatternValidator(pattern)));
            }
        }
        Self { validators }
    }

    /// Builder: replace the validator for a scope
    pub fn with_validator(mut self, scope: Scope, validator: impl ScopeValidator + 'static) -> Self {
        self.validators.insert(scope, Box::new(validator));
        self
    }

    /// Parse a PRN, detecting its scope from the number of parts
    pub fn parse(&self, client: &str, prn: &str) -> Result<(Identity, Scope), IdentityError> {
        let parts = split_prn(prn)?;
        let scope = Scope::from_depth(parts.len() - 1).ok_or(IdentityError::UnsupportedScope {
            parts: parts.len() - 1,
        })?;
        self.build_identity(client, prn, &parts, scope)
    }

    /// Parse a PRN that must be of the given scope
    pub fn parse_scoped(
        &self,
        client: &str,
        prn: &str,
        scope: Scope,
    ) -> Result<Identity, IdentityError> {
        let parts = split_prn(prn)?;
        if parts.len() - 1 != scope.depth() {
            return Err(IdentityError::WrongPartCount {
                scope: scope.name(),
                expected: scope.depth(),
                found: parts.len() - 1,
            });
        }
        self.build_identity(client, prn, &parts, scope)
            .map(|(identity, _)| identity)
    }

    fn build_identity(
        &self,
        client: &str,
        prn: &str,
        parts: &[&str],
        scope: Scope,
    ) -> Result<(Identity, Scope), IdentityError> {
        if let Some(validator) = self.validators.get(&scope) {
            if !validator.validate(prn.trim()) {
                return Err(IdentityError::FailedValidation { scope: scope.name() });
            }
        }

        let part = |i: usize| parts.get(i).copied();
        let identity = Identity::new(client, part(1), part(2), part(3), part(4), part(5))?;
        Ok((identity, scope))
    }
}

impl Default for IdentityParser {
    fn default() -> Self {
        Self::new()
    }
}

fn split_prn(prn: &str) -> Result<Vec<&str>, IdentityError> {
    let prn = prn.trim();
    if prn.is_empty() {
        return Err(IdentityError::Empty);
    }
    let parts: Vec<&str> = prn.split(':').collect();
    if parts[0] != PRN_ROOT {
        return Err(IdentityError::InvalidPrefix {
            prefix: parts[0].to_string(),
        });
    }
    Ok(parts)
}

fn default_pattern(scope: Scope) -> Result<Regex, regex::Error> {
    let mut pattern = format!("^{}", PRN_ROOT);
    for depth in 1..=scope.depth() {
        let segment = if depth == Scope::Build.depth() { BUILD } else { SLUG };
        pattern.push(':');
        pattern.push_str(segment);
    }
    pattern.push('$');
    Regex::new(&pattern)
}
