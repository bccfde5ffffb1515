//! Environment and region derivation from branch names
//!
//! Branch naming convention: `[<prefix>/]<environment>-<region-alias>[-...]`.
//! A branch without `-` names only the environment.

/// Branches that deploy to the default (production) environment
const PRODUCTION_BRANCHES: [&str; 2] = ["master", "main"];

/// Result of a branch derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedEnvironment {
    pub environment: String,
    pub region_alias: String,
}

/// Fallback deriver used when app facts omit Environment or Region
#[derive(Debug, Clone)]
pub struct EnvironmentDeriver {
    default_environment: String,
    default_region_alias: String,
}

impl EnvironmentDeriver {
    pub fn new(default_environment: impl Into<String>, default_region_alias: impl Into<String>) -> Self {
        Self {
            default_environment: default_environment.into(),
            default_region_alias: default_region_alias.into(),
        }
    }

    pub fn default_environment(&self) -> &str {
        &self.default_environment
    }

    pub fn default_region_alias(&self) -> &str {
        &self.default_region_alias
    }

    /// Derive `(environment, region alias)` from a raw branch name
    ///
    /// - `dev-sin` → `(dev, sin)`
    /// - `feature1/dev-sin` → `(dev, sin)`
    /// - `master` / `main` → `(<default env>, <default region>)`
    pub fn derive(&self, branch: &str) -> DerivedEnvironment {
        let parts: Vec<&str> = branch.trim().split('-').collect();

        let (environment, region_alias) = if parts.len() >= 2 {
            let env = parts[0].rsplit('/').next().unwrap_or(parts[0]);
            (env, parts[1])
        } else {
            (parts[0], "")
        };

        let environment = if environment.is_empty() || PRODUCTION_BRANCHES.contains(&environment) {
            self.default_environment.clone()
        } else {
            environment.to_string()
        };

        let region_alias = if region_alias.is_empty() {
            self.default_region_alias.clone()
        } else {
            region_alias.to_string()
        };

        DerivedEnvironment {
            environment,
            region_alias,
        }
    }
}

impl Default for EnvironmentDeriver {
    fn default() -> Self {
        Self::new("prod", "sin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived(env: &str, region: &str) -> DerivedEnvironment {
        DerivedEnvironment {
            environment: env.to_string(),
            region_alias: region.to_string(),
        }
    }

    #[test]
    fn test_env_and_region_from_branch() {
        let deriver = EnvironmentDeriver::default();
        assert_eq!(deriver.derive("dev-sin"), derived("dev", "sin"));
        assert_eq!(deriver.derive("uat-use1"), derived("uat", "use1"));
    }

    #[test]
    fn test_prefix_segments_dropped() {
        let deriver = EnvironmentDeriver::default();
        assert_eq!(deriver.derive("feature1/dev-sin"), derived("dev", "sin"));
        assert_eq!(deriver.derive("team/feature1/qa-use1-extra"), derived("qa", "use1"));
    }

    #[test]
    fn test_production_branches_use_defaults() {
        let deriver = EnvironmentDeriver::default();
        assert_eq!(deriver.derive("master"), derived("prod", "sin"));
        assert_eq!(deriver.derive("main"), deriver.derive("master"));
    }

    #[test]
    fn test_single_token_keeps_env_with_default_region() {
        let deriver = EnvironmentDeriver::new("production", "use1");
        assert_eq!(deriver.derive("staging"), derived("staging", "use1"));
        assert_eq!(deriver.derive("main"), derived("production", "use1"));
    }

    #[test]
    fn test_empty_tokens_fall_back() {
        let deriver = EnvironmentDeriver::default();
        assert_eq!(deriver.derive("dev-"), derived("dev", "sin"));
        assert_eq!(deriver.derive("-sin"), derived("prod", "sin"));
        assert_eq!(deriver.derive(""), derived("prod", "sin"));
    }
}
