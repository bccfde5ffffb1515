//! Layered resource tags
//!
//! Layers are applied lowest priority first; on a key collision the later
//! layer wins. No layer is modified.

use super::records::{ContactFacts, Tags};

pub const TAG_ENVIRONMENT: &str = "Environment";
pub const TAG_REGION: &str = "Region";
pub const TAG_OWNER: &str = "Owner";
pub const TAG_CONTACTS: &str = "Contacts";

/// Tag maps contributing to a resolution, by source
#[derive(Debug, Clone, Default)]
pub struct TagLayers<'a> {
    pub client: Option<&'a Tags>,
    pub zone: Option<&'a Tags>,
    pub region: Option<&'a Tags>,
    pub portfolio: Option<&'a Tags>,
    pub app: Option<&'a Tags>,
    pub computed: Option<&'a Tags>,
}

impl<'a> TagLayers<'a> {
    /// Layers in precedence order: Client, Zone, Region, Portfolio, App, Computed
    pub fn ordered(&self) -> [Option<&'a Tags>; 6] {
        [
            self.client,
            self.zone,
            self.region,
            self.portfolio,
            self.app,
            self.computed,
        ]
    }

    pub fn resolve(&self) -> Tags {
        resolve_tags(self.ordered().into_iter().flatten())
    }
}

/// Fold tag maps in order into a new map; last layer wins
pub fn resolve_tags<'a>(layers: impl IntoIterator<Item = &'a Tags>) -> Tags {
    let mut resolved = Tags::new();
    for layer in layers {
        for (key, value) in layer {
            resolved.insert(key.clone(), value.clone());
        }
    }
    resolved
}

/// Deployment tags computed from the resolution itself
pub fn computed_tags(
    environment: &str,
    region_alias: &str,
    owner: Option<&ContactFacts>,
    contacts: &[ContactFacts],
) -> Tags {
    let owner = owner.map(ContactFacts::display).unwrap_or_default();
    let contacts = contacts
        .iter()
        .map(ContactFacts::display)
        .collect::<Vec<_>>()
        .join(",");

    let mut tags = Tags::new();
    tags.insert(TAG_ENVIRONMENT.to_string(), environment.to_string());
    tags.insert(TAG_REGION.to_string(), region_alias.to_string());
    tags.insert(TAG_OWNER.to_string(), owner);
    tags.insert(TAG_CONTACTS.to_string(), contacts);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_app_beats_client() {
        let client = tags(&[("Env", "x"), ("CostCentre", "cc1")]);
        let app = tags(&[("Env", "y")]);
        let layers = TagLayers {
            client: Some(&client),
            app: Some(&app),
            ..Default::default()
        };

        let resolved = layers.resolve();
        assert_eq!(resolved["Env"], "y");
        assert_eq!(resolved["CostCentre"], "cc1");
    }

    #[test]
    fn test_full_precedence_order() {
        let client = tags(&[("K", "client")]);
        let zone = tags(&[("K", "zone")]);
        let region = tags(&[("K", "region")]);
        let portfolio = tags(&[("K", "portfolio")]);
        let app = tags(&[("K", "app")]);
        let computed = tags(&[("K", "computed")]);

        let mut layers = TagLayers {
            client: Some(&client),
            zone: Some(&zone),
            region: Some(&region),
            portfolio: Some(&portfolio),
            app: Some(&app),
            computed: Some(&computed),
        };
        assert_eq!(layers.resolve()["K"], "computed");

        layers.computed = None;
        assert_eq!(layers.resolve()["K"], "app");
        layers.app = None;
        assert_eq!(layers.resolve()["K"], "portfolio");
        layers.portfolio = None;
        assert_eq!(layers.resolve()["K"], "region");
        layers.region = None;
        assert_eq!(layers.resolve()["K"], "zone");
        layers.zone = None;
        assert_eq!(layers.resolve()["K"], "client");
    }

    #[test]
    fn test_layers_not_mutated() {
        let client = tags(&[("Env", "x")]);
        let app = tags(&[("Env", "y"), ("Team", "t")]);
        let resolved = resolve_tags([&client, &app]);

        assert_eq!(client, tags(&[("Env", "x")]));
        assert_eq!(app, tags(&[("Env", "y"), ("Team", "t")]));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_computed_tags() {
        let owner = ContactFacts {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        let contacts = vec![
            ContactFacts {
                name: Some("B".into()),
                ..Default::default()
            },
            ContactFacts::default(),
            ContactFacts {
                email: Some("c@x.com".into()),
                ..Default::default()
            },
        ];

        let computed = computed_tags("dev", "sin", Some(&owner), &contacts);
        assert_eq!(computed[TAG_ENVIRONMENT], "dev");
        assert_eq!(computed[TAG_REGION], "sin");
        assert_eq!(computed[TAG_OWNER], "A <a@x.com>");
        // Empty contacts keep their slot
        assert_eq!(computed[TAG_CONTACTS], "B,,c@x.com");

        let anonymous = computed_tags("dev", "sin", None, &[]);
        assert_eq!(anonymous[TAG_OWNER], "");
        assert_eq!(anonymous[TAG_CONTACTS], "");
    }
}
