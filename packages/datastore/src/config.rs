//! Client configuration: which project and namespace to talk to.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Environment variables consulted for the project, in order.
pub const PROJECT_ENV_VARS: [&str; 2] = ["DATASTORE_PROJECT_ID", "GOOGLE_CLOUD_PROJECT"];

/// Environment variable consulted for the default namespace.
pub const NAMESPACE_ENV_VAR: &str = "DATASTORE_NAMESPACE";

/// Project and default namespace for a store client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreConfig {
    pub project: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl DatastoreConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into()).filter(|ns| !ns.is_empty());
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse a JSON document such as `{"project": "demo", "namespace": "test"}`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config {
            message: format!("Failed to parse configuration: {}", e),
        })?;
        config.validate()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let project = PROJECT_ENV_VARS
            .iter()
            .find_map(|name| lookup(*name).filter(|value| !value.is_empty()))
            .ok_or_else(|| Error::Config {
                message: format!("set one of {} to choose a project", PROJECT_ENV_VARS.join(", ")),
            })?;
        let namespace = lookup(NAMESPACE_ENV_VAR).filter(|ns| !ns.is_empty());
        log::debug!(
            "Configured project {} namespace {:?} from environment",
            project,
            namespace
        );
        Ok(Self { project, namespace })
    }

    fn validate(mut self) -> Result<Self, Error> {
        if self.project.is_empty() {
            return Err(Error::Config {
                message: "project must not be empty".to_string(),
            });
        }
        self.namespace = self.namespace.filter(|ns| !ns.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn project_from_first_variable() {
        let config = DatastoreConfig::from_lookup(lookup_from(&[
            ("DATASTORE_PROJECT_ID", "primary"),
            ("GOOGLE_CLOUD_PROJECT", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.project, "primary");
        assert_eq!(config.namespace, None);
    }

    #[test]
    fn project_falls_back() {
        let config = DatastoreConfig::from_lookup(lookup_from(&[
            ("DATASTORE_PROJECT_ID", ""),
            ("GOOGLE_CLOUD_PROJECT", "fallback"),
            ("DATASTORE_NAMESPACE", "test"),
        ]))
        .unwrap();
        assert_eq!(config.project, "fallback");
        assert_eq!(config.namespace.as_deref(), Some("test"));
    }

    #[test]
    fn missing_project_is_config_error() {
        let result = DatastoreConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn from_json() {
        let config = DatastoreConfig::from_json(r#"{"project": "demo"}"#).unwrap();
        assert_eq!(config, DatastoreConfig::new("demo"));

        let config =
            DatastoreConfig::from_json(r#"{"project": "demo", "namespace": ""}"#).unwrap();
        assert_eq!(config.namespace, None);

        assert!(DatastoreConfig::from_json(r#"{"project": ""}"#).is_err());
        assert!(DatastoreConfig::from_json("not json").is_err());
    }

    #[test]
    fn with_namespace() {
        let config = DatastoreConfig::new("demo").with_namespace("ns");
        assert_eq!(config.namespace.as_deref(), Some("ns"));
    }
}
