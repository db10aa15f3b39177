//! Static registry of monitored repositories.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Registry key of the orchestrator repository (transcript runs, job tree).
pub const CONDUCT: &str = "conduct";
/// Registry key of the knowledge-artifact repository.
pub const LIBRARY: &str = "library";
/// Registry key of the correlation index repository.
pub const LISTEN: &str = "listen";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonitoredRepository {
    /// Short key used by the dashboard.
    pub key: String,
    /// Repository name within the organization.
    pub name: String,
}

impl MonitoredRepository {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
        }
    }
}

/// Ordered mapping from short key to repository; board order follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    repos: Vec<MonitoredRepository>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(default_repos())
    }
}

impl Registry {
    pub fn new(repos: Vec<MonitoredRepository>) -> Self {
        Self { repos }
    }

    pub fn all(&self) -> &[MonitoredRepository] {
        &self.repos
    }

    /// Repository name for `key`, if registered.
    pub fn name_of(&self, key: &str) -> Option<&str> {
        self.repos
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.name.as_str())
    }
}

/// The three repositories of the pipeline.
pub fn default_repos() -> Vec<MonitoredRepository> {
    vec![
        MonitoredRepository::new(CONDUCT, "Legato.Conduct"),
        MonitoredRepository::new(LIBRARY, "Legato.Library"),
        MonitoredRepository::new(LISTEN, "Legato.Listen"),
    ]
}
