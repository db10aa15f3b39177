use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregate::{PassConfig, TRANSCRIPT_WORKFLOW};
use crate::artifacts::ArtifactRules;
use crate::error::ExitError;
use crate::github::DEFAULT_API_BASE;
use crate::registry::{MonitoredRepository, Registry, default_repos};

/// Directory under the platform config dir holding the settings file.
pub const APP_DIR: &str = "legato-monitor";
/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.toml";
/// Key the organization choice is persisted under.
pub const ORG_KEY: &str = "org";
/// Environment variable the bearer credential is read from.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Scalar keys that `config get` / `config set` accept.
pub const SCALAR_KEYS: &[&str] = &[
    ORG_KEY,
    "api_base",
    "interval_secs",
    "workflow",
    "commit_window",
    "artifact_cap",
    "project_limit",
];

const INTEGER_KEYS: &[&str] = &["interval_secs", "commit_window", "artifact_cap", "project_limit"];

/// Persisted dashboard settings (`settings.toml`).
///
/// Every field has a default, so a missing or empty file is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Organization that owns the monitored repositories.
    #[serde(default = "default_org")]
    pub org: String,
    /// Hosting API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Seconds between refresh passes in watch mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Workflow file whose runs are counted as transcript runs.
    #[serde(default = "default_workflow")]
    pub workflow: String,
    /// Recent commits scanned for new artifacts.
    #[serde(default = "default_commit_window")]
    pub commit_window: usize,
    /// Maximum artifacts shown.
    #[serde(default = "default_artifact_cap")]
    pub artifact_cap: usize,
    /// Maximum sub-projects shown.
    #[serde(default = "default_project_limit")]
    pub project_limit: usize,
    /// Monitored repositories, in board order.
    #[serde(default = "default_repos")]
    pub repos: Vec<MonitoredRepository>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            org: default_org(),
            api_base: default_api_base(),
            interval_secs: default_interval_secs(),
            workflow: default_workflow(),
            commit_window: default_commit_window(),
            artifact_cap: default_artifact_cap(),
            project_limit: default_project_limit(),
            repos: default_repos(),
        }
    }
}

// Default value functions for serde
fn default_org() -> String { "Legato".into() }
fn default_api_base() -> String { DEFAULT_API_BASE.into() }
fn default_interval_secs() -> u64 { 60 }
fn default_workflow() -> String { TRANSCRIPT_WORKFLOW.into() }
fn default_commit_window() -> usize { 10 }
fn default_artifact_cap() -> usize { 5 }
fn default_project_limit() -> usize { 5 }

impl Settings {
    /// Parse settings from a TOML string.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(toml_str)
            .map_err(|e| ExitError::Config(format!("invalid {SETTINGS_FILE}: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make every pass fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.org.trim().is_empty() {
            return Err(ExitError::Config("org must not be empty".into()).into());
        }
        if self.interval_secs == 0 {
            return Err(ExitError::Config("interval_secs must be at least 1".into()).into());
        }
        if self.repos.is_empty() {
            return Err(ExitError::Config("repos must list at least one repository".into()).into());
        }
        let mut keys = HashSet::new();
        for repo in &self.repos {
            if !keys.insert(repo.key.as_str()) {
                return Err(ExitError::Config(format!("duplicate repository key '{}'", repo.key)).into());
            }
        }
        Ok(())
    }

    /// Effective value of a scalar key, as text.
    pub fn value_of(&self, key: &str) -> Option<String> {
        match key {
            ORG_KEY => Some(self.org.clone()),
            "api_base" => Some(self.api_base.clone()),
            "interval_secs" => Some(self.interval_secs.to_string()),
            "workflow" => Some(self.workflow.clone()),
            "commit_window" => Some(self.commit_window.to_string()),
            "artifact_cap" => Some(self.artifact_cap.to_string()),
            "project_limit" => Some(self.project_limit.to_string()),
            _ => None,
        }
    }

    /// Resolve the configuration for one pass. `org` overrides the
    /// persisted organization.
    pub fn pass_config(&self, org: Option<&str>) -> PassConfig {
        PassConfig {
            org: org.unwrap_or(&self.org).to_string(),
            registry: Registry::new(self.repos.clone()),
            workflow: self.workflow.clone(),
            artifact_rules: ArtifactRules {
                window: self.commit_window,
                cap: self.artifact_cap,
                ..ArtifactRules::default()
            },
            project_limit: self.project_limit,
        }
    }
}

/// Bearer credential: explicit flag, else the environment.
pub fn resolve_token(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(TOKEN_ENV).ok())
        .filter(|t| !t.trim().is_empty())
}

/// String-keyed store backed by the settings file.
///
/// Writes go through `toml_edit` so comments and keys this crate does not
/// know about survive.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/legato-monitor/settings.toml`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = dirs::config_dir().context("could not determine the user config directory")?;
        Ok(base.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Store at `path`, or at the default location.
    pub fn open(path: Option<PathBuf>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Ok(Self::new(p)),
            None => Ok(Self::new(Self::default_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&self.path).with_context(|| format!("reading {}", self.path.display()))
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(&self) -> anyhow::Result<Settings> {
        Settings::parse_toml(&self.read()?)
    }

    /// Effective value for `key`.
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        check_key(key)?;
        let settings = self.load()?;
        settings
            .value_of(key)
            .ok_or_else(|| ExitError::UnknownKey { key: key.to_string() }.into())
    }

    /// Persist `value` under `key`.
    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        check_key(key)?;
        let existing = self.read()?;
        let mut doc: toml_edit::DocumentMut = existing
            .parse()
            .map_err(|e| ExitError::Config(format!("invalid {SETTINGS_FILE}: {e}")))?;

        if existing.trim().is_empty() {
            doc.decor_mut().set_prefix("# legato-monitor settings\n\n");
        }

        if INTEGER_KEYS.contains(&key) {
            let n: i64 = value
                .trim()
                .parse()
                .map_err(|_| ExitError::Config(format!("{key} must be a whole number, got {value:?}")))?;
            doc[key] = toml_edit::value(n);
        } else {
            doc[key] = toml_edit::value(value);
        }

        let rendered = doc.to_string();
        Settings::parse_toml(&rendered)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&self.path, rendered).with_context(|| format!("writing {}", self.path.display()))?;
        tracing::info!(key, path = %self.path.display(), "setting saved");
        Ok(())
    }
}

fn check_key(key: &str) -> anyhow::Result<()> {
    if SCALAR_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(ExitError::UnknownKey { key: key.to_string() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::parse_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.org, "Legato");
        assert_eq!(settings.interval_secs, 60);
        assert_eq!(settings.repos.len(), 3);
    }

    #[test]
    fn parse_full_settings() {
        let toml_str = r#"
org = "acme"
api_base = "https://git.example.com/api/v3"
interval_secs = 30
workflow = "ingest.yml"
commit_window = 20
artifact_cap = 8
project_limit = 3

[[repos]]
key = "conduct"
name = "Acme.Conduct"

[[repos]]
key = "library"
name = "Acme.Library"
"#;
        let settings = Settings::parse_toml(toml_str).unwrap();
        assert_eq!(settings.org, "acme");
        assert_eq!(settings.repos[1].name, "Acme.Library");

        let pass = settings.pass_config(None);
        assert_eq!(pass.org, "acme");
        assert_eq!(pass.workflow, "ingest.yml");
        assert_eq!(pass.artifact_rules.window, 20);
        assert_eq!(pass.artifact_rules.cap, 8);
        assert_eq!(pass.artifact_rules.extension, ".md");
        assert_eq!(pass.project_limit, 3);
        assert_eq!(pass.registry.name_of("conduct"), Some("Acme.Conduct"));
    }

    #[test]
    fn org_override_wins() {
        let pass = Settings::default().pass_config(Some("other"));
        assert_eq!(pass.org, "other");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Settings::parse_toml("org = [[[").unwrap_err();
        assert!(err.to_string().contains("invalid settings.toml"));
        assert!(matches!(err.downcast_ref::<ExitError>(), Some(ExitError::Config(_))));
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(Settings::parse_toml("interval_secs = 0").is_err());
    }

    #[test]
    fn duplicate_repo_keys_rejected() {
        let toml_str = r#"
[[repos]]
key = "a"
name = "One"

[[repos]]
key = "a"
name = "Two"
"#;
        let err = Settings::parse_toml(toml_str).unwrap_err();
        assert!(err.to_string().contains("duplicate repository key"));
    }

    #[test]
    fn store_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/settings.toml"));
        assert_eq!(store.load().unwrap(), Settings::default());
        assert_eq!(store.get(ORG_KEY).unwrap(), "Legato");
    }

    #[test]
    fn store_set_persists_org_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/settings.toml"));
        store.set(ORG_KEY, "acme").unwrap();

        let reopened = SettingsStore::new(store.path());
        assert_eq!(reopened.get(ORG_KEY).unwrap(), "acme");
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("# legato-monitor settings"));
    }

    #[test]
    fn store_set_preserves_comments_and_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "# my dashboard\ninterval_secs = 15 # fast\n").unwrap();

        let store = SettingsStore::new(&path);
        store.set(ORG_KEY, "acme").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("# my dashboard"));
        assert!(raw.contains("# fast"));
        let settings = store.load().unwrap();
        assert_eq!(settings.org, "acme");
        assert_eq!(settings.interval_secs, 15);
    }

    #[test]
    fn store_set_integer_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        store.set("artifact_cap", "7").unwrap();
        assert_eq!(store.load().unwrap().artifact_cap, 7);
        assert!(store.set("artifact_cap", "seven").is_err());
    }

    #[test]
    fn store_rejects_invalid_values_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        assert!(store.set("interval_secs", "0").is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn store_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        let err = store.set("token", "secret").unwrap_err();
        assert!(matches!(err.downcast_ref::<ExitError>(), Some(ExitError::UnknownKey { .. })));
        assert!(store.get("repos").is_err());
    }

    #[test]
    fn token_flag_beats_environment() {
        assert_eq!(resolve_token(Some("abc".into())), Some("abc".to_string()));
        assert_eq!(resolve_token(Some("  ".into())), None);
    }
}
