pub mod config;
pub mod schema;
pub mod status;
pub mod watch;

use std::path::PathBuf;

use clap::Args;

use crate::config::{Settings, SettingsStore, resolve_token};
use crate::github::ApiClient;
use crate::render::OutputFormat;

/// Flags shared by the commands that talk to the hosting API.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Organization to monitor (overrides the saved setting for this run)
    #[arg(long)]
    pub org: Option<String>,
    /// Bearer token for the hosting API (falls back to $GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl SourceArgs {
    /// Load settings and build the API client they describe.
    pub fn connect(&self) -> anyhow::Result<(SettingsStore, Settings, ApiClient)> {
        let store = SettingsStore::open(self.config.clone())?;
        let settings = store.load()?;
        let client = ApiClient::new(&settings.api_base, resolve_token(self.token.clone()));
        tracing::debug!(settings = %store.path().display(), org = %settings.org, "settings loaded");
        Ok((store, settings, client))
    }
}
