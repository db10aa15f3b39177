use std::path::PathBuf;

use clap::Subcommand;

use crate::config::SettingsStore;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective value of a setting
    Get {
        /// Setting name (org, api_base, interval_secs, workflow, commit_window, artifact_cap, project_limit)
        key: String,
        /// Settings file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Save a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
        /// Settings file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the settings file location
    Path {
        /// Settings file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl ConfigCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ConfigCommand::Get { key, config } => {
                let store = SettingsStore::open(config.clone())?;
                println!("{}", store.get(key)?);
            }
            ConfigCommand::Set { key, value, config } => {
                let store = SettingsStore::open(config.clone())?;
                store.set(key, value)?;
                println!("{key} = {value}");
            }
            ConfigCommand::Path { config } => {
                let store = SettingsStore::open(config.clone())?;
                println!("{}", store.path().display());
            }
        }
        Ok(())
    }
}
