use std::process::ExitCode;

use clap::{Parser, Subcommand};

use legato_monitor::commands::config::ConfigCommand;
use legato_monitor::commands::status::StatusArgs;
use legato_monitor::commands::watch::WatchArgs;
use legato_monitor::{commands, error, telemetry};

#[derive(Debug, Parser)]
#[command(
    name = "legato-monitor",
    version,
    about = "Status dashboard for the Legato pipeline repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one aggregation pass and print the dashboard
    Status(StatusArgs),
    /// Refresh the dashboard on an interval until Ctrl-C
    Watch(WatchArgs),
    /// Read or change saved settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the JSON Schema for settings.toml
    Schema,
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Watch(_) => "watch",
            Self::Config { .. } => "config",
            Self::Schema => "schema",
        }
    }
}

fn main() -> ExitCode {
    telemetry::init();

    let cli = Cli::parse();

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Status(args) => args.execute(),
        Commands::Watch(args) => args.execute(),
        Commands::Config { command } => command.execute(),
        Commands::Schema => commands::schema::run_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<error::ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}
