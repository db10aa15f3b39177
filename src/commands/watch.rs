use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;

use super::SourceArgs;
use crate::aggregate::run_pass;
use crate::render::{OutputFormat, TerminalSink};
use crate::scheduler::RefreshScheduler;

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Seconds between refreshes (overrides interval_secs)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
    /// Stop after this many passes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub passes: Option<u64>,
}

impl WatchArgs {
    /// Refresh the dashboard on load and every interval until Ctrl-C.
    pub fn execute(&self) -> anyhow::Result<()> {
        let (store, mut settings, client) = self.source.connect()?;
        let format = OutputFormat::resolve(self.source.format);
        let interval = Duration::from_secs(self.interval.unwrap_or(settings.interval_secs));

        let stop = Arc::new(AtomicBool::new(false));
        let handler_stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst)) {
            tracing::warn!(error = %e, "could not install Ctrl-C handler");
        }

        let mut scheduler = RefreshScheduler::new(interval);
        if let Some(passes) = self.passes {
            scheduler = scheduler.with_max_passes(passes);
        }

        let clear = format == OutputFormat::Pretty && std::io::stdout().is_terminal();
        let mut sink = TerminalSink::new(std::io::stdout(), format, clear);

        // Settings are re-read every pass so a `config set org` elsewhere
        // takes effect on the next refresh.
        scheduler.run(
            || {
                match store.load() {
                    Ok(fresh) => settings = fresh,
                    Err(e) => tracing::warn!(error = %format!("{e:#}"), "keeping previous settings"),
                }
                let pass = settings.pass_config(self.source.org.as_deref());
                run_pass(&client, &pass, chrono::Utc::now())
            },
            &mut sink,
            &stop,
        );
        Ok(())
    }
}
