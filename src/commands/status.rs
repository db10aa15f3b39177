use clap::Args;

use super::SourceArgs;
use crate::aggregate::run_pass;
use crate::render::{OutputFormat, TerminalSink};
use crate::scheduler::DashboardSink;

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl StatusArgs {
    /// Run a single aggregation pass and print it.
    pub fn execute(&self) -> anyhow::Result<()> {
        let (_store, settings, client) = self.source.connect()?;
        let pass = settings.pass_config(self.source.org.as_deref());
        let format = OutputFormat::resolve(self.source.format);

        let dashboard = run_pass(&client, &pass, chrono::Utc::now());
        let stamp = chrono::Local::now().format("%H:%M:%S").to_string();

        let mut sink = TerminalSink::new(std::io::stdout().lock(), format, false);
        sink.publish(&dashboard, &stamp)
    }
}
