//! Terminal presentation of a dashboard.

use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use serde::Serialize;

use crate::aggregate::{BoardEntry, Counters, Dashboard, JobsView};
use crate::artifacts::Artifact;
use crate::isolate::Section;
use crate::jobs::JobTree;
use crate::projects::SubProject;
use crate::scheduler::DashboardSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

impl OutputFormat {
    /// Explicit choice, else pretty on a terminal and text otherwise.
    pub fn resolve(explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| {
            if std::io::stdout().is_terminal() {
                OutputFormat::Pretty
            } else {
                OutputFormat::Text
            }
        })
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    last_updated: &'a str,
    dashboard: &'a Dashboard,
}

/// Render `dashboard` in `format`.
pub fn render(dashboard: &Dashboard, last_updated: &str, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Pretty => render_pretty(dashboard, last_updated),
        OutputFormat::Text => render_text(dashboard, last_updated),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&Snapshot {
                last_updated,
                dashboard,
            })?;
            json.push('\n');
            json
        }
    })
}

fn section_body<T>(out: &mut String, section: &Section<T>, body: impl FnOnce(&mut String, &T)) {
    match section {
        Section::Ready { value } => body(out, value),
        Section::Failed { .. } => {
            let text = section.error_text().unwrap_or_default();
            let _ = writeln!(out, "  {text}");
        }
    }
}

fn pretty_board(out: &mut String, board: &[BoardEntry]) {
    for entry in board {
        let detail = match (&entry.run, &entry.age) {
            (Some(run), Some(age)) => format!("  ({run}, {age})"),
            (Some(run), None) => format!("  ({run})"),
            _ => String::new(),
        };
        let _ = writeln!(
            out,
            "  {} {:<10} {:<18} {}{detail}",
            entry.icon, entry.key, entry.repo, entry.status.label
        );
    }
}

fn pretty_counters(out: &mut String, counters: &Counters) {
    let _ = writeln!(
        out,
        "  Transcripts: {}   Artifacts: {}   Sub-projects: {}",
        counters.transcript_runs.display(),
        counters.artifacts.display(),
        counters.sub_projects.display()
    );
}

fn pretty_jobs(out: &mut String, view: &JobsView) {
    if let Some(run) = &view.run {
        let _ = writeln!(out, "  {run}");
    }
    match &view.tree {
        JobTree::NoDetails => {
            let _ = writeln!(out, "  No job details");
        }
        JobTree::Nodes(nodes) => {
            for node in nodes {
                let indent = if node.is_root { "  " } else { "      " };
                let _ = writeln!(out, "{indent}{} {}", node.icon, node.label);
            }
        }
    }
}

fn pretty_artifacts(out: &mut String, artifacts: &[Artifact]) {
    if artifacts.is_empty() {
        let _ = writeln!(out, "  No recent artifacts");
    }
    for a in artifacts {
        let _ = writeln!(out, "  \u{2022} {} [{}] {}", a.name, a.category, a.age);
    }
}

fn pretty_projects(out: &mut String, projects: &[SubProject]) {
    if projects.is_empty() {
        let _ = writeln!(out, "  No sub-projects");
    }
    for p in projects {
        let _ = writeln!(
            out,
            "  {:<28} {:<8} {:<8} {}",
            p.name,
            p.kind.as_str(),
            p.status.as_str(),
            p.age
        );
    }
}

pub fn render_pretty(dashboard: &Dashboard, last_updated: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Legato Status ({}) ===", dashboard.org);
    let _ = writeln!(out, "Last updated: {last_updated}\n");

    let _ = writeln!(out, "Repositories:");
    section_body(&mut out, &dashboard.board, |o, b| pretty_board(o, b));

    let _ = writeln!(out, "\nCounters:");
    section_body(&mut out, &dashboard.counters, pretty_counters);

    let _ = writeln!(out, "\nLatest run:");
    section_body(&mut out, &dashboard.jobs, pretty_jobs);

    let _ = writeln!(out, "\nRecent artifacts:");
    section_body(&mut out, &dashboard.artifacts, |o, a| pretty_artifacts(o, a));

    let _ = writeln!(out, "\nSub-projects:");
    section_body(&mut out, &dashboard.projects, |o, p| pretty_projects(o, p));
    out
}

fn text_failure<T>(out: &mut String, name: &str, section: &Section<T>) -> bool {
    if let Section::Failed { message } = section {
        let _ = writeln!(out, "section  name={name}  error={message}");
        return true;
    }
    false
}

pub fn render_text(dashboard: &Dashboard, last_updated: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "legato-status  org={}", dashboard.org);
    let _ = writeln!(out, "last-updated  {last_updated}");

    if let Some(board) = dashboard.board.value() {
        for e in board {
            let _ = writeln!(
                out,
                "repo  key={}  name={}  status={}  label={}",
                e.key,
                e.repo,
                e.status.kind.as_str(),
                e.status.label
            );
        }
    }
    text_failure(&mut out, "board", &dashboard.board);

    if let Some(c) = dashboard.counters.value() {
        let _ = writeln!(
            out,
            "counters  transcript_runs={}  artifacts={}  sub_projects={}",
            c.transcript_runs.display(),
            c.artifacts.display(),
            c.sub_projects.display()
        );
    }
    text_failure(&mut out, "counters", &dashboard.counters);

    if let Some(view) = dashboard.jobs.value() {
        if let Some(run) = &view.run {
            let _ = writeln!(out, "run  title={run}");
        }
        if view.tree == JobTree::NoDetails {
            let _ = writeln!(out, "jobs  none");
        }
        for node in view.tree.nodes() {
            let kind = if node.is_root { "job" } else { "step" };
            let _ = writeln!(out, "{kind}  name={}  status={}", node.label, node.status.as_str());
        }
    }
    text_failure(&mut out, "jobs", &dashboard.jobs);

    if let Some(artifacts) = dashboard.artifacts.value() {
        for a in artifacts {
            let _ = writeln!(
                out,
                "artifact  name={}  category={}  path={}  age={}",
                a.name, a.category, a.path, a.age
            );
        }
    }
    text_failure(&mut out, "artifacts", &dashboard.artifacts);

    if let Some(projects) = dashboard.projects.value() {
        for p in projects {
            let _ = writeln!(
                out,
                "project  name={}  kind={}  status={}  age={}",
                p.name,
                p.kind.as_str(),
                p.status.as_str(),
                p.age
            );
        }
    }
    text_failure(&mut out, "projects", &dashboard.projects);
    out
}

/// Writes each pass to a terminal or pipe.
pub struct TerminalSink<W: Write> {
    out: W,
    format: OutputFormat,
    clear: bool,
}

impl<W: Write> TerminalSink<W> {
    /// `clear` redraws in place (pretty output on a terminal).
    pub fn new(out: W, format: OutputFormat, clear: bool) -> Self {
        Self { out, format, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DashboardSink for TerminalSink<W> {
    fn publish(&mut self, dashboard: &Dashboard, last_updated: &str) -> anyhow::Result<()> {
        let rendered = render(dashboard, last_updated, self.format)?;
        if self.clear && self.format == OutputFormat::Pretty {
            write!(self.out, "\x1b[2J\x1b[H")?;
        }
        self.out.write_all(rendered.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
