//! One aggregation pass: five independently derived dashboard sections.
//!
//! Sections run side by side on scoped threads and share nothing but the
//! read-only [`Source`] and [`PassConfig`]. A failure in one section becomes
//! that section's inline error; the others render normally.

use std::thread;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::age::age_label;
use crate::artifacts::{Artifact, ArtifactRules, count_documents, extract_artifacts};
use crate::error::ApiError;
use crate::github::models::{JobList, RunList, WorkflowRun};
use crate::github::{Source, endpoints, fetch};
use crate::isolate::{Section, isolate};
use crate::jobs::{JobTree, build_job_tree};
use crate::projects::{SubProject, classify_projects, count_sub_projects};
use crate::registry::{CONDUCT, LIBRARY, Registry};
use crate::status::{RunStatus, classify};

/// Workflow whose run count is reported as the transcript counter.
pub const TRANSCRIPT_WORKFLOW: &str = "process-transcript.yml";

/// Everything a pass needs, resolved before the pass starts.
#[derive(Debug, Clone)]
pub struct PassConfig {
    pub org: String,
    pub registry: Registry,
    pub workflow: String,
    pub artifact_rules: ArtifactRules,
    pub project_limit: usize,
}

impl PassConfig {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            registry: Registry::default(),
            workflow: TRANSCRIPT_WORKFLOW.to_string(),
            artifact_rules: ArtifactRules::default(),
            project_limit: 5,
        }
    }

    fn repo(&self, key: &str) -> anyhow::Result<&str> {
        self.registry
            .name_of(key)
            .with_context(|| format!("no repository registered under '{key}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub key: String,
    pub repo: String,
    pub status: RunStatus,
    pub icon: &'static str,
    /// "<workflow name> #<run number>" of the latest run, if any.
    pub run: Option<String>,
    pub age: Option<String>,
}

/// A scalar that is either known or unavailable. Unavailable is not zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counter(pub Option<u64>);

impl Counter {
    pub fn display(self) -> String {
        self.0.map_or_else(|| "-".to_string(), |n| n.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub transcript_runs: Counter,
    pub artifacts: Counter,
    pub sub_projects: Counter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobsView {
    pub run: Option<String>,
    pub tree: JobTree,
}

/// The five sections of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub org: String,
    pub board: Section<Vec<BoardEntry>>,
    pub counters: Section<Counters>,
    pub jobs: Section<JobsView>,
    pub artifacts: Section<Vec<Artifact>>,
    pub projects: Section<Vec<SubProject>>,
}

fn run_title(run: &WorkflowRun) -> String {
    let name = run.name.as_deref().unwrap_or("run");
    format!("{name} #{}", run.run_number)
}

fn latest_run(source: &dyn Source, org: &str, repo: &str) -> Result<Option<WorkflowRun>, ApiError> {
    let runs: RunList = fetch(source, &endpoints::latest_run(org, repo))?;
    Ok(runs.workflow_runs.into_iter().next())
}

fn board_entry(source: &dyn Source, config: &PassConfig, key: &str, repo: &str, now: DateTime<Utc>) -> BoardEntry {
    let looked_up = isolate(&format!("latest run {repo}"), || latest_run(source, &config.org, repo));
    let (status, run, age) = match looked_up {
        None => (RunStatus::unavailable(), None, None),
        Some(run) => (
            classify(run.as_ref()),
            run.as_ref().map(run_title),
            run.as_ref().map(|r| age_label(r.updated_at.as_deref(), now)),
        ),
    };
    BoardEntry {
        key: key.to_string(),
        repo: repo.to_string(),
        icon: status.kind.icon(),
        status,
        run,
        age,
    }
}

/// Latest-run status of every registered repository, in registry order.
pub fn status_board(source: &dyn Source, config: &PassConfig, now: DateTime<Utc>) -> Vec<BoardEntry> {
    thread::scope(|s| {
        let handles: Vec<_> = config
            .registry
            .all()
            .iter()
            .map(|r| (r, s.spawn(move || board_entry(source, config, &r.key, &r.name, now))))
            .collect();

        handles
            .into_iter()
            .map(|(r, handle)| {
                handle.join().unwrap_or_else(|_| BoardEntry {
                    key: r.key.clone(),
                    repo: r.name.clone(),
                    status: RunStatus::unavailable(),
                    icon: RunStatus::unavailable().kind.icon(),
                    run: None,
                    age: None,
                })
            })
            .collect()
    })
}

/// Transcript runs, library documents and sub-projects, each isolated.
pub fn counters(source: &dyn Source, config: &PassConfig) -> anyhow::Result<Counters> {
    let org = config.org.as_str();
    let conduct = config.repo(CONDUCT)?;
    let library = config.repo(LIBRARY)?;

    Ok(thread::scope(|s| {
        let runs = s.spawn(|| {
            isolate("transcript run count", || {
                fetch::<RunList>(source, &endpoints::workflow_runs(org, conduct, &config.workflow))
                    .map(|r| r.total_count)
            })
        });
        let documents = s.spawn(|| {
            isolate("artifact count", || count_documents(source, org, library, &config.artifact_rules))
                .map(|n| n as u64)
        });
        let projects = s.spawn(|| {
            isolate("sub-project count", || count_sub_projects(source, org)).map(|n| n as u64)
        });

        Counters {
            transcript_runs: Counter(runs.join().ok().flatten()),
            artifacts: Counter(documents.join().ok().flatten()),
            sub_projects: Counter(projects.join().ok().flatten()),
        }
    }))
}

/// Job tree of the orchestrator's latest run.
pub fn job_view(source: &dyn Source, config: &PassConfig) -> anyhow::Result<JobsView> {
    let org = config.org.as_str();
    let conduct = config.repo(CONDUCT)?;

    let Some(run) = latest_run(source, org, conduct)? else {
        return Ok(JobsView {
            run: None,
            tree: JobTree::NoDetails,
        });
    };
    let jobs: JobList = fetch(source, &endpoints::run_jobs(org, conduct, run.id))?;
    Ok(JobsView {
        run: Some(run_title(&run)),
        tree: build_job_tree(Some(jobs.jobs.as_slice())),
    })
}

/// Run one full aggregation pass.
pub fn run_pass(source: &dyn Source, config: &PassConfig, now: DateTime<Utc>) -> Dashboard {
    tracing::info!(org = %config.org, "aggregation pass started");
    let started = std::time::Instant::now();

    let dashboard = thread::scope(|s| {
        let board = s.spawn(|| Section::capture("board", || Ok(status_board(source, config, now))));
        let counters = s.spawn(|| Section::capture("counters", || counters(source, config)));
        let jobs = s.spawn(|| Section::capture("jobs", || job_view(source, config)));
        let artifacts = s.spawn(|| {
            Section::capture("artifacts", || {
                let library = config.repo(LIBRARY)?;
                Ok(extract_artifacts(source, &config.org, library, &config.artifact_rules, now)?)
            })
        });
        let projects = s.spawn(|| {
            Section::capture("projects", || {
                Ok(classify_projects(source, &config.org, config.project_limit, now)?)
            })
        });

        Dashboard {
            org: config.org.clone(),
            board: Section::join("board", board),
            counters: Section::join("counters", counters),
            jobs: Section::join("jobs", jobs),
            artifacts: Section::join("artifacts", artifacts),
            projects: Section::join("projects", projects),
        }
    });

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(elapsed_ms, "aggregation pass finished");
    dashboard
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::age::parse_timestamp;
    use crate::github::fake::FakeSource;
    use crate::projects::ORG_PAGE_SIZE;
    use crate::registry::MonitoredRepository;
    use crate::status::StatusKind;

    const ORG: &str = "Legato";

    fn now() -> DateTime<Utc> {
        parse_timestamp("2026-01-08T12:00:00Z").unwrap()
    }

    fn runs(status: &str, conclusion: Value) -> Value {
        json!({
            "total_count": 1,
            "workflow_runs": [{
                "id": 42,
                "name": "Process Transcript",
                "run_number": 17,
                "status": status,
                "conclusion": conclusion,
                "updated_at": "2026-01-08T11:30:00Z"
            }]
        })
    }

    fn abc_config() -> PassConfig {
        PassConfig {
            registry: Registry::new(vec![
                MonitoredRepository::new("a", "Repo.A"),
                MonitoredRepository::new("b", "Repo.B"),
                MonitoredRepository::new("c", "Repo.C"),
            ]),
            ..PassConfig::new(ORG)
        }
    }

    /// A complete upstream for the default registry.
    fn upstream() -> FakeSource {
        FakeSource::new()
            .with(endpoints::latest_run(ORG, "Legato.Conduct"), runs("completed", json!("success")))
            .with(endpoints::latest_run(ORG, "Legato.Library"), runs("in_progress", Value::Null))
            .with(endpoints::latest_run(ORG, "Legato.Listen"), json!({"total_count": 0, "workflow_runs": []}))
            .with(
                endpoints::workflow_runs(ORG, "Legato.Conduct", TRANSCRIPT_WORKFLOW),
                json!({"total_count": 12, "workflow_runs": []}),
            )
            .with(
                endpoints::run_jobs(ORG, "Legato.Conduct", 42),
                json!({"jobs": [{
                    "name": "process",
                    "status": "completed",
                    "conclusion": "success",
                    "steps": [
                        {"name": "Checkout", "status": "completed", "conclusion": "success"},
                        {"name": "Classify transcript", "status": "completed", "conclusion": "success"}
                    ]
                }]}),
            )
            .with(
                endpoints::contents(ORG, "Legato.Library", ""),
                json!([{"name": "concepts", "path": "concepts", "type": "dir"}]),
            )
            .with(
                endpoints::contents(ORG, "Legato.Library", "concepts"),
                json!([{"name": "a.md", "path": "concepts/a.md", "type": "file"}]),
            )
            .with(
                endpoints::commits(ORG, "Legato.Library", 10),
                json!([{"sha": "abc1234", "commit": {"author": {"date": "2026-01-08T10:00:00Z"}}}]),
            )
            .with(
                endpoints::commit(ORG, "Legato.Library", "abc1234"),
                json!({"files": [{"filename": "concepts/a.md"}]}),
            )
            .with(
                endpoints::org_repos(ORG, ORG_PAGE_SIZE),
                json!([{"name": "Lab.Chord.Widget", "full_name": "Legato/Lab.Chord.Widget", "html_url": "u"}]),
            )
            .with(endpoints::open_issues("Legato/Lab.Chord.Widget"), json!([]))
    }

    #[test]
    fn one_failing_repository_does_not_drop_the_others() {
        let source = FakeSource::new()
            .with(endpoints::latest_run(ORG, "Repo.A"), runs("completed", json!("success")))
            .failing(endpoints::latest_run(ORG, "Repo.B"), 500)
            .with(endpoints::latest_run(ORG, "Repo.C"), runs("completed", json!("failure")));

        let board = status_board(&source, &abc_config(), now());
        let summary: Vec<_> = board
            .iter()
            .map(|e| (e.key.as_str(), e.status.kind, e.status.label.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", StatusKind::Success, "Operational"),
                ("b", StatusKind::Error, "Unavailable"),
                ("c", StatusKind::Error, "Failed"),
            ]
        );
        assert_eq!(board[0].run.as_deref(), Some("Process Transcript #17"));
        assert_eq!(board[0].age.as_deref(), Some("30m ago"));
    }

    #[test]
    fn repository_without_runs_is_operational() {
        let source = FakeSource::new()
            .with(endpoints::latest_run(ORG, "Repo.A"), json!({"total_count": 0, "workflow_runs": []}));
        let config = PassConfig {
            registry: Registry::new(vec![MonitoredRepository::new("a", "Repo.A")]),
            ..PassConfig::new(ORG)
        };

        let board = status_board(&source, &config, now());
        assert_eq!(board[0].status.label, "Operational");
        assert!(board[0].run.is_none());
    }

    #[test]
    fn empty_run_count_is_zero_but_failure_is_unavailable() {
        let empty = FakeSource::new().with(
            endpoints::workflow_runs(ORG, "Legato.Conduct", TRANSCRIPT_WORKFLOW),
            json!({"total_count": 0, "workflow_runs": []}),
        );
        let failed = FakeSource::new().failing(
            endpoints::workflow_runs(ORG, "Legato.Conduct", TRANSCRIPT_WORKFLOW),
            502,
        );
        let config = PassConfig::new(ORG);

        let zero = counters(&empty, &config).unwrap();
        let unavailable = counters(&failed, &config).unwrap();
        assert_eq!(zero.transcript_runs, Counter(Some(0)));
        assert_eq!(zero.transcript_runs.display(), "0");
        assert_eq!(unavailable.transcript_runs, Counter(None));
        assert_eq!(unavailable.transcript_runs.display(), "-");
    }

    #[test]
    fn full_pass_renders_every_section() {
        let dashboard = run_pass(&upstream(), &PassConfig::new(ORG), now());

        let board = dashboard.board.value().unwrap();
        let labels: Vec<_> = board.iter().map(|e| e.status.label.as_str()).collect();
        assert_eq!(labels, vec!["Operational", "Running", "Operational"]);

        let counters = dashboard.counters.value().unwrap();
        assert_eq!(counters.transcript_runs, Counter(Some(12)));
        assert_eq!(counters.artifacts, Counter(Some(1)));
        assert_eq!(counters.sub_projects, Counter(Some(1)));

        let jobs = dashboard.jobs.value().unwrap();
        assert_eq!(jobs.run.as_deref(), Some("Process Transcript #17"));
        let labels: Vec<_> = jobs.tree.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["process", "Classify transcript"]);

        assert_eq!(dashboard.artifacts.value().unwrap().len(), 1);
        assert_eq!(dashboard.projects.value().unwrap()[0].name, "Lab.Chord.Widget");
    }

    #[test]
    fn failing_sections_are_isolated_from_each_other() {
        let source = upstream()
            .failing(endpoints::commits(ORG, "Legato.Library", 10), 500)
            .failing(endpoints::org_repos(ORG, ORG_PAGE_SIZE), 503);

        let dashboard = run_pass(&source, &PassConfig::new(ORG), now());
        assert!(dashboard.artifacts.error_text().unwrap().starts_with("Error: "));
        assert!(dashboard.projects.error_text().unwrap().contains("503"));
        assert!(dashboard.board.value().is_some());
        assert!(dashboard.jobs.value().is_some());

        let counters = dashboard.counters.value().unwrap();
        assert_eq!(counters.sub_projects.display(), "-");
        assert_eq!(counters.transcript_runs.display(), "12");
    }

    #[test]
    fn job_view_without_runs_has_no_details() {
        let source = FakeSource::new()
            .with(endpoints::latest_run(ORG, "Legato.Conduct"), json!({"total_count": 0, "workflow_runs": []}));
        let view = job_view(&source, &PassConfig::new(ORG)).unwrap();
        assert_eq!(view.tree, JobTree::NoDetails);
        assert!(view.run.is_none());
    }

    #[test]
    fn missing_registry_key_fails_only_dependent_sections() {
        let config = PassConfig {
            registry: Registry::new(vec![MonitoredRepository::new(CONDUCT, "Legato.Conduct")]),
            ..PassConfig::new(ORG)
        };
        let dashboard = run_pass(&upstream(), &config, now());
        assert!(dashboard.artifacts.error_text().unwrap().contains("library"));
        assert!(dashboard.counters.value().is_none());
        assert!(dashboard.jobs.value().is_some());
        assert!(dashboard.projects.value().is_some());
    }

    #[test]
    fn repeated_passes_are_byte_identical() {
        let source = upstream();
        let config = PassConfig::new(ORG);
        let first = serde_json::to_string(&run_pass(&source, &config, now())).unwrap();
        let second = serde_json::to_string(&run_pass(&source, &config, now())).unwrap();
        assert_eq!(first, second);
    }
}
