//! Two-level execution tree (job, then step) for one run.

use serde::Serialize;

use crate::github::models::Job;
use crate::status::{StatusKind, classify};

/// Step names containing any of these (case-insensitive) are boilerplate
/// and left out of the tree.
pub const IGNORED_STEPS: &[&str] = &["checkout", "setup python", "install"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTreeNode {
    pub label: String,
    pub icon: &'static str,
    pub status: StatusKind,
    pub is_root: bool,
}

/// Render-ready job tree.
///
/// Nodes are flattened in execution order: each root (job) is followed by
/// its child steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "nodes", rename_all = "snake_case")]
pub enum JobTree {
    NoDetails,
    Nodes(Vec<JobTreeNode>),
}

impl JobTree {
    pub fn nodes(&self) -> &[JobTreeNode] {
        match self {
            JobTree::NoDetails => &[],
            JobTree::Nodes(nodes) => nodes,
        }
    }
}

fn is_ignored_step(name: &str) -> bool {
    let lower = name.to_lowercase();
    IGNORED_STEPS.iter().any(|marker| lower.contains(marker))
}

/// Build the tree for `jobs`. Empty or absent input yields
/// [`JobTree::NoDetails`].
pub fn build_job_tree(jobs: Option<&[Job]>) -> JobTree {
    let jobs = match jobs {
        Some(jobs) if !jobs.is_empty() => jobs,
        _ => return JobTree::NoDetails,
    };

    let mut nodes = Vec::new();
    for job in jobs {
        let status = classify(Some(job)).kind;
        nodes.push(JobTreeNode {
            label: job.name.clone(),
            icon: status.icon(),
            status,
            is_root: true,
        });

        for step in job.steps.iter().flatten() {
            if is_ignored_step(&step.name) {
                continue;
            }
            let status = classify(Some(step)).kind;
            nodes.push(JobTreeNode {
                label: step.name.clone(),
                icon: status.step_icon(),
                status,
                is_root: false,
            });
        }
    }
    JobTree::Nodes(nodes)
}
