//! Sub-project discovery and classification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::age::age_label;
use crate::error::ApiError;
use crate::github::models::{Issue, Repository};
use crate::github::{Source, endpoints, fetch};
use crate::isolate::isolate;

/// Repositories whose name starts with this are sub-projects.
pub const PROJECT_PREFIX: &str = "Lab.";

/// Page size for the organization repository listing.
pub const ORG_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Chord,
    Note,
    Unknown,
}

impl ProjectKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectKind::Chord => "chord",
            ProjectKind::Note => "note",
            ProjectKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// No open issues.
    Active,
    /// At least one open issue is waiting on someone.
    Waiting,
}

impl ProjectStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Waiting => "waiting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubProject {
    pub name: String,
    pub full_name: String,
    pub kind: ProjectKind,
    pub status: ProjectStatus,
    pub url: String,
    pub updated_at: Option<String>,
    pub age: String,
}

pub fn is_sub_project(name: &str) -> bool {
    name.starts_with(PROJECT_PREFIX)
}

/// Kind by case-insensitive substring of the full repository name.
pub fn kind_of(full_name: &str) -> ProjectKind {
    let lower = full_name.to_lowercase();
    if lower.contains("chord") {
        ProjectKind::Chord
    } else if lower.contains("note") {
        ProjectKind::Note
    } else {
        ProjectKind::Unknown
    }
}

/// One page of the organization's repositories, most recently updated first.
pub fn list_org_repos(source: &dyn Source, org: &str) -> Result<Vec<Repository>, ApiError> {
    fetch(source, &endpoints::org_repos(org, ORG_PAGE_SIZE))
}

/// Number of sub-projects in the organization listing.
pub fn count_sub_projects(source: &dyn Source, org: &str) -> Result<usize, ApiError> {
    Ok(list_org_repos(source, org)?
        .iter()
        .filter(|r| is_sub_project(&r.name))
        .count())
}

fn has_open_issues(source: &dyn Source, full_name: &str) -> bool {
    isolate(&format!("issues {full_name}"), || {
        fetch::<Vec<Issue>>(source, &endpoints::open_issues(full_name))
    })
    .is_some_and(|issues| !issues.is_empty())
}

/// The `limit` most recently updated sub-projects, classified.
///
/// An issue lookup that fails counts as no open issues.
pub fn classify_projects(
    source: &dyn Source,
    org: &str,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<Vec<SubProject>, ApiError> {
    let repos = list_org_repos(source, org)?;

    let projects = repos
        .into_iter()
        .filter(|r| is_sub_project(&r.name))
        .take(limit)
        .map(|repo| {
            let status = if has_open_issues(source, &repo.full_name) {
                ProjectStatus::Waiting
            } else {
                ProjectStatus::Active
            };
            SubProject {
                kind: kind_of(&repo.full_name),
                status,
                age: age_label(repo.updated_at.as_deref(), now),
                name: repo.name,
                full_name: repo.full_name,
                url: repo.html_url,
                updated_at: repo.updated_at,
            }
        })
        .collect();
    Ok(projects)
}
