//! Wire models for the subset of the hosting API this crate reads.
//!
//! Only the fields the dashboard reads are declared; everything optional on
//! the wire is optional here.

use serde::Deserialize;

/// Anything carrying a lifecycle `status` and a terminal `conclusion`.
pub trait StatusFields {
    fn status(&self) -> Option<&str>;
    fn conclusion(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub run_number: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<Step>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    #[serde(default)]
    pub author: Option<Signature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub date: Option<String>,
}

impl CommitSummary {
    /// Authorship timestamp, if the API reported one.
    pub fn authored_at(&self) -> Option<&str> {
        self.commit.author.as_ref().and_then(|a| a.date.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// An open issue. Only its presence matters.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {}

macro_rules! status_fields {
    ($($ty:ty),*) => {
        $(impl StatusFields for $ty {
            fn status(&self) -> Option<&str> {
                self.status.as_deref()
            }

            fn conclusion(&self) -> Option<&str> {
                self.conclusion.as_deref()
            }
        })*
    };
}

status_fields!(WorkflowRun, Job, Step);
