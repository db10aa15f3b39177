//! Knowledge-artifact discovery in the library repository.
//!
//! Recent artifacts come from walking the commit history newest-first; the
//! total count comes from listing each category directory.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::age::age_label;
use crate::error::ApiError;
use crate::github::models::{CommitDetail, CommitSummary, ContentEntry};
use crate::github::{Source, endpoints, fetch};
use crate::isolate::isolate;

/// Category for documents at the repository root.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// What counts as a knowledge document and how far to look for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRules {
    /// Knowledge-document extension, including the dot.
    pub extension: String,
    /// Paths containing this are documentation indexes, not artifacts.
    pub index_marker: String,
    /// Number of recent commits to scan.
    pub window: usize,
    /// Maximum artifacts reported per pass.
    pub cap: usize,
}

impl Default for ArtifactRules {
    fn default() -> Self {
        Self {
            extension: ".md".to_string(),
            index_marker: "README".to_string(),
            window: 10,
            cap: 5,
        }
    }
}

impl ArtifactRules {
    /// True for knowledge documents that are not documentation indexes.
    pub fn is_eligible(&self, path: &str) -> bool {
        path.ends_with(&self.extension) && !path.contains(&self.index_marker)
    }

    fn name_of<'p>(&self, path: &'p str) -> &'p str {
        let file = path.rsplit('/').next().unwrap_or(path);
        file.strip_suffix(self.extension.as_str()).unwrap_or(file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub category: String,
    pub path: String,
    pub discovered_at: Option<String>,
    pub age: String,
}

/// First path segment, or [`UNKNOWN_CATEGORY`] for a bare file name.
pub fn category_of(path: &str) -> &str {
    match path.split_once('/') {
        Some((first, _)) if !first.is_empty() => first,
        _ => UNKNOWN_CATEGORY,
    }
}

/// Accumulates admitted artifacts for one pass, at most one per path.
struct ArtifactScan<'a> {
    rules: &'a ArtifactRules,
    now: DateTime<Utc>,
    seen: HashSet<String>,
    artifacts: Vec<Artifact>,
}

impl<'a> ArtifactScan<'a> {
    fn new(rules: &'a ArtifactRules, now: DateTime<Utc>) -> Self {
        Self {
            rules,
            now,
            seen: HashSet::new(),
            artifacts: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.artifacts.len() >= self.rules.cap
    }

    fn offer(&mut self, path: &str, discovered_at: Option<&str>) {
        if self.is_full() || !self.rules.is_eligible(path) || !self.seen.insert(path.to_string()) {
            return;
        }
        self.artifacts.push(Artifact {
            name: self.rules.name_of(path).to_string(),
            category: category_of(path).to_string(),
            path: path.to_string(),
            discovered_at: discovered_at.map(str::to_string),
            age: age_label(discovered_at, self.now),
        });
    }
}

/// Recent artifacts in `org/repo`, newest first.
///
/// Fails only if the commit list itself cannot be fetched; a commit whose
/// detail fails contributes nothing.
pub fn extract_artifacts(
    source: &dyn Source,
    org: &str,
    repo: &str,
    rules: &ArtifactRules,
    now: DateTime<Utc>,
) -> Result<Vec<Artifact>, ApiError> {
    let mut scan = ArtifactScan::new(rules, now);
    if scan.is_full() {
        return Ok(Vec::new());
    }

    let commits: Vec<CommitSummary> = fetch(source, &endpoints::commits(org, repo, rules.window))?;

    for commit in commits.iter().take(rules.window) {
        if scan.is_full() {
            break;
        }
        let short = &commit.sha[..commit.sha.len().min(7)];
        let unit = format!("commit {repo}@{short}");
        let Some(detail) = isolate(&unit, || {
            fetch::<CommitDetail>(source, &endpoints::commit(org, repo, &commit.sha))
        }) else {
            continue;
        };
        for file in &detail.files {
            scan.offer(&file.filename, commit.authored_at());
        }
    }

    tracing::debug!(repo, found = scan.artifacts.len(), "artifact scan finished");
    Ok(scan.artifacts)
}

/// Number of knowledge documents directly inside each non-hidden
/// top-level directory of `org/repo`.
///
/// A directory that cannot be listed counts as zero.
pub fn count_documents(
    source: &dyn Source,
    org: &str,
    repo: &str,
    rules: &ArtifactRules,
) -> Result<usize, ApiError> {
    let root: Vec<ContentEntry> = fetch(source, &endpoints::contents(org, repo, ""))?;

    let total: usize = root
        .iter()
        .filter(|entry| entry.is_dir() && !entry.name.starts_with('.'))
        .map(|dir| {
            let unit = format!("directory {repo}/{}", dir.name);
            isolate(&unit, || {
                fetch::<Vec<ContentEntry>>(source, &endpoints::contents(org, repo, &dir.name))
            })
            .map_or(0, |entries| {
                entries
                    .iter()
                    .filter(|e| e.is_file() && e.name.ends_with(&rules.extension))
                    .count()
            })
        })
        .sum();
    Ok(total)
}
