//! Endpoint paths, relative to the API base URL.

/// Most recent run of any workflow in a repository.
pub fn latest_run(org: &str, repo: &str) -> String {
    format!("/repos/{org}/{repo}/actions/runs?per_page=1")
}

/// Runs of one named workflow; only the total count is used.
pub fn workflow_runs(org: &str, repo: &str, workflow: &str) -> String {
    format!("/repos/{org}/{repo}/actions/workflows/{workflow}/runs?per_page=1")
}

/// Jobs (with nested steps) of one run.
pub fn run_jobs(org: &str, repo: &str, run_id: u64) -> String {
    format!("/repos/{org}/{repo}/actions/runs/{run_id}/jobs")
}

/// Directory listing. An empty `dir` lists the repository root.
pub fn contents(org: &str, repo: &str, dir: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        format!("/repos/{org}/{repo}/contents")
    } else {
        format!("/repos/{org}/{repo}/contents/{dir}")
    }
}

/// Newest-first commit page.
pub fn commits(org: &str, repo: &str, per_page: usize) -> String {
    format!("/repos/{org}/{repo}/commits?per_page={per_page}")
}

/// Single commit including its file changes.
pub fn commit(org: &str, repo: &str, sha: &str) -> String {
    format!("/repos/{org}/{repo}/commits/{sha}")
}

/// Organization repositories, most recently updated first.
pub fn org_repos(org: &str, per_page: usize) -> String {
    format!("/orgs/{org}/repos?sort=updated&per_page={per_page}")
}

/// At most one open issue; only presence matters.
pub fn open_issues(full_name: &str) -> String {
    format!("/repos/{full_name}/issues?state=open&per_page=1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_root_and_subdirectory() {
        assert_eq!(contents("Legato", "Legato.Library", ""), "/repos/Legato/Legato.Library/contents");
        assert_eq!(
            contents("Legato", "Legato.Library", "/concepts/"),
            "/repos/Legato/Legato.Library/contents/concepts"
        );
    }

    #[test]
    fn org_listing_is_sorted_by_update() {
        assert_eq!(org_repos("Legato", 100), "/orgs/Legato/repos?sort=updated&per_page=100");
    }
}
