//! Status classification for runs, jobs and steps.

use serde::{Deserialize, Serialize};

use crate::github::models::StatusFields;

/// The four-way status vocabulary shared by every level of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
    Warning,
    Loading,
}

impl StatusKind {
    /// Glyph used for repositories and jobs.
    pub const fn icon(self) -> &'static str {
        match self {
            StatusKind::Success => "\u{25cf}",
            StatusKind::Error => "\u{2716}",
            StatusKind::Warning => "\u{25b2}",
            StatusKind::Loading => "\u{25cc}",
        }
    }

    /// Lighter glyph used for steps.
    pub const fn step_icon(self) -> &'static str {
        match self {
            StatusKind::Success => "\u{2713}",
            StatusKind::Error => "\u{2717}",
            StatusKind::Warning => "!",
            StatusKind::Loading => "\u{2026}",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Error => "error",
            StatusKind::Warning => "warning",
            StatusKind::Loading => "loading",
        }
    }
}

/// A classified status with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    pub kind: StatusKind,
    pub label: String,
}

impl RunStatus {
    fn new(kind: StatusKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }

    /// Status for a repository whose lookup failed.
    pub fn unavailable() -> Self {
        Self::new(StatusKind::Error, "Unavailable")
    }
}

/// Classify raw `status` / `conclusion` fields. First match wins:
///
/// 1. `in_progress` or `queued` status: loading, "Running"
/// 2. `failure` conclusion: error, "Failed"
/// 3. `cancelled` conclusion: warning, "Cancelled"
/// 4. anything else: success, "Operational"
pub fn classify_fields(status: Option<&str>, conclusion: Option<&str>) -> RunStatus {
    if matches!(status, Some("in_progress" | "queued")) {
        return RunStatus::new(StatusKind::Loading, "Running");
    }
    match conclusion {
        Some("failure") => RunStatus::new(StatusKind::Error, "Failed"),
        Some("cancelled") => RunStatus::new(StatusKind::Warning, "Cancelled"),
        _ => RunStatus::new(StatusKind::Success, "Operational"),
    }
}

/// Classify a run, job or step record.
///
/// A missing record means nothing has run yet and counts as operational.
pub fn classify<R: StatusFields + ?Sized>(record: Option<&R>) -> RunStatus {
    match record {
        None => RunStatus::new(StatusKind::Success, "Operational"),
        Some(r) => classify_fields(r.status(), r.conclusion()),
    }
}
