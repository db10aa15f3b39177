//! Fault isolation at the boundary of each independently renderable unit.
//!
//! Every repository lookup, commit detail, directory listing, issue lookup
//! and counter goes through [`isolate`]; every top-level dashboard section
//! is carried as a [`Section`].

use std::fmt::Display;
use std::thread::ScopedJoinHandle;

use serde::Serialize;

/// Run `work` for `unit`, logging and swallowing its failure.
pub fn isolate<T, E: Display>(unit: &str, work: impl FnOnce() -> Result<T, E>) -> Option<T> {
    match work() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(unit, error = %e, "isolated failure");
            None
        }
    }
}

/// Outcome of one top-level rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Section<T> {
    Ready { value: T },
    Failed { message: String },
}

impl<T> Section<T> {
    /// Run `work` as the section `name`, converting a failure into
    /// [`Section::Failed`].
    pub fn capture(name: &str, work: impl FnOnce() -> anyhow::Result<T>) -> Self {
        match work() {
            Ok(value) => Section::Ready { value },
            Err(e) => {
                tracing::warn!(section = name, error = %format!("{e:#}"), "section failed");
                Section::Failed {
                    message: format!("{e:#}"),
                }
            }
        }
    }

    /// Wait for a section computed on a scoped thread. A panic is contained
    /// and reported like any other failure.
    pub fn join(name: &str, handle: ScopedJoinHandle<'_, Self>) -> Self {
        handle.join().unwrap_or_else(|_| {
            tracing::error!(section = name, "section panicked");
            Section::Failed {
                message: format!("{name} panicked"),
            }
        })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Section::Ready { value } => Some(value),
            Section::Failed { .. } => None,
        }
    }

    /// Inline error text for a failed section.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Section::Ready { .. } => None,
            Section::Failed { message } => Some(format!("Error: {message}")),
        }
    }
}
