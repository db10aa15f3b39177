//! Legato monitor - status dashboard for the Legato pipeline repositories

pub mod age;
pub mod aggregate;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod isolate;
pub mod jobs;
pub mod projects;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod status;
pub mod telemetry;
