use std::process::ExitCode;

/// Errors that cause legato-monitor to exit with a specific code.
#[derive(Debug, thiserror::Error)]
pub enum ExitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown settings key: {key}")]
    UnknownKey { key: String },

    #[error("{0}")]
    Other(String),
}

impl ExitError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExitError::Config(_) => ExitCode::from(2),
            ExitError::UnknownKey { .. } => ExitCode::from(3),
            ExitError::Other(_) => ExitCode::from(1),
        }
    }
}

/// Failure of a single request against the hosting API.
///
/// A well-formed but empty payload is never an `ApiError`; callers see it as
/// `None` or an empty list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("GET {path} returned HTTP {status}")]
    Status { status: u16, path: String },

    #[error("GET {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("GET {path} returned an unexpected body: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
