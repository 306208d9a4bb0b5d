use serde::Serialize;
use thiserror::Error;

/// Category of a failed search step, as surfaced to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The query was rejected locally (empty or too long).
    Validation,
    /// Transport failure: connect error, timeout, non-2xx status, non-JSON body.
    Network,
    /// The collaborator answered with JSON that is malformed or incomplete.
    Protocol,
    /// The parsing collaborator reported `success: false`.
    ParseFailed,
    /// The search collaborator reported `success: false`.
    SearchFailed,
    /// The route planner reported `success: false`.
    RouteFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::ParseFailed => write!(f, "parse failed"),
            ErrorKind::SearchFailed => write!(f, "search failed"),
            ErrorKind::RouteFailed => write!(f, "route failed"),
        }
    }
}

/// A classified failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
