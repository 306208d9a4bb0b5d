use talkmap_core::{ErrorInfo, ErrorKind};
use thiserror::Error;

/// Which collaborator endpoint produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Parse,
    Search,
    Route,
}

impl Endpoint {
    fn rejection_kind(self) -> ErrorKind {
        match self {
            Endpoint::Parse => ErrorKind::ParseFailed,
            Endpoint::Search => ErrorKind::SearchFailed,
            Endpoint::Route => ErrorKind::RouteFailed,
        }
    }

    fn default_rejection_message(self) -> &'static str {
        match self {
            Endpoint::Parse => "解析失败",
            Endpoint::Search => "搜索失败",
            Endpoint::Route => "无法规划路线",
        }
    }
}

/// Errors returned by the collaborator HTTP clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected locally; nothing was sent.
    #[error("invalid query: {0}")]
    Validation(String),

    /// Network or TLS failure from the underlying HTTP client, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    UnexpectedStatus {
        status: u16,
        url: String,
        /// `detail` string from an error body, when the server sent one.
        detail: Option<String>,
    },

    /// The body was not JSON at all.
    #[error("response from {context} is not JSON: {source}")]
    InvalidBody {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but did not match the expected envelope.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context} response is missing required field `{field}`")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    #[error("{context} response has invalid `{field}`: {reason}")]
    InvalidField {
        context: &'static str,
        field: &'static str,
        reason: String,
    },

    /// The collaborator answered `success: false`.
    #[error("collaborator reported failure: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ClientError {
    /// The [`ErrorKind`] this error maps to when raised by `endpoint`.
    #[must_use]
    pub fn kind(&self, endpoint: Endpoint) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Http(_)
            | ClientError::UnexpectedStatus { .. }
            | ClientError::InvalidBody { .. }
            | ClientError::InvalidBaseUrl { .. } => ErrorKind::Network,
            ClientError::Deserialize { .. }
            | ClientError::MissingField { .. }
            | ClientError::InvalidField { .. } => ErrorKind::Protocol,
            ClientError::Rejected { .. } => endpoint.rejection_kind(),
        }
    }

    /// Converts into the UI-facing error shape.
    ///
    /// Collaborator rejections carry the collaborator's own message; every
    /// other error carries its `Display` text.
    #[must_use]
    pub fn classify(self, endpoint: Endpoint) -> ErrorInfo {
        let kind = self.kind(endpoint);
        let message = match self {
            ClientError::Rejected { message } => message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| endpoint.default_rejection_message().to_owned()),
            ClientError::Validation(reason) => reason,
            other => other.to_string(),
        };
        ErrorInfo::new(kind, message)
    }
}
