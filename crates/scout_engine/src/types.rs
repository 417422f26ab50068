use std::fmt;

/// Failure of a call to the upstream Websets service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Maps an unsuccessful HTTP status to its failure kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            400 | 422 => FailureKind::Validation,
            404 => FailureKind::NotFound,
            408 | 504 => FailureKind::Timeout,
            _ => FailureKind::Upstream {
                status: Some(status),
            },
        };
        Self::new(kind, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The upstream service rejected the request parameters.
    Validation,
    NotFound,
    /// Transport failure or unexpected status from the upstream service.
    Upstream { status: Option<u16> },
    Timeout,
    /// Anything else, e.g. a response body that does not decode.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Upstream { status: Some(code) } => write!(f, "upstream error (status {code})"),
            FailureKind::Upstream { status: None } => write!(f, "upstream error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unknown => write!(f, "unknown error"),
        }
    }
}
