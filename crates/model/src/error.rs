use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credentials were rejected or lack a required permission.
    Unauthorized,
    /// The addressed resource does not exist.
    NotFound,
    /// The request is malformed or conflicts with the resource state.
    InvalidRequest,
    /// The service is rate limited.
    RateLimitExceeded,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Classifies an HTTP status code returned by the service.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400 | 409 | 412 | 422 => Self::InvalidRequest,
            429 => Self::RateLimitExceeded,
            _ => Self::Other,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unauthorized => write!(f, "Unauthorized"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidRequest => write!(f, "Invalid request"),
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::Other => write!(f, "Other"),
        }
    }
}
