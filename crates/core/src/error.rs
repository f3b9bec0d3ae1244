use std::error::Error as StdError;

use taxagent_model::{AgentServiceError, ErrorKind, LifecycleState};
use thiserror::Error;

/// Errors returned by [`Agent`](crate::Agent).
#[derive(Debug, Error)]
pub enum Error {
    /// The remote service rejected a request.
    #[error("agent service error ({kind}): {source}")]
    Service {
        /// Classification of the failure.
        kind: ErrorKind,
        /// The error returned by the service implementation.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A turn was requested before the agent was registered.
    #[error("agent is not set up, call `setup` before `run`")]
    NotSetUp,

    /// The service kept asking for local function calls.
    #[error("turn did not finish within {0} steps")]
    MaxStepsExceeded(usize),

    /// A tool did not become active after being created or updated.
    #[error("tool `{name}` is not active (state: {state:?})")]
    ToolNotActive {
        /// Display name of the tool.
        name: String,
        /// Last observed lifecycle state.
        state: Option<LifecycleState>,
    },

    /// Two tools share the same display name.
    #[error("tool `{0}` is declared more than once")]
    DuplicateTool(String),
}

impl Error {
    /// Returns the service error kind, if the error came from the service.
    #[inline]
    pub fn service_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Service { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub(crate) fn service_error<E: AgentServiceError>(err: E) -> Error {
    Error::Service {
        kind: err.kind(),
        source: Box::new(err),
    }
}
