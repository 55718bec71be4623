use thiserror::Error;

/// Problems with the caller's input. Reported before any network activity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("apiKey is required")]
    MissingApiKey,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl ParamsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ParamsError::InvalidParams(reason.into())
    }
}

/// Problems that can only be observed once the provider has been contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Non-success HTTP status; `message` is the provider's own explanation.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// HTTP status reported by the provider, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Provider { status, .. } => Some(*status),
            FetchError::Transport(_) | FetchError::InvalidResponse(_) => None,
        }
    }
}

/// Either failure path, for callers that do not need to tell them apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
