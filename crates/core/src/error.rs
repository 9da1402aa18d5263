use reqwest::StatusCode;
use thiserror::Error;

/// Invocation configuration could not be assembled from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variables not configured: {0} is not set")]
    Missing(&'static str),
    #[error("environment variables not configured: REPO_NAME must look like owner/name, got {0:?}")]
    InvalidRepoName(String),
    #[error("environment variables not configured: LOG_FILE_PATH must name a file without '.' or '..' segments, got {0:?}")]
    InvalidLogPath(String),
}

/// Any failure talking to the hosted repository API. A missing file is not an
/// error; see [`crate::FileLookup::NotFound`].
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("could not authenticate against the GitHub API: {0}")]
    Unauthenticated(String),
    #[error("could not authorize against the GitHub API: {0}")]
    Unauthorized(String),
    #[error("GitHub API returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("GitHub API returned an unexpected schema: {0}")]
    Schema(String),
    #[error("request to the GitHub API failed: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthenticated(message)
        } else if status == StatusCode::FORBIDDEN {
            Self::Unauthorized(message)
        } else {
            Self::Status { status, message }
        }
    }

    /// HTTP status the remote answered with, if the failure came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthenticated(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Unauthorized(_) => Some(StatusCode::FORBIDDEN),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(code) => Self::from_status(code, e.to_string()),
            None if e.is_decode() => Self::Schema(e.to_string()),
            None => Self::Transport(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
