use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CommitConfig;
use crate::error::RemoteError;

/// Current state of a file in the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    /// Version token the remote requires to accept an update.
    pub sha: String,
}

/// Result of an existence check. Failures other than "no such file" are
/// returned as `Err(RemoteError)` alongside this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    Found(RemoteFile),
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub commit_sha: Option<String>,
}

#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    async fn fetch_file(&self, path: &str) -> Result<FileLookup, RemoteError>;

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError>;

    /// Replaces the file content. Must be rejected by the remote when `sha`
    /// is not the file's current version token.
    async fn update_file(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError>;
}

#[async_trait]
impl<T: RepositoryBackend + ?Sized> RepositoryBackend for Arc<T> {
    async fn fetch_file(&self, path: &str) -> Result<FileLookup, RemoteError> {
        (**self).fetch_file(path).await
    }

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        (**self).create_file(path, content, message).await
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        (**self).update_file(path, content, sha, message).await
    }
}

/// Builds the remote for one invocation. Connecting does no network I/O.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &CommitConfig) -> Result<Box<dyn RepositoryBackend>, RemoteError>;
}
