//! Writes a timestamped log line to a file in a GitHub repository, creating
//! the file when it is absent and replacing its content when it exists.

pub mod committer;
pub mod config;
pub mod entry;
pub mod error;
pub mod github;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod remote;

pub use committer::{commit_log, invoke, CommitAction, CommitReport};
pub use config::{AccessToken, CommitConfig, ConfigSource, ProcessEnv, RepoName};
pub use entry::LogEntry;
pub use error::{CommitError, ConfigError, RemoteError};
pub use github::{GitHubConnector, GitHubRepository, DEFAULT_GITHUB_API_URL};
pub use remote::{CommitInfo, Connector, FileLookup, RemoteFile, RepositoryBackend};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
