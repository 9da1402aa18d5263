use std::fmt;

use chrono::NaiveDateTime;

use crate::config::{CommitConfig, ConfigSource};
use crate::entry::LogEntry;
use crate::error::{CommitError, RemoteError};
use crate::remote::{Connector, FileLookup, RepositoryBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Created,
    Updated,
}

impl CommitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitAction::Created => "created",
            CommitAction::Updated => "updated",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one successful invocation did. Renders as the trigger's response
/// body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub path: String,
    pub action: CommitAction,
    pub timestamp: String,
    pub commit_sha: Option<String>,
}

impl fmt::Display for CommitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Success: {} {} at {}.",
            self.path, self.action, self.timestamp
        )
    }
}

/// Writes the log entry for `now` to the configured path: an update carrying
/// the current version token when the file exists, a create when the remote
/// reports it missing. Any other existence-check failure aborts before a
/// write is attempted.
pub async fn commit_log(
    config: &CommitConfig,
    remote: &dyn RepositoryBackend,
    now: NaiveDateTime,
) -> Result<CommitReport, RemoteError> {
    let entry = LogEntry::at(now);
    let content = entry.content();

    let (action, info) = match remote.fetch_file(config.path()).await? {
        FileLookup::Found(existing) => {
            tracing::debug!(path = %existing.path, sha = %existing.sha, "log file exists");
            let info = remote
                .update_file(&existing.path, &content, &existing.sha, &entry.update_message())
                .await?;
            (CommitAction::Updated, info)
        }
        FileLookup::NotFound => {
            tracing::debug!(path = %config.path(), "log file not found");
            let info = remote
                .create_file(config.path(), &content, &entry.create_message())
                .await?;
            (CommitAction::Created, info)
        }
    };

    Ok(CommitReport {
        path: config.path().to_string(),
        action,
        timestamp: entry.timestamp().to_string(),
        commit_sha: info.commit_sha,
    })
}

/// One end-to-end invocation: configuration is read from `source` first, and
/// nothing is connected when it is incomplete.
pub async fn invoke(
    source: &dyn ConfigSource,
    connector: &dyn Connector,
    now: NaiveDateTime,
) -> Result<CommitReport, CommitError> {
    let config = CommitConfig::load(source)?;
    let remote = connector.connect(&config)?;
    tracing::debug!(repo = %config.repo(), path = %config.path(), "committing log entry");
    Ok(commit_log(&config, remote.as_ref(), now).await?)
}
