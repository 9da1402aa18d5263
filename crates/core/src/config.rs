//! Per-invocation configuration, read from the environment each time the
//! trigger fires.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const REPO_VAR: &str = "REPO_NAME";
pub const PATH_VAR: &str = "LOG_FILE_PATH";

pub const DEFAULT_LOG_FILE_PATH: &str = "daily_log.txt";

/// Where invocation settings come from. Production reads the process
/// environment; tests hand in a map.
pub trait ConfigSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Pre-issued bearer credential for the GitHub API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A repository identifier of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    owner: String,
    name: String,
}

impl RepoName {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepoName(s.to_owned());

        let mut parts = s.split('/');
        let owner = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let name = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitConfig {
    token: AccessToken,
    repo: RepoName,
    path: String,
}

impl CommitConfig {
    pub fn new(token: AccessToken, repo: RepoName, path: impl Into<String>) -> Self {
        Self {
            token,
            repo,
            path: path.into(),
        }
    }

    /// Reads the token, repository and log file path from `source`.
    ///
    /// An empty variable counts as unset. The token is checked before the
    /// repository so the reported variable is deterministic when both are
    /// missing.
    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let read = |name: &'static str| source.var(name).filter(|value| !value.is_empty());

        let token = read(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let repo = read(REPO_VAR).ok_or(ConfigError::Missing(REPO_VAR))?;
        let repo = RepoName::from_str(&repo)?;
        let path = read(PATH_VAR).unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string());
        check_log_path(&path)?;

        Ok(Self::new(AccessToken::new(token), repo, path))
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// `.` and `..` would be folded away when the request URL is built, so the
/// commit would land on a different file. No segments at all is the
/// repository root.
fn check_log_path(path: &str) -> Result<(), ConfigError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || segments.iter().any(|s| matches!(*s, "." | "..")) {
        return Err(ConfigError::InvalidLogPath(path.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn loads_all_three_settings() {
        let config = CommitConfig::load(&source(&[
            (TOKEN_VAR, "tok"),
            (REPO_VAR, "alice/log"),
            (PATH_VAR, "logs/today.txt"),
        ]))
        .unwrap();

        assert_eq!(config.token().as_str(), "tok");
        assert_eq!(config.repo().owner(), "alice");
        assert_eq!(config.repo().name(), "log");
        assert_eq!(config.path(), "logs/today.txt");
    }

    #[test]
    fn path_defaults_when_unset_or_empty() {
        let unset = CommitConfig::load(&source(&[(TOKEN_VAR, "tok"), (REPO_VAR, "alice/log")]))
            .unwrap();
        assert_eq!(unset.path(), DEFAULT_LOG_FILE_PATH);

        let empty = CommitConfig::load(&source(&[
            (TOKEN_VAR, "tok"),
            (REPO_VAR, "alice/log"),
            (PATH_VAR, ""),
        ]))
        .unwrap();
        assert_eq!(empty.path(), DEFAULT_LOG_FILE_PATH);
    }

    #[test]
    fn missing_token_is_reported() {
        let err = CommitConfig::load(&source(&[(REPO_VAR, "alice/log")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TOKEN_VAR));

        let err =
            CommitConfig::load(&source(&[(TOKEN_VAR, ""), (REPO_VAR, "alice/log")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TOKEN_VAR));
    }

    #[test]
    fn missing_repo_is_reported() {
        let err = CommitConfig::load(&source(&[(TOKEN_VAR, "tok")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(REPO_VAR));
    }

    #[test]
    fn token_is_checked_first() {
        let err = CommitConfig::load(&source(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TOKEN_VAR));
    }

    #[test]
    fn repo_name_needs_owner_and_name() {
        assert!(RepoName::from_str("alice/log").is_ok());
        for bad in ["alice", "/log", "alice/", "alice/log/extra", "/"] {
            assert_eq!(
                RepoName::from_str(bad),
                Err(ConfigError::InvalidRepoName(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn repo_name_round_trips_through_display() {
        let repo = RepoName::from_str("alice/log").unwrap();
        assert_eq!(repo.to_string(), "alice/log");
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let config = CommitConfig::load(&source(&[
            (TOKEN_VAR, "ghp_secret"),
            (REPO_VAR, "alice/log"),
        ]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"), "{debug}");
    }

    #[test]
    fn dot_segments_in_path_are_rejected() {
        for path in ["logs/../daily_log.txt", "./daily_log.txt", "..", "logs/.", "/"] {
            let err = CommitConfig::load(&source(&[
                (TOKEN_VAR, "tok"),
                (REPO_VAR, "alice/log"),
                (PATH_VAR, path),
            ]))
            .unwrap_err();
            assert_eq!(err, ConfigError::InvalidLogPath(path.to_string()));
        }
    }

    #[test]
    fn dots_inside_a_segment_are_fine() {
        let config = CommitConfig::load(&source(&[
            (TOKEN_VAR, "tok"),
            (REPO_VAR, "alice/log"),
            (PATH_VAR, "logs/..daily.log.txt"),
        ]))
        .unwrap();
        assert_eq!(config.path(), "logs/..daily.log.txt");
    }
}
