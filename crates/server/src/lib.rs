use std::sync::Arc;

use chrono::NaiveDateTime;
use daylog_core::{
    invoke, CommitError, CommitReport, ConfigSource, Connector, GitHubConnector, ProcessEnv,
};

pub mod http_server;
pub mod settings;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup line naming the binary, its version and the git revision it was
/// built from.
pub fn banner() -> String {
    format!("daylog-server {VERSION} ({})", env!("DAYLOG_GIT_REV"))
}

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Everything one trigger needs: where invocation settings come from, how to
/// reach the repository, and what time it is.
#[derive(Clone)]
pub struct TriggerService {
    source: Arc<dyn ConfigSource>,
    connector: Arc<dyn Connector>,
    clock: Clock,
}

impl TriggerService {
    pub fn new(source: Arc<dyn ConfigSource>, connector: Arc<dyn Connector>) -> Self {
        Self {
            source,
            connector,
            clock: Arc::new(local_now),
        }
    }

    /// Production wiring: settings from the process environment, GitHub as
    /// the remote.
    pub fn github(connector: GitHubConnector) -> Self {
        Self::new(Arc::new(ProcessEnv), Arc::new(connector))
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        let clock: Clock = Arc::new(clock);
        self.clock = clock;
        self
    }

    pub async fn run_once(&self) -> Result<CommitReport, CommitError> {
        let now = (self.clock)();
        invoke(self.source.as_ref(), self.connector.as_ref(), now).await
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_names_binary_version_and_revision() {
        let banner = banner();
        assert!(banner.starts_with(&format!("daylog-server {VERSION} (")), "{banner}");
        assert!(banner.ends_with(')'), "{banner}");
        assert!(!env!("DAYLOG_GIT_REV").is_empty());
    }
}
