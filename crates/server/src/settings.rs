use std::{fs, path::Path};

use anyhow::{Context, Result};
use daylog_core::DEFAULT_GITHUB_API_URL;
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Process-level settings. Invocation settings (token, repository, path) are
/// not here: they are read from the environment on every trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub api_url: String,
}

#[derive(Debug, Default, Clone)]
pub struct CliServerOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: Option<FileServerConfig>,
    #[serde(default)]
    pub github: Option<FileGitHubConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileGitHubConfig {
    pub api_url: Option<String>,
}

pub fn load_file_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };

    if !path.exists() {
        tracing::warn!("config file {} does not exist, using defaults", path.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config {}", path.display()))?;

    Ok(Some(parsed))
}

/// Flags (and their env fallbacks) win over the config file, which wins over
/// the built-in defaults.
pub fn resolve_settings(cli: &CliServerOptions, file_cfg: Option<&FileConfig>) -> ServerSettings {
    let server = file_cfg.and_then(|cfg| cfg.server.as_ref());
    let github = file_cfg.and_then(|cfg| cfg.github.as_ref());

    let host = cli
        .host
        .clone()
        .or_else(|| server.and_then(|s| s.host.clone()))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = cli
        .port
        .or_else(|| server.and_then(|s| s.port))
        .unwrap_or(DEFAULT_PORT);

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| github.and_then(|g| g.api_url.clone()))
        .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

    ServerSettings {
        host,
        port,
        api_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_flags_or_file() {
        let settings = resolve_settings(&CliServerOptions::default(), None);
        assert_eq!(
            settings,
            ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                api_url: "https://api.github.com".to_string(),
            }
        );
    }

    #[test]
    fn file_config_overrides_defaults() {
        let file_cfg = FileConfig {
            server: Some(FileServerConfig {
                host: Some("127.0.0.1".to_string()),
                port: Some(9000),
            }),
            github: Some(FileGitHubConfig {
                api_url: Some("https://ghe.example.com/api/v3".to_string()),
            }),
        };

        let settings = resolve_settings(&CliServerOptions::default(), Some(&file_cfg));

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn cli_overrides_file_config() {
        let file_cfg = FileConfig {
            server: Some(FileServerConfig {
                host: Some("127.0.0.1".to_string()),
                port: Some(9000),
            }),
            github: None,
        };
        let cli = CliServerOptions {
            port: Some(3000),
            ..Default::default()
        };

        let settings = resolve_settings(&cli, Some(&file_cfg));

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.api_url, "https://api.github.com");
    }

    #[test]
    fn toml_file_is_loaded() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("daylog.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[github]\napi_url = \"http://localhost:4010\"\n",
        )
        .expect("write config");

        let file_cfg = load_file_config(Some(path.as_path()))
            .expect("load config")
            .expect("config present");
        let settings = resolve_settings(&CliServerOptions::default(), Some(&file_cfg));

        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.api_url, "http://localhost:4010");
    }

    #[test]
    fn missing_file_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let absent = dir.path().join("absent.toml");
        let loaded = load_file_config(Some(absent.as_path())).expect("load");
        assert!(loaded.is_none());
        assert!(load_file_config(None).expect("load").is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("daylog.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").expect("write config");

        let err = load_file_config(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"), "{err}");
    }
}
