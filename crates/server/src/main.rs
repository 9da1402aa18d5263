use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use daylog_core::GitHubConnector;
use daylog_server::{
    http_server,
    settings::{self, CliServerOptions},
    TriggerService,
};
use tracing_subscriber::EnvFilter;

/// HTTP trigger that commits a timestamped log line to a GitHub repository.
///
/// GITHUB_TOKEN, REPO_NAME and LOG_FILE_PATH are read from the environment on
/// every request, not at startup.
#[derive(Parser, Debug)]
#[command(name = "daylog-server", version = daylog_server::VERSION)]
struct Args {
    /// Address to bind the trigger endpoint to
    #[arg(long = "host", env = "DAYLOG_HOST", value_name = "HOST")]
    host: Option<String>,

    /// Port to bind the trigger endpoint to
    #[arg(long = "port", env = "PORT", value_name = "PORT")]
    port: Option<u16>,

    /// Base URL of the GitHub REST API
    #[arg(long = "api-url", env = "GITHUB_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Optional log filter (e.g. info, debug, daylog_core=trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Optional TOML file with [server] and [github] sections
    #[arg(long = "config", env = "DAYLOG_CONFIG", value_name = "FILE")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_level.as_deref());
    tracing::info!("{}", daylog_server::banner());

    let cli = CliServerOptions {
        host: args.host,
        port: args.port,
        api_url: args.api_url,
    };
    let file_config = settings::load_file_config(args.config_path.as_deref())?;
    let settings = settings::resolve_settings(&cli, file_config.as_ref());

    let connector = GitHubConnector::try_new(settings.api_url.clone())
        .with_context(|| format!("Unusable GitHub API URL {}", settings.api_url))?;

    http_server::serve(TriggerService::github(connector), &settings).await
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    let _ = builder.try_init();
}
