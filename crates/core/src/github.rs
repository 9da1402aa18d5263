//! Client for the GitHub REST "repository contents" API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::config::{AccessToken, CommitConfig, RepoName};
use crate::error::RemoteError;
use crate::remote::{CommitInfo, Connector, FileLookup, RemoteFile, RepositoryBackend};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";

pub fn user_agent() -> String {
    format!("daylog/{}", crate::VERSION)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Entry(ContentsEntry),
    Listing(Vec<IgnoredAny>),
}

#[derive(Deserialize)]
struct ContentsEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    sha: String,
}

#[derive(Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutContentsResponse {
    commit: Option<CommitRef>,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GitHubRepository {
    client: Client,
    api_url: Url,
    token: AccessToken,
    repo: RepoName,
}

impl GitHubRepository {
    pub fn with_client(
        client: Client,
        api_url: &str,
        token: AccessToken,
        repo: RepoName,
    ) -> Result<Self, RemoteError> {
        let api_url = Url::parse(api_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if api_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(api_url.to_string()));
        }

        Ok(Self {
            client,
            api_url,
            token,
            repo,
        })
    }

    /// `{api}/repos/{owner}/{name}/contents/{path}`, with every segment of
    /// `path` pushed separately so it gets percent-encoded on its own.
    fn contents_url(&self, path: &str) -> Result<Url, RemoteError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(["repos", self.repo.owner(), self.repo.name(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.as_str())
            .header(ACCEPT, GITHUB_JSON)
            .header(USER_AGENT, user_agent())
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn put_contents(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        let url = self.contents_url(path)?;
        let body = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            sha,
        };

        let response = self.request(Method::PUT, url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let written: PutContentsResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Schema(e.to_string()))?;

        Ok(CommitInfo {
            commit_sha: written.commit.map(|commit| commit.sha),
        })
    }
}

#[async_trait]
impl RepositoryBackend for GitHubRepository {
    async fn fetch_file(&self, path: &str) -> Result<FileLookup, RemoteError> {
        let url = self.contents_url(path)?;
        let response = self.request(Method::GET, url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FileLookup::NotFound);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let entry = match response
            .json::<ContentsResponse>()
            .await
            .map_err(|e| RemoteError::Schema(e.to_string()))?
        {
            ContentsResponse::Entry(entry) => entry,
            ContentsResponse::Listing(entries) => {
                return Err(RemoteError::Schema(format!(
                    "{path} is a directory with {} entries",
                    entries.len()
                )))
            }
        };

        if entry.kind != "file" {
            return Err(RemoteError::Schema(format!(
                "{path} is a {}, not a file",
                entry.kind
            )));
        }

        Ok(FileLookup::Found(RemoteFile {
            path: entry.path,
            sha: entry.sha,
        }))
    }

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        self.put_contents(path, content, None, message).await
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        self.put_contents(path, content, Some(sha), message).await
    }
}

async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return RemoteError::from(e),
    };

    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|parsed| parsed.message)
        .ok()
        .filter(|message| !message.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|raw| !raw.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    RemoteError::from_status(status, message)
}

/// Connects invocations to GitHub, sharing one HTTP client across them.
#[derive(Clone)]
pub struct GitHubConnector {
    client: Client,
    api_url: String,
}

impl GitHubConnector {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Like [`GitHubConnector::new`], but rejects an API URL that could never
    /// be connected to.
    pub fn try_new(api_url: impl Into<String>) -> Result<Self, RemoteError> {
        let api_url = api_url.into();
        let parsed = Url::parse(&api_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(api_url));
        }
        Ok(Self::new(api_url))
    }
}

impl Connector for GitHubConnector {
    fn connect(&self, config: &CommitConfig) -> Result<Box<dyn RepositoryBackend>, RemoteError> {
        let repo = GitHubRepository::with_client(
            self.client.clone(),
            &self.api_url,
            config.token().clone(),
            config.repo().clone(),
        )?;
        Ok(Box::new(repo))
    }
}
