//! In-memory repository with GitHub's write semantics, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};

use crate::config::CommitConfig;
use crate::error::RemoteError;
use crate::remote::{CommitInfo, Connector, FileLookup, RemoteFile, RepositoryBackend};

#[derive(Default)]
pub struct MemoryRepository {
    files: Mutex<HashMap<String, String>>,
    fetch_failure: Mutex<Option<RemoteError>>,
    write_failure: Mutex<Option<RemoteError>>,
    fetches: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    commits: AtomicUsize,
}

pub fn content_sha(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, content: &str) -> Self {
        let repo = Self::new();
        repo.files().insert(path.to_string(), content.to_string());
        repo
    }

    /// Makes every following existence check fail with `error`.
    pub fn fail_fetch_with(&self, error: RemoteError) {
        *lock(&self.fetch_failure) = Some(error);
    }

    /// Makes every following create or update fail with `error`.
    pub fn fail_writes_with(&self, error: RemoteError) {
        *lock(&self.write_failure) = Some(error);
    }

    /// Changes a file behind the committer's back, as another actor would.
    pub fn overwrite(&self, path: &str, content: &str) {
        self.files().insert(path.to_string(), content.to_string());
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files().get(path).cloned()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.fetches() + self.creates() + self.updates()
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, String>> {
        lock(&self.files)
    }

    fn injected_write_failure(&self) -> Option<RemoteError> {
        lock(&self.write_failure).clone()
    }

    fn committed(&self) -> CommitInfo {
        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        CommitInfo {
            commit_sha: Some(format!("commit-{n}")),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RepositoryBackend for MemoryRepository {
    async fn fetch_file(&self, path: &str) -> Result<FileLookup, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.fetch_failure).clone() {
            return Err(error);
        }

        Ok(match self.files().get(path) {
            Some(content) => FileLookup::Found(RemoteFile {
                path: path.to_string(),
                sha: content_sha(content),
            }),
            None => FileLookup::NotFound,
        })
    }

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        _message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.injected_write_failure() {
            return Err(error);
        }

        let mut files = self.files();
        if files.contains_key(path) {
            return Err(RemoteError::from_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid request.\n\n\"sha\" wasn't supplied.",
            ));
        }
        files.insert(path.to_string(), content.to_string());
        drop(files);

        Ok(self.committed())
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        _message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.injected_write_failure() {
            return Err(error);
        }

        let mut files = self.files();
        let current = files
            .get(path)
            .map(|existing| content_sha(existing))
            .ok_or_else(|| RemoteError::from_status(StatusCode::NOT_FOUND, "Not Found"))?;
        if current != sha {
            return Err(RemoteError::from_status(
                StatusCode::CONFLICT,
                format!("{path} does not match {sha}"),
            ));
        }
        files.insert(path.to_string(), content.to_string());
        drop(files);

        Ok(self.committed())
    }
}

/// Hands out the same [`MemoryRepository`] to every invocation and records
/// the configurations it was asked to connect with.
#[derive(Default)]
pub struct MemoryConnector {
    repo: Arc<MemoryRepository>,
    connects: Mutex<Vec<CommitConfig>>,
}

impl MemoryConnector {
    pub fn new(repo: Arc<MemoryRepository>) -> Self {
        Self {
            repo,
            connects: Mutex::default(),
        }
    }

    pub fn repo(&self) -> &Arc<MemoryRepository> {
        &self.repo
    }

    pub fn connects(&self) -> Vec<CommitConfig> {
        lock(&self.connects).clone()
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, config: &CommitConfig) -> Result<Box<dyn RepositoryBackend>, RemoteError> {
        lock(&self.connects).push(config.clone());
        Ok(Box::new(Arc::clone(&self.repo)))
    }
}
