//! The thread-fetching seam. Fetching a live thread (network, auth, quote
//! traversal) lives outside the engine; the engine only needs something that
//! hands it a materialized post collection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use threadtally_common::Post;

#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// Return every post of the thread rooted at `root_uri`, root included.
    async fn fetch_thread(&self, root_uri: &str) -> Result<Vec<Post>>;
}

/// Loads a thread from a JSON fixture file: an array of Post records.
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ThreadSource for FixtureSource {
    async fn fetch_thread(&self, _root_uri: &str) -> Result<Vec<Post>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading fixture {}", self.path.display()))?;
        let posts: Vec<Post> = serde_json::from_str(&json)
            .with_context(|| format!("parsing fixture {}", self.path.display()))?;
        Ok(posts)
    }
}
