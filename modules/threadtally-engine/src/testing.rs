//! Test support: post builders and a scripted stub authority. Enabled for
//! unit tests and, via the `test-support` feature, for integration tests.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use authority_client::{ValidationAuthority, Verdict};
use threadtally_common::{normalize_key, Confidence, Post, PostSource};

/// A reply post with fixed engagement and timestamp.
pub fn post(uri: &str, parent_uri: Option<&str>, text: &str) -> Post {
    Post {
        uri: uri.to_string(),
        parent_uri: parent_uri.map(str::to_string),
        text: text.to_string(),
        author_handle: "fixture.test".to_string(),
        like_count: 0,
        repost_count: 0,
        reply_count: 0,
        source: PostSource::Thread,
        is_root: false,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    }
}

/// The thread prompt.
pub fn root_post(uri: &str, text: &str) -> Post {
    let mut p = post(uri, None, text);
    p.is_root = true;
    p
}

/// Scripted validation authority. Verdicts are keyed by normalized candidate
/// text; every call is logged so tests can assert call volume.
#[derive(Default)]
pub struct StubAuthority {
    verdicts: HashMap<String, Verdict>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a confirmed verdict for any text normalizing to `raw`'s key.
    pub fn confirm(mut self, raw: &str, canonical: &str, confidence: Confidence) -> Self {
        self.verdicts
            .insert(normalize_key(raw), Verdict::confirmed(canonical, confidence));
        self
    }

    pub fn reject(mut self, raw: &str) -> Self {
        self.verdicts
            .insert(normalize_key(raw), Verdict::rejected(Confidence::High));
        self
    }

    /// Make the authority unreachable for this candidate.
    pub fn fail_on(mut self, raw: &str) -> Self {
        self.failures.insert(normalize_key(raw));
        self
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ValidationAuthority for StubAuthority {
    async fn validate(&self, candidate: &str) -> Result<Verdict> {
        self.calls.lock().await.push(candidate.to_string());

        let key = normalize_key(candidate);
        if self.failures.contains(&key) {
            return Err(anyhow!("stub authority unreachable for '{candidate}'"));
        }
        Ok(self
            .verdicts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Verdict::rejected(Confidence::Medium)))
    }
}
