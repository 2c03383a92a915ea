//! The validation ledger: a durable `key → ValidationEntry` map gating the
//! external authority. Once a key has a verdict, the authority is never asked
//! about it again, in this run or any later one sharing the same store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use authority_client::ValidationAuthority;
use threadtally_common::{normalize_key, Confidence, ValidationEntry};

// ---------------------------------------------------------------------------
// LedgerStore — durable storage behind the in-memory map
// ---------------------------------------------------------------------------

/// Durable storage for validation entries. The engine only needs
/// load-all-at-start and upsert-one semantics.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<ValidationEntry>>;
    async fn upsert(&self, entry: &ValidationEntry) -> Result<()>;
}

/// JSON-lines file store. Appends on upsert; on load, the last line for a
/// given key wins. Corrupt lines are dropped with a warning, never fatal.
pub struct JsonLedger {
    path: PathBuf,
}

impl JsonLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl LedgerStore for JsonLedger {
    async fn load_all(&self) -> Result<Vec<ValidationEntry>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        let mut corrupt = 0u32;
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ValidationEntry>(line) {
                Ok(entry) if !entry.key.is_empty() => entries.push(entry),
                Ok(_) => corrupt += 1,
                Err(_) => corrupt += 1,
            }
        }
        if corrupt > 0 {
            warn!(
                path = %self.path.display(),
                corrupt,
                "dropped corrupt ledger lines"
            );
        }
        Ok(entries)
    }

    async fn upsert(&self, entry: &ValidationEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// In-memory store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, ValidationEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry, as a previous run would have.
    pub async fn seed(&self, entry: ValidationEntry) {
        self.entries.lock().await.insert(entry.key.clone(), entry);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn load_all(&self) -> Result<Vec<ValidationEntry>> {
        Ok(self.entries.lock().await.values().cloned().collect())
    }

    async fn upsert(&self, entry: &ValidationEntry) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ValidationLedger — the gate in front of the authority
// ---------------------------------------------------------------------------

/// How a candidate's entry was obtained, for the run's diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Already in the ledger; no authority call.
    Hit(ValidationEntry),
    /// Freshly validated and persisted.
    Fresh(ValidationEntry),
    /// Authority unreachable or malformed; rejected for this run only,
    /// nothing persisted.
    Failed(ValidationEntry),
}

impl Resolution {
    pub fn entry(&self) -> &ValidationEntry {
        match self {
            Resolution::Hit(e) | Resolution::Fresh(e) | Resolution::Failed(e) => e,
        }
    }
}

/// The loaded ledger, passed explicitly into every pipeline run. No
/// process-wide singleton; coherence across processes comes from the shared
/// durable store.
pub struct ValidationLedger {
    store: Arc<dyn LedgerStore>,
    entries: RwLock<HashMap<String, ValidationEntry>>,
}

impl ValidationLedger {
    /// Load all stored entries. Later duplicates of a key shadow earlier ones.
    pub async fn load(store: Arc<dyn LedgerStore>) -> Result<Self> {
        let mut entries = HashMap::new();
        for entry in store.load_all().await? {
            entries.insert(entry.key.clone(), entry);
        }
        debug!(entries = entries.len(), "validation ledger loaded");
        Ok(Self {
            store,
            entries: RwLock::new(entries),
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn get(&self, key: &str) -> Option<ValidationEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Resolve one candidate: normalize to its key, short-circuit on a stored
    /// verdict, otherwise ask the authority exactly once and persist the
    /// answer. An authority failure degrades to a rejected entry for this run
    /// and is never persisted, so a later run retries the key.
    ///
    /// Concurrent resolution of the same key is idempotent: the authority's
    /// answer for a given text is deterministic, so the last write wins.
    pub async fn resolve(
        &self,
        candidate: &str,
        authority: &dyn ValidationAuthority,
    ) -> Resolution {
        let key = normalize_key(candidate);

        if let Some(entry) = self.entries.read().await.get(&key) {
            return Resolution::Hit(entry.clone());
        }

        match authority.validate(candidate).await {
            Ok(verdict) => {
                let entry = ValidationEntry {
                    key: key.clone(),
                    validated: verdict.validated,
                    canonical_title: verdict.canonical_title,
                    confidence: verdict.confidence,
                    checked_at: Utc::now(),
                };
                self.entries
                    .write()
                    .await
                    .insert(key.clone(), entry.clone());
                if let Err(e) = self.store.upsert(&entry).await {
                    warn!(key = key.as_str(), error = %e, "failed to persist ledger entry");
                }
                Resolution::Fresh(entry)
            }
            Err(e) => {
                warn!(candidate, error = %e, "validation authority failed, rejecting candidate");
                let entry = ValidationEntry {
                    key: key.clone(),
                    validated: false,
                    canonical_title: None,
                    confidence: Confidence::Low,
                    checked_at: Utc::now(),
                };
                // In-memory only: the same run won't re-ask, the next run will.
                self.entries.write().await.insert(key, entry.clone());
                Resolution::Failed(entry)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubAuthority;

    fn entry(key: &str, validated: bool, title: Option<&str>) -> ValidationEntry {
        ValidationEntry {
            key: key.to_string(),
            validated,
            canonical_title: title.map(str::to_string),
            confidence: Confidence::High,
            checked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_hit_skips_authority() {
        let store = Arc::new(MemoryLedger::new());
        store
            .seed(entry("the matrix", true, Some("The Matrix")))
            .await;
        let ledger = ValidationLedger::load(store).await.unwrap();
        let authority = StubAuthority::new();

        let resolution = ledger.resolve("The Matrix", &authority).await;
        assert!(matches!(resolution, Resolution::Hit(_)));
        assert_eq!(authority.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_key_normalization_shares_entries() {
        let store = Arc::new(MemoryLedger::new());
        let ledger = ValidationLedger::load(store).await.unwrap();
        let authority = StubAuthority::new().confirm("The Matrix", "The Matrix", Confidence::High);

        let first = ledger.resolve("The Matrix", &authority).await;
        assert!(matches!(first, Resolution::Fresh(_)));

        let second = ledger.resolve("the   matrix", &authority).await;
        assert!(matches!(second, Resolution::Hit(_)));
        assert_eq!(authority.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_failure_rejects_without_persisting() {
        let store = Arc::new(MemoryLedger::new());
        let ledger = ValidationLedger::load(store.clone()).await.unwrap();
        let authority = StubAuthority::new().fail_on("Mystery Film");

        let resolution = ledger.resolve("Mystery Film", &authority).await;
        let Resolution::Failed(entry) = resolution else {
            panic!("expected Failed resolution");
        };
        assert!(!entry.validated);

        // Same run: no second authority call.
        let again = ledger.resolve("Mystery Film", &authority).await;
        assert!(matches!(again, Resolution::Hit(_)));
        assert_eq!(authority.call_count().await, 1);

        // Durable store never saw the failure.
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_ledger_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let store = JsonLedger::new(&path);
        store
            .upsert(&entry("the godfather", true, Some("The Godfather")))
            .await
            .unwrap();
        store.upsert(&entry("good one", false, None)).await.unwrap();

        let loaded = JsonLedger::new(&path).load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].canonical_title.as_deref(), Some("The Godfather"));
    }

    #[tokio::test]
    async fn test_json_ledger_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let store = Arc::new(JsonLedger::new(&path));
        store.upsert(&entry("dune", false, None)).await.unwrap();
        store
            .upsert(&entry("dune", true, Some("Dune")))
            .await
            .unwrap();

        let ledger = ValidationLedger::load(store).await.unwrap();
        let current = ledger.get("dune").await.unwrap();
        assert!(current.validated);
    }

    #[tokio::test]
    async fn test_json_ledger_drops_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let good = serde_json::to_string(&entry("jaws", true, Some("Jaws"))).unwrap();
        std::fs::write(&path, format!("{good}\nnot json at all\n{{\"key\":5}}\n")).unwrap();

        let loaded = JsonLedger::new(&path).load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "jaws");
    }

    #[tokio::test]
    async fn test_missing_ledger_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = JsonLedger::new(dir.path().join("absent.jsonl"))
            .load_all()
            .await
            .unwrap();
        assert!(loaded.is_empty());
    }
}
