//! The two-phase tally pipeline.
//!
//! Phase 1 classifies every post, extracts candidates from content replies,
//! and resolves the corpus-wide unique candidate set through the validation
//! ledger (concurrently, up to a cap). Phase 2 starts only after every
//! resolution has landed: inheritance needs the complete direct-label map.

use std::collections::{BTreeMap, HashMap};

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use authority_client::ValidationAuthority;
use threadtally_common::{MentionCount, Post, TallyError, ValidationEntry};

use crate::canonical;
use crate::classify::is_reaction;
use crate::corpus::Corpus;
use crate::extract::extract_candidates;
use crate::inherit::inherit;
use crate::ledger::{Resolution, ValidationLedger};
use crate::stats::TallyStats;

pub struct PipelineOptions {
    /// Upper bound on in-flight authority calls during phase 1.
    pub validation_concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            validation_concurrency: 4,
        }
    }
}

/// The complete output of one run: per-post labels, ranked mention counts,
/// the posts nothing could be said about, and run diagnostics.
#[derive(Debug, Clone)]
pub struct TallyReport {
    pub labels: HashMap<String, Vec<String>>,
    pub mentions: Vec<MentionCount>,
    pub uncategorized: Vec<String>,
    pub stats: TallyStats,
}

impl TallyReport {
    /// Drop one canonical title from the tally without re-running validation.
    pub fn exclude(&mut self, corpus: &Corpus, canonical_title: &str) {
        canonical::exclude(self, corpus, canonical_title);
    }

    /// Override one post's label set and re-aggregate.
    pub fn assign(
        &mut self,
        corpus: &Corpus,
        post_uri: &str,
        canonical_title: &str,
    ) -> Result<(), TallyError> {
        canonical::assign(self, corpus, post_uri, canonical_title)
    }
}

/// Run the full pipeline over an indexed corpus. Per-candidate failures are
/// never fatal; the report is complete for the corpus it was given.
pub async fn run(
    corpus: &Corpus,
    ledger: &ValidationLedger,
    authority: &dyn ValidationAuthority,
    options: &PipelineOptions,
) -> Result<TallyReport, TallyError> {
    let mut stats = TallyStats {
        posts_seen: corpus.len() as u32,
        ..TallyStats::default()
    };

    // Deterministic post order regardless of index iteration order.
    let mut posts: Vec<&Post> = corpus.posts().collect();
    posts.sort_by(|a, b| a.uri.cmp(&b.uri));

    // --- Phase 1: classification, extraction, validation ---

    let mut per_post_candidates: Vec<(&str, Vec<String>)> = Vec::new();
    let mut unique: BTreeMap<String, String> = BTreeMap::new();

    for post in &posts {
        if corpus.is_root(&post.uri) {
            continue;
        }
        if is_reaction(&post.text) {
            stats.reactions += 1;
            continue;
        }
        stats.content_posts += 1;

        let candidates = extract_candidates(&post.text);
        if candidates.is_empty() {
            continue;
        }
        stats.candidates_extracted += candidates.len() as u32;
        for candidate in &candidates {
            let key = threadtally_common::normalize_key(candidate);
            unique.entry(key).or_insert_with(|| candidate.clone());
        }
        per_post_candidates.push((&post.uri, candidates));
    }
    stats.unique_keys = unique.len() as u32;

    info!(
        content_posts = stats.content_posts,
        reactions = stats.reactions,
        unique_keys = stats.unique_keys,
        "phase 1: resolving candidates"
    );

    let resolutions: Vec<(String, Resolution)> = stream::iter(unique)
        .map(|(key, raw)| async move {
            let resolution = ledger.resolve(&raw, authority).await;
            (key, resolution)
        })
        .buffer_unordered(options.validation_concurrency.max(1))
        .collect()
        .await;

    let mut verdicts: HashMap<String, ValidationEntry> = HashMap::new();
    for (key, resolution) in resolutions {
        match &resolution {
            Resolution::Hit(_) => stats.ledger_hits += 1,
            Resolution::Fresh(_) => stats.fresh_validations += 1,
            Resolution::Failed(_) => stats.validation_failures += 1,
        }
        verdicts.insert(key, resolution.entry().clone());
    }

    let mut direct: HashMap<String, Vec<String>> = HashMap::new();
    for (uri, candidates) in per_post_candidates {
        let mut titles: Vec<String> = Vec::new();
        for candidate in &candidates {
            let key = threadtally_common::normalize_key(candidate);
            if let Some(entry) = verdicts.get(&key) {
                if entry.validated {
                    if let Some(title) = &entry.canonical_title {
                        if !titles.contains(title) {
                            titles.push(title.clone());
                        }
                    }
                }
            }
        }
        if !titles.is_empty() {
            direct.insert(uri.to_string(), titles);
        }
    }
    stats.posts_with_direct_label = direct.len() as u32;

    // --- Phase 2: inheritance + aggregation (direct map is now complete) ---

    let mut labels = direct.clone();
    for post in &posts {
        if corpus.is_root(&post.uri) || direct.contains_key(&post.uri) {
            continue;
        }
        let inherited = inherit(&post.uri, &direct, corpus);
        if inherited.is_empty() {
            stats.posts_unlabeled += 1;
            debug!(uri = post.uri.as_str(), "no label and nothing to inherit");
        } else {
            stats.posts_inherited += 1;
            labels.insert(post.uri.clone(), inherited);
        }
    }

    let mentions = canonical::aggregate(&labels, corpus);
    let uncategorized = canonical::uncategorized(&labels, corpus);

    info!(
        mentions = mentions.len(),
        inherited = stats.posts_inherited,
        unlabeled = stats.posts_unlabeled,
        "phase 2: aggregation complete"
    );

    Ok(TallyReport {
        labels,
        mentions,
        uncategorized,
        stats,
    })
}
