//! Canonical-title aggregation and the post-run refinement hooks.
//!
//! Distinct raw candidates ("the godfther", "Godfather") that the authority
//! resolved to one canonical title land in one bucket here. The canonical
//! spelling is always the authority's; nothing is merged locally.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use threadtally_common::{MentionCount, TallyError};

use crate::corpus::Corpus;
use crate::pipeline::TallyReport;

/// Group per-post label sets into ranked MentionCounts. A post carrying two
/// labels counts in both buckets; within one bucket it appears once.
/// Ranking: count descending, then mention ascending, so repeated runs over
/// the same corpus and ledger produce identical output.
pub fn aggregate(labels: &HashMap<String, Vec<String>>, corpus: &Corpus) -> Vec<MentionCount> {
    let mut buckets: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (uri, titles) in labels {
        for title in titles {
            buckets.entry(title).or_default().insert(uri);
        }
    }

    let mut mentions: Vec<MentionCount> = buckets
        .into_iter()
        .map(|(title, uris)| {
            let mut posts: Vec<_> = uris
                .into_iter()
                .filter_map(|uri| corpus.get(uri))
                .cloned()
                .collect();
            posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.uri.cmp(&b.uri)));
            MentionCount {
                mention: title.to_string(),
                count: posts.len(),
                posts,
            }
        })
        .collect();

    mentions.sort_by(|a, b| b.count.cmp(&a.count).then(a.mention.cmp(&b.mention)));
    mentions
}

/// Non-root posts that ended the run with no label, sorted by uri.
pub fn uncategorized(labels: &HashMap<String, Vec<String>>, corpus: &Corpus) -> Vec<String> {
    let mut uris: Vec<String> = corpus
        .posts()
        .filter(|p| !corpus.is_root(&p.uri))
        .filter(|p| labels.get(&p.uri).map(|l| l.is_empty()).unwrap_or(true))
        .map(|p| p.uri.clone())
        .collect();
    uris.sort();
    uris
}

/// Refinement hook: drop one canonical title from the report without
/// re-running validation. Posts left with no label move to uncategorized.
pub fn exclude(report: &mut TallyReport, corpus: &Corpus, canonical_title: &str) {
    for titles in report.labels.values_mut() {
        titles.retain(|t| t != canonical_title);
    }
    report.labels.retain(|_, titles| !titles.is_empty());
    report.mentions = aggregate(&report.labels, corpus);
    report.uncategorized = uncategorized(&report.labels, corpus);
}

/// Refinement hook: override one post's label set and re-aggregate. No
/// re-validation, no full re-run.
pub fn assign(
    report: &mut TallyReport,
    corpus: &Corpus,
    post_uri: &str,
    canonical_title: &str,
) -> Result<(), TallyError> {
    if !corpus.contains(post_uri) {
        return Err(TallyError::UnknownPost(post_uri.to_string()));
    }
    report
        .labels
        .insert(post_uri.to_string(), vec![canonical_title.to_string()]);
    report.mentions = aggregate(&report.labels, corpus);
    report.uncategorized = uncategorized(&report.labels, corpus);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, root_post};

    fn corpus() -> Corpus {
        Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://b", Some("at://r"), "The Godfather"),
            post("at://c", Some("at://b"), "yes!!"),
            post("at://d", Some("at://r"), "Heat"),
        ])
        .unwrap()
    }

    fn labels() -> HashMap<String, Vec<String>> {
        HashMap::from([
            ("at://b".to_string(), vec!["The Godfather".to_string()]),
            ("at://c".to_string(), vec!["The Godfather".to_string()]),
            ("at://d".to_string(), vec!["Heat".to_string()]),
        ])
    }

    #[test]
    fn test_aggregate_counts_and_ranks() {
        let corpus = corpus();
        let mentions = aggregate(&labels(), &corpus);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].mention, "The Godfather");
        assert_eq!(mentions[0].count, 2);
        assert_eq!(mentions[1].mention, "Heat");
        assert_eq!(mentions[1].count, 1);
    }

    #[test]
    fn test_aggregate_tie_breaks_by_mention() {
        let corpus = corpus();
        let labels = HashMap::from([
            ("at://b".to_string(), vec!["Heat".to_string()]),
            ("at://d".to_string(), vec!["Alien".to_string()]),
        ]);
        let mentions = aggregate(&labels, &corpus);
        assert_eq!(mentions[0].mention, "Alien");
        assert_eq!(mentions[1].mention, "Heat");
    }

    #[test]
    fn test_post_with_two_labels_counts_in_both_buckets() {
        let corpus = corpus();
        let labels = HashMap::from([(
            "at://b".to_string(),
            vec!["Alien".to_string(), "Blade Runner".to_string()],
        )]);
        let mentions = aggregate(&labels, &corpus);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].count, 1);
        assert_eq!(mentions[1].count, 1);
    }

    #[test]
    fn test_uncategorized_excludes_root_and_labeled() {
        let corpus = corpus();
        let mut labels = labels();
        labels.remove("at://d");
        let uris = uncategorized(&labels, &corpus);
        assert_eq!(uris, vec!["at://d".to_string()]);
    }
}
