//! Label inheritance: a post that named nothing itself takes the label set of
//! its nearest ancestor that did. Read-only walk over the corpus index.

use std::collections::HashMap;

use tracing::warn;

use crate::corpus::Corpus;

/// Walk the `parent_uri` chain until an ancestor with at least one direct
/// label, the root of the walk (missing or unindexed parent), or the depth
/// bound. Returns the inherited label set, empty when there is nothing to
/// inherit.
///
/// The depth bound is the corpus size: a malformed or self-referential
/// `parent_uri` must not hang the pipeline.
pub fn inherit(
    uri: &str,
    direct: &HashMap<String, Vec<String>>,
    corpus: &Corpus,
) -> Vec<String> {
    let max_depth = corpus.len();
    let mut current = uri;
    let mut depth = 0;

    loop {
        let Some(post) = corpus.get(current) else {
            return Vec::new();
        };
        let Some(parent_uri) = post.parent_uri.as_deref() else {
            return Vec::new();
        };
        if !corpus.contains(parent_uri) {
            // Orphan parent: the chain leaves the corpus.
            return Vec::new();
        }

        if let Some(labels) = direct.get(parent_uri) {
            if !labels.is_empty() {
                return labels.clone();
            }
        }

        depth += 1;
        if depth > max_depth {
            warn!(uri, "inheritance walk exceeded corpus depth, likely a parent cycle");
            return Vec::new();
        }
        current = parent_uri;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, root_post};

    fn direct(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(uri, labels)| {
                (
                    uri.to_string(),
                    labels.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_inherits_from_parent() {
        let corpus = Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://b", Some("at://r"), "The Godfather"),
            post("at://c", Some("at://b"), "yes!!"),
        ])
        .unwrap();
        let direct = direct(&[("at://b", &["The Godfather"])]);

        assert_eq!(inherit("at://c", &direct, &corpus), vec!["The Godfather"]);
    }

    #[test]
    fn test_inherits_from_nearest_labeled_ancestor() {
        let corpus = Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://b", Some("at://r"), "The Godfather"),
            post("at://c", Some("at://b"), "this"),
            post("at://d", Some("at://c"), "lol"),
        ])
        .unwrap();
        let direct = direct(&[("at://b", &["The Godfather"])]);

        assert_eq!(inherit("at://d", &direct, &corpus), vec!["The Godfather"]);
    }

    #[test]
    fn test_unlabeled_chain_yields_nothing() {
        let corpus = Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://c", Some("at://r"), "yes!!"),
        ])
        .unwrap();
        assert!(inherit("at://c", &HashMap::new(), &corpus).is_empty());
    }

    #[test]
    fn test_orphan_parent_yields_nothing() {
        let corpus = Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://c", Some("at://gone"), "yes!!"),
        ])
        .unwrap();
        let direct = direct(&[("at://gone", &["The Godfather"])]);
        assert!(inherit("at://c", &direct, &corpus).is_empty());
    }

    #[test]
    fn test_parent_cycle_terminates_empty() {
        let a = post("at://a", Some("at://b"), "lol");
        let b = post("at://b", Some("at://a"), "haha");
        let corpus = Corpus::from_posts(vec![root_post("at://r", "Favorite movie?"), a, b])
            .unwrap();

        assert!(inherit("at://a", &HashMap::new(), &corpus).is_empty());
    }
}
