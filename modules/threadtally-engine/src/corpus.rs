use std::collections::HashMap;

use tracing::debug;

use threadtally_common::{Post, PostSource, TallyError};

/// The immutable post index for one run: `uri → Post` plus the identified
/// root. Posts reference each other by uri only; nothing mutates the index
/// after construction.
#[derive(Debug)]
pub struct Corpus {
    posts: HashMap<String, Post>,
    root_uri: String,
}

impl Corpus {
    /// Index a materialized post collection and identify the root.
    ///
    /// The root is the post explicitly flagged `is_root`; failing that, the
    /// single thread post whose parent is absent from the corpus. An empty
    /// corpus or an unidentifiable root is fatal.
    pub fn from_posts(posts: Vec<Post>) -> Result<Self, TallyError> {
        if posts.is_empty() {
            return Err(TallyError::EmptyCorpus);
        }

        let index: HashMap<String, Post> =
            posts.into_iter().map(|p| (p.uri.clone(), p)).collect();

        let root_uri = identify_root(&index)?;
        debug!(root_uri = root_uri.as_str(), posts = index.len(), "corpus indexed");

        Ok(Self {
            posts: index,
            root_uri,
        })
    }

    pub fn get(&self, uri: &str) -> Option<&Post> {
        self.posts.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.posts.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    pub fn is_root(&self, uri: &str) -> bool {
        uri == self.root_uri
    }

    /// All posts, in no particular order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }
}

fn identify_root(index: &HashMap<String, Post>) -> Result<String, TallyError> {
    // Explicit flag wins.
    let mut flagged = index.values().filter(|p| p.is_root);
    if let Some(root) = flagged.next() {
        if flagged.next().is_some() {
            return Err(TallyError::NoRoot);
        }
        return Ok(root.uri.clone());
    }

    // Otherwise: thread posts whose parent is not in the corpus. Quote posts
    // are parentless too, so only the thread itself can supply the prompt.
    let mut orphaned_thread_posts: Vec<&Post> = index
        .values()
        .filter(|p| {
            p.source == PostSource::Thread
                && p.parent_uri
                    .as_deref()
                    .map(|parent| !index.contains_key(parent))
                    .unwrap_or(true)
        })
        .collect();

    match orphaned_thread_posts.len() {
        1 => Ok(orphaned_thread_posts.remove(0).uri.clone()),
        _ => Err(TallyError::NoRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, root_post};

    #[test]
    fn test_empty_corpus_is_fatal() {
        let err = Corpus::from_posts(vec![]).unwrap_err();
        assert!(matches!(err, TallyError::EmptyCorpus));
    }

    #[test]
    fn test_flagged_root_wins() {
        let corpus = Corpus::from_posts(vec![
            root_post("at://r", "Favorite movie?"),
            post("at://b", Some("at://r"), "The Godfather"),
        ])
        .unwrap();
        assert_eq!(corpus.root_uri(), "at://r");
        assert!(corpus.is_root("at://r"));
        assert!(!corpus.is_root("at://b"));
    }

    #[test]
    fn test_parentless_thread_post_is_root() {
        let corpus = Corpus::from_posts(vec![
            post("at://r", None, "Favorite movie?"),
            post("at://b", Some("at://r"), "The Godfather"),
        ])
        .unwrap();
        assert_eq!(corpus.root_uri(), "at://r");
    }

    #[test]
    fn test_ambiguous_root_is_fatal() {
        let err = Corpus::from_posts(vec![
            post("at://a", None, "Favorite movie?"),
            post("at://b", None, "Favorite song?"),
        ])
        .unwrap_err();
        assert!(matches!(err, TallyError::NoRoot));
    }
}
