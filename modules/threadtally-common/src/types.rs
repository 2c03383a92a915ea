use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Post Types ---

/// Where a post entered the corpus from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSource {
    Thread,
    Quote,
    QuoteReply,
}

impl std::fmt::Display for PostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostSource::Thread => write!(f, "thread"),
            PostSource::Quote => write!(f, "quote"),
            PostSource::QuoteReply => write!(f, "quote_reply"),
        }
    }
}

/// One post in a reply thread. Posts reference each other by `uri` only;
/// the corpus index owns the records and nothing mutates them after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub uri: String,
    #[serde(default)]
    pub parent_uri: Option<String>,
    pub text: String,
    pub author_handle: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub repost_count: u32,
    #[serde(default)]
    pub reply_count: u32,
    pub source: PostSource,
    /// The prompt post that opened the thread. Never a candidate answer.
    #[serde(default)]
    pub is_root: bool,
    pub created_at: DateTime<Utc>,
}

// --- Validation Types ---

/// How sure the authority was about a verdict. Ordered for auditing;
/// never consulted by control flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// A stored validation verdict, keyed by the normalized candidate text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub key: String,
    pub validated: bool,
    #[serde(default)]
    pub canonical_title: Option<String>,
    pub confidence: Confidence,
    pub checked_at: DateTime<Utc>,
}

// --- Aggregation Types ---

/// One ranked bucket in the final tally: a canonical title, how many posts
/// referenced it, and which ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionCount {
    pub mention: String,
    pub count: usize,
    pub posts: Vec<Post>,
}

// --- Key Normalization ---

/// Normalize raw candidate text to a ledger key: case-fold, collapse interior
/// whitespace, strip leading/trailing punctuation from each token. Two raw
/// strings differing only in case or trivial punctuation map to one key.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| c.is_ascii_punctuation() && c != '&')
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_case_and_whitespace() {
        assert_eq!(normalize_key("The Matrix"), "the matrix");
        assert_eq!(normalize_key("the   matrix"), "the matrix");
        assert_eq!(normalize_key("  The Matrix  "), "the matrix");
    }

    #[test]
    fn test_normalize_key_strips_edge_punctuation() {
        assert_eq!(normalize_key("\"The Matrix\""), "the matrix");
        assert_eq!(normalize_key("The Matrix!!!"), "the matrix");
        assert_eq!(normalize_key("'Jaws',"), "jaws");
    }

    #[test]
    fn test_normalize_key_keeps_interior_punctuation() {
        assert_eq!(normalize_key("Spider-Man"), "spider-man");
        assert_eq!(normalize_key("Tom & Jerry"), "tom & jerry");
    }

    #[test]
    fn test_normalize_key_empty() {
        assert_eq!(normalize_key("   "), "");
        assert_eq!(normalize_key("!!!"), "");
    }
}
