use anyhow::Result;
use async_trait::async_trait;

use threadtally_common::Confidence;

/// What the authority concluded about one candidate string.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub validated: bool,
    /// The authority's canonical spelling for the entity. Present only when
    /// `validated` is true.
    pub canonical_title: Option<String>,
    pub confidence: Confidence,
}

impl Verdict {
    pub fn rejected(confidence: Confidence) -> Self {
        Self {
            validated: false,
            canonical_title: None,
            confidence,
        }
    }

    pub fn confirmed(canonical_title: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            validated: true,
            canonical_title: Some(canonical_title.into()),
            confidence,
        }
    }
}

/// The external validation authority. Given a raw candidate string, decides
/// whether it names a real entity and, if so, what its canonical title is.
///
/// The answer for a given text is expected to be deterministic, so callers
/// may cache verdicts indefinitely and dedup concurrent calls per key.
#[async_trait]
pub trait ValidationAuthority: Send + Sync {
    async fn validate(&self, candidate: &str) -> Result<Verdict>;
}
