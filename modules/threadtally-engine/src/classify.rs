//! Reaction classification: is a post's text a genuine content reply, or a
//! content-free reaction ("lol", "this", "🔥") that should inherit its
//! parent's label?
//!
//! The classifier is an ordered, first-match-wins table of named rules so
//! each rule can be tested and extended on its own.

use std::sync::LazyLock;

use regex::Regex;

/// Replies shorter than this are checked against the reaction patterns.
const REACTION_PATTERN_MAX_CHARS: usize = 50;

/// Replies at or under this length with no capitalized word of 3+ letters
/// are too short to plausibly name a title.
const SHORT_REPLY_MAX_CHARS: usize = 15;

static REACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Agreement / acknowledgment
        r"(?i)^(this|same|so true|facts|fr|real|mood|agreed?|seconded|\+1)[.!?\s]*$",
        r"(?i)^(yes+|yep|yeah+|yup|exactly|absolutely|100%|correct)[.!?\s]*$",
        r"(?i)^(this one|this right here|came here to say this|beat me to it)[.!?\s]*$",
        r"(?i)^(thanks?|thank you|ty|omg|oh wow|wow|nice|based|banger)[.!?\s]*$",
        // Laughter
        r"(?i)^(lo+l+|l+m+a+o+|ha(ha)+h?|he(he)+h?|lmfao+|rofl|dead|crying|😂+|💀+)[.!?\s]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid reaction pattern"))
    .collect()
});

static CAPITALIZED_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Za-z]{2,}").expect("valid capitalized-word pattern"));

/// One entry in the classification table.
pub struct ReactionRule {
    pub name: &'static str,
    applies: fn(&str) -> bool,
}

/// Ordered rule table; the first rule that applies decides.
pub static REACTION_RULES: &[ReactionRule] = &[
    ReactionRule {
        name: "empty",
        applies: |text| text.trim().is_empty(),
    },
    ReactionRule {
        name: "short-reaction-pattern",
        applies: |text| {
            let trimmed = text.trim();
            trimmed.chars().count() < REACTION_PATTERN_MAX_CHARS
                && (REACTION_PATTERNS.iter().any(|re| re.is_match(trimmed))
                    // Emoji-only / punctuation-only replies carry no text.
                    || !trimmed.chars().any(|c| c.is_alphanumeric()))
        },
    },
    ReactionRule {
        name: "short-no-title-case",
        applies: |text| {
            let trimmed = text.trim();
            trimmed.chars().count() <= SHORT_REPLY_MAX_CHARS
                && !CAPITALIZED_WORD_RE.is_match(trimmed)
        },
    },
];

/// Name of the first rule that matched, if any. `None` means content reply.
pub fn classify_rule(text: &str) -> Option<&'static str> {
    REACTION_RULES
        .iter()
        .find(|rule| (rule.applies)(text))
        .map(|rule| rule.name)
}

/// Whether this text is a content-free reaction. Pure function of the text.
pub fn is_reaction(text: &str) -> bool {
    classify_rule(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rule() {
        assert_eq!(classify_rule(""), Some("empty"));
        assert_eq!(classify_rule("   \n\t"), Some("empty"));
    }

    #[test]
    fn test_agreement_patterns() {
        assert_eq!(classify_rule("this"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("THIS."), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("yes!!"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("so true"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("came here to say this"), Some("short-reaction-pattern"));
    }

    #[test]
    fn test_laughter_patterns() {
        assert_eq!(classify_rule("lol"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("LMAOOO"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("hahaha"), Some("short-reaction-pattern"));
    }

    #[test]
    fn test_emoji_only_is_reaction() {
        assert_eq!(classify_rule("🔥"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("🔥🔥🔥"), Some("short-reaction-pattern"));
        assert_eq!(classify_rule("!!!"), Some("short-reaction-pattern"));
    }

    #[test]
    fn test_short_without_title_case_is_reaction() {
        assert_eq!(classify_rule("ok then"), Some("short-no-title-case"));
        assert_eq!(classify_rule("hm, why"), Some("short-no-title-case"));
    }

    #[test]
    fn test_short_with_title_case_is_content() {
        // Short, but plausibly a title.
        assert_eq!(classify_rule("Jaws"), None);
        assert_eq!(classify_rule("The Thing"), None);
    }

    #[test]
    fn test_long_text_is_content() {
        assert_eq!(classify_rule("honestly i like so much stuff"), None);
        assert_eq!(
            classify_rule("The Godfather, easily. Nothing else comes close."),
            None
        );
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // "this" matches both the pattern rule and the short-no-title-case
        // rule; the earlier one must decide.
        assert_eq!(classify_rule("this"), Some("short-reaction-pattern"));
    }
}
