//! Candidate extraction: pull plausible entity-name spans out of content
//! replies. Three independent rules; a post can yield several candidates.
//! Original casing is preserved — normalization happens at ledger-key time.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use threadtally_common::normalize_key;

const QUOTED_MIN_CHARS: usize = 2;
const QUOTED_MAX_CHARS: usize = 60;

/// Fallback rule bounds: the whole reply is treated as a title only if short.
const WHOLE_TEXT_MAX_CHARS: usize = 60;
const WHOLE_TEXT_MAX_WORDS: usize = 5;

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).expect("valid quoted-span pattern"));

/// Lowercase words allowed inside a Title-Case run without breaking it.
const CONNECTOR_WORDS: &[&str] = &[
    "for", "from", "with", "the", "and", "of", "a", "an", "in", "on", "at", "to", "is", "or",
    "not", "no", "it", "its", "my", "his", "her", "as", "so", "but", "by", "&", "vs", "v.",
];

/// Extract candidate entity-name strings from non-reaction post text.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    for span in quoted_spans(text) {
        candidates.push(span);
    }
    for run in title_case_runs(text) {
        candidates.push(run);
    }

    if candidates.is_empty() {
        if let Some(whole) = whole_text_candidate(text) {
            candidates.push(whole);
        }
    }

    // Collapse duplicates within one post by normalized key, first kept.
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            let key = normalize_key(c);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Rule 1: spans enclosed in straight or curly double quotes, 2–60 chars.
fn quoted_spans(text: &str) -> Vec<String> {
    QUOTED_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|span| {
            let len = span.chars().count();
            (QUOTED_MIN_CHARS..=QUOTED_MAX_CHARS).contains(&len)
        })
        .collect()
}

/// Rule 2: runs of Title-Case words, optionally joined by connector words,
/// with at least two capitalized tokens.
fn title_case_runs(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut runs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut capitalized_in_run = 0;

    let mut flush = |current: &mut Vec<&str>, capitalized_in_run: &mut usize| {
        // Trailing connectors don't belong to the title.
        while current
            .last()
            .map(|t| is_connector(t))
            .unwrap_or(false)
        {
            current.pop();
        }
        if *capitalized_in_run >= 2 && !current.is_empty() {
            runs.push(join_run(current));
        }
        current.clear();
        *capitalized_in_run = 0;
    };

    for token in tokens {
        // Quoted material belongs to the quoted-span rule, not this one.
        if token.contains(['"', '“', '”']) {
            flush(&mut current, &mut capitalized_in_run);
            continue;
        }
        if is_capitalized(token) {
            current.push(token);
            capitalized_in_run += 1;
        } else if !current.is_empty() && is_connector(token) {
            current.push(token);
        } else {
            flush(&mut current, &mut capitalized_in_run);
        }
    }
    flush(&mut current, &mut capitalized_in_run);

    runs
}

/// Rule 3 (fallback): a short reply starting with a capital letter is assumed
/// to be the title itself.
fn whole_text_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() > WHOLE_TEXT_MAX_CHARS {
        return None;
    }
    if trimmed.split_whitespace().count() > WHOLE_TEXT_MAX_WORDS {
        return None;
    }
    let first = trimmed.chars().next()?;
    if first.is_uppercase() {
        Some(trimmed.to_string())
    } else {
        None
    }
}

fn is_capitalized(token: &str) -> bool {
    token
        .trim_start_matches(|c: char| c.is_ascii_punctuation())
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

fn is_connector(token: &str) -> bool {
    let stripped = token
        .trim_matches(|c: char| c.is_ascii_punctuation() && c != '&' && c != '.')
        .to_lowercase();
    CONNECTOR_WORDS.contains(&stripped.as_str()) || stripped == "v."
}

/// Join run tokens and strip punctuation left hanging at the edges
/// ("The Godfather," → "The Godfather").
fn join_run(tokens: &[&str]) -> String {
    tokens
        .join(" ")
        .trim_matches(|c: char| c.is_ascii_punctuation() && c != '&')
        .to_string()
}
