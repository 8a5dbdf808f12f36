//! Similarity scoring for fuzzy search.
//!
//! This module provides the pure match-confidence function used by the query
//! engine to rank records against a user's free-text query. Scores are on a
//! 0-100 scale; the query engine layers its own forced-exact value on top
//! (see [`crate::query::EXACT_MATCH_SCORE`]).

/// Computes a 0-100 match confidence between a query and a candidate string.
///
/// Case-insensitive. If every whitespace-delimited token of the query occurs
/// as a substring of the candidate, the match is perfect (100) - "all your
/// words appear" beats raw edit distance. Otherwise the score is a partial
/// ratio: the best-aligned substring overlap between the two strings.
///
/// Pure and deterministic; an empty or whitespace-only query scores 0.
#[must_use]
pub fn score(query: &str, candidate: &str) -> u8 {
    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    if query.split_whitespace().next().is_none() {
        return 0;
    }

    if query.split_whitespace().all(|word| candidate.contains(word)) {
        return 100;
    }

    partial_ratio(&query, &candidate)
}

/// Best-aligned substring similarity, scaled to 0-100.
///
/// Slides a window the length of the shorter string across the longer one
/// and keeps the best normalized Levenshtein similarity seen. Near-substring
/// matches score high, unrelated strings score low.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };
    let needle: String = shorter.iter().collect();
    let window = shorter.len();

    let mut best = 0.0_f64;
    for start in 0..=(longer.len() - window) {
        let haystack: String = longer[start..start + window].iter().collect();
        let similarity = strsim::normalized_levenshtein(&needle, &haystack);
        if similarity > best {
            best = similarity;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round().min(100.0) as u8
}
