//! Name similarity scoring for fuzzy matching

use std::collections::BTreeSet;

fn tokens(name: &str) -> BTreeSet<String> {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Jaccard index over lowercased word tokens
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);
    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}

/// Levenshtein distance normalised to a 0..=1 similarity
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Combined score: the stronger of the token and edit-distance signals
///
/// Token overlap catches word reordering ("virus Foo" / "Foo virus"), the
/// edit ratio catches spelling fixes inside a single token. Either one
/// alone is enough evidence once candidates are restricted to a shared
/// ancestor.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    token_jaccard(a, b).max(edit_ratio(a, b))
}
