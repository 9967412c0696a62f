//! Per-entry predicate: does a query term describe this entry?
//!
//! Two comparison modes are combined. Containment catches exact fragments no
//! matter how the source decorated the title; the partial similarity ratio
//! catches fragments with small typos or punctuation differences.

use strsim::levenshtein;

use crate::{entry::CatalogEntry, normalize::fold};

/// Case-insensitive, normalized substring test.
pub fn contains(entry: &CatalogEntry, query: &str) -> bool {
    entry.folded_title().contains(&fold(query))
}

/// Best similarity in `[0, 1]` between the shorter string and any window of
/// the longer one of the same length.
pub fn similarity(entry: &CatalogEntry, query: &str) -> f64 {
    partial_ratio(entry.folded_title(), &fold(query))
}

/// `contains` or `similarity >= threshold`. Containment wins regardless of
/// the threshold.
pub fn matches(entry: &CatalogEntry, query: &str, threshold: f64) -> bool {
    let query = fold(query);
    let title = entry.folded_title();
    title.contains(&query) || partial_ratio(title, &query) >= threshold
}

/// Partial ratio of two already folded strings.
///
/// Windows slide over characters, not bytes, so multi-byte titles are
/// compared glyph by glyph. The score is the exact ratio and is never rounded
/// to a whole percentage.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0.0;
    }

    let short_str: String = short.iter().collect();
    let width = short.len();
    let mut best = 0.0_f64;

    for window in long.windows(width) {
        let window: String = window.iter().collect();
        let distance = levenshtein(&short_str, &window);
        let score = 1.0 - distance as f64 / width as f64;
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }

    best
}
