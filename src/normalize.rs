//! Text canonicalization shared by entries and queries.
//!
//! Titles scraped from different dumps often look identical but differ in
//! their code points: `ポ` may be stored as a single character or as `ホ`
//! followed by a combining mark, and full-width `Ｖｏｌ．６` shows up next to
//! `Vol.6`. NFKC (compatibility decomposition, then canonical composition)
//! maps all of those to one byte sequence.

use unicode_normalization::UnicodeNormalization;

/// NFKC form of `text`. Idempotent.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect()
}

/// Normalized and lowercased form of `text`, used for every comparison.
pub fn fold(text: &str) -> String {
    normalize(text).to_lowercase()
}
