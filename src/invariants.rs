//! Runtime invariant assertions for the replacement algebra.
//!
//! These checks verify the properties `spec.md` §8 calls out — provenance
//! concatenation, coverage, and sort stability — at the boundaries where a
//! bug would otherwise surface only as a silently wrong candidate deep in
//! a decode.
//!
//! Assertions are active only in debug builds (`debug_assertions`); in
//! release builds they compile to no-ops for zero overhead.

use crate::replacement::{Replacement, ReplacementList};

/// Asserts that `r.keyvalue`'s second components concatenate to `r.value`
/// (spec.md §8, first bullet).
///
/// # Panics
///
/// Panics in debug builds if the invariant is violated.
#[inline]
pub fn assert_replacement_provenance(r: &Replacement) {
    #[cfg(debug_assertions)]
    {
        let from_provenance: String = r.keyvalue.iter().map(|(_, v)| v.as_str()).collect();
        debug_assert_eq!(
            from_provenance,
            r.value.as_str(),
            "Invariant violation: keyvalue second components do not reconstruct value"
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = r;
    }
}

/// Asserts that every candidate in `rl` has provenance whose first
/// components concatenate to `rl.key` (spec.md §8, second bullet).
///
/// # Panics
///
/// Panics in debug builds if the invariant is violated.
#[inline]
pub fn assert_replacement_list_provenance(rl: &ReplacementList) {
    #[cfg(debug_assertions)]
    {
        for (i, candidate) in rl.candidates.iter().enumerate() {
            let romanized = candidate.romanized();
            debug_assert_eq!(
                romanized,
                rl.key.as_str(),
                "Invariant violation: candidate[{i}] provenance `{romanized}` != list key `{}`",
                rl.key
            );
        }
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = rl;
    }
}

/// Asserts that `getallparts`'s coverage property holds: concatenating
/// every part's `key` reproduces `word` (spec.md §8 "Coverage").
///
/// # Panics
///
/// Panics in debug builds if coverage is violated.
#[inline]
pub fn assert_coverage(word: &str, parts: &[ReplacementList]) {
    #[cfg(debug_assertions)]
    {
        let joined: String = parts.iter().map(|p| p.key.as_str()).collect();
        debug_assert_eq!(
            joined, word,
            "Invariant violation: getallparts parts do not cover the input word"
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (word, parts);
    }
}

/// Asserts that sorting is idempotent: sorting an already-sorted list
/// again produces the identical candidate order (spec.md §8 "Stable
/// sort").
///
/// # Panics
///
/// Panics in debug builds if the invariant is violated.
#[inline]
pub fn assert_sort_idempotent(rl: &ReplacementList) {
    #[cfg(debug_assertions)]
    {
        let resorted = rl.sorted();
        debug_assert_eq!(
            resorted.candidates, rl.candidates,
            "Invariant violation: re-sorting an already-sorted list changed its order"
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = rl;
    }
}
