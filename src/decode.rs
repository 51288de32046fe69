//! The decode orchestrator (`spec.md` §4.6): dispatches compiled `Key`s
//! against a whole word and combines their output into one
//! `ReplacementList`. `front`/`mid`/`end` is the canonical strategy and is
//! shipped as part of the core because its backtracking is exact enough
//! that re-deriving it per caller would be a correctness risk.

use crate::key::Key;
use crate::replacement::{add_rlists, ReplacementList};
use crate::Error;

/// A decode strategy: given a whole romanized word, produce its
/// `ReplacementList`. Implementations besides `FrontMidEnd` are expected
/// — this trait is the seam user code hangs its own orchestration on.
pub trait DecodeStrategy {
    fn decode(&self, word: &str) -> Result<ReplacementList, Error>;
}

/// The canonical `front`/`mid`/`end` strategy (spec.md §4.6).
///
/// `front` and `end` are required; `mid` is used only for the
/// (possibly empty) interior left after `front` and `end` each consume
/// one token from opposite ends.
pub struct FrontMidEnd<'k> {
    pub front: &'k Key,
    pub mid: &'k Key,
    pub end: &'k Key,
}

impl<'k> FrontMidEnd<'k> {
    pub fn new(front: &'k Key, mid: &'k Key, end: &'k Key) -> Self {
        FrontMidEnd { front, mid, end }
    }

    fn no_end_fallback(&self, word: &str) -> Result<ReplacementList, Error> {
        let (head, rest1) = self.front.getpart(word)?;
        if rest1.is_empty() {
            return Ok(head);
        }
        let (tail, rest2) = self.end.getpart(rest1)?;
        if rest2.is_empty() {
            return Ok(head + tail);
        }
        let middle = add_rlists(self.mid.getallparts(rest2)?)?;
        Ok(head + middle + tail)
    }
}

impl<'k> DecodeStrategy for FrontMidEnd<'k> {
    /// Step 1: try `end` first — a word that is entirely a recognized
    /// final form (or empty after the final match) returns immediately.
    /// Step 2: otherwise try `front` against what `end` left behind.
    /// Step 4 (fallback): if `front` cannot match there, restart from
    /// `front` against the whole word and try `end` on what's left.
    fn decode(&self, word: &str) -> Result<ReplacementList, Error> {
        let (tail, rest1) = self.end.getpart(word)?;
        if rest1.is_empty() {
            return Ok(tail);
        }

        match self.front.getpart(rest1) {
            Ok((head, rest2)) => {
                if rest2.is_empty() {
                    Ok(head + tail)
                } else {
                    let middle = add_rlists(self.mid.getallparts(rest2)?)?;
                    Ok(head + middle + tail)
                }
            }
            Err(_) => self.no_end_fallback(word),
        }
    }
}
