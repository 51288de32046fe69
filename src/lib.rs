//! # deromanize
//!
//! A reverse-transliteration (deromanization) key engine: given a word
//! written in a Romanized form of some non-Latin script, produce a ranked,
//! weighted list of plausible original-script spellings.
//!
//! The crate is a compiler plus a runtime:
//!
//! - [`profile`] walks a declarative profile tree and compiles it into a
//!   set of named [`key::Key`] tokenizers, expanding [`pattern`] rules and
//!   resolving key inheritance along the way.
//! - [`key`] holds the greedy (longest-match) tokenizer built over a
//!   [`group::CharacterGroup`].
//! - [`replacement`] is the weighted candidate algebra (`+`, `sort`,
//!   `makestat`) every tokenizer result is expressed in.
//! - [`decode`] provides the canonical front/mid/end decode strategy that
//!   combines several keys into a whole-word result.
//!
//! ## Example
//!
//! ```no_run
//! use deromanize::profile::Engine;
//! use deromanize::decode::{DecodeStrategy, FrontMidEnd};
//! use deromanize::value::ProfileValue;
//!
//! # fn main() -> Result<(), deromanize::Error> {
//! # let profile: ProfileValue = ProfileValue::Null;
//! let engine = Engine::build(&profile)?;
//! let strategy = FrontMidEnd::new(engine.key("front")?, engine.key("mid")?, engine.key("end")?);
//! let candidates = strategy.decode("shalom")?;
//! # let _ = candidates;
//! # Ok(())
//! # }
//! ```

use rayon::prelude::*;

pub mod decode;
pub mod group;
pub mod invariants;
pub mod key;
pub mod pattern;
pub mod profile;
pub mod replacement;
pub mod value;

pub use decode::{DecodeStrategy, FrontMidEnd};
pub use profile::Engine;
pub use replacement::{Replacement, ReplacementList};
pub use value::ProfileValue;

impl Engine {
    /// Decodes multiple words in parallel through the canonical
    /// front/mid/end strategy over this engine's compiled keys (mirrors
    /// the teacher's `encode_batch`: keys are immutable and freely
    /// shareable across threads once compiled, per `spec.md` §5).
    #[must_use = "decode_batch returns a Result that must be handled"]
    pub fn decode_batch(
        &self,
        words: &[&str],
        front_key: &str,
        mid_key: &str,
        end_key: &str,
    ) -> Result<Vec<ReplacementList>, Error> {
        let strategy = FrontMidEnd::new(self.key(front_key)?, self.key(mid_key)?, self.key(end_key)?);
        words.par_iter().map(|word| strategy.decode(word)).collect()
    }
}

/// The engine's error taxonomy (`spec.md` §7). Compile-time variants
/// (`BadEntry`, `KeyCycle`, `UnknownGroup`, `PatternAmbiguous`) indicate a
/// malformed profile and are always fatal. Query-time variants
/// (`UnknownKey`, `NoSuchToken`, `NoMatch`, `EmptyReduction`) are expected
/// control flow for decoders — the front/mid/end orchestrator (`decode`)
/// catches `NoMatch` at specified fallback points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed profile entry: {0}")]
    BadEntry(String),

    #[error("cyclic key inheritance: {0}")]
    KeyCycle(String),

    #[error("unknown character group: {0}")]
    UnknownGroup(String),

    #[error("pattern rule is ambiguous: {0}")]
    PatternAmbiguous(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("no such token: {0}")]
    NoSuchToken(String),

    #[error("no match for input: {0}")]
    NoMatch(String),

    #[error("cannot reduce an empty sequence of replacement lists")]
    EmptyReduction,
}
