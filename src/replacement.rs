//! The value algebra (`spec.md` §3, §4.1, §8): a weighted candidate and an
//! ordered list of weighted candidates for one romanized key-string.
//!
//! `Replacement` and `ReplacementList` are immutable once built; every
//! operation here (`+`, `sort`, `makestat`) produces a fresh value rather
//! than mutating a shared one, matching the no-in-place-mutation rule in
//! `spec.md` §5.

use smol_str::SmolStr;
use std::cmp::Ordering;

/// One `(romanized_segment, original_segment)` trace entry (`spec.md` §3,
/// "Provenance").
pub type KeyValue = (SmolStr, SmolStr);

/// One possible original-script rendering of a romanized segment.
///
/// Invariant (spec.md §8): concatenating the first components of
/// `keyvalue` yields the romanized string this candidate was derived
/// from; concatenating the second components yields `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub weight: i64,
    pub value: SmolStr,
    pub keyvalue: Vec<KeyValue>,
}

impl Replacement {
    pub fn new(weight: i64, value: impl Into<SmolStr>) -> Self {
        Replacement {
            weight,
            value: value.into(),
            keyvalue: Vec::new(),
        }
    }

    /// Build a replacement tagged with the single provenance pair that
    /// produced it: `romanized -> value`.
    pub fn with_provenance(weight: i64, romanized: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        let romanized = romanized.into();
        let value = value.into();
        Replacement {
            weight,
            value: value.clone(),
            keyvalue: vec![(romanized, value)],
        }
    }

    /// The romanized string this candidate's provenance traces back to:
    /// the concatenation of `keyvalue`'s first components.
    pub fn romanized(&self) -> String {
        self.keyvalue.iter().map(|(r, _)| r.as_str()).collect()
    }
}

/// `Replacement + Replacement`: weights add, values and provenance
/// concatenate. Associative; not required to be commutative (spec.md
/// §4.1).
impl std::ops::Add for Replacement {
    type Output = Replacement;

    fn add(self, rhs: Replacement) -> Replacement {
        let mut value = String::with_capacity(self.value.len() + rhs.value.len());
        value.push_str(&self.value);
        value.push_str(&rhs.value);

        let mut keyvalue = self.keyvalue;
        keyvalue.extend(rhs.keyvalue);

        Replacement {
            weight: self.weight + rhs.weight,
            value: SmolStr::new(value),
            keyvalue,
        }
    }
}

/// The ordered set of candidates for a particular romanized segment
/// (`spec.md` §3). `key` is the romanized string this list decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementList {
    pub key: SmolStr,
    pub candidates: Vec<Replacement>,
}

impl ReplacementList {
    pub fn new(key: impl Into<SmolStr>, candidates: Vec<Replacement>) -> Self {
        ReplacementList {
            key: key.into(),
            candidates,
        }
    }

    /// The identity element under `+`: `("", [(0, "", [])])` (spec.md
    /// §4.1).
    pub fn identity() -> Self {
        ReplacementList {
            key: SmolStr::new_inline(""),
            candidates: vec![Replacement::new(0, "")],
        }
    }

    /// Stable ascending sort by weight. Equal-weight candidates retain
    /// their pre-sort relative order (spec.md §4.1, §8).
    pub fn sort(&mut self) {
        self.candidates.sort_by(|a, b| a.weight.cmp(&b.weight));
    }

    /// A sorted copy, leaving `self` untouched.
    pub fn sorted(&self) -> Self {
        let mut out = self.clone();
        out.sort();
        out
    }

    /// Converts integer weights into normalized probabilities (spec.md
    /// §4.1): for ascending weights `w_i`, let `m = max(w_i) + 1`; each
    /// candidate's raw score is `m - w_i`, normalized by the sum of raw
    /// scores. Smaller weight implies larger probability.
    ///
    /// Candidates are emitted in `self`'s current order (sort first if a
    /// weight-ascending walk is desired — `makestat` itself does not
    /// reorder).
    pub fn makestat(&self) -> Vec<(f64, SmolStr)> {
        if self.candidates.is_empty() {
            return Vec::new();
        }
        let max_weight = self.candidates.iter().map(|r| r.weight).max().unwrap();
        let m = max_weight + 1;
        let raw: Vec<f64> = self
            .candidates
            .iter()
            .map(|r| (m - r.weight) as f64)
            .collect();
        let sum: f64 = raw.iter().sum();
        self.candidates
            .iter()
            .zip(raw.iter())
            .map(|(r, &score)| (score / sum, r.value.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// `ReplacementList + ReplacementList`: romanized keys concatenate, and
/// the candidate sequence is the full lexicographic cross product (outer
/// = `self`'s order, inner = `rhs`'s order), unsorted (spec.md §4.1).
///
/// The cross product is built eagerly: at the sizes this engine's profile
/// compiler and orchestrator operate on (single romanized words, a few
/// tokens each) materializing the product up front is simpler and no
/// less correct than deferring it, and `ReplacementList` is already an
/// owned, cloneable `Vec`-backed value throughout this crate.
impl std::ops::Add for ReplacementList {
    type Output = ReplacementList;

    fn add(self, rhs: ReplacementList) -> ReplacementList {
        let mut key = String::with_capacity(self.key.len() + rhs.key.len());
        key.push_str(&self.key);
        key.push_str(&rhs.key);

        let mut candidates = Vec::with_capacity(self.candidates.len() * rhs.candidates.len());
        for a in &self.candidates {
            for b in &rhs.candidates {
                candidates.push(a.clone() + b.clone());
            }
        }

        ReplacementList {
            key: SmolStr::new(key),
            candidates,
        }
    }
}

impl IntoIterator for ReplacementList {
    type Item = Replacement;
    type IntoIter = std::vec::IntoIter<Replacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

/// Left-fold reduction of a sequence of `ReplacementList`s under `+`
/// ("add_reps"/"add_rlists" in spec.md §4.1). Fails on empty input.
pub fn add_rlists<I>(lists: I) -> Result<ReplacementList, crate::Error>
where
    I: IntoIterator<Item = ReplacementList>,
{
    let mut iter = lists.into_iter();
    let first = iter.next().ok_or(crate::Error::EmptyReduction)?;
    Ok(iter.fold(first, |acc, next| acc + next))
}

/// Ordering helper used by `sort`/proptests: a total order on weight
/// only, matching the stable-sort contract.
pub fn weight_order(a: &Replacement, b: &Replacement) -> Ordering {
    a.weight.cmp(&b.weight)
}
