//! Character Group (`spec.md` §3, §4.2): a mapping from a romanized token
//! to the `ReplacementList` of its original-script candidates.

use crate::replacement::{Replacement, ReplacementList};
use crate::value::ProfileValue;
use crate::Error;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// A mapping from romanized tokens to their candidate lists. Groups
/// compose by union (`merge_from`): merging appends the incoming
/// candidates to whatever list is already present for a token rather
/// than overwriting it (spec.md §3, §4.2).
#[derive(Debug, Clone, Default)]
pub struct CharacterGroup {
    entries: IndexMap<SmolStr, ReplacementList>,
}

impl CharacterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw profile map (token -> entry) into a `CharacterGroup`.
    /// Each entry shape is resolved once here into a tagged
    /// `Vec<(weight, value)>`, per the Design Note "Dynamic profile
    /// shape": implementations should never re-dispatch on shape at
    /// query time.
    pub fn from_profile_map(map: &IndexMap<String, ProfileValue>) -> Result<Self, Error> {
        let mut group = CharacterGroup::new();
        for (token, entry) in map {
            let candidates = parse_entry(entry)?
                .into_iter()
                .map(|(weight, value)| Replacement::with_provenance(weight, token.as_str(), value))
                .collect();
            group
                .entries
                .insert(SmolStr::new(token), ReplacementList::new(token.as_str(), candidates));
        }
        Ok(group)
    }

    /// Inserts (or extends, per the union rule) one token's candidates
    /// directly, shifting each by `weight_offset`. Used both by ordinary
    /// group merging and by the pattern expander, which materializes
    /// entries it has already resolved to concrete `(weight, value)`
    /// pairs.
    pub fn insert_candidates(
        &mut self,
        token: &str,
        candidates: impl IntoIterator<Item = Replacement>,
        weight_offset: i64,
    ) {
        let shifted: Vec<Replacement> = candidates
            .into_iter()
            .map(|mut r| {
                r.weight += weight_offset;
                r
            })
            .collect();
        if shifted.is_empty() {
            return;
        }
        match self.entries.get_mut(token) {
            Some(existing) => existing.candidates.extend(shifted),
            None => {
                self.entries
                    .insert(SmolStr::new(token), ReplacementList::new(token, shifted));
            }
        }
    }

    /// Unions `other` into `self` with a group-level weight offset
    /// (spec.md §4.2): for each token in `other`, shift its candidates'
    /// weights by `offset` and append them to `self`'s list for that
    /// token, creating the list if absent.
    pub fn merge_from(&mut self, other: &CharacterGroup, offset: i64) {
        for (token, list) in &other.entries {
            self.insert_candidates(token, list.candidates.iter().cloned(), offset);
        }
    }

    pub fn get(&self, token: &str) -> Option<&ReplacementList> {
        self.entries.get(token)
    }

    /// Tokens in insertion order — the order the trie (`crate::key`) is
    /// built from.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReplacementList)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves one profile entry into its tagged `(weight, value)` pairs,
/// per spec.md §6 "Text format for candidate entries":
///
/// - a bare string -> weight 0
/// - a sequence of strings -> positional weights 0, 1, 2, ...
/// - a sequence whose two elements are `(int, string)` -> explicit
///   weight override for that single candidate
/// - a sequence mixing strings and explicit `(int, string)` pairs ->
///   strings get positional weight, pairs keep their explicit weight
pub fn parse_entry(value: &ProfileValue) -> Result<Vec<(i64, SmolStr)>, Error> {
    match value {
        ProfileValue::String(s) => Ok(vec![(0, SmolStr::new(s))]),
        ProfileValue::Seq(items) => {
            if let Some(pair) = as_weighted_pair(items) {
                return Ok(vec![pair]);
            }
            let mut out = Vec::with_capacity(items.len());
            for (position, item) in items.iter().enumerate() {
                match item {
                    ProfileValue::String(s) => out.push((position as i64, SmolStr::new(s))),
                    ProfileValue::Seq(pair_items) => match as_weighted_pair(pair_items) {
                        Some(pair) => out.push(pair),
                        None => return Err(Error::BadEntry(format!("{item:?}"))),
                    },
                    other => return Err(Error::BadEntry(format!("{other:?}"))),
                }
            }
            Ok(out)
        }
        other => Err(Error::BadEntry(format!("{other:?}"))),
    }
}

/// Recognizes the `(int, string)` explicit-weight-pair shape: a
/// two-element sequence of exactly `[Int, String]`.
fn as_weighted_pair(items: &[ProfileValue]) -> Option<(i64, SmolStr)> {
    if items.len() != 2 {
        return None;
    }
    let weight = items[0].as_int()?;
    let value = items[1].as_str()?;
    Some((weight, SmolStr::new(value)))
}
