//! The pattern expander (`spec.md` §4.4): turns a rule whose LHS contains
//! `char_sets` alias placeholders into the concrete literal rules it
//! stands for, by enumerating the cross product of everything the
//! aliases can bind to.
//!
//! LHS recognition — "at each position prefer the **longest** alias
//! match" — is itself a longest-prefix-match problem, so it reuses
//! `crate::key::Trie`, the same greedy-match primitive the romanized
//! tokenizers are built on (see `spec.md` §9's implicit kinship between
//! "longest match" in §4.3 and in §4.4).

use crate::group::CharacterGroup;
use crate::key::{Key, Trie};
use crate::replacement::Replacement;
use crate::value::ProfileValue;
use crate::Error;
use indexmap::IndexMap;
use regex::Regex;
use smol_str::SmolStr;
use std::sync::OnceLock;

/// A `char_sets` alias name must be a non-empty run of letters (no
/// digits, punctuation, or whitespace) so that `recognize_lhs`'s
/// longest-match scan can never confuse an alias occurrence with a
/// literal romanized token drawn from the same character set (mirrors
/// the teacher's own belt-and-suspenders validation style for
/// externally-declared names in `vocab.rs`/`gguf.rs`).
fn alias_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("static alias pattern is valid"))
}

/// A resolved `char_sets` alias: the romanized tokens it ranges over
/// (its `chars` group) and the name of the compiled `Key` whose
/// `key[token]` lookup supplies original-script candidates for a bound
/// token (its `key` field, defaulting to `"base"`).
#[derive(Debug, Clone)]
pub(crate) struct CharSet {
    pub domain: Vec<SmolStr>,
    pub key_name: String,
}

/// Resolves the profile's `char_sets` section (spec.md §3, §4.5 step 1).
/// `chars` is either the name of an already-parsed raw group or an
/// inline list of literal characters/tokens.
pub(crate) fn resolve_char_sets(
    raw: &IndexMap<String, ProfileValue>,
    raw_groups: &IndexMap<String, CharacterGroup>,
) -> Result<IndexMap<String, CharSet>, Error> {
    let mut out = IndexMap::with_capacity(raw.len());
    for (alias, def) in raw {
        if !alias_name_pattern().is_match(alias) {
            return Err(Error::BadEntry(format!(
                "char_sets alias `{alias}` must be a bare run of letters"
            )));
        }
        let (chars_value, key_name) = match def {
            ProfileValue::String(group_name) => (ProfileValue::String(group_name.clone()), "base".to_string()),
            ProfileValue::Map(m) => {
                let chars = m
                    .get("chars")
                    .cloned()
                    .ok_or_else(|| Error::BadEntry(format!("char_sets.{alias} missing `chars`")))?;
                let key_name = m
                    .get("key")
                    .and_then(|v| v.as_str())
                    .unwrap_or("base")
                    .to_string();
                (chars, key_name)
            }
            other => return Err(Error::BadEntry(format!("char_sets.{alias}: {other:?}"))),
        };

        let domain = match &chars_value {
            ProfileValue::String(group_name) => raw_groups
                .get(group_name)
                .ok_or_else(|| Error::UnknownGroup(group_name.clone()))?
                .tokens()
                .map(SmolStr::new)
                .collect(),
            ProfileValue::Seq(items) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(SmolStr::new)
                        .ok_or_else(|| Error::BadEntry(format!("char_sets.{alias}.chars: {v:?}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(Error::BadEntry(format!("char_sets.{alias}.chars: {other:?}"))),
        };

        out.insert(alias.clone(), CharSet { domain, key_name });
    }
    Ok(out)
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    /// 0-based capture index, alias name.
    Capture(usize, String),
}

/// Scans `lhs` left to right, preferring the longest `char_sets` alias
/// match at each position (spec.md §4.4 "Recognition"). Returns the
/// segment sequence and the number of capture groups found.
fn recognize_lhs(lhs: &str, char_sets: &IndexMap<String, CharSet>) -> (Vec<Segment>, usize) {
    let alias_trie = Trie::build(char_sets.keys().map(|s| s.as_str()));
    let mut segments = Vec::new();
    let mut captures = 0usize;
    let mut rest = lhs;
    let mut literal = String::new();

    while !rest.is_empty() {
        match alias_trie.longest_prefix(rest) {
            Some(len) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let alias_name = &rest[..len];
                segments.push(Segment::Capture(captures, alias_name.to_string()));
                captures += 1;
                rest = &rest[len..];
            }
            None => {
                let ch = rest.chars().next().unwrap();
                literal.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    (segments, captures)
}

/// `true` iff `lhs` contains at least one `char_sets` alias occurrence —
/// the test the compiler uses (spec.md §4.5 step 4) to decide whether a
/// group entry is a pattern rule or a plain literal entry.
pub(crate) fn is_pattern_lhs(lhs: &str, char_sets: &IndexMap<String, CharSet>) -> bool {
    if char_sets.is_empty() {
        return false;
    }
    recognize_lhs(lhs, char_sets).1 > 0
}

/// One RHS template: either a bare template string (weight 0) or an
/// explicit `(weight, template)` pair (spec.md §4.4).
fn parse_rhs_templates(value: &ProfileValue) -> Result<Vec<(i64, String)>, Error> {
    let items: &[ProfileValue] = match value {
        ProfileValue::Seq(items) => items,
        ProfileValue::String(s) => return Ok(vec![(0, s.clone())]),
        other => return Err(Error::BadEntry(format!("pattern RHS: {other:?}"))),
    };
    items
        .iter()
        .map(|item| match item {
            ProfileValue::String(s) => Ok((0, s.clone())),
            ProfileValue::Seq(pair) if pair.len() == 2 => {
                let weight = pair[0]
                    .as_int()
                    .ok_or_else(|| Error::BadEntry(format!("pattern RHS weight: {:?}", pair[0])))?;
                let template = pair[1]
                    .as_str()
                    .ok_or_else(|| Error::BadEntry(format!("pattern RHS template: {:?}", pair[1])))?
                    .to_string();
                Ok((weight, template))
            }
            other => Err(Error::BadEntry(format!("pattern RHS entry: {other:?}"))),
        })
        .collect()
}

/// Substitutes `\N` backreferences in `template` with the Nth captured
/// value (1-based).
fn substitute(template: &str, captured_values: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                let n: usize = template[i + 1..j].parse().unwrap_or(0);
                if n >= 1 && n <= captured_values.len() {
                    out.push_str(captured_values[n - 1]);
                    i = j;
                    continue;
                }
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.into_iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut p = prefix.clone();
                    p.push(item.clone());
                    p
                })
            })
            .collect()
    })
}

/// Expands one pattern rule (`lhs -> rhs`) into its concrete literal
/// entries: `(generated_token, weight, value, provenance)` tuples, ready
/// to merge into a `CharacterGroup` (spec.md §4.4 "Expansion algorithm").
///
/// `keys` must already contain every key named by a capturing alias's
/// `key` field — the profile compiler (`crate::profile`) guarantees this
/// by resolving keys in dependency order before expanding any group that
/// references them.
pub(crate) fn expand_rule(
    lhs: &str,
    rhs: &ProfileValue,
    char_sets: &IndexMap<String, CharSet>,
    keys: &IndexMap<String, Key>,
) -> Result<Vec<(String, Replacement)>, Error> {
    let (segments, capture_count) = recognize_lhs(lhs, char_sets);
    debug_assert!(capture_count > 0, "expand_rule called on a non-pattern LHS");

    let captures: Vec<&CharSet> = segments
        .iter()
        .filter_map(|seg| match seg {
            Segment::Capture(_, alias) => Some(
                char_sets
                    .get(alias)
                    .expect("recognize_lhs only emits known alias names"),
            ),
            Segment::Literal(_) => None,
        })
        .collect();

    let domains: Vec<Vec<SmolStr>> = captures.iter().map(|cs| cs.domain.clone()).collect();
    let templates = parse_rhs_templates(rhs)?;

    let mut out = Vec::new();
    for binding in cartesian_product(&domains) {
        // Resolve each bound token's candidate list via its alias's key.
        let mut candidate_lists = Vec::with_capacity(binding.len());
        for (cs, token) in captures.iter().zip(binding.iter()) {
            let key = keys
                .get(&cs.key_name)
                .ok_or_else(|| Error::UnknownKey(cs.key_name.clone()))?;
            candidate_lists.push(key.token(token)?.candidates.clone());
        }

        let generated_token: String = {
            let mut s = String::new();
            let mut capture_idx = 0;
            for seg in &segments {
                match seg {
                    Segment::Literal(lit) => s.push_str(lit),
                    Segment::Capture(_, _) => {
                        s.push_str(&binding[capture_idx]);
                        capture_idx += 1;
                    }
                }
            }
            s
        };

        for picks in cartesian_product(&candidate_lists) {
            let captured_values: Vec<&str> = picks.iter().map(|p| p.value.as_str()).collect();
            let captured_weight: i64 = picks.iter().map(|p| p.weight).sum();

            for (template_weight, template) in &templates {
                let output = substitute(template, &captured_values);
                let weight = template_weight + captured_weight;
                let replacement =
                    Replacement::with_provenance(weight, generated_token.as_str(), output);
                out.push((generated_token.clone(), replacement));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::CharacterGroup;
    use indexmap::IndexMap;

    fn consonant_group() -> CharacterGroup {
        let mut map: IndexMap<String, ProfileValue> = IndexMap::new();
        for (token, value) in [("k", "כ"), ("t", "ת"), ("l", "ל")] {
            map.insert(token.to_string(), ProfileValue::String(value.to_string()));
        }
        CharacterGroup::from_profile_map(&map).unwrap()
    }

    fn char_sets_fixture() -> (IndexMap<String, CharSet>, IndexMap<String, Key>) {
        let consonants = consonant_group();
        let mut raw_groups = IndexMap::new();
        raw_groups.insert("consonants".to_string(), consonants.clone());

        let mut char_sets_raw: IndexMap<String, ProfileValue> = IndexMap::new();
        char_sets_raw.insert("C".to_string(), ProfileValue::String("consonants".to_string()));
        let char_sets = resolve_char_sets(&char_sets_raw, &raw_groups).unwrap();

        let mut keys = IndexMap::new();
        keys.insert("base".to_string(), Key::new("base".into(), consonants, false));
        (char_sets, keys)
    }

    #[test]
    fn recognize_lhs_finds_alias_occurrences() {
        let (char_sets, _keys) = char_sets_fixture();
        let (segments, captures) = recognize_lhs("CiCC", &char_sets);
        assert_eq!(captures, 3);
        assert_eq!(segments.len(), 4);
        assert!(matches!(&segments[1], Segment::Literal(s) if s == "i"));
    }

    #[test]
    fn is_pattern_lhs_detects_aliases() {
        let (char_sets, _keys) = char_sets_fixture();
        assert!(is_pattern_lhs("CiCC", &char_sets));
        assert!(!is_pattern_lhs("shalom", &char_sets));
    }

    #[test]
    fn expand_rule_cross_products_domain_and_templates() {
        // "CiC": two captures (the literal "i" between them just
        // constrains the match and is not reproduced in the output,
        // matching the `FiCC`-style rule in spec.md §4.4).
        let (char_sets, keys) = char_sets_fixture();
        let rhs = ProfileValue::Seq(vec![
            ProfileValue::String("\\1\\2".to_string()),
            ProfileValue::String("\\1י\\2".to_string()),
        ]);
        let expanded = expand_rule("CiC", &rhs, &char_sets, &keys).unwrap();
        // 3 consonants * 3 consonants * 2 templates = 18 generated entries.
        assert_eq!(expanded.len(), 18);
        let (token, rep) = expanded
            .iter()
            .find(|(t, r)| t == "kit" && r.value == "כת")
            .expect("kit -> כת generated");
        assert_eq!(token, "kit");
        assert_eq!(rep.weight, 0);
        let (_, rep_with_yod) = expanded
            .iter()
            .find(|(t, r)| t == "kit" && r.value == "כית")
            .expect("kit -> כית generated");
        assert_eq!(rep_with_yod.weight, 0);
    }

    #[test]
    fn substitute_replaces_backreferences() {
        assert_eq!(substitute("\\1\\2", &["a", "b"]), "ab");
        assert_eq!(substitute("\\1י\\2", &["a", "b"]), "aיb");
        assert_eq!(substitute("no refs", &["a"]), "no refs");
    }

    #[test]
    fn resolve_char_sets_rejects_non_letter_alias_names() {
        let mut raw_groups = IndexMap::new();
        raw_groups.insert("consonants".to_string(), consonant_group());
        let mut char_sets_raw: IndexMap<String, ProfileValue> = IndexMap::new();
        char_sets_raw.insert("C1".to_string(), ProfileValue::String("consonants".to_string()));
        let err = resolve_char_sets(&char_sets_raw, &raw_groups).unwrap_err();
        assert!(matches!(err, Error::BadEntry(_)));
    }

    fn front_group() -> CharacterGroup {
        let mut map: IndexMap<String, ProfileValue> = IndexMap::new();
        for (token, value) in [("b", "ב"), ("d", "ד")] {
            map.insert(token.to_string(), ProfileValue::String(value.to_string()));
        }
        CharacterGroup::from_profile_map(&map).unwrap()
    }

    /// Exercises the `char_sets` map form (spec.md §3: `{chars, key}`):
    /// `chars` given as an inline literal list rather than a named group,
    /// and `key` overriding the default `"base"` to name another key.
    #[test]
    fn resolve_char_sets_supports_inline_chars_and_explicit_key() {
        let raw_groups = IndexMap::new();
        let mut char_sets_raw: IndexMap<String, ProfileValue> = IndexMap::new();
        char_sets_raw.insert(
            "C".to_string(),
            ProfileValue::Map(IndexMap::from([
                (
                    "chars".to_string(),
                    ProfileValue::Seq(vec![
                        ProfileValue::String("k".to_string()),
                        ProfileValue::String("t".to_string()),
                        ProfileValue::String("l".to_string()),
                    ]),
                ),
                ("key".to_string(), ProfileValue::String("front".to_string())),
            ])),
        );
        let char_sets = resolve_char_sets(&char_sets_raw, &raw_groups).unwrap();
        let cs = &char_sets["C"];
        assert_eq!(cs.key_name, "front");
        assert_eq!(cs.domain, vec![SmolStr::new("k"), SmolStr::new("t"), SmolStr::new("l")]);
    }

    /// A rule mixing two distinct aliases whose candidates are drawn from
    /// two different keys (spec.md §4.4's `FiCC`-style example, with `F`
    /// and `C` genuinely distinct rather than the same alias repeated).
    #[test]
    fn expand_rule_supports_two_distinct_aliases_on_different_keys() {
        let consonants = consonant_group();
        let front = front_group();

        let mut raw_groups = IndexMap::new();
        raw_groups.insert("consonants".to_string(), consonants.clone());

        let mut char_sets_raw: IndexMap<String, ProfileValue> = IndexMap::new();
        char_sets_raw.insert(
            "F".to_string(),
            ProfileValue::Map(IndexMap::from([
                ("chars".to_string(), ProfileValue::Seq(vec![
                    ProfileValue::String("b".to_string()),
                    ProfileValue::String("d".to_string()),
                ])),
                ("key".to_string(), ProfileValue::String("front".to_string())),
            ])),
        );
        char_sets_raw.insert(
            "C".to_string(),
            ProfileValue::Map(IndexMap::from([
                ("chars".to_string(), ProfileValue::String("consonants".to_string())),
                ("key".to_string(), ProfileValue::String("base".to_string())),
            ])),
        );
        let char_sets = resolve_char_sets(&char_sets_raw, &raw_groups).unwrap();

        let mut keys = IndexMap::new();
        keys.insert("base".to_string(), Key::new("base".into(), consonants, false));
        keys.insert("front".to_string(), Key::new("front".into(), front, false));

        let rhs = ProfileValue::String("\\1\\2".to_string());
        let expanded = expand_rule("FiC", &rhs, &char_sets, &keys).unwrap();
        // 2 front consonants * 3 base consonants * 1 template = 6 entries.
        assert_eq!(expanded.len(), 6);
        let (token, rep) = expanded
            .iter()
            .find(|(t, r)| t == "bik" && r.value == "בכ")
            .expect("bik -> בכ generated from two distinct aliases");
        assert_eq!(token, "bik");
        assert_eq!(rep.weight, 0);
    }
}
