//! The profile compiler (`spec.md` §4.5): walks a parsed profile tree,
//! resolves key inheritance, applies group-level weight offsets, expands
//! `char_sets` pattern rules (`crate::pattern`), and materializes one
//! compiled `Key` per named entry under `keys`.

use crate::group::{parse_entry, CharacterGroup};
use crate::key::Key;
use crate::pattern::{self, CharSet};
use crate::replacement::Replacement;
use crate::value::ProfileValue;
use crate::Error;
use indexmap::IndexMap;

/// A key-spec normalized from either of the two shapes `spec.md` §3
/// allows: a bare sequence of group references, or a map with
/// `groups`/`base`/`parent`/`suffix` fields.
struct RawKeySpec {
    groups: Vec<(String, i64)>,
    /// `None` = unspecified (fall back to the implicit `base` parent);
    /// `Some(None)` = explicitly `null` (no parent); `Some(Some(name))`
    /// = explicit parent name.
    parent_override: Option<Option<String>>,
    suffix: bool,
}

fn parse_group_list(items: &[ProfileValue]) -> Result<Vec<(String, i64)>, Error> {
    items
        .iter()
        .map(|item| match item {
            ProfileValue::String(name) => Ok((name.clone(), 0)),
            ProfileValue::Map(m) if m.len() == 1 => {
                let (name, weight) = m.iter().next().unwrap();
                let weight = weight
                    .as_int()
                    .ok_or_else(|| Error::BadEntry(format!("group weight offset: {weight:?}")))?;
                Ok((name.clone(), weight))
            }
            other => Err(Error::BadEntry(format!("key group entry: {other:?}"))),
        })
        .collect()
}

fn parse_key_spec(value: &ProfileValue) -> Result<RawKeySpec, Error> {
    match value {
        ProfileValue::Seq(items) => Ok(RawKeySpec {
            groups: parse_group_list(items)?,
            parent_override: None,
            suffix: false,
        }),
        ProfileValue::Map(m) => {
            let groups = match m.get("groups") {
                Some(ProfileValue::Seq(items)) => parse_group_list(items)?,
                Some(other) => return Err(Error::BadEntry(format!("key groups: {other:?}"))),
                None => Vec::new(),
            };
            let parent_value = m.get("base").or_else(|| m.get("parent"));
            let parent_override = match parent_value {
                None => None,
                Some(ProfileValue::Null) => Some(None),
                Some(ProfileValue::String(name)) => Some(Some(name.clone())),
                Some(other) => return Err(Error::BadEntry(format!("key base/parent: {other:?}"))),
            };
            let suffix = m.get("suffix").and_then(|v| v.as_bool()).unwrap_or(false);
            Ok(RawKeySpec {
                groups,
                parent_override,
                suffix,
            })
        }
        other => Err(Error::BadEntry(format!("key-spec: {other:?}"))),
    }
}

fn raw_group<'a>(
    profile: &'a IndexMap<String, ProfileValue>,
    name: &str,
) -> Result<&'a IndexMap<String, ProfileValue>, Error> {
    profile
        .get(name)
        .and_then(|v| v.as_map())
        .ok_or_else(|| Error::UnknownGroup(name.to_string()))
}

/// Resolves the implicit-`base`-parent rule (spec.md §3 "Special key name
/// `base`") and returns, per key, its parent (if any).
fn resolve_parents(specs: &IndexMap<String, RawKeySpec>) -> IndexMap<String, Option<String>> {
    let mut parents = IndexMap::with_capacity(specs.len());
    for (name, spec) in specs {
        let parent = match &spec.parent_override {
            Some(explicit) => explicit.clone(),
            None if name != "base" && specs.contains_key("base") => Some("base".to_string()),
            None => None,
        };
        parents.insert(name.clone(), parent);
    }
    parents
}

/// Topologically sorts keys (parents before children), rejecting cycles
/// (spec.md §4.5 step 2, §9 "Cyclic inheritance").
fn topological_order(parents: &IndexMap<String, Option<String>>) -> Result<Vec<String>, Error> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: IndexMap<&str, Mark> = parents.keys().map(|k| (k.as_str(), Mark::Unvisited)).collect();
    let mut order = Vec::with_capacity(parents.len());

    fn visit<'a>(
        name: &'a str,
        parents: &'a IndexMap<String, Option<String>>,
        marks: &mut IndexMap<&'a str, Mark>,
        order: &mut Vec<String>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), Error> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                path.push(name);
                let cycle = path.join(" -> ");
                return Err(Error::KeyCycle(cycle));
            }
            _ => {}
        }
        marks.insert(name, Mark::InProgress);
        path.push(name);
        if let Some(Some(parent)) = parents.get(name) {
            if !parents.contains_key(parent.as_str()) {
                return Err(Error::BadEntry(format!(
                    "key `{name}` names unknown base/parent `{parent}`"
                )));
            }
            visit(parent.as_str(), parents, marks, order, path)?;
        }
        path.pop();
        marks.insert(name, Mark::Done);
        order.push(name.to_string());
        Ok(())
    }

    for name in parents.keys() {
        let mut path = Vec::new();
        visit(name.as_str(), parents, &mut marks, &mut order, &mut path)?;
    }
    Ok(order)
}

/// The compiled engine: every named `Key` produced from a profile, ready
/// for keyed lookup (spec.md §6 "Engine query interface").
pub struct Engine {
    keys: IndexMap<String, Key>,
}

impl Engine {
    /// Compiles a profile tree into an `Engine` (spec.md §6 `build`).
    pub fn build(profile: &ProfileValue) -> Result<Engine, Error> {
        let profile_map = profile
            .as_map()
            .ok_or_else(|| Error::BadEntry(format!("profile root: {profile:?}")))?;

        let char_sets_raw = match profile_map.get("char_sets") {
            Some(ProfileValue::Map(m)) => m.clone(),
            Some(other) => return Err(Error::BadEntry(format!("char_sets: {other:?}"))),
            None => IndexMap::new(),
        };

        // Step 1: resolve char_sets. Their `chars` groups are plain
        // literal groups (no patterns of their own), parsed once here.
        let mut char_set_domain_groups: IndexMap<String, CharacterGroup> = IndexMap::new();
        for def in char_sets_raw.values() {
            let group_name = match def {
                ProfileValue::String(name) => Some(name.clone()),
                ProfileValue::Map(m) => match m.get("chars") {
                    Some(ProfileValue::String(name)) => Some(name.clone()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(name) = group_name {
                if !char_set_domain_groups.contains_key(&name) {
                    let raw = raw_group(profile_map, &name)?;
                    char_set_domain_groups.insert(name, CharacterGroup::from_profile_map(raw)?);
                }
            }
        }
        let char_sets: IndexMap<String, CharSet> =
            pattern::resolve_char_sets(&char_sets_raw, &char_set_domain_groups)?;

        // Step 2: key-dependency DAG from base/parent pointers.
        let keys_raw = match profile_map.get("keys") {
            Some(ProfileValue::Map(m)) => m,
            Some(other) => return Err(Error::BadEntry(format!("keys: {other:?}"))),
            None => return Err(Error::BadEntry("profile has no `keys` section".to_string())),
        };
        let specs: IndexMap<String, RawKeySpec> = keys_raw
            .iter()
            .map(|(name, spec)| Ok((name.clone(), parse_key_spec(spec)?)))
            .collect::<Result<_, Error>>()?;
        let parents = resolve_parents(&specs);
        let order = topological_order(&parents)?;

        // Steps 3-5: build each key's merged group and trie in dependency
        // order. A pattern rule's alias resolves its captured candidates
        // through `compiled` (only keys finished so far). A group with a
        // pattern rule therefore needs to live on a key that depends on
        // whatever key its aliases' `key` field names (commonly `base`,
        // the char_sets default), not on that key itself.
        let mut compiled: IndexMap<String, Key> = IndexMap::new();
        for name in order {
            let spec = &specs[&name];
            let mut group = match parents.get(&name).and_then(|p| p.as_ref()) {
                Some(parent_name) => compiled
                    .get(parent_name)
                    .map(|k| k.group().clone())
                    .ok_or_else(|| Error::BadEntry(format!("key `{name}`: unresolved parent `{parent_name}`")))?,
                None => CharacterGroup::new(),
            };

            for (group_name, offset) in &spec.groups {
                let raw = raw_group(profile_map, group_name)?;
                for (lhs, rhs) in raw {
                    if pattern::is_pattern_lhs(lhs, &char_sets) {
                        let expanded = pattern::expand_rule(lhs, rhs, &char_sets, &compiled)?;
                        for (token, replacement) in expanded {
                            group.insert_candidates(&token, [replacement], *offset);
                        }
                    } else {
                        let parsed = parse_entry(rhs)?;
                        let candidates: Vec<Replacement> = parsed
                            .into_iter()
                            .map(|(weight, value)| Replacement::with_provenance(weight, lhs.as_str(), value))
                            .collect();
                        group.insert_candidates(lhs, candidates, *offset);
                    }
                }
            }

            compiled.insert(name.clone(), Key::new(name, group, spec.suffix));
        }

        Ok(Engine { keys: compiled })
    }

    /// `engine[key_name]` (spec.md §6): the compiled tokenizer named
    /// `key_name`.
    pub fn key(&self, key_name: &str) -> Result<&Key, Error> {
        self.keys
            .get(key_name)
            .ok_or_else(|| Error::UnknownKey(key_name.to_string()))
    }

    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(|s| s.as_str())
    }
}
