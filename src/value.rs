//! The external profile tree (§6: "a tree of maps/sequences/scalars").
//!
//! Deserialization itself is out of scope for this crate (see `spec.md` §1
//! Out of scope) — callers hand the engine an already-parsed tree. `Map` is
//! an `IndexMap` rather than a `HashMap` because the compiler's determinism
//! guarantee (§4.5: "given the same profile tree, the output bytes ... are
//! identical across runs") depends on iterating groups, keys, and char_sets
//! in the order the profile author wrote them.

use indexmap::IndexMap;

/// One node of a parsed profile tree.
///
/// Mirrors the shapes a profile author can write for a character-group
/// entry (§6 "Text format for candidate entries") and for the `keys`/
/// `char_sets` sections: bare scalars, sequences, and maps.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileValue {
    String(String),
    Int(i64),
    Bool(bool),
    Seq(Vec<ProfileValue>),
    Map(IndexMap<String, ProfileValue>),
    Null,
}

impl ProfileValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProfileValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ProfileValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ProfileValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[ProfileValue]> {
        match self {
            ProfileValue::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ProfileValue>> {
        match self {
            ProfileValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ProfileValue::Null)
    }
}

impl From<&str> for ProfileValue {
    fn from(s: &str) -> Self {
        ProfileValue::String(s.to_string())
    }
}

impl From<String> for ProfileValue {
    fn from(s: String) -> Self {
        ProfileValue::String(s)
    }
}

impl From<i64> for ProfileValue {
    fn from(i: i64) -> Self {
        ProfileValue::Int(i)
    }
}

impl From<bool> for ProfileValue {
    fn from(b: bool) -> Self {
        ProfileValue::Bool(b)
    }
}

impl<T: Into<ProfileValue>> From<Vec<T>> for ProfileValue {
    fn from(items: Vec<T>) -> Self {
        ProfileValue::Seq(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod serde_json_bridge {
    use super::*;

    /// Test-only convenience: build `ProfileValue` trees from JSON literals
    /// instead of hand-nesting `IndexMap`s. Profile deserialization proper
    /// is out of scope for the crate (spec.md §1); this exists purely so
    /// integration tests can write fixtures legibly.
    impl From<serde_json::Value> for ProfileValue {
        fn from(v: serde_json::Value) -> Self {
            match v {
                serde_json::Value::Null => ProfileValue::Null,
                serde_json::Value::Bool(b) => ProfileValue::Bool(b),
                serde_json::Value::Number(n) => {
                    ProfileValue::Int(n.as_i64().unwrap_or_default())
                }
                serde_json::Value::String(s) => ProfileValue::String(s),
                serde_json::Value::Array(items) => {
                    ProfileValue::Seq(items.into_iter().map(ProfileValue::from).collect())
                }
                serde_json::Value::Object(map) => {
                    let mut out = IndexMap::with_capacity(map.len());
                    for (k, v) in map {
                        out.insert(k, ProfileValue::from(v));
                    }
                    ProfileValue::Map(out)
                }
            }
        }
    }

    #[test]
    fn bridges_nested_json() {
        let v: ProfileValue = serde_json::json!({
            "keys": {"base": ["consonants", "vowels"]},
            "consonants": ["ש", ["ו", ""]]
        })
        .into();
        let map = v.as_map().unwrap();
        assert!(map.contains_key("keys"));
        assert!(map.contains_key("consonants"));
    }
}
