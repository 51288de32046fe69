//! The Trie and the greedy tokenizer built on top of it (`spec.md` §4.3):
//! the unit of decoding. A `Key` owns a compiled trie over a merged
//! `CharacterGroup` and performs longest-prefix (or, in suffix mode,
//! longest-suffix) matching.
//!
//! The trie itself is an index-addressed arena (`Vec<TrieNode>`) rather
//! than a tree of `Box`ed nodes, the same way the teacher's SentencePiece
//! and BPE symbol lists are `Vec`-backed linked lists addressed by index
//! instead of owned pointers (`spec.md` §9 "Candidate storage": avoid
//! cyclic ownership between trie nodes and candidate lists).

use crate::group::CharacterGroup;
use crate::replacement::ReplacementList;
use crate::Error;
use std::collections::HashMap;

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, usize>,
    /// Present iff a token ends at this node.
    terminal: bool,
}

/// A longest-match index over a set of token strings. Generic over its
/// tokens so it can back both `Key` (romanized tokens) and the pattern
/// expander's alias recognition (`crate::pattern`), which scans a rule's
/// LHS preferring the longest declared alias at each position — the same
/// longest-prefix-match primitive.
#[derive(Debug)]
pub(crate) struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    pub(crate) fn build<'a>(tokens: impl Iterator<Item = &'a str>) -> Self {
        let mut trie = Trie {
            nodes: vec![TrieNode::default()],
        };
        for token in tokens {
            trie.insert(token);
        }
        trie
    }

    fn insert(&mut self, token: &str) {
        let mut node = ROOT;
        for ch in token.chars() {
            node = *self.nodes[node].children.entry(ch).or_insert_with(|| {
                self.nodes.push(TrieNode::default());
                self.nodes.len() - 1
            });
        }
        self.nodes[node].terminal = true;
    }

    /// Walks `s` from the start, returning the byte length of the
    /// longest prefix that terminates at a trie node, or `None` if no
    /// prefix of length >= 1 matches. Ties are impossible: trie edges
    /// are keyed by character, so each token has a unique path
    /// (`spec.md` §4.3 "Tie-breaking").
    pub(crate) fn longest_prefix(&self, s: &str) -> Option<usize> {
        let mut node = ROOT;
        let mut best: Option<usize> = None;
        let mut consumed = 0usize;
        for ch in s.chars() {
            let next = match self.nodes[node].children.get(&ch) {
                Some(&idx) => idx,
                None => break,
            };
            consumed += ch.len_utf8();
            node = next;
            if self.nodes[node].terminal {
                best = Some(consumed);
            }
        }
        best
    }
}

/// A named, compiled tokenizer over a merged character group (`spec.md`
/// §3 "Key"). Prefix keys match from the front of the input; suffix keys
/// match from the end.
pub struct Key {
    name: String,
    group: CharacterGroup,
    trie: Trie,
    suffix: bool,
}

impl Key {
    pub(crate) fn new(name: String, group: CharacterGroup, suffix: bool) -> Self {
        let trie = if suffix {
            // Suffix mode: the trie is built over reversed tokens so that
            // a longest-prefix walk over the reversed input finds the
            // longest matching suffix of the original input.
            let reversed: Vec<String> = group.tokens().map(|t| t.chars().rev().collect()).collect();
            Trie::build(reversed.iter().map(|s| s.as_str()))
        } else {
            Trie::build(group.tokens())
        };
        Key {
            name,
            group,
            trie,
            suffix,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_suffix(&self) -> bool {
        self.suffix
    }

    /// The merged group this key was built from — used by the profile
    /// compiler (`crate::profile`) to seed a child key's starting group
    /// from its parent's.
    pub(crate) fn group(&self) -> &CharacterGroup {
        &self.group
    }

    /// `key[token]` (spec.md §4.3 "Access"): the list stored for exactly
    /// that token.
    pub fn token(&self, token: &str) -> Result<&ReplacementList, Error> {
        self.group
            .get(token)
            .ok_or_else(|| Error::NoSuchToken(token.to_string()))
    }

    /// Consumes the longest prefix (or, in suffix mode, longest suffix)
    /// of `word` that matches a token in this key's group, returning its
    /// `ReplacementList` and the unconsumed remainder.
    pub fn getpart<'w>(&self, word: &'w str) -> Result<(ReplacementList, &'w str), Error> {
        if self.suffix {
            let reversed: String = word.chars().rev().collect();
            let matched_len = self
                .trie
                .longest_prefix(&reversed)
                .ok_or_else(|| Error::NoMatch(word.to_string()))?;
            let matched_token_reversed = &reversed[..matched_len];
            let matched_token: String = matched_token_reversed.chars().rev().collect();
            let list = self
                .group
                .get(&matched_token)
                .ok_or_else(|| Error::NoMatch(word.to_string()))?
                .clone();
            let split_at = word.len() - matched_len;
            Ok((list, &word[..split_at]))
        } else {
            let matched_len = self
                .trie
                .longest_prefix(word)
                .ok_or_else(|| Error::NoMatch(word.to_string()))?;
            let matched_token = &word[..matched_len];
            let list = self
                .group
                .get(matched_token)
                .ok_or_else(|| Error::NoMatch(word.to_string()))?
                .clone();
            Ok((list, &word[matched_len..]))
        }
    }

    /// Repeated `getpart` until the remainder is empty (spec.md §4.3
    /// "getallparts"). In suffix mode the result sequence is reordered to
    /// left-to-right so that concatenating `.key` across the sequence
    /// reproduces `word` (spec.md §8 "Coverage").
    pub fn getallparts(&self, word: &str) -> Result<Vec<ReplacementList>, Error> {
        let mut parts = Vec::new();
        let mut remaining = word;
        while !remaining.is_empty() {
            let (list, rest) = self.getpart(remaining)?;
            parts.push(list);
            remaining = rest;
        }
        if self.suffix {
            parts.reverse();
        }
        Ok(parts)
    }
}
