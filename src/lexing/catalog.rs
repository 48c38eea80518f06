//! Token rule tables
//!
//! A [`TokenCatalog`] is the data half of a tokenizer: an ordered list of
//! (regular expression, kind) rules plus a table of display names for the kind enum.
//! Rules are compiled fully anchored, so a rule *matches* a candidate only when it
//! matches the whole candidate string; the tokenizer grows the candidate one character at
//! a time and asks the catalog which rules still match.
//!
//! Rule order matters only to break ties: when several rules match the same candidate the
//! earliest one names the token.
//!
//! A catalog is built once by its consumer and shared by reference with every tokenizer
//! that needs it.

use super::token::TokenKind;
use regex::RegexSet;
use std::collections::HashMap;

/// One (pattern, kind) rule as declared
#[derive(Debug, Clone)]
pub struct TokenRule<K> {
    pub pattern: &'static str,
    pub kind: K,
}

/// Ordered rule set plus kind names
#[derive(Debug, Clone)]
pub struct TokenCatalog<K> {
    rules: Vec<TokenRule<K>>,
    set: RegexSet,
    names: HashMap<K, &'static str>,
}

impl<K: TokenKind> TokenCatalog<K> {
    /// Compile `rules` (in priority order) and attach `names` for diagnostics
    pub fn new(
        rules: &[(&'static str, K)],
        names: &[(K, &'static str)],
    ) -> Result<Self, regex::Error> {
        let set = RegexSet::new(rules.iter().map(|(pattern, _)| format!("^(?:{})$", pattern)))?;
        let rules = rules
            .iter()
            .map(|&(pattern, kind)| TokenRule { pattern, kind })
            .collect();
        let mut table: HashMap<K, &'static str> = names.iter().copied().collect();
        table.entry(K::NULL).or_insert("Null");
        table.entry(K::INVALID).or_insert("Invalid");

        Ok(Self {
            rules,
            set,
            names: table,
        })
    }

    pub fn rules(&self) -> &[TokenRule<K>] {
        &self.rules
    }

    /// Kinds of every rule matching the whole of `candidate`, in rule order
    pub fn matching(&self, candidate: &str) -> Vec<K> {
        self.set
            .matches(candidate)
            .iter()
            .map(|index| self.rules[index].kind)
            .collect()
    }

    /// Kind of the earliest rule matching the whole of `candidate`.
    ///
    /// This is the per-character test of the tokenizer, so a miss is answered by the
    /// set's `is_match` alone and a hit allocates nothing.
    pub fn first_match(&self, candidate: &str) -> Option<K> {
        if !self.set.is_match(candidate) {
            return None;
        }
        let index = self.set.matches(candidate).into_iter().next()?;
        Some(self.rules[index].kind)
    }

    /// Display name of `kind`
    pub fn name_of(&self, kind: K) -> &'static str {
        self.names.get(&kind).copied().unwrap_or("Unknown")
    }

    /// Reverse lookup of a display name
    pub fn kind_named(&self, name: &str) -> Option<K> {
        self.names
            .iter()
            .find(|(_, n)| **n == name)
            .map(|(kind, _)| *kind)
    }
}
