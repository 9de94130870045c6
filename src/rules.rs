//! Rule lookup by name.

use std::collections::HashMap;

use crate::schema::{Param, Params, Rule};

/// Index from rule name to that rule's parameters.
///
/// When a name recurs, the last occurrence wins. Rules without a name
/// are skipped.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex<'a> {
    entries: HashMap<&'a str, &'a Params>,
}

impl<'a> RuleIndex<'a> {
    pub fn new(rules: &'a [Rule]) -> Self {
        let mut entries = HashMap::with_capacity(rules.len());
        for rule in rules {
            let Some(name) = rule.name.as_deref() else {
                continue;
            };
            entries.insert(name, &rule.params);
        }
        Self { entries }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&'a Params> {
        self.entries.get(name).copied()
    }

    /// Look up a single parameter of a rule.
    pub fn param(&self, rule: &str, key: &str) -> Option<&'a Param> {
        self.get(rule).and_then(|params| params.get(key))
    }

    /// Candidates present in the index, in candidate order.
    ///
    /// The order of `candidates` is the priority; the order in which rules
    /// were applied plays no part.
    pub fn find<'c>(&self, candidates: &'c [&'c str]) -> Vec<&'c str> {
        candidates
            .iter()
            .copied()
            .filter(|name| self.contains(name))
            .collect()
    }

    /// First candidate present in the index.
    pub fn first_of<'c>(&self, candidates: &'c [&'c str]) -> Option<&'c str> {
        candidates.iter().copied().find(|name| self.contains(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
