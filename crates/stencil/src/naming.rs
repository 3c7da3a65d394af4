//! Variable key assignment.
//!
//! Keys take one of three shapes:
//!
//! - `name_0`, `name_1`: standalone variables, counted per type key.
//! - `event.date`: a field of a pattern that matched once.
//! - `guest_1.name`: a field of a repeated pattern.
//!
//! A [`NameRegistry`] lives for a single detection pass, so concurrent passes
//! never share counters.

use std::collections::{HashMap, HashSet};

use log::trace;

use stencil_core::semantic::TypeKey;

/// Issues keys that are unique within one pass.
#[derive(Debug, Default)]
pub struct NameRegistry {
    counters: HashMap<TypeKey, usize>,
    issued: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next `{type}_{n}` key for a standalone variable.
    pub fn standalone(&mut self, key: TypeKey) -> String {
        loop {
            let counter = self.counters.entry(key).or_insert(0);
            let candidate = format!("{key}_{counter}");
            *counter += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Returns the key for a pattern field.
    ///
    /// `repeat_index` is `Some` when the pattern matched more than once.
    pub fn field(&mut self, prefix: &str, repeat_index: Option<usize>, field: TypeKey) -> String {
        let base = match repeat_index {
            Some(index) => format!("{prefix}_{index}.{field}"),
            None => format!("{prefix}.{field}"),
        };
        self.claim(base)
    }

    /// Number of keys issued so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn claim(&mut self, base: String) -> String {
        if self.issued.insert(base.clone()) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if self.issued.insert(candidate.clone()) {
                trace!(base = base.as_str(), key = candidate.as_str(); "Key collision resolved");
                return candidate;
            }
            suffix += 1;
        }
    }
}
