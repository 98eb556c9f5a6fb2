//! Shared process state for parameter binding.
//!
//! The blackboard is the explicit store threaded through every invocation:
//! values are indexed by (name, type) pairs, condition flags by name.
//! Readers share a lock; writers exclude. Readers always see the latest
//! committed value for a key.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::domain::models::{ran_marker, IoBinding};

#[derive(Debug, Clone)]
struct Entry {
    binding: IoBinding,
    value: Value,
}

/// The shared, mutable key/type-indexed process state.
#[derive(Debug, Default)]
pub struct Blackboard {
    entries: RwLock<Vec<Entry>>,
    conditions: RwLock<HashMap<String, bool>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a value under a binding. An existing entry for the exact
    /// same (name, type) pair is replaced and becomes most recent.
    pub fn bind(&self, binding: IoBinding, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|entry| entry.binding != binding);
        entries.push(Entry { binding, value });
    }

    /// Convenience: commit a value under the default (by-type) binding.
    pub fn bind_by_type(&self, type_name: impl Into<String>, value: Value) {
        self.bind(IoBinding::of_type(type_name), value);
    }

    /// Look a binding up. Default-named bindings resolve by type to the
    /// most recently committed value of that type; explicit names require
    /// a (name, type) match.
    pub fn get(&self, binding: &IoBinding) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        if binding.is_default_name() {
            entries
                .iter()
                .rev()
                .find(|entry| entry.binding.type_name == binding.type_name)
                .map(|entry| entry.value.clone())
        } else {
            entries
                .iter()
                .rev()
                .find(|entry| {
                    entry.binding.name == binding.name
                        && entry.binding.type_name == binding.type_name
                })
                .map(|entry| entry.value.clone())
        }
    }

    /// Set a named condition flag.
    pub fn set_condition(&self, name: impl Into<String>, holds: bool) {
        let mut conditions = self.conditions.write().unwrap_or_else(|e| e.into_inner());
        conditions.insert(name.into(), holds);
    }

    /// Read a named condition flag, if it was ever set.
    pub fn condition(&self, name: &str) -> Option<bool> {
        let conditions = self.conditions.read().unwrap_or_else(|e| e.into_inner());
        conditions.get(name).copied()
    }

    /// Record that an action has run.
    pub fn record_completion(&self, action_name: &str) {
        self.set_condition(ran_marker(action_name), true);
    }

    /// Whether an action has run.
    pub fn has_run(&self, action_name: &str) -> bool {
        self.condition(&ran_marker(action_name)).unwrap_or(false)
    }

    /// Number of committed value entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn by_type_lookup_returns_latest_write() {
        let board = Blackboard::new();
        board.bind(IoBinding::named("first", "Report"), json!("one"));
        board.bind(IoBinding::named("second", "Report"), json!("two"));

        let latest = board.get(&IoBinding::of_type("Report"));
        assert_eq!(latest, Some(json!("two")));
    }

    #[test]
    fn named_lookup_requires_name_and_type() {
        let board = Blackboard::new();
        board.bind(IoBinding::named("draft", "Report"), json!("text"));

        assert_eq!(
            board.get(&IoBinding::named("draft", "Report")),
            Some(json!("text"))
        );
        assert_eq!(board.get(&IoBinding::named("draft", "Summary")), None);
        assert_eq!(board.get(&IoBinding::named("other", "Report")), None);
    }

    #[test]
    fn rebinding_replaces_the_entry() {
        let board = Blackboard::new();
        board.bind_by_type("Topic", json!("coffee"));
        board.bind_by_type("Topic", json!("tea"));

        assert_eq!(board.len(), 1);
        assert_eq!(board.get(&IoBinding::of_type("Topic")), Some(json!("tea")));
    }

    #[test]
    fn completion_flags_are_recorded() {
        let board = Blackboard::new();
        assert!(!board.has_run("writer.draft"));
        board.record_completion("writer.draft");
        assert!(board.has_run("writer.draft"));
        assert_eq!(board.condition("ran:writer.draft"), Some(true));
    }
}
