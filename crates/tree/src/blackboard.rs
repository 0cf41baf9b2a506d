//! Shared, tree-shaped scratch store threaded through a run.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// One slot in a board: a plain JSON value or a nested board.
#[derive(Debug, Clone)]
enum Entry {
    Value(Value),
    Board(Blackboard),
}

/// A nested, string-keyed, mutable store.
///
/// `Blackboard` is a cheap-clone handle: clones share the same underlying
/// map, which is how sibling nodes under one composite observe each other's
/// writes. Concurrent writers race by design; per-key last-write-wins is
/// part of the contract and there is no cross-key atomicity. The internal
/// lock exists only to satisfy aliasing rules, is held for the duration of
/// a single operation, and is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    entries: Arc<Mutex<BTreeMap<String, Entry>>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        // A poisoned board only means a writer panicked mid-tick; the data
        // is still the last-write-wins view the contract promises.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a value under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.lock().insert(key.into(), Entry::Value(value));
    }

    /// Read the plain value under `key`. Returns `None` for missing keys
    /// and for keys holding a nested board.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.lock().get(key) {
            Some(Entry::Value(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Get or create the nested board under `key`.
    ///
    /// A plain value already stored under `key` is replaced by a fresh
    /// board; reserving one key for both uses is a caller error.
    pub fn board(&self, key: &str) -> Blackboard {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(Entry::Board(board)) => board.clone(),
            _ => {
                let board = Blackboard::new();
                entries.insert(key.to_string(), Entry::Board(board.clone()));
                board
            }
        }
    }

    /// True if `key` currently holds a nested board.
    pub fn contains_board(&self, key: &str) -> bool {
        matches!(self.lock().get(key), Some(Entry::Board(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Keys currently present, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Recursive JSON view of the board, the run's audit trail.
    pub fn snapshot(&self) -> Value {
        let entries = self.lock();
        let mut map = serde_json::Map::new();
        for (key, entry) in entries.iter() {
            let value = match entry {
                Entry::Value(value) => value.clone(),
                Entry::Board(board) => board.snapshot(),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}
