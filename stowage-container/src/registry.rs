//! Identifier registry with case-insensitive lookup.
//!
//! Entries are stored under the identifier exactly as supplied. A
//! second index maps each lower-cased identifier to its stored form,
//! so `"Mailer"`, `"mailer"` and `"MAILER"` all address one entry.
//!
//! Lookup tries the exact identifier first and only lower-cases on a
//! miss, so well-formed calls never allocate.

use std::borrow::Cow;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

/// A concurrent map from service identifiers to `V`.
#[derive(Debug)]
pub(crate) struct Registry<V> {
    entries: DashMap<String, V>,
    /// lower-cased identifier → identifier as stored
    folded: DashMap<String, String>,
}

impl<V: Clone> Registry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            folded: DashMap::new(),
        }
    }

    /// Inserts `value` unless the identifier (in any case) is taken.
    ///
    /// Returns `false`, leaving the registry untouched, on conflict.
    pub fn insert_new(&self, id: &str, value: V) -> bool {
        match self.folded.entry(id.to_lowercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.entries.insert(id.to_owned(), value);
                slot.insert(id.to_owned());
                true
            }
        }
    }

    /// Looks up `id`, returning the stored identifier with the value.
    pub fn lookup<'a>(&self, id: &'a str) -> Option<(Cow<'a, str>, V)> {
        if let Some(entry) = self.entries.get(id) {
            return Some((Cow::Borrowed(id), entry.value().clone()));
        }

        let stored = self.folded.get(&id.to_lowercase())?.value().clone();
        trace!(requested = id, stored = %stored, "Resolved identifier by case folding");

        let value = self.entries.get(&stored)?.value().clone();
        Some((Cow::Owned(stored), value))
    }

    /// Returns the value stored under `id`.
    pub fn get(&self, id: &str) -> Option<V> {
        self.lookup(id).map(|(_, value)| value)
    }

    /// Returns `true` if `id` is registered in any case.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id) || self.folded.contains_key(&id.to_lowercase())
    }

    /// Returns a snapshot of all entries.
    pub fn entries(&self) -> Vec<(String, V)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Returns all identifiers, as stored, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}
