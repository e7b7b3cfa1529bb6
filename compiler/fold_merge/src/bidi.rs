//! Bidirectional many-to-one map with a representative per value.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use fold_diagnostic::{InternalError, InternalResult};

/// Many keys to one value, queryable in both directions.
///
/// Each value has a representative key, the first one inserted for it unless
/// changed. A value is never also a key, so following a key's value
/// terminates in one step.
///
/// The forward and inverse tables are only changed together.
#[derive(Clone, Debug)]
pub struct BidirectionalManyToOneMap<T> {
    forward: FxHashMap<T, T>,
    inverse: FxHashMap<T, BTreeSet<T>>,
    representatives: FxHashMap<T, T>,
}

impl<T> Default for BidirectionalManyToOneMap<T> {
    fn default() -> Self {
        BidirectionalManyToOneMap {
            forward: FxHashMap::default(),
            inverse: FxHashMap::default(),
            representatives: FxHashMap::default(),
        }
    }
}

impl<T> BidirectionalManyToOneMap<T>
where
    T: Copy + Eq + Hash + Ord + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` to `value`.
    ///
    /// Fails if `key` is already mapped, or if the entry would make a key a
    /// value or a value a key.
    pub fn put(&mut self, key: T, value: T) -> InternalResult<()> {
        if value == key {
            return Err(InternalError::new("bidirectional map entry maps a key to itself")
                .at(format!("{key:?}")));
        }
        if let Some(existing) = self.forward.get(&key) {
            return Err(InternalError::new(format!(
                "key is already mapped to {existing:?}"
            ))
            .at(format!("{key:?}")));
        }
        if self.inverse.contains_key(&key) {
            return Err(InternalError::new("key is already a value of the map")
                .at(format!("{key:?}")));
        }
        if self.forward.contains_key(&value) {
            return Err(InternalError::new("value is already a key of the map")
                .at(format!("{value:?}")));
        }
        self.forward.insert(key, value);
        self.inverse.entry(value).or_default().insert(key);
        self.representatives.entry(value).or_insert(key);
        Ok(())
    }

    pub fn get(&self, key: &T) -> Option<T> {
        self.forward.get(key).copied()
    }

    /// All keys of `value`, in order.
    pub fn keys_for(&self, value: &T) -> impl Iterator<Item = T> + '_ {
        self.inverse.get(value).into_iter().flatten().copied()
    }

    pub fn representative(&self, value: &T) -> Option<T> {
        self.representatives.get(value).copied()
    }

    pub fn set_representative(&mut self, value: T, key: T) -> InternalResult<()> {
        match self.inverse.get(&value) {
            Some(keys) if keys.contains(&key) => {
                self.representatives.insert(value, key);
                Ok(())
            }
            _ => Err(InternalError::new("representative is not a key of the value")
                .at(format!("{key:?}"))),
        }
    }

    pub fn contains_key(&self, key: &T) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &T) -> bool {
        self.inverse.contains_key(value)
    }

    /// Drop `key`, and its value once that has no keys left.
    pub fn remove_key(&mut self, key: &T) -> Option<T> {
        let value = self.forward.remove(key)?;
        if let Some(keys) = self.inverse.get_mut(&value) {
            keys.remove(key);
            if keys.is_empty() {
                self.inverse.remove(&value);
                self.representatives.remove(&value);
            } else if self.representatives.get(&value) == Some(key) {
                if let Some(first) = keys.first() {
                    self.representatives.insert(value, *first);
                }
            }
        }
        Some(value)
    }

    /// Drop `value` with all its keys, which are returned in order.
    pub fn remove_value(&mut self, value: &T) -> Vec<T> {
        let keys: Vec<T> = self.inverse.remove(value).into_iter().flatten().collect();
        for key in &keys {
            self.forward.remove(key);
        }
        self.representatives.remove(value);
        keys
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<(T, T)> {
        let mut entries: Vec<_> = self.forward.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        entries
    }

    /// Values sorted.
    pub fn values(&self) -> Vec<T> {
        let mut values: Vec<_> = self.inverse.keys().copied().collect();
        values.sort_unstable();
        values
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
