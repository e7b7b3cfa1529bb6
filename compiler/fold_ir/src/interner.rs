//! Sharded string interner for descriptors and member names.
//!
//! Every descriptor and member name in a program goes through here, so the
//! uses scan and the merge policies compare `u32`s instead of strings.
//! Lookups take a shard read lock; interning takes the write lock only on a
//! miss.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Name;

struct InternShard {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        shard.map.insert("", 0);
        shard.strings.push("");
        shard
    }
}

/// Sharded string interner for concurrent access.
///
/// Strings are leaked, which lets [`lookup`](Self::lookup) hand out
/// `&'static str` without holding the lock.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
    total_count: AtomicUsize,
}

impl StringInterner {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });
        Self {
            shards,
            total_count: AtomicUsize::new(1),
        }
    }

    /// Descriptors share long package prefixes, so hash the tail as well as
    /// the head.
    #[inline]
    fn shard_for(s: &str) -> usize {
        let bytes = s.as_bytes();
        let mut hash = 0u32;
        for byte in bytes.iter().take(4).chain(bytes.iter().rev().take(8)) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(*byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if a shard exceeds `Name::MAX_LOCAL` strings.
    pub fn intern(&self, s: &str) -> Name {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        if let Some(&local) = shard.read().map.get(s) {
            return Name::new(shard_idx_u32, local);
        }

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(s) {
            return Name::new(shard_idx_u32, local);
        }

        let local = match u32::try_from(guard.strings.len()) {
            Ok(local) if local <= Name::MAX_LOCAL => local,
            _ => panic!("interner shard {shard_idx} exceeded capacity"),
        };
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);

        Name::new(shard_idx_u32, local)
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let local = *self.shards[shard_idx].read().map.get(s)?;
        Some(Name::new(shard_idx_u32, local))
    }

    pub fn lookup(&self, name: Name) -> &'static str {
        self.shards[name.shard()].read().strings[name.local()]
    }

    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
