//! Sharded, process-wide string interner for declaration names.
//!
//! Every [`CirName`](crate::CirName) is an index into this interner. The
//! interner is global because names are compared across targets, resolvers
//! and worker threads of one commonization run, and must stay comparable
//! without threading an interner handle through every value type.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Number of shards.
pub(crate) const NUM_SHARDS: usize = 16;

/// Maximum local index per shard.
pub(crate) const MAX_LOCAL: u32 = 0x0FFF_FFFF;

/// Error when interning a name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// Shard exceeded capacity.
    #[error("name interner shard {shard_idx} exceeded capacity: {count} names (max 0x0FFF_FFFF)")]
    ShardOverflow { shard_idx: usize, count: usize },
}

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
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
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded interner. Uses one `RwLock` per shard; lookups take the read lock.
pub struct NameInterner {
    shards: [RwLock<InternShard>; NUM_SHARDS],
    total_count: AtomicUsize,
}

static GLOBAL_INTERNER: OnceLock<NameInterner> = OnceLock::new();

/// The interner shared by every name in the process.
pub fn interner() -> &'static NameInterner {
    GLOBAL_INTERNER.get_or_init(NameInterner::new)
}

impl NameInterner {
    fn new() -> Self {
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

    #[inline]
    fn shard_for(s: &str) -> usize {
        if s.is_empty() {
            return 0;
        }
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % NUM_SHARDS
    }

    /// Try to intern a string, returning `(shard, local)` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<(u32, u32), InternError> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Ok((shard_idx_u32, local));
            }
        }

        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(&local) = guard.map.get(s) {
            return Ok((shard_idx_u32, local));
        }

        let count = guard.strings.len();
        let local = u32::try_from(count)
            .ok()
            .filter(|local| *local <= MAX_LOCAL)
            .ok_or(InternError::ShardOverflow { shard_idx, count })?;

        // Names live for the whole process, like the interner itself.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);

        Ok((shard_idx_u32, local))
    }

    /// Look up the string stored at `(shard, local)`.
    pub(crate) fn lookup(&self, shard: usize, local: usize) -> &'static str {
        let guard = self.shards[shard].read();
        guard.strings.get(local).copied().unwrap_or("")
    }

    /// Total number of interned names.
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Always false: the empty name is pre-interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests;
