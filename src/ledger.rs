//! Keyed histories on top of a sediment.
//!
//! A `Ledger` owns the sediment together with the one handle each tracked
//! entity holds into it. It is the usual way to use the index: symbols,
//! articles or modules record revisions under their key, and rewinding the
//! ledger routes every held head through the rollback table so no stale
//! handle survives an erosion.
//!
//! Derived state computed from several chains at once is not tracked here.
//! The ledger only bumps `epoch` on every mutation; callers caching such
//! state compare epochs to know when to recompute it.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::erosion::Rollbacks;
use crate::error::DepositError;
use crate::index::Head;
use crate::sediment::Sediment;
use crate::stratum::Strata;
use crate::stratum::Stratum;

/// A sediment plus the head of every tracked entity.
#[derive(Clone, Debug)]
pub struct Ledger<K, V, T> {
    sediment: Sediment<V, T>,
    heads: FxHashMap<K, Head>,
    epoch: u64,
}

impl<K: Hash + Eq, V, T: Ord> Default for Ledger<K, V, T> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K: Hash + Eq, V, T: Ord> Ledger<K, V, T> {
    pub fn new() -> Ledger<K, V, T> {
        return Ledger {
            sediment: Sediment::new(),
            heads: FxHashMap::default(),
            epoch: 0,
        };
    }

    /// Create a ledger with room for `capacity` revisions.
    pub fn with_capacity(capacity: usize) -> Ledger<K, V, T> {
        return Ledger {
            sediment: Sediment::with_capacity(capacity),
            heads: FxHashMap::default(),
            epoch: 0,
        };
    }

    /// Record a new revision of `key`, visible from `since` onward.
    ///
    /// Fails without recording anything if `since` predates the newest
    /// revision of any key.
    pub fn record(&mut self, key: K, value: V, since: T) -> Result<Head, DepositError> {
        let after = self.heads.get(&key).copied();
        let head = self.sediment.try_deposit(value, since, after)?;
        self.heads.insert(key, head);
        self.epoch += 1;
        return Ok(head);
    }

    /// Forget every revision after `until`, for every key. Keys left with no
    /// revision at all are dropped.
    pub fn rewind(&mut self, until: &T) -> Rollbacks {
        let rollbacks = self.sediment.erode(until);
        if rollbacks.is_empty() {
            return rollbacks;
        }

        let tracked = self.heads.len();
        self.heads.retain(|_, head| match rollbacks.head(*head) {
            Some(survivor) => {
                *head = survivor;
                true
            }
            None => false,
        });
        self.epoch += 1;
        debug!(
            eroded = rollbacks.len(),
            dropped = tracked - self.heads.len(),
            epoch = self.epoch,
            "rewind"
        );
        return rollbacks;
    }

    #[inline]
    pub fn head(&self, key: &K) -> Option<Head> {
        return self.heads.get(key).copied();
    }

    pub fn stratum(&self, key: &K) -> Stratum<'_, V, T> {
        return self.sediment.stratum(self.head(key));
    }

    /// The revisions of `key`, newest first.
    pub fn history(&self, key: &K) -> Strata<'_, V, T> {
        return self.stratum(key).iter();
    }

    /// The value of `key` as of `time`.
    pub fn value_at(&self, key: &K, time: &T) -> Option<&V> {
        return self.stratum(key).value(time);
    }

    /// The newest value of `key`.
    pub fn latest(&self, key: &K) -> Option<&V> {
        let head = self.head(key)?;
        return Some(self.sediment[head.index].value());
    }

    /// Number of tracked keys.
    #[inline]
    pub fn len(&self) -> usize {
        return self.heads.len();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.heads.is_empty();
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        return self.heads.keys();
    }

    #[inline]
    pub fn sediment(&self) -> &Sediment<V, T> {
        return &self.sediment;
    }

    /// Bumped by every `record` and every `rewind` that removed something.
    #[inline]
    pub fn epoch(&self) -> u64 {
        return self.epoch;
    }
}
