//! Appending revisions.
//!
//! A deposit always lands on top of the arena and always becomes the
//! rightmost bed of its chain, since it carries the newest instant of both.
//! That is what lets erosion later remove it by popping the arena.

use tracing::trace;

use crate::bed::Bed;
use crate::bed::Color;
use crate::error::DepositError;
use crate::index::Head;
use crate::sediment::Sediment;
use crate::sediment::Side;

impl<V, T: Ord> Sediment<V, T> {
    /// Record `value` as visible from `since` onward, on the chain topped by
    /// `after`, or on a new chain if `after` is `None`. Returns the new head.
    ///
    /// `since` must not predate the newest bed in the arena, and `after`
    /// must be the current head of a live chain. Both are only checked in
    /// debug builds; see `try_deposit` for the checked variant.
    ///
    /// An arena holds at most `u32::MAX` beds; depositing past that panics.
    pub fn deposit(&mut self, value: V, since: T, after: Option<Head>) -> Head {
        if cfg!(debug_assertions) {
            if let Err(error) = self.admits(&since, after) {
                panic!("invalid deposit: {}", error);
            }
        }
        return self.deposit_unchecked(value, since, after);
    }

    /// Like `deposit`, but rejects revisions that would break the arena's
    /// ordering instead of asserting. The arena is untouched on error.
    pub fn try_deposit(
        &mut self,
        value: V,
        since: T,
        after: Option<Head>,
    ) -> Result<Head, DepositError> {
        self.admits(&since, after)?;
        return Ok(self.deposit_unchecked(value, since, after));
    }

    fn admits(&self, since: &T, after: Option<Head>) -> Result<(), DepositError> {
        if let Some(head) = after {
            if head.index >= self.end() {
                return Err(DepositError::Stale {
                    head: head.index,
                    end: self.end(),
                });
            }
            if !self.is_head(head.index) {
                return Err(DepositError::NotHead { index: head.index });
            }
        }
        if let Some(top) = self.top() {
            if *since < self.bed(top).since {
                return Err(DepositError::OutOfOrder { top });
            }
        }
        return Ok(());
    }

    fn deposit_unchecked(&mut self, value: V, since: T, after: Option<Head>) -> Head {
        let index = self.end();
        match after {
            None => {
                self.beds.push(Bed::new(index, value, since, Color::Black));
            }
            Some(head) => {
                self.beds.push(Bed::new(index, value, since, Color::Red));
                self.attach(index, Some((Side::Right, head.index)));
                self.balance_insertion(index);
            }
        }
        trace!(%index, chain = ?after.map(|head| head.index), "deposit");
        return Head::new(index);
    }
}
