//! Handles into the arena.
//!
//! An `Index` addresses one bed by its offset. Beds never move once
//! deposited, so an `Index` stays valid until erosion pops its bed off the
//! top of the arena. A `Head` is the `Index` of the most recent bed of a
//! chain, and is the only handle collaborators are expected to hold.

use std::fmt;

/// Offset of a bed in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(pub(crate) u32);

impl Index {
    /// Panics past `u32::MAX` beds, the capacity of an arena.
    #[inline(always)]
    pub(crate) fn new(offset: usize) -> Index {
        return match u32::try_from(offset) {
            Ok(offset) => Index(offset),
            Err(_) => panic!("arena offset overflow: {} beds", offset),
        };
    }

    /// The raw arena offset.
    #[inline(always)]
    pub fn offset(self) -> usize {
        return self.0 as usize;
    }
}

impl From<Index> for usize {
    fn from(index: Index) -> usize {
        return index.offset();
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "#{}", self.0);
    }
}

/// The top of a chain: the bed deposited most recently into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Head {
    pub index: Index,
}

impl Head {
    #[inline(always)]
    pub fn new(index: Index) -> Head {
        return Head { index };
    }
}

impl From<Index> for Head {
    fn from(index: Index) -> Head {
        return Head { index };
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "head {}", self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_order_follows_offset() {
        let a = Index::new(3);
        let b = Index::new(7);
        assert!(a < b);
        assert_eq!(usize::from(b), 7);
        assert_eq!(a.to_string(), "#3");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "arena offset overflow")]
    fn offsets_past_u32_panic() {
        let _ = Index::new(u32::MAX as usize + 1);
    }

    #[test]
    fn head_wraps_index() {
        let head = Head::from(Index::new(12));
        assert_eq!(head.index.offset(), 12);
        assert_eq!(head.to_string(), "head #12");
    }
}
