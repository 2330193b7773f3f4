//! Truncating history.
//!
//! Erosion discards every revision newer than a cutoff, across every chain,
//! by popping beds off the top of the arena. Because offset order and time
//! order agree, the beds to remove are exactly a suffix of the arena, and
//! each popped bed is the newest, rightmost bed of its own chain. The work
//! done is proportional to the number of beds removed; chains that received
//! nothing after the cutoff are never visited.
//!
//! Heads held outside the arena may point at popped beds afterwards. The
//! `Rollbacks` table returned by `erode` maps each of them to the newest
//! surviving bed of the same chain, or to nothing if the chain is gone.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bed::Color;
use crate::index::Head;
use crate::index::Index;
use crate::sediment::Sediment;

/// Where stale indices went after one erosion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rollbacks {
    /// Every eroded index, mapped to its newest surviving ancestor.
    table: FxHashMap<Index, Option<Index>>,
    /// Indices below this were not touched.
    threshold: Index,
}

impl Rollbacks {
    /// Flatten an uptree of "eroded bed -> its chain predecessor" links so
    /// every entry points straight at a survivor.
    ///
    /// A predecessor was always deposited before its successor, so it has a
    /// lower offset. Walking the eroded indices in ascending order therefore
    /// resolves every ancestor before anything that points at it.
    pub(crate) fn compressing(
        uptree: FxHashMap<Index, Option<Index>>,
        threshold: Index,
    ) -> Rollbacks {
        let mut eroded: Vec<Index> = uptree.keys().copied().collect();
        eroded.sort_unstable();

        let mut table = FxHashMap::with_capacity_and_hasher(eroded.len(), Default::default());
        for index in eroded {
            let survivor = match uptree[&index] {
                Some(ancestor) if ancestor >= threshold => {
                    debug_assert!(ancestor < index, "uptree link {} -> {} points forward", index, ancestor);
                    table.get(&ancestor).copied().flatten()
                }
                other => other,
            };
            table.insert(index, survivor);
        }
        return Rollbacks { table, threshold };
    }

    /// The newest surviving bed of the chain `index` belonged to. Untouched
    /// indices map to themselves; `None` means the whole chain was eroded.
    ///
    /// Indices that were already out of bounds before the erosion also give
    /// `None`.
    #[inline]
    pub fn get(&self, index: Index) -> Option<Index> {
        if index < self.threshold {
            return Some(index);
        }
        return self.table.get(&index).copied().flatten();
    }

    /// Roll a head back through this table.
    #[inline]
    pub fn head(&self, head: Head) -> Option<Head> {
        return self.get(head.index).map(Head::new);
    }

    /// Roll a cached head back in place, clearing it if its chain is gone.
    #[inline]
    pub fn apply(&self, head: &mut Option<Head>) {
        *head = head.and_then(|head| self.head(head));
    }

    /// The lowest eroded offset, equal to the arena's end after erosion.
    #[inline(always)]
    pub fn threshold(&self) -> Index {
        return self.threshold;
    }

    /// Number of eroded beds.
    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.table.len();
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.table.is_empty();
    }

    /// Eroded indices and where they resolve to, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, Option<Index>)> {
        return self.table.iter().map(|(&index, &survivor)| (index, survivor));
    }
}

impl<V, T: Ord> Sediment<V, T> {
    /// Discard every bed whose `since` is later than `until`.
    ///
    /// Every head held outside the arena must be passed through the returned
    /// table before it is used again.
    pub fn erode(&mut self, until: &T) -> Rollbacks {
        let mut uptree = FxHashMap::default();
        while let Some(top) = self.top() {
            if self.bed(top).since <= *until {
                break;
            }
            let predecessor = self.predecessor(top);
            self.detach(top);
            self.beds.pop();
            uptree.insert(top, predecessor);
        }

        let rollbacks = Rollbacks::compressing(uptree, self.end());
        debug!(
            eroded = rollbacks.len(),
            threshold = %rollbacks.threshold,
            remaining = self.len(),
            "erode"
        );
        return rollbacks;
    }
}

impl<V, T> Sediment<V, T> {
    /// Unlink `bed` from its chain, rebalancing what remains. The bed keeps
    /// its slot, left with every link pointing at itself.
    ///
    /// Erosion only ever detaches the rightmost bed of a chain, which has at
    /// most a left child. A bed with two children first trades places with
    /// its in-order successor, so no value is moved between slots.
    pub(crate) fn detach(&mut self, bed: Index) {
        if let (Some(_), Some(right)) = (self.left(bed), self.right(bed)) {
            let successor = self.leftmost(right);
            self.exchange(bed, successor);
        }

        let position = self.position(bed);
        match self.left(bed).or(self.right(bed)) {
            Some(child) => {
                self.attach(child, position);
                self.paint(child, Color::Black);
            }
            None => {
                if !self.bed(bed).is_red() {
                    self.balance_removal(bed);
                }
                if let Some((side, parent)) = self.position(bed) {
                    self.set_child(parent, side, None);
                }
            }
        }

        let detached = self.bed_mut(bed);
        detached.left = bed;
        detached.right = bed;
        detached.parent = bed;
    }

    /// Swap the tree positions and colors of `upper`, which has two
    /// children, and `lower`, the leftmost bed of its right subtree.
    fn exchange(&mut self, upper: Index, lower: Index) {
        let (Some(left), Some(right)) = (self.left(upper), self.right(upper)) else {
            unreachable!("{} does not have two children", upper);
        };
        debug_assert!(self.left(lower).is_none());
        let position = self.position(upper);
        let lower_right = self.right(lower);

        if right == lower {
            self.attach(lower, position);
            self.set_right(lower, Some(upper));
            self.bed_mut(upper).parent = lower;
        } else {
            let Some(lower_parent) = self.parent(lower) else {
                unreachable!("successor {} of {} has no parent", lower, upper);
            };
            self.attach(lower, position);
            self.set_right(lower, Some(right));
            self.bed_mut(right).parent = lower;
            self.set_left(lower_parent, Some(upper));
            self.bed_mut(upper).parent = lower_parent;
        }

        self.set_left(lower, Some(left));
        self.bed_mut(left).parent = lower;
        self.set_left(upper, None);
        self.set_right(upper, lower_right);
        if let Some(lower_right) = lower_right {
            self.bed_mut(lower_right).parent = upper;
        }

        let color = self.bed(upper).color;
        let other = self.bed(lower).color;
        self.paint(upper, other);
        self.paint(lower, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(instants: std::ops::Range<u32>) -> (Sediment<u32, u32>, Head) {
        let mut sediment = Sediment::new();
        let mut head = None;
        for t in instants {
            head = Some(sediment.deposit(t, t, head));
        }
        return (sediment, head.unwrap());
    }

    fn in_order(sediment: &Sediment<u32, u32>, head: Head) -> Vec<u32> {
        let root = sediment.root(head.index);
        let first = sediment.leftmost(root);
        return std::iter::successors(Some(first), |&i| sediment.successor(i))
            .map(|i| *sediment[i].value())
            .collect();
    }

    #[test]
    fn detach_interior_bed_with_two_children() {
        let (mut sediment, head) = chain(0..31);
        let root = sediment.root(head.index);
        assert!(sediment.left(root).is_some() && sediment.right(root).is_some());
        let removed = *sediment[root].value();

        sediment.detach(root);
        let expected: Vec<u32> = (0..31).filter(|&v| v != removed).collect();
        assert_eq!(in_order(&sediment, head), expected);
        assert!(sediment.stratum(Some(head)).validate().is_ok());
    }

    #[test]
    fn detach_every_interior_bed_in_turn() {
        let (mut sediment, head) = chain(0..64);
        let mut remaining: Vec<u32> = (0..64).collect();
        // Remove every third revision below the head, one at a time.
        for value in (0..63).step_by(3) {
            sediment.detach(crate::index::Index::new(value as usize));
            remaining.retain(|&v| v != value);
            assert_eq!(in_order(&sediment, head), remaining);
            assert!(sediment.stratum(Some(head)).validate().is_ok(), "after removing {}", value);
        }
    }

    #[test]
    fn compression_skips_eroded_ancestors() {
        let mut uptree = FxHashMap::default();
        let idx = |i: usize| Index::new(i);
        uptree.insert(idx(5), Some(idx(2)));
        uptree.insert(idx(6), Some(idx(5)));
        uptree.insert(idx(7), Some(idx(6)));
        uptree.insert(idx(8), None);
        uptree.insert(idx(9), Some(idx(8)));
        let rollbacks = Rollbacks::compressing(uptree, idx(5));

        assert_eq!(rollbacks.get(idx(7)), Some(idx(2)));
        assert_eq!(rollbacks.get(idx(6)), Some(idx(2)));
        assert_eq!(rollbacks.get(idx(9)), None);
        assert_eq!(rollbacks.get(idx(4)), Some(idx(4)));
        assert_eq!(rollbacks.len(), 5);
    }

    #[test]
    fn erosion_pops_exactly_the_suffix() {
        let (mut sediment, head) = chain(0..10);
        let rollbacks = sediment.erode(&4);
        assert_eq!(sediment.len(), 5);
        assert_eq!(rollbacks.threshold(), Index::new(5));
        let head = rollbacks.head(head).unwrap();
        assert_eq!(*sediment[head.index].since(), 4);
        assert_eq!(in_order(&sediment, head), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn eroding_everything_clears_heads() {
        let (mut sediment, head) = chain(3..8);
        let rollbacks = sediment.erode(&0);
        assert!(sediment.is_empty());
        let mut cached = Some(head);
        rollbacks.apply(&mut cached);
        assert_eq!(cached, None);
    }
}
