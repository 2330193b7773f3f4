//! The arena and its link primitives.
//!
//! Every chain in a `Sediment` is a red-black tree whose nodes live in one
//! shared `Vec`. Beds are appended in global time order, so array offset
//! order and temporal order coincide: the bed on top of the arena is always
//! the newest revision of whichever chain owns it. Erosion relies on this to
//! truncate history by popping beds off the end.
//!
//! The balancing engine lives in `balance.rs`, appends in `deposit.rs`,
//! truncation in `erosion.rs` and queries in `stratum.rs`; they all extend
//! `Sediment` with further `impl` blocks.
//!
//! Link primitives complexity:
//! - left/right/parent: O(1)
//! - leftmost/rightmost/root: O(log n)
//! - predecessor/successor: O(1) amortized, O(log n) worst case

use std::ops;

use crate::bed::Bed;
use crate::bed::Color;
use crate::index::Index;

/// Which child link a bed hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline(always)]
    pub(crate) fn flip(self) -> Side {
        return match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
    }
}

/// A collection of independent histories backed by one append-only arena.
#[derive(Clone, Debug)]
pub struct Sediment<V, T> {
    pub(crate) beds: Vec<Bed<V, T>>,
}

impl<V, T> Default for Sediment<V, T> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<V, T> Sediment<V, T> {
    /// Create an empty sediment.
    pub fn new() -> Sediment<V, T> {
        return Sediment { beds: Vec::new() };
    }

    /// Create an empty sediment with room for `capacity` beds.
    pub fn with_capacity(capacity: usize) -> Sediment<V, T> {
        return Sediment {
            beds: Vec::with_capacity(capacity),
        };
    }

    /// Number of beds across every chain.
    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.beds.len();
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.beds.is_empty();
    }

    /// The bed with the highest offset, which is also the newest overall.
    #[inline]
    pub fn top(&self) -> Option<Index> {
        return self.beds.len().checked_sub(1).map(Index::new);
    }

    /// One past the highest offset.
    #[inline(always)]
    pub fn end(&self) -> Index {
        return Index::new(self.beds.len());
    }

    /// Checked bed access.
    #[inline]
    pub fn get(&self, index: Index) -> Option<&Bed<V, T>> {
        return self.beds.get(index.offset());
    }

    /// Every bed in offset order. Diagnostic only: offsets interleave all
    /// chains, so this says nothing about any single history.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &Bed<V, T>)> {
        return self
            .beds
            .iter()
            .enumerate()
            .map(|(offset, bed)| (Index::new(offset), bed));
    }

    // =========================================================================
    // Link primitives
    // =========================================================================

    #[inline(always)]
    pub(crate) fn bed(&self, index: Index) -> &Bed<V, T> {
        debug_assert!(index.offset() < self.beds.len(), "index {} out of bounds", index);
        return &self.beds[index.offset()];
    }

    #[inline(always)]
    pub(crate) fn bed_mut(&mut self, index: Index) -> &mut Bed<V, T> {
        debug_assert!(index.offset() < self.beds.len(), "index {} out of bounds", index);
        return &mut self.beds[index.offset()];
    }

    #[inline]
    pub fn left(&self, of: Index) -> Option<Index> {
        let link = self.bed(of).left;
        return if link == of { None } else { Some(link) };
    }

    #[inline]
    pub fn right(&self, of: Index) -> Option<Index> {
        let link = self.bed(of).right;
        return if link == of { None } else { Some(link) };
    }

    #[inline]
    pub fn parent(&self, of: Index) -> Option<Index> {
        let link = self.bed(of).parent;
        return if link == of { None } else { Some(link) };
    }

    #[inline]
    pub(crate) fn child(&self, of: Index, side: Side) -> Option<Index> {
        return match side {
            Side::Left => self.left(of),
            Side::Right => self.right(of),
        };
    }

    #[inline]
    pub(crate) fn set_left(&mut self, of: Index, child: Option<Index>) {
        self.bed_mut(of).left = child.unwrap_or(of);
    }

    #[inline]
    pub(crate) fn set_right(&mut self, of: Index, child: Option<Index>) {
        self.bed_mut(of).right = child.unwrap_or(of);
    }

    #[inline]
    pub(crate) fn set_child(&mut self, of: Index, side: Side, child: Option<Index>) {
        match side {
            Side::Left => self.set_left(of, child),
            Side::Right => self.set_right(of, child),
        }
    }

    /// Where `of` hangs from its parent, or `None` for a root.
    #[inline]
    pub(crate) fn position(&self, of: Index) -> Option<(Side, Index)> {
        let parent = self.parent(of)?;
        if self.bed(parent).left == of {
            return Some((Side::Left, parent));
        }
        debug_assert_eq!(self.bed(parent).right, of, "asymmetric link at {}", of);
        return Some((Side::Right, parent));
    }

    /// Hang `child` at `position`, or make it a root if there is none.
    /// Only writes the parent's child link and the child's parent link.
    #[inline]
    pub(crate) fn attach(&mut self, child: Index, position: Option<(Side, Index)>) {
        match position {
            Some((side, parent)) => {
                self.set_child(parent, side, Some(child));
                self.bed_mut(child).parent = parent;
            }
            None => self.bed_mut(child).parent = child,
        }
    }

    #[inline]
    pub(crate) fn color(&self, of: Option<Index>) -> Color {
        return match of {
            Some(index) => self.bed(index).color,
            None => Color::Black,
        };
    }

    #[inline]
    pub(crate) fn is_red(&self, of: Option<Index>) -> bool {
        return self.color(of) == Color::Red;
    }

    #[inline]
    pub(crate) fn paint(&mut self, of: Index, color: Color) {
        self.bed_mut(of).color = color;
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    pub fn leftmost(&self, of: Index) -> Index {
        let mut current = of;
        while let Some(left) = self.left(current) {
            current = left;
        }
        return current;
    }

    pub fn rightmost(&self, of: Index) -> Index {
        let mut current = of;
        while let Some(right) = self.right(current) {
            current = right;
        }
        return current;
    }

    /// The root of the tree containing `of`.
    pub fn root(&self, of: Index) -> Index {
        let mut current = of;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        return current;
    }

    /// Whether `of` is the rightmost bed of its tree, i.e. the head of its
    /// chain. A bed without a right child is not enough: it must also hang
    /// from the right of every ancestor.
    pub fn is_head(&self, of: Index) -> bool {
        if self.right(of).is_some() {
            return false;
        }
        let mut current = of;
        while let Some((side, parent)) = self.position(current) {
            if side == Side::Left {
                return false;
            }
            current = parent;
        }
        return true;
    }

    /// In-order predecessor: the previous revision of the same chain.
    pub fn predecessor(&self, of: Index) -> Option<Index> {
        if let Some(left) = self.left(of) {
            return Some(self.rightmost(left));
        }
        let mut current = of;
        while let Some((side, parent)) = self.position(current) {
            if side == Side::Right {
                return Some(parent);
            }
            current = parent;
        }
        return None;
    }

    /// In-order successor: the next revision of the same chain.
    pub fn successor(&self, of: Index) -> Option<Index> {
        if let Some(right) = self.right(of) {
            return Some(self.leftmost(right));
        }
        let mut current = of;
        while let Some((side, parent)) = self.position(current) {
            if side == Side::Left {
                return Some(parent);
            }
            current = parent;
        }
        return None;
    }
}

impl<V, T> ops::Index<Index> for Sediment<V, T> {
    type Output = Bed<V, T>;

    #[inline(always)]
    fn index(&self, index: Index) -> &Bed<V, T> {
        return self.bed(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-link a three-bed tree: 1 is the root, 0 its left, 2 its right.
    fn triangle() -> Sediment<char, u32> {
        let mut sediment = Sediment::new();
        for (offset, value) in ['a', 'b', 'c'].into_iter().enumerate() {
            let index = Index::new(offset);
            sediment.beds.push(Bed::new(index, value, offset as u32, Color::Black));
        }
        let (a, b, c) = (Index::new(0), Index::new(1), Index::new(2));
        sediment.attach(a, Some((Side::Left, b)));
        sediment.attach(c, Some((Side::Right, b)));
        return sediment;
    }

    #[test]
    fn self_links_read_as_none() {
        let sediment = triangle();
        let a = Index::new(0);
        assert_eq!(sediment.left(a), None);
        assert_eq!(sediment.right(a), None);
        assert_eq!(sediment.parent(a), Some(Index::new(1)));
        assert_eq!(sediment.parent(Index::new(1)), None);
    }

    #[test]
    fn extremes_and_root() {
        let sediment = triangle();
        let b = Index::new(1);
        assert_eq!(sediment.leftmost(b), Index::new(0));
        assert_eq!(sediment.rightmost(b), Index::new(2));
        assert_eq!(sediment.root(Index::new(2)), b);
    }

    #[test]
    fn in_order_neighbors() {
        let sediment = triangle();
        let (a, b, c) = (Index::new(0), Index::new(1), Index::new(2));
        assert_eq!(sediment.predecessor(a), None);
        assert_eq!(sediment.predecessor(b), Some(a));
        assert_eq!(sediment.predecessor(c), Some(b));
        assert_eq!(sediment.successor(a), Some(b));
        assert_eq!(sediment.successor(b), Some(c));
        assert_eq!(sediment.successor(c), None);
    }

    #[test]
    fn only_the_right_spine_end_is_a_head() {
        let sediment = triangle();
        let (a, b, c) = (Index::new(0), Index::new(1), Index::new(2));
        assert!(sediment.is_head(c));
        // a has no right child but hangs on the left of b.
        assert!(!sediment.is_head(a));
        assert!(!sediment.is_head(b));
    }

    #[test]
    fn top_and_end() {
        let sediment = triangle();
        assert_eq!(sediment.top(), Some(Index::new(2)));
        assert_eq!(sediment.end(), Index::new(3));
        assert_eq!(Sediment::<char, u32>::new().top(), None);
    }

    #[test]
    fn iter_visits_offsets_in_order() {
        let sediment = triangle();
        let values: Vec<(usize, char)> = sediment
            .iter()
            .map(|(index, bed)| (index.offset(), *bed.value()))
            .collect();
        assert_eq!(values, vec![(0, 'a'), (1, 'b'), (2, 'c')]);
        assert_eq!(sediment[Index::new(1)].since(), &1);
        assert!(sediment.get(Index::new(3)).is_none());
    }
}
