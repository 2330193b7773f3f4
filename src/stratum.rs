//! Read-only views over one chain.
//!
//! A `Stratum` borrows the sediment and remembers a head. It is `Copy`, so
//! iterating it twice simply starts over from the head. Iteration goes
//! backward in time, newest revision first, and ends at the chain's first
//! deposit.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::error::Violation;
use crate::index::Head;
use crate::index::Index;
use crate::sediment::Sediment;

pub struct Stratum<'a, V, T> {
    sediment: &'a Sediment<V, T>,
    head: Option<Index>,
}

impl<V, T> Clone for Stratum<'_, V, T> {
    fn clone(&self) -> Self {
        return *self;
    }
}

impl<V, T> Copy for Stratum<'_, V, T> {}

impl<V, T> Sediment<V, T> {
    /// A view of the chain topped by `head`. `None` gives an empty view, for
    /// entities that have no revision yet.
    pub fn stratum(&self, head: Option<Head>) -> Stratum<'_, V, T> {
        return Stratum {
            sediment: self,
            head: head.map(|head| head.index),
        };
    }

    /// Black height of the subtree under `under`, counting `under` itself.
    ///
    /// Walks the whole subtree checking that every path down to a missing
    /// child crosses the same number of black beds, that no red bed has a
    /// red child, and that every child links back to its parent. Meant for
    /// tests and diagnostics.
    pub fn blacks(&self, under: Option<Index>) -> Result<u32, Violation> {
        let Some(top) = under else {
            return Ok(0);
        };

        let mut stack: SmallVec<[(Index, u32); 64]> = SmallVec::new();
        let mut height: Option<u32> = None;
        stack.push((top, 0));

        while let Some((bed, above)) = stack.pop() {
            let red = self.bed(bed).is_red();
            let count = if red { above } else { above + 1 };

            for child in [self.left(bed), self.right(bed)] {
                let Some(child) = child else {
                    match height {
                        None => height = Some(count),
                        Some(expected) if expected != count => {
                            return Err(Violation::BlackHeight {
                                bed,
                                expected,
                                found: count,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                };
                if self.parent(child) != Some(bed) {
                    return Err(Violation::Link { bed });
                }
                if red && self.bed(child).is_red() {
                    return Err(Violation::RedRed { bed: child });
                }
                stack.push((child, count));
            }
        }
        return Ok(height.unwrap_or(0));
    }
}

impl<'a, V, T> Stratum<'a, V, T> {
    #[inline]
    pub fn head(&self) -> Option<Head> {
        return self.head.map(Head::new);
    }

    /// The root of the chain's tree.
    pub fn root(&self) -> Option<Index> {
        return self.head.map(|head| self.sediment.root(head));
    }

    /// `(value, since)` pairs, newest first.
    pub fn iter(&self) -> Strata<'a, V, T> {
        return Strata {
            sediment: self.sediment,
            next: self.head,
        };
    }

    /// Indices of the chain's beds, newest first.
    pub fn indices(&self) -> impl Iterator<Item = Index> + 'a {
        let sediment = self.sediment;
        return std::iter::successors(self.head, move |&index| sediment.predecessor(index));
    }
}

impl<'a, V, T: Ord> Stratum<'a, V, T> {
    /// The newest bed whose `since` is at or before `time`, or `None` if the
    /// whole chain postdates it. Among beds sharing an instant, the one
    /// deposited last wins.
    ///
    /// The head is the rightmost bed, so its ancestors form the right spine
    /// of the tree. Climb the spine while it is still too new, then search
    /// down from there, keeping the best bed seen so far.
    pub fn find(&self, time: &T) -> Option<Index> {
        let sediment = self.sediment;
        let head = self.head?;
        if sediment.bed(head).since <= *time {
            return Some(head);
        }

        let mut best = None;
        let mut subtree = head;
        while let Some(parent) = sediment.parent(subtree) {
            if sediment.bed(parent).since <= *time {
                best = Some(parent);
                break;
            }
            subtree = parent;
        }

        let mut cursor = Some(subtree);
        while let Some(bed) = cursor {
            if sediment.bed(bed).since <= *time {
                best = Some(bed);
                cursor = sediment.right(bed);
            } else {
                cursor = sediment.left(bed);
            }
        }
        return best;
    }

    /// The value visible as of `time`.
    pub fn value(&self, time: &T) -> Option<&'a V> {
        let sediment: &'a Sediment<V, T> = self.sediment;
        return self.find(time).map(|index| &sediment.bed(index).value);
    }

    /// Check the chain's structure, returning its black height.
    ///
    /// Beyond what `Sediment::blacks` checks, the head must be the rightmost
    /// bed of its tree, the root must be black, and walking backward from the head must
    /// never move forward in time or in the arena.
    pub fn validate(&self) -> Result<u32, Violation> {
        let sediment = self.sediment;
        let Some(head) = self.head else {
            return Ok(0);
        };
        if !sediment.is_head(head) {
            return Err(Violation::NotHead { head });
        }
        let root = sediment.root(head);
        if sediment.bed(root).is_red() {
            return Err(Violation::RedRoot { root });
        }
        let height = sediment.blacks(Some(root))?;

        let mut later = head;
        while let Some(earlier) = sediment.predecessor(later) {
            if earlier >= later || sediment.bed(earlier).since > sediment.bed(later).since {
                return Err(Violation::Order { bed: later });
            }
            later = earlier;
        }
        return Ok(height);
    }
}

impl<'a, V, T> IntoIterator for Stratum<'a, V, T> {
    type Item = (&'a V, &'a T);
    type IntoIter = Strata<'a, V, T>;

    fn into_iter(self) -> Strata<'a, V, T> {
        return self.iter();
    }
}

impl<'a, V, T> IntoIterator for &Stratum<'a, V, T> {
    type Item = (&'a V, &'a T);
    type IntoIter = Strata<'a, V, T>;

    fn into_iter(self) -> Strata<'a, V, T> {
        return self.iter();
    }
}

/// Iterator over a chain, newest revision first.
pub struct Strata<'a, V, T> {
    sediment: &'a Sediment<V, T>,
    next: Option<Index>,
}

impl<'a, V, T> Iterator for Strata<'a, V, T> {
    type Item = (&'a V, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let sediment = self.sediment;
        let index = self.next?;
        self.next = sediment.predecessor(index);
        let bed = sediment.bed(index);
        return Some((&bed.value, &bed.since));
    }
}

impl<V, T> FusedIterator for Strata<'_, V, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bed::Color;

    fn chain(instants: &[u32]) -> (Sediment<u32, u32>, Head) {
        let mut sediment = Sediment::new();
        let mut head = None;
        for &t in instants {
            head = Some(sediment.deposit(t, t, head));
        }
        return (sediment, head.unwrap());
    }

    #[test]
    fn empty_stratum() {
        let sediment: Sediment<u32, u32> = Sediment::new();
        let stratum = sediment.stratum(None);
        assert_eq!(stratum.iter().count(), 0);
        assert_eq!(stratum.find(&10), None);
        assert_eq!(stratum.validate(), Ok(0));
        assert_eq!(stratum.root(), None);
    }

    #[test]
    fn iteration_is_newest_first_and_restartable() {
        let (sediment, head) = chain(&[1, 4, 6, 9]);
        let stratum = sediment.stratum(Some(head));
        let first: Vec<u32> = stratum.iter().map(|(_, &t)| t).collect();
        let second: Vec<u32> = stratum.into_iter().map(|(&v, _)| v).collect();
        assert_eq!(first, vec![9, 6, 4, 1]);
        assert_eq!(first, second);
        assert_eq!(stratum.indices().count(), 4);
    }

    #[test]
    fn find_between_and_on_instants() {
        let instants: Vec<u32> = (0..50).map(|i| i * 10).collect();
        let (sediment, head) = chain(&instants);
        let stratum = sediment.stratum(Some(head));
        for &t in &instants {
            assert_eq!(stratum.value(&t), Some(&t));
            assert_eq!(stratum.value(&(t + 5)), Some(&t));
        }
        assert_eq!(stratum.value(&1000), Some(&490));
    }

    #[test]
    fn ties_resolve_to_latest_deposit() {
        let mut sediment = Sediment::new();
        let a = sediment.deposit('a', 1, None);
        let b = sediment.deposit('b', 2, Some(a));
        let c = sediment.deposit('c', 2, Some(b));
        let d = sediment.deposit('d', 3, Some(c));
        let stratum = sediment.stratum(Some(d));
        assert_eq!(stratum.find(&2), Some(c.index));
        assert_eq!(stratum.value(&1), Some(&'a'));
    }

    #[test]
    fn validate_reports_red_root() {
        let (mut sediment, head) = chain(&[1, 2, 3]);
        let root = sediment.root(head.index);
        sediment.paint(root, Color::Red);
        let result = sediment.stratum(Some(head)).validate();
        assert_eq!(result, Err(Violation::RedRoot { root }));
    }

    #[test]
    fn blacks_reports_uneven_height() {
        let (mut sediment, head) = chain(&[1, 2, 3, 4, 5, 6, 7]);
        let red = sediment.iter().find(|(_, bed)| bed.is_red()).map(|(index, _)| index);
        if let Some(red) = red {
            sediment.paint(red, Color::Black);
        }
        let root = sediment.root(head.index);
        assert!(matches!(sediment.blacks(Some(root)), Err(Violation::BlackHeight { .. })));
    }

    #[test]
    fn validate_rejects_interior_head() {
        let (sediment, head) = chain(&[1, 2, 3, 4]);
        let interior = sediment.root(head.index);
        let stratum = sediment.stratum(Some(Head::new(interior)));
        assert_eq!(stratum.validate(), Err(Violation::NotHead { head: interior }));
    }

    #[test]
    fn validate_rejects_left_leaf() {
        let (sediment, head) = chain(&[0, 1, 2]);
        let leaf = sediment.leftmost(sediment.root(head.index));
        assert_ne!(leaf, head.index);
        assert_eq!(sediment.right(leaf), None);
        let stratum = sediment.stratum(Some(Head::new(leaf)));
        assert_eq!(stratum.validate(), Err(Violation::NotHead { head: leaf }));
    }

    #[test]
    fn validate_rejects_left_spine_bed() {
        let instants: Vec<u32> = (0..31).collect();
        let (sediment, head) = chain(&instants);
        let root = sediment.root(head.index);
        let mut spine = Vec::new();
        let mut cursor = sediment.left(root);
        while let Some(bed) = cursor {
            spine.push(bed);
            cursor = sediment.left(bed);
        }
        assert!(spine.len() >= 2);
        for bed in spine {
            let stratum = sediment.stratum(Some(Head::new(bed)));
            assert_eq!(stratum.validate(), Err(Violation::NotHead { head: bed }));
        }
        assert!(sediment.stratum(Some(head)).validate().is_ok());
    }
}
