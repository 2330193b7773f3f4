//! Red-black balancing over `Index` links.
//!
//! The same engine serves every chain in the arena. Nothing here allocates
//! or moves a bed: rotations and fix-ups only rewrite link and color fields,
//! so every `Index` held outside stays valid.
//!
//! Both fix-ups are written once against a `Side` and mirrored with
//! `Side::flip`, instead of duplicating the left and right cases.
//!
//! Complexity:
//! - rotate: O(1)
//! - balance_insertion: O(log n) worst case, O(1) amortized
//! - balance_removal: O(log n) worst case, at most three rotations

use crate::bed::Color;
use crate::index::Index;
use crate::sediment::Sediment;
use crate::sediment::Side;

impl<V, T> Sediment<V, T> {
    /// Rotate the subtree at `pivot` so that its child on the `rising` side
    /// takes its place. Raising the right child is a left rotation, raising
    /// the left child a right rotation. Returns the new local root.
    ///
    /// Works the same whether `pivot` is a chain root or hangs from a parent.
    pub(crate) fn rotate(&mut self, pivot: Index, rising: Side) -> Index {
        let Some(child) = self.child(pivot, rising) else {
            unreachable!("rotation at {} without a {:?} child", pivot, rising);
        };
        let position = self.position(pivot);
        let inner = self.child(child, rising.flip());

        self.set_child(pivot, rising, inner);
        if let Some(inner) = inner {
            self.bed_mut(inner).parent = pivot;
        }
        self.attach(child, position);
        self.set_child(child, rising.flip(), Some(pivot));
        self.bed_mut(pivot).parent = child;
        return child;
    }

    /// Restore the red-black invariants after linking the red bed `inserted`.
    pub(crate) fn balance_insertion(&mut self, inserted: Index) {
        let mut node = inserted;
        loop {
            let Some(parent) = self.parent(node) else {
                self.paint(node, Color::Black);
                return;
            };
            if !self.bed(parent).is_red() {
                return;
            }
            let Some((side, grandparent)) = self.position(parent) else {
                // A red root; repainting it adds one to every black height.
                self.paint(parent, Color::Black);
                return;
            };

            if let Some(uncle) = self.child(grandparent, side.flip()) {
                if self.bed(uncle).is_red() {
                    self.paint(parent, Color::Black);
                    self.paint(uncle, Color::Black);
                    self.paint(grandparent, Color::Red);
                    node = grandparent;
                    continue;
                }
            }

            let mut parent = parent;
            if self.child(parent, side.flip()) == Some(node) {
                // Inner grandchild: turn it into an outer one first.
                self.rotate(parent, side.flip());
                parent = node;
            }
            self.paint(parent, Color::Black);
            self.paint(grandparent, Color::Red);
            self.rotate(grandparent, side);
            return;
        }
    }

    /// Restore the red-black invariants ahead of unlinking `phantom`, a black
    /// bed with no children that is still hanging in its tree.
    ///
    /// The phantom carries the missing unit of black height while the loop
    /// runs. Rotations never move it away from its parent, so the caller can
    /// unlink it afterwards by clearing a single child link.
    pub(crate) fn balance_removal(&mut self, phantom: Index) {
        debug_assert!(self.left(phantom).is_none() && self.right(phantom).is_none());
        debug_assert!(!self.bed(phantom).is_red());

        let mut node = phantom;
        loop {
            if self.bed(node).is_red() {
                break;
            }
            let Some((side, parent)) = self.position(node) else {
                break;
            };
            let far = side.flip();
            let Some(mut sibling) = self.child(parent, far) else {
                unreachable!("doubly black {} has no sibling", node);
            };

            if self.bed(sibling).is_red() {
                self.paint(sibling, Color::Black);
                self.paint(parent, Color::Red);
                self.rotate(parent, far);
                let Some(next) = self.child(parent, far) else {
                    unreachable!("red sibling of {} had no children", node);
                };
                sibling = next;
            }

            let near_nephew = self.child(sibling, side);
            let far_nephew = self.child(sibling, far);
            if !self.is_red(near_nephew) && !self.is_red(far_nephew) {
                self.paint(sibling, Color::Red);
                node = parent;
                continue;
            }

            if !self.is_red(far_nephew) {
                if let Some(near) = near_nephew {
                    self.paint(near, Color::Black);
                    self.paint(sibling, Color::Red);
                    self.rotate(sibling, side);
                    sibling = near;
                }
            }

            let color = self.bed(parent).color;
            self.paint(sibling, color);
            self.paint(parent, Color::Black);
            if let Some(outer) = self.child(sibling, far) {
                self.paint(outer, Color::Black);
            }
            self.rotate(parent, far);
            return;
        }
        self.paint(node, Color::Black);
    }
}
