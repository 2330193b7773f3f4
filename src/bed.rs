//! A single versioned record in the arena.

use crate::index::Index;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// One revision of one chain, doubling as a red-black tree node.
///
/// The link fields use the bed's own `Index` to mean "none": a root points
/// at itself as parent, a leaf at itself as both children. Use the link
/// accessors on `Sediment` to get them as `Option`s.
#[derive(Clone, Debug)]
pub struct Bed<V, T> {
    pub(crate) value: V,
    pub(crate) since: T,
    pub(crate) color: Color,
    pub(crate) left: Index,
    pub(crate) right: Index,
    pub(crate) parent: Index,
}

impl<V, T> Bed<V, T> {
    /// A detached bed at `index`, with every link pointing at itself.
    pub(crate) fn new(index: Index, value: V, since: T, color: Color) -> Bed<V, T> {
        return Bed {
            value,
            since,
            color,
            left: index,
            right: index,
            parent: index,
        };
    }

    #[inline(always)]
    pub fn value(&self) -> &V {
        return &self.value;
    }

    /// The instant this revision became visible.
    #[inline(always)]
    pub fn since(&self) -> &T {
        return &self.since;
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        return self.color;
    }

    #[inline(always)]
    pub fn is_red(&self) -> bool {
        return self.color == Color::Red;
    }
}
