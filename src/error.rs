//! Error types.
//!
//! The core operations never fail: `deposit`, `erode` and `find` treat their
//! preconditions as caller invariants and only check them in debug builds.
//! These types back the checked entry points and the validation hook.

use thiserror::Error;

use crate::index::Index;

/// Why `try_deposit` refused a revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DepositError {
    /// The instant predates the newest bed in the arena. Accepting it would
    /// break the agreement between offset order and time order.
    #[error("deposit predates {top}, the newest bed in the arena")]
    OutOfOrder { top: Index },

    /// The head points past the end of the arena, usually because it was
    /// eroded and never passed through the rollback table.
    #[error("stale head {head}: the arena ends at {end}")]
    Stale { head: Index, end: Index },

    /// The index is not the newest bed of its chain.
    #[error("{index} is not the head of its chain")]
    NotHead { index: Index },
}

/// A broken structural invariant found by `Sediment::blacks` or
/// `Stratum::validate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("root {root} is red")]
    RedRoot { root: Index },

    #[error("red bed {bed} has a red parent")]
    RedRed { bed: Index },

    #[error("path ending below {bed} crosses {found} black beds, expected {expected}")]
    BlackHeight { bed: Index, expected: u32, found: u32 },

    #[error("child of {bed} does not link back to it")]
    Link { bed: Index },

    #[error("{bed} is out of order with its in-order predecessor")]
    Order { bed: Index },

    #[error("{head} is not the rightmost bed of its tree, so it is not the newest bed of its chain")]
    NotHead { head: Index },
}
