//! Sediment - a temporal append-log index.
//!
//! A `Sediment` holds the revision histories of many independent entities
//! in one append-only arena. Each history (a *chain*) is a red-black tree
//! threaded through the arena, addressed from outside only by its `Head`,
//! the index of its newest bed.
//!
//! It supports three things at once:
//!
//! - **Point-in-time lookup**: the value of a chain as of time T, in O(log n).
//! - **Append**: a new revision in O(1) amortized.
//! - **Erosion**: dropping every revision after time T, across every chain,
//!   in time proportional to what is dropped.
//!
//! Erosion works because deposits must arrive in non-decreasing time order
//! across the whole arena, so the newest revisions always sit at the end of
//! the arena and can be popped off.
//!
//! # Quick Start
//!
//! ```
//! use sediment::Sediment;
//!
//! let mut sediment = Sediment::new();
//! let mut head = sediment.deposit("draft", 1, None);
//! head = sediment.deposit("review", 4, Some(head));
//! head = sediment.deposit("final", 9, Some(head));
//!
//! let stratum = sediment.stratum(Some(head));
//! assert_eq!(stratum.value(&5), Some(&"review"));
//! assert_eq!(stratum.value(&0), None);
//!
//! // Drop everything after instant 4 and recover the head.
//! let rollbacks = sediment.erode(&4);
//! let head = rollbacks.head(head);
//! assert_eq!(sediment.stratum(head).value(&100), Some(&"review"));
//! ```
//!
//! # Handles
//!
//! `Index` and `Head` are plain offsets. They are never relocated, but an
//! erosion may pop the bed they point at. After every `erode`, pass each
//! cached head through the returned `Rollbacks` before using it again, or
//! keep heads in a `Ledger`, which does this itself.
//!
//! # Threading
//!
//! Single writer. Nothing here locks; shared `&Sediment` queries are fine as
//! long as no deposit or erosion runs alongside them.

mod balance;
mod bed;
mod deposit;
mod erosion;
mod error;
mod index;
mod ledger;
mod sediment;
mod stratum;

pub use bed::Bed;
pub use bed::Color;
pub use erosion::Rollbacks;
pub use error::DepositError;
pub use error::Violation;
pub use index::Head;
pub use index::Index;
pub use ledger::Ledger;
pub use sediment::Sediment;
pub use stratum::Strata;
pub use stratum::Stratum;
