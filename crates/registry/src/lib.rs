//! Selector routing registry.
//!
//! # Purpose
//!
//! - Owns: the packed selector table, cut validation and application, atomic
//!   publication of snapshots, cut events, and loupe introspection.
//! - Does not own: backend execution, storage, or authorization. Those live in
//!   the dispatch crate, which stages cuts through [`StagedCuts`] and commits
//!   them together with its own storage.
//!
//! # Mental model
//!
//! - A [`SelectorTable`] maps each bound [`Selector`] to exactly one backend
//!   [`Address`], and keeps a packed selector list per backend so loupe queries
//!   and swap-removal stay O(1) per selector.
//! - A [`DiamondCut`] is a batch of [`FacetCut`] directives plus an optional
//!   [`Migration`]. Either the whole batch publishes or nothing does.
//! - [`RuntimeRegistry`] publishes immutable [`Snapshot`]s; readers load one and
//!   never block writers.
//!
//! # Key types
//!
//! | Type | Meaning |
//! |---|---|
//! | [`SelectorTable`] | Routing state with forward and reverse indices |
//! | [`FacetCut`] | One add, replace, or remove directive |
//! | [`DiamondCut`] | Directive batch plus optional migration |
//! | [`RuntimeRegistry`] | Atomic snapshot container, the only write path |
//! | [`StagedCuts`] | Cuts staged on a private table, published by commit |
//! | [`Loupe`] | Enumeration queries over any of the above |
//! | [`CutJournal`] | Observer recording published cuts for audit and replay |
//!
//! # Invariants
//!
//! See [`invariants`] and its catalog.

pub mod cut;
pub mod error;
pub mod events;
pub mod invariants;
pub mod loupe;
pub mod runtime;
pub mod snapshot;
pub mod table;

pub use cut::{CutAction, CutSummary, DiamondCut, FacetCut, Migration};
pub use error::{CutError, InvariantViolation};
pub use events::{CutApplied, CutJournal, CutObserver};
pub use loupe::{Facet, Loupe};
pub use runtime::{CutReceipt, RuntimeRegistry, StagedCuts};
pub use snapshot::Snapshot;
pub use switchyard_primitives::{Address, Selector};
pub use table::{FacetEntry, SelectorTable};
