//! Published registry state.
//!
//! # Role
//!
//! A [`Snapshot`] is the immutable view readers load from
//! [`crate::RuntimeRegistry`]. Holding the `Arc` pins one version of the table;
//! later cuts publish new snapshots without disturbing it.

use std::ops::Deref;

use crate::table::SelectorTable;

/// One published version of the selector table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
	/// Routing state at this version.
	pub table: SelectorTable,
	/// Number of cuts applied before this snapshot was published.
	pub version: u64,
}

impl Snapshot {
	/// Wraps a table as version zero.
	pub fn genesis(table: SelectorTable) -> Self {
		Self { table, version: 0 }
	}
}

impl Deref for Snapshot {
	type Target = SelectorTable;

	fn deref(&self) -> &SelectorTable {
		&self.table
	}
}
