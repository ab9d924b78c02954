//! Packed selector table.
//!
//! # Role
//!
//! Pure data holder for the routing state: the forward map (selector → backend,
//! position), one packed selector list per backend, and the list of backends
//! that currently own at least one selector. It exposes read-only queries;
//! structural changes go through [`SelectorTable::apply_cut`], the only caller
//! of the crate-private `bind`/`unbind` pair.
//!
//! # Layout
//!
//! ```text
//! entries:  sel_a -> (B1, 0)   sel_b -> (B1, 1)   sel_c -> (B2, 0)
//! slots:    B1 -> [sel_a, sel_b] @0     B2 -> [sel_c] @1
//! backends: [B1, B2]
//! ```
//!
//! Every packed list records its own index in `backends`, and every forward
//! entry records its index in its backend's list, so removal never scans.
//!
//! # Invariants
//!
//! See [`crate::invariants::catalog`] for the full list with enforcement sites.

use rustc_hash::FxHashMap;
use switchyard_primitives::{Address, Selector};

/// Forward-map record for one bound selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetEntry {
	/// Backend the selector routes to.
	pub backend: Address,
	/// Index of the selector in that backend's packed list.
	pub position: usize,
}

/// Packed selector list of one backend plus its index in the backend list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BackendSlot {
	pub(crate) selectors: Vec<Selector>,
	pub(crate) address_position: usize,
}

/// Selector → backend routing table with an O(1) reverse index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorTable {
	pub(crate) entries: FxHashMap<Selector, FacetEntry>,
	pub(crate) slots: FxHashMap<Address, BackendSlot>,
	pub(crate) backends: Vec<Address>,
}

impl SelectorTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the backend a selector routes to.
	#[inline]
	pub fn lookup(&self, selector: Selector) -> Option<Address> {
		self.entries.get(&selector).map(|e| e.backend)
	}

	/// Returns the backend and packed position of a selector.
	#[inline]
	pub fn position_of(&self, selector: Selector) -> Option<(Address, usize)> {
		self.entries.get(&selector).map(|e| (e.backend, e.position))
	}

	/// Returns the forward-map record of a selector.
	#[inline]
	pub fn entry(&self, selector: Selector) -> Option<FacetEntry> {
		self.entries.get(&selector).copied()
	}

	/// Returns true if the selector is bound to any backend.
	#[inline]
	pub fn contains(&self, selector: Selector) -> bool {
		self.entries.contains_key(&selector)
	}

	/// Returns the packed selector list of a backend.
	///
	/// Unknown or inert backends yield an empty slice. The order is a layout
	/// artifact and changes whenever a non-tail selector is removed.
	pub fn selectors_of(&self, backend: Address) -> &[Selector] {
		self.slots
			.get(&backend)
			.map_or(&[], |slot| slot.selectors.as_slice())
	}

	/// Returns every backend owning at least one selector.
	pub fn all_backends(&self) -> &[Address] {
		&self.backends
	}

	/// Returns the number of bound selectors.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if no selector is bound.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates `(selector, entry)` pairs in unspecified order.
	pub fn iter_entries(&self) -> impl Iterator<Item = (Selector, FacetEntry)> + '_ {
		self.entries.iter().map(|(sel, entry)| (*sel, *entry))
	}

	/// Appends `selector` to the tail of `backend`'s packed list.
	///
	/// The caller guarantees `selector` is unbound and `backend` is not null.
	pub(crate) fn bind(&mut self, selector: Selector, backend: Address) {
		debug_assert!(!self.entries.contains_key(&selector), "bind of bound selector {selector}");
		debug_assert!(!backend.is_null(), "bind to null backend");

		let next_address_position = self.backends.len();
		let slot = self.slots.entry(backend).or_insert_with(|| BackendSlot {
			selectors: Vec::new(),
			address_position: next_address_position,
		});
		if slot.selectors.is_empty() {
			self.backends.push(backend);
		}

		let position = slot.selectors.len();
		slot.selectors.push(selector);
		self.entries.insert(selector, FacetEntry { backend, position });
	}

	/// Swap-removes `selector` from its backend's packed list.
	///
	/// The last selector of the list moves into the vacated slot and its
	/// forward entry is re-pointed. A backend whose list empties is
	/// swap-removed from the backend list the same way.
	pub(crate) fn unbind(&mut self, selector: Selector) -> Option<FacetEntry> {
		let removed = self.entries.remove(&selector)?;
		let slot = self.slots.get_mut(&removed.backend)?;

		slot.selectors.swap_remove(removed.position);
		if let Some(&moved) = slot.selectors.get(removed.position)
			&& let Some(entry) = self.entries.get_mut(&moved)
		{
			entry.position = removed.position;
		}

		if slot.selectors.is_empty() {
			let address_position = slot.address_position;
			self.slots.remove(&removed.backend);
			self.backends.swap_remove(address_position);
			if let Some(&moved) = self.backends.get(address_position)
				&& let Some(moved_slot) = self.slots.get_mut(&moved)
			{
				moved_slot.address_position = address_position;
			}
		}

		Some(removed)
	}
}
