//! Read-only introspection over the routing state.
//!
//! The loupe mirrors the packed layout exactly: [`Loupe::facets`] lists
//! backends in backend-list order and each backend's selectors in packed
//! order, including the relocations swap-removal introduced. Callers must
//! compare memberships, not orders, across cuts.

use serde::{Deserialize, Serialize};
use switchyard_primitives::{Address, Selector};

use crate::runtime::RuntimeRegistry;
use crate::snapshot::Snapshot;
use crate::table::SelectorTable;

/// A backend paired with the selectors it currently serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
	/// Backend address.
	pub backend: Address,
	/// Packed selector list, in layout order.
	pub selectors: Vec<Selector>,
}

/// Enumeration queries over a selector table.
pub trait Loupe {
	/// Every backend with its current selector list.
	fn facets(&self) -> Vec<Facet>;

	/// Selectors bound to `backend`; empty for unknown or inert backends.
	fn facet_function_selectors(&self, backend: Address) -> Vec<Selector>;

	/// Every backend owning at least one selector.
	fn facet_addresses(&self) -> Vec<Address>;

	/// Backend serving `selector`, or [`Address::ZERO`] when unbound.
	fn facet_address(&self, selector: Selector) -> Address;
}

impl Loupe for SelectorTable {
	fn facets(&self) -> Vec<Facet> {
		self.all_backends()
			.iter()
			.map(|&backend| Facet {
				backend,
				selectors: self.selectors_of(backend).to_vec(),
			})
			.collect()
	}

	fn facet_function_selectors(&self, backend: Address) -> Vec<Selector> {
		self.selectors_of(backend).to_vec()
	}

	fn facet_addresses(&self) -> Vec<Address> {
		self.all_backends().to_vec()
	}

	fn facet_address(&self, selector: Selector) -> Address {
		self.lookup(selector).unwrap_or(Address::ZERO)
	}
}

impl Loupe for Snapshot {
	fn facets(&self) -> Vec<Facet> {
		self.table.facets()
	}

	fn facet_function_selectors(&self, backend: Address) -> Vec<Selector> {
		self.table.facet_function_selectors(backend)
	}

	fn facet_addresses(&self) -> Vec<Address> {
		self.table.facet_addresses()
	}

	fn facet_address(&self, selector: Selector) -> Address {
		self.table.facet_address(selector)
	}
}

/// Each query loads the current snapshot; consecutive calls may straddle a cut.
/// Load [`RuntimeRegistry::snapshot`] once when several answers must agree.
impl Loupe for RuntimeRegistry {
	fn facets(&self) -> Vec<Facet> {
		self.snapshot().facets()
	}

	fn facet_function_selectors(&self, backend: Address) -> Vec<Selector> {
		self.snapshot().facet_function_selectors(backend)
	}

	fn facet_addresses(&self) -> Vec<Address> {
		self.snapshot().facet_addresses()
	}

	fn facet_address(&self, selector: Selector) -> Address {
		self.snapshot().facet_address(selector)
	}
}
