//! Backend seam: the trait every routed implementation satisfies and the
//! context it executes in.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use switchyard_primitives::{Address, Invocation};
use switchyard_registry::StagedCuts;

use crate::error::BackendError;
use crate::storage::Storage;

/// Execution context handed to a backend for one invocation.
///
/// `storage` is the dispatcher's storage (staged for this call), not the
/// backend's own. `routing` holds the call's staged cuts on top of the
/// snapshot the call started from; administrative facets read and extend it.
/// Both are published together only if the whole call succeeds.
pub struct CallContext<'a> {
	/// Original caller of the dispatched invocation.
	pub caller: Address,
	/// Dispatcher storage, staged for this call.
	pub storage: &'a mut Storage,
	/// Routing state, staged for this call.
	pub routing: &'a mut StagedCuts,
	/// Deployed backends of the dispatcher.
	pub backends: &'a BackendSet,
}

impl fmt::Debug for CallContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallContext")
			.field("caller", &self.caller)
			.field("storage_keys", &self.storage.len())
			.field("base_version", &self.routing.base_version())
			.field("staged_cuts", &self.routing.events().len())
			.finish()
	}
}

/// A pluggable implementation reachable through the dispatcher.
///
/// A backend receives every selector the registry routes to it, including
/// ones it does not implement; those must fail with
/// [`BackendError::UnsupportedSelector`].
pub trait Backend: Send + Sync {
	/// Short name for diagnostics.
	fn name(&self) -> &'static str;

	/// Handles one invocation against `ctx.storage`.
	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError>;
}

/// Deployed backends keyed by address.
///
/// An address present here "has code"; cuts may only route selectors to such
/// addresses.
#[derive(Clone, Default)]
pub struct BackendSet {
	by_address: FxHashMap<Address, Arc<dyn Backend>>,
}

impl fmt::Debug for BackendSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map()
			.entries(self.by_address.iter().map(|(addr, b)| (addr, b.name())))
			.finish()
	}
}

impl BackendSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Deploys `backend` at `address`, returning the one it displaced.
	pub fn insert(&mut self, address: Address, backend: Arc<dyn Backend>) -> Option<Arc<dyn Backend>> {
		self.by_address.insert(address, backend)
	}

	pub fn get(&self, address: Address) -> Option<&Arc<dyn Backend>> {
		self.by_address.get(&address)
	}

	/// Returns true if code is deployed at `address`.
	pub fn contains(&self, address: Address) -> bool {
		self.by_address.contains_key(&address)
	}

	pub fn len(&self) -> usize {
		self.by_address.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_address.is_empty()
	}

	/// Iterates deployed addresses in unspecified order.
	pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
		self.by_address.keys().copied()
	}
}
