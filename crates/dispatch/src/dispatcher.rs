//! Single entry point routing invocations to backends.
//!
//! # Concurrency
//!
//! - Routing lookups read the snapshot the call started from.
//! - Calls are serialized by the storage mutex: one call, including any cut
//!   and migration it triggers, completes before the next begins.
//! - A call runs against staged copies of storage and routing. Both are
//!   committed together, and only when the backend succeeds.
//! - Cut observers are notified after the storage mutex is released.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use switchyard_primitives::invocation::decode_output;
use switchyard_primitives::{Address, Invocation, Selector};
use switchyard_registry::{CutReceipt, DiamondCut, RuntimeRegistry};
use tracing::debug;

use crate::backend::{BackendSet, CallContext};
use crate::error::DispatchError;
use crate::facets::DIAMOND_CUT;
use crate::storage::Storage;

/// Routes invocations through a live selector registry.
#[derive(Debug)]
pub struct Dispatcher {
	registry: Arc<RuntimeRegistry>,
	backends: BackendSet,
	storage: Mutex<Storage>,
}

impl Dispatcher {
	/// Assembles a dispatcher from already-initialized parts.
	///
	/// Most callers want [`crate::DispatcherBuilder`], which also seeds the
	/// owner and the cut selector.
	pub fn from_parts(registry: Arc<RuntimeRegistry>, backends: BackendSet, storage: Storage) -> Self {
		Self {
			registry,
			backends,
			storage: Mutex::new(storage),
		}
	}

	/// Routes `call` to the backend bound to its selector.
	///
	/// An unbound selector yields [`DispatchError::UnknownSelector`]; this is
	/// a normal negative result, not a fault. A failed call leaves storage and
	/// routing exactly as they were.
	pub fn call(&self, call: &Invocation) -> Result<Vec<u8>, DispatchError> {
		let mut storage = self.storage.lock();
		let mut routing = self.registry.begin();

		let Some(address) = routing.table().lookup(call.selector) else {
			debug!(selector = %call.selector, caller = %call.caller, "unbound selector");
			return Err(DispatchError::UnknownSelector(call.selector));
		};
		let Some(backend) = self.backends.get(address) else {
			return Err(DispatchError::BackendNotDeployed {
				selector: call.selector,
				backend: address,
			});
		};
		debug!(
			selector = %call.selector,
			backend = %address,
			name = backend.name(),
			caller = %call.caller,
			version = routing.base_version(),
			"dispatch"
		);

		let mut staged = storage.clone();
		let mut ctx = CallContext {
			caller: call.caller,
			storage: &mut staged,
			routing: &mut routing,
			backends: &self.backends,
		};
		let output = backend
			.invoke(&mut ctx, call)
			.map_err(|source| DispatchError::from_backend(call.selector, address, source))?;

		let events = self.registry.publish(routing)?;
		*storage = staged;
		drop(storage);

		self.registry.notify(&events);
		Ok(output)
	}

	/// Builds an [`Invocation`] from parts and routes it.
	pub fn dispatch(&self, selector: Selector, caller: Address, payload: Vec<u8>) -> Result<Vec<u8>, DispatchError> {
		self.call(&Invocation::new(selector, caller, payload))
	}

	/// Splits raw calldata into selector and payload and routes it.
	pub fn dispatch_calldata(&self, caller: Address, calldata: &[u8]) -> Result<Vec<u8>, DispatchError> {
		self.call(&Invocation::from_calldata(caller, calldata)?)
	}

	/// Encodes `args`, routes the call, and decodes the result as `R`.
	pub fn call_typed<A, R>(&self, selector: Selector, caller: Address, args: &A) -> Result<R, DispatchError>
	where
		A: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		let output = self.call(&Invocation::encode(selector, caller, args)?)?;
		Ok(decode_output(&output)?)
	}

	/// Submits `cut` through whatever backend currently serves the cut selector.
	pub fn diamond_cut(&self, caller: Address, cut: &DiamondCut) -> Result<CutReceipt, DispatchError> {
		self.call_typed(DIAMOND_CUT, caller, cut)
	}

	/// The routing registry, for loupe queries and cut subscriptions.
	pub fn registry(&self) -> &Arc<RuntimeRegistry> {
		&self.registry
	}

	pub fn backends(&self) -> &BackendSet {
		&self.backends
	}

	/// Runs `f` against committed storage.
	pub fn with_storage<T>(&self, f: impl FnOnce(&Storage) -> T) -> T {
		f(&self.storage.lock())
	}
}
