//! Common utilities for dispatch integration tests.

use std::sync::Arc;

use switchyard_dispatch::facets::{self, CutFacet, InterfaceInit, LoupeFacet, OwnershipFacet};
use switchyard_dispatch::{Backend, BackendError, CallContext, Dispatcher, DispatcherBuilder};
use switchyard_primitives::invocation::encode_output;
use switchyard_primitives::{Address, Invocation, Selector};
use switchyard_registry::{DiamondCut, Facet, FacetCut};

pub const OWNER: Address = Address::from_low_u64(0xaa);
pub const CUT: Address = Address::from_low_u64(1);
pub const LOUPE: Address = Address::from_low_u64(2);
pub const OWNERSHIP: Address = Address::from_low_u64(3);
pub const TEST1: Address = Address::from_low_u64(4);
pub const TEST2: Address = Address::from_low_u64(5);
pub const INIT: Address = Address::from_low_u64(9);

/// Backend answering every selector it lists with its own name.
///
/// Records the last selector it saw before deciding whether to serve it.
pub struct Recorder {
	pub name: &'static str,
	pub selectors: Vec<Selector>,
}

impl Recorder {
	pub fn new(name: &'static str, selectors: Vec<Selector>) -> Arc<Self> {
		Arc::new(Self { name, selectors })
	}
}

impl Backend for Recorder {
	fn name(&self) -> &'static str {
		self.name
	}

	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError> {
		ctx.storage.set(&format!("recorder.{}.last", self.name), &call.selector)?;
		if !self.selectors.contains(&call.selector) {
			return Err(BackendError::UnsupportedSelector(call.selector));
		}
		Ok(encode_output(self.name)?)
	}
}

/// `test1Func1..=test1Func20`.
pub fn test1_selectors() -> Vec<Selector> {
	(1..=20).map(|n| Selector::from_u32(0x1000_0000 + n)).collect()
}

/// `test2Func1..=test2Func20`.
pub fn test2_selectors() -> Vec<Selector> {
	(1..=20).map(|n| Selector::from_u32(0x2000_0000 + n)).collect()
}

pub fn test1_func(n: u32) -> Selector {
	Selector::from_u32(0x1000_0000 + n)
}

pub fn test2_func(n: u32) -> Selector {
	Selector::from_u32(0x2000_0000 + n)
}

/// Test1 also implements `supportsInterface`, so it can take it over.
pub fn test1_backend() -> Arc<Recorder> {
	let mut selectors = test1_selectors();
	selectors.push(facets::SUPPORTS_INTERFACE);
	Recorder::new("test1", selectors)
}

pub fn test2_backend() -> Arc<Recorder> {
	Recorder::new("test2", test2_selectors())
}

/// Deploys the reference layout: cut facet bound at construction, then loupe
/// and ownership added with the interface-init migration.
pub fn deploy_reference() -> Dispatcher {
	let _ = tracing_subscriber::fmt::try_init();
	DispatcherBuilder::new(OWNER)
		.label("reference")
		.backend(CUT, Arc::new(CutFacet))
		.backend(LOUPE, Arc::new(LoupeFacet))
		.backend(OWNERSHIP, Arc::new(OwnershipFacet))
		.backend(INIT, Arc::new(InterfaceInit))
		.backend(TEST1, test1_backend())
		.backend(TEST2, test2_backend())
		.cut_facet(CUT)
		.initial_cut(
			DiamondCut::new([
				FacetCut::add(LOUPE, LoupeFacet::SELECTORS),
				FacetCut::add(OWNERSHIP, OwnershipFacet::SELECTORS),
			])
			.with_migration(INIT, facets::INIT.as_bytes().to_vec()),
		)
		.build()
		.unwrap()
}

pub fn sorted(mut selectors: Vec<Selector>) -> Vec<Selector> {
	selectors.sort();
	selectors
}

pub fn facets_of(d: &Dispatcher) -> Vec<Facet> {
	d.call_typed(facets::FACETS, OWNER, &()).unwrap()
}

pub fn facet_addresses(d: &Dispatcher) -> Vec<Address> {
	d.call_typed(facets::FACET_ADDRESSES, OWNER, &()).unwrap()
}

pub fn facet_function_selectors(d: &Dispatcher, backend: Address) -> Vec<Selector> {
	d.call_typed(facets::FACET_FUNCTION_SELECTORS, OWNER, &backend).unwrap()
}

pub fn facet_address(d: &Dispatcher, selector: Selector) -> Address {
	d.call_typed(facets::FACET_ADDRESS, OWNER, &selector).unwrap()
}

pub fn supports_interface(d: &Dispatcher, id: Selector) -> bool {
	d.call_typed(facets::SUPPORTS_INTERFACE, OWNER, &id).unwrap()
}
