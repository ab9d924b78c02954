//! Loupe backend exposing routing introspection through dispatch.

use switchyard_primitives::invocation::encode_output;
use switchyard_primitives::{Address, Invocation, Selector};
use switchyard_registry::Loupe;

use super::init::supported_interfaces;
use super::{FACET_ADDRESS, FACET_ADDRESSES, FACET_FUNCTION_SELECTORS, FACETS, SUPPORTS_INTERFACE};
use crate::backend::{Backend, CallContext};
use crate::error::BackendError;

/// Serves the four enumeration queries and `supportsInterface`.
///
/// Queries answer from the call's routing state, so cuts staged earlier in
/// the same call are visible and a single call never mixes two versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoupeFacet;

impl LoupeFacet {
	pub const SELECTORS: [Selector; 5] = [
		FACETS,
		FACET_FUNCTION_SELECTORS,
		FACET_ADDRESSES,
		FACET_ADDRESS,
		SUPPORTS_INTERFACE,
	];
}

impl Backend for LoupeFacet {
	fn name(&self) -> &'static str {
		"loupe"
	}

	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError> {
		let table = ctx.routing.table();
		let out = match call.selector {
			FACETS => encode_output(&table.facets())?,
			FACET_FUNCTION_SELECTORS => {
				let backend: Address = call.decode_args()?;
				encode_output(&table.facet_function_selectors(backend))?
			}
			FACET_ADDRESSES => encode_output(&table.facet_addresses())?,
			FACET_ADDRESS => {
				let selector: Selector = call.decode_args()?;
				encode_output(&table.facet_address(selector))?
			}
			SUPPORTS_INTERFACE => {
				let id: Selector = call.decode_args()?;
				encode_output(&supported_interfaces(ctx.storage)?.contains(&id))?
			}
			other => return Err(BackendError::UnsupportedSelector(other)),
		};
		Ok(out)
	}
}
