//! Single-owner authority.

use switchyard_primitives::invocation::encode_output;
use switchyard_primitives::{Address, Invocation};
use tracing::info;

use super::{OWNER, TRANSFER_OWNERSHIP};
use crate::backend::{Backend, CallContext};
use crate::error::BackendError;
use crate::storage::Storage;

/// Storage key holding the current owner.
pub const OWNER_KEY: &str = "switchyard.ownership.owner";

/// Returns the current owner, or [`Address::ZERO`] if none was set.
pub fn owner(storage: &Storage) -> Result<Address, BackendError> {
	Ok(storage.get(OWNER_KEY)?.unwrap_or(Address::ZERO))
}

pub(crate) fn set_owner(storage: &mut Storage, owner: Address) -> Result<(), BackendError> {
	storage.set(OWNER_KEY, &owner)?;
	Ok(())
}

/// Fails with [`BackendError::Unauthorized`] unless the caller is the owner.
pub fn enforce_owner(ctx: &CallContext<'_>) -> Result<(), BackendError> {
	let owner = owner(ctx.storage)?;
	if ctx.caller != owner {
		return Err(BackendError::Unauthorized {
			caller: ctx.caller,
			owner,
		});
	}
	Ok(())
}

/// Serves `owner()` and `transferOwnership(Address)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipFacet;

impl OwnershipFacet {
	pub const SELECTORS: [switchyard_primitives::Selector; 2] = [OWNER, TRANSFER_OWNERSHIP];
}

impl Backend for OwnershipFacet {
	fn name(&self) -> &'static str {
		"ownership"
	}

	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError> {
		match call.selector {
			OWNER => Ok(encode_output(&owner(ctx.storage)?)?),
			TRANSFER_OWNERSHIP => {
				enforce_owner(ctx)?;
				let next: Address = call.decode_args()?;
				let previous = owner(ctx.storage)?;
				set_owner(ctx.storage, next)?;
				info!(%previous, %next, "ownership transferred");
				Ok(Vec::new())
			}
			other => Err(BackendError::UnsupportedSelector(other)),
		}
	}
}
