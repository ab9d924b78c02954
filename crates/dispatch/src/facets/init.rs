//! Interface detection state and the migration that seeds it.

use std::collections::BTreeSet;

use switchyard_primitives::{Invocation, Selector};
use tracing::debug;

use super::{INIT, interface};
use crate::backend::{Backend, CallContext};
use crate::error::BackendError;
use crate::storage::Storage;

/// Storage key holding the set of supported interface ids.
pub const INTERFACES_KEY: &str = "switchyard.introspection.interfaces";

/// Returns the recorded interface ids.
pub fn supported_interfaces(storage: &Storage) -> Result<BTreeSet<Selector>, BackendError> {
	Ok(storage.get(INTERFACES_KEY)?.unwrap_or_default())
}

/// Records `ids` as supported, keeping ids already present.
pub fn declare_interfaces(
	storage: &mut Storage,
	ids: impl IntoIterator<Item = Selector>,
) -> Result<(), BackendError> {
	let mut set = supported_interfaces(storage)?;
	set.extend(ids);
	storage.set(INTERFACES_KEY, &set)?;
	Ok(())
}

/// Migration backend whose `init()` records the standard interface ids.
///
/// Run it as the migration of the first cut so the loupe's
/// `supportsInterface` answers truthfully from then on.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceInit;

impl Backend for InterfaceInit {
	fn name(&self) -> &'static str {
		"interface-init"
	}

	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError> {
		if call.selector != INIT {
			return Err(BackendError::UnsupportedSelector(call.selector));
		}
		declare_interfaces(ctx.storage, interface::STANDARD)?;
		debug!(count = interface::STANDARD.len(), "interfaces declared");
		Ok(Vec::new())
	}
}
