//! Cut backend: the authorized entry point into the mutation engine.
//!
//! # Flow
//!
//! 1. Authority check (`caller == owner`).
//! 2. Code check: every add/replace backend and the migration target must be
//!    deployed, else [`CutError::BackendHasNoCode`].
//! 3. The directives are staged on a copy of the call's routing state.
//! 4. The migration calldata is dispatched to the target against copies of
//!    that routing state and of storage, so it sees the new routing.
//! 5. Both copies replace the call's state; the dispatcher publishes them
//!    only when the whole call succeeds.

use switchyard_primitives::invocation::encode_output;
use switchyard_primitives::{Invocation, Selector};
use switchyard_registry::{CutError, CutReceipt, DiamondCut, Migration};
use tracing::{debug, warn};

use super::DIAMOND_CUT;
use super::ownership::enforce_owner;
use crate::backend::{Backend, CallContext};
use crate::error::BackendError;

/// Serves `diamondCut(DiamondCut)`; returns the [`CutReceipt`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CutFacet;

impl CutFacet {
	pub const SELECTORS: [Selector; 1] = [DIAMOND_CUT];
}

impl Backend for CutFacet {
	fn name(&self) -> &'static str {
		"cut"
	}

	fn invoke(&self, ctx: &mut CallContext<'_>, call: &Invocation) -> Result<Vec<u8>, BackendError> {
		if call.selector != DIAMOND_CUT {
			return Err(BackendError::UnsupportedSelector(call.selector));
		}
		enforce_owner(ctx)?;
		let cut: DiamondCut = call.decode_args()?;
		let receipt = execute_cut(ctx, &cut)?;
		Ok(encode_output(&receipt)?)
	}
}

/// Stages `cut` into `ctx.routing` and runs its migration, without an
/// authority check.
///
/// On success `ctx.routing` holds the cut (and any cuts the migration staged)
/// and `ctx.storage` holds the migration's writes; on failure both are
/// untouched. Nothing is visible to readers until the dispatcher commits the
/// call.
pub fn execute_cut(ctx: &mut CallContext<'_>, cut: &DiamondCut) -> Result<CutReceipt, BackendError> {
	for backend in cut.target_backends().chain(cut.migration.iter().map(|m| m.target)) {
		if !ctx.backends.contains(backend) {
			return Err(CutError::BackendHasNoCode { backend }.into());
		}
	}

	let mut routing = ctx.routing.clone();
	let receipt = routing.stage(cut).inspect_err(|e| {
		warn!(version = ctx.routing.version(), error = %e, "cut rejected");
	})?;

	let mut storage = ctx.storage.clone();
	if let Some(migration) = &cut.migration {
		let mut mctx = CallContext {
			caller: ctx.caller,
			storage: &mut storage,
			routing: &mut routing,
			backends: ctx.backends,
		};
		run_migration(&mut mctx, migration).map_err(|reason| {
			warn!(migration = %migration.target, %reason, "migration failed, cut discarded");
			CutError::MigrationCallbackFailed {
				target: migration.target,
				reason,
			}
		})?;
	}

	*ctx.routing = routing;
	*ctx.storage = storage;
	Ok(receipt)
}

fn run_migration(ctx: &mut CallContext<'_>, migration: &Migration) -> Result<(), String> {
	let backends = ctx.backends;
	let Some(runner) = backends.get(migration.target) else {
		return Err(format!("no code at {}", migration.target));
	};
	let call = Invocation::from_calldata(ctx.caller, &migration.payload).map_err(|e| e.to_string())?;
	debug!(migration = %migration.target, call = %call.describe(), "running migration");
	runner.invoke(ctx, &call).map(drop).map_err(|e| e.to_string())
}
