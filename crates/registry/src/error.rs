use switchyard_primitives::{Address, Selector};

use crate::cut::CutAction;

/// Reasons a cut is rejected.
///
/// Every variant is raised before the staged table is published, so a failed
/// cut leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutError {
	/// The batch carried no directives.
	#[error("cut contains no directives")]
	EmptyCut,

	/// A directive named no selectors.
	#[error("directive {index} ({action}) names no selectors")]
	EmptyDirective { index: usize, action: CutAction },

	/// An add or replace directive targeted the null backend.
	#[error("directive {index} ({action}) targets the null backend")]
	NullBackend { index: usize, action: CutAction },

	/// An add directive named a selector that is already bound.
	#[error("directive {index}: selector {selector} already bound to {existing}")]
	SelectorAlreadyExists {
		index: usize,
		selector: Selector,
		existing: Address,
	},

	/// A replace or remove directive named an unbound selector.
	#[error("directive {index}: selector {selector} is not bound")]
	SelectorNotFound { index: usize, selector: Selector },

	/// A replace directive named a selector already bound to its backend.
	#[error("directive {index}: selector {selector} already routes to {backend}")]
	ReplaceNoOp {
		index: usize,
		selector: Selector,
		backend: Address,
	},

	/// A remove directive carried a real backend instead of the null sentinel.
	#[error("directive {index}: remove must use the null backend, got {backend}")]
	RemoveBackendMustBeNull { index: usize, backend: Address },

	/// A directive or migration named a backend with no deployed code.
	#[error("backend {backend} has no deployed code")]
	BackendHasNoCode { backend: Address },

	/// The post-apply migration callback failed; the staged cut was discarded.
	#[error("migration via {target} failed: {reason}")]
	MigrationCallbackFailed { target: Address, reason: String },

	/// Staged cuts were committed after another writer published.
	#[error("cuts staged on version {base} but version {current} is published")]
	StaleStage { base: u64, current: u64 },
}

/// Structural violation found by [`crate::invariants::check`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
	/// A forward entry points at a slot that holds a different selector.
	#[error("{selector} records {backend}[{position}] but that slot holds {found:?}")]
	ForwardEntryMismatch {
		selector: Selector,
		backend: Address,
		position: usize,
		found: Option<Selector>,
	},

	/// A packed list holds a selector whose forward entry points elsewhere.
	#[error("{backend}[{position}] holds {selector} which records {recorded:?}")]
	ReverseEntryMismatch {
		selector: Selector,
		backend: Address,
		position: usize,
		recorded: Option<(Address, usize)>,
	},

	/// A backend with an empty packed list is still tracked.
	#[error("backend {backend} is tracked with no selectors")]
	InertBackendListed { backend: Address },

	/// A backend's recorded index in the backend list holds something else.
	#[error("backend {backend} records list position {recorded}, which holds {listed:?}")]
	AddressPositionMismatch {
		backend: Address,
		recorded: usize,
		listed: Option<Address>,
	},

	/// A backend-list element is not the home position of any packed list.
	#[error("backend list names {backend} at {position} without a matching packed list")]
	UntrackedBackendListed { backend: Address, position: usize },
}
