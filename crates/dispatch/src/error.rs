use switchyard_config::ConfigError;
use switchyard_primitives::{Address, ParseError, Selector};
use switchyard_registry::CutError;

/// Failure raised by a backend while handling one invocation.
///
/// Any error aborts the invocation; storage writes it made are discarded.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
	/// Business-logic failure with a human-readable reason.
	#[error("reverted: {0}")]
	Reverted(String),

	/// The backend was routed a selector it does not implement.
	#[error("selector {0} is not implemented by this backend")]
	UnsupportedSelector(Selector),

	/// Arguments or stored values failed to decode, or a result failed to encode.
	#[error("codec error: {0}")]
	Codec(#[from] postcard::Error),

	/// The caller lacks the authority the operation requires.
	#[error("{caller} is not the owner ({owner})")]
	Unauthorized { caller: Address, owner: Address },

	/// A cut was rejected by the mutation engine.
	#[error(transparent)]
	Cut(#[from] CutError),
}

/// Failure of a dispatched call.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	/// No backend is bound to the selector.
	#[error("no backend bound to selector {0}")]
	UnknownSelector(Selector),

	/// The selector routes to an address with no deployed backend.
	#[error("selector {selector} routes to {backend}, which has no deployed code")]
	BackendNotDeployed { selector: Selector, backend: Address },

	/// The backend failed.
	#[error("backend {backend} failed on {selector}: {source}")]
	Backend {
		selector: Selector,
		backend: Address,
		#[source]
		source: BackendError,
	},

	/// The caller lacks authority for the selector.
	#[error("{caller} is not authorized to call {selector}")]
	Unauthorized { selector: Selector, caller: Address },

	/// A cut was rejected.
	#[error(transparent)]
	Cut(#[from] CutError),

	/// Typed arguments or results failed to encode or decode.
	#[error("codec error: {0}")]
	Codec(#[from] postcard::Error),

	/// Raw calldata could not be split into selector and payload.
	#[error(transparent)]
	Calldata(#[from] ParseError),
}

impl DispatchError {
	/// Wraps a backend failure, lifting authority and cut rejections so callers
	/// can match them without unpacking the backend error.
	pub(crate) fn from_backend(selector: Selector, backend: Address, source: BackendError) -> Self {
		match source {
			BackendError::Unauthorized { caller, .. } => Self::Unauthorized { selector, caller },
			BackendError::Cut(err) => Self::Cut(err),
			source => Self::Backend {
				selector,
				backend,
				source,
			},
		}
	}
}

/// Failure while assembling a dispatcher from a manifest.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
	/// The manifest could not be resolved.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A backend declared a kind the catalog cannot build.
	#[error("backend {backend:?} has unknown kind {kind:?}")]
	UnknownKind { backend: String, kind: String },

	/// Constructing the dispatcher or applying its initial cut failed.
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
}
