//! Selector dispatcher with live-reconfigurable backends.
//!
//! # Purpose
//!
//! - Owns: the dispatch entry point, the [`Backend`] seam, dispatcher-owned
//!   [`Storage`], the built-in facets, and construction.
//! - Does not own: routing state or cut validation (see `switchyard_registry`),
//!   manifest parsing (see `switchyard_config`).
//!
//! # Flow
//!
//! ```text
//! caller -> Dispatcher::call -> begin (staged routing) -> Backend::invoke(ctx, call)
//!        ctx.storage = staged storage, ctx.routing = staged cuts
//! owner  -> diamondCut -> CutFacet -> execute_cut -> stage + migration
//! Ok     -> RuntimeRegistry::publish + storage commit -> notify observers
//! ```

pub mod backend;
pub mod deploy;
pub mod dispatcher;
pub mod error;
pub mod facets;
pub mod storage;

pub use backend::{Backend, BackendSet, CallContext};
pub use deploy::{BackendCatalog, DispatcherBuilder};
pub use dispatcher::Dispatcher;
pub use error::{BackendError, DeployError, DispatchError};
pub use storage::Storage;
