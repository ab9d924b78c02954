//! Dispatcher construction.
//!
//! Construction mirrors a fresh deployment: the owner is recorded, the cut
//! selector is bound to the cut facet, and any initial cuts run (with their
//! migrations) exactly as later cuts would, minus the authority check.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use switchyard_config::Manifest;
use switchyard_primitives::Address;
use switchyard_registry::{CutObserver, DiamondCut, FacetCut, RuntimeRegistry};
use tracing::info;

use crate::backend::{Backend, BackendSet, CallContext};
use crate::dispatcher::Dispatcher;
use crate::error::{DeployError, DispatchError};
use crate::facets::cut::execute_cut;
use crate::facets::ownership::OWNER_KEY;
use crate::facets::{CutFacet, DIAMOND_CUT, InterfaceInit, LoupeFacet, OwnershipFacet};
use crate::storage::Storage;

type BackendFactory = Box<dyn Fn() -> Arc<dyn Backend> + Send + Sync>;

/// Maps manifest backend `kind`s to constructors.
pub struct BackendCatalog {
	factories: BTreeMap<String, BackendFactory>,
}

impl fmt::Debug for BackendCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.factories.keys()).finish()
	}
}

impl Default for BackendCatalog {
	fn default() -> Self {
		Self::with_builtins()
	}
}

impl BackendCatalog {
	/// Creates a catalog with no kinds.
	pub fn empty() -> Self {
		Self {
			factories: BTreeMap::new(),
		}
	}

	/// Creates a catalog knowing `cut`, `loupe`, `ownership` and `interface-init`.
	pub fn with_builtins() -> Self {
		let mut catalog = Self::empty();
		catalog.register("cut", || Arc::new(CutFacet));
		catalog.register("loupe", || Arc::new(LoupeFacet));
		catalog.register("ownership", || Arc::new(OwnershipFacet));
		catalog.register("interface-init", || Arc::new(InterfaceInit));
		catalog
	}

	/// Registers or replaces the constructor for `kind`.
	pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
	where
		F: Fn() -> Arc<dyn Backend> + Send + Sync + 'static,
	{
		self.factories.insert(kind.into(), Box::new(factory));
	}

	/// Builds a fresh backend of `kind`.
	pub fn build(&self, kind: &str) -> Option<Arc<dyn Backend>> {
		self.factories.get(kind).map(|factory| factory())
	}

	pub fn kinds(&self) -> impl Iterator<Item = &str> {
		self.factories.keys().map(String::as_str)
	}
}

/// Assembles a [`Dispatcher`].
pub struct DispatcherBuilder {
	label: &'static str,
	owner: Address,
	backends: BackendSet,
	cut_facet: Option<Address>,
	initial_cuts: Vec<DiamondCut>,
	observers: Vec<Arc<dyn CutObserver>>,
}

impl fmt::Debug for DispatcherBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DispatcherBuilder")
			.field("label", &self.label)
			.field("owner", &self.owner)
			.field("backends", &self.backends)
			.field("cut_facet", &self.cut_facet)
			.field("initial_cuts", &self.initial_cuts.len())
			.field("observers", &self.observers.len())
			.finish()
	}
}

impl DispatcherBuilder {
	/// Starts a dispatcher owned by `owner`.
	pub fn new(owner: Address) -> Self {
		Self {
			label: "dispatcher",
			owner,
			backends: BackendSet::new(),
			cut_facet: None,
			initial_cuts: Vec::new(),
			observers: Vec::new(),
		}
	}

	/// Sets the registry's diagnostic label.
	pub fn label(mut self, label: &'static str) -> Self {
		self.label = label;
		self
	}

	/// Deploys `backend` at `address`.
	pub fn backend(mut self, address: Address, backend: Arc<dyn Backend>) -> Self {
		self.backends.insert(address, backend);
		self
	}

	/// Binds the cut selector to `address` at construction.
	pub fn cut_facet(mut self, address: Address) -> Self {
		self.cut_facet = Some(address);
		self
	}

	/// Queues a cut applied after the cut selector is bound.
	pub fn initial_cut(mut self, cut: DiamondCut) -> Self {
		self.initial_cuts.push(cut);
		self
	}

	/// Subscribes `observer` before any construction cut runs, so it sees
	/// every cut from version 1 on.
	pub fn observer(mut self, observer: Arc<dyn CutObserver>) -> Self {
		self.observers.push(observer);
		self
	}

	/// Resolves a manifest against `catalog`.
	///
	/// Each declared backend is built from its `kind`; `cut_facet` and the
	/// initial cut come from the manifest. A manifest with no cut entries and
	/// no migration queues nothing.
	pub fn from_manifest(manifest: &Manifest, catalog: &BackendCatalog) -> Result<Self, DeployError> {
		let mut builder = Self::new(manifest.owner);
		for (name, decl) in &manifest.backends {
			let backend = catalog.build(&decl.kind).ok_or_else(|| DeployError::UnknownKind {
				backend: name.clone(),
				kind: decl.kind.clone(),
			})?;
			builder = builder.backend(decl.address, backend);
		}
		if let Some(address) = manifest.cut_facet_address()? {
			builder = builder.cut_facet(address);
		}
		let cut = manifest.to_cut()?;
		if !cut.directives.is_empty() || cut.migration.is_some() {
			builder = builder.initial_cut(cut);
		}
		Ok(builder)
	}

	/// Builds the dispatcher.
	///
	/// Construction cuts are staged together and published in one swap once
	/// all of them succeeded. Fails if the cut facet or a queued cut names an
	/// undeployed backend, or if any queued cut or its migration is rejected.
	pub fn build(self) -> Result<Dispatcher, DispatchError> {
		let registry = Arc::new(RuntimeRegistry::new(self.label));
		for observer in self.observers {
			registry.subscribe(observer);
		}
		let mut storage = Storage::new();
		storage.set(OWNER_KEY, &self.owner)?;

		let mut cuts = Vec::with_capacity(self.initial_cuts.len() + 1);
		if let Some(address) = self.cut_facet {
			cuts.push(DiamondCut::new([FacetCut::add(address, CutFacet::SELECTORS)]));
		}
		cuts.extend(self.initial_cuts);

		let cut_backend = self.cut_facet.unwrap_or(Address::ZERO);
		let mut routing = registry.begin();
		for cut in &cuts {
			let mut ctx = CallContext {
				caller: self.owner,
				storage: &mut storage,
				routing: &mut routing,
				backends: &self.backends,
			};
			execute_cut(&mut ctx, cut).map_err(|e| DispatchError::from_backend(DIAMOND_CUT, cut_backend, e))?;
		}
		registry.commit(routing)?;

		info!(
			registry = self.label,
			owner = %self.owner,
			backends = self.backends.len(),
			selectors = registry.snapshot().len(),
			"dispatcher deployed"
		);
		Ok(Dispatcher::from_parts(registry, self.backends, storage))
	}
}
