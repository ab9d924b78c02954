//! Mutation engine: batched add/replace/remove directives.
//!
//! # Role
//!
//! A [`DiamondCut`] is an ordered list of [`FacetCut`] directives plus an
//! optional [`Migration`] callback. [`SelectorTable::apply_cut`] processes the
//! directives in order against a table; the runtime registry runs it on a
//! staged copy so a rejected batch is never observable.
//!
//! # Per-directive contract
//!
//! | Action | Backend | Each selector must be |
//! |--------|---------|-----------------------|
//! | Add | non-null | unbound |
//! | Replace | non-null | bound, to a different backend |
//! | Remove | null | bound |
//!
//! A directive is validated in full before any of its selectors is touched.
//! Duplicates inside one directive are judged as if the directive ran
//! sequentially: the second `Add` of a selector collides with the first.
//!
//! # Swap-removal
//!
//! Replace and Remove unbind through [`SelectorTable::unbind`], which moves the
//! last selector of the backend's list into the vacated slot. Enumeration order
//! of a backend's selectors is therefore not stable across cuts; membership is.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use switchyard_primitives::{Address, Selector};

use crate::error::CutError;
use crate::table::SelectorTable;

/// Kind of structural change a directive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAction {
	/// Bind new selectors to a backend.
	Add,
	/// Move bound selectors to a different backend.
	Replace,
	/// Unbind selectors.
	Remove,
}

impl fmt::Display for CutAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Add => "add",
			Self::Replace => "replace",
			Self::Remove => "remove",
		})
	}
}

/// One directive of a cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCut {
	/// Target backend; [`Address::ZERO`] for removals.
	pub backend: Address,
	/// Requested change.
	pub action: CutAction,
	/// Selectors the change applies to.
	pub selectors: Vec<Selector>,
}

impl FacetCut {
	/// Binds `selectors` to `backend`.
	pub fn add(backend: Address, selectors: impl Into<Vec<Selector>>) -> Self {
		Self {
			backend,
			action: CutAction::Add,
			selectors: selectors.into(),
		}
	}

	/// Moves `selectors` to `backend`.
	pub fn replace(backend: Address, selectors: impl Into<Vec<Selector>>) -> Self {
		Self {
			backend,
			action: CutAction::Replace,
			selectors: selectors.into(),
		}
	}

	/// Unbinds `selectors`.
	pub fn remove(selectors: impl Into<Vec<Selector>>) -> Self {
		Self {
			backend: Address::ZERO,
			action: CutAction::Remove,
			selectors: selectors.into(),
		}
	}
}

/// Post-apply callback run once after every directive succeeded.
///
/// The payload is opaque to the registry; the embedder decides how to run it
/// (the dispatcher invokes `target` with `payload` against staged storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
	/// Backend that performs the migration.
	pub target: Address,
	/// Opaque migration arguments.
	pub payload: Vec<u8>,
}

/// A batch of directives applied as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondCut {
	/// Directives, applied in order.
	pub directives: Vec<FacetCut>,
	/// Optional callback run after all directives succeed.
	pub migration: Option<Migration>,
}

impl DiamondCut {
	/// Creates a cut without a migration.
	pub fn new(directives: impl Into<Vec<FacetCut>>) -> Self {
		Self {
			directives: directives.into(),
			migration: None,
		}
	}

	/// Attaches a migration callback.
	pub fn with_migration(mut self, target: Address, payload: Vec<u8>) -> Self {
		self.migration = Some(Migration { target, payload });
		self
	}

	/// Iterates every backend an add or replace directive routes to.
	pub fn target_backends(&self) -> impl Iterator<Item = Address> + '_ {
		self.directives
			.iter()
			.filter(|d| d.action != CutAction::Remove)
			.map(|d| d.backend)
	}
}

/// Selector counts touched by a successful cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutSummary {
	pub added: usize,
	pub replaced: usize,
	pub removed: usize,
}

impl SelectorTable {
	/// Applies `directives` in order.
	///
	/// Stops at the first invalid directive. Directives before it remain
	/// applied to `self`; callers needing all-or-nothing semantics apply the
	/// cut to a clone and keep it only on success, as
	/// [`crate::RuntimeRegistry`] does.
	pub fn apply_cut(&mut self, directives: &[FacetCut]) -> Result<CutSummary, CutError> {
		if directives.is_empty() {
			return Err(CutError::EmptyCut);
		}

		let mut summary = CutSummary::default();
		for (index, directive) in directives.iter().enumerate() {
			self.validate_directive(index, directive)?;
			match directive.action {
				CutAction::Add => {
					for &selector in &directive.selectors {
						self.bind(selector, directive.backend);
					}
					summary.added += directive.selectors.len();
				}
				CutAction::Replace => {
					for &selector in &directive.selectors {
						self.unbind(selector);
						self.bind(selector, directive.backend);
					}
					summary.replaced += directive.selectors.len();
				}
				CutAction::Remove => {
					for &selector in &directive.selectors {
						self.unbind(selector);
					}
					summary.removed += directive.selectors.len();
				}
			}
		}
		Ok(summary)
	}

	fn validate_directive(&self, index: usize, directive: &FacetCut) -> Result<(), CutError> {
		let action = directive.action;
		if directive.selectors.is_empty() {
			return Err(CutError::EmptyDirective { index, action });
		}

		let backend = directive.backend;
		match action {
			CutAction::Add | CutAction::Replace if backend.is_null() => {
				return Err(CutError::NullBackend { index, action });
			}
			CutAction::Remove if !backend.is_null() => {
				return Err(CutError::RemoveBackendMustBeNull { index, backend });
			}
			_ => {}
		}

		let mut seen = FxHashSet::default();
		for &selector in &directive.selectors {
			let repeated = !seen.insert(selector);
			match action {
				CutAction::Add => {
					let existing = if repeated { Some(backend) } else { self.lookup(selector) };
					if let Some(existing) = existing {
						return Err(CutError::SelectorAlreadyExists {
							index,
							selector,
							existing,
						});
					}
				}
				CutAction::Replace => match self.lookup(selector) {
					None => return Err(CutError::SelectorNotFound { index, selector }),
					Some(current) if repeated || current == backend => {
						return Err(CutError::ReplaceNoOp {
							index,
							selector,
							backend,
						});
					}
					Some(_) => {}
				},
				CutAction::Remove => {
					if repeated || !self.contains(selector) {
						return Err(CutError::SelectorNotFound { index, selector });
					}
				}
			}
		}
		Ok(())
	}
}
