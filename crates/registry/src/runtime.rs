//! Runtime registry container with atomic publication.
//!
//! # Role
//!
//! This module is the only write path into the routing state. Cuts are staged
//! on a private copy of the current table ([`StagedCuts`]), and only a commit
//! publishes that copy with a single atomic swap. A staged set that is dropped
//! instead of committed leaves no trace.
//!
//! # Concurrency
//!
//! - **Reads:** Wait-free (atomic load of the current snapshot).
//! - **Writes:** Serialized by a writer mutex. A commit whose base version is no
//!   longer current is refused with [`CutError::StaleStage`].
//! - **Events:** Delivered after the writer mutex is released.
//!
//! # Invariants
//!
//! - A failed cut publishes nothing (see `invariants::test_failed_cut_publishes_nothing`).
//! - Readers never observe a partially applied cut (see
//!   `invariants::test_readers_see_whole_cuts`).

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cut::{CutSummary, DiamondCut, Migration};
use crate::error::CutError;
use crate::events::{CutApplied, CutObserver};
use crate::snapshot::Snapshot;
use crate::table::SelectorTable;

/// Outcome of a staged cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutReceipt {
	/// Version of the snapshot the cut published.
	pub version: u64,
	/// Selector counts touched by the cut.
	pub summary: CutSummary,
}

/// Cuts staged on a private copy of the table, invisible to readers.
///
/// Obtained from [`RuntimeRegistry::begin`] and published, all at once, by
/// [`RuntimeRegistry::commit`] or [`RuntimeRegistry::publish`]. Each staged
/// cut still gets its own version and [`CutApplied`] event.
#[derive(Debug, Clone)]
pub struct StagedCuts {
	base: Arc<Snapshot>,
	table: SelectorTable,
	events: Vec<CutApplied>,
}

impl StagedCuts {
	/// Starts staging on top of `base`.
	pub fn new(base: Arc<Snapshot>) -> Self {
		Self {
			table: base.table.clone(),
			base,
			events: Vec::new(),
		}
	}

	/// Routing state including every staged cut.
	pub fn table(&self) -> &SelectorTable {
		&self.table
	}

	/// Version of the snapshot staging started from.
	pub fn base_version(&self) -> u64 {
		self.base.version
	}

	/// Version the staged table publishes as.
	pub fn version(&self) -> u64 {
		self.base.version + self.events.len() as u64
	}

	/// Events of the staged cuts, oldest first.
	pub fn events(&self) -> &[CutApplied] {
		&self.events
	}

	/// Returns true if no cut was staged.
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Stages the directives of `cut`.
	///
	/// `cut.migration` is recorded in the event but not run; callers that stage
	/// a migrating cut this way run the migration themselves and discard the
	/// staged set if it fails.
	pub fn stage(&mut self, cut: &DiamondCut) -> Result<CutReceipt, CutError> {
		self.stage_with(cut, |_, _| Ok(()))
	}

	/// Stages `cut`, running `migrate` against the resulting table.
	///
	/// `migrate` is only called when the cut carries a [`Migration`], and only
	/// after every directive succeeded. On any error the staged set is exactly
	/// as it was before the call.
	pub fn stage_with<F>(&mut self, cut: &DiamondCut, migrate: F) -> Result<CutReceipt, CutError>
	where
		F: FnOnce(&Migration, &SelectorTable) -> Result<(), String>,
	{
		let mut next = self.table.clone();
		let summary = next.apply_cut(&cut.directives)?;
		debug_assert_eq!(crate::invariants::check(&next), Ok(()), "cut broke table invariants");

		if let Some(migration) = &cut.migration {
			migrate(migration, &next).map_err(|reason| {
				warn!(migration = %migration.target, %reason, "migration failed, cut discarded");
				CutError::MigrationCallbackFailed {
					target: migration.target,
					reason,
				}
			})?;
		}

		let version = self.version() + 1;
		debug!(
			version,
			added = summary.added,
			replaced = summary.replaced,
			removed = summary.removed,
			"cut staged"
		);
		self.table = next;
		self.events.push(CutApplied {
			version,
			directives: cut.directives.clone(),
			migration: cut.migration.clone(),
		});
		Ok(CutReceipt { version, summary })
	}
}

/// Registry wrapper publishing immutable snapshots of a [`SelectorTable`].
pub struct RuntimeRegistry {
	label: &'static str,
	snap: ArcSwap<Snapshot>,
	writer: Mutex<()>,
	observers: RwLock<Vec<Arc<dyn CutObserver>>>,
}

impl std::fmt::Debug for RuntimeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let snap = self.snap.load();
		f.debug_struct("RuntimeRegistry")
			.field("label", &self.label)
			.field("version", &snap.version)
			.field("selectors", &snap.table.len())
			.field("backends", &snap.table.all_backends().len())
			.finish()
	}
}

impl RuntimeRegistry {
	/// Creates an empty registry.
	pub fn new(label: &'static str) -> Self {
		Self::from_table(label, SelectorTable::new())
	}

	/// Creates a registry publishing `table` as version zero.
	pub fn from_table(label: &'static str, table: SelectorTable) -> Self {
		Self {
			label,
			snap: ArcSwap::from_pointee(Snapshot::genesis(table)),
			writer: Mutex::new(()),
			observers: RwLock::new(Vec::new()),
		}
	}

	/// Diagnostic label.
	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Loads the current snapshot.
	#[inline]
	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snap.load_full()
	}

	/// Returns the current version.
	pub fn version(&self) -> u64 {
		self.snap.load().version
	}

	/// Registers an observer for future cuts.
	///
	/// Cuts published before subscription are not delivered; subscribe through
	/// the dispatcher builder to see construction cuts.
	pub fn subscribe(&self, observer: Arc<dyn CutObserver>) {
		self.observers.write().push(observer);
	}

	/// Starts staging cuts on top of the current snapshot.
	pub fn begin(&self) -> StagedCuts {
		StagedCuts::new(self.snap.load_full())
	}

	/// Publishes `staged` without notifying observers.
	///
	/// Returns the events to hand to [`notify`](Self::notify) once the caller
	/// released whatever locks it holds. An empty staged set publishes nothing
	/// and always succeeds.
	pub fn publish(&self, staged: StagedCuts) -> Result<Vec<CutApplied>, CutError> {
		if staged.is_empty() {
			return Ok(Vec::new());
		}
		let _writer = self.writer.lock();
		let current = self.snap.load();
		if !Arc::ptr_eq(&current, &staged.base) {
			warn!(
				registry = self.label,
				base = staged.base.version,
				current = current.version,
				"staged cuts are stale"
			);
			return Err(CutError::StaleStage {
				base: staged.base.version,
				current: current.version,
			});
		}

		let version = staged.version();
		self.snap.store(Arc::new(Snapshot {
			table: staged.table,
			version,
		}));
		info!(
			registry = self.label,
			version,
			cuts = staged.events.len(),
			directives = staged.events.iter().map(|e| e.directives.len()).sum::<usize>(),
			migrations = staged.events.iter().filter(|e| e.migration.is_some()).count(),
			"cut published"
		);
		Ok(staged.events)
	}

	/// Delivers `events` to every observer.
	pub fn notify(&self, events: &[CutApplied]) {
		if events.is_empty() {
			return;
		}
		let observers = self.observers.read().clone();
		for event in events {
			for observer in &observers {
				observer.on_cut(event);
			}
		}
	}

	/// Publishes `staged` and notifies observers.
	///
	/// Returns the published version.
	pub fn commit(&self, staged: StagedCuts) -> Result<u64, CutError> {
		let version = staged.version();
		let events = self.publish(staged)?;
		self.notify(&events);
		Ok(version)
	}

	/// Applies a cut that carries no migration.
	///
	/// A cut with a migration is rejected with
	/// [`CutError::MigrationCallbackFailed`]: without a runner nothing can
	/// execute it, and publishing without it would break the batch contract.
	pub fn apply_cut(&self, cut: &DiamondCut) -> Result<CutReceipt, CutError> {
		self.apply_cut_with(cut, |migration, _| {
			Err(format!("no migration runner for {}", migration.target))
		})
	}

	/// Applies a cut, running `migrate` on the staged table before publication.
	///
	/// `migrate` is only called when the cut carries a [`Migration`], and only
	/// after every directive succeeded. An `Err` from it discards the staged
	/// table and surfaces as [`CutError::MigrationCallbackFailed`].
	pub fn apply_cut_with<F>(&self, cut: &DiamondCut, migrate: F) -> Result<CutReceipt, CutError>
	where
		F: FnOnce(&Migration, &SelectorTable) -> Result<(), String>,
	{
		let (receipt, events) = {
			let _writer = self.writer.lock();
			let mut staged = self.begin();
			let receipt = staged.stage_with(cut, migrate).inspect_err(|e| {
				warn!(registry = self.label, version = staged.base_version(), error = %e, "cut rejected");
			})?;

			let version = receipt.version;
			self.snap.store(Arc::new(Snapshot {
				table: staged.table,
				version,
			}));
			info!(
				registry = self.label,
				version,
				directives = cut.directives.len(),
				migration = cut.migration.is_some(),
				"cut published"
			);
			(receipt, staged.events)
		};
		self.notify(&events);
		Ok(receipt)
	}
}
