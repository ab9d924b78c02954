//! Cut publication events.
//!
//! Every successful cut emits one [`CutApplied`] record carrying the exact
//! directive list that was applied. External tooling subscribes through
//! [`CutObserver`]; [`CutJournal`] is the in-memory observer used for audit
//! and replay.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cut::{FacetCut, Migration};
use crate::error::CutError;
use crate::table::SelectorTable;

/// Record of one published cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutApplied {
	/// Snapshot version the cut produced.
	pub version: u64,
	/// Directives, in application order.
	pub directives: Vec<FacetCut>,
	/// Migration callback that ran with the cut, if any.
	pub migration: Option<Migration>,
}

/// Receives [`CutApplied`] events after publication.
///
/// Observers run on the writer's thread after the writer lock (and, for
/// dispatched cuts, the dispatcher's storage lock) is released, so they may
/// query or cut the registry. Events of one commit arrive in version order;
/// concurrent commits may interleave, and `version` orders them.
pub trait CutObserver: Send + Sync {
	/// Called once per published cut.
	fn on_cut(&self, event: &CutApplied);
}

/// In-memory journal of published cuts.
#[derive(Debug, Default)]
pub struct CutJournal {
	events: Mutex<Vec<CutApplied>>,
}

impl CutJournal {
	/// Creates an empty journal.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of every recorded event, in version order.
	pub fn events(&self) -> Vec<CutApplied> {
		self.events.lock().clone()
	}

	/// Returns the number of recorded events.
	pub fn len(&self) -> usize {
		self.events.lock().len()
	}

	/// Returns true if nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.events.lock().is_empty()
	}

	/// Renders the journal as newline-delimited JSON, one event per line.
	pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
		let events = self.events.lock();
		let mut out = String::new();
		for event in events.iter() {
			out.push_str(&serde_json::to_string(event)?);
			out.push('\n');
		}
		Ok(out)
	}

	/// Rebuilds a table by re-applying every recorded cut to an empty table.
	///
	/// Migrations are not re-run; they touch embedder state, not the table.
	pub fn replay(&self) -> Result<SelectorTable, CutError> {
		let mut table = SelectorTable::new();
		for event in self.events.lock().iter() {
			table.apply_cut(&event.directives)?;
		}
		Ok(table)
	}
}

impl CutObserver for CutJournal {
	fn on_cut(&self, event: &CutApplied) {
		let mut events = self.events.lock();
		let at = events.partition_point(|e| e.version < event.version);
		events.insert(at, event.clone());
	}
}
