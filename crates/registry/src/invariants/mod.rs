//! Machine-checkable invariant catalog and proof entrypoints for the selector table.
//!
//! [`check`] verifies the structural invariants of a table in time linear in
//! its size. The runtime registry runs it on every staged cut in debug builds;
//! tests run it after every step.

pub(crate) mod catalog;

#[cfg(test)]
mod proofs;

use crate::error::InvariantViolation;
use crate::table::SelectorTable;

/// Verifies bidirectional consistency of the forward map, the packed lists and
/// the backend list.
pub fn check(table: &SelectorTable) -> Result<(), InvariantViolation> {
	for (&selector, entry) in &table.entries {
		let found = table
			.slots
			.get(&entry.backend)
			.and_then(|slot| slot.selectors.get(entry.position))
			.copied();
		if found != Some(selector) {
			return Err(InvariantViolation::ForwardEntryMismatch {
				selector,
				backend: entry.backend,
				position: entry.position,
				found,
			});
		}
	}

	for (&backend, slot) in &table.slots {
		if slot.selectors.is_empty() {
			return Err(InvariantViolation::InertBackendListed { backend });
		}
		for (position, &selector) in slot.selectors.iter().enumerate() {
			let recorded = table.position_of(selector);
			if recorded != Some((backend, position)) {
				return Err(InvariantViolation::ReverseEntryMismatch {
					selector,
					backend,
					position,
					recorded,
				});
			}
		}
		let listed = table.backends.get(slot.address_position).copied();
		if listed != Some(backend) {
			return Err(InvariantViolation::AddressPositionMismatch {
				backend,
				recorded: slot.address_position,
				listed,
			});
		}
	}

	for (position, &backend) in table.backends.iter().enumerate() {
		let home = table.slots.get(&backend).map(|slot| slot.address_position);
		if home != Some(position) {
			return Err(InvariantViolation::UntrackedBackendListed { backend, position });
		}
	}

	Ok(())
}
