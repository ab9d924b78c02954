//! Invariant catalog for [`crate::table::SelectorTable`] and [`crate::RuntimeRegistry`].
#![allow(dead_code)]

/// Every forward entry must point at the packed slot holding its selector, and
/// every packed slot must be pointed at by its selector's forward entry.
///
/// - Enforced in: `SelectorTable::bind`, `SelectorTable::unbind`
/// - Tested by: `invariants::proofs::test_indices_agree_after_random_cuts`
/// - Failure symptom: Removal unbinds the wrong selector or leaves a survivor unreachable.
pub(crate) const FORWARD_AND_PACKED_INDICES_AGREE: () = ();

/// A selector must route to at most one backend.
///
/// - Enforced in: `SelectorTable::validate_directive` (add rejects bound selectors,
///   replace unbinds before binding)
/// - Tested by: `invariants::proofs::test_selector_has_single_owner`
/// - Failure symptom: A selector shows up in two backends' lists and dispatch depends on lookup path.
pub(crate) const SELECTOR_ROUTES_TO_SINGLE_BACKEND: () = ();

/// A backend must be listed iff it owns at least one selector, at the position it records.
///
/// - Enforced in: `SelectorTable::bind`, `SelectorTable::unbind`
/// - Tested by: `invariants::proofs::test_backend_list_tracks_non_empty_backends`
/// - Failure symptom: `facet_addresses` reports inert backends or omits live ones.
pub(crate) const BACKEND_LIST_TRACKS_NON_EMPTY_BACKENDS: () = ();

/// Swap-removal must keep every surviving selector bound, whatever it relocates.
///
/// - Enforced in: `SelectorTable::unbind`
/// - Tested by: `invariants::proofs::test_swap_removal_keeps_survivors_bound`
/// - Failure symptom: Removing a mid-list selector silently unbinds an unrelated one.
pub(crate) const SWAP_REMOVAL_KEEPS_SURVIVORS_BOUND: () = ();

/// Self-describing selectors (cut, loupe) must be ordinary entries.
///
/// - Enforced in: `SelectorTable::apply_cut` (no selector is special-cased)
/// - Tested by: `invariants::proofs::test_self_describing_selectors_are_removable`
/// - Failure symptom: The registry refuses to retire its own management surface.
pub(crate) const SELF_DESCRIBING_SELECTORS_ARE_ORDINARY: () = ();

/// A rejected cut must publish nothing, including directives that preceded the failure.
///
/// - Enforced in: `StagedCuts::stage_with` (stages on a clone)
/// - Tested by: `invariants::proofs::test_failed_cut_publishes_nothing`
/// - Failure symptom: Half-applied batches become visible to dispatch.
pub(crate) const FAILED_CUT_PUBLISHES_NOTHING: () = ();

/// Readers must observe either the pre-cut or the post-cut snapshot, never a mix.
///
/// - Enforced in: `RuntimeRegistry::publish` (single `ArcSwap::store`)
/// - Tested by: `invariants::proofs::test_readers_see_whole_cuts`
/// - Failure symptom: A concurrent lookup sees one directive of a batch but not the next.
pub(crate) const READERS_SEE_WHOLE_CUTS: () = ();

/// Staged cuts stay invisible until committed, and a stale commit is refused.
///
/// - Enforced in: `RuntimeRegistry::publish` (base snapshot identity check)
/// - Tested by: `invariants::proofs::test_uncommitted_stage_publishes_nothing`
/// - Failure symptom: A dispatched call that fails after cutting leaves its cut routed.
pub(crate) const UNCOMMITTED_STAGE_PUBLISHES_NOTHING: () = ();
