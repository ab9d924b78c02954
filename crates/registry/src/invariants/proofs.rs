//! Invariant proof tests for the selector table and its runtime container.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use proptest::prelude::*;
use switchyard_primitives::{Address, Selector};

use super::check;
use crate::cut::{DiamondCut, FacetCut};
use crate::events::CutJournal;
use crate::loupe::Loupe;
use crate::runtime::RuntimeRegistry;
use crate::table::SelectorTable;

fn sel(n: u32) -> Selector {
	Selector::from_u32(n)
}

fn addr(n: u64) -> Address {
	Address::from_low_u64(n)
}

#[derive(Debug, Clone)]
enum Op {
	Add(u64, Vec<u32>),
	Replace(u64, Vec<u32>),
	Remove(Vec<u32>),
}

impl Op {
	fn directive(&self) -> FacetCut {
		let sels = |v: &[u32]| v.iter().copied().map(sel).collect::<Vec<_>>();
		match self {
			Op::Add(b, s) => FacetCut::add(addr(*b), sels(s)),
			Op::Replace(b, s) => FacetCut::replace(addr(*b), sels(s)),
			Op::Remove(s) => FacetCut::remove(sels(s)),
		}
	}
}

fn op_strategy() -> impl Strategy<Value = Op> {
	let sels = prop::collection::vec(0u32..24, 1..5);
	prop_oneof![
		(1u64..5, sels.clone()).prop_map(|(b, s)| Op::Add(b, s)),
		(1u64..5, sels.clone()).prop_map(|(b, s)| Op::Replace(b, s)),
		sels.prop_map(Op::Remove),
	]
}

fn model_apply(model: &mut BTreeMap<Selector, Address>, directives: &[FacetCut]) {
	for d in directives {
		for &s in &d.selectors {
			if d.backend.is_null() {
				model.remove(&s);
			} else {
				model.insert(s, d.backend);
			}
		}
	}
}

proptest! {
	/// Must keep forward, packed and backend indices consistent across any
	/// sequence of cuts, and keep membership equal to a naive model.
	#[test]
	fn test_indices_agree_after_random_cuts(
		batches in prop::collection::vec(prop::collection::vec(op_strategy(), 1..4), 1..40)
	) {
		let mut table = SelectorTable::new();
		let mut model = BTreeMap::new();

		for batch in batches {
			let directives: Vec<FacetCut> = batch.iter().map(Op::directive).collect();
			let mut staged = table.clone();
			if staged.apply_cut(&directives).is_ok() {
				table = staged;
				model_apply(&mut model, &directives);
			}
			prop_assert!(check(&table).is_ok(), "{:?}", check(&table));

			let actual: BTreeMap<Selector, Address> =
				table.iter_entries().map(|(s, e)| (s, e.backend)).collect();
			prop_assert_eq!(&actual, &model);
		}
	}
}

/// Must never list a selector under two backends.
#[test]
fn test_selector_has_single_owner() {
	let mut table = SelectorTable::new();
	table
		.apply_cut(&[
			FacetCut::add(addr(1), vec![sel(1), sel(2), sel(3)]),
			FacetCut::add(addr(2), vec![sel(4)]),
			FacetCut::replace(addr(2), vec![sel(2)]),
			FacetCut::replace(addr(3), vec![sel(2), sel(4)]),
		])
		.unwrap();

	let mut owners: BTreeMap<Selector, usize> = BTreeMap::new();
	for facet in table.facets() {
		for s in facet.selectors {
			*owners.entry(s).or_default() += 1;
		}
	}
	assert!(owners.values().all(|&n| n == 1), "{owners:?}");
	assert_eq!(table.lookup(sel(2)), Some(addr(3)));
	check(&table).unwrap();
}

/// Must list exactly the backends that own selectors.
#[test]
fn test_backend_list_tracks_non_empty_backends() {
	let mut table = SelectorTable::new();
	table
		.apply_cut(&[
			FacetCut::add(addr(1), vec![sel(1)]),
			FacetCut::add(addr(2), vec![sel(2), sel(3)]),
			FacetCut::add(addr(3), vec![sel(4)]),
		])
		.unwrap();

	table.apply_cut(&[FacetCut::remove(vec![sel(2), sel(3)])]).unwrap();
	assert_eq!(table.facet_addresses(), vec![addr(1), addr(3)]);

	table.apply_cut(&[FacetCut::replace(addr(3), vec![sel(1)])]).unwrap();
	assert_eq!(table.facet_addresses(), vec![addr(3)]);
	assert!(table.facet_function_selectors(addr(1)).is_empty());
	check(&table).unwrap();
}

/// Must keep every survivor bound for every list length and removal position.
#[test]
fn test_swap_removal_keeps_survivors_bound() {
	for len in 1..12u32 {
		for victim in 0..len {
			let mut table = SelectorTable::new();
			table
				.apply_cut(&[FacetCut::add(addr(1), (0..len).map(sel).collect::<Vec<_>>())])
				.unwrap();
			table.apply_cut(&[FacetCut::remove(vec![sel(victim)])]).unwrap();

			for n in (0..len).filter(|&n| n != victim) {
				assert_eq!(table.lookup(sel(n)), Some(addr(1)), "len={len} victim={victim} n={n}");
			}
			assert_eq!(table.lookup(sel(victim)), None);
			assert_eq!(table.selectors_of(addr(1)).len(), (len - 1) as usize);
			check(&table).unwrap();
		}
	}
}

/// Must allow moving and removing the cut and loupe selectors.
#[test]
fn test_self_describing_selectors_are_removable() {
	let cut_sel = Selector::from_u32(0x1f93_1c1c);
	let facets_sel = Selector::from_u32(0x7a0e_d627);
	let registry = RuntimeRegistry::new("test");
	registry
		.apply_cut(&DiamondCut::new([
			FacetCut::add(addr(1), vec![cut_sel]),
			FacetCut::add(addr(2), vec![facets_sel]),
		]))
		.unwrap();

	registry
		.apply_cut(&DiamondCut::new([FacetCut::replace(addr(3), vec![cut_sel])]))
		.unwrap();
	assert_eq!(registry.facet_address(cut_sel), addr(3));

	registry
		.apply_cut(&DiamondCut::new([FacetCut::remove(vec![cut_sel, facets_sel])]))
		.unwrap();
	assert!(registry.snapshot().is_empty());
}

/// Must leave the published snapshot untouched when any directive fails.
#[test]
fn test_failed_cut_publishes_nothing() {
	let registry = RuntimeRegistry::new("test");
	let journal = Arc::new(CutJournal::new());
	registry.subscribe(journal.clone());
	registry
		.apply_cut(&DiamondCut::new([FacetCut::add(addr(1), vec![sel(1)])]))
		.unwrap();
	let before = registry.snapshot();

	let err = registry.apply_cut(&DiamondCut::new([
		FacetCut::replace(addr(2), vec![sel(1)]),
		FacetCut::remove(vec![sel(99)]),
	]));
	assert!(err.is_err());
	assert!(Arc::ptr_eq(&before, &registry.snapshot()));
	assert_eq!(registry.facet_address(sel(1)), addr(1));

	let err = registry.apply_cut_with(
		&DiamondCut::new([FacetCut::replace(addr(2), vec![sel(1)])]).with_migration(addr(9), vec![1]),
		|_, _| Err("boom".to_string()),
	);
	assert!(err.is_err());
	assert!(Arc::ptr_eq(&before, &registry.snapshot()));
	assert_eq!(journal.len(), 1);
}

/// Must publish each cut with one store so readers see both selectors of a
/// batch or neither.
#[test]
fn test_readers_see_whole_cuts() {
	let registry = RuntimeRegistry::new("test");
	let done = AtomicBool::new(false);

	std::thread::scope(|scope| {
		for _ in 0..4 {
			scope.spawn(|| {
				while !done.load(Ordering::Acquire) {
					let snap = registry.snapshot();
					for pair in 0..50u32 {
						let a = snap.contains(sel(pair * 2));
						let b = snap.contains(sel(pair * 2 + 1));
						assert_eq!(a, b, "pair {pair} observed half-applied at v{}", snap.version);
					}
				}
			});
		}

		for pair in 0..50u32 {
			registry
				.apply_cut(&DiamondCut::new([
					FacetCut::add(addr(1), vec![sel(pair * 2)]),
					FacetCut::add(addr(2), vec![sel(pair * 2 + 1)]),
				]))
				.unwrap();
		}
		done.store(true, Ordering::Release);
	});

	assert_eq!(registry.version(), 50);
}

/// Must keep staged cuts away from readers and observers until committed, and
/// refuse a commit whose base is no longer published.
#[test]
fn test_uncommitted_stage_publishes_nothing() {
	let registry = RuntimeRegistry::new("test");
	let journal = Arc::new(CutJournal::new());
	registry.subscribe(journal.clone());
	let before = registry.snapshot();

	let mut staged = registry.begin();
	staged
		.stage(&DiamondCut::new([FacetCut::add(addr(1), vec![sel(1)])]))
		.unwrap();
	assert_eq!(staged.table().lookup(sel(1)), Some(addr(1)));
	drop(staged);
	assert!(Arc::ptr_eq(&before, &registry.snapshot()));
	assert!(journal.is_empty());

	let mut stale = registry.begin();
	stale
		.stage(&DiamondCut::new([FacetCut::add(addr(1), vec![sel(1)])]))
		.unwrap();
	registry
		.apply_cut(&DiamondCut::new([FacetCut::add(addr(2), vec![sel(2)])]))
		.unwrap();
	let published = registry.snapshot();
	assert!(registry.commit(stale).is_err());
	assert!(Arc::ptr_eq(&published, &registry.snapshot()));
	assert_eq!(journal.len(), 1);
}
