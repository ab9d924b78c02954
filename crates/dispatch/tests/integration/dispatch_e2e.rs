//! Dispatch routing, authority, migrations, and manifest deployment.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use switchyard_config::Manifest;
use switchyard_dispatch::facets::{self, CutFacet, interface};
use switchyard_dispatch::{BackendCatalog, DispatchError, DispatcherBuilder};
use switchyard_primitives::invocation::decode_output;
use switchyard_primitives::{Address, Selector};
use switchyard_registry::{CutError, CutJournal, DiamondCut, FacetCut, Loupe};

use crate::common::*;

const PING: Selector = Selector::from_u32(0xaabb_ccdd);
const B1: Address = Address::from_low_u64(0xb1);

#[test]
fn routes_selector_to_bound_backend() {
	let d = DispatcherBuilder::new(OWNER)
		.backend(CUT, Arc::new(CutFacet))
		.backend(B1, Recorder::new("b1", vec![PING]))
		.cut_facet(CUT)
		.build()
		.unwrap();

	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::add(B1, vec![PING])]))
		.unwrap();

	let out = d.dispatch(PING, Address::from_low_u64(0x77), vec![1, 2, 3]).unwrap();
	assert_eq!(decode_output::<String>(&out).unwrap(), "b1");
	let last: Option<Selector> = d.with_storage(|s| s.get("recorder.b1.last").unwrap());
	assert_eq!(last, Some(PING));
}

#[test]
fn unbound_selector_is_unknown() {
	let d = deploy_reference();
	let err = d.dispatch(PING, OWNER, Vec::new()).unwrap_err();
	assert!(matches!(err, DispatchError::UnknownSelector(s) if s == PING));
}

#[test]
fn removed_selector_becomes_unknown() {
	let d = deploy_reference();
	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::add(TEST2, vec![test2_func(3)])]))
		.unwrap();
	d.dispatch(test2_func(3), OWNER, Vec::new()).unwrap();

	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::remove(vec![test2_func(3)])]))
		.unwrap();
	let err = d.dispatch(test2_func(3), OWNER, Vec::new()).unwrap_err();
	assert!(matches!(err, DispatchError::UnknownSelector(_)));
}

#[test]
fn only_owner_may_cut() {
	let d = deploy_reference();
	let stranger = Address::from_low_u64(0xbad);

	let err = d
		.diamond_cut(stranger, &DiamondCut::new([FacetCut::add(TEST1, test1_selectors())]))
		.unwrap_err();
	assert!(matches!(err, DispatchError::Unauthorized { caller, .. } if caller == stranger));
	assert!(d.registry().facet_function_selectors(TEST1).is_empty());
}

#[test]
fn ownership_transfer_moves_cut_authority() {
	let d = deploy_reference();
	let next = Address::from_low_u64(0xbb);

	let owner: Address = d.call_typed(facets::OWNER, next, &()).unwrap();
	assert_eq!(owner, OWNER);

	let err = d.dispatch(facets::TRANSFER_OWNERSHIP, next, postcard_args(&next)).unwrap_err();
	assert!(matches!(err, DispatchError::Unauthorized { .. }));

	let _: () = d.call_typed(facets::TRANSFER_OWNERSHIP, OWNER, &next).unwrap();
	let owner: Address = d.call_typed(facets::OWNER, OWNER, &()).unwrap();
	assert_eq!(owner, next);

	assert!(matches!(
		d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::remove(vec![PING])])),
		Err(DispatchError::Unauthorized { .. })
	));
	assert!(matches!(
		d.diamond_cut(next, &DiamondCut::new([FacetCut::remove(vec![PING])])),
		Err(DispatchError::Cut(CutError::SelectorNotFound { .. }))
	));
}

#[test]
fn rejected_batch_leaves_routing_untouched() {
	let d = deploy_reference();
	let before = d.registry().facets();

	let err = d
		.diamond_cut(
			OWNER,
			&DiamondCut::new([
				FacetCut::replace(TEST1, vec![facets::FACET_ADDRESS]),
				FacetCut::add(TEST2, vec![facets::OWNER]),
			]),
		)
		.unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::SelectorAlreadyExists { index: 1, .. })));
	assert_eq!(d.registry().facets(), before);

	let err = d.diamond_cut(OWNER, &DiamondCut::new(Vec::new())).unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::EmptyCut)));
	let err = d
		.diamond_cut(OWNER, &DiamondCut::new([FacetCut::add(TEST1, Vec::new())]))
		.unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::EmptyDirective { index: 0, .. })));
	assert_eq!(d.registry().version(), 2);
}

#[test]
fn failed_migration_rolls_back_cut_and_storage() {
	let d = deploy_reference();
	let journal = Arc::new(CutJournal::new());
	d.registry().subscribe(journal.clone());

	// test1 does not implement init(), so the migration fails after the
	// recorder stored the call; that write must not survive.
	let err = d
		.diamond_cut(
			OWNER,
			&DiamondCut::new([FacetCut::add(TEST2, test2_selectors())])
				.with_migration(TEST1, facets::INIT.as_bytes().to_vec()),
		)
		.unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::MigrationCallbackFailed { target, .. }) if target == TEST1));
	assert!(d.registry().facet_function_selectors(TEST2).is_empty());
	assert!(journal.is_empty());
	let last: Option<Selector> = d.with_storage(|s| s.get("recorder.test1.last").unwrap());
	assert_eq!(last, None);

	let err = d
		.diamond_cut(
			OWNER,
			&DiamondCut::new([FacetCut::add(TEST2, test2_selectors())]).with_migration(INIT, Vec::new()),
		)
		.unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::MigrationCallbackFailed { .. })));
}

#[test]
fn successful_migration_commits_with_cut() {
	let d = deploy_reference();
	let journal = Arc::new(CutJournal::new());
	d.registry().subscribe(journal.clone());

	d.diamond_cut(
		OWNER,
		&DiamondCut::new([FacetCut::add(TEST1, vec![test1_func(1)])])
			.with_migration(TEST1, test1_func(1).as_bytes().to_vec()),
	)
	.unwrap();

	let last: Option<Selector> = d.with_storage(|s| s.get("recorder.test1.last").unwrap());
	assert_eq!(last, Some(test1_func(1)));
	let events = journal.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].migration.as_ref().map(|m| m.target), Some(TEST1));
}

#[test]
fn migration_target_needs_code() {
	let d = deploy_reference();
	let ghost = Address::from_low_u64(0x60);
	let err = d
		.diamond_cut(
			OWNER,
			&DiamondCut::new([FacetCut::add(TEST1, vec![test1_func(1)])]).with_migration(ghost, vec![0; 4]),
		)
		.unwrap_err();
	assert!(matches!(err, DispatchError::Cut(CutError::BackendHasNoCode { backend }) if backend == ghost));
}

#[test]
fn cut_selector_can_be_retired() {
	let d = deploy_reference();
	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::remove(vec![facets::DIAMOND_CUT])]))
		.unwrap();

	let err = d
		.diamond_cut(OWNER, &DiamondCut::new([FacetCut::add(TEST1, vec![test1_func(1)])]))
		.unwrap_err();
	assert!(matches!(err, DispatchError::UnknownSelector(s) if s == facets::DIAMOND_CUT));
}

#[test]
fn deploy_from_manifest() {
	let manifest = Manifest::parse(
		r#"
owner = "0x00000000000000000000000000000000000000aa"
cut_facet = "cut"

[backends.cut]
address = "0x0000000000000000000000000000000000000001"
kind = "cut"

[backends.loupe]
address = "0x0000000000000000000000000000000000000002"
kind = "loupe"

[backends.ownership]
address = "0x0000000000000000000000000000000000000003"
kind = "ownership"

[backends.init]
address = "0x0000000000000000000000000000000000000009"
kind = "interface-init"

[[cut]]
action = "add"
backend = "loupe"
selectors = ["0x7a0ed627", "0xadfca15e", "0x52ef6b2c", "0xcdffacc6", "0x01ffc9a7"]

[[cut]]
action = "add"
backend = "ownership"
selectors = ["0x8da5cb5b", "0xf2fde38b"]

[migration]
backend = "init"
payload = "0xe1c7392a"
"#,
	)
	.unwrap();
	assert!(manifest.warnings.is_empty());

	let d = DispatcherBuilder::from_manifest(&manifest, &BackendCatalog::with_builtins())
		.unwrap()
		.build()
		.unwrap();

	assert_eq!(facet_addresses(&d), vec![CUT, LOUPE, OWNERSHIP]);
	for id in interface::STANDARD {
		assert!(supports_interface(&d, id));
	}
	let owner: Address = d.call_typed(facets::OWNER, OWNER, &()).unwrap();
	assert_eq!(owner, OWNER);
}

fn postcard_args(address: &Address) -> Vec<u8> {
	switchyard_primitives::invocation::encode_output(address).unwrap()
}
