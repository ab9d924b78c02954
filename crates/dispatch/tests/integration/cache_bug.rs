//! Removing selectors from the middle and end of a long packed list, together
//! with a selector of another backend, must leave every survivor bound.

use switchyard_dispatch::facets::OWNER as OWNER_SEL;
use switchyard_primitives::Selector;
use switchyard_registry::{DiamondCut, FacetCut};

use crate::common::*;

const SELECTORS: [u32; 11] = [
	0x19e3_b533,
	0x0716_c2ae,
	0x1104_6047,
	0xcf3b_be18,
	0x24c1_d5a7,
	0xcbb8_35f6,
	0xcbb8_35f7,
	0xcbb8_35f8,
	0xcbb8_35f9,
	0xcbb8_35fa,
	0xcbb8_35fb,
];

fn sel(i: usize) -> Selector {
	Selector::from_u32(SELECTORS[i])
}

#[test]
fn should_not_exhibit_the_cache_bug() {
	let d = deploy_reference();
	let all: Vec<Selector> = (0..SELECTORS.len()).map(sel).collect();

	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::add(TEST1, all)]))
		.unwrap();
	d.diamond_cut(OWNER, &DiamondCut::new([FacetCut::remove(vec![OWNER_SEL, sel(5), sel(10)])]))
		.unwrap();

	let bound = facet_function_selectors(&d, TEST1);
	for i in [0, 1, 2, 3, 4, 6, 7, 8, 9] {
		assert!(bound.contains(&sel(i)), "{} should survive", sel(i));
		assert_eq!(facet_address(&d, sel(i)), TEST1);
	}
	assert!(!bound.contains(&sel(5)));
	assert!(!bound.contains(&sel(10)));
	assert!(!bound.contains(&OWNER_SEL));
	assert_eq!(bound.len(), 9);

	assert_eq!(facet_function_selectors(&d, OWNERSHIP).len(), 1);
	switchyard_registry::invariants::check(&d.registry().snapshot()).unwrap();
}
