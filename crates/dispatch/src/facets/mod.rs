//! Built-in backends: cut, loupe, ownership, and interface initialization.
//!
//! | Facet | Selector | Operation |
//! |-------|----------|-----------|
//! | cut | `0x1f931c1c` | `diamondCut(DiamondCut)`, owner only |
//! | loupe | `0x7a0ed627` | `facets()` |
//! | loupe | `0xadfca15e` | `facetFunctionSelectors(Address)` |
//! | loupe | `0x52ef6b2c` | `facetAddresses()` |
//! | loupe | `0xcdffacc6` | `facetAddress(Selector)` |
//! | loupe | `0x01ffc9a7` | `supportsInterface(Selector)` |
//! | ownership | `0x8da5cb5b` | `owner()` |
//! | ownership | `0xf2fde38b` | `transferOwnership(Address)`, owner only |
//! | init | `0xe1c7392a` | `init()`, run as a migration |
//!
//! Arguments and results are `postcard`-encoded. The facets are ordinary
//! backends: their selectors can be replaced or removed like any other.

pub mod cut;
pub mod init;
pub mod loupe;
pub mod ownership;

use switchyard_primitives::Selector;

pub use cut::CutFacet;
pub use init::InterfaceInit;
pub use loupe::LoupeFacet;
pub use ownership::OwnershipFacet;

pub const DIAMOND_CUT: Selector = Selector::from_u32(0x1f93_1c1c);

pub const FACETS: Selector = Selector::from_u32(0x7a0e_d627);
pub const FACET_FUNCTION_SELECTORS: Selector = Selector::from_u32(0xadfc_a15e);
pub const FACET_ADDRESSES: Selector = Selector::from_u32(0x52ef_6b2c);
pub const FACET_ADDRESS: Selector = Selector::from_u32(0xcdff_acc6);
pub const SUPPORTS_INTERFACE: Selector = Selector::from_u32(0x01ff_c9a7);

pub const OWNER: Selector = Selector::from_u32(0x8da5_cb5b);
pub const TRANSFER_OWNERSHIP: Selector = Selector::from_u32(0xf2fd_e38b);

pub const INIT: Selector = Selector::from_u32(0xe1c7_392a);

/// Interface ids recorded by [`InterfaceInit`].
pub mod interface {
	use switchyard_primitives::Selector;

	/// Interface detection itself.
	pub const INTROSPECTION: Selector = Selector::from_u32(0x01ff_c9a7);
	/// The cut operation.
	pub const CUT: Selector = Selector::from_u32(0x1f93_1c1c);
	/// The four loupe enumeration queries.
	pub const LOUPE: Selector = Selector::from_u32(0x48e2_b093);
	/// Ownership queries and transfer.
	pub const OWNERSHIP: Selector = Selector::from_u32(0x7f58_28d0);

	pub const STANDARD: [Selector; 4] = [INTROSPECTION, CUT, LOUPE, OWNERSHIP];
}
