use crate::parse::impl_fixed_hex;

/// Width of a selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Fixed-width identifier naming one externally callable operation.
///
/// Selectors are opaque: the registry never derives them from signatures, it
/// only compares and hashes them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Selector(pub [u8; SELECTOR_LEN]);

impl Selector {
	/// Builds a selector from its big-endian integer form (`0xAABBCCDD`).
	pub const fn from_u32(value: u32) -> Self {
		Self(value.to_be_bytes())
	}

	/// Returns the big-endian integer form.
	pub const fn as_u32(self) -> u32 {
		u32::from_be_bytes(self.0)
	}

	/// Raw bytes.
	pub const fn as_bytes(&self) -> &[u8; SELECTOR_LEN] {
		&self.0
	}
}

impl From<u32> for Selector {
	fn from(value: u32) -> Self {
		Self::from_u32(value)
	}
}

impl From<[u8; SELECTOR_LEN]> for Selector {
	fn from(bytes: [u8; SELECTOR_LEN]) -> Self {
		Self(bytes)
	}
}

impl_fixed_hex!(Selector, SELECTOR_LEN);
