use crate::parse::impl_fixed_hex;

/// Width of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Opaque handle identifying a backend or a caller.
///
/// [`Address::ZERO`] is the null sentinel: remove directives carry it, and
/// lookups of unbound selectors report it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
	/// The null sentinel.
	pub const ZERO: Self = Self([0; ADDRESS_LEN]);

	/// Returns true for the null sentinel.
	pub fn is_null(&self) -> bool {
		*self == Self::ZERO
	}

	/// Builds an address whose trailing bytes hold `value` (big-endian).
	///
	/// Handy for fixtures and manifests that number their backends.
	pub const fn from_low_u64(value: u64) -> Self {
		let mut bytes = [0; ADDRESS_LEN];
		let low = value.to_be_bytes();
		let mut i = 0;
		while i < low.len() {
			bytes[ADDRESS_LEN - low.len() + i] = low[i];
			i += 1;
		}
		Self(bytes)
	}

	/// Raw bytes.
	pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
		&self.0
	}
}

impl From<[u8; ADDRESS_LEN]> for Address {
	fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
		Self(bytes)
	}
}

impl_fixed_hex!(Address, ADDRESS_LEN);
