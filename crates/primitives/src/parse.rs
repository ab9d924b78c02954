use thiserror::Error;

/// Errors produced while parsing fixed-width hex values or raw calldata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// The input did not start with `0x`.
	#[error("missing 0x prefix: {0:?}")]
	MissingPrefix(String),

	/// The input contained a non-hex character or an odd digit count.
	#[error("invalid hex {input:?}: {reason}")]
	InvalidHex {
		/// The offending input.
		input: String,
		/// Decoder message.
		reason: String,
	},

	/// The decoded value had the wrong number of bytes.
	#[error("expected {expected} bytes, got {actual}")]
	WrongLength {
		/// Width of the target type.
		expected: usize,
		/// Width of the decoded input.
		actual: usize,
	},

	/// Calldata too short to carry a selector.
	#[error("calldata of {len} bytes cannot carry a 4-byte selector")]
	ShortCalldata {
		/// Length of the rejected calldata.
		len: usize,
	},
}

/// Decodes a `0x`-prefixed hex string of arbitrary length.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, ParseError> {
	let digits = input
		.strip_prefix("0x")
		.or_else(|| input.strip_prefix("0X"))
		.ok_or_else(|| ParseError::MissingPrefix(input.to_string()))?;
	hex::decode(digits).map_err(|e| ParseError::InvalidHex {
		input: input.to_string(),
		reason: e.to_string(),
	})
}

/// Decodes a `0x`-prefixed hex string into exactly `N` bytes.
pub fn parse_fixed<const N: usize>(input: &str) -> Result<[u8; N], ParseError> {
	let bytes = parse_hex_bytes(input)?;
	<[u8; N]>::try_from(bytes.as_slice()).map_err(|_| ParseError::WrongLength {
		expected: N,
		actual: bytes.len(),
	})
}

/// Implements `Display`, `Debug`, `FromStr` and serde for a `[u8; N]` newtype.
///
/// Human-readable formats (TOML, JSON) see `0x`-prefixed lowercase hex; binary
/// formats (postcard) see the raw bytes.
macro_rules! impl_fixed_hex {
	($type:ident, $width:expr) => {
		impl ::std::fmt::Display for $type {
			fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
				write!(f, "0x{}", ::hex::encode(self.0))
			}
		}

		impl ::std::fmt::Debug for $type {
			fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
				write!(f, "{}({})", stringify!($type), self)
			}
		}

		impl ::std::str::FromStr for $type {
			type Err = $crate::parse::ParseError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				$crate::parse::parse_fixed::<$width>(s).map(Self)
			}
		}

		impl ::serde::Serialize for $type {
			fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				if serializer.is_human_readable() {
					serializer.collect_str(self)
				} else {
					::serde::Serialize::serialize(&self.0, serializer)
				}
			}
		}

		impl<'de> ::serde::Deserialize<'de> for $type {
			fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				if deserializer.is_human_readable() {
					let s = <::std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
					s.parse().map_err(::serde::de::Error::custom)
				} else {
					<[u8; $width]>::deserialize(deserializer).map(Self)
				}
			}
		}
	};
}

pub(crate) use impl_fixed_hex;
