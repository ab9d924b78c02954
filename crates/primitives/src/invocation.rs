use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::parse::ParseError;
use crate::selector::SELECTOR_LEN;
use crate::{Address, Selector};

/// A single call routed through the dispatcher.
///
/// The selector picks the backend; the payload is opaque to the routing layer
/// and only interpreted by the backend that receives it. Built-in backends
/// encode their arguments with `postcard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
	/// Operation being invoked.
	pub selector: Selector,
	/// Identity of the original caller, used for authority checks.
	pub caller: Address,
	/// Encoded call arguments.
	pub payload: Vec<u8>,
}

impl Invocation {
	/// Creates an invocation with a raw payload.
	pub fn new(selector: Selector, caller: Address, payload: Vec<u8>) -> Self {
		Self {
			selector,
			caller,
			payload,
		}
	}

	/// Creates an invocation without arguments.
	pub fn bare(selector: Selector, caller: Address) -> Self {
		Self::new(selector, caller, Vec::new())
	}

	/// Creates an invocation whose payload is `args` encoded with `postcard`.
	pub fn encode<T: Serialize + ?Sized>(
		selector: Selector,
		caller: Address,
		args: &T,
	) -> Result<Self, postcard::Error> {
		Ok(Self::new(selector, caller, postcard::to_stdvec(args)?))
	}

	/// Decodes the payload as `T`.
	pub fn decode_args<T: DeserializeOwned>(&self) -> Result<T, postcard::Error> {
		postcard::from_bytes(&self.payload)
	}

	/// Splits raw calldata into its leading selector and the trailing payload.
	pub fn from_calldata(caller: Address, calldata: &[u8]) -> Result<Self, ParseError> {
		let Some((head, tail)) = calldata.split_first_chunk::<SELECTOR_LEN>() else {
			return Err(ParseError::ShortCalldata { len: calldata.len() });
		};
		Ok(Self::new(Selector(*head), caller, tail.to_vec()))
	}

	/// Joins selector and payload back into raw calldata.
	pub fn to_calldata(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(SELECTOR_LEN + self.payload.len());
		out.extend_from_slice(self.selector.as_bytes());
		out.extend_from_slice(&self.payload);
		out
	}

	/// Short description for tracing/logging.
	pub fn describe(&self) -> String {
		format!("{}:{}b from {}", self.selector, self.payload.len(), self.caller)
	}
}

/// Decodes a backend's encoded return value.
pub fn decode_output<T: DeserializeOwned>(output: &[u8]) -> Result<T, postcard::Error> {
	postcard::from_bytes(output)
}

/// Encodes a backend's return value.
pub fn encode_output<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, postcard::Error> {
	postcard::to_stdvec(value)
}
