//! Dispatcher-owned storage.
//!
//! Backends run against the dispatcher's [`Storage`], never their own. Values
//! are `postcard`-encoded under string keys; key layout belongs to the
//! backends, which must pick disjoint namespaces.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Keyed slot store shared by every backend of one dispatcher.
///
/// Cloning is a full copy; the dispatcher clones to stage a call and keeps
/// the copy only if the call succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Storage {
	slots: BTreeMap<String, Vec<u8>>,
}

impl Storage {
	/// Creates empty storage.
	pub fn new() -> Self {
		Self::default()
	}

	/// Decodes the value under `key`.
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, postcard::Error> {
		self.slots
			.get(key)
			.map(|bytes| postcard::from_bytes(bytes))
			.transpose()
	}

	/// Encodes `value` under `key`, replacing any previous value.
	pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), postcard::Error> {
		let bytes = postcard::to_stdvec(value)?;
		self.slots.insert(key.to_string(), bytes);
		Ok(())
	}

	/// Deletes `key`. Returns whether it was present.
	pub fn remove(&mut self, key: &str) -> bool {
		self.slots.remove(key).is_some()
	}

	/// Raw encoded bytes under `key`.
	pub fn raw(&self, key: &str) -> Option<&[u8]> {
		self.slots.get(key).map(Vec::as_slice)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.slots.contains_key(key)
	}

	/// Iterates keys in lexicographic order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.slots.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}
