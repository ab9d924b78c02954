//! Error types for manifest parsing.

use std::path::PathBuf;

use switchyard_primitives::ParseError;
use switchyard_registry::CutAction;
use thiserror::Error;

/// Errors that can occur when parsing or resolving a manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a manifest file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A cut, the migration, or `cut_facet` named an undeclared backend.
	#[error("{context} names undeclared backend {name:?}")]
	UnknownBackend {
		/// Backend name as written.
		name: String,
		/// Where the name appeared.
		context: String,
	},

	/// A selector string was not 4 bytes of `0x` hex.
	#[error("invalid selector {value:?} in cut {index}: {source}")]
	InvalidSelector {
		/// Index of the `[[cut]]` entry.
		index: usize,
		/// Selector as written.
		value: String,
		/// Decoder error.
		source: ParseError,
	},

	/// An address string was not 20 bytes of `0x` hex.
	#[error("invalid address for {field}: {source}")]
	InvalidAddress {
		/// Manifest field carrying the address.
		field: String,
		/// Decoder error.
		source: ParseError,
	},

	/// The migration payload was not `0x` hex.
	#[error("invalid migration payload: {0}")]
	InvalidPayload(#[source] ParseError),

	/// A remove entry named a backend; removals always target the null backend.
	#[error("cut {index} removes selectors but names backend {backend:?}")]
	RemoveNamesBackend {
		/// Index of the `[[cut]]` entry.
		index: usize,
		/// Backend name as written.
		backend: String,
	},

	/// An add or replace entry named no backend.
	#[error("cut {index} ({action}) names no backend")]
	MissingBackend {
		/// Index of the `[[cut]]` entry.
		index: usize,
		/// Requested action.
		action: CutAction,
	},
}

/// Non-fatal issues found while parsing a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
	/// A backend is declared but no cut, migration, or `cut_facet` uses it.
	UnreferencedBackend {
		/// Backend name.
		name: String,
	},
}

impl std::fmt::Display for ManifestWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnreferencedBackend { name } => {
				write!(f, "backend '{name}' is declared but never referenced")
			}
		}
	}
}

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
