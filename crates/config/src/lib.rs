//! Deployment manifests for switchyard dispatchers.
//!
//! A manifest names the owner, the deployed backends, the initial cut, and an
//! optional migration. It is written in TOML:
//!
//! ```toml
//! owner = "0x00000000000000000000000000000000000000aa"
//! cut_facet = "cut"
//!
//! [backends.cut]
//! address = "0x0000000000000000000000000000000000000001"
//! kind = "cut"
//!
//! [backends.loupe]
//! address = "0x0000000000000000000000000000000000000002"
//! kind = "loupe"
//!
//! [[cut]]
//! action = "add"
//! backend = "loupe"
//! selectors = ["0x7a0ed627", "0xcdffacc6"]
//!
//! [migration]
//! backend = "init"
//! payload = "0x"
//! ```
//!
//! Backend `kind`s are opaque here; the dispatch crate maps them to
//! implementations. `cut_facet` names the backend that serves `diamondCut`
//! from construction, before any cut has run.
//!
//! # Validation
//!
//! [`Manifest::parse`] decodes every address, selector and payload, checks
//! that add and replace entries name a declared backend and that remove
//! entries name none. Backends nothing refers to produce a
//! [`ManifestWarning`] in [`Manifest::warnings`] rather than an error.

pub mod error;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use error::{ConfigError, ManifestWarning, Result};
use serde::Deserialize;
use switchyard_primitives::parse::parse_hex_bytes;
use switchyard_primitives::{Address, Selector};
use switchyard_registry::{CutAction, DiamondCut, FacetCut};
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
	owner: String,
	#[serde(default)]
	cut_facet: Option<String>,
	#[serde(default)]
	backends: BTreeMap<String, RawBackend>,
	#[serde(default, rename = "cut")]
	cuts: Vec<RawCut>,
	#[serde(default)]
	migration: Option<RawMigration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBackend {
	address: String,
	kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCut {
	action: CutAction,
	#[serde(default)]
	backend: Option<String>,
	selectors: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMigration {
	backend: String,
	#[serde(default)]
	payload: Option<String>,
}

/// A declared backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDecl {
	/// Address the backend is deployed at.
	pub address: Address,
	/// Implementation key resolved by the embedder.
	pub kind: String,
}

/// One `[[cut]]` entry with decoded selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutDecl {
	/// Requested change.
	pub action: CutAction,
	/// Backend name; `None` for removals.
	pub backend: Option<String>,
	/// Selectors the change applies to.
	pub selectors: Vec<Selector>,
}

/// The `[migration]` table with a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDecl {
	/// Name of the backend that runs the migration.
	pub backend: String,
	/// Opaque migration arguments.
	pub payload: Vec<u8>,
}

/// Parsed deployment manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
	/// Initial owner, allowed to cut.
	pub owner: Address,
	/// Backend bound to `diamondCut` at construction.
	pub cut_facet: Option<String>,
	/// Declared backends by name.
	pub backends: BTreeMap<String, BackendDecl>,
	/// Initial cut entries, in order.
	pub cuts: Vec<CutDecl>,
	/// Migration run with the initial cut.
	pub migration: Option<MigrationDecl>,
	/// Non-fatal issues found while parsing.
	pub warnings: Vec<ManifestWarning>,
}

impl Manifest {
	/// Parses a TOML string into a [`Manifest`].
	///
	/// Non-fatal warnings are collected in `Manifest::warnings` and logged.
	pub fn parse(input: &str) -> Result<Self> {
		let raw: RawManifest = toml::from_str(input)?;

		let owner = parse_address(&raw.owner, "owner")?;

		let mut backends = BTreeMap::new();
		for (name, decl) in raw.backends {
			let address = parse_address(&decl.address, &format!("backends.{name}"))?;
			backends.insert(
				name,
				BackendDecl {
					address,
					kind: decl.kind,
				},
			);
		}

		let mut referenced = BTreeSet::new();
		let mut reference = |name: &str, context: String| {
			if !backends.contains_key(name) {
				return Err(ConfigError::UnknownBackend {
					name: name.to_string(),
					context,
				});
			}
			referenced.insert(name.to_string());
			Ok(())
		};

		if let Some(name) = &raw.cut_facet {
			reference(name, "cut_facet".to_string())?;
		}

		let mut cuts = Vec::with_capacity(raw.cuts.len());
		for (index, entry) in raw.cuts.into_iter().enumerate() {
			match (entry.action, &entry.backend) {
				(CutAction::Remove, Some(backend)) => {
					return Err(ConfigError::RemoveNamesBackend {
						index,
						backend: backend.clone(),
					});
				}
				(action @ (CutAction::Add | CutAction::Replace), None) => {
					return Err(ConfigError::MissingBackend { index, action });
				}
				(_, Some(name)) => reference(name, format!("cut {index}"))?,
				(CutAction::Remove, None) => {}
			}

			let selectors = entry
				.selectors
				.into_iter()
				.map(|value| {
					value
						.parse::<Selector>()
						.map_err(|source| ConfigError::InvalidSelector {
							index,
							value,
							source,
						})
				})
				.collect::<Result<Vec<_>>>()?;

			cuts.push(CutDecl {
				action: entry.action,
				backend: entry.backend,
				selectors,
			});
		}

		let migration = match raw.migration {
			Some(m) => {
				reference(&m.backend, "migration".to_string())?;
				let payload = match m.payload.as_deref() {
					Some(hex) => parse_hex_bytes(hex).map_err(ConfigError::InvalidPayload)?,
					None => Vec::new(),
				};
				Some(MigrationDecl {
					backend: m.backend,
					payload,
				})
			}
			None => None,
		};

		let warnings: Vec<ManifestWarning> = backends
			.keys()
			.filter(|name| !referenced.contains(*name))
			.map(|name| ManifestWarning::UnreferencedBackend { name: name.clone() })
			.collect();
		for warning in &warnings {
			warn!(%warning, "manifest");
		}

		Ok(Manifest {
			owner,
			cut_facet: raw.cut_facet,
			backends,
			cuts,
			migration,
			warnings,
		})
	}

	/// Loads a manifest from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Returns the address of a declared backend.
	pub fn address_of(&self, name: &str) -> Option<Address> {
		self.backends.get(name).map(|decl| decl.address)
	}

	/// Returns the address of the `cut_facet` backend, if one is named.
	pub fn cut_facet_address(&self) -> Result<Option<Address>> {
		self.cut_facet
			.as_deref()
			.map(|name| self.resolve(name, "cut_facet"))
			.transpose()
	}

	/// Builds the initial cut, resolving backend names to addresses.
	///
	/// Remove entries target [`Address::ZERO`]. The result may have no
	/// directives; applying it is left to the caller.
	pub fn to_cut(&self) -> Result<DiamondCut> {
		let mut directives = Vec::with_capacity(self.cuts.len());
		for (index, entry) in self.cuts.iter().enumerate() {
			let directive = match (entry.action, entry.backend.as_deref()) {
				(CutAction::Remove, None) => FacetCut::remove(entry.selectors.clone()),
				(CutAction::Remove, Some(backend)) => {
					return Err(ConfigError::RemoveNamesBackend {
						index,
						backend: backend.to_string(),
					});
				}
				(action, None) => return Err(ConfigError::MissingBackend { index, action }),
				(action, Some(name)) => FacetCut {
					backend: self.resolve(name, &format!("cut {index}"))?,
					action,
					selectors: entry.selectors.clone(),
				},
			};
			directives.push(directive);
		}

		let mut cut = DiamondCut::new(directives);
		if let Some(migration) = &self.migration {
			let target = self.resolve(&migration.backend, "migration")?;
			cut = cut.with_migration(target, migration.payload.clone());
		}
		Ok(cut)
	}

	fn resolve(&self, name: &str, context: &str) -> Result<Address> {
		self.address_of(name).ok_or_else(|| ConfigError::UnknownBackend {
			name: name.to_string(),
			context: context.to_string(),
		})
	}
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
	value.parse().map_err(|source| ConfigError::InvalidAddress {
		field: field.to_string(),
		source,
	})
}
