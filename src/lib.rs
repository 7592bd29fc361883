//! A local artifact pipeline for decompiled Minecraft source.
//!
//! Given a version id and a naming scheme ([`Mapping`]), the [`Pipeline`]
//! downloads the obfuscated jars, resolves and merges symbol mappings, drives
//! the external remapper and decompiler, extracts registry data, and keeps a
//! full-text search index over the decompiled tree. Every artifact is cached
//! on disk under a single root and regenerated only when absent.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::Serialize;

mod error;

pub mod layout;
pub mod http;
pub mod store;
pub mod java;
pub mod winpath;
pub mod singleflight;
pub mod assets;
pub mod manifest;
pub mod maven;
pub mod mappings;
pub mod remap;
pub mod decompile;
pub mod registry;
pub mod lookup;
pub mod search;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::Pipeline;

/// A symbol naming scheme.
///
/// `official` is the as-published obfuscated scheme, `intermediary` is stable
/// across versions, `yarn` and `mojmap` are the two human-readable schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mapping {
	Official,
	Intermediary,
	Yarn,
	Mojmap,
}

impl Mapping {
	pub fn as_str(&self) -> &'static str {
		match self {
			Mapping::Official => "official",
			Mapping::Intermediary => "intermediary",
			Mapping::Yarn => "yarn",
			Mapping::Mojmap => "mojmap",
		}
	}
}

impl Display for Mapping {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mapping {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Mapping, String> {
		match s {
			"official" => Ok(Mapping::Official),
			"intermediary" => Ok(Mapping::Intermediary),
			"yarn" => Ok(Mapping::Yarn),
			"mojmap" => Ok(Mapping::Mojmap),
			other => Err(format!("unknown mapping scheme {other:?}")),
		}
	}
}
