//! Translating a symbol between naming schemes.
//!
//! The yarn tiny carries `official`, `intermediary` and `named` columns, so
//! any pair of those resolves against that one file. `mojmap` names live
//! only in the merged `[intermediary, named]` tiny, which means a
//! translation between mojmap and yarn (or official) can't happen in one
//! file: it goes through intermediary in two steps.

use log::debug;
use serde::Serialize;
use crate::{Mapping, Pipeline, Result};

/// The outcome of a symbol translation. `found: false` carries the queried
/// symbol and nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
	pub found: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	pub source: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,
}

impl LookupResult {
	fn not_found(symbol: &str) -> LookupResult {
		LookupResult {
			found: false,
			kind: None,
			source: symbol.to_owned(),
			target: None,
			class_name: None,
		}
	}

	fn identity(symbol: &str) -> LookupResult {
		LookupResult {
			found: true,
			kind: None,
			source: symbol.to_owned(),
			target: Some(symbol.to_owned()),
			class_name: None,
		}
	}

	fn from_found(found: vellum::tree::Found) -> LookupResult {
		LookupResult {
			found: true,
			kind: Some(found.kind.to_string()),
			source: found.source,
			target: Some(found.target),
			class_name: found.class_name,
		}
	}
}

/// The column a scheme reads as inside the yarn tiny.
fn yarn_namespace(mapping: Mapping) -> Option<&'static str> {
	match mapping {
		Mapping::Official => Some("official"),
		Mapping::Intermediary => Some("intermediary"),
		Mapping::Yarn => Some("named"),
		Mapping::Mojmap => None,
	}
}

impl Pipeline {
	/// Translates `symbol` from `src` to `dst` for a version.
	///
	/// Same-file pairs resolve directly; pairs split across the yarn and
	/// mojmap trees bridge through intermediary in two steps.
	pub async fn find_mapping(
		&self,
		version: &str,
		symbol: &str,
		src: Mapping,
		dst: Mapping,
	) -> Result<LookupResult> {
		if src == dst {
			return Ok(LookupResult::identity(symbol));
		}

		match (yarn_namespace(src), yarn_namespace(dst)) {
			// mojmap ⇄ intermediary is the merged tiny itself
			(Some("intermediary"), None) => self.lookup_in_merged(version, symbol, "intermediary", "named").await,
			(None, Some("intermediary")) => self.lookup_in_merged(version, symbol, "named", "intermediary").await,
			// both schemes live in the yarn tiny
			(Some(from), Some(to)) => self.lookup_in_yarn(version, symbol, from, to).await,
			// mojmap ⇄ yarn/official: bridge through intermediary
			(Some(from), None) => {
				debug!("bridging {src} -> intermediary -> {dst}");
				let first = self.lookup_in_yarn(version, symbol, from, "intermediary").await?;
				let Some(step) = first.target.clone() else {
					return Ok(first);
				};
				let second = self.lookup_in_merged(version, &step, "intermediary", "named").await?;
				Ok(compose(first, second))
			},
			(None, Some(to)) => {
				debug!("bridging {src} -> intermediary -> {dst}");
				let first = self.lookup_in_merged(version, symbol, "named", "intermediary").await?;
				let Some(step) = first.target.clone() else {
					return Ok(first);
				};
				let second = self.lookup_in_yarn(version, &step, "intermediary", to).await?;
				Ok(compose(first, second))
			},
			(None, None) => Ok(LookupResult::identity(symbol)),
		}
	}

	async fn lookup_in_yarn(&self, version: &str, symbol: &str, from: &str, to: &str) -> Result<LookupResult> {
		let path = self.mappings(version, Mapping::Yarn).await?;
		let tree: vellum::tree::Mappings<3> = vellum::tiny_v2::read_file(&path)?;
		Ok(lookup_in_tree(&tree, symbol, from, to))
	}

	async fn lookup_in_merged(&self, version: &str, symbol: &str, from: &str, to: &str) -> Result<LookupResult> {
		let path = self.mappings(version, Mapping::Mojmap).await?;
		let tree: vellum::tree::Mappings<2> = vellum::tiny_v2::read_file(&path)?;
		Ok(lookup_in_tree(&tree, symbol, from, to))
	}

}

/// Stitches a two-step translation back together: the caller asked about
/// their symbol, not the intermediary one the bridge went through.
fn compose(first: LookupResult, mut second: LookupResult) -> LookupResult {
	second.source = first.source;
	if second.found {
		second.kind = second.kind.or(first.kind);
	}
	second
}

fn lookup_in_tree<const N: usize>(
	tree: &vellum::tree::Mappings<N>,
	symbol: &str,
	from: &str,
	to: &str,
) -> LookupResult {
	let (Some(src), Some(dst)) = (tree.namespaces.namespace(from), tree.namespaces.namespace(to)) else {
		return LookupResult::not_found(symbol);
	};

	match tree.find_symbol(symbol, src, dst) {
		Some(found) => LookupResult::from_found(found),
		None => LookupResult::not_found(symbol),
	}
}
