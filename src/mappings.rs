//! The mapping service: one canonical tiny file per (version, scheme).
//!
//! - `intermediary` and `yarn` come from the Fabric Maven as jars and are
//!   unpacked.
//! - `mojmap` is produced locally by merging the published ProGuard map with
//!   the intermediary tree; the resulting tiny has the namespaces
//!   `[intermediary, named]`.
//!
//! Each resolution is single-flighted by `(version, mapping)` and recorded
//! in the metadata store once the file is in place.

use std::path::PathBuf;
use log::info;
use crate::{Error, Mapping, Pipeline, Result};
use crate::maven;

impl Pipeline {
	/// Returns the canonical tiny file for `(version, mapping)`, producing it
	/// if it isn't cached yet.
	///
	/// `official` names need no mapping file; asking for one is an error.
	pub async fn mappings(&self, version: &str, mapping: Mapping) -> Result<PathBuf> {
		if mapping == Mapping::Official {
			return Err(Error::MappingNotFound { version: version.to_owned(), mapping });
		}

		let path = self.layout.tiny_file(version, mapping);
		if path.is_file() {
			return Ok(path);
		}

		let _guard = self.locks.acquire(format!("mapping:{version}:{mapping}")).await;
		if path.is_file() {
			return Ok(path);
		}

		match mapping {
			Mapping::Official => unreachable!("checked above"),
			Mapping::Intermediary => self.fetch_intermediary(version).await?,
			Mapping::Yarn => self.fetch_yarn(version).await?,
			Mapping::Mojmap => self.merge_mojmap(version).await?,
		}

		self.store.upsert_mapping(version, mapping, &path.to_string_lossy())?;

		Ok(path)
	}

	async fn fetch_intermediary(&self, version: &str) -> Result<()> {
		let jar = self.layout.mapping_jar(version, Mapping::Intermediary);
		let tiny = self.layout.tiny_file(version, Mapping::Intermediary);

		if !jar.is_file() {
			info!("downloading intermediary mappings for {version}");
			self.http.download(&maven::intermediary_jar_url(version), &jar, None, None).await
				.map_err(|e| match e {
					// fabric simply has no artifact for unknown versions
					Error::Network { .. } => Error::MappingNotFound {
						version: version.to_owned(),
						mapping: Mapping::Intermediary,
					},
					other => other,
				})?;
		}

		maven::extract_tiny(&jar, &tiny)
	}

	async fn fetch_yarn(&self, version: &str) -> Result<()> {
		let jar = self.layout.mapping_jar(version, Mapping::Yarn);
		let tiny = self.layout.tiny_file(version, Mapping::Yarn);

		if !jar.is_file() {
			let build = {
				let xml = self.http.fetch_text(&maven::yarn_metadata_url()).await?;
				let metadata = maven::parse_metadata(&xml)?;
				maven::select_yarn_build(&metadata, version)?.to_owned()
			};

			info!("downloading yarn {build}");
			self.http.download(&maven::yarn_jar_url(&build), &jar, None, None).await?;
		}

		maven::extract_tiny(&jar, &tiny)
	}

	/// Builds `mojmap.tiny` by fusing the ProGuard map with the intermediary
	/// tree. The output's source namespace is intermediary, which is exactly
	/// what the second remap pass consumes.
	async fn merge_mojmap(&self, version: &str) -> Result<()> {
		let proguard_path = self.proguard_map(version).await?;

		// fetched directly rather than through `mappings`, which would
		// otherwise recurse into itself
		let intermediary_path = self.layout.tiny_file(version, Mapping::Intermediary);
		if !intermediary_path.is_file() {
			let _guard = self.locks.acquire(format!("mapping:{version}:intermediary")).await;
			if !intermediary_path.is_file() {
				self.fetch_intermediary(version).await?;
				self.store.upsert_mapping(version, Mapping::Intermediary, &intermediary_path.to_string_lossy())?;
			}
		}

		info!("merging proguard and intermediary mappings for {version}");

		let proguard = vellum::proguard::read_file(&proguard_path)?;
		let intermediary: vellum::tree::Mappings<2> = vellum::tiny_v2::read_file(&intermediary_path)?;

		let merged = vellum::merge::merge(&proguard, &intermediary)?;

		let tiny = self.layout.tiny_file(version, Mapping::Mojmap);
		let part = tiny.with_extension("tiny.part");
		crate::layout::ensure_parent(&part)?;
		vellum::tiny_v2::write_file(&merged, &part)?;
		std::fs::rename(&part, &tiny)?;

		Ok(())
	}

	/// The game versions yarn has builds for.
	pub async fn list_yarn_versions(&self) -> Result<Vec<String>> {
		let xml = self.http.fetch_text(&maven::yarn_metadata_url()).await?;
		let metadata = maven::parse_metadata(&xml)?;
		Ok(maven::yarn_game_versions(&metadata).into_iter().map(|x| x.to_owned()).collect())
	}
}
