//! The Fabric Maven repository: intermediary and yarn artifacts.
//!
//! Yarn builds are listed in `maven-metadata.xml`; for a game version the
//! highest `<version>+build.<n>` wins. Both mapping artifacts are jars with
//! the actual tiny file at `mappings/mappings.tiny` inside.

use std::io::Read;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::{Error, Mapping, Result};
use crate::layout::ensure_parent;

pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";

/// The entry inside the mapping jars that holds the tiny file.
const TINY_ENTRY: &str = "mappings/mappings.tiny";

#[derive(Debug, Deserialize, Serialize)]
pub struct MavenMetadata {
	#[serde(rename = "groupId")]
	pub group_id: String,
	#[serde(rename = "artifactId")]
	pub artifact_id: String,
	pub versioning: Versioning,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Versioning {
	pub latest: String,
	pub release: String,
	pub versions: Versions,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Versions {
	#[serde(rename = "version", default)]
	pub versions: Vec<String>,
}

pub fn intermediary_jar_url(version: &str) -> String {
	format!("{FABRIC_MAVEN}/net/fabricmc/intermediary/{version}/intermediary-{version}-v2.jar")
}

pub fn yarn_metadata_url() -> String {
	format!("{FABRIC_MAVEN}/net/fabricmc/yarn/maven-metadata.xml")
}

pub fn yarn_jar_url(yarn_version: &str) -> String {
	format!("{FABRIC_MAVEN}/net/fabricmc/yarn/{yarn_version}/yarn-{yarn_version}-v2.jar")
}

pub fn parse_metadata(xml: &str) -> Result<MavenMetadata> {
	Ok(serde_xml_rs::from_str(xml)?)
}

/// Picks the yarn version to use for a game version: the highest build
/// number, ties broken by the lexicographically larger version string.
///
/// Fails with `notFound.mapping` when the metadata lists no build at all
/// for the version.
pub fn select_yarn_build<'a>(metadata: &'a MavenMetadata, version: &str) -> Result<&'a str> {
	let prefix = format!("{version}+build.");

	metadata.versioning.versions.versions.iter()
		.filter(|x| x.starts_with(&prefix))
		.max_by_key(|x| {
			let build: u32 = x[prefix.len()..].parse().unwrap_or(0);
			(build, x.as_str())
		})
		.map(|x| x.as_str())
		.ok_or_else(|| Error::MappingNotFound { version: version.to_owned(), mapping: Mapping::Yarn })
}

/// All game versions yarn has builds for, deduplicated, newest entry last.
pub fn yarn_game_versions(metadata: &MavenMetadata) -> Vec<&str> {
	let mut seen = std::collections::HashSet::new();
	metadata.versioning.versions.versions.iter()
		.filter_map(|x| x.split_once("+build."))
		.map(|(game, _)| game)
		.filter(|x| seen.insert(*x))
		.collect()
}

/// Extracts `mappings/mappings.tiny` out of a mapping jar, atomically.
pub fn extract_tiny(jar: &Path, dest: &Path) -> Result<()> {
	let file = std::fs::File::open(jar)?;
	let mut archive = zip::ZipArchive::new(file)?;

	let mut entry = archive.by_name(TINY_ENTRY)?;
	let mut content = Vec::with_capacity(entry.size() as usize);
	entry.read_to_end(&mut content)?;

	ensure_parent(dest)?;
	let part = dest.with_extension("tiny.part");
	std::fs::write(&part, &content)?;
	std::fs::rename(&part, dest)?;

	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	const METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>net.fabricmc</groupId>
  <artifactId>yarn</artifactId>
  <versioning>
    <latest>1.21.10+build.3</latest>
    <release>1.21.10+build.3</release>
    <versions>
      <version>1.20.4+build.1</version>
      <version>1.20.4+build.3</version>
      <version>1.21.10+build.1</version>
      <version>1.21.10+build.2</version>
      <version>1.21.10+build.3</version>
    </versions>
  </versioning>
</metadata>"#;

	#[test]
	fn highest_build_wins() -> Result<()> {
		let metadata = parse_metadata(METADATA)?;
		assert_eq!(select_yarn_build(&metadata, "1.21.10")?, "1.21.10+build.3");
		assert_eq!(select_yarn_build(&metadata, "1.20.4")?, "1.20.4+build.3");
		Ok(())
	}

	#[test]
	fn build_numbers_compare_numerically() -> Result<()> {
		let xml = METADATA.replace("1.21.10+build.3", "1.21.10+build.10");
		let metadata = parse_metadata(&xml)?;
		// 10 > 2 even though "10" < "2" lexicographically
		assert_eq!(select_yarn_build(&metadata, "1.21.10")?, "1.21.10+build.10");
		Ok(())
	}

	#[test]
	fn missing_version_is_not_found() -> Result<()> {
		let metadata = parse_metadata(METADATA)?;
		let err = select_yarn_build(&metadata, "1.8.9").unwrap_err();
		assert_eq!(err.kind(), "notFound.mapping");
		Ok(())
	}

	#[test]
	fn game_versions_deduplicate() -> Result<()> {
		let metadata = parse_metadata(METADATA)?;
		assert_eq!(yarn_game_versions(&metadata), vec!["1.20.4", "1.21.10"]);
		Ok(())
	}

	#[test]
	fn urls() {
		assert_eq!(
			intermediary_jar_url("1.21.10"),
			"https://maven.fabricmc.net/net/fabricmc/intermediary/1.21.10/intermediary-1.21.10-v2.jar"
		);
		assert_eq!(
			yarn_jar_url("1.21.10+build.3"),
			"https://maven.fabricmc.net/net/fabricmc/yarn/1.21.10+build.3/yarn-1.21.10+build.3-v2.jar"
		);
	}
}
