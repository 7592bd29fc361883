//! The on-disk cache layout.
//!
//! Every artifact path is computed here and nowhere else, so the directory
//! scheme stays in one place. Paths are pure functions of the artifact key;
//! nothing in this module touches the network or spawns processes.

use std::io;
use std::path::{Path, PathBuf};
use crate::{Mapping, Result};

/// The application directory name under the OS app-data location.
const APP_DIR: &str = "stratum";

#[derive(Debug, Clone)]
pub struct CacheLayout {
	root: PathBuf,
}

impl CacheLayout {
	/// The conventional per-user cache, `<os app data>/stratum`.
	pub fn from_os() -> Result<CacheLayout> {
		let base = dirs::data_dir()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no application data directory on this platform"))?;
		Ok(CacheLayout { root: base.join(APP_DIR) })
	}

	/// A cache rooted at an explicit directory. Tests point this at temp dirs.
	pub fn at(root: impl Into<PathBuf>) -> CacheLayout {
		CacheLayout { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn client_jar(&self, version: &str) -> PathBuf {
		self.root.join("jars").join(version).join("client.jar")
	}

	pub fn server_jar(&self, version: &str) -> PathBuf {
		self.root.join("jars").join(version).join("server.jar")
	}

	/// The downloaded mapping jar (`yarn.jar` / `intermediary.jar`).
	pub fn mapping_jar(&self, version: &str, mapping: Mapping) -> PathBuf {
		self.root.join("mappings").join(version).join(format!("{mapping}.jar"))
	}

	/// The canonical tiny file for a scheme (`yarn.tiny`, `intermediary.tiny`,
	/// `mojmap.tiny`).
	pub fn tiny_file(&self, version: &str, mapping: Mapping) -> PathBuf {
		self.root.join("mappings").join(version).join(format!("{mapping}.tiny"))
	}

	/// The ProGuard map as published (`mojmap.txt`).
	pub fn proguard_map(&self, version: &str) -> PathBuf {
		self.root.join("mappings").join(version).join("mojmap.txt")
	}

	pub fn remapped_jar(&self, version: &str, mapping: Mapping) -> PathBuf {
		self.root.join("remapped").join(version).join(format!("{mapping}.jar"))
	}

	pub fn decompiled_dir(&self, version: &str, mapping: Mapping) -> PathBuf {
		self.root.join("decompiled").join(version).join(mapping.as_str())
	}

	/// Where the game's data generator runs and leaves its output.
	pub fn registry_dir(&self, version: &str) -> PathBuf {
		self.root.join("registry").join(version)
	}

	/// The normalized location of the extracted registry dump.
	pub fn registries_json(&self, version: &str) -> PathBuf {
		self.registry_dir(version).join("registries.json")
	}

	pub fn tool_jar(&self, name: &str, version: &str) -> PathBuf {
		self.root.join("resources").join(format!("{name}-{version}.jar"))
	}

	pub fn search_db(&self) -> PathBuf {
		self.root.join("search_index.db")
	}

	pub fn cache_db(&self) -> PathBuf {
		self.root.join("cache.db")
	}
}

/// Creates the parent directory of a file path, so a following write succeeds.
pub fn ensure_parent(path: &Path) -> Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn paths_are_disjoint_per_key() {
		let layout = CacheLayout::at("/cache");

		let paths = [
			layout.client_jar("1.21.10"),
			layout.server_jar("1.21.10"),
			layout.client_jar("1.20.4"),
			layout.mapping_jar("1.21.10", Mapping::Yarn),
			layout.mapping_jar("1.21.10", Mapping::Intermediary),
			layout.tiny_file("1.21.10", Mapping::Yarn),
			layout.tiny_file("1.21.10", Mapping::Intermediary),
			layout.tiny_file("1.21.10", Mapping::Mojmap),
			layout.proguard_map("1.21.10"),
			layout.remapped_jar("1.21.10", Mapping::Yarn),
			layout.remapped_jar("1.21.10", Mapping::Mojmap),
			layout.decompiled_dir("1.21.10", Mapping::Yarn),
			layout.registries_json("1.21.10"),
			layout.tool_jar("vineflower", "1.10.1"),
			layout.search_db(),
			layout.cache_db(),
		];

		for (i, a) in paths.iter().enumerate() {
			for b in &paths[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}

	#[test]
	fn scheme_matches_the_layout() {
		let layout = CacheLayout::at("/cache");
		assert_eq!(layout.client_jar("1.21.10"), PathBuf::from("/cache/jars/1.21.10/client.jar"));
		assert_eq!(layout.tiny_file("1.21.10", Mapping::Mojmap), PathBuf::from("/cache/mappings/1.21.10/mojmap.tiny"));
		assert_eq!(layout.remapped_jar("1.21.10", Mapping::Yarn), PathBuf::from("/cache/remapped/1.21.10/yarn.jar"));
		assert_eq!(layout.decompiled_dir("1.21.10", Mapping::Yarn), PathBuf::from("/cache/decompiled/1.21.10/yarn"));
	}
}
