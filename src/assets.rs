//! The bundled external tools.
//!
//! The decompiler and remapper are Java programs fetched once from their
//! upstream repositories and kept immutable under `resources/`. Versions and
//! URLs are compile-time constants; the mapping merge itself is native (see
//! [`vellum::merge`]), so no merger tool is needed.

use std::path::PathBuf;
use log::info;
use crate::{Pipeline, Result};

#[derive(Debug, Clone, Copy)]
pub struct ToolAsset {
	pub name: &'static str,
	pub version: &'static str,
	pub url: &'static str,
}

/// The decompiler.
pub const VINEFLOWER: ToolAsset = ToolAsset {
	name: "vineflower",
	version: "1.10.1",
	url: "https://repo1.maven.org/maven2/org/vineflower/vineflower/1.10.1/vineflower-1.10.1.jar",
};

/// The jar remapper.
pub const TINY_REMAPPER: ToolAsset = ToolAsset {
	name: "tiny-remapper",
	version: "0.10.4",
	url: "https://maven.fabricmc.net/net/fabricmc/tiny-remapper/0.10.4/tiny-remapper-0.10.4-fat.jar",
};

impl Pipeline {
	/// Returns the on-disk path of a bundled tool, downloading it on first use.
	///
	/// Concurrent callers for the same asset share one download.
	pub async fn tool_jar(&self, asset: &ToolAsset) -> Result<PathBuf> {
		let path = self.layout.tool_jar(asset.name, asset.version);
		if path.is_file() {
			return Ok(path);
		}

		let _guard = self.locks.acquire(format!("asset:{}", asset.name)).await;
		if path.is_file() {
			return Ok(path);
		}

		info!("fetching {} {}", asset.name, asset.version);
		self.http.download(asset.url, &path, None, None).await?;

		Ok(path)
	}
}
