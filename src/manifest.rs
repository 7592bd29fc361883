//! The Mojang version manifest and the jar downloads it points at.
//!
//! The manifest is fetched at most once per process; per-version detail
//! documents are cached alongside. Client/server jars and the ProGuard map
//! are verified against the SHA-1 the manifest declares.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use log::info;
use serde::Deserialize;
use tokio::sync::OnceCell;
use crate::{Error, Mapping, Pipeline, Result};
use crate::http::Progress;

pub const VERSION_MANIFEST_URL: &str = "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

#[derive(Debug, Deserialize)]
pub struct VersionsManifest {
	pub latest: Latest,
	pub versions: Vec<VersionInfo>,
}

#[derive(Debug, Deserialize)]
pub struct Latest {
	pub release: String,
	pub snapshot: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
	pub id: String,
	#[serde(rename = "type")]
	pub version_type: String,
	pub url: String,
	pub sha1: String,
}

#[derive(Debug, Deserialize)]
pub struct VersionDetails {
	pub downloads: Downloads,
}

#[derive(Debug, Deserialize)]
pub struct Downloads {
	pub client: DownloadEntry,
	pub server: Option<DownloadEntry>,
	pub client_mappings: Option<DownloadEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadEntry {
	pub url: String,
	pub sha1: String,
	pub size: u64,
}

/// Process-wide manifest cache.
#[derive(Debug, Default)]
pub struct Manifests {
	manifest: OnceCell<VersionsManifest>,
	details: Mutex<HashMap<String, Arc<VersionDetails>>>,
}

impl Manifests {
	pub fn new() -> Manifests {
		Manifests::default()
	}
}

impl Pipeline {
	/// The version manifest, fetched once per process.
	pub async fn versions_manifest(&self) -> Result<&VersionsManifest> {
		self.manifests.manifest
			.get_or_try_init(|| async {
				let text = self.http.fetch_text(VERSION_MANIFEST_URL).await?;
				Ok(serde_json::from_str(&text)?)
			})
			.await
	}

	pub async fn version_info(&self, version: &str) -> Result<VersionInfo> {
		self.versions_manifest().await?
			.versions.iter()
			.find(|x| x.id == version)
			.cloned()
			.ok_or_else(|| Error::VersionNotFound(version.to_owned()))
	}

	/// The per-version detail document, with its download urls and hashes.
	pub async fn version_details(&self, version: &str) -> Result<Arc<VersionDetails>> {
		{
			let details = self.manifests.details.lock().unwrap_or_else(PoisonError::into_inner);
			if let Some(found) = details.get(version) {
				return Ok(found.clone());
			}
		}

		let info = self.version_info(version).await?;
		let text = self.http.fetch_text(&info.url).await?;
		let parsed: Arc<VersionDetails> = Arc::new(serde_json::from_str(&text)?);

		self.manifests.details.lock().unwrap_or_else(PoisonError::into_inner)
			.insert(version.to_owned(), parsed.clone());

		Ok(parsed)
	}

	/// Downloads (or finds cached) the client jar for a version.
	pub async fn client_jar(&self, version: &str, progress: Option<Progress<'_>>) -> Result<PathBuf> {
		let path = self.layout.client_jar(version);
		if path.is_file() {
			self.store.touch_version(version)?;
			return Ok(path);
		}

		let _guard = self.locks.acquire(format!("jar:{version}:client")).await;
		if path.is_file() {
			return Ok(path);
		}

		let details = self.version_details(version).await?;
		let entry = &details.downloads.client;

		info!("downloading client jar for {version}");
		self.http.download(&entry.url, &path, Some(&entry.sha1), progress).await?;
		self.store.upsert_version(version, &path.to_string_lossy(), &entry.sha1)?;

		Ok(path)
	}

	/// Downloads (or finds cached) the server jar for a version.
	pub async fn server_jar(&self, version: &str, progress: Option<Progress<'_>>) -> Result<PathBuf> {
		let path = self.layout.server_jar(version);
		if path.is_file() {
			return Ok(path);
		}

		let _guard = self.locks.acquire(format!("jar:{version}:server")).await;
		if path.is_file() {
			return Ok(path);
		}

		let details = self.version_details(version).await?;
		let entry = details.downloads.server.as_ref()
			.ok_or_else(|| Error::VersionNotFound(format!("{version} (no server jar)")))?;

		info!("downloading server jar for {version}");
		self.http.download(&entry.url, &path, Some(&entry.sha1), progress).await?;

		Ok(path)
	}

	/// Downloads (or finds cached) the ProGuard map the manifest references.
	pub async fn proguard_map(&self, version: &str) -> Result<PathBuf> {
		let path = self.layout.proguard_map(version);
		if path.is_file() {
			return Ok(path);
		}

		let details = self.version_details(version).await?;
		let entry = details.downloads.client_mappings.as_ref()
			.ok_or_else(|| Error::MappingNotFound { version: version.to_owned(), mapping: Mapping::Mojmap })?;

		info!("downloading proguard map for {version}");
		self.http.download(&entry.url, &path, Some(&entry.sha1), None).await?;

		Ok(path)
	}
}
