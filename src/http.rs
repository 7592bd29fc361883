//! Streaming downloads with integrity checking.
//!
//! Downloads go to a `.part` sibling first and are renamed into place only
//! once the body is complete and the SHA-1 (when the caller knows one)
//! matches, so a path that exists is always a fully materialized artifact.

use std::path::Path;
use futures_util::StreamExt;
use log::{debug, trace};
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use crate::{Error, Result};
use crate::layout::ensure_parent;

/// Progress callback: bytes so far, total if the server told us.
pub type Progress<'a> = &'a mut (dyn FnMut(u64, Option<u64>) + Send);

#[derive(Debug, Default, Clone)]
pub struct Http {
	client: reqwest::Client,
}

fn network(url: &str, source: reqwest::Error) -> Error {
	Error::Network { url: url.to_owned(), source }
}

impl Http {
	pub fn new() -> Http {
		Http::default()
	}

	async fn get(&self, url: &str) -> Result<reqwest::Response> {
		self.client.get(url)
			.send().await
			.and_then(|response| response.error_for_status())
			.map_err(|e| network(url, e))
	}

	pub async fn fetch_text(&self, url: &str) -> Result<String> {
		self.get(url).await?
			.text().await
			.map_err(|e| network(url, e))
	}

	pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
		Ok(self.get(url).await?
			.bytes().await
			.map_err(|e| network(url, e))?
			.to_vec())
	}

	/// Streams `url` to `dest`, verifying `expected_sha1` when given.
	///
	/// The body is written to `<dest>.part` and renamed on success; on any
	/// failure the partial file is removed and `dest` is left untouched.
	pub async fn download(
		&self,
		url: &str,
		dest: &Path,
		expected_sha1: Option<&str>,
		mut progress: Option<Progress<'_>>,
	) -> Result<()> {
		ensure_parent(dest)?;
		let part = {
			let mut name = dest.as_os_str().to_owned();
			name.push(".part");
			std::path::PathBuf::from(name)
		};

		debug!("downloading {url} to {dest:?}");

		let result = self.download_to_part(url, &part, expected_sha1, &mut progress).await;
		if result.is_err() {
			let _ = tokio::fs::remove_file(&part).await;
			return result;
		}

		tokio::fs::rename(&part, dest).await?;
		Ok(())
	}

	async fn download_to_part(
		&self,
		url: &str,
		part: &Path,
		expected_sha1: Option<&str>,
		progress: &mut Option<Progress<'_>>,
	) -> Result<()> {
		let response = self.get(url).await?;
		let total = response.content_length();

		let mut file = tokio::fs::File::create(part).await?;
		let mut hasher = Sha1::new();
		let mut received: u64 = 0;

		let mut stream = response.bytes_stream();
		while let Some(chunk) = stream.next().await {
			let chunk = chunk.map_err(|e| network(url, e))?;

			hasher.update(&chunk);
			file.write_all(&chunk).await?;

			received += chunk.len() as u64;
			if let Some(progress) = progress {
				progress(received, total);
			}
		}

		file.flush().await?;

		if received == 0 {
			return Err(Error::Integrity {
				what: url.to_owned(),
				expected: "a non-empty body".to_owned(),
				actual: "0 bytes".to_owned(),
			});
		}
		if let Some(total) = total {
			if received != total {
				return Err(Error::Integrity {
					what: url.to_owned(),
					expected: format!("{total} bytes"),
					actual: format!("{received} bytes"),
				});
			}
		}

		if let Some(expected) = expected_sha1 {
			let actual = hex::encode(hasher.finalize());
			if !actual.eq_ignore_ascii_case(expected) {
				return Err(Error::Integrity {
					what: url.to_owned(),
					expected: expected.to_owned(),
					actual,
				});
			}
			trace!("sha1 of {url} checks out");
		}

		Ok(())
	}
}
