//! Running the game's own data generator to dump registry data.
//!
//! The server jar ships a data generator that writes `registries.json` (and
//! friends) when run with `--reports`. How it has to be invoked changed over
//! time: modern servers are a bundler jar that needs
//! `-DbundlerMainClass=…`, old ones expose the main class directly on the
//! class path. Either way the dump ends up under `reports/` or
//! `generated/reports/`; the one file we care about is normalized to
//! `registry/<version>/registries.json`.

use std::path::Path;
use std::time::Duration;
use log::info;
use serde_json::Value;
use crate::{Error, Pipeline, Result};
use crate::java::ExecOptions;

const DATA_GEN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// The data generator entry point inside the server jar.
const DATA_MAIN_CLASS: &str = "net.minecraft.data.Main";

/// Whether a version's server jar is the modern bundler (1.18 and up).
///
/// Non-`1.x` ids (snapshots and such) only exist in the bundler era.
fn uses_bundler(version: &str) -> bool {
	let mut parts = version.split('.');
	match (parts.next(), parts.next().and_then(|x| x.parse::<u32>().ok())) {
		(Some("1"), Some(minor)) => minor >= 18,
		_ => true,
	}
}

fn registry_key(ty: &str) -> String {
	if ty.contains(':') {
		ty.to_owned()
	} else {
		format!("minecraft:{ty}")
	}
}

impl Pipeline {
	/// Returns registry data for a version: the whole dump, or with `ty` one
	/// registry object (its `entries` included), `minecraft:` auto-prefixed.
	pub async fn registry_data(&self, version: &str, ty: Option<&str>) -> Result<Value> {
		let json_path = self.layout.registries_json(version);

		if !json_path.is_file() {
			let _guard = self.locks.acquire(format!("registry:{version}")).await;
			if !json_path.is_file() {
				self.extract_registries(version).await?;
			}
		}

		let dump: Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;

		match ty {
			None => Ok(dump),
			Some(ty) => {
				let key = registry_key(ty);
				dump.get(&key)
					.cloned()
					.ok_or(Error::RegistryNotFound(key))
			},
		}
	}

	async fn extract_registries(&self, version: &str) -> Result<()> {
		let server_jar = self.server_jar(version, None).await?;
		let out_dir = self.layout.registry_dir(version);
		std::fs::create_dir_all(&out_dir)?;

		info!("running the data generator for {version}");

		let args = vec![
			"--reports".to_owned(),
			"--all".to_owned(),
			"--server".to_owned(),
			"--output".to_owned(),
			out_dir.to_string_lossy().into_owned(),
		];

		let opts = if uses_bundler(version) {
			ExecOptions {
				timeout: DATA_GEN_TIMEOUT,
				extra_jvm_args: vec![format!("-DbundlerMainClass={DATA_MAIN_CLASS}")],
				working_dir: Some(&out_dir),
				..ExecOptions::default()
			}
		} else {
			ExecOptions {
				timeout: DATA_GEN_TIMEOUT,
				main_class: Some(DATA_MAIN_CLASS),
				working_dir: Some(&out_dir),
				..ExecOptions::default()
			}
		};

		let run = self.java.execute(&server_jar, &args, &opts, None).await;

		let source = match run {
			Ok(_) => None,
			Err(e) => Some(Box::new(e)),
		};

		// the generator has moved its output directory between versions
		let produced = [
			out_dir.join("reports").join("registries.json"),
			out_dir.join("generated").join("reports").join("registries.json"),
		];

		match produced.iter().find(|x| x.is_file()) {
			Some(found) => {
				normalize_dump(found, &self.layout.registries_json(version))?;
				Ok(())
			},
			None => Err(Error::RegistryExtraction {
				input: server_jar,
				source,
			}),
		}
	}
}

/// Moves the dump to its canonical location, atomically.
fn normalize_dump(found: &Path, dest: &Path) -> Result<()> {
	let part = dest.with_extension("json.part");
	std::fs::copy(found, &part)?;
	std::fs::rename(&part, dest)?;
	Ok(())
}

impl Pipeline {
	/// Compares the registry entry sets of two versions.
	pub async fn registry_diff(&self, from: &str, to: &str, ty: &str) -> Result<(Vec<String>, Vec<String>)> {
		let key = registry_key(ty);
		let from_entries = self.registry_entry_names(from, &key).await?;
		let to_entries = self.registry_entry_names(to, &key).await?;

		let added = to_entries.iter().filter(|x| !from_entries.contains(*x)).cloned().collect();
		let removed = from_entries.iter().filter(|x| !to_entries.contains(*x)).cloned().collect();

		Ok((added, removed))
	}

	async fn registry_entry_names(&self, version: &str, key: &str) -> Result<std::collections::BTreeSet<String>> {
		let registry = self.registry_data(version, Some(key)).await?;

		Ok(registry.get("entries")
			.and_then(|x| x.as_object())
			.map(|entries| entries.keys().cloned().collect())
			.unwrap_or_default())
	}

	/// Every registry name present in a version's dump.
	pub async fn registry_types(&self, version: &str) -> Result<Vec<String>> {
		let dump = self.registry_data(version, None).await?;
		Ok(dump.as_object()
			.map(|x| x.keys().cloned().collect())
			.unwrap_or_default())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn bundler_cutoff() {
		assert!(uses_bundler("1.18"));
		assert!(uses_bundler("1.18.2"));
		assert!(uses_bundler("1.21.10"));
		assert!(!uses_bundler("1.17.1"));
		assert!(!uses_bundler("1.12.2"));
		// snapshot ids don't parse; they're all bundler-era
		assert!(uses_bundler("24w14a"));
	}

	#[test]
	fn type_prefixing() {
		assert_eq!(registry_key("block"), "minecraft:block");
		assert_eq!(registry_key("minecraft:item"), "minecraft:item");
		assert_eq!(registry_key("somemod:thing"), "somemod:thing");
	}
}
