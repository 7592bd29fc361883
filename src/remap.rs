//! Driving the external remapper over the game jar.
//!
//! The game ships in `official` symbols. One remap pass gets to
//! `intermediary`; the human-readable schemes take a second pass from
//! `intermediary` to `named` with the yarn or merged-mojmap tiny. The
//! remapper's command line is `<input> <output> <mappings> <from> <to>`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use log::info;
use crate::{Error, Mapping, Pipeline, Result};
use crate::assets::TINY_REMAPPER;
use crate::java::ExecOptions;
use crate::layout::ensure_parent;
use crate::store::JobStatus;

const REMAP_TIMEOUT: Duration = Duration::from_secs(20 * 60);

impl Pipeline {
	/// Returns the client jar remapped into `mapping`, producing it if absent.
	///
	/// For `official` the original client jar is already the answer.
	pub async fn remapped_jar(&self, version: &str, mapping: Mapping) -> Result<PathBuf> {
		if mapping == Mapping::Official {
			return self.client_jar(version, None).await;
		}

		let output = self.layout.remapped_jar(version, mapping);
		if output.is_file() {
			return Ok(output);
		}

		let _guard = self.locks.acquire(format!("remap:{version}:{mapping}")).await;
		if output.is_file() {
			return Ok(output);
		}

		let input = self.client_jar(version, None).await?;
		let intermediary_tiny = self.mappings(version, Mapping::Intermediary).await?;

		self.store.create_job(version, mapping)?;
		self.store.update_job(version, mapping, JobStatus::Running, Some(0.0), None)?;

		let result = match mapping {
			Mapping::Official => unreachable!("handled above"),
			Mapping::Intermediary => {
				self.remap_single(version, &input, &output, &intermediary_tiny, "official", "intermediary", false).await
			},
			Mapping::Yarn | Mapping::Mojmap => {
				self.remap_two_pass(version, mapping, &input, &output, &intermediary_tiny).await
			},
		};

		match result {
			Ok(()) => {
				self.store.update_job(version, mapping, JobStatus::Completed, Some(1.0), None)?;
				Ok(output)
			},
			Err(e) => {
				self.store.update_job(version, mapping, JobStatus::Failed, None, Some(&e.to_string()))?;
				Err(e)
			},
		}
	}

	async fn remap_two_pass(
		&self,
		version: &str,
		mapping: Mapping,
		input: &Path,
		output: &Path,
		intermediary_tiny: &Path,
	) -> Result<()> {
		let named_tiny = self.mappings(version, mapping).await?;

		let tmp = output.with_extension("intermediary.tmp.jar");

		let first = self.remap_single(version, input, &tmp, intermediary_tiny, "official", "intermediary", false).await;
		let second = match first {
			Ok(()) => self.remap_single(version, &tmp, output, &named_tiny, "intermediary", "named", true).await,
			Err(e) => Err(e),
		};

		// the intermediate jar goes away on success and failure alike
		let _ = std::fs::remove_file(&tmp);

		second
	}

	/// One remapper pass. The jar is written next to `output` and renamed
	/// into place, so a present output file is always complete.
	async fn remap_single(
		&self,
		version: &str,
		input: &Path,
		output: &Path,
		tiny: &Path,
		from: &str,
		to: &str,
		rebuild_source_names: bool,
	) -> Result<()> {
		let remapper = self.tool_jar(&TINY_REMAPPER).await?;
		ensure_parent(output)?;

		let part = output.with_extension("jar.part");

		info!("remapping {version}: {from} -> {to}");

		let mut args = vec![
			input.to_string_lossy().into_owned(),
			part.to_string_lossy().into_owned(),
			tiny.to_string_lossy().into_owned(),
			from.to_owned(),
			to.to_owned(),
			"--renameinvalidlocals".to_owned(),
		];
		if rebuild_source_names {
			args.push("--rebuildsourcefilenames".to_owned());
		}

		let opts = ExecOptions {
			timeout: REMAP_TIMEOUT,
			..ExecOptions::default()
		};

		let run = self.java.execute(&remapper, &args, &opts, None).await;

		if let Err(e) = run {
			let _ = std::fs::remove_file(&part);
			return Err(Error::Remap {
				direction: format!("{from} -> {to}"),
				input: input.to_path_buf(),
				source: Box::new(e),
			});
		}

		std::fs::rename(&part, output)?;
		Ok(())
	}

	/// Remaps a user-supplied mod jar. Mods ship in `intermediary`, so this
	/// is a single `intermediary -> named` pass with the chosen scheme's tiny.
	pub async fn remap_mod_jar(
		&self,
		input: &Path,
		output: &Path,
		version: &str,
		to_mapping: Mapping,
	) -> Result<PathBuf> {
		match to_mapping {
			Mapping::Yarn | Mapping::Mojmap => {
				let tiny = self.mappings(version, to_mapping).await?;
				self.remap_single(version, input, output, &tiny, "intermediary", "named", false).await?;
			},
			Mapping::Intermediary => {
				// already in intermediary
				ensure_parent(output)?;
				std::fs::copy(input, output)?;
			},
			Mapping::Official => {
				return Err(Error::MappingNotFound { version: version.to_owned(), mapping: to_mapping });
			},
		}

		Ok(output.to_path_buf())
	}
}
