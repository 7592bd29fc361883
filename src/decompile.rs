//! Driving the decompiler over a remapped jar.
//!
//! Output is a `.java` tree under `decompiled/<version>/<mapping>/`. The
//! decompiler writes into a temp sibling directory which is renamed into
//! place at the end, so a present tree is always complete. Job state and
//! progress are persisted in the metadata store.

use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;
use crate::{Error, Mapping, Pipeline, Result};
use crate::assets::VINEFLOWER;
use crate::java::ExecOptions;
use crate::layout::ensure_parent;
use crate::store::JobStatus;

const DECOMPILE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Progress callback: classes done, classes total.
pub type DecompileProgress<'a> = &'a mut (dyn FnMut(u64, u64) + Send);

#[derive(Debug, Serialize)]
pub struct DecompileSummary {
	pub output_dir: PathBuf,
	pub classes: u64,
}

/// Parses the decompiler's `Decompiling class <cur>/<total>` progress lines.
fn parse_progress(line: &str) -> Option<(u64, u64)> {
	let rest = line.trim().strip_prefix("Decompiling class ")?;
	let (cur, total) = rest.split_once('/')?;
	Some((cur.trim().parse().ok()?, total.trim().parse().ok()?))
}

/// Counts the `.java` files under a tree.
pub(crate) fn count_java_files(root: &Path) -> u64 {
	WalkDir::new(root)
		.into_iter()
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_file())
		.filter(|entry| entry.path().extension().is_some_and(|x| x == "java"))
		.count() as u64
}

impl Pipeline {
	/// Returns the decompiled tree for `(version, mapping)`, producing it if
	/// absent.
	pub async fn decompiled(
		&self,
		version: &str,
		mapping: Mapping,
		mut progress: Option<DecompileProgress<'_>>,
	) -> Result<PathBuf> {
		let out_dir = self.layout.decompiled_dir(version, mapping);
		if out_dir.is_dir() {
			return Ok(out_dir);
		}

		let _guard = self.locks.acquire(format!("decompile:{version}:{mapping}")).await;
		if out_dir.is_dir() {
			return Ok(out_dir);
		}

		let jar = self.remapped_jar(version, mapping).await?;

		self.store.create_job(version, mapping)?;
		self.store.update_job(version, mapping, JobStatus::Running, Some(0.0), None)?;

		let result = self.run_decompiler(version, mapping, &jar, &out_dir, &mut progress).await;

		match result {
			Ok(()) => {
				self.store.update_job(version, mapping, JobStatus::Completed, Some(1.0), None)?;
				Ok(out_dir)
			},
			Err(e) => {
				self.store.update_job(version, mapping, JobStatus::Failed, None, Some(&e.to_string()))?;
				Err(e)
			},
		}
	}

	async fn run_decompiler(
		&self,
		version: &str,
		mapping: Mapping,
		jar: &Path,
		out_dir: &Path,
		progress: &mut Option<DecompileProgress<'_>>,
	) -> Result<()> {
		let decompiler = self.tool_jar(&VINEFLOWER).await?;

		let tmp_dir = out_dir.with_extension("tmp");
		if tmp_dir.is_dir() {
			std::fs::remove_dir_all(&tmp_dir)?;
		}
		ensure_parent(&tmp_dir)?;
		std::fs::create_dir_all(&tmp_dir)?;

		info!("decompiling {version} ({mapping})");

		let args = vec![
			"-thr=4".to_owned(),   // threads
			"-dgs=1".to_owned(),   // decompile generic signatures
			"-lit=1".to_owned(),   // literals as written
			"-asc=1".to_owned(),   // ascii string characters
			"-rsy=1".to_owned(),   // remove synthetic members
			jar.to_string_lossy().into_owned(),
			tmp_dir.to_string_lossy().into_owned(),
		];

		let opts = ExecOptions {
			timeout: DECOMPILE_TIMEOUT,
			..ExecOptions::default()
		};

		let store = &self.store;
		let mut last_percent = 0u64;
		let mut on_stdout = |line: &str| {
			if let Some((cur, total)) = parse_progress(line) {
				if let Some(progress) = progress {
					progress(cur, total);
				}
				// job rows only move in whole percent steps
				let percent = if total == 0 { 0 } else { cur * 100 / total };
				if percent > last_percent {
					last_percent = percent;
					let _ = store.update_job(version, mapping, JobStatus::Running, Some(percent as f64 / 100.0), None);
				}
			}
		};

		let run = self.java.execute(&decompiler, &args, &opts, Some(&mut on_stdout)).await;

		if let Err(e) = run {
			// no partial trees
			if let Err(cleanup) = std::fs::remove_dir_all(&tmp_dir) {
				warn!("failed to remove partial decompile output {tmp_dir:?}: {cleanup}");
			}
			return Err(Error::Decompile {
				input: jar.to_path_buf(),
				source: Box::new(e),
			});
		}

		std::fs::rename(&tmp_dir, out_dir)?;
		Ok(())
	}

	/// Decompiles a version, returning where the tree is and how many
	/// classes it has. With `force`, the existing tree and the matching
	/// search index rows are dropped first.
	pub async fn decompile_version(&self, version: &str, mapping: Mapping, force: bool) -> Result<DecompileSummary> {
		let out_dir = self.layout.decompiled_dir(version, mapping);

		if force && out_dir.is_dir() {
			info!("force rebuild: dropping {out_dir:?} and its search index");
			std::fs::remove_dir_all(&out_dir)?;
			self.search.clear(version, mapping)?;
		}

		let output_dir = self.decompiled(version, mapping, None).await?;
		let classes = count_java_files(&output_dir);

		Ok(DecompileSummary { output_dir, classes })
	}

	/// Reads one decompiled class. `a.b.C` maps to `<tree>/a/b/C.java`.
	pub async fn minecraft_source(&self, version: &str, class_name: &str, mapping: Mapping) -> Result<String> {
		let root = self.decompiled(version, mapping, None).await?;

		let relative: PathBuf = class_name.split(['.', '/']).collect();
		let path = root.join(relative).with_extension("java");

		match std::fs::read_to_string(&path) {
			Ok(source) => {
				self.store.touch_version(version)?;
				Ok(source)
			},
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ClassNotFound {
				class: class_name.to_owned(),
				version: version.to_owned(),
			}),
			Err(e) => Err(e.into()),
		}
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn progress_lines() {
		assert_eq!(parse_progress("Decompiling class 15/3021"), Some((15, 3021)));
		assert_eq!(parse_progress("  Decompiling class 1/1"), Some((1, 1)));
		assert_eq!(parse_progress("INFO: loading classes"), None);
		assert_eq!(parse_progress("Decompiling class oops"), None);
	}
}
