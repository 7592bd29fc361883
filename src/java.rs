//! Locating a Java runtime and running bundled jars with it.
//!
//! The pipeline shells out to Java three ways: the decompiler, the remapper,
//! and the game's own data generator. All of them go through
//! [`JavaRuntime::execute`], which owns heap sizing, timeouts, output capture
//! and the kill-on-timeout rule.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use log::{debug, error, trace};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use crate::{Error, Result};
use crate::winpath::PathTranslator;

/// The lowest Java major version the bundled tools run on.
pub const MIN_JAVA_VERSION: u16 = 17;

/// Per-call line callback, fed each stdout line as it arrives.
pub type LineSink<'a> = &'a mut (dyn FnMut(&str) + Send);

#[derive(Debug)]
pub struct ExecOptions<'a> {
	/// `-Xmx`, in MiB.
	pub max_heap_mib: u32,
	/// `-Xms`, in MiB.
	pub initial_heap_mib: u32,
	pub timeout: Duration,
	/// When set, the jar goes on the class path and this class is run
	/// instead of the jar's own main.
	pub main_class: Option<&'a str>,
	pub extra_jvm_args: Vec<String>,
	pub working_dir: Option<&'a Path>,
}

impl Default for ExecOptions<'_> {
	fn default() -> Self {
		ExecOptions {
			max_heap_mib: 2048,
			initial_heap_mib: 512,
			timeout: Duration::from_secs(10 * 60),
			main_class: None,
			extra_jvm_args: Vec::new(),
			working_dir: None,
		}
	}
}

#[derive(Debug)]
pub struct ExecOutput {
	pub exit_code: i32,
	pub stdout: String,
	pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct JavaRuntime {
	java_command: OsString,
	translator: PathTranslator,
}

impl JavaRuntime {
	/// Finds `java` via `$JAVA_HOME/bin/java`, falling back to the `PATH`.
	pub fn locate() -> JavaRuntime {
		let java_command = std::env::var_os("JAVA_HOME")
			.map(|java_home| {
				let mut path = PathBuf::from(java_home);
				path.push("bin/java");
				trace!("located java via JAVA_HOME as {path:?}");
				OsString::from(path)
			})
			.unwrap_or_else(|| "java".into());

		let translator = PathTranslator::detect(&java_command);

		JavaRuntime { java_command, translator }
	}

	pub fn with_command(java_command: impl Into<OsString>) -> JavaRuntime {
		let java_command = java_command.into();
		let translator = PathTranslator::detect(&java_command);
		JavaRuntime { java_command, translator }
	}

	pub fn translator(&self) -> &PathTranslator {
		&self.translator
	}

	/// Runs `java -version` and fails with [`Error::JavaVersion`] if the
	/// runtime is older than `min_major_version`.
	pub fn check_java_version(&self, min_major_version: u16) -> Result<()> {
		let output = std::process::Command::new(&self.java_command)
			.arg("-version")
			.output()
			.map_err(Error::SubprocessSpawn)?;

		// `java -version` reports on stderr, first line like
		//     openjdk version "17.0.11" 2024-04-16
		let stderr = String::from_utf8_lossy(&output.stderr);
		let version = parse_major_version(&stderr)
			.ok_or_else(|| Error::JavaVersion { found: 0, required: min_major_version })?;

		trace!("that's java {version}");

		if version < min_major_version {
			return Err(Error::JavaVersion { found: version, required: min_major_version });
		}
		Ok(())
	}

	/// Runs the given jar, capturing stdout and stderr.
	///
	/// Every path-looking argument is passed through the path translator so a
	/// subprocess with a different path syntax still finds its files. The
	/// subprocess is killed once `opts.timeout` elapses.
	pub async fn execute(
		&self,
		jar: &Path,
		args: &[String],
		opts: &ExecOptions<'_>,
		mut on_stdout: Option<LineSink<'_>>,
	) -> Result<ExecOutput> {
		let jar = self.translator.translate_argument(&jar.to_string_lossy())?;

		let mut command = tokio::process::Command::new(&self.java_command);
		command.arg(format!("-Xmx{}m", opts.max_heap_mib));
		command.arg(format!("-Xms{}m", opts.initial_heap_mib));
		command.args(&opts.extra_jvm_args);

		match opts.main_class {
			Some(main_class) => {
				command.args(["-cp", &jar, main_class]);
			},
			None => {
				command.args(["-jar", &jar]);
			},
		}

		for arg in args {
			command.arg(self.translator.translate_argument(arg)?);
		}

		if let Some(working_dir) = opts.working_dir {
			command.current_dir(working_dir);
		}

		command.stdin(Stdio::null());
		command.stdout(Stdio::piped());
		command.stderr(Stdio::piped());
		command.kill_on_drop(true);

		debug!("run: {:?} {}", self.java_command, {
			let command = command.as_std();
			command.get_args().map(|x| x.to_string_lossy()).collect::<Vec<_>>().join(" ")
		});

		let mut child = command.spawn().map_err(Error::SubprocessSpawn)?;

		let stdout = child.stdout.take();
		let stderr = child.stderr.take();

		let run = async {
			let mut no_sink = None;
			let (stdout, stderr) = tokio::join!(
				collect_lines(stdout, &mut on_stdout),
				collect_lines(stderr, &mut no_sink),
			);
			let status = child.wait().await?;
			Ok::<_, Error>((status, stdout?, stderr?))
		};

		// bound to its own statement so the future (and its borrow of the
		// child) is gone before the timeout arm touches the child again
		let outcome = tokio::time::timeout(opts.timeout, run).await;

		let (status, stdout, stderr) = match outcome {
			Ok(result) => result?,
			Err(_elapsed) => {
				error!("java did not finish within {:?}, killing it", opts.timeout);
				let _ = child.kill().await;
				return Err(Error::SubprocessTimeout { seconds: opts.timeout.as_secs() });
			},
		};

		let exit_code = status.code().unwrap_or(-1);
		if !status.success() {
			return Err(Error::SubprocessNonzero {
				code: exit_code,
				stderr_tail: tail(&stderr, 2048),
			});
		}

		trace!("java exited with {status:?}");

		Ok(ExecOutput { exit_code, stdout, stderr })
	}
}

async fn collect_lines(
	stream: Option<impl AsyncRead + Unpin>,
	sink: &mut Option<LineSink<'_>>,
) -> Result<String> {
	let mut buffer = String::new();

	if let Some(stream) = stream {
		let mut lines = BufReader::new(stream).lines();
		while let Some(line) = lines.next_line().await? {
			if let Some(sink) = sink {
				sink(&line);
			}
			buffer.push_str(&line);
			buffer.push('\n');
		}
	}

	Ok(buffer)
}

fn tail(s: &str, max: usize) -> String {
	if s.len() <= max {
		s.to_owned()
	} else {
		let start = s.len() - max;
		// don't cut into a utf8 sequence
		let start = (start..s.len()).find(|i| s.is_char_boundary(*i)).unwrap_or(s.len());
		s[start..].to_owned()
	}
}

/// Parses the output of `java -version` into the major java version.
///
/// The first stderr line carries the quoted version as its third field. The
/// old format (`1.8.0_412`) puts the major version second, the new format
/// (`17.0.11`, `22`) puts it first.
fn parse_major_version(stderr: &str) -> Option<u16> {
	let line = stderr.lines().next()?;
	let quoted = line.split_whitespace().nth(2)?;
	let version = quoted.trim_matches('"');

	let major = match version.strip_prefix("1.") {
		Some(rest) => rest.split(['.', '_']).next()?,
		None => version.split('.').next()?,
	};

	major.parse().ok()
}
