use std::path::PathBuf;
use thiserror::Error;
use crate::Mapping;

/// Everything that can go wrong across the pipeline.
///
/// The variants follow a fixed taxonomy; [`Error::kind`] gives the stable
/// dotted kind string the tool front end keys on.
#[derive(Debug, Error)]
pub enum Error {
	#[error("network failure for {url:?}")]
	Network {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("integrity failure for {what:?}: expected sha1 {expected}, got {actual}")]
	Integrity {
		what: String,
		expected: String,
		actual: String,
	},

	#[error("version {0:?} does not exist upstream or in cache")]
	VersionNotFound(String),

	#[error("class {class:?} does not exist for version {version:?}")]
	ClassNotFound { class: String, version: String },

	#[error("registry type {0:?} does not exist")]
	RegistryNotFound(String),

	#[error("no {mapping} mappings exist for version {version:?}")]
	MappingNotFound { version: String, mapping: Mapping },

	#[error(transparent)]
	MappingParse(#[from] vellum::Error),

	#[error("failed to spawn java")]
	SubprocessSpawn(#[source] std::io::Error),

	#[error("java was killed after running for {seconds} s")]
	SubprocessTimeout { seconds: u64 },

	#[error("java exited with status {code}: {stderr_tail}")]
	SubprocessNonzero { code: i32, stderr_tail: String },

	#[error("decompilation of {input:?} failed")]
	Decompile {
		input: PathBuf,
		#[source]
		source: Box<Error>,
	},

	#[error("remapping {input:?} ({direction}) failed")]
	Remap {
		direction: String,
		input: PathBuf,
		#[source]
		source: Box<Error>,
	},

	#[error("registry extraction from {input:?} produced no registries.json")]
	RegistryExtraction {
		input: PathBuf,
		#[source]
		source: Option<Box<Error>>,
	},

	#[error("version {version:?} with {mapping} mappings is not indexed")]
	NotIndexed { version: String, mapping: Mapping },

	#[error("failed to clear the search index")]
	IndexClear(#[source] rusqlite::Error),

	#[error("database failure")]
	Db(#[from] rusqlite::Error),

	#[error("filesystem failure")]
	Io(#[from] std::io::Error),

	#[error("java major version {found} is too old, need at least {required}")]
	JavaVersion { found: u16, required: u16 },

	#[error("path argument contains a NUL byte: {0:?}")]
	PathValidation(String),

	#[error("corrupt archive")]
	Zip(#[from] zip::result::ZipError),

	#[error("malformed json")]
	Json(#[from] serde_json::Error),

	#[error("malformed maven metadata")]
	Xml(#[from] serde_xml_rs::Error),
}

impl Error {
	/// The stable dotted kind string of this error, e.g. `notFound.class`.
	pub fn kind(&self) -> &'static str {
		match self {
			Error::Network { .. } => "network",
			Error::Integrity { .. } => "integrity",
			Error::VersionNotFound(_) => "notFound.version",
			Error::ClassNotFound { .. } => "notFound.class",
			Error::RegistryNotFound(_) => "notFound.registry",
			Error::MappingNotFound { .. } => "notFound.mapping",
			Error::MappingParse(vellum::Error::TinyV2 { .. }) => "parse.tinyV2",
			Error::MappingParse(vellum::Error::TinyV1 { .. }) => "parse.tinyV1",
			Error::MappingParse(vellum::Error::Proguard { .. }) => "parse.proguard",
			Error::MappingParse(_) => "parse.mappings",
			Error::SubprocessSpawn(_) => "subprocess.spawn",
			Error::SubprocessTimeout { .. } => "subprocess.timeout",
			Error::SubprocessNonzero { .. } => "subprocess.nonzero",
			Error::Decompile { .. } => "decompile.failed",
			Error::Remap { .. } => "remap.failed",
			Error::RegistryExtraction { .. } => "registry.extraction",
			Error::NotIndexed { .. } => "index.notIndexed",
			Error::IndexClear(_) => "index.clear",
			Error::Db(_) => "db",
			Error::Io(_) => "fs.io",
			Error::JavaVersion { .. } => "java.version",
			Error::PathValidation(_) => "validation.path",
			Error::Zip(_) => "integrity",
			Error::Json(_) => "parse.json",
			Error::Xml(_) => "parse.xml",
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod testing {
	use super::*;

	#[test]
	fn kinds_are_dotted() {
		let e = Error::ClassNotFound { class: "a.B".to_owned(), version: "1.21.10".to_owned() };
		assert_eq!(e.kind(), "notFound.class");

		let e = Error::MappingParse(vellum::Error::TinyV2 { line: 3, message: "x".to_owned() });
		assert_eq!(e.kind(), "parse.tinyV2");
	}
}
