use thiserror::Error;

/// Everything that can go wrong when parsing or transforming mappings.
#[derive(Debug, Error)]
pub enum Error {
	#[error("malformed tiny v2 file, line {line}: {message}")]
	TinyV2 { line: usize, message: String },

	#[error("malformed tiny v1 file, line {line}: {message}")]
	TinyV1 { line: usize, message: String },

	#[error("malformed proguard file, line {line}: {message}")]
	Proguard { line: usize, message: String },

	#[error("namespace {0:?} is not declared by this mapping tree")]
	UnknownNamespace(String),

	#[error("duplicate {kind} entry {name:?}")]
	Duplicate { kind: &'static str, name: String },

	#[error("first namespace name must be present and non-empty")]
	MissingSourceName,

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	pub(crate) fn tiny_v2(line: usize, message: impl Into<String>) -> Error {
		Error::TinyV2 { line, message: message.into() }
	}

	pub(crate) fn tiny_v1(line: usize, message: impl Into<String>) -> Error {
		Error::TinyV1 { line, message: message.into() }
	}

	pub(crate) fn proguard(line: usize, message: impl Into<String>) -> Error {
		Error::Proguard { line, message: message.into() }
	}
}

pub type Result<T> = std::result::Result<T, Error>;
