//! The embedded metadata store (`cache.db`).
//!
//! This is the only authority for "job exists" and "last access". Artifact
//! files themselves are pure functions of their key and may be regenerated at
//! any time; the rows here are bookkeeping around them.

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use crate::{Mapping, Result};
use crate::layout::ensure_parent;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS versions (
	version TEXT PRIMARY KEY,
	jar_path TEXT NOT NULL,
	jar_sha1 TEXT NOT NULL,
	last_accessed_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS mappings (
	version TEXT NOT NULL,
	mapping TEXT NOT NULL,
	file_path TEXT NOT NULL,
	downloaded_at TEXT NOT NULL,
	UNIQUE (version, mapping)
);
CREATE TABLE IF NOT EXISTS jobs (
	id INTEGER PRIMARY KEY,
	version TEXT NOT NULL,
	mapping TEXT NOT NULL,
	status TEXT NOT NULL,
	progress REAL NOT NULL DEFAULT 0,
	error TEXT,
	started_at TEXT,
	completed_at TEXT,
	UNIQUE (version, mapping)
);
CREATE INDEX IF NOT EXISTS jobs_status ON jobs (status);
";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord {
	pub version: String,
	pub jar_path: String,
	pub jar_sha1: String,
	pub last_accessed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingRecord {
	pub version: String,
	pub mapping: String,
	pub file_path: String,
	pub downloaded_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
	Pending,
	Running,
	Completed,
	Failed,
}

impl JobStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			JobStatus::Pending => "pending",
			JobStatus::Running => "running",
			JobStatus::Completed => "completed",
			JobStatus::Failed => "failed",
		}
	}
}

impl Display for JobStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for JobStatus {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<JobStatus, String> {
		match s {
			"pending" => Ok(JobStatus::Pending),
			"running" => Ok(JobStatus::Running),
			"completed" => Ok(JobStatus::Completed),
			"failed" => Ok(JobStatus::Failed),
			other => Err(format!("unknown job status {other:?}")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
	pub id: i64,
	pub version: String,
	pub mapping: String,
	pub status: JobStatus,
	pub progress: f64,
	pub error: Option<String>,
	pub started_at: Option<String>,
	pub completed_at: Option<String>,
}

pub struct Store {
	conn: Mutex<Connection>,
}

impl Store {
	/// Opens (creating if needed) the store at the given path, in WAL mode.
	pub fn open(path: &Path) -> Result<Store> {
		ensure_parent(path)?;
		let conn = Connection::open(path)?;
		conn.pragma_update(None, "journal_mode", "WAL")?;
		conn.pragma_update(None, "foreign_keys", "ON")?;
		conn.execute_batch(SCHEMA)?;
		Ok(Store { conn: Mutex::new(conn) })
	}

	/// An in-memory store, for tests.
	pub fn open_in_memory() -> Result<Store> {
		let conn = Connection::open_in_memory()?;
		conn.execute_batch(SCHEMA)?;
		Ok(Store { conn: Mutex::new(conn) })
	}

	fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
		self.conn.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn get_version(&self, version: &str) -> Result<Option<VersionRecord>> {
		Ok(self.conn()
			.query_row(
				"SELECT version, jar_path, jar_sha1, last_accessed_at FROM versions WHERE version = ?1",
				params![version],
				|row| Ok(VersionRecord {
					version: row.get(0)?,
					jar_path: row.get(1)?,
					jar_sha1: row.get(2)?,
					last_accessed_at: row.get(3)?,
				}),
			)
			.optional()?)
	}

	pub fn upsert_version(&self, version: &str, jar_path: &str, jar_sha1: &str) -> Result<()> {
		self.conn().execute(
			"INSERT INTO versions (version, jar_path, jar_sha1, last_accessed_at) \
			 VALUES (?1, ?2, ?3, datetime('now')) \
			 ON CONFLICT (version) DO UPDATE SET \
			 jar_path = excluded.jar_path, jar_sha1 = excluded.jar_sha1, last_accessed_at = datetime('now')",
			params![version, jar_path, jar_sha1],
		)?;
		Ok(())
	}

	pub fn touch_version(&self, version: &str) -> Result<()> {
		self.conn().execute(
			"UPDATE versions SET last_accessed_at = datetime('now') WHERE version = ?1",
			params![version],
		)?;
		Ok(())
	}

	pub fn list_versions(&self) -> Result<Vec<String>> {
		let conn = self.conn();
		let mut statement = conn.prepare("SELECT version FROM versions ORDER BY last_accessed_at DESC")?;
		let versions = statement
			.query_map([], |row| row.get(0))?
			.collect::<std::result::Result<_, _>>()?;
		Ok(versions)
	}

	pub fn get_mapping(&self, version: &str, mapping: Mapping) -> Result<Option<MappingRecord>> {
		Ok(self.conn()
			.query_row(
				"SELECT version, mapping, file_path, downloaded_at FROM mappings WHERE version = ?1 AND mapping = ?2",
				params![version, mapping.as_str()],
				|row| Ok(MappingRecord {
					version: row.get(0)?,
					mapping: row.get(1)?,
					file_path: row.get(2)?,
					downloaded_at: row.get(3)?,
				}),
			)
			.optional()?)
	}

	pub fn upsert_mapping(&self, version: &str, mapping: Mapping, file_path: &str) -> Result<()> {
		self.conn().execute(
			"INSERT INTO mappings (version, mapping, file_path, downloaded_at) \
			 VALUES (?1, ?2, ?3, datetime('now')) \
			 ON CONFLICT (version, mapping) DO UPDATE SET \
			 file_path = excluded.file_path, downloaded_at = datetime('now')",
			params![version, mapping.as_str(), file_path],
		)?;
		Ok(())
	}

	pub fn get_job(&self, version: &str, mapping: Mapping) -> Result<Option<JobRecord>> {
		Ok(self.conn()
			.query_row(
				"SELECT id, version, mapping, status, progress, error, started_at, completed_at \
				 FROM jobs WHERE version = ?1 AND mapping = ?2",
				params![version, mapping.as_str()],
				|row| Ok(JobRecord {
					id: row.get(0)?,
					version: row.get(1)?,
					mapping: row.get(2)?,
					status: row.get::<_, String>(3)?.parse().unwrap_or(JobStatus::Failed),
					progress: row.get(4)?,
					error: row.get(5)?,
					started_at: row.get(6)?,
					completed_at: row.get(7)?,
				}),
			)
			.optional()?)
	}

	/// Creates (or resets) the one job row for `(version, mapping)`.
	pub fn create_job(&self, version: &str, mapping: Mapping) -> Result<i64> {
		let conn = self.conn();
		conn.execute(
			"INSERT INTO jobs (version, mapping, status, progress, error, started_at, completed_at) \
			 VALUES (?1, ?2, 'pending', 0, NULL, datetime('now'), NULL) \
			 ON CONFLICT (version, mapping) DO UPDATE SET \
			 status = 'pending', progress = 0, error = NULL, started_at = datetime('now'), completed_at = NULL",
			params![version, mapping.as_str()],
		)?;
		let id = conn.query_row(
			"SELECT id FROM jobs WHERE version = ?1 AND mapping = ?2",
			params![version, mapping.as_str()],
			|row| row.get(0),
		)?;
		Ok(id)
	}

	pub fn update_job(
		&self,
		version: &str,
		mapping: Mapping,
		status: JobStatus,
		progress: Option<f64>,
		error: Option<&str>,
	) -> Result<()> {
		let completed = matches!(status, JobStatus::Completed | JobStatus::Failed);
		self.conn().execute(
			"UPDATE jobs SET \
			 status = ?3, \
			 progress = COALESCE(?4, progress), \
			 error = ?5, \
			 completed_at = CASE WHEN ?6 THEN datetime('now') ELSE completed_at END \
			 WHERE version = ?1 AND mapping = ?2",
			params![version, mapping.as_str(), status.as_str(), progress, error, completed],
		)?;
		Ok(())
	}
}
