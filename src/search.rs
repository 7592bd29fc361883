//! The full-text search index over decompiled source.
//!
//! One SQLite database (`search_index.db`) holds an FTS5 table of entries
//! plus a per-`(version, mapping)` stats row. Entries come out of a
//! line-oriented scan of each `.java` file: one `class` entry per file and
//! one `method`/`field` entry per matching declaration line. Queries run as
//! ranked FTS prefix matches and degrade to a plain substring scan when the
//! query doesn't survive FTS syntax.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use walkdir::WalkDir;
use crate::{Error, Mapping, Result};
use crate::layout::ensure_parent;

/// Context lines are clipped to this many characters.
const CONTEXT_LIMIT: usize = 300;

/// Files per insert transaction.
const BATCH_SIZE: usize = 100;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS indexed_versions (
	version TEXT NOT NULL,
	mapping TEXT NOT NULL,
	indexed_at TEXT NOT NULL,
	file_count INTEGER NOT NULL,
	PRIMARY KEY (version, mapping)
);
CREATE VIRTUAL TABLE IF NOT EXISTS entries USING fts5(
	symbol,
	context,
	version UNINDEXED,
	mapping UNINDEXED,
	entry_type UNINDEXED,
	class_name UNINDEXED,
	file_path UNINDEXED,
	line UNINDEXED
);
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
	Class,
	Method,
	Field,
	Content,
}

impl EntryType {
	pub fn as_str(&self) -> &'static str {
		match self {
			EntryType::Class => "class",
			EntryType::Method => "method",
			EntryType::Field => "field",
			EntryType::Content => "content",
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
	pub entry_type: String,
	pub symbol: String,
	pub class_name: String,
	pub file_path: String,
	pub line: i64,
	pub context: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub snippet: Option<String>,
	/// Positive relevance magnitude; larger is better.
	pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
	pub is_indexed: bool,
	pub file_count: i64,
	pub class_count: i64,
	pub method_count: i64,
	pub field_count: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub indexed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexOutcome {
	pub file_count: i64,
	pub duration_ms: u128,
}

/// Progress callback: files done so far.
pub type IndexProgress<'a> = &'a mut (dyn FnMut(u64) + Send);

pub struct SearchIndex {
	conn: Mutex<Connection>,
}

impl SearchIndex {
	pub fn open(path: &Path) -> Result<SearchIndex> {
		ensure_parent(path)?;
		let conn = Connection::open(path)?;
		conn.pragma_update(None, "journal_mode", "WAL")?;
		conn.execute_batch(SCHEMA)?;
		Ok(SearchIndex { conn: Mutex::new(conn) })
	}

	pub fn open_in_memory() -> Result<SearchIndex> {
		let conn = Connection::open_in_memory()?;
		conn.execute_batch(SCHEMA)?;
		Ok(SearchIndex { conn: Mutex::new(conn) })
	}

	fn conn(&self) -> MutexGuard<'_, Connection> {
		self.conn.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn is_indexed(&self, version: &str, mapping: Mapping) -> Result<bool> {
		Ok(self.conn()
			.query_row(
				"SELECT 1 FROM indexed_versions WHERE version = ?1 AND mapping = ?2",
				params![version, mapping.as_str()],
				|_| Ok(()),
			)
			.optional()?
			.is_some())
	}

	/// Drops every row belonging to `(version, mapping)`.
	pub fn clear(&self, version: &str, mapping: Mapping) -> Result<()> {
		let conn = self.conn();
		conn.execute(
			"DELETE FROM entries WHERE version = ?1 AND mapping = ?2",
			params![version, mapping.as_str()],
		).map_err(Error::IndexClear)?;
		conn.execute(
			"DELETE FROM indexed_versions WHERE version = ?1 AND mapping = ?2",
			params![version, mapping.as_str()],
		).map_err(Error::IndexClear)?;
		Ok(())
	}

	/// Walks a decompiled tree and (re)builds the index shard for
	/// `(version, mapping)`. Inserts run in batches of whole files inside
	/// one transaction each.
	pub fn index_tree(
		&self,
		version: &str,
		mapping: Mapping,
		root: &Path,
		mut progress: Option<IndexProgress<'_>>,
	) -> Result<IndexOutcome> {
		if !root.is_dir() {
			return Err(Error::NotIndexed { version: version.to_owned(), mapping });
		}

		let started = Instant::now();

		self.clear(version, mapping)?;

		let files: Vec<_> = WalkDir::new(root)
			.into_iter()
			.filter_map(|entry| entry.ok())
			.filter(|entry| entry.file_type().is_file())
			.filter(|entry| entry.path().extension().is_some_and(|x| x == "java"))
			.map(|entry| entry.into_path())
			.collect();

		info!("indexing {} files for {version} ({mapping})", files.len());

		let mut done: u64 = 0;
		for batch in files.chunks(BATCH_SIZE) {
			let mut conn = self.conn();
			let tx = conn.transaction()?;
			{
				let mut insert = tx.prepare_cached(
					"INSERT INTO entries (symbol, context, version, mapping, entry_type, class_name, file_path, line) \
					 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
				)?;

				for path in batch {
					let Ok(content) = std::fs::read_to_string(path) else {
						debug!("skipping unreadable file {path:?}");
						continue;
					};
					let class_name = class_name_of(root, path);

					for entry in scan_file(&class_name, &content) {
						insert.execute(params![
							entry.symbol,
							entry.context,
							version,
							mapping.as_str(),
							entry.entry_type.as_str(),
							class_name,
							path.to_string_lossy(),
							entry.line,
						])?;
					}

					done += 1;
					if let Some(progress) = progress.as_mut() {
						progress(done);
					}
				}
			}
			tx.commit()?;
		}

		let file_count = files.len() as i64;
		self.conn().execute(
			"INSERT INTO indexed_versions (version, mapping, indexed_at, file_count) \
			 VALUES (?1, ?2, datetime('now'), ?3) \
			 ON CONFLICT (version, mapping) DO UPDATE SET \
			 indexed_at = datetime('now'), file_count = excluded.file_count",
			params![version, mapping.as_str(), file_count],
		)?;

		Ok(IndexOutcome { file_count, duration_ms: started.elapsed().as_millis() })
	}

	pub fn stats(&self, version: &str, mapping: Mapping) -> Result<IndexStats> {
		let conn = self.conn();

		let row: Option<(String, i64)> = conn
			.query_row(
				"SELECT indexed_at, file_count FROM indexed_versions WHERE version = ?1 AND mapping = ?2",
				params![version, mapping.as_str()],
				|row| Ok((row.get(0)?, row.get(1)?)),
			)
			.optional()?;

		let count = |ty: &str| -> Result<i64> {
			Ok(conn.query_row(
				"SELECT COUNT(*) FROM entries WHERE version = ?1 AND mapping = ?2 AND entry_type = ?3",
				params![version, mapping.as_str(), ty],
				|row| row.get(0),
			)?)
		};

		Ok(IndexStats {
			is_indexed: row.is_some(),
			file_count: row.as_ref().map(|x| x.1).unwrap_or(0),
			class_count: count("class")?,
			method_count: count("method")?,
			field_count: count("field")?,
			indexed_at: row.map(|x| x.0),
		})
	}

	pub fn list_indexed(&self) -> Result<Vec<(String, String)>> {
		let conn = self.conn();
		let mut statement = conn.prepare(
			"SELECT version, mapping FROM indexed_versions ORDER BY indexed_at DESC",
		)?;
		let rows = statement
			.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
			.collect::<std::result::Result<_, _>>()?;
		Ok(rows)
	}

	/// Ranked search. `types` restricts entry types (empty means all);
	/// `match_context` widens the match from the symbol column to the
	/// context column too. Falls back to a substring scan when FTS refuses
	/// the query.
	pub fn search(
		&self,
		version: &str,
		mapping: Mapping,
		query: &str,
		types: &[EntryType],
		match_context: bool,
		limit: u32,
	) -> Result<Vec<SearchHit>> {
		if !self.is_indexed(version, mapping)? {
			return Err(Error::NotIndexed { version: version.to_owned(), mapping });
		}

		let sanitized = sanitize_query(query);
		if sanitized.is_empty() {
			return Ok(Vec::new());
		}

		match self.search_fts(version, mapping, &sanitized, types, match_context, limit) {
			Ok(hits) => Ok(hits),
			Err(Error::Db(e)) => {
				debug!("fts query failed ({e}), falling back to substring scan");
				self.search_like(version, mapping, &sanitized, types, match_context, limit)
			},
			Err(e) => Err(e),
		}
	}

	fn search_fts(
		&self,
		version: &str,
		mapping: Mapping,
		sanitized: &str,
		types: &[EntryType],
		match_context: bool,
		limit: u32,
	) -> Result<Vec<SearchHit>> {
		// prefix match over the symbol column, optionally over context too
		let match_expr = if match_context {
			format!("\"{sanitized}\"*")
		} else {
			format!("symbol:\"{sanitized}\"*")
		};

		let sql = format!(
			"SELECT entry_type, symbol, class_name, file_path, line, context, \
			 snippet(entries, 1, '<mark>', '</mark>', '…', 32), rank \
			 FROM entries \
			 WHERE entries MATCH ?1 AND version = ?2 AND mapping = ?3{} \
			 ORDER BY rank LIMIT ?4",
			type_filter(types),
		);

		let conn = self.conn();
		let mut statement = conn.prepare(&sql)?;
		let hits = statement
			.query_map(params![match_expr, version, mapping.as_str(), limit], |row| {
				Ok(SearchHit {
					entry_type: row.get(0)?,
					symbol: row.get(1)?,
					class_name: row.get(2)?,
					file_path: row.get(3)?,
					line: row.get(4)?,
					context: row.get(5)?,
					snippet: row.get(6)?,
					// fts5 rank is a negative bm25; flip it into a magnitude
					score: -row.get::<_, f64>(7)?,
				})
			})?
			.collect::<std::result::Result<_, _>>()?;
		Ok(hits)
	}

	fn search_like(
		&self,
		version: &str,
		mapping: Mapping,
		sanitized: &str,
		types: &[EntryType],
		match_context: bool,
		limit: u32,
	) -> Result<Vec<SearchHit>> {
		let needle = format!("%{sanitized}%");
		let context_clause = if match_context { " OR context LIKE ?4" } else { "" };

		let sql = format!(
			"SELECT entry_type, symbol, class_name, file_path, line, context \
			 FROM entries \
			 WHERE version = ?2 AND mapping = ?3 AND (symbol LIKE ?4{context_clause}){} \
			 LIMIT ?1",
			type_filter(types),
		);

		let conn = self.conn();
		let mut statement = conn.prepare(&sql)?;
		let hits = statement
			.query_map(params![limit, version, mapping.as_str(), needle], |row| {
				Ok(SearchHit {
					entry_type: row.get(0)?,
					symbol: row.get(1)?,
					class_name: row.get(2)?,
					file_path: row.get(3)?,
					line: row.get(4)?,
					context: row.get(5)?,
					snippet: None,
					score: 0.0,
				})
			})?
			.collect::<std::result::Result<_, _>>()?;
		Ok(hits)
	}
}

fn type_filter(types: &[EntryType]) -> String {
	if types.is_empty() {
		String::new()
	} else {
		let list = types.iter()
			.map(|x| format!("'{}'", x.as_str()))
			.collect::<Vec<_>>()
			.join(", ");
		format!(" AND entry_type IN ({list})")
	}
}

/// Keeps word characters and spaces, drops everything else (quotes would
/// upset the FTS expression, the rest buys nothing for symbol search).
fn sanitize_query(query: &str) -> String {
	query.chars()
		.filter(|x| x.is_alphanumeric() || *x == '_' || *x == ' ')
		.collect::<String>()
		.trim()
		.to_owned()
}

/// Derives the dotted class name from a file's path below the tree root.
fn class_name_of(root: &Path, path: &Path) -> String {
	let relative = path.strip_prefix(root).unwrap_or(path);
	let mut name = relative
		.components()
		.map(|x| x.as_os_str().to_string_lossy())
		.collect::<Vec<_>>()
		.join(".");
	if let Some(stripped) = name.strip_suffix(".java") {
		name = stripped.to_owned();
	}
	name
}

struct ScannedEntry {
	entry_type: EntryType,
	symbol: String,
	context: String,
	line: i64,
}

fn clip(line: &str) -> String {
	let trimmed = line.trim();
	if trimmed.len() <= CONTEXT_LIMIT {
		trimmed.to_owned()
	} else {
		let end = (0..=CONTEXT_LIMIT).rev().find(|i| trimmed.is_char_boundary(*i)).unwrap_or(0);
		trimmed[..end].to_owned()
	}
}

/// Extracts the index entries of one source file: the class itself, then
/// per-line method and field declarations.
fn scan_file(class_name: &str, content: &str) -> Vec<ScannedEntry> {
	let mut entries = Vec::new();

	let simple_name = class_name.rsplit('.').next().unwrap_or(class_name);

	let declaration = content.lines()
		.find(|line| is_type_declaration(line))
		.unwrap_or_default();

	entries.push(ScannedEntry {
		entry_type: EntryType::Class,
		symbol: simple_name.to_owned(),
		context: clip(declaration),
		line: 1,
	});

	for (i, line) in content.lines().enumerate() {
		if is_type_declaration(line) {
			continue;
		}

		if let Some(name) = method_declaration_name(line) {
			entries.push(ScannedEntry {
				entry_type: EntryType::Method,
				symbol: name.to_owned(),
				context: clip(line),
				line: (i + 1) as i64,
			});
		} else if let Some(name) = field_declaration_name(line) {
			entries.push(ScannedEntry {
				entry_type: EntryType::Field,
				symbol: name.to_owned(),
				context: clip(line),
				line: (i + 1) as i64,
			});
		}
	}

	entries
}

const ACCESS_MODIFIERS: [&str; 3] = ["public", "private", "protected"];
const OTHER_MODIFIERS: [&str; 9] = [
	"static", "final", "abstract", "synchronized", "native", "default",
	"strictfp", "transient", "volatile",
];

fn starts_with_access_modifier(trimmed: &str) -> bool {
	ACCESS_MODIFIERS.iter().any(|m| {
		trimmed.strip_prefix(m).is_some_and(|rest| rest.starts_with(char::is_whitespace))
	})
}

fn is_type_declaration(line: &str) -> bool {
	let trimmed = line.trim();
	starts_with_access_modifier(trimmed)
		&& trimmed.split_whitespace().any(|word| matches!(word, "class" | "interface" | "enum" | "record"))
}

fn is_java_identifier(s: &str) -> bool {
	let mut chars = s.chars();
	chars.next().is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
		&& chars.all(|x| x.is_alphanumeric() || x == '_' || x == '$')
}

/// Drops one balanced `<…>` region, so generic parameters don't split into
/// bogus tokens.
fn strip_generics(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut depth = 0usize;
	for c in s.chars() {
		match c {
			'<' => depth += 1,
			'>' => depth = depth.saturating_sub(1),
			_ if depth == 0 => out.push(c),
			_ => {},
		}
	}
	out
}

/// Matches `access [modifiers]… <TypeParams>? Type name(` and gives the name.
pub(crate) fn method_declaration_name(line: &str) -> Option<&str> {
	let trimmed = line.trim();
	if !starts_with_access_modifier(trimmed) {
		return None;
	}

	let head = &trimmed[..trimmed.find('(')?];
	let head = strip_generics(head);

	let mut tokens = head.split_whitespace().peekable();
	tokens.next(); // the access modifier
	while tokens.peek().is_some_and(|x| OTHER_MODIFIERS.contains(x)) {
		tokens.next();
	}

	let rest: Vec<&str> = tokens.collect();
	// a return type and a name; a constructor has only the name
	let name = *rest.last()?;
	if rest.len() > 2 || !is_java_identifier(name) {
		return None;
	}

	// re-borrow out of the original line
	let start = trimmed[..trimmed.find('(')?].rfind(name)?;
	let found = &trimmed[start..start + name.len()];
	Some(found)
}

/// Matches `access [modifiers]… Type name (; or =)` on lines without `(`.
pub(crate) fn field_declaration_name(line: &str) -> Option<&str> {
	let trimmed = line.trim();
	if trimmed.contains('(') || !starts_with_access_modifier(trimmed) {
		return None;
	}

	let head = trimmed.split(['=', ';']).next()?;
	let head = strip_generics(head);

	let mut tokens = head.split_whitespace().peekable();
	tokens.next(); // the access modifier
	while tokens.peek().is_some_and(|x| OTHER_MODIFIERS.contains(x)) {
		tokens.next();
	}

	let rest: Vec<&str> = tokens.collect();
	// needs both a type and a name
	if rest.len() != 2 {
		return None;
	}
	let name = rest[1].trim_end_matches(';');
	if !is_java_identifier(name) {
		return None;
	}

	let split_at = trimmed.find(['=', ';']).unwrap_or(trimmed.len());
	let start = trimmed[..split_at].rfind(name)?;
	Some(&trimmed[start..start + name.len()])
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn method_lines() {
		assert_eq!(method_declaration_name("    public void tick() {"), Some("tick"));
		assert_eq!(method_declaration_name("  protected static final Entity getVehicle(int i) {"), Some("getVehicle"));
		assert_eq!(method_declaration_name("   public <T extends Entity> T cast(T value) {"), Some("cast"));
		// constructors count as methods
		assert_eq!(method_declaration_name("   public Entity(World world) {"), Some("Entity"));
		// calls and control flow don't
		assert_eq!(method_declaration_name("        this.tick();"), None);
		assert_eq!(method_declaration_name("        if (this.isAlive()) {"), None);
		assert_eq!(method_declaration_name("// public void tick() {"), None);
	}

	#[test]
	fn field_lines() {
		assert_eq!(field_declaration_name("    private int age;"), Some("age"));
		assert_eq!(field_declaration_name("    public static final double GRAVITY = 0.08;"), Some("GRAVITY"));
		assert_eq!(field_declaration_name("    protected List<Entity> passengers = new ArrayList();"), None);
		assert_eq!(field_declaration_name("    protected List<Entity> passengers;"), Some("passengers"));
		// method calls never match the field shape
		assert_eq!(field_declaration_name("    public void tick();"), None);
		assert_eq!(field_declaration_name("        int i = 0;"), None);
	}

	#[test]
	fn type_declaration_lines() {
		assert!(is_type_declaration("public class Entity implements Nameable {"));
		assert!(is_type_declaration("public abstract class Entity {"));
		assert!(is_type_declaration("public interface Nameable {"));
		assert!(is_type_declaration("public enum Axis {"));
		assert!(!is_type_declaration("    private int age;"));
		assert!(!is_type_declaration("import java.util.List;"));
	}

	#[test]
	fn class_names_from_paths() {
		let root = Path::new("/cache/decompiled/1.21.10/yarn");
		let path = root.join("net/minecraft/entity/Entity.java");
		assert_eq!(class_name_of(root, &path), "net.minecraft.entity.Entity");
	}

	#[test]
	fn sanitizing() {
		assert_eq!(sanitize_query("Entity"), "Entity");
		assert_eq!(sanitize_query("\"Entity\"; DROP TABLE --"), "Entity DROP TABLE");
		assert_eq!(sanitize_query("get_vehicle()"), "get_vehicle");
	}

	#[test]
	fn scan_counts() {
		let source = "\
package net.minecraft.entity;

public class Entity implements Nameable {
    private int age;
    public static final double GRAVITY = 0.08;

    public void tick() {
        this.age++;
    }

    public Entity getVehicle() {
        return this.vehicle;
    }
}
";
		let entries = scan_file("net.minecraft.entity.Entity", source);

		let classes: Vec<_> = entries.iter().filter(|x| x.entry_type == EntryType::Class).collect();
		let methods: Vec<_> = entries.iter().filter(|x| x.entry_type == EntryType::Method).collect();
		let fields: Vec<_> = entries.iter().filter(|x| x.entry_type == EntryType::Field).collect();

		assert_eq!(classes.len(), 1);
		assert_eq!(classes[0].symbol, "Entity");
		assert_eq!(classes[0].line, 1);
		assert!(classes[0].context.contains("class Entity"));

		assert_eq!(methods.iter().map(|x| x.symbol.as_str()).collect::<Vec<_>>(), vec!["tick", "getVehicle"]);
		assert_eq!(fields.iter().map(|x| x.symbol.as_str()).collect::<Vec<_>>(), vec!["age", "GRAVITY"]);

		// line numbers are 1-based positions in the file
		assert_eq!(methods[0].line, 7);
	}

	#[test]
	fn index_and_search() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let root = dir.path().join("decompiled");
		let package = root.join("net/minecraft/entity");
		std::fs::create_dir_all(&package)?;
		std::fs::write(package.join("Entity.java"), "\
public class Entity {
    private int age;

    public void tick() {
    }
}
")?;
		std::fs::write(package.join("EntityPose.java"), "\
public enum EntityPose {
}
")?;

		let index = SearchIndex::open_in_memory()?;

		let outcome = index.index_tree("1.21.10", Mapping::Yarn, &root, None)?;
		assert_eq!(outcome.file_count, 2);

		assert!(index.is_indexed("1.21.10", Mapping::Yarn)?);
		assert!(!index.is_indexed("1.21.10", Mapping::Mojmap)?);

		let stats = index.stats("1.21.10", Mapping::Yarn)?;
		assert_eq!(stats.file_count, 2);
		assert_eq!(stats.class_count, 2);
		assert_eq!(stats.method_count, 1);
		assert_eq!(stats.field_count, 1);

		let hits = index.search("1.21.10", Mapping::Yarn, "Entity", &[EntryType::Class], false, 10)?;
		assert_eq!(hits.len(), 2);
		assert!(hits.iter().all(|x| x.entry_type == "class"));
		assert!(hits.iter().any(|x| x.symbol == "Entity"));

		let hits = index.search("1.21.10", Mapping::Yarn, "tick", &[EntryType::Method], false, 10)?;
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].class_name, "net.minecraft.entity.Entity");
		assert_eq!(hits[0].line, 4);

		// scores are positive magnitudes
		assert!(hits[0].score >= 0.0);

		Ok(())
	}

	#[test]
	fn clear_drops_one_shard_only() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let root = dir.path().join("tree");
		std::fs::create_dir_all(&root)?;
		std::fs::write(root.join("A.java"), "public class A {\n}\n")?;

		let index = SearchIndex::open_in_memory()?;
		index.index_tree("1.21.10", Mapping::Yarn, &root, None)?;
		index.index_tree("1.20.4", Mapping::Yarn, &root, None)?;

		index.clear("1.21.10", Mapping::Yarn)?;

		assert!(!index.is_indexed("1.21.10", Mapping::Yarn)?);
		assert!(index.is_indexed("1.20.4", Mapping::Yarn)?);
		assert_eq!(index.stats("1.21.10", Mapping::Yarn)?.class_count, 0);
		assert_eq!(index.stats("1.20.4", Mapping::Yarn)?.class_count, 1);

		Ok(())
	}

	#[test]
	fn unindexed_search_is_an_error() {
		let index = SearchIndex::open_in_memory().unwrap();
		let err = index.search("1.21.10", Mapping::Yarn, "Entity", &[], false, 10).unwrap_err();
		assert_eq!(err.kind(), "index.notIndexed");
	}

	#[test]
	fn indexing_a_missing_tree_is_an_error() {
		let index = SearchIndex::open_in_memory().unwrap();
		let err = index.index_tree("1.21.10", Mapping::Yarn, Path::new("/does/not/exist"), None).unwrap_err();
		assert_eq!(err.kind(), "index.notIndexed");
	}
}
