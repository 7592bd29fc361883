//! The pipeline coordinator.
//!
//! [`Pipeline`] owns the cache layout, the metadata store, the HTTP client,
//! the Java runtime, the search index and the per-key locks; the stage
//! drivers hang off it as methods (see the sibling modules). Every operation
//! checks for the finished artifact first, then takes the single-flight slot
//! for its key, re-checks, and only then does work.

use std::collections::BTreeSet;
use std::path::Path;
use serde::Serialize;
use walkdir::WalkDir;
use crate::{Error, Mapping, Result};
use crate::http::Http;
use crate::java::{JavaRuntime, MIN_JAVA_VERSION};
use crate::layout::CacheLayout;
use crate::manifest::Manifests;
use crate::search::{EntryType, IndexOutcome, IndexStats, SearchHit, SearchIndex};
use crate::singleflight::KeyedLocks;
use crate::store::Store;

pub struct Pipeline {
	pub(crate) layout: CacheLayout,
	pub(crate) http: Http,
	pub(crate) store: Store,
	pub(crate) java: JavaRuntime,
	pub(crate) locks: KeyedLocks,
	pub(crate) manifests: Manifests,
	pub(crate) search: SearchIndex,
}

impl Pipeline {
	/// A pipeline over the OS-conventional cache directory.
	///
	/// Verifies at construction that a new enough Java (see
	/// [`MIN_JAVA_VERSION`]) is reachable; without one nothing downstream
	/// works.
	pub fn new() -> Result<Pipeline> {
		Pipeline::with_layout(CacheLayout::from_os()?)
	}

	pub fn with_layout(layout: CacheLayout) -> Result<Pipeline> {
		let java = JavaRuntime::locate();
		java.check_java_version(MIN_JAVA_VERSION)?;
		Pipeline::assemble(layout, java)
	}

	/// A pipeline with an explicit java binary; the version gate still applies.
	pub fn with_java(layout: CacheLayout, java: JavaRuntime) -> Result<Pipeline> {
		java.check_java_version(MIN_JAVA_VERSION)?;
		Pipeline::assemble(layout, java)
	}

	fn assemble(layout: CacheLayout, java: JavaRuntime) -> Result<Pipeline> {
		std::fs::create_dir_all(layout.root())?;
		let store = Store::open(&layout.cache_db())?;
		let search = SearchIndex::open(&layout.search_db())?;

		Ok(Pipeline {
			layout,
			http: Http::new(),
			store,
			java,
			locks: KeyedLocks::new(),
			manifests: Manifests::new(),
			search,
		})
	}

	pub fn layout(&self) -> &CacheLayout {
		&self.layout
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn search_index(&self) -> &SearchIndex {
		&self.search
	}
}

#[derive(Debug, Serialize)]
pub struct VersionsList {
	pub cached: Vec<String>,
	pub available: Vec<String>,
	pub total_available: usize,
}

impl Pipeline {
	/// Lists what's cached locally and what the manifest offers.
	pub async fn list_minecraft_versions(&self) -> Result<VersionsList> {
		let cached = self.store.list_versions()?;
		let manifest = self.versions_manifest().await?;

		let available: Vec<String> = manifest.versions.iter().map(|x| x.id.clone()).collect();
		let total_available = available.len();

		Ok(VersionsList { cached, available, total_available })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchType {
	Class,
	Method,
	Field,
	Content,
	All,
}

impl SearchType {
	fn entry_types(&self) -> Vec<EntryType> {
		match self {
			SearchType::Class => vec![EntryType::Class],
			SearchType::Method => vec![EntryType::Method],
			SearchType::Field => vec![EntryType::Field],
			SearchType::Content | SearchType::All => Vec::new(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct CodeSearchResult {
	#[serde(rename = "type")]
	pub result_type: String,
	pub name: String,
	pub file: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<String>,
}

impl Pipeline {
	/// Walks the decompiled tree looking for `query`, without the index.
	///
	/// This is the exhaustive (and slow) search; [`Pipeline::search_indexed`]
	/// is the ranked one.
	pub async fn search_code(
		&self,
		version: &str,
		query: &str,
		search_type: SearchType,
		mapping: Mapping,
		limit: usize,
	) -> Result<Vec<CodeSearchResult>> {
		let root = self.decompiled(version, mapping, None).await?;
		let mut results = Vec::new();

		for entry in WalkDir::new(&root).into_iter().filter_map(|x| x.ok()) {
			if results.len() >= limit {
				break;
			}
			if !entry.file_type().is_file() || entry.path().extension().map_or(true, |x| x != "java") {
				continue;
			}

			let file = entry.path().to_string_lossy().into_owned();
			let stem = entry.path().file_stem().map(|x| x.to_string_lossy().into_owned()).unwrap_or_default();

			if matches!(search_type, SearchType::Class | SearchType::All) && stem.contains(query) {
				results.push(CodeSearchResult {
					result_type: "class".to_owned(),
					name: stem.clone(),
					file: file.clone(),
					line: None,
					context: None,
				});
				if results.len() >= limit {
					break;
				}
			}

			if matches!(search_type, SearchType::Class) {
				continue;
			}

			let Ok(content) = std::fs::read_to_string(entry.path()) else {
				continue;
			};

			for (i, line) in content.lines().enumerate() {
				if results.len() >= limit {
					break;
				}
				if !line.contains(query) {
					continue;
				}

				let matched = match search_type {
					SearchType::Method | SearchType::All
						if crate::search::method_declaration_name(line).is_some_and(|x| x.contains(query)) =>
					{
						Some("method")
					},
					SearchType::Field | SearchType::All
						if crate::search::field_declaration_name(line).is_some_and(|x| x.contains(query)) =>
					{
						Some("field")
					},
					SearchType::Content | SearchType::All => Some("content"),
					_ => None,
				};

				if let Some(result_type) = matched {
					results.push(CodeSearchResult {
						result_type: result_type.to_owned(),
						name: query.to_owned(),
						file: file.clone(),
						line: Some((i + 1) as u64),
						context: Some(line.trim().chars().take(300).collect()),
					});
				}
			}
		}

		Ok(results)
	}

	/// Builds (or rebuilds) the search index for `(version, mapping)`.
	pub async fn index_version(&self, version: &str, mapping: Mapping) -> Result<IndexOutcome> {
		let root = self.decompiled(version, mapping, None).await?;

		let _guard = self.locks.acquire(format!("index:{version}:{mapping}")).await;

		self.store.create_job(version, mapping)?;
		self.store.update_job(version, mapping, crate::store::JobStatus::Running, Some(0.0), None)?;

		let result = self.search.index_tree(version, mapping, &root, None);

		match result {
			Ok(outcome) => {
				self.store.update_job(version, mapping, crate::store::JobStatus::Completed, Some(1.0), None)?;
				Ok(outcome)
			},
			Err(e) => {
				self.store.update_job(version, mapping, crate::store::JobStatus::Failed, None, Some(&e.to_string()))?;
				Err(e)
			},
		}
	}

	/// Ranked query against the index. `types` empty means all entry types.
	pub fn search_indexed(
		&self,
		query: &str,
		version: &str,
		mapping: Mapping,
		types: &[EntryType],
		limit: u32,
	) -> Result<Vec<SearchHit>> {
		let match_context = types.is_empty() || types.contains(&EntryType::Content);
		let row_types: Vec<EntryType> = types.iter()
			.copied()
			.filter(|x| *x != EntryType::Content)
			.collect();
		self.search.search(version, mapping, query, &row_types, match_context, limit)
	}

	pub fn search_classes(&self, query: &str, version: &str, mapping: Mapping, limit: u32) -> Result<Vec<SearchHit>> {
		self.search.search(version, mapping, query, &[EntryType::Class], false, limit)
	}

	pub fn search_methods(&self, query: &str, version: &str, mapping: Mapping, limit: u32) -> Result<Vec<SearchHit>> {
		self.search.search(version, mapping, query, &[EntryType::Method], false, limit)
	}

	pub fn search_fields(&self, query: &str, version: &str, mapping: Mapping, limit: u32) -> Result<Vec<SearchHit>> {
		self.search.search(version, mapping, query, &[EntryType::Field], false, limit)
	}

	pub fn search_content(&self, query: &str, version: &str, mapping: Mapping, limit: u32) -> Result<Vec<SearchHit>> {
		self.search.search(version, mapping, query, &[], true, limit)
	}

	pub fn index_stats(&self, version: &str, mapping: Mapping) -> Result<IndexStats> {
		self.search.stats(version, mapping)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CompareCategory {
	Classes,
	Registry,
	All,
}

#[derive(Debug, Serialize)]
pub struct DiffSets {
	pub added: Vec<String>,
	pub removed: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareReport {
	pub from_version: String,
	pub to_version: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub classes: Option<DiffSets>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub registries: Option<std::collections::BTreeMap<String, DiffSets>>,
}

fn class_set(root: &Path) -> BTreeSet<String> {
	WalkDir::new(root)
		.into_iter()
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_file())
		.filter(|entry| entry.path().extension().is_some_and(|x| x == "java"))
		.filter_map(|entry| {
			entry.path().strip_prefix(root).ok().map(|relative| {
				relative.with_extension("")
					.components()
					.map(|x| x.as_os_str().to_string_lossy().into_owned())
					.collect::<Vec<_>>()
					.join(".")
			})
		})
		.collect()
}

impl Pipeline {
	/// Diffs two versions: decompiled class sets, registry entry sets, or both.
	pub async fn compare_versions(
		&self,
		from: &str,
		to: &str,
		mapping: Mapping,
		category: CompareCategory,
	) -> Result<CompareReport> {
		let mut report = CompareReport {
			from_version: from.to_owned(),
			to_version: to.to_owned(),
			classes: None,
			registries: None,
		};

		if matches!(category, CompareCategory::Classes | CompareCategory::All) {
			let from_root = self.decompiled(from, mapping, None).await?;
			let to_root = self.decompiled(to, mapping, None).await?;

			let from_classes = class_set(&from_root);
			let to_classes = class_set(&to_root);

			report.classes = Some(DiffSets {
				added: to_classes.difference(&from_classes).cloned().collect(),
				removed: from_classes.difference(&to_classes).cloned().collect(),
			});
		}

		if matches!(category, CompareCategory::Registry | CompareCategory::All) {
			let mut registries = std::collections::BTreeMap::new();

			// diff the registries both dumps know about
			let from_types: BTreeSet<String> = self.registry_types(from).await?.into_iter().collect();
			let to_types: BTreeSet<String> = self.registry_types(to).await?.into_iter().collect();

			for ty in from_types.intersection(&to_types) {
				let (added, removed) = self.registry_diff(from, to, ty).await?;
				if !added.is_empty() || !removed.is_empty() {
					registries.insert(ty.clone(), DiffSets { added, removed });
				}
			}

			report.registries = Some(registries);
		}

		Ok(report)
	}

	/// Whether this error should be retried by the caller. Network and
	/// timeout failures are transient; everything else needs intervention.
	pub fn is_transient(error: &Error) -> bool {
		matches!(error, Error::Network { .. } | Error::SubprocessTimeout { .. })
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::java::JavaRuntime;
	use super::*;

	// Assembled directly, skipping the java version gate: these tests only
	// exercise paths that are served from a seeded cache and never spawn
	// anything.
	fn pipeline_at(root: &Path) -> Pipeline {
		Pipeline::assemble(CacheLayout::at(root), JavaRuntime::with_command("java")).unwrap()
	}

	fn seed_file(path: &Path, content: &str) {
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, content).unwrap();
	}

	const ENTITY_JAVA: &str = "\
package net.minecraft.entity;

public class Entity {
    private int age;

    public void tick() {
        this.age++;
    }
}
";

	fn seed_decompiled(pipeline: &Pipeline, version: &str, mapping: Mapping) {
		let root = pipeline.layout.decompiled_dir(version, mapping);
		seed_file(&root.join("net/minecraft/entity/Entity.java"), ENTITY_JAVA);
		seed_file(&root.join("net/minecraft/util/math/MathHelper.java"), "\
package net.minecraft.util.math;

public class MathHelper {
    public static float sqrt(float value) {
        return 0.0F;
    }
}
");
	}

	const YARN_TINY: &str = "\
tiny	2	0	official	intermediary	named
c	a	net/minecraft/class_1297	net/minecraft/entity/Entity
	f	I	c	field_5974	age
	m	()La;	b	method_5731	getVehicle
c	b	net/minecraft/class_3532	net/minecraft/util/math/MathHelper
";

	const MOJMAP_TINY: &str = "\
tiny	2	0	intermediary	named
c	net/minecraft/class_1297	net/minecraft/world/entity/Entity
	f	I	field_5974	age
	m	()Lnet/minecraft/class_1297;	method_5731	getVehicle
c	net/minecraft/class_3532	net/minecraft/util/Mth
";

	fn seed_mappings(pipeline: &Pipeline, version: &str) {
		seed_file(&pipeline.layout.tiny_file(version, Mapping::Yarn), YARN_TINY);
		seed_file(&pipeline.layout.tiny_file(version, Mapping::Mojmap), MOJMAP_TINY);
	}

	#[tokio::test]
	async fn source_of_a_cached_class() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_decompiled(&pipeline, "1.21.10", Mapping::Yarn);

		let source = pipeline.minecraft_source("1.21.10", "net.minecraft.entity.Entity", Mapping::Yarn).await.unwrap();
		assert!(source.contains("package net.minecraft.entity;"));
		assert!(source.contains("class Entity"));

		// slashed form resolves to the same file
		let slashed = pipeline.minecraft_source("1.21.10", "net/minecraft/entity/Entity", Mapping::Yarn).await.unwrap();
		assert_eq!(slashed, source);

		let err = pipeline.minecraft_source("1.21.10", "net.minecraft.DoesNotExist", Mapping::Yarn).await.unwrap_err();
		assert_eq!(err.kind(), "notFound.class");
	}

	#[tokio::test]
	async fn decompile_summary_from_cache() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_decompiled(&pipeline, "1.21.10", Mapping::Yarn);

		let summary = pipeline.decompile_version("1.21.10", Mapping::Yarn, false).await.unwrap();
		assert_eq!(summary.classes, 2);
		assert_eq!(summary.output_dir, pipeline.layout.decompiled_dir("1.21.10", Mapping::Yarn));
	}

	#[tokio::test]
	async fn lookups_within_the_yarn_tree() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_mappings(&pipeline, "1.21.10");

		// intermediary to yarn
		let result = pipeline.find_mapping("1.21.10", "net/minecraft/class_1297", Mapping::Intermediary, Mapping::Yarn).await.unwrap();
		assert!(result.found);
		assert_eq!(result.kind.as_deref(), Some("class"));
		assert!(result.target.unwrap().contains("Entity"));

		// yarn to intermediary
		let result = pipeline.find_mapping("1.21.10", "net/minecraft/entity/Entity", Mapping::Yarn, Mapping::Intermediary).await.unwrap();
		assert!(result.found);
		assert!(result.target.unwrap().contains("class_"));

		// members resolve too, with their enclosing class
		let result = pipeline.find_mapping("1.21.10", "method_5731", Mapping::Intermediary, Mapping::Yarn).await.unwrap();
		assert!(result.found);
		assert_eq!(result.kind.as_deref(), Some("method"));
		assert_eq!(result.target.as_deref(), Some("getVehicle"));
		assert_eq!(result.class_name.as_deref(), Some("net/minecraft/entity/Entity"));

		// a miss is a clean not-found
		let result = pipeline.find_mapping("1.21.10", "NonExistentClassThatDoesNotExist", Mapping::Yarn, Mapping::Intermediary).await.unwrap();
		assert!(!result.found);
		assert_eq!(result.target, None);

		// identity
		let result = pipeline.find_mapping("1.21.10", "anything", Mapping::Yarn, Mapping::Yarn).await.unwrap();
		assert!(result.found);
		assert_eq!(result.target.as_deref(), Some("anything"));
	}

	#[tokio::test]
	async fn lookups_bridging_through_intermediary() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_mappings(&pipeline, "1.21.10");

		// yarn name to mojmap name crosses both trees
		let result = pipeline.find_mapping("1.21.10", "net/minecraft/util/math/MathHelper", Mapping::Yarn, Mapping::Mojmap).await.unwrap();
		assert!(result.found);
		assert_eq!(result.source, "net/minecraft/util/math/MathHelper");
		assert_eq!(result.target.as_deref(), Some("net/minecraft/util/Mth"));

		// and back
		let result = pipeline.find_mapping("1.21.10", "net/minecraft/util/Mth", Mapping::Mojmap, Mapping::Yarn).await.unwrap();
		assert!(result.found);
		assert_eq!(result.target.as_deref(), Some("net/minecraft/util/math/MathHelper"));

		// official works as a bridge source as well
		let result = pipeline.find_mapping("1.21.10", "a", Mapping::Official, Mapping::Mojmap).await.unwrap();
		assert!(result.found);
		assert_eq!(result.target.as_deref(), Some("net/minecraft/world/entity/Entity"));

		// mojmap to intermediary is a single step in the merged tree
		let result = pipeline.find_mapping("1.21.10", "net/minecraft/world/entity/Entity", Mapping::Mojmap, Mapping::Intermediary).await.unwrap();
		assert!(result.found);
		assert_eq!(result.target.as_deref(), Some("net/minecraft/class_1297"));
	}

	#[tokio::test]
	async fn registry_filtering_from_cache() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_file(&pipeline.layout.registries_json("1.21.10"), r#"{
			"minecraft:block": { "entries": { "minecraft:stone": { "protocol_id": 1 } } },
			"minecraft:item": { "entries": { "minecraft:diamond": { "protocol_id": 2 } } }
		}"#);

		let block = pipeline.registry_data("1.21.10", Some("block")).await.unwrap();
		assert!(block["entries"]["minecraft:stone"].is_object());

		let item = pipeline.registry_data("1.21.10", Some("minecraft:item")).await.unwrap();
		assert!(item["entries"]["minecraft:diamond"].is_object());

		let whole = pipeline.registry_data("1.21.10", None).await.unwrap();
		assert!(whole["minecraft:block"].is_object());

		let err = pipeline.registry_data("1.21.10", Some("not_a_registry")).await.unwrap_err();
		assert_eq!(err.kind(), "notFound.registry");
	}

	#[tokio::test]
	async fn indexing_and_ranked_search() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_decompiled(&pipeline, "1.21.10", Mapping::Yarn);

		let outcome = pipeline.index_version("1.21.10", Mapping::Yarn).await.unwrap();
		assert_eq!(outcome.file_count, 2);

		let hits = pipeline.search_classes("Entity", "1.21.10", Mapping::Yarn, 10).unwrap();
		assert!(!hits.is_empty());
		assert!(hits.iter().all(|x| x.entry_type == "class"));

		let hits = pipeline.search_methods("tick", "1.21.10", Mapping::Yarn, 10).unwrap();
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].class_name, "net.minecraft.entity.Entity");

		// the job row reflects the finished indexing run
		let job = pipeline.store.get_job("1.21.10", Mapping::Yarn).unwrap().unwrap();
		assert_eq!(job.status, crate::store::JobStatus::Completed);
	}

	#[tokio::test]
	async fn walk_search_from_cache() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());
		seed_decompiled(&pipeline, "1.21.10", Mapping::Yarn);

		let results = pipeline.search_code("1.21.10", "Entity", SearchType::Class, Mapping::Yarn, 10).await.unwrap();
		assert_eq!(results.len(), 1);
		assert_eq!(results[0].result_type, "class");
		assert_eq!(results[0].name, "Entity");

		let results = pipeline.search_code("1.21.10", "sqrt", SearchType::Method, Mapping::Yarn, 10).await.unwrap();
		assert_eq!(results.len(), 1);
		assert_eq!(results[0].result_type, "method");
		assert_eq!(results[0].line, Some(4));
	}

	#[tokio::test]
	async fn comparing_two_cached_versions() {
		let dir = tempfile::tempdir().unwrap();
		let pipeline = pipeline_at(dir.path());

		seed_decompiled(&pipeline, "1.20.4", Mapping::Yarn);
		seed_decompiled(&pipeline, "1.21.10", Mapping::Yarn);
		// one class only the newer version has
		seed_file(
			&pipeline.layout.decompiled_dir("1.21.10", Mapping::Yarn).join("net/minecraft/entity/EntityPose.java"),
			"package net.minecraft.entity;\n\npublic enum EntityPose {\n}\n",
		);

		seed_file(&pipeline.layout.registries_json("1.20.4"), r#"{
			"minecraft:block": { "entries": { "minecraft:stone": {}, "minecraft:grass": {} } }
		}"#);
		seed_file(&pipeline.layout.registries_json("1.21.10"), r#"{
			"minecraft:block": { "entries": { "minecraft:stone": {}, "minecraft:pale_oak_log": {} } }
		}"#);

		let report = pipeline.compare_versions("1.20.4", "1.21.10", Mapping::Yarn, CompareCategory::All).await.unwrap();

		let classes = report.classes.unwrap();
		assert_eq!(classes.added, vec!["net.minecraft.entity.EntityPose".to_owned()]);
		assert_eq!(classes.removed, Vec::<String>::new());

		let registries = report.registries.unwrap();
		let block = &registries["minecraft:block"];
		assert_eq!(block.added, vec!["minecraft:pale_oak_log".to_owned()]);
		assert_eq!(block.removed, vec!["minecraft:grass".to_owned()]);
	}
}
