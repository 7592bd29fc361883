use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stratum::{Mapping, Pipeline};
use stratum::layout::CacheLayout;
use stratum::pipeline::{CompareCategory, SearchType};
use stratum::search::EntryType;

#[derive(Debug, Parser)]
#[command(name = "stratum", about = "Cached decompiled Minecraft source, mappings and registry data.")]
struct Cli {
	/// Be verbose.
	#[arg(short = 'v', long = "verbose")]
	verbose: bool,

	/// Cache root to use instead of the OS default.
	#[arg(long = "cache-root")]
	cache_root: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Lists cached and upstream-available versions.
	Versions,
	/// Prints the decompiled source of one class.
	Source {
		version: String,
		/// Class name in dotted form, e.g. `net.minecraft.entity.Entity`.
		class: String,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
	},
	/// Decompiles a whole version.
	Decompile {
		version: String,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
		/// Drop the existing tree and the search index first.
		#[arg(long)]
		force: bool,
	},
	/// Dumps registry data, whole or for one registry.
	Registry {
		version: String,
		/// Registry name, `minecraft:` optional (e.g. `block`).
		registry_type: Option<String>,
	},
	/// Translates a symbol between naming schemes.
	Mapping {
		version: String,
		symbol: String,
		#[arg(long, value_enum)]
		from: Mapping,
		#[arg(long, value_enum)]
		to: Mapping,
	},
	/// Remaps a mod jar (intermediary symbols) into a readable scheme.
	RemapMod {
		input: PathBuf,
		output: PathBuf,
		version: String,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
	},
	/// Walks decompiled source for a string (no index needed).
	Search {
		version: String,
		query: String,
		#[arg(long = "type", value_enum, default_value = "all")]
		search_type: SearchType,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
		#[arg(long, default_value_t = 50)]
		limit: usize,
	},
	/// Builds the full-text search index for a version.
	Index {
		version: String,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
	},
	/// Ranked query against the full-text index.
	SearchIndex {
		version: String,
		query: String,
		/// Restrict to entry types (class, method, field); repeatable.
		#[arg(long = "type", value_enum)]
		types: Vec<CliEntryType>,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
		#[arg(long, default_value_t = 20)]
		limit: u32,
	},
	/// Diffs two versions.
	Compare {
		from_version: String,
		to_version: String,
		#[arg(long, value_enum, default_value = "yarn")]
		mapping: Mapping,
		#[arg(long, value_enum, default_value = "all")]
		category: CompareCategory,
	},
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliEntryType {
	Class,
	Method,
	Field,
	Content,
}

impl From<CliEntryType> for EntryType {
	fn from(value: CliEntryType) -> EntryType {
		match value {
			CliEntryType::Class => EntryType::Class,
			CliEntryType::Method => EntryType::Method,
			CliEntryType::Field => EntryType::Field,
			CliEntryType::Content => EntryType::Content,
		}
	}
}

fn setup_logger(verbose: bool) -> Result<()> {
	let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };

	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to install the logger")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_logger(cli.verbose)?;

	let pipeline = match cli.cache_root {
		Some(root) => Pipeline::with_layout(CacheLayout::at(root)),
		None => Pipeline::new(),
	}.context("failed to set up the pipeline")?;

	match cli.command {
		Command::Versions => {
			let versions = pipeline.list_minecraft_versions().await?;
			print_json(&versions)?;
		},
		Command::Source { version, class, mapping } => {
			let source = pipeline.minecraft_source(&version, &class, mapping).await?;
			println!("{source}");
		},
		Command::Decompile { version, mapping, force } => {
			let summary = pipeline.decompile_version(&version, mapping, force).await?;
			print_json(&summary)?;
		},
		Command::Registry { version, registry_type } => {
			let data = pipeline.registry_data(&version, registry_type.as_deref()).await?;
			print_json(&data)?;
		},
		Command::Mapping { version, symbol, from, to } => {
			let result = pipeline.find_mapping(&version, &symbol, from, to).await?;
			print_json(&result)?;
		},
		Command::RemapMod { input, output, version, mapping } => {
			let output = pipeline.remap_mod_jar(&input, &output, &version, mapping).await?;
			println!("{}", output.display());
		},
		Command::Search { version, query, search_type, mapping, limit } => {
			let results = pipeline.search_code(&version, &query, search_type, mapping, limit).await?;
			print_json(&results)?;
		},
		Command::Index { version, mapping } => {
			let outcome = pipeline.index_version(&version, mapping).await?;
			print_json(&outcome)?;
		},
		Command::SearchIndex { version, query, types, mapping, limit } => {
			let types: Vec<EntryType> = types.into_iter().map(EntryType::from).collect();
			let hits = pipeline.search_indexed(&query, &version, mapping, &types, limit)?;
			print_json(&hits)?;
		},
		Command::Compare { from_version, to_version, mapping, category } => {
			let report = pipeline.compare_versions(&from_version, &to_version, mapping, category).await?;
			print_json(&report)?;
		},
	}

	Ok(())
}
