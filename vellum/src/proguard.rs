//! Reader for the ProGuard obfuscation maps the game vendor publishes.
//!
//! The format is line oriented: a top-level `named.Class -> obf:` line opens a
//! class block, and indented lines list its fields (`type name -> obf`) and
//! methods (`(from:to:)? returnType name(paramTypes) -> obf`). All type names
//! are written in the *named* namespace with `.` package separators; this
//! module converts them to internal `/` form and JVM descriptor encoding.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use crate::{Error, Result};
use crate::descriptor::java_type_to_desc;

#[derive(Debug, Clone, PartialEq)]
pub struct ProguardMappings {
	pub classes: Vec<ProguardClass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProguardClass {
	/// Named class name, internal form (`net/minecraft/world/entity/Entity`).
	pub named: String,
	/// Obfuscated class name, internal form.
	pub obf: String,
	pub fields: Vec<ProguardField>,
	pub methods: Vec<ProguardMethod>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProguardField {
	/// Field descriptor, in the named namespace.
	pub desc: String,
	pub named: String,
	pub obf: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProguardMethod {
	/// Method descriptor `(params)ret`, in the named namespace.
	pub desc: String,
	pub named: String,
	pub obf: String,
	/// The `from:to:` source line range, if the map carries one.
	pub lines: Option<(u32, u32)>,
}

/// Reads a ProGuard map, by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<ProguardMappings> {
	read(File::open(path)?)
}

/// Reads a ProGuard map from the given reader.
pub fn read(reader: impl Read) -> Result<ProguardMappings> {
	let mut mappings = ProguardMappings { classes: Vec::new() };

	for (i, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = i + 1;
		let line = line?;

		let trimmed = line.trim_start();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}

		if line.starts_with(char::is_whitespace) {
			let class = mappings.classes.last_mut()
				.ok_or_else(|| Error::proguard(line_number, "member line before any class line"))?;
			parse_member(class, trimmed, line_number)?;
		} else {
			mappings.classes.push(parse_class(trimmed, line_number)?);
		}
	}

	Ok(mappings)
}

fn split_arrow<'a>(line: &'a str, line_number: usize) -> Result<(&'a str, &'a str)> {
	line.split_once(" -> ")
		.ok_or_else(|| Error::proguard(line_number, "line without \" -> \""))
}

fn parse_class(line: &str, line_number: usize) -> Result<ProguardClass> {
	let (named, obf) = split_arrow(line, line_number)?;
	let obf = obf.strip_suffix(':')
		.ok_or_else(|| Error::proguard(line_number, "class line doesn't end with ':'"))?;

	Ok(ProguardClass {
		named: named.replace('.', "/"),
		obf: obf.replace('.', "/"),
		fields: Vec::new(),
		methods: Vec::new(),
	})
}

fn parse_member(class: &mut ProguardClass, line: &str, line_number: usize) -> Result<()> {
	let (left, obf) = split_arrow(line, line_number)?;

	// a method's left side carries a parameter list, a field's never does
	if let Some(paren) = left.find('(') {
		let (head, params) = left.split_at(paren);
		let params = params.strip_prefix('(')
			.and_then(|x| x.strip_suffix(')'))
			.ok_or_else(|| Error::proguard(line_number, "malformed parameter list"))?;

		let (head, lines) = match head.split_once(':') {
			Some((from, rest)) => {
				let (to, head) = rest.split_once(':')
					.ok_or_else(|| Error::proguard(line_number, "malformed line range"))?;
				let from = from.parse()
					.map_err(|_| Error::proguard(line_number, "line range start isn't a number"))?;
				let to = to.parse()
					.map_err(|_| Error::proguard(line_number, "line range end isn't a number"))?;
				(head, Some((from, to)))
			},
			None => (head, None),
		};

		let (ret, named) = head.rsplit_once(' ')
			.ok_or_else(|| Error::proguard(line_number, "method line without return type"))?;

		let mut desc = String::from("(");
		if !params.is_empty() {
			for param in params.split(',') {
				desc.push_str(&java_type_to_desc(param.trim()));
			}
		}
		desc.push(')');
		desc.push_str(&java_type_to_desc(ret));

		class.methods.push(ProguardMethod {
			desc,
			named: named.to_owned(),
			obf: obf.to_owned(),
			lines,
		});
	} else {
		let (ty, named) = left.rsplit_once(' ')
			.ok_or_else(|| Error::proguard(line_number, "field line without type"))?;

		class.fields.push(ProguardField {
			desc: java_type_to_desc(ty),
			named: named.to_owned(),
			obf: obf.to_owned(),
		});
	}

	Ok(())
}
