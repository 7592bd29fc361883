//! Functions to read and write mappings in the older "Tiny v1" format.
//!
//! Tiny v1 is flat: instead of nesting members under their class with
//! indentation, every `FIELD` and `METHOD` record repeats the enclosing
//! class name (in the source namespace) as its second column.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use indexmap::map::Entry;
use crate::{Error, Result};
use crate::tiny_v2::TinyLine;
use crate::tree::{ClassMapping, FieldMapping, Mappings, MethodMapping, Names, Namespace, Namespaces};

/// Reads a `.tiny` file (tiny v1), by opening the file given by the path.
pub fn read_file<const N: usize>(path: impl AsRef<Path>) -> Result<Mappings<N>> {
	read(File::open(path)?)
}

fn names_from_fields<const N: usize>(line_number: usize, fields: &[String]) -> Result<Names<N>> {
	if fields.len() != N {
		return Err(Error::tiny_v1(line_number, format!("expected {N} names, got {}", fields.len())));
	}

	let mut names = [const { None }; N];
	for (slot, field) in names.iter_mut().zip(fields) {
		if !field.is_empty() {
			*slot = Some(field.clone());
		}
	}

	Names::try_from(names)
		.map_err(|_| Error::tiny_v1(line_number, "first name column must not be empty"))
}

/// Reads the tiny v1 format, from the given reader.
///
/// Member records may come before the `CLASS` record of their enclosing
/// class; a class entry is created on first sight either way.
pub fn read<const N: usize>(reader: impl Read) -> Result<Mappings<N>> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(i, line)| line.map(|line| TinyLine::new(i + 1, &line)).map_err(Error::from));

	let header = lines.next().ok_or_else(|| Error::tiny_v1(1, "no header line"))??;
	if header.indent != 0 || header.fields[0] != "v1" {
		return Err(Error::tiny_v1(1, "header isn't tiny v1"));
	}
	if header.fields.len() != 1 + N {
		return Err(Error::tiny_v1(1, format!("expected {N} namespaces, got {}", header.fields.len() - 1)));
	}

	let namespaces: [String; N] = header.fields[1..].to_vec().try_into()
		.map_err(|_| Error::tiny_v1(1, "namespace count"))?;

	let mut mappings = Mappings::new(Namespaces::from(namespaces));

	for line in lines {
		let line = line?;

		if line.fields.len() == 1 && line.fields[0].is_empty() {
			continue;
		}
		if line.indent != 0 {
			return Err(Error::tiny_v1(line.line_number, "tiny v1 lines are never indented"));
		}

		match line.kind() {
			"CLASS" => {
				let names = names_from_fields(line.line_number, &line.fields[1..])?;
				match mappings.classes.entry(names.first().to_owned()) {
					Entry::Occupied(mut e) => {
						// created earlier by a member record: fill in the real names
						let placeholder = Names::from_first(names.first());
						if e.get().names == placeholder {
							e.get_mut().names = names;
						} else {
							return Err(Error::Duplicate { kind: "class", name: names.first().to_owned() });
						}
					},
					Entry::Vacant(e) => {
						e.insert(ClassMapping::new(names));
					},
				}
			},
			"FIELD" | "METHOD" => {
				if line.fields.len() < 3 {
					return Err(Error::tiny_v1(line.line_number, "member record without class name and descriptor"));
				}
				let class_name = line.fields[1].clone();
				let desc = line.fields[2].clone();
				let names = names_from_fields(line.line_number, &line.fields[3..])?;

				let class = mappings.classes.entry(class_name.clone())
					.or_insert_with(|| ClassMapping::new(Names::from_first(class_name)));

				if line.kind() == "FIELD" {
					class.fields.push(FieldMapping { desc, names });
				} else {
					class.methods.push(MethodMapping { desc, names });
				}
			},
			kind => return Err(Error::tiny_v1(line.line_number, format!("unknown record kind {kind:?}"))),
		}
	}

	Ok(mappings)
}

fn write_names<const N: usize>(w: &mut impl Write, names: &Names<N>) -> Result<()> {
	for i in 0..N {
		let name = names.get(Namespace(i)).unwrap_or("");
		write!(w, "\t{name}")?;
	}
	writeln!(w)?;
	Ok(())
}

/// Writes the given mappings to the given writer, in the tiny v1 format.
///
/// This is the v2 → v1 conversion: indentation is dropped, each member's
/// enclosing class name is hoisted into the second column, and the record
/// kinds become upper-case tokens.
pub fn write<const N: usize>(mappings: &Mappings<N>, w: &mut impl Write) -> Result<()> {
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "v1")?;
	for namespace in mappings.namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for class in mappings.classes.values() {
		write!(w, "CLASS")?;
		write_names(w, &class.names)?;

		for field in &class.fields {
			write!(w, "FIELD\t{}\t{}", class.names.first(), field.desc)?;
			write_names(w, &field.names)?;
		}

		for method in &class.methods {
			write!(w, "METHOD\t{}\t{}", class.names.first(), method.desc)?;
			write_names(w, &method.names)?;
		}
	}

	Ok(())
}

/// Writes the given mappings into a `String`, in the tiny v1 format.
pub fn write_string<const N: usize>(mappings: &Mappings<N>) -> Result<String> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	String::from_utf8(vec)
		.map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Writes the given mappings to a file at the given path, in the tiny v1 format.
pub fn write_file<const N: usize>(mappings: &Mappings<N>, path: impl AsRef<Path>) -> Result<()> {
	write(mappings, &mut File::create(path)?)
}
