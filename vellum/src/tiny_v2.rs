//! Functions to read and write mappings in the "Tiny v2" format.
//!
//! # Reading
//! You can read a `.tiny` file using the [`read_file`] method, by passing a path.
//! If you already have a [`Read`]er, you can use the [`read`] method.
//!
//! It's recommended to check that the namespaces are indeed the ones expected.
//! See [`Namespaces::check_that`](crate::tree::Namespaces::check_that) for more info.
//!
//! Parameter and comment sub-sections (as emitted by yarn) are skipped.
//!
//! # Writing
//! For writing `.tiny` files, there are the [`write`][fn@write] as well as the
//! [`write_vec`] and [`write_string`] methods.
//!
//! Writing preserves insertion order, so a file read and written back comes out
//! unchanged.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::{Error, Result};
use crate::tree::{ClassMapping, FieldMapping, Mappings, MethodMapping, Names, Namespaces};

/// One body line of a tiny file: its indentation depth and its tab-separated fields.
#[derive(Debug)]
pub(crate) struct TinyLine {
	pub(crate) line_number: usize,
	pub(crate) indent: usize,
	pub(crate) fields: Vec<String>,
}

impl TinyLine {
	pub(crate) fn new(line_number: usize, line: &str) -> TinyLine {
		let indent = line.bytes().take_while(|x| *x == b'\t').count();

		TinyLine {
			line_number,
			indent,
			fields: line[indent..].split('\t').map(|x| x.to_owned()).collect(),
		}
	}

	pub(crate) fn kind(&self) -> &str {
		&self.fields[0]
	}
}

fn names_from_fields<const N: usize>(line: &TinyLine, fields: &[String]) -> Result<Names<N>> {
	if fields.len() != N {
		return Err(Error::tiny_v2(line.line_number, format!("expected {N} names, got {}", fields.len())));
	}

	let mut names = [const { None }; N];
	for (slot, field) in names.iter_mut().zip(fields) {
		if !field.is_empty() {
			*slot = Some(field.clone());
		}
	}

	Names::try_from(names)
		.map_err(|_| Error::tiny_v2(line.line_number, "first name column must not be empty"))
}

/// Reads a `.tiny` file (tiny v2), by opening the file given by the path.
pub fn read_file<const N: usize>(path: impl AsRef<Path>) -> Result<Mappings<N>> {
	read(File::open(path)?)
}

/// Reads the tiny v2 format, from the given reader.
///
/// ```
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// ";
///
/// let mappings: vellum::tree::Mappings<3> = vellum::tiny_v2::read(string.as_bytes()).unwrap();
///
/// mappings.namespaces.check_that(["namespaceA", "namespaceB", "namespaceC"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read<const N: usize>(reader: impl Read) -> Result<Mappings<N>> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(i, line)| line.map(|line| TinyLine::new(i + 1, &line)).map_err(Error::from));

	let header = lines.next().ok_or_else(|| Error::tiny_v2(1, "no header line"))??;
	if header.indent != 0 || header.fields.len() < 3 + N
		|| header.fields[0] != "tiny" || header.fields[1] != "2" || header.fields[2] != "0"
	{
		return Err(Error::tiny_v2(1, "header isn't tiny v2.0"));
	}
	if header.fields.len() != 3 + N {
		return Err(Error::tiny_v2(1, format!("expected {N} namespaces, got {}", header.fields.len() - 3)));
	}

	let namespaces: [String; N] = header.fields[3..].to_vec().try_into()
		.map_err(|_| Error::tiny_v2(1, "namespace count"))?;

	let mut mappings = Mappings::new(Namespaces::from(namespaces));

	for line in lines {
		let line = line?;

		if line.fields.len() == 1 && line.fields[0].is_empty() {
			continue;
		}

		match (line.indent, line.kind()) {
			(0, "c") => {
				let names = names_from_fields(&line, &line.fields[1..])?;
				mappings.add_class(ClassMapping::new(names))
					.map_err(|e| Error::tiny_v2(line.line_number, e.to_string()))?;
			},
			(1, "f") | (1, "m") => {
				if line.fields.len() < 2 {
					return Err(Error::tiny_v2(line.line_number, "member line without descriptor"));
				}
				let desc = line.fields[1].clone();
				let names = names_from_fields(&line, &line.fields[2..])?;

				let index = mappings.classes.len().checked_sub(1)
					.ok_or_else(|| Error::tiny_v2(line.line_number, "member line before any class line"))?;
				let class = match mappings.classes.get_index_mut(index) {
					Some((_, class)) => class,
					None => return Err(Error::tiny_v2(line.line_number, "member line before any class line")),
				};

				if line.kind() == "f" {
					class.fields.push(FieldMapping { desc, names });
				} else {
					class.methods.push(MethodMapping { desc, names });
				}
			},
			// parameters, comments, and anything unknown
			_ => {},
		}
	}

	Ok(mappings)
}

/// Writes the given mappings into a `String`, in the tiny v2 format.
///
/// This method is of most use in test cases, where you also use the
/// `pretty_assertions` crate for viewing string diffs.
pub fn write_string<const N: usize>(mappings: &Mappings<N>) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec)
		.map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v2 format.
pub fn write_vec<const N: usize>(mappings: &Mappings<N>) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Writes the given mappings to a file at the given path, in the tiny v2 format.
pub fn write_file<const N: usize>(mappings: &Mappings<N>, path: impl AsRef<Path>) -> Result<()> {
	write(mappings, &mut File::create(path)?)
}

fn write_names<const N: usize>(w: &mut impl Write, names: &Names<N>) -> Result<()> {
	for i in 0..N {
		let name = names.get(crate::tree::Namespace(i)).unwrap_or("");
		write!(w, "\t{name}")?;
	}
	writeln!(w)?;
	Ok(())
}

/// Writes the given mappings to the given writer, in the tiny v2 format.
///
/// Classes keep their insertion order; fields are written before methods
/// within each class, which is the order canonical files use.
///
/// ```
/// let input = "\
/// tiny	2	0	intermediary	named
/// c	net/minecraft/class_1297	net/minecraft/entity/Entity
/// 	f	I	field_5974	age
/// 	m	()Lnet/minecraft/class_1297;	method_5731	getVehicle
/// ";
///
/// let mappings: vellum::tree::Mappings<2> = vellum::tiny_v2::read(input.as_bytes()).unwrap();
/// assert_eq!(vellum::tiny_v2::write_string(&mappings).unwrap(), input);
/// ```
pub fn write<const N: usize>(mappings: &Mappings<N>, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tiny\t2\t0")?;
	for namespace in mappings.namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for class in mappings.classes.values() {
		write!(w, "c")?;
		write_names(w, &class.names)?;

		for field in &class.fields {
			write!(w, "\tf\t{}", field.desc)?;
			write_names(w, &field.names)?;
		}

		for method in &class.methods {
			write!(w, "\tm\t{}", method.desc)?;
			write_names(w, &method.names)?;
		}
	}

	Ok(())
}
