//! The in-memory mapping tree.
//!
//! A [`Mappings<N>`] stores `N` namespaces and a set of classes, each with its
//! fields and methods. The first namespace is the *source* namespace: class
//! entries are keyed by their source name, and all descriptors are expressed
//! in terms of source-namespace class names.

use std::fmt::{Display, Formatter};
use indexmap::IndexMap;
use indexmap::map::Entry;
use crate::{Error, Result};

/// The ordered namespace names of a mapping tree, e.g. `["official", "intermediary", "named"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces<const N: usize> {
	names: [String; N],
}

/// A checked column index into the `N` namespaces of a tree.
///
/// Obtain one from [`Namespaces::namespace`]; the type parameter ties it to
/// trees of the same width, so an index can't be used on the wrong tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace<const N: usize>(pub(crate) usize);

impl<const N: usize> Namespaces<N> {
	pub fn names(&self) -> impl Iterator<Item=&str> {
		self.names.iter().map(|x| x.as_str())
	}

	/// Resolves a namespace name to its column index, `None` if this tree
	/// doesn't carry a column of that name.
	pub fn namespace(&self, name: &str) -> Option<Namespace<N>> {
		self.names.iter().position(|x| x == name).map(Namespace)
	}

	/// Errors with [`Error::UnknownNamespace`] unless the namespaces are exactly the given ones.
	pub fn check_that(&self, expected: [&str; N]) -> Result<()> {
		if self.names.iter().zip(expected.iter()).all(|(a, b)| a == b) {
			Ok(())
		} else {
			Err(Error::UnknownNamespace(format!("expected {expected:?}, got {:?}", self.names)))
		}
	}
}

impl<const N: usize> From<[&str; N]> for Namespaces<N> {
	fn from(value: [&str; N]) -> Namespaces<N> {
		Namespaces { names: value.map(|x| x.to_owned()) }
	}
}

impl<const N: usize> From<[String; N]> for Namespaces<N> {
	fn from(names: [String; N]) -> Namespaces<N> {
		Namespaces { names }
	}
}

impl<const N: usize> Display for Namespace<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The names of one entry, one slot per namespace.
///
/// Slot `0` is always present. An absent slot `i ≥ 1` is written as the empty
/// string in tiny files and means "same as the source name"; [`Names::resolve`]
/// applies that rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names<const N: usize> {
	names: [Option<String>; N],
}

impl<const N: usize> Names<N> {
	pub fn from_first(first: impl Into<String>) -> Names<N> {
		let mut names = [const { None }; N];
		names[0] = Some(first.into());
		Names { names }
	}

	/// The source-namespace name.
	pub fn first(&self) -> &str {
		// slot 0 is checked on construction
		self.names[0].as_deref().unwrap_or_default()
	}

	/// The name in the given namespace as stored, without the inherit-from-source rule.
	pub fn get(&self, namespace: Namespace<N>) -> Option<&str> {
		self.names[namespace.0].as_deref()
	}

	/// The effective name in the given namespace: an absent slot inherits the source name.
	pub fn resolve(&self, namespace: Namespace<N>) -> &str {
		self.names[namespace.0].as_deref().unwrap_or_else(|| self.first())
	}

	pub fn set(&mut self, namespace: Namespace<N>, name: impl Into<String>) {
		self.names[namespace.0] = Some(name.into());
	}
}

impl<const N: usize> TryFrom<[Option<String>; N]> for Names<N> {
	type Error = Error;

	fn try_from(names: [Option<String>; N]) -> Result<Names<N>> {
		match names[0] {
			Some(ref first) if !first.is_empty() => Ok(Names { names }),
			_ => Err(Error::MissingSourceName),
		}
	}
}

impl<const N: usize> From<[&str; N]> for Names<N> {
	/// Builds names from plain strings; an empty string means "absent".
	fn from(value: [&str; N]) -> Names<N> {
		Names {
			names: value.map(|x| if x.is_empty() { None } else { Some(x.to_owned()) }),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mappings<const N: usize> {
	pub namespaces: Namespaces<N>,
	/// Classes, keyed by their source-namespace name, in insertion order.
	pub classes: IndexMap<String, ClassMapping<N>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping<const N: usize> {
	pub names: Names<N>,
	pub fields: Vec<FieldMapping<N>>,
	pub methods: Vec<MethodMapping<N>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping<const N: usize> {
	/// Field descriptor, in the source namespace.
	pub desc: String,
	pub names: Names<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMapping<const N: usize> {
	/// Method descriptor, in the source namespace.
	pub desc: String,
	pub names: Names<N>,
}

impl<const N: usize> ClassMapping<N> {
	pub fn new(names: Names<N>) -> ClassMapping<N> {
		ClassMapping {
			names,
			fields: Vec::new(),
			methods: Vec::new(),
		}
	}
}

impl<const N: usize> Mappings<N> {
	pub fn new(namespaces: Namespaces<N>) -> Mappings<N> {
		Mappings {
			namespaces,
			classes: IndexMap::new(),
		}
	}

	pub fn add_class(&mut self, class: ClassMapping<N>) -> Result<&mut ClassMapping<N>> {
		match self.classes.entry(class.names.first().to_owned()) {
			Entry::Occupied(e) => Err(Error::Duplicate { kind: "class", name: e.key().clone() }),
			Entry::Vacant(e) => Ok(e.insert(class)),
		}
	}

	pub fn get_class(&self, source_name: &str) -> Option<&ClassMapping<N>> {
		self.classes.get(source_name)
	}

	/// Renames a source-namespace class name into the given namespace,
	/// passing unknown names through unchanged. This is what descriptor
	/// migration between namespaces needs (non-game classes such as
	/// `java/lang/Object` stay as they are).
	pub fn rename_class(&self, source_name: &str, namespace: Namespace<N>) -> Option<String> {
		self.classes.get(source_name)
			.map(|class| class.names.resolve(namespace).to_owned())
	}
}

/// What kind of entry a symbol search matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundKind {
	Class,
	Method,
	Field,
}

impl Display for FoundKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			FoundKind::Class => write!(f, "class"),
			FoundKind::Method => write!(f, "method"),
			FoundKind::Field => write!(f, "field"),
		}
	}
}

/// A successful symbol translation between two namespaces of one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
	pub kind: FoundKind,
	/// The symbol as matched in the source namespace.
	pub source: String,
	/// The symbol translated into the destination namespace.
	pub target: String,
	/// For members, the enclosing class in the destination namespace.
	pub class_name: Option<String>,
}

/// Accepts a class both in slashed and dotted form, and by its simple name.
fn class_matches(name: &str, symbol: &str) -> bool {
	name == symbol
		|| name.rsplit('/').next() == Some(symbol)
		|| (symbol.contains('.') && name.replace('/', ".") == *symbol)
}

impl<const N: usize> Mappings<N> {
	/// Scans the tree for `symbol` in the `src` namespace and translates the
	/// first match into the `dst` namespace.
	///
	/// Classes match exactly, by simple name (suffix after `/`), or in dotted
	/// form; methods and fields match by name equality. Scan order is class
	/// insertion order, members after their own class line.
	pub fn find_symbol(&self, symbol: &str, src: Namespace<N>, dst: Namespace<N>) -> Option<Found> {
		for class in self.classes.values() {
			let src_name = class.names.resolve(src);

			if class_matches(src_name, symbol) {
				return Some(Found {
					kind: FoundKind::Class,
					source: src_name.to_owned(),
					target: class.names.resolve(dst).to_owned(),
					class_name: None,
				});
			}

			for method in &class.methods {
				if method.names.resolve(src) == symbol {
					return Some(Found {
						kind: FoundKind::Method,
						source: symbol.to_owned(),
						target: method.names.resolve(dst).to_owned(),
						class_name: Some(class.names.resolve(dst).to_owned()),
					});
				}
			}

			for field in &class.fields {
				if field.names.resolve(src) == symbol {
					return Some(Found {
						kind: FoundKind::Field,
						source: symbol.to_owned(),
						target: field.names.resolve(dst).to_owned(),
						class_name: Some(class.names.resolve(dst).to_owned()),
					});
				}
			}
		}

		None
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	fn tree() -> Mappings<3> {
		let mut mappings = Mappings::new(Namespaces::from(["official", "intermediary", "named"]));

		let mut class = ClassMapping::new(Names::from(["a", "net/minecraft/class_1297", "net/minecraft/entity/Entity"]));
		class.methods.push(MethodMapping {
			desc: "()La;".to_owned(),
			names: Names::from(["b", "method_5731", "getVehicle"]),
		});
		class.fields.push(FieldMapping {
			desc: "I".to_owned(),
			names: Names::from(["c", "field_5974", "age"]),
		});
		mappings.add_class(class).unwrap();

		mappings
	}

	#[test]
	fn class_by_simple_name() {
		let mappings = tree();
		let src = mappings.namespaces.namespace("named").unwrap();
		let dst = mappings.namespaces.namespace("intermediary").unwrap();

		let found = mappings.find_symbol("Entity", src, dst).unwrap();
		assert_eq!(found.kind, FoundKind::Class);
		assert_eq!(found.target, "net/minecraft/class_1297");
	}

	#[test]
	fn class_by_dotted_name() {
		let mappings = tree();
		let src = mappings.namespaces.namespace("named").unwrap();
		let dst = mappings.namespaces.namespace("official").unwrap();

		let found = mappings.find_symbol("net.minecraft.entity.Entity", src, dst).unwrap();
		assert_eq!(found.target, "a");
	}

	#[test]
	fn method_with_enclosing_class() {
		let mappings = tree();
		let src = mappings.namespaces.namespace("intermediary").unwrap();
		let dst = mappings.namespaces.namespace("named").unwrap();

		let found = mappings.find_symbol("method_5731", src, dst).unwrap();
		assert_eq!(found.kind, FoundKind::Method);
		assert_eq!(found.target, "getVehicle");
		assert_eq!(found.class_name.as_deref(), Some("net/minecraft/entity/Entity"));
	}

	#[test]
	fn absent_symbol() {
		let mappings = tree();
		let src = mappings.namespaces.namespace("named").unwrap();
		let dst = mappings.namespaces.namespace("official").unwrap();

		assert_eq!(mappings.find_symbol("NoSuchClassAnywhere", src, dst), None);
	}

	#[test]
	fn names_inherit_source() {
		let names: Names<2> = Names::from(["a", ""]);
		let second = Namespace::<2>(1);
		assert_eq!(names.get(second), None);
		assert_eq!(names.resolve(second), "a");
	}

	#[test]
	fn duplicate_class_rejected() {
		let mut mappings: Mappings<2> = Mappings::new(Namespaces::from(["official", "named"]));
		mappings.add_class(ClassMapping::new(Names::from(["a", "A"]))).unwrap();
		assert!(mappings.add_class(ClassMapping::new(Names::from(["a", "B"]))).is_err());
	}
}
