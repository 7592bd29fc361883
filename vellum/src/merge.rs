//! Fuses a ProGuard map with an intermediary tree.
//!
//! The ProGuard map relates `named ⇄ official` and the intermediary tiny
//! relates `official ⇄ intermediary`; chaining the two through the shared
//! obfuscated names yields an `intermediary ⇄ named` tree, which is what the
//! remapper consumes for the second remap pass.

use std::collections::HashMap;
use crate::Result;
use crate::descriptor::rewrite_desc;
use crate::proguard::ProguardMappings;
use crate::tree::{ClassMapping, FieldMapping, Mappings, MethodMapping, Names, Namespaces};

type MemberKey = (String, String, String);

struct MemberIndex {
	/// Keyed by (obf class, obf member, obf descriptor).
	with_desc: HashMap<MemberKey, String>,
	/// Keyed by (obf class, obf member); descriptor-less fallback.
	without_desc: HashMap<(String, String), String>,
}

impl MemberIndex {
	fn lookup(&self, class: &str, member: &str, desc: &str) -> Option<&str> {
		self.with_desc.get(&(class.to_owned(), member.to_owned(), desc.to_owned()))
			.or_else(|| self.without_desc.get(&(class.to_owned(), member.to_owned())))
			.map(|x| x.as_str())
	}
}

/// Merges a ProGuard map (`named ⇄ official`) with an intermediary tree
/// (`official ⇄ intermediary`) into an `[intermediary, named]` tree.
///
/// Every class of the intermediary tree appears in the output; classes and
/// members the ProGuard map doesn't know keep their intermediary name.
/// ProGuard writes member descriptors in named form, so member lookup keys
/// are obfuscated by renaming class references through the map's own
/// `named → official` class table; references to non-game classes fall
/// through unchanged. Output descriptors are in the intermediary namespace,
/// the source namespace of the produced tree.
pub fn merge(proguard: &ProguardMappings, intermediary: &Mappings<2>) -> Result<Mappings<2>> {
	intermediary.namespaces.check_that(["official", "intermediary"])?;

	let cls_named_to_obf: HashMap<&str, &str> = proguard.classes.iter()
		.map(|class| (class.named.as_str(), class.obf.as_str()))
		.collect();
	let cls_obf_to_named: HashMap<&str, &str> = proguard.classes.iter()
		.map(|class| (class.obf.as_str(), class.named.as_str()))
		.collect();

	let obfuscate = |desc: &str| rewrite_desc(desc, |name| {
		cls_named_to_obf.get(name).map(|x| (*x).to_owned())
	});

	let mut fields = MemberIndex { with_desc: HashMap::new(), without_desc: HashMap::new() };
	let mut methods = MemberIndex { with_desc: HashMap::new(), without_desc: HashMap::new() };

	for class in &proguard.classes {
		for field in &class.fields {
			let key = (class.obf.clone(), field.obf.clone(), obfuscate(&field.desc));
			fields.with_desc.insert(key, field.named.clone());
			fields.without_desc.insert((class.obf.clone(), field.obf.clone()), field.named.clone());
		}
		for method in &class.methods {
			let key = (class.obf.clone(), method.obf.clone(), obfuscate(&method.desc));
			methods.with_desc.insert(key, method.named.clone());
			methods.without_desc.insert((class.obf.clone(), method.obf.clone()), method.named.clone());
		}
	}

	// present, checked above; column 0 (official) is reached via `Names::first`
	let inter = intermediary.namespaces.namespace("intermediary")
		.ok_or_else(|| crate::Error::UnknownNamespace("intermediary".to_owned()))?;

	let to_intermediary = |desc: &str| rewrite_desc(desc, |name| {
		intermediary.rename_class(name, inter)
	});

	let mut out = Mappings::new(Namespaces::from(["intermediary", "named"]));

	for class in intermediary.classes.values() {
		let obf = class.names.first();
		let inter_name = class.names.resolve(inter);
		let named_name = cls_obf_to_named.get(obf).copied().unwrap_or(inter_name);

		let mut out_class = ClassMapping::new(Names::from([inter_name, named_name]));

		for field in &class.fields {
			let named = fields.lookup(obf, field.names.first(), &field.desc)
				.unwrap_or_else(|| field.names.resolve(inter));

			out_class.fields.push(FieldMapping {
				desc: to_intermediary(&field.desc),
				names: Names::from([field.names.resolve(inter), named]),
			});
		}

		for method in &class.methods {
			let named = methods.lookup(obf, method.names.first(), &method.desc)
				.unwrap_or_else(|| method.names.resolve(inter));

			out_class.methods.push(MethodMapping {
				desc: to_intermediary(&method.desc),
				names: Names::from([method.names.resolve(inter), named]),
			});
		}

		out.add_class(out_class)?;
	}

	Ok(out)
}
