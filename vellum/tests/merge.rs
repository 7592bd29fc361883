use pretty_assertions::assert_eq;
use vellum::Result;
use vellum::tree::Mappings;

#[test]
fn merge() -> Result<()> {
	let proguard = vellum::proguard::read(include_str!("merge_proguard.txt").as_bytes())?;
	let intermediary: Mappings<2> = vellum::tiny_v2::read(include_str!("merge_intermediary.tiny").as_bytes())?;
	let expected = include_str!("merge_output.tiny");

	let output = vellum::merge::merge(&proguard, &intermediary)?;

	output.namespaces.check_that(["intermediary", "named"])?;

	let actual = vellum::tiny_v2::write_string(&output)?;

	assert_eq!(actual, expected, "left: actual, right: expected");

	Ok(())
}

// For a known obfuscated class `a` (named `Entity`, intermediary `class_1297`)
// with an obfuscated method `b`, the output must contain the class line
// `c <intermediary> <named>` with the method nested under it, its descriptor
// rewritten into the intermediary namespace.
#[test]
fn member_descriptors_are_in_intermediary() -> Result<()> {
	let proguard = vellum::proguard::read(include_str!("merge_proguard.txt").as_bytes())?;
	let intermediary: Mappings<2> = vellum::tiny_v2::read(include_str!("merge_intermediary.tiny").as_bytes())?;

	let output = vellum::merge::merge(&proguard, &intermediary)?;

	let class = output.get_class("net/minecraft/class_1297").unwrap();
	let named = output.namespaces.namespace("named").unwrap();

	assert_eq!(class.names.resolve(named), "net/minecraft/world/entity/Entity");

	let vehicle = class.methods.iter().find(|x| x.names.first() == "method_5731").unwrap();
	assert_eq!(vehicle.desc, "()Lnet/minecraft/class_1297;");
	assert_eq!(vehicle.names.resolve(named), "getVehicle");

	// every class reference in every output descriptor resolves in the
	// output tree's source namespace, or points outside the game
	for class in output.classes.values() {
		for method in &class.methods {
			let mut rest = method.desc.as_str();
			while let Some(start) = rest.find('L') {
				let end = rest[start..].find(';').unwrap() + start;
				let name = &rest[start + 1..end];
				assert!(
					output.classes.contains_key(name) || !name.starts_with("net/minecraft/"),
					"descriptor reference {name:?} doesn't resolve"
				);
				rest = &rest[end + 1..];
			}
		}
	}

	Ok(())
}

#[test]
fn unknown_members_fall_back_to_intermediary() -> Result<()> {
	let proguard = vellum::proguard::read(include_str!("merge_proguard.txt").as_bytes())?;
	let intermediary: Mappings<2> = vellum::tiny_v2::read(include_str!("merge_intermediary.tiny").as_bytes())?;

	let output = vellum::merge::merge(&proguard, &intermediary)?;
	let named = output.namespaces.namespace("named").unwrap();

	// class `c` is absent from the proguard map
	let class = output.get_class("net/minecraft/class_9999").unwrap();
	assert_eq!(class.names.resolve(named), "net/minecraft/class_9999");
	assert_eq!(class.methods[0].names.resolve(named), "method_1234");

	Ok(())
}

#[test]
fn rejects_wrong_namespaces() {
	let proguard = vellum::proguard::read("a.b.C -> a:\n".as_bytes()).unwrap();
	let flipped: Mappings<2> = vellum::tiny_v2::read(
		"tiny\t2\t0\tintermediary\tofficial\nc\tnet/minecraft/class_1\ta\n".as_bytes()
	).unwrap();

	assert!(vellum::merge::merge(&proguard, &flipped).is_err());
}
