//! JVM descriptor handling.
//!
//! Descriptors embed class names as `L<name>;` references. When a descriptor
//! moves from one namespace to another, every such reference must be renamed
//! while primitive codes and array markers pass through untouched.

/// Rewrites every `L…;` class reference of a field or method descriptor.
///
/// `rename` returns the new name for a class, or `None` to keep it unchanged
/// (references into non-game code like `java/lang/String` fall through).
///
/// ```
/// let renamed = vellum::descriptor::rewrite_desc("(ILa;[La;)Ljava/lang/String;", |name| {
/// 	(name == "a").then(|| "net/minecraft/class_1297".to_owned())
/// });
/// assert_eq!(renamed, "(ILnet/minecraft/class_1297;[Lnet/minecraft/class_1297;)Ljava/lang/String;");
/// ```
pub fn rewrite_desc(desc: &str, rename: impl Fn(&str) -> Option<String>) -> String {
	let mut out = String::with_capacity(desc.len());
	let mut rest = desc;

	while let Some(start) = rest.find('L') {
		let (before, reference) = rest.split_at(start);
		out.push_str(before);

		match reference[1..].find(';') {
			Some(end) => {
				let name = &reference[1..end + 1];
				out.push('L');
				match rename(name) {
					Some(renamed) => out.push_str(&renamed),
					None => out.push_str(name),
				}
				out.push(';');
				rest = &reference[end + 2..];
			},
			None => {
				// unterminated reference, keep the tail as-is
				out.push_str(reference);
				return out;
			},
		}
	}

	out.push_str(rest);
	out
}

/// Converts a java source type as written in ProGuard maps (`int`, `boolean[]`,
/// `com.mojang.math.Axis`) into its JVM descriptor encoding.
pub fn java_type_to_desc(ty: &str) -> String {
	let mut array_dimensions = 0;
	let mut element = ty;
	while let Some(stripped) = element.strip_suffix("[]") {
		element = stripped;
		array_dimensions += 1;
	}

	let element_desc = match element {
		"boolean" => "Z".to_owned(),
		"byte" => "B".to_owned(),
		"char" => "C".to_owned(),
		"short" => "S".to_owned(),
		"int" => "I".to_owned(),
		"long" => "J".to_owned(),
		"float" => "F".to_owned(),
		"double" => "D".to_owned(),
		"void" => "V".to_owned(),
		class => format!("L{};", class.replace('.', "/")),
	};

	format!("{}{}", "[".repeat(array_dimensions), element_desc)
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::*;

	#[test]
	fn primitives_pass_through() {
		assert_eq!(rewrite_desc("(IJZ)V", |_| Some("x".to_owned())), "(IJZ)V");
	}

	#[test]
	fn unknown_classes_kept() {
		assert_eq!(
			rewrite_desc("(Ljava/lang/String;)V", |_| None),
			"(Ljava/lang/String;)V"
		);
	}

	#[test]
	fn arrays_and_references() {
		assert_eq!(
			rewrite_desc("([[La;I)Lb;", |name| match name {
				"a" => Some("x/A".to_owned()),
				"b" => Some("y/B".to_owned()),
				_ => None,
			}),
			"([[Lx/A;I)Ly/B;"
		);
	}

	#[test]
	fn rewrite_is_invertible() {
		let forward = |name: &str| (name == "a").then(|| "b".to_owned());
		let backward = |name: &str| (name == "b").then(|| "a".to_owned());

		for desc in ["La;", "([La;J)La;", "(ILjava/util/List;)[[La;", "()V"] {
			assert_eq!(rewrite_desc(&rewrite_desc(desc, forward), backward), desc);
		}
	}

	#[test]
	fn java_types() {
		assert_eq!(java_type_to_desc("boolean"), "Z");
		assert_eq!(java_type_to_desc("void"), "V");
		assert_eq!(java_type_to_desc("int[]"), "[I");
		assert_eq!(java_type_to_desc("java.lang.String[][]"), "[[Ljava/lang/String;");
		assert_eq!(java_type_to_desc("net.minecraft.world.entity.Entity"), "Lnet/minecraft/world/entity/Entity;");
	}
}
