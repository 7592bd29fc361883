use pretty_assertions::assert_eq;
use vellum::Result;
use vellum::tree::Mappings;

#[test]
fn round_trip() -> Result<()> {
	let input = include_str!("round_trip.tiny");

	let mappings: Mappings<3> = vellum::tiny_v2::read(input.as_bytes())?;
	mappings.namespaces.check_that(["official", "intermediary", "named"])?;

	let actual = vellum::tiny_v2::write_string(&mappings)?;

	assert_eq!(actual, input, "left: actual, right: expected");

	Ok(())
}

#[test]
fn parameters_and_comments_are_skipped() -> Result<()> {
	let input = include_str!("with_parameters.tiny");

	let mappings: Mappings<3> = vellum::tiny_v2::read(input.as_bytes())?;

	assert_eq!(mappings.classes.len(), 1);
	let class = mappings.get_class("a").unwrap();
	assert_eq!(class.methods.len(), 1);
	assert_eq!(class.fields.len(), 1);

	Ok(())
}

#[test]
fn empty_name_inherits_source() -> Result<()> {
	let input = "tiny\t2\t0\tofficial\tnamed\nc\ta\t\n\tm\t()V\tb\t\n";

	let mappings: Mappings<2> = vellum::tiny_v2::read(input.as_bytes())?;
	let named = mappings.namespaces.namespace("named").unwrap();

	let class = mappings.get_class("a").unwrap();
	assert_eq!(class.names.get(named), None);
	assert_eq!(class.names.resolve(named), "a");
	assert_eq!(class.methods[0].names.resolve(named), "b");

	// and it round-trips as written
	assert_eq!(vellum::tiny_v2::write_string(&mappings)?, input);

	Ok(())
}

#[test]
fn rejects_wrong_header() {
	let input = "tiny	1	0	official	named\nc	a	b\n";
	assert!(vellum::tiny_v2::read::<2>(input.as_bytes()).is_err());
}

#[test]
fn rejects_wrong_namespace_count() {
	let input = "tiny	2	0	official	intermediary	named\nc	a	b	c\n";
	assert!(vellum::tiny_v2::read::<2>(input.as_bytes()).is_err());
}

#[test]
fn rejects_member_before_class() {
	let input = "tiny	2	0	official	named\n	m	()V	a	b\n";
	assert!(vellum::tiny_v2::read::<2>(input.as_bytes()).is_err());
}
