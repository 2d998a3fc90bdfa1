//! Fixtures and end-to-end tests of the whole pipeline

use crate::{
	errors::ErrorKind,
	isomorphic,
	security::{
		AnyTypePermission,
		ExplicitTypePermission,
		TypeHierarchyPermission,
	},
	types::{
		DefaultInstantiator,
		Instantiator,
	},
	Config,
	Engine,
	EnumValue,
	ObjectRef,
	ReferenceMode,
	Result,
	TypeDef,
	TypeName,
	Value,
};
use std::sync::{
	atomic::{
		AtomicUsize,
		Ordering,
	},
	Arc,
};
use tracing_test::traced_test;

fn demo_types(engine: &mut Engine) {
	engine.register_type(
		TypeDef::structure("demo::Person")
			.field("name", "String")
			.field("age", "i64")
			.field("child", "demo::Child"),
	);
	engine.register_type(TypeDef::structure("demo::Child").field("label", "String"));
	engine.alias("person", "demo::Person");
	engine.alias_field("demo::Person", "name", "n");

	engine.register_type(TypeDef::structure("demo::Pair").field("first", "Vec").field("second", "Vec"));
	engine.alias("pair", "demo::Pair");

	engine.register_type(TypeDef::structure("demo::Node").field("name", "String").field("next", "demo::Node"));
	engine.alias("node", "demo::Node");

	engine.register_type(TypeDef::abstract_type("demo::Shape"));
	engine.register_type(TypeDef::structure("demo::Circle").field("radius", "f64").implements("demo::Shape"));
	engine.register_type(TypeDef::structure("demo::Square").field("side", "f64").implements("demo::Shape"));
	engine.register_type(
		TypeDef::structure("demo::Drawing")
			.field("shapes", "Vec")
			.field("main", "demo::Shape")
			.field("note", "any"),
	);
	engine.alias("circle", "demo::Circle");
	engine.alias("square", "demo::Square");
	engine.alias("drawing", "demo::Drawing");
	engine.add_default_implementation("demo::Shape", "demo::Circle");

	engine.register_type(TypeDef::enumeration("demo::Color", ["Red", "Green", "Blue"]));
	engine.alias("color", "demo::Color");
	engine.register_type(
		TypeDef::structure("demo::Pixel")
			.field("x", "i64")
			.field("color", "demo::Color")
			.field("tag", "String")
			.field("cache", "String"),
	);
	engine.alias("pixel", "demo::Pixel");
	engine.use_attribute_for("demo::Pixel", "x");
	engine.use_attribute_for("demo::Pixel", "color");
	engine.omit_field("demo::Pixel", "cache");

	engine.register_type(TypeDef::structure("demo::Secret").field("key", "String"));
	engine.alias("secret", "demo::Secret");
}

fn engine_with(config: Config) -> Engine {
	let mut engine = Engine::with_config(config);
	demo_types(&mut engine);
	engine.allow_types_by_wildcard(["demo::*"]).unwrap();
	engine.deny(ExplicitTypePermission::new(["demo::Secret"]));
	engine
}

fn engine() -> Engine {
	engine_with(Config::default())
}

fn joe() -> Value {
	let child = ObjectRef::structure("demo::Child", vec![("label", Value::from("walnes"))]);
	ObjectRef::structure(
		"demo::Person",
		vec![
			("name", Value::from("joe")),
			("age", Value::Int(8)),
			("child", Value::from(child)),
		],
	)
	.into()
}

fn shared_pair() -> Value {
	let list = ObjectRef::collection(TypeName::VEC, vec![Value::from("x")]);
	ObjectRef::structure("demo::Pair", vec![("first", Value::from(&list)), ("second", Value::from(&list))]).into()
}

fn cycle() -> Value {
	let a = ObjectRef::structure("demo::Node", vec![("name", Value::from("a"))]);
	let b = ObjectRef::structure("demo::Node", vec![("name", Value::from("b")), ("next", Value::from(&a))]);
	a.borrow_mut().set_field("next", b.into());
	a.into()
}

fn field(value: &Value, name: &str) -> Value {
	value
		.as_object()
		.and_then(|o| o.borrow().field(name).cloned())
		.unwrap_or(Value::Null)
}

fn object(value: &Value) -> ObjectRef {
	value.as_object().cloned().expect("object")
}

fn round_trip(engine: &Engine, value: &Value) -> Value {
	let xml = engine.to_xml(value).unwrap();
	let back = engine.from_xml(&xml).unwrap();
	assert!(isomorphic(value, &back), "round trip through {} changed the graph", xml);
	back
}

#[test]
fn person_document() {
	let engine = engine();
	let xml = engine.to_xml(&joe()).unwrap();
	assert_eq!(xml, "<person><n>joe</n><age>8</age><child><label>walnes</label></child></person>");
	assert!(isomorphic(&engine.from_xml(&xml).unwrap(), &joe()));
}

#[test]
fn null_fields_round_trip() {
	let engine = engine();
	let person: Value = ObjectRef::structure(
		"demo::Person",
		vec![("name", Value::from("joe")), ("age", Value::Int(8)), ("child", Value::Null)],
	)
	.into();
	let xml = engine.to_xml(&person).unwrap();
	assert_eq!(xml, "<person><n>joe</n><age>8</age></person>");
	let back = round_trip(&engine, &person);
	assert!(field(&back, "child").is_null());
}

#[test]
fn cdata_is_text() {
	let engine = engine();
	let value = engine.from_xml("<string><![CDATA[a<b & c]]></string>").unwrap();
	assert_eq!(value.as_str(), Some("a<b & c"));

	let child = engine
		.from_xml("<demo.Child><label><![CDATA[<x>]]> &amp; y</label></demo.Child>")
		.unwrap();
	assert_eq!(field(&child, "label").as_str(), Some("<x> & y"));
}

#[test]
fn shared_list_by_relative_path() {
	let engine = engine();
	let xml = engine.to_xml(&shared_pair()).unwrap();
	assert_eq!(
		xml,
		r#"<pair><first><string>x</string></first><second reference="../first"/></pair>"#
	);
	let back = round_trip(&engine, &shared_pair());
	assert!(object(&field(&back, "first")).ptr_eq(&object(&field(&back, "second"))));
}

#[test]
fn shared_list_by_id() {
	let engine = engine_with(Config::default().with_reference_mode(ReferenceMode::Id));
	let xml = engine.to_xml(&shared_pair()).unwrap();
	assert_eq!(
		xml,
		r#"<pair id="1"><first id="2"><string>x</string></first><second reference="2"/></pair>"#
	);
	let back = round_trip(&engine, &shared_pair());
	assert!(object(&field(&back, "first")).ptr_eq(&object(&field(&back, "second"))));
}

#[test]
fn path_reference_forms() {
	let forms = [
		(ReferenceMode::RelativePath, "../first"),
		(ReferenceMode::AbsolutePath, "/pair/first"),
		(ReferenceMode::SingleNodeRelativePath, "../first[1]"),
		(ReferenceMode::SingleNodeAbsolutePath, "/pair[1]/first[1]"),
	];
	for (mode, reference) in forms {
		let engine = engine_with(Config::default().with_reference_mode(mode));
		let root = engine.to_tree(&shared_pair()).unwrap();
		let second = root.child("second").unwrap();
		assert_eq!(second.attribute("reference"), Some(reference), "{:?}", mode);
		assert!(second.children.is_empty());

		let back = engine.from_tree(&root).unwrap();
		assert!(object(&field(&back, "first")).ptr_eq(&object(&field(&back, "second"))));
	}
}

#[test]
fn cycles_resolve_to_the_same_instance() {
	let engine = engine();
	let xml = engine.to_xml(&cycle()).unwrap();
	assert_eq!(
		xml,
		r#"<node><name>a</name><next><name>b</name><next reference="../.."/></next></node>"#
	);
	let a = round_trip(&engine, &cycle());
	let b = field(&a, "next");
	assert_eq!(field(&b, "name").as_str(), Some("b"));
	assert!(object(&field(&b, "next")).ptr_eq(&object(&a)));

	let engine = engine_with(Config::default().with_reference_mode(ReferenceMode::Id));
	let a = round_trip(&engine, &cycle());
	assert!(object(&field(&field(&a, "next"), "next")).ptr_eq(&object(&a)));
}

#[test]
fn without_references() {
	let engine = engine_with(Config::default().with_reference_mode(ReferenceMode::None));
	let err = engine.to_xml(&cycle()).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::CircularReference { ty } if *ty == "demo::Node"));

	// shared objects are written twice and read back as copies
	let xml = engine.to_xml(&shared_pair()).unwrap();
	assert_eq!(
		xml,
		"<pair><first><string>x</string></first><second><string>x</string></second></pair>"
	);
	let back = engine.from_xml(&xml).unwrap();
	assert!(!object(&field(&back, "first")).ptr_eq(&object(&field(&back, "second"))));
	assert!(!isomorphic(&back, &shared_pair()));
}

#[test]
fn type_discriminators() {
	let engine = engine();
	let circle = ObjectRef::structure("demo::Circle", vec![("radius", Value::Float(1.5))]);
	let square = ObjectRef::structure("demo::Square", vec![("side", Value::Float(2.0))]);
	let drawing: Value = ObjectRef::structure(
		"demo::Drawing",
		vec![
			("shapes", ObjectRef::collection(TypeName::VEC, vec![Value::from(&circle)]).into()),
			("main", Value::from(&square)),
			("note", Value::Int(5)),
		],
	)
	.into();
	let xml = engine.to_xml(&drawing).unwrap();
	assert_eq!(
		xml,
		concat!(
			r#"<drawing><shapes><circle><radius>1.5</radius></circle></shapes>"#,
			r#"<main class="square"><side>2</side></main><note class="int">5</note></drawing>"#,
		)
	);
	round_trip(&engine, &drawing);

	// the default implementation needs no discriminator
	let plain: Value = ObjectRef::structure("demo::Drawing", vec![("main", Value::from(&circle))]).into();
	let xml = engine.to_xml(&plain).unwrap();
	assert_eq!(xml, "<drawing><main><radius>1.5</radius></main></drawing>");
	let back = round_trip(&engine, &plain);
	assert_eq!(field(&back, "main").type_name(), "demo::Circle");
}

#[test]
fn attributes_and_omitted_fields() {
	let engine = engine();
	let pixel: Value = ObjectRef::structure(
		"demo::Pixel",
		vec![
			("x", Value::Int(3)),
			("color", EnumValue::new("demo::Color", "Red").into()),
			("tag", Value::from("t")),
			("cache", Value::from("stale")),
		],
	)
	.into();
	let xml = engine.to_xml(&pixel).unwrap();
	assert_eq!(xml, r#"<pixel x="3" color="Red"><tag>t</tag></pixel>"#);

	let back = engine.from_xml(r#"<pixel color="Blue" x="-1"><tag>t</tag><cache>ignored</cache></pixel>"#).unwrap();
	assert_eq!(field(&back, "x").as_int(), Some(-1));
	assert!(matches!(field(&back, "color"), Value::Enum(e) if e.variant == "Blue"));
	assert!(field(&back, "cache").is_null());

	let err = engine.from_xml(r#"<pixel color="Purple"/>"#).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Conversion { .. }));
}

#[test]
fn maps_enums_and_nulls() {
	let engine = engine();
	let map: Value = ObjectRef::map(
		TypeName::MAP,
		vec![
			(Value::from("a"), Value::Int(1)),
			(Value::from("b"), EnumValue::new("demo::Color", "Green").into()),
			(Value::Char('c'), Value::Bool(true)),
		],
	)
	.into();
	let xml = engine.to_xml(&map).unwrap();
	assert_eq!(
		xml,
		concat!(
			"<map><entry><string>a</string><int>1</int></entry>",
			"<entry><string>b</string><color>Green</color></entry>",
			"<entry><char>c</char><boolean>true</boolean></entry></map>",
		)
	);
	round_trip(&engine, &map);

	let list: Value = ObjectRef::collection(TypeName::VEC, vec![Value::from("x"), Value::Null, Value::Float(0.5)]).into();
	let xml = engine.to_xml(&list).unwrap();
	assert_eq!(xml, "<list><string>x</string><null/><double>0.5</double></list>");
	round_trip(&engine, &list);
}

#[test]
fn text_is_escaped() {
	let engine = engine();
	let child: Value = ObjectRef::structure("demo::Child", vec![("label", Value::from("<a & b>"))]).into();
	let xml = engine.to_xml(&child).unwrap();
	assert_eq!(xml, "<demo.Child><label>&lt;a &amp; b&gt;</label></demo.Child>");
	round_trip(&engine, &child);
}

#[test]
#[traced_test]
fn unknown_types_are_forbidden_by_default() {
	let mut engine = Engine::new();
	demo_types(&mut engine);
	let err = engine.from_xml("<person><n>joe</n></person>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Forbidden { ty } if *ty == "demo::Person"));
	assert!(logs_contain("type not allowed"));

	// builtin types are allowed
	let value = engine.from_xml("<list><int>1</int></list>").unwrap();
	assert_eq!(object(&value).borrow().items().len(), 1);
}

#[test]
#[traced_test]
fn deny_overrides_allow() {
	let engine = engine();
	let err = engine.from_xml("<secret><key>k</key></secret>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Forbidden { ty } if *ty == "demo::Secret"));
	assert!(logs_contain("type explicitly denied"));

	// also when hidden behind a discriminator
	let err = engine
		.from_xml(r#"<drawing><note class="secret"><key>k</key></note></drawing>"#)
		.unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Forbidden { .. }));
	assert_eq!(err.context_value("path"), Some("/drawing/note"));
}

/// Counts instantiations
struct Counting(Arc<AtomicUsize>);

impl Instantiator for Counting {
	fn instantiate(&self, def: &TypeDef) -> Result<ObjectRef> {
		self.0.fetch_add(1, Ordering::SeqCst);
		DefaultInstantiator.instantiate(def)
	}
}

#[test]
fn rejected_types_are_never_instantiated() {
	let count = Arc::new(AtomicUsize::new(0));
	let mut engine = engine();
	engine.set_instantiator(Counting(count.clone()));
	assert!(engine.from_xml("<secret/>").is_err());
	assert_eq!(count.load(Ordering::SeqCst), 0);

	engine.from_xml("<person><n>joe</n></person>").unwrap();
	assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn any_type_permission() {
	let mut engine = Engine::new();
	demo_types(&mut engine);
	engine.allow(AnyTypePermission);
	assert!(isomorphic(&engine.from_xml(&engine.to_xml(&joe()).unwrap()).unwrap(), &joe()));
}

#[test]
fn type_hierarchy_permission() {
	let mut engine = Engine::new();
	demo_types(&mut engine);
	engine.allow_types(["demo::Drawing"]);
	engine.allow(TypeHierarchyPermission::new("demo::Shape"));
	let value = engine
		.from_xml(r#"<drawing><main class="square"><side>1</side></main></drawing>"#)
		.unwrap();
	assert_eq!(field(&value, "main").type_name(), "demo::Square");

	let err = engine.from_xml(r#"<drawing><note class="pixel"/></drawing>"#).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Forbidden { ty } if *ty == "demo::Pixel"));
}

#[test]
fn duplicate_field() {
	let err = engine().from_xml("<person><n>a</n><n>b</n></person>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::DuplicateField { field, .. } if field == "name"));
}

#[test]
fn invalid_reference() {
	let err = engine()
		.from_xml(r#"<pair><first reference="../nothing"/></pair>"#)
		.unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::InvalidReference { reference } if reference == "../nothing"));
	assert_eq!(err.context_value("path"), Some("/pair/first"));
	assert_eq!(err.context_value("type"), Some("Vec"));

	let engine = engine_with(Config::default().with_reference_mode(ReferenceMode::Id));
	let err = engine.from_xml(r#"<pair><first reference="7"/></pair>"#).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::InvalidReference { .. }));
}

#[test]
fn unknown_type_names() {
	let engine = engine();
	let err = engine.from_xml("<demo.Nope/>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::UnknownType { name } if name == "demo.Nope"));

	let err = engine.from_xml(r#"<drawing><note class="nope"/></drawing>"#).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::UnknownType { name } if name == "nope"));
	assert_eq!(err.context_value("path"), Some("/drawing/note"));
}

#[test]
fn unknown_elements() {
	let input = "<person><n>joe</n><hobby><x/></hobby><age>8</age></person>";
	let err = engine().from_xml(input).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::UnknownField { field, .. } if field == "hobby"));

	let engine = engine_with(Config::default().with_ignore_unknown_elements(true));
	let value = engine.from_xml(input).unwrap();
	assert_eq!(field(&value, "age").as_int(), Some(8));
}

#[test]
fn malformed_input() {
	let engine = engine();
	let err = engine.from_xml("<person><n>joe</person>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Xml(_)));
	let err = engine.from_xml("<person><age>eight</age></person>").unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::Conversion { .. }));
	assert_eq!(err.context_value("path"), Some("/person/age"));
}

#[test]
fn sibling_indices_in_references() {
	let engine = engine();
	let shared = ObjectRef::structure("demo::Child", vec![("label", Value::from("s"))]);
	let list: Value = ObjectRef::collection(
		TypeName::VEC,
		vec![
			ObjectRef::structure("demo::Child", vec![("label", Value::from("a"))]).into(),
			Value::from(&shared),
			Value::from(&shared),
		],
	)
	.into();
	let root = engine.to_tree(&list).unwrap();
	assert_eq!(root.children[2].attribute("reference"), Some("../demo.Child[2]"));
	let back = engine.from_tree(&root).unwrap();
	let items = object(&back).borrow().items().to_vec();
	assert!(object(&items[1]).ptr_eq(&object(&items[2])));
	assert!(!object(&items[0]).ptr_eq(&object(&items[1])));
}

#[test]
fn formatted_output() {
	let engine = engine_with(Config::default().with_indent(2).with_xml_declaration(true));
	let xml = engine.to_xml(&joe()).unwrap();
	assert!(xml.starts_with("<?xml"));
	assert!(xml.contains("\n  <n>joe</n>"));
	round_trip(&engine, &joe());
	round_trip(&engine, &shared_pair());
}

#[test]
fn write_to_stream() {
	let engine = engine();
	let out = engine.to_writer(&joe(), Vec::new()).unwrap();
	let back = engine.from_reader(&out[..]).unwrap();
	assert!(isomorphic(&back, &joe()));
}

#[test]
fn shared_engine_across_threads() {
	let engine = engine();
	std::thread::scope(|s| {
		for i in 0..4 {
			let engine = &engine;
			s.spawn(move || {
				let pair = shared_pair();
				for _ in 0..i + 1 {
					let back = round_trip(engine, &pair);
					assert!(object(&field(&back, "first")).ptr_eq(&object(&field(&back, "second"))));
				}
			});
		}
	});
}

#[test]
fn custom_converter_overrides_builtin() {
	use crate::{
		converters::{
			Converter,
			Priority,
		},
		core::{
			MarshallingContext,
			UnmarshallingContext,
		},
		types::TypeRegistry,
	};

	/// Writes booleans as `yes`/`no`
	struct YesNo;

	impl Converter for YesNo {
		fn can_convert(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
			*ty == TypeName::BOOL
		}

		fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()> {
			let text = if matches!(value, Value::Bool(true)) { "yes" } else { "no" };
			ctx.writer().set_value(text)
		}

		fn unmarshal(&self, _ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
			Ok(Value::Bool(ctx.reader().value()? == "yes"))
		}
	}

	let mut engine = engine();
	engine.register_converter(YesNo, Priority::VERY_HIGH);
	let list: Value = ObjectRef::collection(TypeName::VEC, vec![Value::Bool(true), Value::Bool(false)]).into();
	assert_eq!(
		engine.to_xml(&list).unwrap(),
		"<list><boolean>yes</boolean><boolean>no</boolean></list>"
	);
	round_trip(&engine, &list);
}
