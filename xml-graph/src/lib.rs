#![cfg_attr(doc_cfg, feature(doc_cfg))]
#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/xml-graph/0.1.0")]
//! This library marshals object graphs to XML (or any other tree of named nodes) and back,
//! preserving shared and circular references.
//!
//! Rust has no runtime reflection, so graphs are built from a small dynamic model (see
//! [`model`]): basic values are handled by value, objects live behind shared [`ObjectRef`]
//! handles whose identity (not equality) decides whether two occurrences are "the same" object.
//! The shape of every object type is described in a [`TypeRegistry`], which also maps types to
//! the names used in serialized data.
//!
//! The engine walks the graph depth-first and delegates the content of each node to a
//! [`Converter`](converters::Converter) picked by type. An object written a second time is
//! replaced by a reference marker (a path to or the id of its first occurrence); when reading,
//! objects are registered before their content is read, so cycles resolve to the partially
//! built instance.
//!
//! Unmarshalling is guarded by a [security gate](security): a type must be explicitly allowed
//! before it is created from input.
//!
//! ```
//! use xml_graph::{Engine, ObjectRef, TypeDef, Value};
//!
//! let mut engine = Engine::new();
//! engine.register_type(TypeDef::structure("demo::Person").field("name", "String").field("age", "i64"));
//! engine.alias("person", "demo::Person");
//! engine.allow_types(["demo::Person"]);
//!
//! let joe = ObjectRef::structure("demo::Person", vec![("name", Value::from("joe")), ("age", Value::Int(8))]);
//! let xml = engine.to_xml(&joe.into())?;
//! assert_eq!(xml, "<person><name>joe</name><age>8</age></person>");
//!
//! let back = engine.from_xml(&xml)?;
//! assert_eq!(back.as_object().unwrap().borrow().field("age").and_then(Value::as_int), Some(8));
//! # Ok::<(), xml_graph::Error>(())
//! ```
//!
//! For the following XML handling crates adaptors are included if enabled through the equally
//! named features:
//! - [`quick-xml`](https://crates.io/crates/quick-xml) (default)

pub mod converters;
pub mod core;
pub mod engine;
pub mod errors;
pub mod io;
pub mod model;
pub mod security;
pub mod types;

/// Result alias with our error type included
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "quick-xml")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "quick-xml")))]
pub mod quick_xml;

#[cfg(test)]
mod test_graph;

pub use self::{
	core::ReferenceMode,
	engine::{
		Config,
		Engine,
	},
	errors::{
		Error,
		ErrorKind,
	},
	model::{
		isomorphic,
		EnumValue,
		ObjectRef,
		Value,
	},
	types::{
		TypeDef,
		TypeName,
		TypeRegistry,
	},
};

#[cfg(test)]
mod test {
	#[test]
	fn html_root_url() {
		version_sync::assert_html_root_url_updated!("src/lib.rs");
	}

	#[test]
	fn readme_deps() {
		version_sync::assert_markdown_deps_updated!("README.md");
	}
}
