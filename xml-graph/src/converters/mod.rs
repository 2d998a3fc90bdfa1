//! Converters read and write values of specific types
//!
//! A converter writes the content of a node whose start was already written (and removes nothing
//! but its own content when reading); node names, type discriminators and reference markers are
//! handled by the marshalling contexts. The `ConverterRegistry` selects a converter per runtime
//! type.

mod basic;
mod collection;
mod enums;
mod lookup;
mod map;
mod null;
mod reflective;

pub use self::{
	basic::{
		BasicConverter,
		Primitive,
	},
	collection::CollectionConverter,
	enums::EnumConverter,
	lookup::{
		ConverterRegistry,
		Priority,
	},
	map::MapConverter,
	null::NullConverter,
	reflective::ReflectiveConverter,
};

use crate::{
	core::{
		MarshallingContext,
		UnmarshallingContext,
	},
	model::Value,
	types::{
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// Reads and writes values of the types it accepts
pub trait Converter: Send + Sync {
	/// Name used in log messages
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Whether values of runtime type `ty` are handled by this converter
	fn can_convert(&self, ty: &TypeName, types: &TypeRegistry) -> bool;

	/// Write the content of the current node
	fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()>;

	/// Read the content of the current node, building a value of type `ty`
	///
	/// Objects should be created through `UnmarshallingContext::new_instance` so that nested
	/// references to them can be resolved while their content is read.
	fn unmarshal(&self, ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value>;

	/// Text form of the values, if there is one
	///
	/// Only converters providing this can be used for fields written as attributes.
	fn single_value(&self) -> Option<&dyn SingleValueConverter> {
		None
	}
}

/// Converts values to and from a single text
pub trait SingleValueConverter: Send + Sync {
	/// Text for a value
	fn to_text(&self, value: &Value) -> Result<String>;

	/// Value of type `ty` from text
	fn from_text(&self, ty: &TypeName, text: &str, types: &TypeRegistry) -> Result<Value>;
}

/// Installs the built-in converters
///
/// The reflective converter accepts everything and is registered with the lowest priority.
pub fn register_defaults(registry: &mut ConverterRegistry) {
	registry.register(NullConverter, Priority::VERY_HIGH);
	registry.register(BasicConverter::<bool>::new(), Priority::NORMAL);
	registry.register(BasicConverter::<i64>::new(), Priority::NORMAL);
	registry.register(BasicConverter::<f64>::new(), Priority::NORMAL);
	registry.register(BasicConverter::<char>::new(), Priority::NORMAL);
	registry.register(BasicConverter::<String>::new(), Priority::NORMAL);
	registry.register(EnumConverter, Priority::NORMAL);
	registry.register(CollectionConverter, Priority::NORMAL);
	registry.register(MapConverter, Priority::NORMAL);
	registry.register(ReflectiveConverter, Priority::VERY_LOW);
}
