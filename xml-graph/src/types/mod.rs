//! Runtime types and the mapping between them and serialized names
//!
//! A `TypeRegistry` knows every type that may appear in a graph (`TypeDef`), which names they are
//! serialized as, and how individual fields are named. An `Instantiator` creates empty objects
//! while unmarshalling.

mod def;
mod instantiate;
mod name;
mod registry;

pub use self::{
	def::{
		FieldDef,
		TypeDef,
		TypeKind,
	},
	instantiate::{
		DefaultInstantiator,
		Instantiator,
	},
	name::TypeName,
	registry::TypeRegistry,
};
