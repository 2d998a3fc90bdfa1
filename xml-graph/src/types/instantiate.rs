use crate::{
	errors,
	model::{
		Object,
		ObjectData,
		ObjectRef,
	},
	types::{
		TypeDef,
		TypeKind,
	},
	Result,
};

/// Strategy to create empty objects while unmarshalling
///
/// The created object must not be populated yet: it gets registered for back-references first,
/// and the converter fills in its content afterwards.
pub trait Instantiator: Send + Sync {
	/// Create an empty object of the given type
	fn instantiate(&self, def: &TypeDef) -> Result<ObjectRef>;
}

/// Creates objects with empty content matching the type kind
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultInstantiator;

impl Instantiator for DefaultInstantiator {
	fn instantiate(&self, def: &TypeDef) -> Result<ObjectRef> {
		let data = match def.kind() {
			TypeKind::Struct { .. } => ObjectData::Fields(Vec::new()),
			TypeKind::Collection => ObjectData::Items(Vec::new()),
			TypeKind::Map => ObjectData::Entries(Vec::new()),
			TypeKind::Abstract => {
				return Err(errors::conversion(format!("cannot instantiate abstract type {}", def.name())));
			},
			TypeKind::Basic | TypeKind::Enum { .. } => {
				return Err(errors::conversion(format!("{} is a value type, not an object", def.name())));
			},
		};
		Ok(ObjectRef::new(Object::new(def.name().clone(), data)))
	}
}
