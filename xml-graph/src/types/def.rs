use crate::types::TypeName;
use std::borrow::Cow;

/// Declared field of a struct type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
	/// Field name (as used in `Object::field`)
	pub name: Cow<'static, str>,
	/// Declared (static) type of the field
	pub ty: TypeName,
}

/// Shape of a type; decides which built-in converter handles it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
	/// Immutable value type (numbers, strings, ...); never reference-tracked
	Basic,
	/// Can't be instantiated; only used as declared type or supertype
	Abstract,
	/// Object with named fields in declaration order
	Struct {
		/// Fields in declaration order
		fields: Vec<FieldDef>,
	},
	/// Object holding an ordered list of items
	Collection,
	/// Object holding ordered key/value entries
	Map,
	/// Value type with a fixed set of named constants
	Enum {
		/// Valid constant names
		variants: Vec<Cow<'static, str>>,
	},
}

/// Description of a type known to a `TypeRegistry`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
	name: TypeName,
	kind: TypeKind,
	supertypes: Vec<TypeName>,
}

impl TypeDef {
	/// Generic constructor
	pub fn new(name: impl Into<TypeName>, kind: TypeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			supertypes: Vec::new(),
		}
	}

	/// Struct type without fields; add them with `field`.
	pub fn structure(name: impl Into<TypeName>) -> Self {
		Self::new(name, TypeKind::Struct { fields: Vec::new() })
	}

	/// Abstract type (interface)
	pub fn abstract_type(name: impl Into<TypeName>) -> Self {
		Self::new(name, TypeKind::Abstract)
	}

	/// Collection type
	pub fn collection(name: impl Into<TypeName>) -> Self {
		Self::new(name, TypeKind::Collection)
	}

	/// Map type
	pub fn map(name: impl Into<TypeName>) -> Self {
		Self::new(name, TypeKind::Map)
	}

	/// Enum type with the given constants
	pub fn enumeration<I, V>(name: impl Into<TypeName>, variants: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Cow<'static, str>>,
	{
		Self::new(
			name,
			TypeKind::Enum {
				variants: variants.into_iter().map(Into::into).collect(),
			},
		)
	}

	/// Append a field (only meaningful for struct types)
	pub fn field(mut self, name: impl Into<Cow<'static, str>>, ty: impl Into<TypeName>) -> Self {
		if let TypeKind::Struct { fields } = &mut self.kind {
			fields.push(FieldDef {
				name: name.into(),
				ty: ty.into(),
			});
		}
		self
	}

	/// Declare a supertype
	pub fn implements(mut self, supertype: impl Into<TypeName>) -> Self {
		self.supertypes.push(supertype.into());
		self
	}

	/// Name of the type
	pub fn name(&self) -> &TypeName {
		&self.name
	}

	/// Shape of the type
	pub fn kind(&self) -> &TypeKind {
		&self.kind
	}

	/// Direct supertypes
	pub fn supertypes(&self) -> &[TypeName] {
		&self.supertypes
	}

	/// Declared fields; empty for non-struct types
	pub fn fields(&self) -> &[FieldDef] {
		match &self.kind {
			TypeKind::Struct { fields } => fields,
			_ => &[],
		}
	}

	/// Lookup declared field by name
	pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
		self.fields().iter().find(|f| f.name == name)
	}

	/// Whether the type can be instantiated as an object
	pub fn is_abstract(&self) -> bool {
		matches!(self.kind, TypeKind::Abstract)
	}
}
