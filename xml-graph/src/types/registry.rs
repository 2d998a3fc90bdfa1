use crate::{
	errors,
	types::{
		TypeDef,
		TypeKind,
		TypeName,
	},
	Result,
};
use std::{
	borrow::Cow,
	collections::{
		HashMap,
		HashSet,
	},
};

type FieldKey = (TypeName, String);

/// Mapping between serialized names and runtime types
///
/// Holds the known types with their shape, the alias table, default implementations for abstract
/// types and per-field naming rules. It is populated at configuration time and only read while
/// marshalling or unmarshalling.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
	defs: HashMap<TypeName, TypeDef>,
	aliases: HashMap<String, TypeName>,
	canonical: HashMap<TypeName, String>,
	default_impls: HashMap<TypeName, TypeName>,
	field_aliases: HashMap<FieldKey, String>,
	field_names: HashMap<FieldKey, String>,
	omitted: HashSet<FieldKey>,
	attribute_fields: HashSet<FieldKey>,
}

impl Default for TypeRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl TypeRegistry {
	/// Registry without any types
	pub fn empty() -> Self {
		Self {
			defs: HashMap::new(),
			aliases: HashMap::new(),
			canonical: HashMap::new(),
			default_impls: HashMap::new(),
			field_aliases: HashMap::new(),
			field_names: HashMap::new(),
			omitted: HashSet::new(),
			attribute_fields: HashSet::new(),
		}
	}

	/// Registry with the built-in types and their aliases
	///
	/// | type     | alias     |
	/// |----------|-----------|
	/// | `null`   | `null`    |
	/// | `bool`   | `boolean` |
	/// | `i64`    | `int`     |
	/// | `f64`    | `double`  |
	/// | `char`   | `char`    |
	/// | `String` | `string`  |
	/// | `any`    | `any`     |
	/// | `Vec`    | `list`    |
	/// | `Map`    | `map`     |
	pub fn new() -> Self {
		let mut registry = Self::empty();
		let builtins = [
			(TypeName::NULL, "null"),
			(TypeName::BOOL, "boolean"),
			(TypeName::INT, "int"),
			(TypeName::FLOAT, "double"),
			(TypeName::CHAR, "char"),
			(TypeName::STRING, "string"),
		];
		for (ty, alias) in builtins {
			registry.register(TypeDef::new(ty.clone(), TypeKind::Basic));
			registry.alias(alias, ty);
		}
		registry.register(TypeDef::abstract_type(TypeName::ANY));
		registry.alias("any", TypeName::ANY);
		registry.register(TypeDef::collection(TypeName::VEC));
		registry.alias("list", TypeName::VEC);
		registry.register(TypeDef::map(TypeName::MAP));
		registry.alias("map", TypeName::MAP);
		registry
	}

	/// Add (or replace) a type definition
	pub fn register(&mut self, def: TypeDef) {
		tracing::debug!(ty = %def.name(), "registered type");
		let name = def.name().clone();
		self.defs.insert(name.clone(), def);
		self.warn_if_shadowed(&name);
	}

	/// Lookup the definition of a type
	pub fn get(&self, ty: &TypeName) -> Option<&TypeDef> {
		self.defs.get(ty)
	}

	/// Lookup the definition of a type, failing with "unknown type"
	pub fn require(&self, ty: &TypeName) -> Result<&TypeDef> {
		self.defs.get(ty).ok_or_else(|| errors::unknown_type(ty.as_str()))
	}

	/// Registered types
	pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
		self.defs.values()
	}

	/// Let `alias` stand for `ty` in serialized data.
	///
	/// An alias always maps to exactly one type; re-using it for another type replaces the
	/// previous mapping. The most recently registered alias of a type is used when writing,
	/// earlier ones are still accepted when reading.
	pub fn alias(&mut self, alias: impl Into<String>, ty: impl Into<TypeName>) {
		let alias = alias.into();
		let ty = ty.into();
		tracing::debug!(%alias, %ty, "registered alias");
		if let Some(previous) = self.aliases.insert(alias.clone(), ty.clone()) {
			if previous != ty && self.canonical.get(&previous) == Some(&alias) {
				self.canonical.remove(&previous);
			}
		}
		let shadowed = [TypeName::new(alias.as_str()), TypeName::new(alias.replace('.', "::"))];
		self.canonical.insert(ty.clone(), alias);
		for other in shadowed {
			if other != ty && self.defs.contains_key(&other) {
				self.warn_if_shadowed(&other);
			}
		}
	}

	fn warn_if_shadowed(&self, ty: &TypeName) {
		if !self.reads_back_as(&self.serialized_name(ty), ty) {
			tracing::warn!(%ty, "type name is shadowed by an alias of another type; add an alias for it");
		}
	}

	// whether `name` resolves to `ty`
	fn reads_back_as(&self, name: &str, ty: &TypeName) -> bool {
		self.resolve_name(name).map_or(false, |resolved| resolved == *ty)
	}

	/// Name used to serialize a type
	///
	/// Without an alias `::` is written as `.`, unless the dotted name already stands for
	/// another type; then the plain type name is used.
	pub fn serialized_name(&self, ty: &TypeName) -> Cow<'_, str> {
		if let Some(alias) = self.canonical.get(ty) {
			return Cow::Borrowed(alias.as_str());
		}
		if ty.as_str().contains("::") {
			let dotted = ty.as_str().replace("::", ".");
			if !self.aliases.get(&dotted).map_or(false, |other| other != ty) {
				return Cow::Owned(dotted);
			}
		}
		Cow::Owned(ty.as_str().to_owned())
	}

	/// Resolve a serialized name back to a type
	pub fn resolve_name(&self, name: &str) -> Result<TypeName> {
		if let Some(ty) = self.aliases.get(name) {
			return Ok(ty.clone());
		}
		if let Some(def) = self.defs.get(&TypeName::new(name)) {
			return Ok(def.name().clone());
		}
		if name.contains('.') {
			let path = TypeName::new(name.replace('.', "::"));
			if self.defs.contains_key(&path) {
				return Ok(path);
			}
		}
		Err(errors::unknown_type(name))
	}

	/// Use `implementation` when a value of abstract type `ty` has to be created without
	/// explicit type information.
	pub fn add_default_implementation(&mut self, ty: impl Into<TypeName>, implementation: impl Into<TypeName>) {
		self.default_impls.insert(ty.into(), implementation.into());
	}

	/// Type to create for a declared type; the type itself unless a default implementation was
	/// registered.
	pub fn default_implementation(&self, ty: &TypeName) -> TypeName {
		self.default_impls.get(ty).unwrap_or(ty).clone()
	}

	/// Whether a value of type `ty` can be stored where `target` is expected.
	pub fn is_assignable(&self, ty: &TypeName, target: &TypeName) -> bool {
		if ty == target || *target == TypeName::ANY {
			return true;
		}
		let mut visited = HashSet::new();
		let mut pending = vec![ty];
		while let Some(current) = pending.pop() {
			if !visited.insert(current) {
				continue;
			}
			if let Some(def) = self.defs.get(current) {
				for supertype in def.supertypes() {
					if supertype == target {
						return true;
					}
					pending.push(supertype);
				}
			}
		}
		false
	}

	/// Serialize field `field` of `ty` as `alias`
	pub fn alias_field(&mut self, ty: impl Into<TypeName>, field: impl Into<String>, alias: impl Into<String>) {
		let ty = ty.into();
		let field = field.into();
		let alias = alias.into();
		self.field_names.insert((ty.clone(), alias.clone()), field.clone());
		self.field_aliases.insert((ty, field), alias);
	}

	/// Serialized name of a field
	pub fn serialized_field<'a>(&'a self, ty: &TypeName, field: &'a str) -> &'a str {
		self.field_aliases
			.get(&(ty.clone(), field.to_owned()))
			.map(String::as_str)
			.unwrap_or(field)
	}

	/// Field name for a serialized name
	pub fn real_field<'a>(&'a self, ty: &TypeName, serialized: &'a str) -> &'a str {
		self.field_names
			.get(&(ty.clone(), serialized.to_owned()))
			.map(String::as_str)
			.unwrap_or(serialized)
	}

	/// Never write the field; skip it when reading
	pub fn omit_field(&mut self, ty: impl Into<TypeName>, field: impl Into<String>) {
		self.omitted.insert((ty.into(), field.into()));
	}

	/// Whether the field is omitted
	pub fn is_omitted(&self, ty: &TypeName, field: &str) -> bool {
		self.omitted.contains(&(ty.clone(), field.to_owned()))
	}

	/// Write the field as attribute of its owner node
	pub fn use_attribute_for(&mut self, ty: impl Into<TypeName>, field: impl Into<String>) {
		self.attribute_fields.insert((ty.into(), field.into()));
	}

	/// Whether the field is written as attribute
	pub fn is_attribute(&self, ty: &TypeName, field: &str) -> bool {
		self.attribute_fields.contains(&(ty.clone(), field.to_owned()))
	}
}
