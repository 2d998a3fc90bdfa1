use crate::{
	errors,
	security::TypePermission,
	types::{
		TypeKind,
		TypeName,
		TypeRegistry,
	},
	Result,
};
use regex::Regex;
use std::collections::HashSet;

/// Matches every type
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyTypePermission;

impl TypePermission for AnyTypePermission {
	fn allows(&self, _ty: &TypeName, _types: &TypeRegistry) -> bool {
		true
	}
}

/// Matches the null type
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPermission;

impl TypePermission for NullPermission {
	fn allows(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		*ty == TypeName::NULL
	}
}

/// Matches basic value types (numbers, strings, ...)
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitiveTypePermission;

impl TypePermission for PrimitiveTypePermission {
	fn allows(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		matches!(types.get(ty).map(|d| d.kind()), Some(TypeKind::Basic))
	}
}

/// Matches abstract types; those can't be instantiated anyway.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbstractTypePermission;

impl TypePermission for AbstractTypePermission {
	fn allows(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		types.get(ty).map_or(false, |d| d.is_abstract())
	}
}

/// Matches a fixed set of types
#[derive(Clone, Debug, Default)]
pub struct ExplicitTypePermission {
	names: HashSet<TypeName>,
}

impl ExplicitTypePermission {
	/// Match the given types
	pub fn new<I>(names: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<TypeName>,
	{
		Self {
			names: names.into_iter().map(Into::into).collect(),
		}
	}
}

impl TypePermission for ExplicitTypePermission {
	fn allows(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		self.names.contains(ty)
	}
}

/// Matches type names against regular expressions (the whole name must match)
#[derive(Clone, Debug)]
pub struct RegexTypePermission {
	patterns: Vec<Regex>,
}

impl RegexTypePermission {
	/// Compile the expressions
	pub fn new<I>(patterns: I) -> Result<Self>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| compile(&format!("^(?:{})$", p.as_ref())))
			.collect::<Result<_>>()?;
		Ok(Self { patterns })
	}
}

impl TypePermission for RegexTypePermission {
	fn allows(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		self.patterns.iter().any(|r| r.is_match(ty.as_str()))
	}
}

/// Matches type names against wildcard patterns
///
/// `*` matches within a single path segment (`demo::*` matches `demo::Person` but not
/// `demo::inner::Person`), `**` matches across segments (`demo::**`), `?` matches a single
/// character.
#[derive(Clone, Debug)]
pub struct WildcardTypePermission {
	inner: RegexTypePermission,
}

impl WildcardTypePermission {
	/// Translate the patterns
	pub fn new<I>(patterns: I) -> Result<Self>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| compile(&wildcard_to_regex(p.as_ref())))
			.collect::<Result<_>>()?;
		Ok(Self {
			inner: RegexTypePermission { patterns },
		})
	}
}

impl TypePermission for WildcardTypePermission {
	fn allows(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		self.inner.allows(ty, types)
	}
}

fn wildcard_to_regex(pattern: &str) -> String {
	let mut regex = String::from("^");
	let mut chars = pattern.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'*' if chars.peek() == Some(&'*') => {
				chars.next();
				regex.push_str(".*");
			},
			'*' => regex.push_str("[^:]*"),
			'?' => regex.push_str("[^:]"),
			c => regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
		}
	}
	regex.push('$');
	regex
}

fn compile(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|e| errors::conversion(format!("invalid type pattern {:?}: {}", pattern, e)))
}

/// Matches a type and everything assignable to it
#[derive(Clone, Debug)]
pub struct TypeHierarchyPermission {
	ty: TypeName,
}

impl TypeHierarchyPermission {
	/// Match `ty` and its subtypes
	pub fn new(ty: impl Into<TypeName>) -> Self {
		Self { ty: ty.into() }
	}
}

impl TypePermission for TypeHierarchyPermission {
	fn allows(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		types.is_assignable(ty, &self.ty)
	}
}
