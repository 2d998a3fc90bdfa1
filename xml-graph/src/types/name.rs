use std::{
	borrow::Cow,
	fmt,
};

/// Runtime type descriptor of a value in the object graph
///
/// Names of user types are conventionally Rust paths (`demo::Person`); the serialized form of an
/// unaliased type replaces `::` with `.` so it stays a valid XML name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Cow<'static, str>);

impl TypeName {
	/// Type of `Value::Null`
	pub const NULL: Self = Self::from_static("null");
	/// Type of `Value::Bool`
	pub const BOOL: Self = Self::from_static("bool");
	/// Type of `Value::Int`
	pub const INT: Self = Self::from_static("i64");
	/// Type of `Value::Float`
	pub const FLOAT: Self = Self::from_static("f64");
	/// Type of `Value::Char`
	pub const CHAR: Self = Self::from_static("char");
	/// Type of `Value::Str`
	pub const STRING: Self = Self::from_static("String");
	/// Abstract root type; every type is assignable to it
	pub const ANY: Self = Self::from_static("any");
	/// Built-in collection type
	pub const VEC: Self = Self::from_static("Vec");
	/// Built-in map type
	pub const MAP: Self = Self::from_static("Map");

	/// Name from a static string
	pub const fn from_static(name: &'static str) -> Self {
		Self(Cow::Borrowed(name))
	}

	/// Name from an owned string
	pub fn new(name: impl Into<String>) -> Self {
		Self(Cow::Owned(name.into()))
	}

	/// Access the name
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&'static str> for TypeName {
	fn from(name: &'static str) -> Self {
		Self::from_static(name)
	}
}

impl From<String> for TypeName {
	fn from(name: String) -> Self {
		Self::new(name)
	}
}

impl AsRef<str> for TypeName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for TypeName {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == other
	}
}

impl PartialEq<&str> for TypeName {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == *other
	}
}

impl fmt::Display for TypeName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for TypeName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.as_str(), f)
	}
}
