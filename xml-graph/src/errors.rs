#![allow(missing_docs)] // names should be good enough
//! Error type and helper functions to generate common errors
//!
//! Every failure carries an [`ErrorKind`] that callers can match on (e.g. to treat unknown type
//! names or security rejections specially) and a list of key/value pairs describing where in the
//! graph or document the failure happened.

use crate::types::TypeName;
use std::fmt;

/// The different failures marshalling and unmarshalling can produce.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
	/// Malformed or truncated input
	#[error("stream error: {message}")]
	Stream { message: String },
	/// Failure reported by the XML library
	#[cfg(feature = "quick-xml")]
	#[cfg_attr(doc_cfg, doc(cfg(feature = "quick-xml")))]
	#[error("xml error: {0}")]
	Xml(#[from] quick_xml::Error),
	/// Failure of the underlying byte stream
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	/// A serialized name that doesn't resolve to any registered type
	#[error("unknown type name {name:?}")]
	UnknownType { name: String },
	/// A type the security gate refused to instantiate
	#[error("type {ty} is not permitted")]
	Forbidden { ty: TypeName },
	/// No converter accepts the type
	#[error("no converter registered for type {ty}")]
	ConverterNotFound { ty: TypeName },
	/// The same field occurred twice in the input
	#[error("duplicate field {field:?} in {ty}")]
	DuplicateField { ty: TypeName, field: String },
	/// A field that isn't declared for the type
	#[error("no field {field:?} declared in {ty}")]
	UnknownField { ty: TypeName, field: String },
	/// A reference marker that doesn't point at a previously read object
	#[error("invalid reference {reference:?}")]
	InvalidReference { reference: String },
	/// An object contains itself while references aren't tracked
	#[error("recursive reference to parent object of type {ty}")]
	CircularReference { ty: TypeName },
	/// A value couldn't be converted
	#[error("conversion failed: {message}")]
	Conversion { message: String },
	/// A cursor or context was used out of order
	#[error("illegal state: {message}")]
	IllegalState { message: String },
}

/// Error with attached debug context
pub struct Error {
	kind: Box<ErrorKind>,
	context: Vec<(String, String)>,
}

impl Error {
	/// Kind of failure
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Debug context collected while the error propagated
	pub fn context(&self) -> &[(String, String)] {
		&self.context
	}

	/// Lookup a single context entry
	pub fn context_value(&self, key: &str) -> Option<&str> {
		self.context.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Attach a context entry unless one with the same key exists already.
	///
	/// Errors are decorated while they propagate outwards, so the innermost (most precise)
	/// information wins.
	pub fn with_context(mut self, key: &str, value: impl fmt::Display) -> Self {
		if self.context_value(key).is_none() {
			self.context.push((key.into(), value.to_string()));
		}
		self
	}
}

impl<E> From<E> for Error
where
	ErrorKind: From<E>,
{
	fn from(kind: E) -> Self {
		Self {
			kind: Box::new(kind.into()),
			context: Vec::new(),
		}
	}
}

impl fmt::Debug for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Error")
			.field("kind", &self.kind)
			.field("context", &self.context)
			.finish()
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.kind)?;
		for (key, value) in &self.context {
			write!(f, "\n  {}: {}", key, value)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		std::error::Error::source(&*self.kind)
	}
}

pub fn stream(message: impl Into<String>) -> Error {
	ErrorKind::Stream { message: message.into() }.into()
}

pub fn unexpected_eof() -> Error {
	stream("unexpected end of document")
}

pub fn unknown_type(name: &str) -> Error {
	ErrorKind::UnknownType { name: name.into() }.into()
}

pub fn forbidden(ty: &TypeName) -> Error {
	ErrorKind::Forbidden { ty: ty.clone() }.into()
}

pub fn converter_not_found(ty: &TypeName) -> Error {
	ErrorKind::ConverterNotFound { ty: ty.clone() }.into()
}

pub fn duplicate_field(ty: &TypeName, field: &str) -> Error {
	ErrorKind::DuplicateField {
		ty: ty.clone(),
		field: field.into(),
	}
	.into()
}

pub fn unknown_field(ty: &TypeName, field: &str) -> Error {
	ErrorKind::UnknownField {
		ty: ty.clone(),
		field: field.into(),
	}
	.into()
}

pub fn invalid_reference(reference: &str) -> Error {
	ErrorKind::InvalidReference {
		reference: reference.into(),
	}
	.into()
}

pub fn circular_reference(ty: &TypeName) -> Error {
	ErrorKind::CircularReference { ty: ty.clone() }.into()
}

pub fn conversion(message: impl Into<String>) -> Error {
	ErrorKind::Conversion { message: message.into() }.into()
}

pub fn illegal_state(message: impl Into<String>) -> Error {
	ErrorKind::IllegalState { message: message.into() }.into()
}
