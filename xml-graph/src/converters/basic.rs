use crate::{
	converters::{
		Converter,
		SingleValueConverter,
	},
	core::{
		MarshallingContext,
		UnmarshallingContext,
	},
	errors,
	model::Value,
	types::{
		TypeName,
		TypeRegistry,
	},
	Result,
};
use std::{
	fmt::Display,
	marker::PhantomData,
	str::FromStr,
};

/// Rust type backing one of the basic value types
pub trait Primitive: Display + FromStr + Sized + 'static {
	/// Runtime type name
	const TYPE: TypeName;

	/// Extract from a value
	fn extract(value: &Value) -> Option<Self>;

	/// Wrap as value
	fn wrap(self) -> Value;
}

macro_rules! primitive {
	($t:ty, $name:ident, $variant:ident) => {
		impl Primitive for $t {
			const TYPE: TypeName = TypeName::$name;

			fn extract(value: &Value) -> Option<Self> {
				match value {
					Value::$variant(v) => Some(v.clone()),
					_ => None,
				}
			}

			fn wrap(self) -> Value {
				Value::$variant(self)
			}
		}
	};
}

primitive!(bool, BOOL, Bool);
primitive!(i64, INT, Int);
primitive!(f64, FLOAT, Float);
primitive!(char, CHAR, Char);
primitive!(String, STRING, Str);

/// Converter for basic values using `Display` and `FromStr`
pub struct BasicConverter<T> {
	_marker: PhantomData<fn() -> T>,
}

impl<T: Primitive> BasicConverter<T> {
	/// New converter
	pub fn new() -> Self {
		Self { _marker: PhantomData }
	}
}

impl<T: Primitive> Default for BasicConverter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> SingleValueConverter for BasicConverter<T>
where
	T: Primitive,
	T::Err: Display,
{
	fn to_text(&self, value: &Value) -> Result<String> {
		match T::extract(value) {
			Some(v) => Ok(v.to_string()),
			None => Err(errors::conversion(format!("expected {}, got {}", T::TYPE, value.type_name()))),
		}
	}

	fn from_text(&self, _ty: &TypeName, text: &str, _types: &TypeRegistry) -> Result<Value> {
		match text.parse::<T>() {
			Ok(v) => Ok(v.wrap()),
			Err(e) => Err(errors::conversion(format!("invalid {} {:?}: {}", T::TYPE, text, e))),
		}
	}
}

impl<T> Converter for BasicConverter<T>
where
	T: Primitive,
	T::Err: Display,
{
	fn can_convert(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		*ty == T::TYPE
	}

	fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()> {
		let text = self.to_text(value)?;
		ctx.writer().set_value(&text)
	}

	fn unmarshal(&self, ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
		let text = ctx.reader().value()?;
		self.from_text(ty, &text, ctx.types())
	}

	fn single_value(&self) -> Option<&dyn SingleValueConverter> {
		Some(self)
	}
}
