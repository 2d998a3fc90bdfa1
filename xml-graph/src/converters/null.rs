use crate::{
	converters::Converter,
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

/// Writes null as node without content
pub struct NullConverter;

impl Converter for NullConverter {
	fn can_convert(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		*ty == TypeName::NULL
	}

	fn marshal(&self, _value: &Value, _ctx: &mut MarshallingContext<'_>) -> Result<()> {
		Ok(())
	}

	fn unmarshal(&self, _ty: &TypeName, _ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
		Ok(Value::Null)
	}
}
