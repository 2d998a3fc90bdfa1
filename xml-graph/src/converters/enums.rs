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
	model::{
		EnumValue,
		Value,
	},
	types::{
		TypeKind,
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// Writes enum constants by name
pub struct EnumConverter;

impl SingleValueConverter for EnumConverter {
	fn to_text(&self, value: &Value) -> Result<String> {
		match value {
			Value::Enum(e) => Ok(e.variant.to_string()),
			_ => Err(errors::conversion(format!("expected enum constant, got {}", value.type_name()))),
		}
	}

	fn from_text(&self, ty: &TypeName, text: &str, types: &TypeRegistry) -> Result<Value> {
		let variants = match types.require(ty)?.kind() {
			TypeKind::Enum { variants } => variants,
			_ => return Err(errors::conversion(format!("{} is not an enum", ty))),
		};
		let text = text.trim();
		match variants.iter().find(|v| *v == text) {
			Some(variant) => Ok(EnumValue::new(ty.clone(), variant.clone()).into()),
			None => Err(errors::conversion(format!("no constant {:?} in enum {}", text, ty))),
		}
	}
}

impl Converter for EnumConverter {
	fn can_convert(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		matches!(types.get(ty).map(|d| d.kind()), Some(TypeKind::Enum { .. }))
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
