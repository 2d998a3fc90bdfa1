use crate::{
	converters::Converter,
	core::{
		MarshallingContext,
		UnmarshallingContext,
	},
	errors,
	model::Value,
	types::{
		TypeKind,
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// Writes collection items as child nodes named after their type
pub struct CollectionConverter;

impl Converter for CollectionConverter {
	fn can_convert(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		matches!(types.get(ty).map(|d| d.kind()), Some(TypeKind::Collection))
	}

	fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()> {
		let object = value
			.as_object()
			.ok_or_else(|| errors::conversion(format!("expected collection, got {}", value.type_name())))?;
		// no borrow may be held while recursing
		let items = object.borrow().items().to_vec();
		for item in &items {
			ctx.write_item(item)?;
		}
		Ok(())
	}

	fn unmarshal(&self, ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
		let object = ctx.new_instance(ty)?;
		while ctx.reader().has_more_children()? {
			let item = ctx.read_item()?;
			object.borrow_mut().push_item(item);
		}
		Ok(object.into())
	}
}
