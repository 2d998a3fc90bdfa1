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

const ENTRY: &str = "entry";

/// Writes map entries as `<entry>` nodes holding a key node and a value node
pub struct MapConverter;

impl Converter for MapConverter {
	fn can_convert(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		matches!(types.get(ty).map(|d| d.kind()), Some(TypeKind::Map))
	}

	fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()> {
		let object = value
			.as_object()
			.ok_or_else(|| errors::conversion(format!("expected map, got {}", value.type_name())))?;
		let entries = object.borrow().entries().to_vec();
		for (key, value) in &entries {
			ctx.writer().start_node(ENTRY)?;
			ctx.write_item(key)?;
			ctx.write_item(value)?;
			ctx.writer().end_node()?;
		}
		Ok(())
	}

	fn unmarshal(&self, ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
		let object = ctx.new_instance(ty)?;
		while ctx.reader().has_more_children()? {
			ctx.reader().move_down()?;
			if ctx.reader().node_name() != ENTRY {
				let name = ctx.reader().node_name().to_owned();
				return Err(errors::stream(format!("expected <{}> in map, got <{}>", ENTRY, name)));
			}
			let key = ctx.read_item()?;
			let value = ctx.read_item()?;
			ctx.reader().move_up()?;
			object.borrow_mut().push_entry(key, value);
		}
		Ok(object.into())
	}
}
