use crate::{
	converters::Converter,
	core::{
		MarshallingContext,
		UnmarshallingContext,
	},
	errors,
	model::{
		ObjectData,
		Value,
	},
	types::{
		FieldDef,
		TypeName,
		TypeRegistry,
	},
	Result,
};
use std::collections::HashSet;

/// Writes struct objects field by field using the declared fields of their type
///
/// Attribute fields come first (as attributes of the object node), element fields follow in
/// declaration order. Null fields aren't written at all. Accepts every type, so it must be
/// registered with the lowest priority.
pub struct ReflectiveConverter;

impl ReflectiveConverter {
	fn write_attribute(
		&self,
		owner: &TypeName,
		field: &FieldDef,
		value: &Value,
		ctx: &mut MarshallingContext<'_>,
	) -> Result<bool> {
		let types = ctx.types();
		let actual = value.type_name();
		// an attribute can't carry a type discriminator
		if actual != types.default_implementation(&field.ty) {
			return Ok(false);
		}
		let single = match ctx.lookup(&actual)?.single_value() {
			Some(single) => single,
			None => return Ok(false),
		};
		let text = single.to_text(value)?;
		ctx.writer().add_attribute(types.serialized_field(owner, &field.name), &text)?;
		Ok(true)
	}

	fn read_attributes(
		&self,
		ty: &TypeName,
		ctx: &mut UnmarshallingContext<'_>,
		seen: &mut HashSet<String>,
	) -> Result<Vec<(String, Value)>> {
		let types = ctx.types();
		let def = types.require(ty)?;
		let reader = ctx.reader();
		let attributes = (0..reader.attribute_count())
			.filter_map(|i| reader.attribute_at(i))
			.map(|(k, v)| (k.to_owned(), v.to_owned()))
			.collect::<Vec<_>>();

		let mut values = Vec::new();
		for (key, text) in attributes {
			if ctx.is_system_attribute(&key) {
				continue;
			}
			let field = match def.find_field(types.real_field(ty, &key)) {
				Some(field) if types.is_attribute(ty, &field.name) && !types.is_omitted(ty, &field.name) => field,
				_ => {
					tracing::trace!(%ty, attribute = %key, "ignored attribute");
					continue;
				},
			};
			let field_ty = types.default_implementation(&field.ty);
			ctx.check_permission(&field_ty)?;
			let single = ctx.lookup(&field_ty)?.single_value().ok_or_else(|| {
				errors::conversion(format!("field {} of {} can't be read from an attribute", field.name, ty))
			})?;
			let value = single.from_text(&field_ty, &text, types)?;
			seen.insert(field.name.to_string());
			values.push((field.name.to_string(), value));
		}
		Ok(values)
	}
}

impl Converter for ReflectiveConverter {
	fn can_convert(&self, _ty: &TypeName, _types: &TypeRegistry) -> bool {
		true
	}

	fn marshal(&self, value: &Value, ctx: &mut MarshallingContext<'_>) -> Result<()> {
		let types = ctx.types();
		let object = value
			.as_object()
			.ok_or_else(|| errors::conversion(format!("{} has no fields", value.type_name())))?;
		let (ty, fields) = {
			let object = object.borrow();
			match object.data() {
				ObjectData::Fields(fields) => (object.ty().clone(), fields.clone()),
				_ => return Err(errors::conversion(format!("{} is not a struct object", object.ty()))),
			}
		};
		let def = types.require(&ty)?;
		if let Some((name, _)) = fields.iter().find(|(name, _)| def.find_field(name).is_none()) {
			return Err(errors::unknown_field(&ty, name));
		}

		let mut elements = Vec::new();
		for field in def.fields() {
			if types.is_omitted(&ty, &field.name) {
				continue;
			}
			let value = match fields.iter().find(|(name, _)| *name == field.name) {
				Some((_, value)) if !value.is_null() => value,
				_ => continue,
			};
			if types.is_attribute(&ty, &field.name) && self.write_attribute(&ty, field, value, ctx)? {
				continue;
			}
			elements.push((field, value));
		}
		for (field, value) in elements {
			ctx.write_node(types.serialized_field(&ty, &field.name), value, &field.ty)?;
		}
		Ok(())
	}

	fn unmarshal(&self, ty: &TypeName, ctx: &mut UnmarshallingContext<'_>) -> Result<Value> {
		let types = ctx.types();
		let def = types.require(ty)?;
		let object = ctx.new_instance(ty)?;
		let mut seen = HashSet::new();

		for (name, value) in self.read_attributes(ty, ctx, &mut seen)? {
			object.borrow_mut().set_field(&name, value);
		}

		while ctx.reader().has_more_children()? {
			ctx.reader().move_down()?;
			let serialized = ctx.reader().node_name().to_owned();
			let name = types.real_field(ty, &serialized);
			if types.is_omitted(ty, name) {
				tracing::trace!(%ty, field = name, "skipped omitted field");
				ctx.reader().move_up()?;
				continue;
			}
			let field = match def.find_field(name) {
				Some(field) => field,
				None if ctx.config().ignore_unknown_elements => {
					tracing::trace!(%ty, element = %serialized, "skipped unknown element");
					ctx.reader().move_up()?;
					continue;
				},
				None => return Err(errors::unknown_field(ty, name)),
			};
			if !seen.insert(field.name.to_string()) {
				return Err(errors::duplicate_field(ty, &field.name));
			}
			let value = ctx.convert_another(&field.ty)?;
			object.borrow_mut().set_field(&field.name, value);
			ctx.reader().move_up()?;
		}
		Ok(object.into())
	}
}
