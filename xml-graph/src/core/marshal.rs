use crate::{
	converters::Converter,
	core::references::{
		ReferenceMode,
		WriteReferences,
	},
	engine::{
		Config,
		Engine,
	},
	errors,
	io::{
		HierarchicalWriter,
		Path,
		PathTrackingWriter,
	},
	model::{
		ObjectRef,
		Value,
	},
	types::{
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// State of a single marshalling call
///
/// Converters use it to write nested values; it takes care of node names, type discriminators
/// and reference markers.
pub struct MarshallingContext<'a> {
	engine: &'a Engine,
	writer: PathTrackingWriter<'a>,
	references: WriteReferences,
	// objects currently being written, innermost last
	parents: Vec<ObjectRef>,
}

impl<'a> MarshallingContext<'a> {
	pub(crate) fn new(engine: &'a Engine, writer: &'a mut dyn HierarchicalWriter) -> Self {
		Self {
			engine,
			writer: PathTrackingWriter::new(writer),
			references: WriteReferences::new(engine.config().reference_mode),
			parents: Vec::new(),
		}
	}

	/// Type registry of the engine
	pub fn types(&self) -> &'a TypeRegistry {
		self.engine.types()
	}

	/// Configuration of the engine
	pub fn config(&self) -> &'a Config {
		self.engine.config()
	}

	/// Converter for a runtime type
	pub fn lookup(&self, ty: &TypeName) -> Result<&'a dyn Converter> {
		self.engine.converters().lookup(ty, self.engine.types())
	}

	/// Output cursor
	pub fn writer(&mut self) -> &mut dyn HierarchicalWriter {
		&mut self.writer
	}

	/// Path of the current node
	pub fn current_path(&self) -> Path {
		self.writer.path()
	}

	pub(crate) fn write_root(&mut self, value: &Value) -> Result<()> {
		let ty = value.type_name();
		let name = self.types().serialized_name(&ty);
		self.write_node(&name, value, &ty)
	}

	/// Write `value` as node `name`
	///
	/// A type discriminator is added if the runtime type of the value isn't the type that would
	/// be created for `expected` anyway.
	pub fn write_node(&mut self, name: &str, value: &Value, expected: &TypeName) -> Result<()> {
		let types = self.types();
		let config = self.config();
		self.writer.start_node(name)?;
		let actual = value.type_name();
		if actual != types.default_implementation(expected) {
			self.writer
				.add_attribute(&config.class_attribute, &types.serialized_name(&actual))?;
		}
		self.convert_another(value)?;
		self.writer.end_node()
	}

	/// Write `value` as node named after its runtime type
	pub fn write_item(&mut self, value: &Value) -> Result<()> {
		let ty = value.type_name();
		let name = self.types().serialized_name(&ty);
		self.writer.start_node(&name)?;
		self.convert_another(value)?;
		self.writer.end_node()
	}

	/// Write the content (and attributes) of the current node for `value`
	///
	/// Repeated objects are written as reference marker.
	pub fn convert_another(&mut self, value: &Value) -> Result<()> {
		let ty = value.type_name();
		self.convert(value, &ty).map_err(|e| {
			e.with_context("path", self.writer.path())
				.with_context("type", &ty)
		})
	}

	fn convert(&mut self, value: &Value, ty: &TypeName) -> Result<()> {
		let object = match value {
			Value::Object(object) => object,
			_ => return self.marshal_with_converter(value, ty),
		};
		let config = self.config();
		if config.reference_mode == ReferenceMode::None {
			if self.parents.iter().any(|p| p.ptr_eq(object)) {
				return Err(errors::circular_reference(ty));
			}
		} else {
			let path = self.writer.path();
			if let Some(reference) = self.references.reference_to(object, &path) {
				tracing::trace!(%path, %reference, "wrote reference");
				return self.writer.add_attribute(&config.reference_attribute, &reference);
			}
			if let Some(id) = self.references.register(object, path) {
				self.writer.add_attribute(&config.id_attribute, &id)?;
			}
		}
		self.parents.push(object.clone());
		let result = self.marshal_with_converter(value, ty);
		self.parents.pop();
		result
	}

	fn marshal_with_converter(&mut self, value: &Value, ty: &TypeName) -> Result<()> {
		let converter = self.lookup(ty)?;
		tracing::trace!(path = %self.writer.path(), %ty, converter = converter.name(), "marshal");
		converter.marshal(value, self)
	}
}
