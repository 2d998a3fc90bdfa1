use crate::{
	converters::Converter,
	core::references::{
		ReadReferences,
		ReferenceKey,
		ReferenceMode,
	},
	engine::{
		Config,
		Engine,
	},
	io::{
		HierarchicalReader,
		Path,
		PathTrackingReader,
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

struct Pending {
	key: Option<ReferenceKey>,
	object: Option<ObjectRef>,
}

/// State of a single unmarshalling call
///
/// Converters use it to read nested values; it resolves types, checks permissions and resolves
/// reference markers.
pub struct UnmarshallingContext<'a> {
	engine: &'a Engine,
	reader: PathTrackingReader<'a>,
	references: ReadReferences,
	// nodes currently being read, innermost last
	pending: Vec<Pending>,
}

impl<'a> UnmarshallingContext<'a> {
	pub(crate) fn new(engine: &'a Engine, reader: &'a mut dyn HierarchicalReader) -> Self {
		Self {
			engine,
			reader: PathTrackingReader::new(reader),
			references: ReadReferences::default(),
			pending: Vec::new(),
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

	/// Input cursor
	pub fn reader(&mut self) -> &mut dyn HierarchicalReader {
		&mut self.reader
	}

	/// Path of the current node
	pub fn current_path(&self) -> Path {
		self.reader.path()
	}

	/// Whether an attribute name is reserved for type discriminators and reference markers
	pub fn is_system_attribute(&self, name: &str) -> bool {
		let config = self.config();
		name == config.class_attribute || name == config.reference_attribute || name == config.id_attribute
	}

	/// Fail with `Forbidden` unless the security gate accepts the type
	pub fn check_permission(&self, ty: &TypeName) -> Result<()> {
		self.engine.permissions().check(ty, self.engine.types())
	}

	pub(crate) fn read_root(&mut self) -> Result<Value> {
		let name = self.reader.node_name().to_owned();
		let ty = self
			.types()
			.resolve_name(&name)
			.map_err(|e| e.with_context("path", self.reader.path()))?;
		self.convert_another(&ty)
	}

	/// Read the current node as value of declared type `expected`
	///
	/// A type discriminator on the node takes precedence over `expected`.
	pub fn convert_another(&mut self, expected: &TypeName) -> Result<Value> {
		let path = self.reader.path();
		let types = self.types();
		let ty = match self.reader.attribute(&self.config().class_attribute) {
			Some(name) => types.resolve_name(name),
			None => Ok(types.default_implementation(expected)),
		};
		let ty = ty.map_err(|e| e.with_context("path", &path))?;
		self.read_node(&ty, &path).map_err(|e| {
			e.with_context("path", &path)
				.with_context("type", &ty)
		})
	}

	/// Read the next child node as value of the type its name denotes
	pub fn read_item(&mut self) -> Result<Value> {
		self.reader.move_down()?;
		let name = self.reader.node_name().to_owned();
		let ty = self
			.types()
			.resolve_name(&name)
			.map_err(|e| e.with_context("path", self.reader.path()))?;
		let value = self.convert_another(&ty)?;
		self.reader.move_up()?;
		Ok(value)
	}

	/// Create an empty object for the node currently being read
	///
	/// The object is registered for references right away, so nested references to it (cycles)
	/// resolve while its content is still being read.
	pub fn new_instance(&mut self, ty: &TypeName) -> Result<ObjectRef> {
		self.check_permission(ty)?;
		let def = self.types().require(ty)?;
		let object = self.engine.instantiator().instantiate(def)?;
		if let Some(pending) = self.pending.last_mut() {
			if pending.object.is_none() {
				if let Some(key) = pending.key.clone() {
					self.references.bind(key, object.clone());
				}
				pending.object = Some(object.clone());
			}
		}
		Ok(object)
	}

	/// Innermost object under construction
	pub fn current_object(&self) -> Option<&ObjectRef> {
		self.pending.iter().rev().find_map(|p| p.object.as_ref())
	}

	fn read_node(&mut self, ty: &TypeName, path: &Path) -> Result<Value> {
		self.check_permission(ty)?;
		let config = self.config();
		let mode = config.reference_mode;
		if mode.tracks_references() {
			if let Some(reference) = self.reader.attribute(&config.reference_attribute) {
				tracing::trace!(%path, %reference, "resolve reference");
				return Ok(self.references.resolve(mode, reference, path)?.into());
			}
		}
		let key = match mode {
			ReferenceMode::None => None,
			ReferenceMode::Id => self
				.reader
				.attribute(&config.id_attribute)
				.map(|id| ReferenceKey::Id(id.to_owned())),
			_ => Some(ReferenceKey::Path(path.clone())),
		};

		let converter = self.lookup(ty)?;
		tracing::trace!(%path, %ty, converter = converter.name(), "unmarshal");
		self.pending.push(Pending { key, object: None });
		let result = converter.unmarshal(ty, self);
		let pending = self.pending.pop();
		let value = result?;
		// converters not using `new_instance` get their result registered afterwards
		if let (Some(Pending { key: Some(key), object: None }), Value::Object(object)) = (pending, &value) {
			self.references.bind(key, object.clone());
		}
		Ok(value)
	}
}
