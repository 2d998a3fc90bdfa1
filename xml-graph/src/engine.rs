//! Configuration facade
//!
//! An `Engine` bundles types, converters, permissions and settings. It is configured once
//! (mutators take `&mut self`) and can then be shared between threads: every `marshal` and
//! `unmarshal` call keeps its state (cursor, references) to itself.

use crate::{
	converters::{
		self,
		Converter,
		ConverterRegistry,
		Priority,
	},
	core::{
		MarshallingContext,
		ReferenceMode,
		UnmarshallingContext,
	},
	errors,
	io::{
		tree::{
			Node,
			TreeBuilder,
			TreeParser,
		},
		BufferedWriter,
		HierarchicalReader,
		HierarchicalWriter,
		PullReader,
	},
	model::Value,
	security::{
		AbstractTypePermission,
		ExplicitTypePermission,
		NullPermission,
		Permissions,
		PrimitiveTypePermission,
		RegexTypePermission,
		TypePermission,
		WildcardTypePermission,
	},
	types::{
		DefaultInstantiator,
		Instantiator,
		TypeDef,
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// Runtime settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// How repeated objects are written
	pub reference_mode: ReferenceMode,
	/// Attribute holding the runtime type if it differs from the declared one
	pub class_attribute: String,
	/// Attribute holding a reference marker
	pub reference_attribute: String,
	/// Attribute holding the id of a first occurrence (`ReferenceMode::Id`)
	pub id_attribute: String,
	/// Skip child nodes not matching any field instead of failing
	pub ignore_unknown_elements: bool,
	/// Indentation (spaces per level) of XML output
	pub indent: Option<usize>,
	/// Start XML output with an XML declaration
	pub xml_declaration: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			reference_mode: ReferenceMode::default(),
			class_attribute: "class".into(),
			reference_attribute: "reference".into(),
			id_attribute: "id".into(),
			ignore_unknown_elements: false,
			indent: None,
			xml_declaration: false,
		}
	}
}

impl Config {
	/// Builder: set reference mode
	pub fn with_reference_mode(mut self, mode: ReferenceMode) -> Self {
		self.reference_mode = mode;
		self
	}

	/// Builder: rename the system attributes
	pub fn with_system_attributes(mut self, class: &str, reference: &str, id: &str) -> Self {
		self.class_attribute = class.into();
		self.reference_attribute = reference.into();
		self.id_attribute = id.into();
		self
	}

	/// Builder: skip unknown child nodes
	pub fn with_ignore_unknown_elements(mut self, ignore: bool) -> Self {
		self.ignore_unknown_elements = ignore;
		self
	}

	/// Builder: indent XML output
	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = Some(indent);
		self
	}

	/// Builder: write XML declaration
	pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
		self.xml_declaration = declaration;
		self
	}
}

/// Serializes and deserializes object graphs
pub struct Engine {
	types: TypeRegistry,
	converters: ConverterRegistry,
	permissions: Permissions,
	instantiator: Box<dyn Instantiator>,
	config: Config,
}

impl Default for Engine {
	fn default() -> Self {
		Self::new()
	}
}

impl Engine {
	/// Engine with default settings
	pub fn new() -> Self {
		Self::with_config(Config::default())
	}

	/// Engine with the given settings, built-in types and converters, and the default
	/// permissions (null, basic types, abstract types, `Vec` and `Map`).
	pub fn with_config(config: Config) -> Self {
		let mut converters = ConverterRegistry::new();
		converters::register_defaults(&mut converters);
		let mut permissions = Permissions::new();
		permissions.allow(NullPermission);
		permissions.allow(PrimitiveTypePermission);
		permissions.allow(AbstractTypePermission);
		permissions.allow(ExplicitTypePermission::new([TypeName::VEC, TypeName::MAP]));
		tracing::debug!(reference_mode = ?config.reference_mode, "created engine");
		Self {
			types: TypeRegistry::new(),
			converters,
			permissions,
			instantiator: Box::new(DefaultInstantiator),
			config,
		}
	}

	/// Type registry
	pub fn types(&self) -> &TypeRegistry {
		&self.types
	}

	/// Converter registry
	pub fn converters(&self) -> &ConverterRegistry {
		&self.converters
	}

	/// Security gate
	pub fn permissions(&self) -> &Permissions {
		&self.permissions
	}

	/// Object factory
	pub fn instantiator(&self) -> &dyn Instantiator {
		&*self.instantiator
	}

	/// Settings
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Modify the type registry directly
	pub fn types_mut(&mut self) -> &mut TypeRegistry {
		self.converters.invalidate();
		&mut self.types
	}

	/// Modify the security gate directly
	pub fn permissions_mut(&mut self) -> &mut Permissions {
		&mut self.permissions
	}

	/// Register a type
	pub fn register_type(&mut self, def: TypeDef) {
		self.types_mut().register(def);
	}

	/// Serialize `ty` as `alias`
	pub fn alias(&mut self, alias: impl Into<String>, ty: impl Into<TypeName>) {
		self.types_mut().alias(alias, ty);
	}

	/// Serialize field `field` of `ty` as `alias`
	pub fn alias_field(&mut self, ty: impl Into<TypeName>, field: impl Into<String>, alias: impl Into<String>) {
		self.types_mut().alias_field(ty, field, alias);
	}

	/// Never write field `field` of `ty`; skip it when reading
	pub fn omit_field(&mut self, ty: impl Into<TypeName>, field: impl Into<String>) {
		self.types_mut().omit_field(ty, field);
	}

	/// Write field `field` of `ty` as attribute
	pub fn use_attribute_for(&mut self, ty: impl Into<TypeName>, field: impl Into<String>) {
		self.types_mut().use_attribute_for(ty, field);
	}

	/// Create `implementation` for declared type `ty` when no type discriminator is present
	pub fn add_default_implementation(&mut self, ty: impl Into<TypeName>, implementation: impl Into<TypeName>) {
		self.types_mut().add_default_implementation(ty, implementation);
	}

	/// Add a converter
	pub fn register_converter<C: Converter + 'static>(&mut self, converter: C, priority: Priority) {
		self.converters.register(converter, priority);
	}

	/// Replace the object factory
	pub fn set_instantiator<I: Instantiator + 'static>(&mut self, instantiator: I) {
		self.instantiator = Box::new(instantiator);
	}

	/// Allow types matching `permission`
	pub fn allow(&mut self, permission: impl TypePermission + 'static) {
		self.permissions.allow(permission);
	}

	/// Deny types matching `permission`
	pub fn deny(&mut self, permission: impl TypePermission + 'static) {
		self.permissions.deny(permission);
	}

	/// Allow the given types
	pub fn allow_types<I>(&mut self, names: I)
	where
		I: IntoIterator,
		I::Item: Into<TypeName>,
	{
		self.allow(ExplicitTypePermission::new(names));
	}

	/// Allow types matching wildcard patterns (see `WildcardTypePermission`)
	pub fn allow_types_by_wildcard<I>(&mut self, patterns: I) -> Result<()>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		self.allow(WildcardTypePermission::new(patterns)?);
		Ok(())
	}

	/// Allow types matching regular expressions
	pub fn allow_types_by_regex<I>(&mut self, patterns: I) -> Result<()>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		self.allow(RegexTypePermission::new(patterns)?);
		Ok(())
	}

	/// Change how repeated objects are written
	pub fn set_reference_mode(&mut self, mode: ReferenceMode) {
		self.config.reference_mode = mode;
	}

	/// Modify the settings
	pub fn config_mut(&mut self) -> &mut Config {
		&mut self.config
	}

	/// Write `value` as root node
	pub fn marshal(&self, value: &Value, writer: &mut dyn HierarchicalWriter) -> Result<()> {
		{
			let mut ctx = MarshallingContext::new(self, writer);
			ctx.write_root(value)?;
		}
		writer.flush()
	}

	/// Read the root node the reader is positioned on
	pub fn unmarshal(&self, reader: &mut dyn HierarchicalReader) -> Result<Value> {
		if reader.depth() != 1 {
			return Err(errors::illegal_state("reader must be positioned on the root node"));
		}
		let mut ctx = UnmarshallingContext::new(self, reader);
		ctx.read_root()
	}

	/// Write `value` into an in-memory tree
	pub fn to_tree(&self, value: &Value) -> Result<Node> {
		let mut writer = BufferedWriter::new(TreeBuilder::new());
		self.marshal(value, &mut writer)?;
		writer
			.into_inner()?
			.into_root()
			.ok_or_else(|| errors::illegal_state("no root node written"))
	}

	/// Read a value from an in-memory tree
	pub fn from_tree(&self, root: &Node) -> Result<Value> {
		let mut reader = PullReader::new(TreeParser::new(root))?;
		self.unmarshal(&mut reader)
	}
}

#[cfg(feature = "quick-xml")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "quick-xml")))]
impl Engine {
	/// Write `value` as XML document
	pub fn to_xml(&self, value: &Value) -> Result<String> {
		let writer = self.to_xml_writer(value, Vec::new())?;
		crate::quick_xml::finish_string(writer)
	}

	/// Write `value` as XML document to `output`
	pub fn to_writer<W: std::io::Write>(&self, value: &Value, output: W) -> Result<W> {
		let writer = self.to_xml_writer(value, output)?;
		Ok(writer.into_inner()?.into_inner())
	}

	fn to_xml_writer<W: std::io::Write>(&self, value: &Value, output: W) -> Result<crate::quick_xml::XmlWriter<W>> {
		use crate::quick_xml::XmlSink;

		let mut sink = match self.config.indent {
			Some(indent) => XmlSink::with_indent(output, indent),
			None => XmlSink::new(output),
		};
		if self.config.xml_declaration {
			sink = sink.with_declaration();
		}
		let mut writer = BufferedWriter::new(sink);
		self.marshal(value, &mut writer)?;
		Ok(writer)
	}

	/// Read a value from an XML document
	pub fn from_xml(&self, input: &str) -> Result<Value> {
		let mut reader = crate::quick_xml::reader_from_str(input)?;
		self.unmarshal(&mut reader)
	}

	/// Read a value from an XML stream
	pub fn from_reader<B: std::io::BufRead>(&self, input: B) -> Result<Value> {
		let mut reader = PullReader::new(crate::quick_xml::XmlParser::from_reader(input))?;
		self.unmarshal(&mut reader)
	}
}
