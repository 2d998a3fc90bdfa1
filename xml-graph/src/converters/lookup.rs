use crate::{
	converters::Converter,
	errors,
	types::{
		TypeName,
		TypeRegistry,
	},
	Result,
};
use dashmap::DashMap;

/// Registration priority of a converter; higher priorities are asked first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
	/// Overrides everything registered with lower priority
	pub const VERY_HIGH: Self = Self(10000);
	/// Default for specific converters
	pub const NORMAL: Self = Self(0);
	/// For converters accepting broad type families
	pub const LOW: Self = Self(-10);
	/// For catch-all converters
	pub const VERY_LOW: Self = Self(-20);
}

impl Default for Priority {
	fn default() -> Self {
		Self::NORMAL
	}
}

struct Binding {
	converter: Box<dyn Converter>,
	priority: Priority,
}

/// Ordered list of converters with a lookup cache
///
/// Converters are asked in order of descending priority; among equal priorities the one
/// registered first wins. Lookups are cached per type name. Every modification bumps a
/// generation counter and cache entries of older generations are ignored.
pub struct ConverterRegistry {
	bindings: Vec<Binding>,
	generation: u64,
	cache: DashMap<TypeName, (u64, usize)>,
}

impl Default for ConverterRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ConverterRegistry {
	/// Registry without converters
	pub fn new() -> Self {
		Self {
			bindings: Vec::new(),
			generation: 0,
			cache: DashMap::new(),
		}
	}

	/// Add a converter
	pub fn register<C: Converter + 'static>(&mut self, converter: C, priority: Priority) {
		self.register_boxed(Box::new(converter), priority);
	}

	/// Add a boxed converter
	pub fn register_boxed(&mut self, converter: Box<dyn Converter>, priority: Priority) {
		tracing::debug!(converter = converter.name(), priority = priority.0, "registered converter");
		let position = self
			.bindings
			.iter()
			.position(|b| b.priority < priority)
			.unwrap_or(self.bindings.len());
		self.bindings.insert(position, Binding { converter, priority });
		self.invalidate();
	}

	/// Drop all cached lookups
	///
	/// Needs to be called when anything the `can_convert` predicates depend on changes.
	pub fn invalidate(&mut self) {
		self.generation += 1;
		self.cache.clear();
	}

	/// Current generation; changes on every modification
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Number of registered converters
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	/// Whether no converters are registered
	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Find the converter for a runtime type
	pub fn lookup(&self, ty: &TypeName, types: &TypeRegistry) -> Result<&dyn Converter> {
		if let Some(entry) = self.cache.get(ty) {
			let (generation, index) = *entry;
			if generation == self.generation {
				if let Some(binding) = self.bindings.get(index) {
					return Ok(&*binding.converter);
				}
			}
		}
		let index = self
			.bindings
			.iter()
			.position(|b| b.converter.can_convert(ty, types))
			.ok_or_else(|| errors::converter_not_found(ty))?;
		let converter = &*self.bindings[index].converter;
		tracing::trace!(%ty, converter = converter.name(), "resolved converter");
		self.cache.insert(ty.clone(), (self.generation, index));
		Ok(converter)
	}
}
