use crate::{
	errors,
	io::Path,
	model::ObjectRef,
	Result,
};
use std::collections::HashMap;

/// How repeated occurrences of an object are written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
	/// Every occurrence is written in full; cycles fail
	None,
	/// First occurrences carry an `id` attribute, repetitions refer to it
	Id,
	/// Repetitions carry a path relative to their own node (`../first`)
	RelativePath,
	/// Repetitions carry an absolute path (`/root/first`)
	AbsolutePath,
	/// Like `RelativePath`, but every step carries its index (`../first[1]`)
	SingleNodeRelativePath,
	/// Like `AbsolutePath`, but every step carries its index (`/root[1]/first[1]`)
	SingleNodeAbsolutePath,
}

impl Default for ReferenceMode {
	fn default() -> Self {
		Self::RelativePath
	}
}

impl ReferenceMode {
	/// Whether objects are tracked at all
	pub fn tracks_references(self) -> bool {
		self != Self::None
	}

	/// Whether references are paths
	pub fn uses_paths(self) -> bool {
		!matches!(self, Self::None | Self::Id)
	}

	fn is_absolute(self) -> bool {
		matches!(self, Self::AbsolutePath | Self::SingleNodeAbsolutePath)
	}

	fn explicit_indices(self) -> bool {
		matches!(self, Self::SingleNodeRelativePath | Self::SingleNodeAbsolutePath)
	}
}

enum Marker {
	Id(String),
	Path(Path),
}

/// Objects already written in the current call
pub(crate) struct WriteReferences {
	mode: ReferenceMode,
	// keeps the objects alive so identities stay unique
	seen: HashMap<usize, (ObjectRef, Marker)>,
	next_id: u64,
}

impl WriteReferences {
	pub(crate) fn new(mode: ReferenceMode) -> Self {
		Self {
			mode,
			seen: HashMap::new(),
			next_id: 1,
		}
	}

	/// Reference marker text if the object was written before
	pub(crate) fn reference_to(&self, object: &ObjectRef, current: &Path) -> Option<String> {
		let (_, marker) = self.seen.get(&object.identity())?;
		Some(match marker {
			Marker::Id(id) => id.clone(),
			Marker::Path(path) if self.mode.is_absolute() => path.absolute(self.mode.explicit_indices()),
			Marker::Path(path) => current.relative(path, self.mode.explicit_indices()),
		})
	}

	/// Remember the first occurrence; returns the id to write in `Id` mode.
	pub(crate) fn register(&mut self, object: &ObjectRef, path: Path) -> Option<String> {
		let (marker, id) = match self.mode {
			ReferenceMode::None => return None,
			ReferenceMode::Id => {
				let id = self.next_id.to_string();
				self.next_id += 1;
				(Marker::Id(id.clone()), Some(id))
			},
			_ => (Marker::Path(path), None),
		};
		self.seen.insert(object.identity(), (object.clone(), marker));
		id
	}
}

/// Where an object was read
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ReferenceKey {
	Id(String),
	Path(Path),
}

/// Objects already read in the current call
#[derive(Default)]
pub(crate) struct ReadReferences {
	objects: HashMap<ReferenceKey, ObjectRef>,
}

impl ReadReferences {
	pub(crate) fn bind(&mut self, key: ReferenceKey, object: ObjectRef) {
		self.objects.entry(key).or_insert(object);
	}

	/// Resolve a reference marker found at `current`
	pub(crate) fn resolve(&self, mode: ReferenceMode, reference: &str, current: &Path) -> Result<ObjectRef> {
		let key = if mode.uses_paths() {
			ReferenceKey::Path(current.resolve(reference)?)
		} else {
			ReferenceKey::Id(reference.to_owned())
		};
		self.objects
			.get(&key)
			.cloned()
			.ok_or_else(|| errors::invalid_reference(reference))
	}
}
