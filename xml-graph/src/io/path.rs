use crate::{
	errors,
	io::{
		HierarchicalReader,
		HierarchicalWriter,
	},
	Result,
};
use std::{
	collections::HashMap,
	fmt,
};

/// One level of a `Path`: node name and its position among equally named siblings (from 1)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathStep {
	name: String,
	index: usize,
}

impl PathStep {
	/// New step
	pub fn new(name: impl Into<String>, index: usize) -> Self {
		Self {
			name: name.into(),
			index,
		}
	}

	/// Node name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Position among siblings with the same name (from 1)
	pub fn index(&self) -> usize {
		self.index
	}

	/// Parse `name` or `name[index]`
	fn parse(text: &str) -> Option<Self> {
		match text.strip_suffix(']').and_then(|t| t.split_once('[')) {
			Some((name, index)) => {
				let index = index.parse::<usize>().ok().filter(|&i| i > 0)?;
				Some(Self::new(name, index))
			},
			None if text.contains('[') || text.contains(']') => None,
			None => Some(Self::new(text, 1)),
		}
	}

	fn write(&self, out: &mut String, explicit: bool) {
		out.push_str(&self.name);
		if explicit || self.index > 1 {
			out.push('[');
			out.push_str(&self.index.to_string());
			out.push(']');
		}
	}
}

/// Absolute position of a node in a document
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
	steps: Vec<PathStep>,
}

impl Path {
	/// Path from steps (starting at the root node)
	pub fn new(steps: Vec<PathStep>) -> Self {
		Self { steps }
	}

	/// Steps starting at the root node
	pub fn steps(&self) -> &[PathStep] {
		&self.steps
	}

	/// Absolute expression like `/root/items/item[2]`
	///
	/// With `explicit` every step carries its index, including `[1]`.
	pub fn absolute(&self, explicit: bool) -> String {
		let mut out = String::new();
		for step in &self.steps {
			out.push('/');
			step.write(&mut out, explicit);
		}
		if out.is_empty() {
			out.push('/');
		}
		out
	}

	/// Relative expression leading from this path to `target`
	///
	/// Goes up (`..`) to the deepest common ancestor and down from there.
	pub fn relative(&self, target: &Path, explicit: bool) -> String {
		let common = self
			.steps
			.iter()
			.zip(&target.steps)
			.take_while(|(a, b)| a == b)
			.count();
		let mut out = String::new();
		for _ in common..self.steps.len() {
			if !out.is_empty() {
				out.push('/');
			}
			out.push_str("..");
		}
		for step in &target.steps[common..] {
			if !out.is_empty() {
				out.push('/');
			}
			step.write(&mut out, explicit);
		}
		if out.is_empty() {
			out.push('.');
		}
		out
	}

	/// Resolve an absolute or relative expression against this path
	pub fn resolve(&self, expression: &str) -> Result<Path> {
		let (mut steps, rest) = match expression.strip_prefix('/') {
			Some(rest) => (Vec::new(), rest),
			None => (self.steps.clone(), expression),
		};
		for part in rest.split('/') {
			match part {
				"" | "." => (),
				".." => {
					if steps.pop().is_none() {
						return Err(errors::invalid_reference(expression));
					}
				},
				_ => match PathStep::parse(part) {
					Some(step) => steps.push(step),
					None => return Err(errors::invalid_reference(expression)),
				},
			}
		}
		Ok(Path { steps })
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.absolute(false))
	}
}

struct Level {
	step: PathStep,
	children: HashMap<String, usize>,
}

/// Follows node navigation and provides the `Path` of the current node
#[derive(Default)]
pub struct PathTracker {
	levels: Vec<Level>,
	roots: HashMap<String, usize>,
}

impl PathTracker {
	/// Tracker outside of any node
	pub fn new() -> Self {
		Self::default()
	}

	/// Enter a child node with the given name
	pub fn push(&mut self, name: &str) {
		let counts = match self.levels.last_mut() {
			Some(level) => &mut level.children,
			None => &mut self.roots,
		};
		let index = counts.entry(name.to_owned()).or_insert(0);
		*index += 1;
		let step = PathStep::new(name, *index);
		self.levels.push(Level {
			step,
			children: HashMap::new(),
		});
	}

	/// Leave the current node
	pub fn pop(&mut self) {
		self.levels.pop();
	}

	/// Number of entered nodes
	pub fn depth(&self) -> usize {
		self.levels.len()
	}

	/// Path of the current node
	pub fn path(&self) -> Path {
		Path::new(self.levels.iter().map(|l| l.step.clone()).collect())
	}
}

/// Writer wrapper keeping a `PathTracker` in sync
pub struct PathTrackingWriter<'a> {
	inner: &'a mut dyn HierarchicalWriter,
	tracker: PathTracker,
}

impl<'a> PathTrackingWriter<'a> {
	/// Wrap a writer positioned outside of any node
	pub fn new(inner: &'a mut dyn HierarchicalWriter) -> Self {
		Self {
			inner,
			tracker: PathTracker::new(),
		}
	}

	/// Path of the current node
	pub fn path(&self) -> Path {
		self.tracker.path()
	}
}

impl HierarchicalWriter for PathTrackingWriter<'_> {
	fn start_node(&mut self, name: &str) -> Result<()> {
		self.inner.start_node(name)?;
		self.tracker.push(name);
		Ok(())
	}

	fn add_attribute(&mut self, key: &str, value: &str) -> Result<()> {
		self.inner.add_attribute(key, value)
	}

	fn set_value(&mut self, text: &str) -> Result<()> {
		self.inner.set_value(text)
	}

	fn end_node(&mut self) -> Result<()> {
		self.inner.end_node()?;
		self.tracker.pop();
		Ok(())
	}

	fn flush(&mut self) -> Result<()> {
		self.inner.flush()
	}
}

/// Reader wrapper keeping a `PathTracker` in sync
pub struct PathTrackingReader<'a> {
	inner: &'a mut dyn HierarchicalReader,
	tracker: PathTracker,
}

impl<'a> PathTrackingReader<'a> {
	/// Wrap a reader; its current node becomes the root of all tracked paths.
	pub fn new(inner: &'a mut dyn HierarchicalReader) -> Self {
		let mut tracker = PathTracker::new();
		if inner.depth() > 0 {
			tracker.push(inner.node_name());
		}
		Self { inner, tracker }
	}

	/// Path of the current node
	pub fn path(&self) -> Path {
		self.tracker.path()
	}
}

impl HierarchicalReader for PathTrackingReader<'_> {
	fn has_more_children(&mut self) -> Result<bool> {
		self.inner.has_more_children()
	}

	fn move_down(&mut self) -> Result<()> {
		self.inner.move_down()?;
		self.tracker.push(self.inner.node_name());
		Ok(())
	}

	fn move_up(&mut self) -> Result<()> {
		self.inner.move_up()?;
		self.tracker.pop();
		Ok(())
	}

	fn node_name(&self) -> &str {
		self.inner.node_name()
	}

	fn value(&mut self) -> Result<String> {
		self.inner.value()
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.inner.attribute(name)
	}

	fn attribute_count(&self) -> usize {
		self.inner.attribute_count()
	}

	fn attribute_at(&self, index: usize) -> Option<(&str, &str)> {
		self.inner.attribute_at(index)
	}

	fn depth(&self) -> usize {
		self.inner.depth()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn path(steps: &[(&str, usize)]) -> Path {
		Path::new(steps.iter().map(|&(n, i)| PathStep::new(n, i)).collect())
	}

	#[test]
	fn sibling_indices() {
		let mut t = PathTracker::new();
		t.push("root");
		t.push("item");
		t.pop();
		t.push("item");
		t.push("name");
		assert_eq!(t.path().absolute(false), "/root/item[2]/name");
		assert_eq!(t.path().absolute(true), "/root[1]/item[2]/name[1]");
		t.pop();
		t.pop();
		t.push("other");
		assert_eq!(t.path().to_string(), "/root/other");
		t.push("item");
		// counting restarts below a new parent
		assert_eq!(t.path().to_string(), "/root/other/item");
	}

	#[test]
	fn relative_expressions() {
		let first = path(&[("root", 1), ("first", 1)]);
		let second = path(&[("root", 1), ("second", 1)]);
		assert_eq!(second.relative(&first, false), "../first");
		assert_eq!(second.relative(&first, true), "../first[1]");

		let deep = path(&[("root", 1), ("a", 1), ("b", 2), ("c", 1)]);
		let ancestor = path(&[("root", 1), ("a", 1)]);
		assert_eq!(deep.relative(&ancestor, false), "../..");
		assert_eq!(ancestor.relative(&deep, false), "b[2]/c");
	}

	#[test]
	fn resolve_relative_and_absolute() {
		let base = path(&[("root", 1), ("list", 1), ("item", 3)]);
		let target = path(&[("root", 1), ("list", 1), ("item", 2)]);
		assert_eq!(base.resolve("../item[2]").unwrap(), target);
		assert_eq!(base.resolve("/root/list/item[2]").unwrap(), target);
		assert_eq!(base.resolve("/root[1]/list[1]/item[2]").unwrap(), target);
		assert_eq!(base.resolve("./../item[2]").unwrap(), target);
		assert!(base.resolve("../../../..").is_err());
		assert!(base.resolve("../item[0]").is_err());
		assert!(base.resolve("../it]em").is_err());
	}

	#[test]
	fn relative_round_trip() {
		let a = path(&[("root", 1), ("x", 2), ("y", 1)]);
		let b = path(&[("root", 1), ("z", 1), ("y", 4), ("w", 1)]);
		for explicit in [false, true] {
			assert_eq!(a.resolve(&a.relative(&b, explicit)).unwrap(), b);
			assert_eq!(b.resolve(&b.relative(&a, explicit)).unwrap(), a);
			assert_eq!(a.resolve(&b.absolute(explicit)).unwrap(), b);
		}
	}
}
