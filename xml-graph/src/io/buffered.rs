use crate::{
	errors,
	io::HierarchicalWriter,
	Result,
};

/// Fully formed output token passed to a `NodeSink`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
	/// Start of a node with content
	Start {
		/// Node name
		name: &'a str,
		/// All attributes of the node
		attributes: &'a [(String, String)],
	},
	/// Node without content
	Empty {
		/// Node name
		name: &'a str,
		/// All attributes of the node
		attributes: &'a [(String, String)],
	},
	/// Text content (not escaped yet)
	Text(&'a str),
	/// End of a node started with `Token::Start`
	End(&'a str),
}

/// Token consumer a format adaptor provides
pub trait NodeSink {
	/// Write a single token
	fn emit(&mut self, token: Token<'_>) -> Result<()>;

	/// Flush buffered output
	fn flush(&mut self) -> Result<()> {
		Ok(())
	}
}

struct OpenNode {
	name: String,
	committed: bool,
}

/// `HierarchicalWriter` on top of a `NodeSink`
///
/// A started node is held back until it gets content (text or a child node) or is ended, so
/// attributes can be collected first; the sink always sees complete start tokens.
pub struct BufferedWriter<S> {
	sink: S,
	open: Vec<OpenNode>,
	attributes: Vec<(String, String)>,
	// the root node was ended
	finished: bool,
}

impl<S: NodeSink> BufferedWriter<S> {
	/// Wrap a sink
	pub fn new(sink: S) -> Self {
		Self {
			sink,
			open: Vec::new(),
			attributes: Vec::new(),
			finished: false,
		}
	}

	/// Access the sink
	pub fn sink(&self) -> &S {
		&self.sink
	}

	/// Number of started but not ended nodes
	pub fn depth(&self) -> usize {
		self.open.len()
	}

	/// Unwrap the sink
	///
	/// Fails if there are still open nodes.
	pub fn into_inner(self) -> Result<S> {
		match self.open.last() {
			Some(node) => Err(errors::illegal_state(format!("node {:?} not closed", node.name))),
			None => Ok(self.sink),
		}
	}

	fn commit(&mut self) -> Result<()> {
		if let Some(node) = self.open.last_mut() {
			if !node.committed {
				node.committed = true;
				self.sink.emit(Token::Start {
					name: &node.name,
					attributes: &self.attributes,
				})?;
				self.attributes.clear();
			}
		}
		Ok(())
	}
}

impl<S: NodeSink> HierarchicalWriter for BufferedWriter<S> {
	fn start_node(&mut self, name: &str) -> Result<()> {
		if self.open.is_empty() && self.finished {
			return Err(errors::illegal_state(format!("second root node {:?}", name)));
		}
		self.commit()?;
		self.open.push(OpenNode {
			name: name.into(),
			committed: false,
		});
		Ok(())
	}

	fn add_attribute(&mut self, key: &str, value: &str) -> Result<()> {
		match self.open.last() {
			Some(node) if !node.committed => (),
			Some(node) => {
				return Err(errors::illegal_state(format!(
					"attribute {:?} added to node {:?} after its content",
					key, node.name
				)));
			},
			None => return Err(errors::illegal_state(format!("attribute {:?} added outside of a node", key))),
		}
		if self.attributes.iter().any(|(k, _)| k == key) {
			return Err(errors::illegal_state(format!("duplicate attribute {:?}", key)));
		}
		self.attributes.push((key.into(), value.into()));
		Ok(())
	}

	fn set_value(&mut self, text: &str) -> Result<()> {
		if self.open.is_empty() {
			return Err(errors::illegal_state("text outside of a node"));
		}
		self.commit()?;
		self.sink.emit(Token::Text(text))
	}

	fn end_node(&mut self) -> Result<()> {
		let node = match self.open.pop() {
			Some(node) => node,
			None => return Err(errors::illegal_state("end_node without open node")),
		};
		self.finished = self.open.is_empty();
		if node.committed {
			self.sink.emit(Token::End(&node.name))
		} else {
			self.sink.emit(Token::Empty {
				name: &node.name,
				attributes: &self.attributes,
			})?;
			self.attributes.clear();
			Ok(())
		}
	}

	fn flush(&mut self) -> Result<()> {
		self.sink.flush()
	}
}
