//! In-memory node trees
//!
//! Useful to inspect or build documents without going through a textual format, and for tests.

use crate::{
	errors,
	io::{
		NodeSink,
		PullEvent,
		PullParser,
		Token,
	},
	Result,
};
use std::collections::VecDeque;

/// Node of an in-memory document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
	/// Node name
	pub name: String,
	/// Attributes in insertion order
	pub attributes: Vec<(String, String)>,
	/// Text content
	pub value: String,
	/// Child nodes
	pub children: Vec<Node>,
}

impl Node {
	/// Node without attributes, text or children
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Builder: add attribute
	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push((key.into(), value.into()));
		self
	}

	/// Builder: set text
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = value.into();
		self
	}

	/// Builder: append child
	pub fn with_child(mut self, child: Node) -> Self {
		self.children.push(child);
		self
	}

	/// Lookup attribute
	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// First child with the given name
	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children.iter().find(|c| c.name == name)
	}
}

/// `NodeSink` collecting the written document
#[derive(Default)]
pub struct TreeBuilder {
	open: Vec<Node>,
	root: Option<Node>,
}

impl TreeBuilder {
	/// Empty builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Finished document; `None` if nothing (or not everything) was written
	pub fn into_root(self) -> Option<Node> {
		if self.open.is_empty() {
			self.root
		} else {
			None
		}
	}

	fn close(&mut self, node: Node) -> Result<()> {
		match self.open.last_mut() {
			Some(parent) => parent.children.push(node),
			None if self.root.is_none() => self.root = Some(node),
			None => return Err(errors::illegal_state("second root node")),
		}
		Ok(())
	}
}

impl NodeSink for TreeBuilder {
	fn emit(&mut self, token: Token<'_>) -> Result<()> {
		match token {
			Token::Start { name, attributes } => {
				self.open.push(Node {
					name: name.into(),
					attributes: attributes.to_vec(),
					..Node::default()
				});
			},
			Token::Empty { name, attributes } => {
				self.close(Node {
					name: name.into(),
					attributes: attributes.to_vec(),
					..Node::default()
				})?;
			},
			Token::Text(text) => match self.open.last_mut() {
				Some(node) => node.value.push_str(text),
				None => return Err(errors::illegal_state("text outside of a node")),
			},
			Token::End(_) => match self.open.pop() {
				Some(node) => self.close(node)?,
				None => return Err(errors::illegal_state("end without start")),
			},
		}
		Ok(())
	}
}

/// `PullParser` replaying an in-memory document
pub struct TreeParser {
	events: VecDeque<PullEvent>,
}

impl TreeParser {
	/// Flatten the tree into events
	pub fn new(root: &Node) -> Self {
		let mut events = VecDeque::new();
		flatten(root, &mut events);
		Self { events }
	}
}

fn flatten(node: &Node, events: &mut VecDeque<PullEvent>) {
	events.push_back(PullEvent::Start {
		name: node.name.clone(),
		attributes: node.attributes.clone(),
	});
	if !node.value.is_empty() {
		events.push_back(PullEvent::Text(node.value.clone()));
	}
	for child in &node.children {
		flatten(child, events);
	}
	events.push_back(PullEvent::End);
}

impl PullParser for TreeParser {
	fn pull(&mut self) -> Result<PullEvent> {
		Ok(self.events.pop_front().unwrap_or(PullEvent::Eof))
	}
}
