//! Hierarchical streams
//!
//! The engine only talks to `HierarchicalReader` and `HierarchicalWriter`; it never sees a
//! concrete format. Format adaptors usually don't implement those traits directly, they provide
//! the much simpler `PullParser` (a stream of start/end/text events) and `NodeSink` (a consumer of
//! fully formed tokens) and get wrapped in `PullReader` and `BufferedWriter`, which implement the
//! cursor semantics on top.

mod buffered;
mod path;
mod pull;
pub mod tree;

pub use self::{
	buffered::{
		BufferedWriter,
		NodeSink,
		Token,
	},
	path::{
		Path,
		PathStep,
		PathTracker,
		PathTrackingReader,
		PathTrackingWriter,
	},
	pull::{
		PullEvent,
		PullParser,
		PullReader,
	},
};

use crate::Result;

/// Forward-only cursor over a tree of nodes
///
/// A reader starts positioned on the root node (depth 1). `move_down` enters the next unread child
/// of the current node, `move_up` leaves the current node (skipping whatever wasn't read of it).
/// Every `move_down` must be matched by exactly one `move_up`.
pub trait HierarchicalReader {
	/// Whether the current node has another unread child node
	///
	/// Doesn't change the position.
	fn has_more_children(&mut self) -> Result<bool>;

	/// Enter the next child node
	fn move_down(&mut self) -> Result<()>;

	/// Leave the current node; the parent becomes the current node again
	fn move_up(&mut self) -> Result<()>;

	/// Name of the current node; empty once the root was left
	fn node_name(&self) -> &str;

	/// Text content of the current node (empty if there is none)
	fn value(&mut self) -> Result<String>;

	/// Attribute of the current node
	fn attribute(&self, name: &str) -> Option<&str>;

	/// Number of attributes of the current node
	fn attribute_count(&self) -> usize;

	/// Attribute of the current node by position
	fn attribute_at(&self, index: usize) -> Option<(&str, &str)>;

	/// Number of entered nodes (root = 1)
	fn depth(&self) -> usize;
}

/// Writer for a tree of nodes
///
/// Attributes can only be added to the most recently started node before it gets any content
/// (text or child nodes). Nodes must be ended in reverse order of starting them.
pub trait HierarchicalWriter {
	/// Open a new node as child of the current one
	fn start_node(&mut self, name: &str) -> Result<()>;

	/// Add attribute to the current node
	fn add_attribute(&mut self, key: &str, value: &str) -> Result<()>;

	/// Add text content to the current node
	fn set_value(&mut self, text: &str) -> Result<()>;

	/// Close the current node
	fn end_node(&mut self) -> Result<()>;

	/// Flush the underlying sink
	fn flush(&mut self) -> Result<()>;
}
