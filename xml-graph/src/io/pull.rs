use crate::{
	errors,
	io::HierarchicalReader,
	Result,
};
use std::collections::VecDeque;

/// Event produced by a `PullParser`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PullEvent {
	/// Start of a node
	Start {
		/// Node name
		name: String,
		/// Attributes in document order
		attributes: Vec<(String, String)>,
	},
	/// End of the most recently started node
	End,
	/// Text content (already unescaped)
	Text(String),
	/// Comment; content is irrelevant
	Comment,
	/// End of the document; repeated on further pulls
	Eof,
}

/// Streaming event source a format adaptor provides
///
/// Self-closing nodes must be reported as `Start` followed by `End`.
pub trait PullParser {
	/// Next event
	fn pull(&mut self) -> Result<PullEvent>;
}

static EOF: PullEvent = PullEvent::Eof;

struct Frame {
	name: String,
	attributes: Vec<(String, String)>,
}

/// `HierarchicalReader` on top of a `PullParser`
///
/// Doesn't build the tree; it only keeps the names and attributes of the entered nodes and a queue
/// of events it had to look at in advance (`has_more_children` and `value` never consume events).
pub struct PullReader<P> {
	parser: P,
	lookahead: VecDeque<PullEvent>,
	frames: Vec<Frame>,
	eof: bool,
}

impl<P: PullParser> PullReader<P> {
	/// Create reader and position it on the root node
	pub fn new(parser: P) -> Result<Self> {
		let mut reader = Self {
			parser,
			lookahead: VecDeque::new(),
			frames: Vec::new(),
			eof: false,
		};
		loop {
			match reader.next()? {
				PullEvent::Start { name, attributes } => {
					reader.frames.push(Frame { name, attributes });
					return Ok(reader);
				},
				PullEvent::Text(_) | PullEvent::Comment => (),
				PullEvent::End => return Err(errors::stream("unexpected end of node before root")),
				PullEvent::Eof => return Err(errors::stream("empty document")),
			}
		}
	}

	/// Access the underlying parser
	pub fn parser(&self) -> &P {
		&self.parser
	}

	fn fill(&mut self, index: usize) -> Result<()> {
		while self.lookahead.len() <= index && !self.eof {
			let event = self.parser.pull()?;
			self.eof = event == PullEvent::Eof;
			self.lookahead.push_back(event);
		}
		Ok(())
	}

	fn peek(&mut self, index: usize) -> Result<&PullEvent> {
		self.fill(index)?;
		Ok(self.lookahead.get(index).unwrap_or(&EOF))
	}

	fn next(&mut self) -> Result<PullEvent> {
		self.fill(0)?;
		Ok(self.lookahead.pop_front().unwrap_or(PullEvent::Eof))
	}

	fn current(&self) -> Option<&Frame> {
		self.frames.last()
	}
}

impl<P: PullParser> HierarchicalReader for PullReader<P> {
	fn has_more_children(&mut self) -> Result<bool> {
		if self.frames.is_empty() {
			return Ok(false);
		}
		let mut index = 0;
		loop {
			match self.peek(index)? {
				PullEvent::Start { .. } => return Ok(true),
				PullEvent::End | PullEvent::Eof => return Ok(false),
				PullEvent::Text(_) | PullEvent::Comment => index += 1,
			}
		}
	}

	fn move_down(&mut self) -> Result<()> {
		if self.frames.is_empty() {
			return Err(errors::illegal_state("move_down after leaving the root node"));
		}
		loop {
			match self.next()? {
				PullEvent::Start { name, attributes } => {
					self.frames.push(Frame { name, attributes });
					return Ok(());
				},
				PullEvent::Text(_) | PullEvent::Comment => (),
				PullEvent::End => {
					let name = self.current().map(|f| f.name.as_str()).unwrap_or_default();
					return Err(errors::illegal_state(format!("move_down: node {:?} has no more children", name)));
				},
				PullEvent::Eof => return Err(errors::unexpected_eof()),
			}
		}
	}

	fn move_up(&mut self) -> Result<()> {
		if self.frames.is_empty() {
			return Err(errors::illegal_state("move_up without matching move_down"));
		}
		let mut nested = 0usize;
		loop {
			match self.next()? {
				PullEvent::Start { .. } => nested += 1,
				PullEvent::End if nested == 0 => {
					self.frames.pop();
					return Ok(());
				},
				PullEvent::End => nested -= 1,
				PullEvent::Text(_) | PullEvent::Comment => (),
				PullEvent::Eof => return Err(errors::unexpected_eof()),
			}
		}
	}

	fn node_name(&self) -> &str {
		self.current().map(|f| f.name.as_str()).unwrap_or_default()
	}

	fn value(&mut self) -> Result<String> {
		let mut text = String::new();
		if self.frames.is_empty() {
			return Ok(text);
		}
		let mut index = 0;
		loop {
			match self.peek(index)? {
				PullEvent::Text(t) => text.push_str(t),
				PullEvent::Comment => (),
				_ => return Ok(text),
			}
			index += 1;
		}
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		let frame = self.current()?;
		frame.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
	}

	fn attribute_count(&self) -> usize {
		self.current().map_or(0, |f| f.attributes.len())
	}

	fn attribute_at(&self, index: usize) -> Option<(&str, &str)> {
		let (k, v) = self.current()?.attributes.get(index)?;
		Some((k, v))
	}

	fn depth(&self) -> usize {
		self.frames.len()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::errors::ErrorKind;
	use std::{
		cell::Cell,
		rc::Rc,
	};

	/// Replays a fixed list of events and counts pulls
	struct Events {
		events: VecDeque<PullEvent>,
		pulls: Rc<Cell<usize>>,
	}

	impl PullParser for Events {
		fn pull(&mut self) -> Result<PullEvent> {
			self.pulls.set(self.pulls.get() + 1);
			Ok(self.events.pop_front().unwrap_or(PullEvent::Eof))
		}
	}

	fn start(name: &str) -> PullEvent {
		PullEvent::Start {
			name: name.into(),
			attributes: Vec::new(),
		}
	}

	fn text(t: &str) -> PullEvent {
		PullEvent::Text(t.into())
	}

	fn reader(events: Vec<PullEvent>) -> (PullReader<Events>, Rc<Cell<usize>>) {
		let pulls = Rc::new(Cell::new(0));
		let parser = Events {
			events: events.into(),
			pulls: pulls.clone(),
		};
		(PullReader::new(parser).unwrap(), pulls)
	}

	// <root a="1"><!-- c --><x>he<!-- c -->llo</x> <y/></root>
	fn document() -> Vec<PullEvent> {
		vec![
			PullEvent::Start {
				name: "root".into(),
				attributes: vec![("a".into(), "1".into())],
			},
			PullEvent::Comment,
			start("x"),
			text("he"),
			PullEvent::Comment,
			text("llo"),
			PullEvent::End,
			text(" "),
			start("y"),
			PullEvent::End,
			PullEvent::End,
		]
	}

	#[test]
	fn walk() {
		let (mut r, _) = reader(document());
		assert_eq!(r.node_name(), "root");
		assert_eq!(r.depth(), 1);
		assert_eq!(r.attribute("a"), Some("1"));
		assert_eq!(r.attribute_at(0), Some(("a", "1")));
		assert_eq!(r.attribute("b"), None);

		assert!(r.has_more_children().unwrap());
		// repeated queries don't move
		assert!(r.has_more_children().unwrap());
		r.move_down().unwrap();
		assert_eq!(r.node_name(), "x");
		assert_eq!(r.depth(), 2);
		assert_eq!(r.attribute_count(), 0);
		assert_eq!(r.value().unwrap(), "hello");
		assert!(!r.has_more_children().unwrap());
		r.move_up().unwrap();
		assert_eq!(r.node_name(), "root");
		// the parent's attributes are available again
		assert_eq!(r.attribute("a"), Some("1"));

		assert!(r.has_more_children().unwrap());
		r.move_down().unwrap();
		assert_eq!(r.node_name(), "y");
		assert_eq!(r.value().unwrap(), "");
		r.move_up().unwrap();
		assert!(!r.has_more_children().unwrap());
		r.move_up().unwrap();
		assert_eq!(r.depth(), 0);
		assert_eq!(r.node_name(), "");
	}

	#[test]
	fn value_lookahead_is_reused() {
		let (mut r, pulls) = reader(vec![start("root"), text("a"), text("b"), PullEvent::End]);
		assert_eq!(r.value().unwrap(), "ab");
		let after_value = pulls.get();
		assert!(!r.has_more_children().unwrap());
		assert_eq!(pulls.get(), after_value);
		assert_eq!(r.value().unwrap(), "ab");
	}

	#[test]
	fn move_up_skips_unread_children() {
		let (mut r, _) = reader(document());
		r.move_down().unwrap();
		// leave "x" without reading anything
		r.move_up().unwrap();
		r.move_down().unwrap();
		assert_eq!(r.node_name(), "y");
	}

	#[test]
	fn balanced_moves_restore_depth() {
		let (mut r, _) = reader(document());
		let before = r.depth();
		while r.has_more_children().unwrap() {
			r.move_down().unwrap();
			assert_eq!(r.depth(), before + 1);
			r.move_up().unwrap();
			assert_eq!(r.depth(), before);
		}
	}

	#[test]
	fn unbalanced_move_up_fails() {
		let (mut r, _) = reader(vec![start("root"), PullEvent::End]);
		r.move_up().unwrap();
		let err = r.move_up().unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::IllegalState { .. }));
		assert_eq!(r.depth(), 0);
	}

	#[test]
	fn move_down_without_child_fails() {
		let (mut r, _) = reader(vec![start("root"), text("x"), PullEvent::End]);
		let err = r.move_down().unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::IllegalState { .. }));
	}

	#[test]
	fn truncated_document() {
		let (mut r, _) = reader(vec![start("root"), start("x")]);
		r.move_down().unwrap();
		let err = r.move_up().unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::Stream { .. }));
	}

	#[test]
	fn empty_document() {
		let parser = Events {
			events: vec![PullEvent::Comment].into(),
			pulls: Rc::new(Cell::new(0)),
		};
		let err = PullReader::new(parser).err().unwrap();
		assert!(matches!(err.kind(), ErrorKind::Stream { .. }));
	}
}
