//! XML adaptors using `quick-xml`

mod parser;
mod serializer;

/// Re-export `quick-xml` crate
pub use quick_xml;

pub use self::{
	parser::{
		reader_from_str,
		XmlParser,
		XmlReader,
	},
	serializer::{
		finish_string,
		XmlSink,
		XmlWriter,
	},
};
