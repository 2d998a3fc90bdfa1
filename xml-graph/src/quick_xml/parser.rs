use crate::{
	io::{
		PullEvent,
		PullParser,
		PullReader,
	},
	Result,
};
use quick_xml::events::{
	BytesStart,
	Event,
};
use std::io::BufRead;

/// `PullParser` adaptor for `quick_xml::Reader`
pub struct XmlParser<B: BufRead> {
	reader: quick_xml::Reader<B>,
	buf: Vec<u8>,
}

impl<B: BufRead> XmlParser<B> {
	/// Wrap a reader
	///
	/// Self-closing elements get expanded to start and end events; text is passed on untrimmed.
	pub fn new(mut reader: quick_xml::Reader<B>) -> Self {
		reader.expand_empty_elements(true);
		reader.trim_text(false);
		Self {
			reader,
			buf: Vec::new(),
		}
	}

	/// Read from a buffered stream
	pub fn from_reader(input: B) -> Self {
		Self::new(quick_xml::Reader::from_reader(input))
	}

	/// Position in the input (useful for error messages)
	pub fn buffer_position(&self) -> usize {
		self.reader.buffer_position()
	}
}

impl<'a> XmlParser<&'a [u8]> {
	/// Read from a string
	pub fn from_str(input: &'a str) -> Self {
		Self::new(quick_xml::Reader::from_str(input))
	}
}

fn start_event<B: BufRead>(reader: &quick_xml::Reader<B>, start: &BytesStart<'_>) -> Result<PullEvent> {
	let name = reader.decode(start.name()).into_owned();
	let mut attributes = Vec::new();
	for attr in start.attributes() {
		let attr = attr?;
		let key = reader.decode(attr.key).into_owned();
		let value = attr.unescape_and_decode_value(reader)?;
		attributes.push((key, value));
	}
	Ok(PullEvent::Start { name, attributes })
}

impl<B: BufRead> PullParser for XmlParser<B> {
	fn pull(&mut self) -> Result<PullEvent> {
		loop {
			self.buf.clear();
			let event = match self.reader.read_event(&mut self.buf)? {
				Event::Start(s) | Event::Empty(s) => start_event(&self.reader, &s)?,
				Event::End(_) => PullEvent::End,
				// quick-xml stores CDATA content escaped
				Event::Text(t) | Event::CData(t) => PullEvent::Text(t.unescape_and_decode(&self.reader)?),
				Event::Comment(_) => PullEvent::Comment,
				Event::Eof => PullEvent::Eof,
				// declaration, doctype and processing instructions carry no data
				Event::Decl(_) | Event::DocType(_) | Event::PI(_) => continue,
			};
			return Ok(event);
		}
	}
}

/// `HierarchicalReader` for XML documents
pub type XmlReader<B> = PullReader<XmlParser<B>>;

/// Reader for a document in a string, positioned on the root element
pub fn reader_from_str(input: &str) -> Result<XmlReader<&[u8]>> {
	PullReader::new(XmlParser::from_str(input))
}
