use crate::{
	errors,
	io::{
		BufferedWriter,
		NodeSink,
		Token,
	},
	Result,
};
use quick_xml::events::{
	BytesDecl,
	BytesEnd,
	BytesStart,
	BytesText,
	Event,
};
use std::io;

/// `NodeSink` adaptor for `quick_xml::Writer`
pub struct XmlSink<W: io::Write> {
	writer: quick_xml::Writer<W>,
	declaration: bool,
}

impl<W: io::Write> XmlSink<W> {
	/// Write compact output
	pub fn new(inner: W) -> Self {
		Self::from_writer(quick_xml::Writer::new(inner))
	}

	/// Write indented output (`indent` spaces per level)
	pub fn with_indent(inner: W, indent: usize) -> Self {
		Self::from_writer(quick_xml::Writer::new_with_indent(inner, b' ', indent))
	}

	/// Wrap a configured writer
	pub fn from_writer(writer: quick_xml::Writer<W>) -> Self {
		Self {
			writer,
			declaration: false,
		}
	}

	/// Emit an XML declaration before the first element
	pub fn with_declaration(mut self) -> Self {
		self.declaration = true;
		self
	}

	/// Unwrap the output
	pub fn into_inner(self) -> W {
		self.writer.into_inner()
	}

	fn start(name: &str, attributes: &[(String, String)]) -> BytesStart<'static> {
		let mut start = BytesStart::owned_name(name.as_bytes().to_vec());
		for (key, value) in attributes {
			// escapes the value
			start.push_attribute((key.as_str(), value.as_str()));
		}
		start
	}

	fn write_declaration(&mut self) -> Result<()> {
		if self.declaration {
			self.declaration = false;
			self.writer
				.write_event(Event::Decl(BytesDecl::new(b"1.0", Some(b"UTF-8"), None)))?;
		}
		Ok(())
	}
}

impl<W: io::Write> NodeSink for XmlSink<W> {
	fn emit(&mut self, token: Token<'_>) -> Result<()> {
		match token {
			Token::Start { name, attributes } => {
				self.write_declaration()?;
				self.writer.write_event(Event::Start(Self::start(name, attributes)))?;
			},
			Token::Empty { name, attributes } => {
				self.write_declaration()?;
				self.writer.write_event(Event::Empty(Self::start(name, attributes)))?;
			},
			Token::Text(text) => {
				self.writer
					.write_event(Event::Text(BytesText::from_plain_str(text)))?;
			},
			Token::End(name) => {
				self.writer
					.write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
			},
		}
		Ok(())
	}

	fn flush(&mut self) -> Result<()> {
		io::Write::flush(self.writer.inner())?;
		Ok(())
	}
}

/// `HierarchicalWriter` producing XML
pub type XmlWriter<W> = BufferedWriter<XmlSink<W>>;

/// Take the document out of a finished in-memory writer
pub fn finish_string(writer: XmlWriter<Vec<u8>>) -> Result<String> {
	let buf = writer.into_inner()?.into_inner();
	String::from_utf8(buf).map_err(|e| errors::stream(format!("output not utf-8: {}", e)))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::io::HierarchicalWriter;

	fn write(sink: XmlSink<Vec<u8>>) -> String {
		let mut w = BufferedWriter::new(sink);
		w.start_node("person").unwrap();
		w.add_attribute("note", "a \"b\" & c").unwrap();
		w.start_node("name").unwrap();
		w.set_value("joe <j>").unwrap();
		w.end_node().unwrap();
		w.start_node("null").unwrap();
		w.end_node().unwrap();
		w.end_node().unwrap();
		finish_string(w).unwrap()
	}

	#[test]
	fn compact() {
		assert_eq!(
			write(XmlSink::new(Vec::new())),
			r#"<person note="a &quot;b&quot; &amp; c"><name>joe &lt;j&gt;</name><null/></person>"#
		);
	}

	#[test]
	fn declaration() {
		let out = write(XmlSink::new(Vec::new()).with_declaration());
		assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><person "#));
	}

	#[test]
	fn indented_output_reads_back() {
		use crate::{
			io::HierarchicalReader,
			quick_xml::reader_from_str,
		};

		let out = write(XmlSink::with_indent(Vec::new(), 2));
		assert!(out.contains('\n'));
		let mut r = reader_from_str(&out).unwrap();
		assert_eq!(r.attribute("note"), Some("a \"b\" & c"));
		r.move_down().unwrap();
		assert_eq!(r.value().unwrap(), "joe <j>");
	}
}
