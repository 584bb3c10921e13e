//! Low-level XML writer.
//!
//! Writes bare fragments: no declaration, no namespaces, no indentation.
//! Elements that receive no content are closed as `<name/>`.

use crate::escape::{escape_attr, escape_text};
use std::io::{self, Write};

/// An XML writer that produces well-formed fragments.
pub struct XmlWriter<W: Write> {
    writer: W,
    open: Vec<String>,
    /// The last start tag is still waiting for its `>`.
    in_tag: bool,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a new XML writer.
    #[inline]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            open: Vec::new(),
            in_tag: false,
        }
    }

    /// Returns the inner writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Returns the current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Opens an element. Attributes may follow until content is written.
    pub fn start_element(&mut self, name: &str) -> io::Result<()> {
        self.close_start_tag()?;
        write!(self.writer, "<{}", name)?;
        self.open.push(name.to_string());
        self.in_tag = true;
        Ok(())
    }

    /// Adds an attribute to the element opened last.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> io::Result<()> {
        if !self.in_tag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "attributes must follow start_element directly",
            ));
        }
        write!(self.writer, " {}=\"{}\"", name, escape_attr(value))
    }

    /// Writes escaped character data. Empty text writes nothing.
    pub fn write_text(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.close_start_tag()?;
        self.writer.write_all(escape_text(text).as_bytes())
    }

    /// Closes the element opened last.
    pub fn end_element(&mut self) -> io::Result<()> {
        let name = self.open.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no element to close")
        })?;
        if self.in_tag {
            self.in_tag = false;
            self.writer.write_all(b"/>")
        } else {
            write!(self.writer, "</{}>", name)
        }
    }

    /// Writes `<name>text</name>`, or `<name/>` for empty text.
    pub fn write_element(&mut self, name: &str, text: &str) -> io::Result<()> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element()
    }

    fn close_start_tag(&mut self) -> io::Result<()> {
        if self.in_tag {
            self.in_tag = false;
            self.writer.write_all(b">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut XmlWriter<Vec<u8>>) -> io::Result<()>,
    {
        let mut writer = XmlWriter::new(Vec::new());
        f(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_element_self_closes() {
        let xml = write_to_string(|w| {
            w.start_element("Clue")?;
            w.end_element()
        });
        assert_eq!(xml, "<Clue/>");
    }

    #[test]
    fn test_nested_text_element() {
        let xml = write_to_string(|w| {
            w.start_element("Clue")?;
            w.write_element("text", "Nothing To See Here")?;
            w.end_element()
        });
        assert_eq!(xml, "<Clue><text>Nothing To See Here</text></Clue>");
    }

    #[test]
    fn test_empty_text_element() {
        let xml = write_to_string(|w| w.write_element("text", ""));
        assert_eq!(xml, "<text/>");
    }

    #[test]
    fn test_attributes_are_escaped() {
        let xml = write_to_string(|w| {
            w.start_element("Clue")?;
            w.write_attribute("text", "a \"b\" & c")?;
            w.end_element()
        });
        assert_eq!(xml, r#"<Clue text="a &quot;b&quot; &amp; c"/>"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = write_to_string(|w| w.write_element("text", "<x> & \"y\""));
        assert_eq!(xml, "<text>&lt;x&gt; &amp; \"y\"</text>");
    }

    #[test]
    fn test_attribute_after_content_fails() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_element("Clue").unwrap();
        writer.write_text("hi").unwrap();
        assert!(writer.write_attribute("late", "x").is_err());
    }

    #[test]
    fn test_end_without_start_fails() {
        let mut writer = XmlWriter::new(Vec::new());
        assert!(writer.end_element().is_err());
    }

    #[test]
    fn test_depth() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_element("a").unwrap();
        writer.start_element("b").unwrap();
        assert_eq!(writer.depth(), 2);
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        assert_eq!(writer.depth(), 0);
    }
}
