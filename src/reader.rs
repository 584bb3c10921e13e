//! Pull tokenizer for the XML fragments this crate writes.
//!
//! Produces start, end and empty element events plus text. Declarations,
//! processing instructions and comments are skipped. Text is delivered
//! verbatim (after entity decoding); callers decide what whitespace means.

use crate::error::{Error, ErrorKind, Position, Result};
use crate::escape::unescape;
use memchr::{memchr, memmem};
use std::borrow::Cow;

/// An XML event produced by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// `<name attr="value">`
    StartElement {
        /// Element name.
        name: Cow<'a, str>,
        /// Element attributes, in document order.
        attributes: Vec<Attribute<'a>>,
    },
    /// `</name>`
    EndElement {
        /// Element name.
        name: Cow<'a, str>,
    },
    /// `<name attr="value"/>`
    EmptyElement {
        /// Element name.
        name: Cow<'a, str>,
        /// Element attributes, in document order.
        attributes: Vec<Attribute<'a>>,
    },
    /// Character data between tags.
    Text(Cow<'a, str>),
    /// End of input.
    Eof,
}

/// An XML attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    /// The attribute name.
    pub name: Cow<'a, str>,
    /// The decoded attribute value.
    pub value: Cow<'a, str>,
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

#[inline]
fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

/// Zero-copy XML reader over a string slice.
pub struct XmlReader<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    open: Vec<&'a str>,
}

impl<'a> XmlReader<'a> {
    /// Creates a reader over `input`.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            open: Vec::with_capacity(4),
        }
    }

    /// Returns the current position in the input.
    #[inline]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.col,
            offset: self.pos,
        }
    }

    /// Number of currently open elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Reads the next event.
    pub fn next_event(&mut self) -> Result<XmlEvent<'a>> {
        loop {
            let bytes = self.input.as_bytes();
            if self.pos >= bytes.len() {
                if let Some(tag) = self.open.last() {
                    return Err(Error::unclosed_tag(*tag).with_position(self.position()));
                }
                return Ok(XmlEvent::Eof);
            }

            if bytes[self.pos] != b'<' {
                return self.read_text();
            }

            match bytes.get(self.pos + 1) {
                Some(b'/') => return self.read_end_element(),
                Some(b'?') => self.skip_past("?>", "unterminated processing instruction")?,
                Some(b'!') if self.rest().starts_with("<!--") => {
                    self.skip_past("-->", "unterminated comment")?
                }
                Some(b'!') => {
                    return Err(Error::syntax("unsupported markup declaration")
                        .with_position(self.position()))
                }
                Some(_) => return self.read_start_element(),
                None => return Err(Error::unexpected_eof().with_position(self.position())),
            }
        }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Moves the cursor forward by `n` bytes, keeping line/column in step.
    fn advance(&mut self, n: usize) {
        let end = self.pos + n;
        for &b in &self.input.as_bytes()[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                self.col += 1;
            }
        }
        self.pos = end;
    }

    fn skip_whitespace(&mut self) {
        let n = self
            .rest()
            .bytes()
            .take_while(|&b| is_whitespace(b))
            .count();
        self.advance(n);
    }

    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<()> {
        match memmem::find(self.rest().as_bytes(), terminator.as_bytes()) {
            Some(at) => {
                self.advance(at + terminator.len());
                Ok(())
            }
            None => Err(Error::syntax(what).with_position(self.position())),
        }
    }

    fn read_text(&mut self) -> Result<XmlEvent<'a>> {
        let start = self.position();
        let len = memchr(b'<', self.rest().as_bytes()).unwrap_or(self.rest().len());
        let raw = &self.rest()[..len];
        self.advance(len);

        match unescape(raw) {
            Ok(text) => Ok(XmlEvent::Text(text)),
            Err(e) => Err(Error::invalid_escape(e.entity).with_position(Position {
                offset: start.offset + e.position,
                ..start
            })),
        }
    }

    fn read_start_element(&mut self) -> Result<XmlEvent<'a>> {
        self.advance(1);
        let name = self.read_name()?;
        let attributes = self.read_attributes()?;

        if self.rest().starts_with("/>") {
            self.advance(2);
            Ok(XmlEvent::EmptyElement {
                name: Cow::Borrowed(name),
                attributes,
            })
        } else if self.rest().starts_with('>') {
            self.advance(1);
            self.open.push(name);
            Ok(XmlEvent::StartElement {
                name: Cow::Borrowed(name),
                attributes,
            })
        } else if self.rest().is_empty() {
            Err(Error::unexpected_eof().with_position(self.position()))
        } else {
            Err(Error::syntax("expected '>' or '/>'").with_position(self.position()))
        }
    }

    fn read_end_element(&mut self) -> Result<XmlEvent<'a>> {
        self.advance(2);
        let name = self.read_name()?;
        self.skip_whitespace();
        self.expect('>')?;

        match self.open.pop() {
            Some(open) if open == name => Ok(XmlEvent::EndElement {
                name: Cow::Borrowed(name),
            }),
            Some(open) => Err(Error::mismatched_tag(open, name).with_position(self.position())),
            None => Err(Error::syntax(format!("closing tag </{}> without open element", name))
                .with_position(self.position())),
        }
    }

    fn read_name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        match rest.bytes().next() {
            None => return Err(Error::unexpected_eof().with_position(self.position())),
            Some(b) if !is_name_start(b) => {
                return Err(Error::invalid_name(format!(
                    "name cannot start with {:?}",
                    rest.chars().next().unwrap_or_default()
                ))
                .with_position(self.position()))
            }
            Some(_) => {}
        }
        let len = rest.bytes().take_while(|&b| is_name_char(b)).count();
        self.advance(len);
        Ok(&rest[..len])
    }

    fn read_attributes(&mut self) -> Result<Vec<Attribute<'a>>> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.rest().bytes().next() {
                None | Some(b'>') | Some(b'/') => return Ok(attributes),
                Some(_) => {}
            }

            let name = self.read_name()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            let value = self.read_attribute_value()?;

            if attributes.iter().any(|a: &Attribute<'_>| a.name == name) {
                return Err(Error::syntax(format!("duplicate attribute '{}'", name))
                    .with_position(self.position()));
            }
            attributes.push(Attribute {
                name: Cow::Borrowed(name),
                value,
            });
        }
    }

    fn read_attribute_value(&mut self) -> Result<Cow<'a, str>> {
        let quote = match self.rest().bytes().next() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(Error::syntax("expected quote").with_position(self.position())),
            None => return Err(Error::unexpected_eof().with_position(self.position())),
        };
        self.advance(1);

        let start = self.position();
        let rest = self.rest();
        let Some(len) = memchr(quote, rest.as_bytes()) else {
            return Err(Error::syntax("unterminated attribute value").with_position(start));
        };
        self.advance(len + 1);

        unescape(&rest[..len]).map_err(|e| {
            Error::invalid_escape(e.entity).with_position(Position {
                offset: start.offset + e.position,
                ..start
            })
        })
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.rest().chars().next() {
            Some(c) if c == expected => {
                self.advance(1);
                Ok(())
            }
            Some(c) => Err(Error::syntax(format!("expected '{}', found '{}'", expected, c))
                .with_position(self.position())),
            None => Err(Error::new(ErrorKind::UnexpectedEof).with_position(self.position())),
        }
    }
}
