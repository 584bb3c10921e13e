//! Serde deserializer for flat XML records.
//!
//! Mirrors [`ser`](crate::ser): an element maps to a struct, attributes
//! surface as `@name` keys, child elements as keys named after the element,
//! and non-blank character data as `$value`. Whitespace between elements is
//! ignored, while text inside a leaf element is kept exactly as written.
//!
//! A field missing from the markup is simply never visited; what it ends up
//! holding is decided by the visitor, not by the markup.

use crate::error::{Error, ErrorKind, Result};
use crate::reader::{XmlEvent, XmlReader};
use serde::de::{self, DeserializeSeed, MapAccess, Visitor};
use std::marker::PhantomData;

/// Deserializes a value from an XML fragment.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use asymmetric_xml::from_str;
///
/// #[derive(Deserialize)]
/// struct Clue {
///     text: String,
/// }
///
/// let clue: Clue = from_str("<Clue><text>look left</text></Clue>").unwrap();
/// assert_eq!(clue.text, "look left");
/// ```
pub fn from_str<'de, T>(s: &'de str) -> Result<T>
where
    T: de::Deserialize<'de>,
{
    from_str_seed(s, PhantomData::<T>)
}

/// Deserializes a fragment through a stateful [`DeserializeSeed`].
///
/// This is how a value whose shape is only known at runtime (for instance a
/// record with configurable defaults) is read back.
pub fn from_str_seed<'de, S>(s: &'de str, seed: S) -> Result<S::Value>
where
    S: DeserializeSeed<'de>,
{
    let mut de = Deserializer::from_str(s);
    let value = seed.deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// The XML deserializer.
pub struct Deserializer<'de> {
    reader: XmlReader<'de>,
    peeked: Option<XmlEvent<'de>>,
}

impl<'de> Deserializer<'de> {
    /// Creates a deserializer over `s`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &'de str) -> Self {
        Self {
            reader: XmlReader::from_str(s),
            peeked: None,
        }
    }

    /// Fails if anything but whitespace follows the root value.
    pub fn end(&mut self) -> Result<()> {
        match self.peek_structural()? {
            XmlEvent::Eof => Ok(()),
            _ => Err(Error::syntax("trailing content after root element")
                .with_position(self.reader.position())),
        }
    }

    fn peek(&mut self) -> Result<&XmlEvent<'de>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.reader.next_event()?);
        }
        Ok(self.peeked.get_or_insert(XmlEvent::Eof))
    }

    fn next(&mut self) -> Result<XmlEvent<'de>> {
        match self.peeked.take() {
            Some(event) => Ok(event),
            None => self.reader.next_event(),
        }
    }

    /// Peeks past whitespace-only text.
    fn peek_structural(&mut self) -> Result<&XmlEvent<'de>> {
        loop {
            let blank = matches!(self.peek()?, XmlEvent::Text(t) if t.trim().is_empty());
            if !blank {
                break;
            }
            self.next()?;
        }
        self.peek()
    }

    fn next_structural(&mut self) -> Result<XmlEvent<'de>> {
        self.peek_structural()?;
        self.next()
    }

    /// Joins adjacent text events.
    fn collect_text(&mut self) -> Result<String> {
        let mut text = String::new();
        while let XmlEvent::Text(_) = self.peek()? {
            if let XmlEvent::Text(chunk) = self.next()? {
                text.push_str(&chunk);
            }
        }
        Ok(text)
    }

    /// Reads the text of a leaf element, consuming the whole element.
    fn read_leaf_text(&mut self) -> Result<String> {
        match self.next_structural()? {
            XmlEvent::EmptyElement { .. } => Ok(String::new()),
            XmlEvent::StartElement { .. } => {
                let text = self.collect_text()?;
                match self.next()? {
                    XmlEvent::EndElement { .. } => Ok(text),
                    XmlEvent::StartElement { name, .. } | XmlEvent::EmptyElement { name, .. } => {
                        Err(Error::unexpected_element(name.into_owned())
                            .with_position(self.reader.position()))
                    }
                    XmlEvent::Text(_) | XmlEvent::Eof => Err(Error::unexpected_eof()),
                }
            }
            XmlEvent::Text(text) => {
                let mut text = text.into_owned();
                text.push_str(&self.collect_text()?);
                Ok(text)
            }
            XmlEvent::EndElement { .. } | XmlEvent::Eof => {
                Err(Error::invalid_value("expected text content").with_position(self.reader.position()))
            }
        }
    }

    /// Consumes events up to and including the end tag of the element
    /// whose start tag was consumed last.
    fn finish_element(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                XmlEvent::StartElement { .. } => depth += 1,
                XmlEvent::EndElement { .. } if depth == 0 => return Ok(()),
                XmlEvent::EndElement { .. } => depth -= 1,
                XmlEvent::Eof => return Err(Error::unexpected_eof()),
                XmlEvent::EmptyElement { .. } | XmlEvent::Text(_) => {}
            }
        }
    }

    /// Skips one element or text run, whatever it holds.
    fn skip_value(&mut self) -> Result<()> {
        if matches!(self.peek_structural()?, XmlEvent::EndElement { .. } | XmlEvent::Eof) {
            return Ok(());
        }
        match self.next()? {
            XmlEvent::StartElement { .. } => self.finish_element(),
            XmlEvent::Text(_) => self.collect_text().map(drop),
            _ => Ok(()),
        }
    }
}

macro_rules! reject {
    ($($method:ident => $what:expr),* $(,)?) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                Err(Error::unsupported($what))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    reject!(
        deserialize_i8 => "i8 value",
        deserialize_i16 => "i16 value",
        deserialize_i32 => "i32 value",
        deserialize_i64 => "i64 value",
        deserialize_u8 => "u8 value",
        deserialize_u16 => "u16 value",
        deserialize_u32 => "u32 value",
        deserialize_u64 => "u64 value",
        deserialize_f32 => "f32 value",
        deserialize_f64 => "f64 value",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_seq => "sequence",
    );

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.peek_structural()? {
            XmlEvent::StartElement { .. } | XmlEvent::EmptyElement { .. } => {
                self.deserialize_map(visitor)
            }
            XmlEvent::Text(_) => visitor.visit_string(self.collect_text()?),
            XmlEvent::EndElement { .. } | XmlEvent::Eof => visitor.visit_unit(),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_bool(ScalarDeserializer(self.read_leaf_text()?), visitor)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_char(ScalarDeserializer(self.read_leaf_text()?), visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.read_leaf_text()?)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.peek_structural()? {
            XmlEvent::EndElement { .. } | XmlEvent::Eof => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.skip_value()?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::unsupported("tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::unsupported(format!("tuple struct {}", name)))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let (attributes, empty) = match self.next_structural()? {
            XmlEvent::StartElement { attributes, .. } => (attributes, false),
            XmlEvent::EmptyElement { attributes, .. } => (attributes, true),
            _ => {
                return Err(Error::invalid_value("expected an element")
                    .with_position(self.reader.position()))
            }
        };
        let attrs: Vec<(String, String)> = attributes
            .into_iter()
            .map(|a| (format!("@{}", a.name), a.value.into_owned()))
            .collect();

        let value = visitor.visit_map(ElementAccess {
            de: &mut *self,
            attrs: attrs.into_iter(),
            scalar: None,
            done: empty,
        })?;

        if !empty {
            self.finish_element()?;
        }
        Ok(value)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::unsupported(format!("enum {}", name)))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.skip_value()?;
        visitor.visit_unit()
    }
}

/// Walks the attributes, children and text of one element.
struct ElementAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    attrs: std::vec::IntoIter<(String, String)>,
    /// Value of the key just returned, when it was not a child element.
    scalar: Option<String>,
    done: bool,
}

impl<'de> MapAccess<'de> for ElementAccess<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if let Some((key, value)) = self.attrs.next() {
            self.scalar = Some(value);
            return seed.deserialize(ScalarDeserializer(key)).map(Some);
        }
        if self.done {
            return Ok(None);
        }

        let key = match self.de.peek_structural()? {
            XmlEvent::StartElement { name, .. } | XmlEvent::EmptyElement { name, .. } => {
                name.to_string()
            }
            XmlEvent::Text(_) => {
                self.scalar = Some(self.de.collect_text()?);
                "$value".to_string()
            }
            XmlEvent::EndElement { .. } | XmlEvent::Eof => {
                self.done = true;
                return Ok(None);
            }
        };
        seed.deserialize(ScalarDeserializer(key)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.scalar.take() {
            Some(text) => seed.deserialize(ScalarDeserializer(text)),
            None => seed.deserialize(&mut *self.de),
        }
    }
}

/// Deserializer over a single already-extracted string: an attribute value,
/// a `$value` text run, or a map key.
struct ScalarDeserializer(String);

impl<'de> de::Deserializer<'de> for ScalarDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.0)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.0.trim() {
            "true" | "1" => visitor.visit_bool(true),
            "false" | "0" => visitor.visit_bool(false),
            other => Err(Error::invalid_value(format!("expected boolean, got '{}'", other))),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::new(ErrorKind::InvalidValue(format!(
                "expected a single character, got '{}'",
                self.0
            )))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 str string
        bytes byte_buf seq tuple tuple_struct map struct enum identifier
    }
}
