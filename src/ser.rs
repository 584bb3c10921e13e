//! Serde serializer for flat XML records.
//!
//! A struct becomes an element named after the struct (or after the field
//! holding it). Its fields become child elements, except that fields renamed
//! to `@name` become attributes and a field renamed to `$value` becomes the
//! element's text. `None` and skipped fields are left out of the output
//! entirely; an element that ends up with no content is written as `<name/>`.
//!
//! ```rust
//! use serde::Serialize;
//! use asymmetric_xml::to_string;
//!
//! #[derive(Serialize)]
//! struct Clue {
//!     #[serde(rename = "@id")]
//!     id: String,
//!     text: String,
//! }
//!
//! let clue = Clue { id: "c1".to_string(), text: "look left".to_string() };
//! assert_eq!(to_string(&clue).unwrap(), r#"<Clue id="c1"><text>look left</text></Clue>"#);
//! ```
//!
//! Only string-like scalars are mapped. Numbers, bytes, sequences, maps and
//! enums fail with [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported).

use crate::error::{Error, ErrorKind, Result};
use crate::writer::XmlWriter;
use serde::ser::{self, Impossible, Serialize};

/// Serializes a value to an XML fragment.
///
/// The output carries no XML declaration and no namespace declarations.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut serializer = Serializer::new();
    value.serialize(&mut serializer)?;
    serializer.into_string()
}

/// The XML serializer.
pub struct Serializer {
    writer: XmlWriter<Vec<u8>>,
    /// Field name the next value is written under.
    key: Option<&'static str>,
}

impl Serializer {
    /// Creates a serializer writing into a fresh buffer.
    pub fn new() -> Self {
        Self {
            writer: XmlWriter::new(Vec::new()),
            key: None,
        }
    }

    /// Returns the markup written so far.
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|_| Error::new(ErrorKind::InvalidUtf8))
    }

    fn write_scalar(&mut self, text: &str) -> Result<()> {
        match self.key.take() {
            Some(key) => self.writer.write_element(key, text)?,
            None => self.writer.write_text(text)?,
        }
        Ok(())
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! reject_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Self::Ok> {
                Err(Error::unsupported(concat!(stringify!($ty), " value")))
            }
        )*
    };
}

macro_rules! reject_compounds {
    () => {
        fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
            Err(Error::unsupported("sequence"))
        }

        fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
            Err(Error::unsupported("tuple"))
        }

        fn serialize_tuple_struct(
            self,
            name: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeTupleStruct> {
            Err(Error::unsupported(format!("tuple struct {}", name)))
        }

        fn serialize_tuple_variant(
            self,
            name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeTupleVariant> {
            Err(Error::unsupported(format!("enum {}", name)))
        }

        fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
            Err(Error::unsupported("map"))
        }

        fn serialize_struct_variant(
            self,
            name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeStructVariant> {
            Err(Error::unsupported(format!("enum {}", name)))
        }

        fn serialize_unit_variant(
            self,
            name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
        ) -> Result<Self::Ok> {
            Err(Error::unsupported(format!("enum {}", name)))
        }

        fn serialize_newtype_variant<T>(
            self,
            name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _value: &T,
        ) -> Result<Self::Ok>
        where
            T: Serialize + ?Sized,
        {
            Err(Error::unsupported(format!("enum {}", name)))
        }

        fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
            Err(Error::unsupported("bytes"))
        }
    };
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = StructSerializer<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    reject_scalars!(
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
    );
    reject_compounds!();

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_scalar(if v { "true" } else { "false" })
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.write_scalar(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_scalar(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.key = None;
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.write_scalar("")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        let name = self.key.take().unwrap_or(name);
        self.writer.write_element(name, "")?;
        Ok(())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        let name = self.key.take().unwrap_or(name);
        Ok(StructSerializer {
            ser: self,
            name,
            attrs: Vec::new(),
            text: None,
            started: false,
        })
    }
}

/// Renders a scalar to its string form, for attributes and `$value` text.
///
/// `None` renders to nothing, so optional attributes disappear when unset.
struct ScalarSerializer;

impl ser::Serializer for ScalarSerializer {
    type Ok = Option<String>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<String>, Error>;
    type SerializeTuple = Impossible<Option<String>, Error>;
    type SerializeTupleStruct = Impossible<Option<String>, Error>;
    type SerializeTupleVariant = Impossible<Option<String>, Error>;
    type SerializeMap = Impossible<Option<String>, Error>;
    type SerializeStruct = Impossible<Option<String>, Error>;
    type SerializeStructVariant = Impossible<Option<String>, Error>;

    reject_scalars!(
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
    );
    reject_compounds!();

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(Some(String::new()))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(Some(String::new()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::unsupported(format!("struct {} as attribute or text", name)))
    }
}

/// Struct serializer. Attributes are buffered until the start tag is written.
pub struct StructSerializer<'a> {
    ser: &'a mut Serializer,
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    started: bool,
}

impl StructSerializer<'_> {
    fn start(&mut self) -> Result<()> {
        if !self.started {
            self.ser.writer.start_element(self.name)?;
            for (name, value) in self.attrs.drain(..) {
                self.ser.writer.write_attribute(name, &value)?;
            }
            self.started = true;
        }
        Ok(())
    }
}

impl ser::SerializeStruct for StructSerializer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if let Some(attr) = key.strip_prefix('@') {
            if self.started {
                return Err(Error::unsupported(format!(
                    "attribute '{}' declared after a child element",
                    attr
                )));
            }
            if let Some(value) = value.serialize(ScalarSerializer)? {
                self.attrs.push((attr, value));
            }
            return Ok(());
        }

        if key == "$value" || key == "$text" {
            self.text = value.serialize(ScalarSerializer)?;
            return Ok(());
        }

        self.start()?;
        self.ser.key = Some(key);
        value.serialize(&mut *self.ser)
    }

    fn end(mut self) -> Result<()> {
        self.start()?;
        if let Some(text) = self.text.take() {
            self.ser.writer.write_text(&text)?;
        }
        self.ser.writer.end_element()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Clue {
        text: String,
    }

    #[test]
    fn test_single_field() {
        let clue = Clue {
            text: "Nothing To See Here".to_string(),
        };
        assert_eq!(
            to_string(&clue).unwrap(),
            "<Clue><text>Nothing To See Here</text></Clue>"
        );
    }

    #[test]
    fn test_empty_string_field() {
        let clue = Clue { text: String::new() };
        assert_eq!(to_string(&clue).unwrap(), "<Clue><text/></Clue>");
    }

    #[test]
    fn test_skipped_field_leaves_empty_root() {
        #[derive(Serialize)]
        struct Clue {
            #[serde(skip_serializing_if = "String::is_empty")]
            text: String,
        }

        let xml = to_string(&Clue { text: String::new() }).unwrap();
        assert_eq!(xml, "<Clue/>");
    }

    #[test]
    fn test_optional_field() {
        #[derive(Serialize)]
        struct Note {
            title: String,
            body: Option<String>,
        }

        let without = Note {
            title: "t".to_string(),
            body: None,
        };
        assert_eq!(to_string(&without).unwrap(), "<Note><title>t</title></Note>");

        let with = Note {
            title: "t".to_string(),
            body: Some("b".to_string()),
        };
        assert_eq!(
            to_string(&with).unwrap(),
            "<Note><title>t</title><body>b</body></Note>"
        );
    }

    #[test]
    fn test_attributes_and_text() {
        #[derive(Serialize)]
        struct Hint {
            #[serde(rename = "@lang")]
            lang: String,
            #[serde(rename = "@draft")]
            draft: Option<bool>,
            #[serde(rename = "$value")]
            body: String,
        }

        let hint = Hint {
            lang: "en".to_string(),
            draft: None,
            body: "look \"up\"".to_string(),
        };
        assert_eq!(to_string(&hint).unwrap(), r#"<Hint lang="en">look "up"</Hint>"#);
    }

    #[test]
    fn test_nested_struct_takes_field_name() {
        #[derive(Serialize)]
        struct Inner {
            text: String,
        }

        #[derive(Serialize)]
        struct Outer {
            clue: Inner,
        }

        let outer = Outer {
            clue: Inner {
                text: "x".to_string(),
            },
        };
        assert_eq!(
            to_string(&outer).unwrap(),
            "<Outer><clue><text>x</text></clue></Outer>"
        );
    }

    #[test]
    fn test_escaping() {
        let clue = Clue {
            text: "<b> & c".to_string(),
        };
        assert_eq!(
            to_string(&clue).unwrap(),
            "<Clue><text>&lt;b&gt; &amp; c</text></Clue>"
        );
    }

    #[test]
    fn test_bool_and_char() {
        #[derive(Serialize)]
        struct Flags {
            solved: bool,
            mark: char,
        }

        let flags = Flags {
            solved: true,
            mark: 'x',
        };
        assert_eq!(
            to_string(&flags).unwrap(),
            "<Flags><solved>true</solved><mark>x</mark></Flags>"
        );
    }

    #[test]
    fn test_unit_struct() {
        #[derive(Serialize)]
        struct Empty;

        assert_eq!(to_string(&Empty).unwrap(), "<Empty/>");
    }

    #[test]
    fn test_numbers_are_unsupported() {
        #[derive(Serialize)]
        struct Count {
            n: u32,
        }

        let err = to_string(&Count { n: 3 }).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Unsupported(_)));
    }

    #[test]
    fn test_sequences_are_unsupported() {
        #[derive(Serialize)]
        struct Many {
            items: Vec<String>,
        }

        let err = to_string(&Many { items: vec![] }).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Unsupported(_)));
    }
}
