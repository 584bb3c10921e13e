//! Error types for the XML layer and the round-trip check.

use std::fmt::{self, Display};
use std::io;

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised while writing, reading or verifying a clue.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    position: Option<Position>,
}

/// Location in the markup, as tracked by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Byte offset into the input.
    pub offset: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (byte {})", self.line, self.column, self.offset)
    }
}

/// What went wrong.
#[derive(Debug)]
pub enum ErrorKind {
    /// The output sink refused a write.
    Io(io::Error),
    /// Input ended inside a construct.
    UnexpectedEof,
    /// Malformed markup.
    Syntax(String),
    /// A tag or attribute name is not a valid XML name.
    InvalidName(String),
    /// An element appeared where only text was allowed.
    UnexpectedElement(String),
    /// Text that does not convert to the requested scalar.
    InvalidValue(String),
    /// An element still open at end of input.
    UnclosedTag(String),
    /// A closing tag did not match the open element.
    MismatchedTag {
        /// Name of the open element.
        expected: String,
        /// Name in the closing tag.
        found: String,
    },
    /// An entity or character reference that could not be decoded.
    InvalidEscape(String),
    /// Bytes that are not UTF-8.
    InvalidUtf8,
    /// Message raised through serde.
    Custom(String),
    /// A value shape this crate has no markup for.
    Unsupported(String),
    /// The text read back differs from the text written.
    RoundTripMismatch {
        /// Text held by the clue before serialization.
        written: String,
        /// Text held by the clue after deserialization.
        read: String,
    },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "write failed: {e}"),
            Self::UnexpectedEof => f.write_str("markup ended early"),
            Self::Syntax(msg) => write!(f, "malformed markup: {msg}"),
            Self::InvalidName(name) => write!(f, "'{name}' is not a valid name"),
            Self::UnexpectedElement(name) => write!(f, "element <{name}> not allowed here"),
            Self::InvalidValue(msg) => write!(f, "bad value: {msg}"),
            Self::UnclosedTag(tag) => write!(f, "<{tag}> is never closed"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "</{found}> closes <{expected}>")
            }
            Self::InvalidEscape(entity) => write!(f, "cannot decode '{entity}'"),
            Self::InvalidUtf8 => f.write_str("not UTF-8"),
            Self::Custom(msg) => f.write_str(msg),
            Self::Unsupported(what) => write!(f, "{what} has no markup mapping"),
            Self::RoundTripMismatch { written, read } => write!(
                f,
                "written & read clue's text should match: wrote {written:?}, read {read:?}"
            ),
        }
    }
}

impl Error {
    /// Wraps `kind` without a position.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Records where in the markup the error was found.
    #[must_use]
    pub fn with_position(self, position: Position) -> Self {
        Self {
            position: Some(position),
            ..self
        }
    }

    /// The error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Location of the error, when it came from the reader.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// True for a failed round-trip check.
    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::RoundTripMismatch { .. })
    }

    /// A round-trip check that failed.
    pub fn round_trip_mismatch<S: Into<String>>(written: S, read: S) -> Self {
        Self::new(ErrorKind::RoundTripMismatch {
            written: written.into(),
            read: read.into(),
        })
    }

    pub(crate) fn unexpected_eof() -> Self {
        Self::new(ErrorKind::UnexpectedEof)
    }

    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Syntax(msg.into()))
    }

    pub(crate) fn invalid_name<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::InvalidName(name.into()))
    }

    pub(crate) fn unexpected_element<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::UnexpectedElement(name.into()))
    }

    pub(crate) fn invalid_value<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::InvalidValue(msg.into()))
    }

    pub(crate) fn unclosed_tag<S: Into<String>>(tag: S) -> Self {
        Self::new(ErrorKind::UnclosedTag(tag.into()))
    }

    pub(crate) fn mismatched_tag<S: Into<String>>(expected: S, found: S) -> Self {
        Self::new(ErrorKind::MismatchedTag {
            expected: expected.into(),
            found: found.into(),
        })
    }

    pub(crate) fn invalid_escape<S: Into<String>>(entity: S) -> Self {
        Self::new(ErrorKind::InvalidEscape(entity.into()))
    }

    pub(crate) fn unsupported<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Unsupported(what.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at {}", self.kind, pos),
            None => Display::fmt(&self.kind, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let ErrorKind::Io(e) = &self.kind {
            Some(e)
        } else {
            None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::new(ErrorKind::Io(e))
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::new(ErrorKind::Custom(msg.to_string()))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::new(ErrorKind::Custom(msg.to_string()))
    }
}
