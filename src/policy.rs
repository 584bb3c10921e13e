//! Field-level emit policy: the explicit form of a "default value" hint.

use std::fmt;

/// Decides whether a field's value is written to the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Always write the field.
    Always,
    /// Leave the field out when its value equals the given default.
    IfNotEqual(&'static str),
}

impl EmitPolicy {
    /// Returns true when `value` has to be written.
    #[inline]
    pub fn should_emit(&self, value: &str) -> bool {
        match self {
            Self::Always => true,
            Self::IfNotEqual(default) => value != *default,
        }
    }

    /// The hinted default, if any.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            Self::Always => None,
            Self::IfNotEqual(default) => Some(default),
        }
    }
}

impl fmt::Display for EmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::IfNotEqual(default) => write!(f, "emit_if_not_equal: {:?}", default),
        }
    }
}
