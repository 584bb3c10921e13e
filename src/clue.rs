//! The `Clue` record and its serde glue.
//!
//! A [`ClueDefinition`] plays the role of the type definition: it carries the
//! emit policy for `text` and the value the constructor puts there. The
//! definition is a runtime value so that every combination of mitigations can
//! be exercised in one build.

use crate::config::Mitigations;
use crate::policy::EmitPolicy;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use tracing::debug;

/// The declared default for [`Clue::text`].
pub const NOTHING_TO_SEE_HERE: &str = "Nothing To See Here";

const FIELDS: &[&str] = &["text"];

/// The record that gets written and read back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clue {
    /// The clue itself.
    pub text: String,
}

impl Clue {
    /// Creates a clue holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// How clues are constructed and which values are left out when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClueDefinition {
    /// Emit policy for `text`.
    pub text: EmitPolicy,
    /// Value `text` holds right after construction; `None` is the zero value.
    pub initial_text: Option<&'static str>,
}

impl ClueDefinition {
    /// Builds the definition selected by `mitigations`.
    pub fn from_mitigations(mitigations: Mitigations) -> Self {
        let text = if mitigations.no_default_hint {
            EmitPolicy::Always
        } else {
            EmitPolicy::IfNotEqual(NOTHING_TO_SEE_HERE)
        };
        let initial_text = mitigations.constructor_default.then_some(NOTHING_TO_SEE_HERE);
        Self { text, initial_text }
    }

    /// A freshly constructed clue, before any field is assigned.
    pub fn construct(&self) -> Clue {
        Clue {
            text: self.initial_text.unwrap_or_default().to_owned(),
        }
    }

    /// Wraps `clue` so that it serializes under this definition.
    pub fn view<'a>(&'a self, clue: &'a Clue) -> ClueView<'a> {
        ClueView {
            clue,
            definition: self,
        }
    }
}

impl Default for ClueDefinition {
    fn default() -> Self {
        Self::from_mitigations(Mitigations::from_features())
    }
}

/// A clue paired with the definition that decides what gets written.
#[derive(Debug, Clone, Copy)]
pub struct ClueView<'a> {
    clue: &'a Clue,
    definition: &'a ClueDefinition,
}

impl Serialize for ClueView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let emit = self.definition.text.should_emit(&self.clue.text);
        let mut state = serializer.serialize_struct("Clue", usize::from(emit))?;
        if emit {
            state.serialize_field("text", &self.clue.text)?;
        } else {
            debug!(policy = %self.definition.text, "omitting clue text");
            state.skip_field("text")?;
        }
        state.end()
    }
}

impl<'de> DeserializeSeed<'de> for &ClueDefinition {
    type Value = Clue;

    fn deserialize<D>(self, deserializer: D) -> Result<Clue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_struct("Clue", FIELDS, ClueVisitor { definition: self })
    }
}

struct ClueVisitor<'a> {
    definition: &'a ClueDefinition,
}

impl<'de> Visitor<'de> for ClueVisitor<'_> {
    type Value = Clue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a Clue element")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Clue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut clue = self.definition.construct();
        let mut seen = false;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "text" => {
                    if seen {
                        return Err(de::Error::duplicate_field("text"));
                    }
                    clue.text = map.next_value()?;
                    seen = true;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        if !seen {
            debug!(text = %clue.text, "clue text absent, keeping constructed value");
        }
        Ok(clue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::from_str_seed;
    use crate::ser::to_string;

    #[test]
    fn test_definitions_per_mode() {
        let [none, hintless, ctor, both] = Mitigations::ALL.map(ClueDefinition::from_mitigations);

        assert_eq!(none.text, EmitPolicy::IfNotEqual(NOTHING_TO_SEE_HERE));
        assert_eq!(none.initial_text, None);

        assert_eq!(hintless.text, EmitPolicy::Always);
        assert_eq!(hintless.initial_text, None);

        assert_eq!(ctor.text, EmitPolicy::IfNotEqual(NOTHING_TO_SEE_HERE));
        assert_eq!(ctor.initial_text, Some(NOTHING_TO_SEE_HERE));

        assert_eq!(both.text, EmitPolicy::Always);
        assert_eq!(both.initial_text, Some(NOTHING_TO_SEE_HERE));
    }

    #[test]
    fn test_construct() {
        let plain = ClueDefinition::from_mitigations(Mitigations::NONE);
        assert_eq!(plain.construct(), Clue::default());

        let ctor = ClueDefinition::from_mitigations(Mitigations {
            no_default_hint: false,
            constructor_default: true,
        });
        assert_eq!(ctor.construct().text, NOTHING_TO_SEE_HERE);
    }

    #[test]
    fn test_view_omits_hinted_default() {
        let def = ClueDefinition::from_mitigations(Mitigations::NONE);
        let clue = Clue::with_text(NOTHING_TO_SEE_HERE);
        assert_eq!(to_string(&def.view(&clue)).unwrap(), "<Clue/>");
    }

    #[test]
    fn test_view_writes_other_values() {
        let def = ClueDefinition::from_mitigations(Mitigations::NONE);
        let clue = Clue::with_text("Look behind the clock");
        assert_eq!(
            to_string(&def.view(&clue)).unwrap(),
            "<Clue><text>Look behind the clock</text></Clue>"
        );
    }

    #[test]
    fn test_view_without_hint_writes_default() {
        let def = ClueDefinition::from_mitigations(Mitigations::ALL[1]);
        let clue = Clue::with_text(NOTHING_TO_SEE_HERE);
        assert_eq!(
            to_string(&def.view(&clue)).unwrap(),
            "<Clue><text>Nothing To See Here</text></Clue>"
        );
    }

    #[test]
    fn test_seed_absent_field_uses_constructed_value() {
        let plain = ClueDefinition::from_mitigations(Mitigations::NONE);
        assert_eq!(from_str_seed("<Clue/>", &plain).unwrap().text, "");

        let ctor = ClueDefinition::from_mitigations(Mitigations::ALL[2]);
        assert_eq!(
            from_str_seed("<Clue/>", &ctor).unwrap().text,
            NOTHING_TO_SEE_HERE
        );
    }

    #[test]
    fn test_seed_present_field_overwrites() {
        let ctor = ClueDefinition::from_mitigations(Mitigations::ALL[2]);
        let clue = from_str_seed("<Clue><text/></Clue>", &ctor).unwrap();
        assert_eq!(clue.text, "");

        let clue = from_str_seed("<Clue><text> spaced </text></Clue>", &ctor).unwrap();
        assert_eq!(clue.text, " spaced ");
    }

    #[test]
    fn test_seed_skips_unknown_children() {
        let def = ClueDefinition::from_mitigations(Mitigations::NONE);
        let clue = from_str_seed(
            "<Clue>\n  <hint><deeper/></hint>\n  <text>found</text>\n</Clue>",
            &def,
        )
        .unwrap();
        assert_eq!(clue.text, "found");
    }

    #[test]
    fn test_seed_rejects_duplicate_text() {
        let def = ClueDefinition::from_mitigations(Mitigations::NONE);
        let err = from_str_seed("<Clue><text>a</text><text>b</text></Clue>", &def).unwrap_err();
        assert!(err.to_string().contains("duplicate field"));
    }
}
