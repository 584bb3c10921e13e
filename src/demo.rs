//! The write/read round trip and its report.

use crate::clue::{Clue, ClueDefinition, NOTHING_TO_SEE_HERE};
use crate::config::Mitigations;
use crate::de::from_str_seed;
use crate::error::{Error, Result};
use crate::ser::to_string;
use std::fmt;
use tracing::{debug, warn};

/// Writes `clue` as markup under `definition`.
///
/// ```
/// use asymmetric_xml::{serialize, Clue, ClueDefinition, Mitigations};
///
/// let def = ClueDefinition::from_mitigations(Mitigations::NONE);
/// assert_eq!(serialize(&Clue::with_text("Nothing To See Here"), &def).unwrap(), "<Clue/>");
/// ```
pub fn serialize(clue: &Clue, definition: &ClueDefinition) -> Result<String> {
    let xml = to_string(&definition.view(clue))?;
    debug!(%xml, "serialized clue");
    Ok(xml)
}

/// Reads a clue back from markup, starting from a clue built by `definition`.
pub fn deserialize(xml: &str, definition: &ClueDefinition) -> Result<Clue> {
    from_str_seed(xml, definition)
}

/// Everything one round trip produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    /// Fixes in effect.
    pub mitigations: Mitigations,
    /// The clue that was written.
    pub original: Clue,
    /// Markup written for `original`.
    pub persisted: String,
    /// The clue read back from `persisted`.
    pub read: Clue,
    /// Markup written for `read`.
    pub repersisted: String,
}

impl RoundTrip {
    /// True when the text read back equals the text written.
    pub fn holds(&self) -> bool {
        self.original.text == self.read.text
    }

    /// Fails with [`ErrorKind::RoundTripMismatch`](crate::ErrorKind::RoundTripMismatch)
    /// unless the round trip holds.
    pub fn verify(&self) -> Result<()> {
        if self.holds() {
            return Ok(());
        }
        warn!(
            mode = %self.mitigations,
            written = %self.original.text,
            read = %self.read.text,
            "round trip lost the clue text"
        );
        Err(Error::round_trip_mismatch(
            self.original.text.as_str(),
            self.read.text.as_str(),
        ))
    }
}

impl fmt::Display for RoundTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Clue text value: {}", self.original.text)?;
        writeln!(f, "Clue persisted:  {}", self.persisted)?;
        writeln!(f, "Read Clue text value: {}", self.read.text)?;
        write!(f, "Read Clue: {}", self.repersisted)
    }
}

/// Writes a clue holding `text`, reads it back and writes the result again.
pub fn round_trip(text: &str, mitigations: Mitigations) -> Result<RoundTrip> {
    let definition = ClueDefinition::from_mitigations(mitigations);

    let mut original = definition.construct();
    original.text = text.to_owned();

    let persisted = serialize(&original, &definition)?;
    let read = deserialize(&persisted, &definition)?;
    let repersisted = serialize(&read, &definition)?;

    Ok(RoundTrip {
        mitigations,
        original,
        persisted,
        read,
        repersisted,
    })
}

/// Round-trips the declared default under `mitigations`.
///
/// ```
/// use asymmetric_xml::{run_demo, Mitigations};
///
/// let unmitigated = run_demo(Mitigations::NONE).unwrap();
/// assert!(!unmitigated.holds());
///
/// for mitigations in &Mitigations::ALL[1..] {
///     assert!(run_demo(*mitigations).unwrap().holds());
/// }
/// ```
pub fn run_demo(mitigations: Mitigations) -> Result<RoundTrip> {
    round_trip(NOTHING_TO_SEE_HERE, mitigations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    const HINTLESS: Mitigations = Mitigations {
        no_default_hint: true,
        constructor_default: false,
    };
    const CTOR: Mitigations = Mitigations {
        no_default_hint: false,
        constructor_default: true,
    };

    #[test]
    fn test_unmitigated_loses_default() {
        let trip = run_demo(Mitigations::NONE).unwrap();
        assert_eq!(trip.persisted, "<Clue/>");
        assert_eq!(trip.read.text, "");
        assert_ne!(trip.read.text, trip.original.text);
        assert!(!trip.holds());
    }

    #[test]
    fn test_unmitigated_verify_reports_mismatch() {
        let err = run_demo(Mitigations::NONE).unwrap().verify().unwrap_err();
        assert!(err.is_mismatch());
        match err.kind() {
            ErrorKind::RoundTripMismatch { written, read } => {
                assert_eq!(written, NOTHING_TO_SEE_HERE);
                assert_eq!(read, "");
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn test_unmitigated_repersists_empty_text() {
        let trip = run_demo(Mitigations::NONE).unwrap();
        assert_eq!(trip.repersisted, "<Clue><text/></Clue>");
    }

    #[test]
    fn test_hintless_writes_default() {
        let trip = run_demo(HINTLESS).unwrap();
        assert_eq!(trip.persisted, "<Clue><text>Nothing To See Here</text></Clue>");
        assert_eq!(trip.read.text, NOTHING_TO_SEE_HERE);
        assert_eq!(trip.repersisted, trip.persisted);
        trip.verify().unwrap();
    }

    #[test]
    fn test_constructor_default_keeps_omission() {
        let trip = run_demo(CTOR).unwrap();
        assert_eq!(trip.persisted, "<Clue/>");
        assert_eq!(trip.read.text, NOTHING_TO_SEE_HERE);
        assert_eq!(trip.repersisted, "<Clue/>");
        trip.verify().unwrap();
    }

    #[test]
    fn test_every_mitigated_mode_holds() {
        for mitigations in Mitigations::ALL {
            let trip = run_demo(mitigations).unwrap();
            assert_eq!(trip.holds(), mitigations.is_mitigated(), "{}", mitigations);
        }
    }

    #[test]
    fn test_hint_controls_omission() {
        for mitigations in Mitigations::ALL {
            let def = ClueDefinition::from_mitigations(mitigations);
            let sentinel = serialize(&Clue::with_text(NOTHING_TO_SEE_HERE), &def).unwrap();
            let other = serialize(&Clue::with_text("something else"), &def).unwrap();

            assert!(other.contains("something else"));
            assert_eq!(
                sentinel.contains(NOTHING_TO_SEE_HERE),
                mitigations.no_default_hint,
                "{}",
                mitigations
            );
        }
    }

    #[test]
    fn test_empty_text_survives_constructor_default() {
        let trip = round_trip("", CTOR).unwrap();
        assert_eq!(trip.persisted, "<Clue><text/></Clue>");
        assert!(trip.holds());
    }

    #[test]
    fn test_markup_characters_survive() {
        let trip = round_trip("<a href=\"x\">&amp;</a>", HINTLESS).unwrap();
        assert!(trip.persisted.contains("&lt;a"));
        assert!(trip.holds());
    }

    #[test]
    fn test_report_lines() {
        let report = run_demo(Mitigations::NONE).unwrap().to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            [
                "Clue text value: Nothing To See Here",
                "Clue persisted:  <Clue/>",
                "Read Clue text value: ",
                "Read Clue: <Clue><text/></Clue>",
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_hintless_preserves_any_text(text in "\\PC*") {
            for mitigations in [HINTLESS, Mitigations::ALL[3]] {
                let trip = round_trip(&text, mitigations).unwrap();
                prop_assert_eq!(&trip.read.text, &text);
            }
        }

        #[test]
        fn prop_constructor_default_preserves_any_text(text in "\\PC*") {
            let trip = round_trip(&text, CTOR).unwrap();
            prop_assert_eq!(&trip.read.text, &text);
        }

        #[test]
        fn prop_unmitigated_only_loses_the_default(text in "\\PC*") {
            let trip = round_trip(&text, Mitigations::NONE).unwrap();
            prop_assert_eq!(trip.holds(), text != NOTHING_TO_SEE_HERE);
        }
    }
}
