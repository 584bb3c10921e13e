//! # asymmetric_xml
//!
//! A reproduction of the write/read asymmetry caused by a "default value"
//! hint on an XML field, together with the two ways out of it.
//!
//! A [`Clue`] has a single `text` field whose declared default is
//! [`NOTHING_TO_SEE_HERE`]. With the hint active the serializer leaves the
//! field out whenever it holds that default. The deserializer, however, fills
//! an absent field from whatever the constructor put there, which is the empty
//! string unless told otherwise. The default therefore does not survive a round
//! trip.
//!
//! Two independent [`Mitigations`] fix it:
//!
//! - `no_default_hint`: always write the field.
//! - `constructor_default`: construct clues with `text` already set to the
//!   default, so an omitted field reads back correctly.
//!
//! ## Quick Start
//!
//! ```rust
//! use asymmetric_xml::{run_demo, Mitigations};
//!
//! let trip = run_demo(Mitigations::NONE).unwrap();
//! assert_eq!(trip.persisted, "<Clue/>");
//! assert_eq!(trip.read.text, "");
//! assert!(trip.verify().is_err());
//!
//! let fixed = run_demo(Mitigations { no_default_hint: false, constructor_default: true }).unwrap();
//! assert_eq!(fixed.persisted, "<Clue/>");
//! assert!(fixed.verify().is_ok());
//! ```
//!
//! ## Plain serde records
//!
//! The XML layer also handles ordinary derived records made of strings,
//! booleans, characters and options.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use asymmetric_xml::{from_str, to_string};
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct Note {
//!     #[serde(rename = "@lang")]
//!     lang: String,
//!     body: String,
//!     signed: Option<String>,
//! }
//!
//! let note = Note { lang: "en".into(), body: "under the mat".into(), signed: None };
//! let xml = to_string(&note).unwrap();
//! assert_eq!(xml, r#"<Note lang="en"><body>under the mat</body></Note>"#);
//! assert_eq!(from_str::<Note>(&xml).unwrap(), note);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod clue;
pub mod config;
pub mod de;
pub mod demo;
pub mod error;
pub mod escape;
pub mod policy;
pub mod reader;
pub mod ser;
pub mod writer;

pub use clue::{Clue, ClueDefinition, ClueView, NOTHING_TO_SEE_HERE};
pub use config::{DemoConfig, Mitigations};
pub use de::{from_str, from_str_seed, Deserializer};
pub use demo::{deserialize, round_trip, run_demo, serialize, RoundTrip};
pub use error::{Error, ErrorKind, Position, Result};
pub use escape::{escape_attr, escape_text, unescape};
pub use policy::EmitPolicy;
pub use reader::{Attribute, XmlEvent, XmlReader};
pub use ser::{to_string, Serializer};
pub use writer::XmlWriter;
