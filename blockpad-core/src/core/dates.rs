//! Tagged timestamp encoding for the persisted workspace blob.
//!
//! Timestamps are written as `{ "_type": "Date", "value": "<RFC 3339>" }` so
//! that a reader of the raw JSON can tell dates apart from ordinary strings.
//! Decoding also accepts a bare RFC 3339 string, which is what generic JSON
//! tooling produces when a blob is hand-edited or re-exported.
//!
//! Use with `#[serde(with = "crate::core::dates")]` on `DateTime<Utc>` fields.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The `_type` discriminator written for every timestamp.
pub const DATE_TAG: &str = "Date";

#[derive(Serialize)]
struct TaggedRef<'a> {
    #[serde(rename = "_type")]
    kind: &'static str,
    value: &'a DateTime<Utc>,
}

#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "_type")]
    kind: String,
    value: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Tagged(Tagged),
    Plain(DateTime<Utc>),
}

pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    TaggedRef {
        kind: DATE_TAG,
        value: date,
    }
    .serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    match Repr::deserialize(deserializer)? {
        Repr::Tagged(tagged) if tagged.kind == DATE_TAG => Ok(tagged.value),
        Repr::Tagged(tagged) => Err(D::Error::custom(format!(
            "unexpected tagged value type '{}'",
            tagged.kind
        ))),
        Repr::Plain(date) => Ok(date),
    }
}
