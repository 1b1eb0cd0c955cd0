//! Reconstruct OpenAlex abstracts from their inverted index.
//!
//! OpenAlex stores abstracts as inverted indexes for legal reasons. The
//! payload is a JSON string holding the word count and a word → positions map:
//! ```json
//! {"IndexLength": 4, "InvertedIndex": {"the": [0, 2], "cat": [1], "sat": [3]}}
//! ```
//!
//! Reconstruction places every token at each of its positions and joins the
//! slots, each followed by one space (so the text always ends in a space).
//!
//! Positions are expected to cover `[0, length)` exactly once. In practice:
//! - uncovered slots render as empty fields (runs of spaces),
//! - positions outside the range are rejected,
//! - a slot claimed by several tokens keeps the token that appears *last* in
//!   the serialized object (a token key written twice counts at each of its
//!   places).

use std::fmt;

use rustc_hash::FxHashMap;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::{Map, Value};

use crate::error::InvertError;

/// Upper bound on `IndexLength`, a limit on the slot allocation.
pub const MAX_INDEX_LENGTH: usize = 1 << 24;

/// Decoded inverted index, tokens kept in serialized order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    length: usize,
    index: Vec<(String, Vec<i64>)>,
}

fn malformed(msg: impl Into<String>) -> InvertError {
    InvertError::MalformedIndex(msg.into())
}

/// Top-level payload members as they appear on the wire.
struct RawPayload {
    length: Option<Value>,
    tokens: Option<RawTokens>,
}

/// The `InvertedIndex` member, or whatever non-object value stood in its place.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawTokens {
    Entries(TokenEntries),
    NotAnObject(#[allow(dead_code)] IgnoredAny),
}

/// Every `token: positions` member in document order, repeated keys included.
struct TokenEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for TokenEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = TokenEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of token positions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TokenEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(TokenEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = RawPayload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an inverted index object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawPayload, A::Error> {
                let mut length = None;
                let mut tokens = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "IndexLength" => {
                            if length.is_some() {
                                return Err(de::Error::duplicate_field("IndexLength"));
                            }
                            length = Some(map.next_value()?);
                        }
                        "InvertedIndex" => {
                            if tokens.is_some() {
                                return Err(de::Error::duplicate_field("InvertedIndex"));
                            }
                            tokens = Some(map.next_value()?);
                        }
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(RawPayload { length, tokens })
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

impl InvertedIndex {
    /// Parse the serialized `{"IndexLength": .., "InvertedIndex": {..}}` form.
    ///
    /// Only shape is checked here; position ranges are checked by
    /// [`reconstruct`](Self::reconstruct). A token key that repeats inside
    /// `InvertedIndex` is kept as a separate entry at its own place in the
    /// document. A repeated top-level member is malformed.
    pub fn parse(payload: &str) -> Result<Self, InvertError> {
        let raw: RawPayload = serde_json::from_str(payload)
            .map_err(|e| malformed(format!("invalid payload: {e}")))?;

        let length = raw
            .length
            .ok_or_else(|| malformed("missing IndexLength"))?
            .as_u64()
            .ok_or_else(|| malformed("IndexLength is not a non-negative integer"))?;
        let length = usize::try_from(length)
            .ok()
            .filter(|&n| n <= MAX_INDEX_LENGTH)
            .ok_or_else(|| {
                malformed(format!(
                    "IndexLength {length} is above the supported maximum of {MAX_INDEX_LENGTH} slots"
                ))
            })?;

        let entries = match raw.tokens.ok_or_else(|| malformed("missing InvertedIndex"))? {
            RawTokens::Entries(TokenEntries(entries)) => entries,
            RawTokens::NotAnObject(_) => return Err(malformed("InvertedIndex is not an object")),
        };

        let mut index = Vec::with_capacity(entries.len());
        for (token, positions) in entries {
            let positions = positions
                .as_array()
                .ok_or_else(|| malformed(format!("positions of {token:?} are not an array")))?
                .iter()
                .map(|p| {
                    p.as_i64()
                        .ok_or_else(|| {
                            malformed(format!("position {p} of {token:?} is not an integer"))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            index.push((token, positions));
        }

        Ok(Self { length, index })
    }

    /// Encode a word sequence (the inverse of [`reconstruct`](Self::reconstruct)).
    ///
    /// Tokens are listed in order of first occurrence.
    pub fn from_tokens<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index: Vec<(String, Vec<i64>)> = Vec::new();
        let mut slot_of: FxHashMap<&'a str, usize> = FxHashMap::default();
        let mut length = 0usize;

        for (pos, word) in words.into_iter().enumerate() {
            let i = *slot_of.entry(word).or_insert_with(|| {
                index.push((word.to_string(), Vec::new()));
                index.len() - 1
            });
            index[i].1.push(pos as i64);
            length = pos + 1;
        }

        Self { length, index }
    }

    /// Declared number of word slots
    pub fn length(&self) -> usize {
        self.length
    }

    /// `(token, positions)` pairs in serialized order (a repeated key shows up twice)
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.index.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Rebuild the text: every slot followed by a single space.
    pub fn reconstruct(&self) -> Result<String, InvertError> {
        let mut slots: Vec<&str> = vec![""; self.length];

        for (token, positions) in &self.index {
            for &position in positions {
                let slot = usize::try_from(position)
                    .ok()
                    .and_then(|p| slots.get_mut(p))
                    .ok_or(InvertError::PositionOutOfRange {
                        position,
                        length: self.length,
                    })?;
                *slot = token.as_str();
            }
        }

        let capacity = slots.iter().map(|s| s.len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for slot in slots {
            text.push_str(slot);
            text.push(' ');
        }
        Ok(text)
    }

    /// Serialize back to the payload form accepted by [`parse`](Self::parse).
    pub fn to_json(&self) -> String {
        let tokens: Map<String, Value> = self
            .index
            .iter()
            .map(|(t, p)| (t.clone(), Value::from(p.clone())))
            .collect();
        serde_json::json!({
            "IndexLength": self.length,
            "InvertedIndex": tokens,
        })
        .to_string()
    }
}

/// Reconstruct the abstract text from a serialized inverted index.
///
/// # Example
/// ```
/// use reabstract_openalex::invert;
///
/// let payload = r#"{"IndexLength":3,"InvertedIndex":{"a":[0],"b":[1],"c":[2]}}"#;
/// assert_eq!(invert(payload).unwrap(), "a b c ");
/// ```
pub fn invert(payload: &str) -> Result<String, InvertError> {
    InvertedIndex::parse(payload)?.reconstruct()
}
