//! Payload data model for outbound request bodies.
//!
//! # Design
//! `Payload` is a closed tagged union covering everything the API accepts in
//! a request body: JSON-representable values, opaque binary attachments
//! nested at arbitrary depth, and pre-built multipart field lists. A single
//! recursive `match` replaces the runtime type inspection a dynamic language
//! would use to tell files apart from plain objects.
//!
//! Mappings are stored as insertion-ordered `(key, value)` pairs; the wire
//! encoding does not depend on field order, but preserving it keeps encoded
//! output deterministic for testing.

use serde_json::Value;

use crate::error::ApiError;

/// Recursion bound for payload traversal. Payloads nested deeper than this
/// are rejected on the multipart path rather than risking stack exhaustion.
pub const MAX_DEPTH: usize = 32;

/// An opaque binary attachment (e.g. an uploaded file).
///
/// The encoder passes attachments through uninterpreted: bytes are never
/// read, copied, or mutated, and the optional file name is preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes,
        }
    }

    /// An attachment with no recorded file name.
    pub fn unnamed(bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            bytes,
        }
    }
}

/// The value of one multipart form field: text or a binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Binary(Attachment),
}

/// One named multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn binary(name: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Binary(attachment),
        }
    }
}

/// A structured request-body value, before wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Binary(Attachment),
    List(Vec<Payload>),
    /// Keyed mapping with unique keys, insertion order preserved.
    Map(Vec<(String, Payload)>),
    /// A multipart field list the caller already built; used verbatim when
    /// the resolved encoding is multipart.
    Form(Vec<FormField>),
}

impl Payload {
    /// True iff this value is itself a binary attachment.
    pub fn is_binary(&self) -> bool {
        matches!(self, Payload::Binary(_))
    }

    /// True iff this value is a binary attachment, or a list/mapping that
    /// transitively holds one. `Null`, scalars, and pre-built field lists
    /// are false. Pure and total; never panics.
    pub fn contains_binary_deep(&self) -> bool {
        contains_binary(self, 0)
    }

    /// Convert to a JSON value for stringification.
    ///
    /// Binary attachments and pre-built field lists have no JSON
    /// representation and collapse to `{}`, matching what the wire format
    /// historically carried when a file ended up inside a stringified
    /// object (see the nested-object collapse rule in `body`).
    ///
    /// Fails with `InvalidArgument` when nesting exceeds [`MAX_DEPTH`].
    pub fn to_json_value(&self) -> Result<Value, ApiError> {
        self.json_value_from(0)
    }

    /// Like [`Payload::to_json_value`], but with `depth` levels of the
    /// recursion budget already spent by an enclosing traversal.
    pub(crate) fn json_value_from(&self, depth: usize) -> Result<Value, ApiError> {
        json_value(self, depth).ok_or_else(|| {
            ApiError::InvalidArgument(format!("payload nesting exceeds {MAX_DEPTH} levels"))
        })
    }
}

fn json_value(payload: &Payload, depth: usize) -> Option<Value> {
    if depth >= MAX_DEPTH {
        return None;
    }
    let value = match payload {
        Payload::Null => Value::Null,
        Payload::Bool(b) => Value::Bool(*b),
        Payload::Number(n) => Value::Number(n.clone()),
        Payload::String(s) => Value::String(s.clone()),
        Payload::Binary(_) | Payload::Form(_) => Value::Object(serde_json::Map::new()),
        Payload::List(items) => Value::Array(
            items
                .iter()
                .map(|item| json_value(item, depth + 1))
                .collect::<Option<_>>()?,
        ),
        Payload::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), json_value(value, depth + 1)?);
            }
            Value::Object(map)
        }
    };
    Some(value)
}

// Depth-capped: anything nested past MAX_DEPTH is reported as binary so the
// multipart path surfaces the depth error instead of recursing further.
fn contains_binary(payload: &Payload, depth: usize) -> bool {
    if depth >= MAX_DEPTH {
        return true;
    }
    match payload {
        Payload::Binary(_) => true,
        Payload::List(items) => items.iter().any(|item| contains_binary(item, depth + 1)),
        Payload::Map(entries) => entries.iter().any(|(_, value)| contains_binary(value, depth + 1)),
        _ => false,
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => Payload::Number(n),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => Payload::Map(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect()),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Number(n.into())
    }
}

impl From<u64> for Payload {
    fn from(n: u64) -> Self {
        Payload::Number(n.into())
    }
}

impl From<Attachment> for Payload {
    fn from(attachment: Attachment) -> Self {
        Payload::Binary(attachment)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(items: Vec<T>) -> Self {
        Payload::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Payload::Null, Into::into)
    }
}
