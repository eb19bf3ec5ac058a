//! Request-body encoder: JSON vs. multipart decision and serialization.
//!
//! # Design
//! `build_body` is the single entry point application code calls before
//! issuing a mutating request. It resolves the effective wire format from
//! the requested [`EncodingMode`] and the payload's shape, then either
//! passes the payload through untouched (JSON) or flattens it into a named
//! field list (multipart). The decision is deterministic in (payload, mode):
//! no hidden state, no previous-call memory.
//!
//! Multipart flattening rules, per top-level key:
//! - `Null` fields are omitted entirely, never sent as `""` or `"null"`.
//! - Binary attachments pass through as binary fields.
//! - A list of flat scalars compacts to one JSON-stringified text field,
//!   avoiding a proliferation of indexed keys for simple arrays.
//! - A list holding any nested structure or binary expands per element under
//!   indexed keys `k[0]`, `k[1]`, … so attachments inside arrays survive as
//!   individual binary fields.
//! - A nested mapping always collapses to one JSON-stringified text field,
//!   even when a binary is buried inside it (the binary stringifies as `{}`;
//!   see the note on `Payload::to_json_value`).
//! - Other scalars become their plain string form.

use std::str::FromStr;

use crate::error::ApiError;
use crate::payload::{FormField, Payload, MAX_DEPTH};

pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Boundary parameter is supplied by whatever writes the multipart body on
/// the wire, not here.
pub const CONTENT_TYPE_FORM: &str = "multipart/form-data";

/// Requested body encoding, a per-call parameter with no lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    Json,
    Form,
    /// Infer JSON vs. multipart from payload shape: multipart iff the
    /// payload is a pre-built field list or holds a binary attachment
    /// anywhere in its structure.
    Auto,
}

impl FromStr for EncodingMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(EncodingMode::Json),
            "form" => Ok(EncodingMode::Form),
            "auto" => Ok(EncodingMode::Auto),
            other => Err(ApiError::InvalidArgument(format!(
                "unknown encoding mode '{other}' (expected json, form, or auto)"
            ))),
        }
    }
}

/// The wire format a payload resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Form,
}

/// Encoded body plus the headers to attach to the outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub data: BodyData,
    pub headers: Vec<(String, String)>,
}

/// Either the original payload tagged for JSON transmission, or a flat
/// multipart field list.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyData {
    Json(Payload),
    Form(Vec<FormField>),
}

/// Decide the wire format for `payload` under `mode`. Pure decision
/// function: explicit modes are honored unconditionally, `Auto` inspects
/// the payload.
pub fn resolve_mode(payload: &Payload, mode: EncodingMode) -> WireFormat {
    match mode {
        EncodingMode::Json => WireFormat::Json,
        EncodingMode::Form => WireFormat::Form,
        EncodingMode::Auto => {
            if matches!(payload, Payload::Form(_)) || payload.contains_binary_deep() {
                WireFormat::Form
            } else {
                WireFormat::Json
            }
        }
    }
}

/// Flatten a top-level mapping into an ordered multipart field list.
///
/// Field order follows mapping insertion order; receivers key fields by
/// name, but a stable order keeps encoded output deterministic.
pub fn to_form_fields(entries: &[(String, Payload)]) -> Result<Vec<FormField>, ApiError> {
    let mut fields = Vec::new();
    for (key, value) in entries {
        push_field(&mut fields, key, value, 0)?;
    }
    Ok(fields)
}

fn push_field(
    fields: &mut Vec<FormField>,
    key: &str,
    value: &Payload,
    depth: usize,
) -> Result<(), ApiError> {
    if depth >= MAX_DEPTH {
        return Err(ApiError::InvalidArgument(format!(
            "payload nesting exceeds {MAX_DEPTH} levels at field '{key}'"
        )));
    }
    match value {
        // Omitted, not serialized as an empty or "null" field.
        Payload::Null => {}
        Payload::Binary(attachment) => {
            fields.push(FormField::binary(key, attachment.clone()));
        }
        Payload::List(items) => {
            let has_nested = items.iter().any(|item| {
                matches!(
                    item,
                    Payload::List(_) | Payload::Map(_) | Payload::Form(_) | Payload::Binary(_)
                )
            });
            if has_nested {
                for (i, item) in items.iter().enumerate() {
                    push_field(fields, &format!("{key}[{i}]"), item, depth + 1)?;
                }
            } else {
                fields.push(FormField::text(key, stringify(value, depth)?));
            }
        }
        Payload::Map(_) | Payload::Form(_) => {
            fields.push(FormField::text(key, stringify(value, depth)?));
        }
        Payload::Bool(b) => fields.push(FormField::text(key, b.to_string())),
        Payload::Number(n) => fields.push(FormField::text(key, n.to_string())),
        Payload::String(s) => fields.push(FormField::text(key, s.clone())),
    }
    Ok(())
}

/// JSON-stringify a subtree, charging the levels already consumed by the
/// enclosing flattening against the recursion budget.
fn stringify(payload: &Payload, depth: usize) -> Result<String, ApiError> {
    serde_json::to_string(&payload.json_value_from(depth)?)
        .map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Encode `payload` under `mode` into a body plus content-type header.
///
/// JSON resolution passes the payload through unchanged. Multipart
/// resolution uses a pre-built field list verbatim, or flattens a mapping
/// via [`to_form_fields`]; any other payload shape under multipart is a
/// caller error.
pub fn build_body(payload: Payload, mode: EncodingMode) -> Result<EncodedBody, ApiError> {
    match resolve_mode(&payload, mode) {
        WireFormat::Json => Ok(EncodedBody {
            data: BodyData::Json(payload),
            headers: vec![("content-type".to_string(), CONTENT_TYPE_JSON.to_string())],
        }),
        WireFormat::Form => {
            let fields = match payload {
                Payload::Form(fields) => fields,
                Payload::Map(entries) => to_form_fields(&entries)?,
                other => {
                    return Err(ApiError::InvalidArgument(format!(
                        "multipart encoding requires a mapping payload, got {other:?}"
                    )))
                }
            };
            Ok(EncodedBody {
                data: BodyData::Form(fields),
                headers: vec![("content-type".to_string(), CONTENT_TYPE_FORM.to_string())],
            })
        }
    }
}
