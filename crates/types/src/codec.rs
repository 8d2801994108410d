//! Scalar handle codec.
//!
//! Converts between [`Handle`] and JSON tokens for a given [`HandleFormat`].
//!
//! | Format            | Written                      | Accepted                    |
//! |-------------------|------------------------------|-----------------------------|
//! | `ids`             | integer id                   | integer                     |
//! | `names`           | name string                  | string                      |
//! | `objects`         | `{"id": .., "name": ..}`     | object                      |
//! | `default`         | `{"id": .., "name": ..}`     | integer, string or object   |
//!
//! `null` and absent handles map onto each other under every format.

use crate::error::HandleError;
use crate::{Handle, HandleFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const ID_MEMBER: &str = "id";
const NAME_MEMBER: &str = "name";

/// Kind of a JSON token, reported by decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl TokenKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => TokenKind::Null,
            Value::Bool(_) => TokenKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => TokenKind::Integer,
            Value::Number(_) => TokenKind::Float,
            Value::String(_) => TokenKind::String,
            Value::Array(_) => TokenKind::Array,
            Value::Object(_) => TokenKind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Null => "null",
            TokenKind::Boolean => "boolean",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Array => "array",
            TokenKind::Object => "object",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode `handle` as the wire token dictated by `format`.
///
/// `None` and absent handles are written as `null`. The handle's own shape is
/// never consulted to pick a representation.
pub fn encode(handle: Option<&Handle>, format: HandleFormat) -> Value {
    let handle = match handle {
        Some(handle) if !handle.is_absent() => handle,
        _ => return Value::Null,
    };

    match format {
        HandleFormat::Ids => handle.id.map(Value::from).unwrap_or(Value::Null),
        HandleFormat::Names => handle.name.clone().map(Value::String).unwrap_or(Value::Null),
        HandleFormat::Objects | HandleFormat::Default => {
            let mut object = Map::new();
            object.insert(
                ID_MEMBER.to_string(),
                handle.id.map(Value::from).unwrap_or(Value::Null),
            );
            object.insert(
                NAME_MEMBER.to_string(),
                handle.name.clone().map(Value::String).unwrap_or(Value::Null),
            );
            Value::Object(object)
        }
    }
}

/// Decode a wire token under `format`.
///
/// `null` always yields the absent handle. Under [`HandleFormat::Default`]
/// the token type selects the interpretation; every other format accepts a
/// single token type and rejects the rest with
/// [`HandleError::UnsupportedToken`].
pub fn decode(token: &Value, format: HandleFormat) -> Result<Handle, HandleError> {
    if token.is_null() {
        return Ok(Handle::absent());
    }

    let kind = TokenKind::of(token);
    match (format, token) {
        (HandleFormat::Ids | HandleFormat::Default, Value::Number(_))
            if kind == TokenKind::Integer =>
        {
            Ok(Handle::from_id(integer_id(token)?))
        }
        (HandleFormat::Names | HandleFormat::Default, Value::String(name)) => {
            Ok(Handle::from_name(name.clone()))
        }
        (HandleFormat::Objects | HandleFormat::Default, Value::Object(object)) => {
            from_object(object)
        }
        _ => Err(HandleError::unsupported(format, kind)),
    }
}

fn integer_id(token: &Value) -> Result<i64, HandleError> {
    token
        .as_i64()
        .ok_or_else(|| HandleError::IdOutOfRange(token.to_string()))
}

// Members other than `id` and `name` are ignored.
fn from_object(object: &Map<String, Value>) -> Result<Handle, HandleError> {
    let id = match object.get(ID_MEMBER) {
        None | Some(Value::Null) => None,
        Some(token) if TokenKind::of(token) == TokenKind::Integer => Some(integer_id(token)?),
        Some(token) => {
            return Err(HandleError::InvalidMember {
                member: ID_MEMBER,
                token: TokenKind::of(token),
            })
        }
    };
    let name = match object.get(NAME_MEMBER) {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(token) => {
            return Err(HandleError::InvalidMember {
                member: NAME_MEMBER,
                token: TokenKind::of(token),
            })
        }
    };
    Ok(Handle { id, name })
}
