use crate::codec::TokenKind;
use crate::HandleFormat;
use thiserror::Error;

/// Errors raised while encoding or decoding object handles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("unsupported {token} token for handle format `{format}`")]
    UnsupportedToken {
        format: HandleFormat,
        token: TokenKind,
    },
    #[error("handle member `{member}` must not be a {token} token")]
    InvalidMember {
        member: &'static str,
        token: TokenKind,
    },
    #[error("integer {0} does not fit a handle id")]
    IdOutOfRange(String),
    #[error("expected a JSON object for a keyed map, got a {0} token")]
    ExpectedObject(TokenKind),
    #[error("map keys collide on wire key `{0}`")]
    DuplicateKey(String),
    #[error("map value already has a `{0}` member")]
    ReservedMember(&'static str),
    #[error("unknown handle format `{0}` (expected default, ids, names or objects)")]
    UnknownFormat(String),
    #[error("unknown method name `{0}`")]
    UnknownMethodName(String),
    #[error("map value error: {0}")]
    Value(String),
}

impl HandleError {
    pub(crate) fn unsupported(format: HandleFormat, token: TokenKind) -> Self {
        HandleError::UnsupportedToken { format, token }
    }

    pub(crate) fn value(err: serde_json::Error) -> Self {
        HandleError::Value(err.to_string())
    }
}
