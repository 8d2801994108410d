//! Handle wire formats negotiated with the server.
//!
//! The server and client agree on one [`HandleFormat`] per session. The client
//! announces it in the [`HANDLE_FORMAT_HEADER`] request header and every
//! [`Handle`](crate::Handle) exchanged during that session is encoded and
//! decoded according to it.

use crate::error::HandleError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Request header carrying the session's handle format.
pub const HANDLE_FORMAT_HEADER: &str = "handle_format";

/// Wire representation used for object handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleFormat {
    /// Liberal input (integer, string or object), object output.
    ///
    /// The server performs a by-id lookup for integers and a by-name lookup for
    /// strings.
    #[default]
    Default,
    /// Integer ids only, in both directions.
    Ids,
    /// Names only, in both directions.
    Names,
    /// Nested `{"id": .., "name": ..}` objects, in both directions.
    Objects,
}

const FORMAT_TABLE: [(HandleFormat, &str); 4] = [
    (HandleFormat::Default, "default"),
    (HandleFormat::Ids, "ids"),
    (HandleFormat::Names, "names"),
    (HandleFormat::Objects, "objects"),
];

impl HandleFormat {
    /// Every format, in declaration order.
    pub const ALL: [HandleFormat; 4] = [
        HandleFormat::Default,
        HandleFormat::Ids,
        HandleFormat::Names,
        HandleFormat::Objects,
    ];

    /// Wire token for this format (also the `handle_format` header value).
    pub fn as_str(self) -> &'static str {
        FORMAT_TABLE[self as usize].1
    }

    /// Whether decoding accepts any token shape.
    pub fn is_liberal(self) -> bool {
        matches!(self, HandleFormat::Default)
    }

    /// Format in effect for handles (de)serialized on the current thread.
    ///
    /// Inside [`HandleFormat::scope`] this is the scoped format, otherwise
    /// [`HandleFormat::Objects`].
    pub fn active() -> HandleFormat {
        ACTIVE_FORMAT.with(Cell::get)
    }

    /// Run `f` with `self` as the active format on the current thread.
    ///
    /// The previous format is restored when `f` returns or unwinds, so scopes
    /// nest and sessions with different formats never observe each other.
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        let _guard = ScopeGuard::enter(self);
        f()
    }
}

impl fmt::Display for HandleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleFormat {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FORMAT_TABLE
            .iter()
            .find(|(_, token)| token.eq_ignore_ascii_case(wanted))
            .map(|(format, _)| *format)
            .ok_or_else(|| HandleError::UnknownFormat(s.to_string()))
    }
}

thread_local! {
    static ACTIVE_FORMAT: Cell<HandleFormat> = const { Cell::new(HandleFormat::Objects) };
}

struct ScopeGuard {
    previous: HandleFormat,
}

impl ScopeGuard {
    fn enter(format: HandleFormat) -> Self {
        let previous = ACTIVE_FORMAT.with(|active| active.replace(format));
        Self { previous }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE_FORMAT.with(|active| active.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tokens_match_header_values() {
        assert_eq!(HandleFormat::Default.as_str(), "default");
        assert_eq!(HandleFormat::Ids.as_str(), "ids");
        assert_eq!(HandleFormat::Names.as_str(), "names");
        assert_eq!(HandleFormat::Objects.as_str(), "objects");
        for format in HandleFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.as_str()));
        }
    }

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!("IDS".parse::<HandleFormat>().unwrap(), HandleFormat::Ids);
        assert_eq!(" names ".parse::<HandleFormat>().unwrap(), HandleFormat::Names);
        assert!(matches!(
            "handles".parse::<HandleFormat>(),
            Err(HandleError::UnknownFormat(_))
        ));
    }

    #[test]
    fn scopes_nest_and_restore() {
        assert_eq!(HandleFormat::active(), HandleFormat::Objects);
        HandleFormat::Ids.scope(|| {
            assert_eq!(HandleFormat::active(), HandleFormat::Ids);
            HandleFormat::Names.scope(|| assert_eq!(HandleFormat::active(), HandleFormat::Names));
            assert_eq!(HandleFormat::active(), HandleFormat::Ids);
        });
        assert_eq!(HandleFormat::active(), HandleFormat::Objects);
    }

    #[test]
    fn scope_restores_after_panic() {
        let result = std::panic::catch_unwind(|| {
            HandleFormat::Names.scope(|| panic!("boom"));
        });
        assert!(result.is_err());
        assert_eq!(HandleFormat::active(), HandleFormat::Objects);
    }

    #[test]
    fn threads_do_not_share_scopes() {
        HandleFormat::Ids.scope(|| {
            let other = std::thread::spawn(HandleFormat::active).join().unwrap();
            assert_eq!(other, HandleFormat::Objects);
        });
    }
}
