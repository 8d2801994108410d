//! Object handles: client-side references to server entities.

use crate::codec;
use crate::HandleFormat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Reference to a server-side entity by integer id, by name, or both.
///
/// A handle with neither part set is *absent* and travels as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Handle {
    /// Handle referring to an entity by id.
    pub fn from_id(id: i64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    /// Handle referring to an entity by name.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Handle carrying both parts, as sent under [`HandleFormat::Objects`].
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }

    /// The absent handle.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }

    /// Name, treating the empty string as unset.
    pub fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

impl From<i64> for Handle {
    fn from(id: i64) -> Self {
        Handle::from_id(id)
    }
}

impl From<&str> for Handle {
    fn from(name: &str) -> Self {
        Handle::from_name(name)
    }
}

impl From<String> for Handle {
    fn from(name: String) -> Self {
        Handle::from_name(name)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id, self.name.as_deref()) {
            (Some(id), Some(name)) => write!(f, "{name} ({id})"),
            (Some(id), None) => write!(f, "{id}"),
            (None, Some(name)) => f.write_str(name),
            (None, None) => f.write_str("<absent>"),
        }
    }
}

/// Encodes with the thread's active format (see [`HandleFormat::scope`]).
impl Serialize for Handle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        codec::encode(Some(self), HandleFormat::active()).serialize(serializer)
    }
}

/// Decodes with the thread's active format (see [`HandleFormat::scope`]).
impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_with_format(deserializer, HandleFormat::active())
    }
}

fn serialize_with_format<S>(
    handle: &Handle,
    format: HandleFormat,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    codec::encode(Some(handle), format).serialize(serializer)
}

fn deserialize_with_format<'de, D>(
    deserializer: D,
    format: HandleFormat,
) -> Result<Handle, D::Error>
where
    D: Deserializer<'de>,
{
    let token = Value::deserialize(deserializer)?;
    codec::decode(&token, format).map_err(serde::de::Error::custom)
}

macro_rules! pinned_format {
    ($(#[$meta:meta])* $module:ident => $format:expr) => {
        $(#[$meta])*
        pub mod $module {
            use super::*;

            pub fn serialize<S>(handle: &Handle, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serialize_with_format(handle, $format, serializer)
            }

            pub fn deserialize<'de, D>(deserializer: D) -> Result<Handle, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_with_format(deserializer, $format)
            }
        }
    };
}

pinned_format!(
    /// `#[serde(with = "co3_types::handle::ids")]`: always a bare integer id.
    ids => HandleFormat::Ids
);
pinned_format!(
    /// `#[serde(with = "co3_types::handle::names")]`: always a bare name.
    names => HandleFormat::Names
);
pinned_format!(
    /// `#[serde(with = "co3_types::handle::objects")]`: always an `{id, name}` object.
    objects => HandleFormat::Objects
);
pinned_format!(
    /// `#[serde(with = "co3_types::handle::liberal")]`: accepts any shape, writes objects.
    liberal => HandleFormat::Default
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pinned {
        #[serde(with = "ids")]
        owner: Handle,
        #[serde(with = "names")]
        phase: Handle,
        #[serde(with = "liberal")]
        severity: Handle,
    }

    #[test]
    fn display_prefers_name_with_id() {
        assert_eq!(Handle::new(7, "Spoofing").to_string(), "Spoofing (7)");
        assert_eq!(Handle::from_id(3).to_string(), "3");
        assert_eq!(Handle::absent().to_string(), "<absent>");
    }

    #[test]
    fn empty_name_is_not_a_name() {
        let handle = Handle {
            id: Some(1),
            name: Some(String::new()),
        };
        assert_eq!(handle.non_empty_name(), None);
        assert!(!handle.is_absent());
    }

    #[test]
    fn serde_impl_follows_active_format() {
        let handle = Handle::new(12, "Engineering");
        let ids = HandleFormat::Ids.scope(|| serde_json::to_value(&handle).unwrap());
        let names = HandleFormat::Names.scope(|| serde_json::to_value(&handle).unwrap());
        assert_eq!(ids, json!(12));
        assert_eq!(names, json!("Engineering"));
        assert_eq!(
            serde_json::to_value(&handle).unwrap(),
            json!({"id": 12, "name": "Engineering"})
        );
    }

    #[test]
    fn pinned_fields_ignore_active_format() {
        let value = Pinned {
            owner: Handle::new(4, "jdoe"),
            phase: Handle::new(5, "Respond"),
            severity: Handle::new(50, "High"),
        };
        let json = HandleFormat::Names.scope(|| serde_json::to_value(&value).unwrap());
        assert_eq!(
            json,
            json!({"owner": 4, "phase": "Respond", "severity": {"id": 50, "name": "High"}})
        );

        let input = json!({"owner": 4, "phase": "Respond", "severity": "Low"});
        let decoded: Pinned = HandleFormat::Ids
            .scope(|| serde_json::from_value(input))
            .unwrap();
        assert_eq!(decoded.owner, Handle::from_id(4));
        assert_eq!(decoded.phase, Handle::from_name("Respond"));
        assert_eq!(decoded.severity, Handle::from_name("Low"));
    }

    #[test]
    fn optional_handle_reads_null_as_none() {
        let decoded: Option<Handle> = HandleFormat::Ids
            .scope(|| serde_json::from_str("null"))
            .unwrap();
        assert_eq!(decoded, None);
        let decoded: Handle = HandleFormat::Ids.scope(|| serde_json::from_str("null")).unwrap();
        assert!(decoded.is_absent());
    }
}
