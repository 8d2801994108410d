//! Condition operators used by automatic rules and field operations.
//!
//! Wire names are lower snake case. Some server versions upper-case them when
//! they appear as map keys, so parsing is case-insensitive.

use crate::error::HandleError;
use crate::handle_map::MapOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

macro_rules! method_names {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum MethodName {
            $($variant),+
        }

        impl MethodName {
            pub const ALL: &'static [MethodName] = &[$(MethodName::$variant),+];

            /// Wire name of the operator.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(MethodName::$variant => $wire),+
                }
            }
        }
    };
}

method_names! {
    Changed => "changed",
    Equals => "equals",
    ChangedTo => "changed_to",
    ChangedFrom => "changed_from",
    ObjectRemoved => "object_removed",
    ObjectAdded => "object_added",
    ValueAdded => "value_added",
    Contains => "contains",
    DueWithin => "due_within",
    OverdueBy => "overdue_by",
    Gt => "gt",
    Lt => "lt",
    Gte => "gte",
    Lte => "lte",
    ContainsUser => "contains_user",
    In => "in",
    ValueRemoved => "value_removed",
    NotIn => "not_in",
    NotEquals => "not_equals",
    NotContains => "not_contains",
    NotContainsUser => "not_contains_user",
    NotChangedTo => "not_changed_to",
    NotChangedFrom => "not_changed_from",
    HasAValue => "has_a_value",
    NotHasAValue => "not_has_a_value",
}

impl MethodName {
    /// Look up an operator by wire name, ignoring ASCII case.
    pub fn from_wire(name: &str) -> Option<Self> {
        MethodName::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodName {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MethodName::from_wire(s).ok_or_else(|| HandleError::UnknownMethodName(s.to_string()))
    }
}

impl Serialize for MethodName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MethodName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode a `MethodName`-keyed map; keys are written as wire names.
pub fn encode_map<V: Serialize>(
    map: &BTreeMap<MethodName, V>,
    options: MapOptions,
) -> Result<Value, HandleError> {
    let mut object = Map::with_capacity(map.len());
    for (method, value) in map {
        object.insert(method.as_str().to_string(), options.write_value(value)?);
    }
    Ok(Value::Object(object))
}

/// Decode a `MethodName`-keyed map, matching keys case-insensitively.
pub fn decode_map<V: DeserializeOwned>(
    token: Value,
    options: MapOptions,
) -> Result<BTreeMap<MethodName, V>, HandleError> {
    let object = match token {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => return Err(HandleError::ExpectedObject(crate::codec::TokenKind::of(&other))),
    };
    let mut map = BTreeMap::new();
    for (key, value) in object {
        let method = key.parse::<MethodName>()?;
        map.insert(method, options.read_value(value)?);
    }
    Ok(map)
}

/// Serde adapter for `BTreeMap<MethodName, V>` fields.
pub mod method_name_map {
    use super::*;

    pub fn serialize<V, S>(map: &BTreeMap<MethodName, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        encode_map(map, MapOptions::default())
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<MethodName, V>, D::Error>
    where
        V: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let token = Value::deserialize(deserializer)?;
        decode_map(token, MapOptions::default()).map_err(serde::de::Error::custom)
    }
}
