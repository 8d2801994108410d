//! Codec for maps keyed by [`Handle`].
//!
//! JSON object keys are always strings, so handle-keyed maps do not follow
//! the session [`HandleFormat`](crate::HandleFormat). Instead:
//!
//! * encoding picks one [`KeyStyle`] for the whole map: ids when no key has a
//!   name, names otherwise;
//! * decoding looks at every key on its own: integers become id handles,
//!   anything else a name handle.
//!
//! The two directions are therefore not symmetric. A name-keyed map holding an
//! id-only handle `7` is written as `{"7": ..}` and read back as `Handle::from_id(7)`,
//! while a name handle `"7"` is read back as an id handle too.
//!
//! Use the module directly as a serde adapter:
//!
//! ```
//! use co3_types::Handle;
//! use std::collections::BTreeMap;
//!
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Row {
//!     #[serde(with = "co3_types::handle_map")]
//!     cells: BTreeMap<Handle, String>,
//! }
//! ```

use crate::error::HandleError;
use crate::Handle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Member name of the property list injected by [`MapOptions::inject_keys`].
pub const KEYS_MEMBER: &str = "Keys";

/// How the keys of one map are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// Decimal id strings.
    Ids,
    /// Literal names; handles without a name fall back to their id string.
    Names,
}

impl KeyStyle {
    /// Ids if no key carries a non-empty name, names otherwise.
    pub fn infer<'a>(keys: impl IntoIterator<Item = &'a Handle>) -> Self {
        if keys.into_iter().any(|key| key.non_empty_name().is_some()) {
            KeyStyle::Names
        } else {
            KeyStyle::Ids
        }
    }

    /// Wire key for `handle` under this style.
    pub fn key_for(self, handle: &Handle) -> String {
        let id = || handle.id.map(|id| id.to_string()).unwrap_or_default();
        match self {
            KeyStyle::Ids => id(),
            KeyStyle::Names => handle
                .non_empty_name()
                .map(str::to_string)
                .unwrap_or_else(id),
        }
    }
}

/// Options shared by the keyed map codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Prefix every object value with a `"Keys"` array of its member names,
    /// and strip that member again when decoding. Values that already have a
    /// `"Keys"` member fail with [`HandleError::ReservedMember`].
    ///
    /// Only needed for consumers that rely on the legacy layout.
    pub inject_keys: bool,
}

impl MapOptions {
    pub const LEGACY_KEYS: MapOptions = MapOptions { inject_keys: true };

    pub(crate) fn write_value<V: Serialize>(&self, value: &V) -> Result<Value, HandleError> {
        let value = serde_json::to_value(value).map_err(HandleError::value)?;
        match value {
            Value::Object(object) if self.inject_keys => {
                if object.contains_key(KEYS_MEMBER) {
                    return Err(HandleError::ReservedMember(KEYS_MEMBER));
                }
                let names: Vec<Value> = object.keys().cloned().map(Value::String).collect();
                let mut with_keys = Map::with_capacity(object.len() + 1);
                with_keys.insert(KEYS_MEMBER.to_string(), Value::Array(names));
                with_keys.extend(object);
                Ok(Value::Object(with_keys))
            }
            other => Ok(other),
        }
    }

    pub(crate) fn read_value<V: DeserializeOwned>(&self, value: Value) -> Result<V, HandleError> {
        let value = match value {
            Value::Object(mut object) if self.inject_keys => {
                object.remove(KEYS_MEMBER);
                Value::Object(object)
            }
            other => other,
        };
        serde_json::from_value(value).map_err(HandleError::value)
    }
}

/// Map types usable with the handle-keyed codec.
pub trait HandleKeyedMap: FromIterator<(Handle, Self::Value)> {
    type Value;

    fn handle_entries(&self) -> Vec<(&Handle, &Self::Value)>;
}

impl<V> HandleKeyedMap for BTreeMap<Handle, V> {
    type Value = V;

    fn handle_entries(&self) -> Vec<(&Handle, &V)> {
        self.iter().collect()
    }
}

impl<V, S> HandleKeyedMap for HashMap<Handle, V, S>
where
    S: BuildHasher + Default,
{
    type Value = V;

    fn handle_entries(&self) -> Vec<(&Handle, &V)> {
        self.iter().collect()
    }
}

/// Parse one wire key: decimal integers become ids, everything else a name.
pub fn parse_key(key: &str) -> Handle {
    match key.parse::<i64>() {
        Ok(id) => Handle::from_id(id),
        Err(_) => Handle::from_name(key),
    }
}

/// Encode a handle-keyed map into a JSON object.
///
/// Fails with [`HandleError::DuplicateKey`] when two handles map to the same
/// wire key, e.g. `Handle::from_id(7)` and `Handle::from_name("7")`.
pub fn encode_map<M>(map: &M, options: MapOptions) -> Result<Value, HandleError>
where
    M: HandleKeyedMap,
    M::Value: Serialize,
{
    let entries = map.handle_entries();
    let style = KeyStyle::infer(entries.iter().map(|(key, _)| *key));
    let mut object = Map::with_capacity(entries.len());
    for (key, value) in entries {
        let wire_key = style.key_for(key);
        if object.contains_key(&wire_key) {
            return Err(HandleError::DuplicateKey(wire_key));
        }
        object.insert(wire_key, options.write_value(value)?);
    }
    Ok(Value::Object(object))
}

/// Decode a JSON object into a handle-keyed map.
///
/// Later keys that parse to an equal handle (`"7"` and `"07"`) replace
/// earlier ones.
pub fn decode_map<M>(token: Value, options: MapOptions) -> Result<M, HandleError>
where
    M: HandleKeyedMap,
    M::Value: DeserializeOwned,
{
    let object = match token {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => return Err(HandleError::ExpectedObject(crate::codec::TokenKind::of(&other))),
    };
    object
        .into_iter()
        .map(|(key, value)| {
            let value = options.read_value::<M::Value>(value)?;
            Ok::<_, HandleError>((parse_key(&key), value))
        })
        .collect()
}

pub fn serialize<M, S>(map: &M, serializer: S) -> Result<S::Ok, S::Error>
where
    M: HandleKeyedMap,
    M::Value: Serialize,
    S: Serializer,
{
    encode_map(map, MapOptions::default())
        .map_err(serde::ser::Error::custom)?
        .serialize(serializer)
}

pub fn deserialize<'de, M, D>(deserializer: D) -> Result<M, D::Error>
where
    M: HandleKeyedMap,
    M::Value: DeserializeOwned,
    D: Deserializer<'de>,
{
    let token = Value::deserialize(deserializer)?;
    decode_map(token, MapOptions::default()).map_err(serde::de::Error::custom)
}

/// Handle-keyed maps with the legacy `"Keys"` member injected into object values.
pub mod with_keys {
    use super::*;

    pub fn serialize<M, S>(map: &M, serializer: S) -> Result<S::Ok, S::Error>
    where
        M: HandleKeyedMap,
        M::Value: Serialize,
        S: Serializer,
    {
        encode_map(map, MapOptions::LEGACY_KEYS)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, M, D>(deserializer: D) -> Result<M, D::Error>
    where
        M: HandleKeyedMap,
        M::Value: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let token = Value::deserialize(deserializer)?;
        decode_map(token, MapOptions::LEGACY_KEYS).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unnamed(id: i64) -> Handle {
        Handle {
            id: Some(id),
            name: Some(String::new()),
        }
    }

    #[test]
    fn unnamed_keys_are_written_as_ids() {
        let mut map = BTreeMap::new();
        map.insert(unnamed(1), "v1");
        map.insert(unnamed(2), "v2");
        let token = encode_map(&map, MapOptions::default()).unwrap();
        assert_eq!(token, json!({"1": "v1", "2": "v2"}));
    }

    #[test]
    fn named_keys_are_written_as_names() {
        let mut map = BTreeMap::new();
        map.insert(Handle::new(0, "alice"), 10);
        let token = encode_map(&map, MapOptions::default()).unwrap();
        assert_eq!(token, json!({"alice": 10}));
    }

    #[test]
    fn one_named_key_switches_the_whole_map_to_names() {
        let mut map = BTreeMap::new();
        map.insert(Handle::from_id(1), true);
        map.insert(Handle::new(2, "bob"), false);
        assert_eq!(KeyStyle::infer(map.keys()), KeyStyle::Names);
        let token = encode_map(&map, MapOptions::default()).unwrap();
        assert_eq!(token, json!({"1": true, "bob": false}));
    }

    #[test]
    fn colliding_wire_keys_are_rejected() {
        let mut map = BTreeMap::new();
        map.insert(Handle::from_id(7), "by id");
        map.insert(Handle::from_name("7"), "by name");
        map.insert(Handle::new(1, "x"), "named");
        assert_eq!(
            encode_map(&map, MapOptions::default()),
            Err(HandleError::DuplicateKey("7".into()))
        );

        let mut map = BTreeMap::new();
        map.insert(Handle::from_id(1), 1);
        map.insert(unnamed(1), 2);
        assert_eq!(
            encode_map(&map, MapOptions::default()),
            Err(HandleError::DuplicateKey("1".into()))
        );
    }

    #[test]
    fn decodes_each_key_independently() {
        let map: BTreeMap<Handle, bool> =
            decode_map(json!({"42": true, "bob": false}), MapOptions::default()).unwrap();
        assert_eq!(map.get(&Handle::from_id(42)), Some(&true));
        assert_eq!(map.get(&Handle::from_name("bob")), Some(&false));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn numeric_names_do_not_survive_a_round_trip() {
        let mut map = BTreeMap::new();
        map.insert(Handle::from_name("2024"), 1);
        map.insert(Handle::from_name("q1"), 2);
        let token = encode_map(&map, MapOptions::default()).unwrap();
        let decoded: BTreeMap<Handle, i32> = decode_map(token, MapOptions::default()).unwrap();
        assert!(decoded.contains_key(&Handle::from_id(2024)));
        assert!(!decoded.contains_key(&Handle::from_name("2024")));
        assert!(decoded.contains_key(&Handle::from_name("q1")));
    }

    #[test]
    fn non_objects_are_rejected() {
        let result: Result<HashMap<Handle, bool>, _> =
            decode_map(json!([1, 2]), MapOptions::default());
        assert!(matches!(result, Err(HandleError::ExpectedObject(_))));
        let empty: HashMap<Handle, bool> = decode_map(Value::Null, MapOptions::default()).unwrap();
        assert!(empty.is_empty());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Cell {
        row_id: i64,
        value: String,
    }

    #[test]
    fn legacy_keys_prefix_object_values() {
        let mut map = HashMap::new();
        map.insert(
            Handle::from_name("one_two_three"),
            Cell {
                row_id: 2,
                value: "value".into(),
            },
        );
        let token = encode_map(&map, MapOptions::LEGACY_KEYS).unwrap();
        assert_eq!(
            token.to_string(),
            r#"{"one_two_three":{"Keys":["row_id","value"],"row_id":2,"value":"value"}}"#
        );

        let decoded: HashMap<Handle, Cell> = decode_map(token, MapOptions::LEGACY_KEYS).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn legacy_keys_refuse_values_with_own_keys_member() {
        let mut map = BTreeMap::new();
        map.insert(Handle::from_id(3), json!({"Keys": ["a"], "a": 1}));
        assert_eq!(
            encode_map(&map, MapOptions::LEGACY_KEYS),
            Err(HandleError::ReservedMember(KEYS_MEMBER))
        );
        assert!(encode_map(&map, MapOptions::default()).is_ok());
    }

    #[test]
    fn legacy_keys_leave_primitive_values_alone() {
        let mut map = BTreeMap::new();
        map.insert(Handle::from_id(3), 9);
        assert_eq!(
            encode_map(&map, MapOptions::LEGACY_KEYS).unwrap(),
            json!({"3": 9})
        );
    }

    #[test]
    fn works_as_serde_adapter() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "crate::handle_map")]
            cells: BTreeMap<Handle, String>,
            #[serde(with = "crate::handle_map::with_keys")]
            details: HashMap<Handle, Cell>,
        }

        let json = json!({
            "cells": {"5": "five", "status": "open"},
            "details": {"7": {"Keys": ["row_id", "value"], "row_id": 1, "value": "x"}}
        });
        let row: Row = serde_json::from_value(json).unwrap();
        assert_eq!(row.cells[&Handle::from_id(5)], "five");
        assert_eq!(row.cells[&Handle::from_name("status")], "open");
        assert_eq!(row.details[&Handle::from_id(7)].value, "x");
    }
}
