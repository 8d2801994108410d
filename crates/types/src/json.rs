//! Session-bound JSON entry points.
//!
//! A [`JsonCodec`] carries one [`HandleFormat`] and applies it to every
//! [`Handle`](crate::Handle) reached while (de)serializing a value.

use crate::HandleFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonCodec {
    format: HandleFormat,
}

impl JsonCodec {
    pub fn new(format: HandleFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> HandleFormat {
        self.format
    }

    pub fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        self.format.scope(|| serde_json::to_string(value))
    }

    pub fn to_string_pretty<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        self.format.scope(|| serde_json::to_string_pretty(value))
    }

    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        self.format.scope(|| serde_json::to_vec(value))
    }

    pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Value> {
        self.format.scope(|| serde_json::to_value(value))
    }

    pub fn from_str<T: DeserializeOwned>(&self, json: &str) -> serde_json::Result<T> {
        self.format.scope(|| serde_json::from_str(json))
    }

    pub fn from_slice<T: DeserializeOwned>(&self, json: &[u8]) -> serde_json::Result<T> {
        self.format.scope(|| serde_json::from_slice(json))
    }

    pub fn from_value<T: DeserializeOwned>(&self, value: Value) -> serde_json::Result<T> {
        self.format.scope(|| serde_json::from_value(value))
    }
}
