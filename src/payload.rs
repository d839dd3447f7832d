//! Outgoing payloads and received data.
//!
//! A [`Payload`] is resolved to bytes exactly once at send time. Structured
//! values go out as UTF-8 JSON (serde_json escapes neither slashes nor
//! non-ASCII); JSON strings and numbers pass through as their bare text;
//! raw bytes and strings pass through untouched. A [`Payload::Thunk`]
//! defers expensive serialization until a connection actually exists.
//!
//! [`ResponseData`] is the receive-side mirror: after a successful read the
//! raw bytes get a best-effort JSON upgrade — an object or array replaces
//! the raw form, anything else is returned unchanged. The upgrade never
//! fails.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// An outgoing payload.
pub enum Payload {
    /// Raw bytes, sent as-is.
    Bytes(Vec<u8>),
    /// Text, sent as its UTF-8 bytes.
    Text(String),
    /// A JSON value. Objects and arrays are serialized; strings and
    /// numbers pass through as bare text.
    Json(Value),
    /// A deferred payload, invoked exactly once at send time.
    Thunk(Box<dyn FnOnce() -> Payload + Send>),
}

impl Payload {
    /// Build a payload by JSON-encoding any serializable value.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Build a deferred payload.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> Payload + Send + 'static,
    {
        Payload::Thunk(Box::new(f))
    }

    /// Resolve to the bytes that go on the wire. Thunks are invoked here,
    /// exactly once.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Payload::Bytes(b) => Ok(b),
            Payload::Text(s) => Ok(s.into_bytes()),
            Payload::Json(Value::String(s)) => Ok(s.into_bytes()),
            Payload::Json(Value::Number(n)) => Ok(n.to_string().into_bytes()),
            Payload::Json(Value::Null) => Ok(Vec::new()),
            Payload::Json(value) => Ok(serde_json::to_vec(&value)?),
            Payload::Thunk(f) => f().into_bytes(),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Payload::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Payload::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Payload::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Bytes(b.to_vec())
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Json(v)
    }
}

/// Data carried by a [`Reply`](crate::Reply).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseData {
    /// Nothing received yet (or the operation failed before reading).
    #[default]
    Empty,
    /// Raw received bytes; the JSON upgrade did not apply.
    Raw(Bytes),
    /// The received bytes parsed as a JSON object or array.
    Json(Value),
}

impl ResponseData {
    /// Upgrade raw received bytes: a successful parse of a JSON object or
    /// array replaces the raw form; anything else stays raw. Never fails.
    pub fn upgrade(raw: Bytes) -> Self {
        match serde_json::from_slice::<Value>(&raw) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => ResponseData::Json(value),
            _ => ResponseData::Raw(raw),
        }
    }

    /// The parsed JSON value, if the upgrade applied.
    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(v) => Some(v),
            _ => None,
        }
    }

    /// The data as UTF-8 text, when it is raw and valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseData::Raw(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// The raw bytes, when the upgrade did not apply.
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            ResponseData::Raw(b) => Some(b),
            _ => None,
        }
    }
}
