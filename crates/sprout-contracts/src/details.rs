//! Action-specific context attached to an entry.
//!
//! `details` is the one schema-less field of an entry.  It is still a closed
//! value type so that whatever a handler puts in it has a well-defined JSON
//! encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value context recorded alongside an entry.
pub type Details = BTreeMap<String, DetailValue>;

/// A JSON-shaped scalar or nested value.
///
/// Untagged, so it serializes as the plain JSON value.  Variant order matters
/// for deserialization: integers are tried before floats so `5` stays an
/// `Integer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<DetailValue>),
    Map(BTreeMap<String, DetailValue>),
}

impl From<bool> for DetailValue {
    fn from(v: bool) -> Self {
        DetailValue::Bool(v)
    }
}

impl From<i64> for DetailValue {
    fn from(v: i64) -> Self {
        DetailValue::Integer(v)
    }
}

impl From<u32> for DetailValue {
    fn from(v: u32) -> Self {
        DetailValue::Integer(i64::from(v))
    }
}

impl From<f64> for DetailValue {
    fn from(v: f64) -> Self {
        DetailValue::Float(v)
    }
}

impl From<&str> for DetailValue {
    fn from(v: &str) -> Self {
        DetailValue::Text(v.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(v: String) -> Self {
        DetailValue::Text(v)
    }
}

impl<T: Into<DetailValue>> From<Vec<T>> for DetailValue {
    fn from(v: Vec<T>) -> Self {
        DetailValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DetailValue>> From<Option<T>> for DetailValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DetailValue::Null, Into::into)
    }
}
