//! Wire codecs.
//!
//! The JSON projection is the only wire contract. `Delta` implements serde's
//! `Serialize` and `Deserialize` through it, so any serde format can carry a
//! delta.

pub mod json;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::delta::Delta;

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json::to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        json::from_json(&value).map_err(D::Error::custom)
    }
}
