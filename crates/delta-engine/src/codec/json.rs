//! JSON projection of a delta.
//!
//! ```text
//! {
//!   "name"?: string,
//!   "attrs"?: { key: {"type": "insert", "value", "prevValue"?, "attribution"?}
//!                  | {"type": "delete", "prevValue"?, "attribution"?}
//!                  | {"type": "modify", "modify": delta} },
//!   "children"?: [ {"insert": string | [item], "attributes"?, "attribution"?}
//!                | {"delete": n}
//!                | {"retain": n, "attributes"?, "attribution"?}
//!                | {"modify": delta, "attributes"?, "attribution"?} ]
//! }
//! ```
//!
//! An embedded delta inside an item list or a map value is wrapped as
//! `{"$delta": delta}`. A plain object value whose only key is `$delta` is
//! therefore not representable.

use serde_json::{json, Map, Value};

use crate::attrs::{normalize, normalize_attribution, Attributes, Attribution};
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};

const EMBED_TAG: &str = "$delta";

// ── Encoding ──────────────────────────────────────────────────────────────

fn encode_item(item: &Item) -> Value {
    match item {
        Item::Value(v) => v.clone(),
        Item::Delta(d) => {
            let mut m = Map::new();
            m.insert(EMBED_TAG.into(), to_json(d));
            Value::Object(m)
        }
    }
}

fn encode_attribution(attribution: &Attribution) -> Value {
    serde_json::to_value(attribution).unwrap_or(Value::Null)
}

fn put_format(
    m: &mut Map<String, Value>,
    attributes: Option<&Attributes>,
    attribution: Option<&Attribution>,
) {
    if let Some(attributes) = attributes {
        m.insert("attributes".into(), Value::Object(attributes.clone()));
    }
    if let Some(attribution) = attribution {
        m.insert("attribution".into(), encode_attribution(attribution));
    }
}

fn encode_child(op: &SeqOp) -> Value {
    let mut m = Map::new();
    match op {
        SeqOp::Insert {
            content,
            attributes,
            attribution,
        } => {
            let content = match content {
                Content::Text(s) => Value::String(s.clone()),
                Content::Items(items) => Value::Array(items.iter().map(encode_item).collect()),
            };
            m.insert("insert".into(), content);
            put_format(&mut m, attributes.as_ref(), attribution.as_ref());
        }
        SeqOp::Delete { len } => {
            m.insert("delete".into(), json!(len));
        }
        SeqOp::Retain {
            len,
            attributes,
            attribution,
        } => {
            m.insert("retain".into(), json!(len));
            put_format(&mut m, attributes.as_ref(), attribution.as_ref());
        }
        SeqOp::Modify {
            delta,
            attributes,
            attribution,
        } => {
            m.insert("modify".into(), to_json(delta));
            put_format(&mut m, attributes.as_ref(), attribution.as_ref());
        }
    }
    Value::Object(m)
}

fn encode_attr(op: &MapOp) -> Value {
    let mut m = Map::new();
    m.insert("type".into(), json!(op.kind()));
    match op {
        MapOp::Insert {
            value,
            prev_value,
            attribution,
        } => {
            m.insert("value".into(), encode_item(value));
            if let Some(prev) = prev_value {
                m.insert("prevValue".into(), encode_item(prev));
            }
            if let Some(attribution) = attribution {
                m.insert("attribution".into(), encode_attribution(attribution));
            }
        }
        MapOp::Delete {
            prev_value,
            attribution,
        } => {
            if let Some(prev) = prev_value {
                m.insert("prevValue".into(), encode_item(prev));
            }
            if let Some(attribution) = attribution {
                m.insert("attribution".into(), encode_attribution(attribution));
            }
        }
        MapOp::Modify { delta } => {
            m.insert("modify".into(), to_json(delta));
        }
    }
    Value::Object(m)
}

/// Serialize a delta to its canonical JSON projection.
pub fn to_json(delta: &Delta) -> Value {
    let mut m = Map::new();
    if let Some(name) = delta.name() {
        m.insert("name".into(), json!(name));
    }
    if !delta.attrs().is_empty() {
        let attrs: Map<String, Value> = delta
            .attrs()
            .iter()
            .map(|(key, op)| (key.clone(), encode_attr(op)))
            .collect();
        m.insert("attrs".into(), Value::Object(attrs));
    }
    if !delta.children().is_empty() {
        m.insert(
            "children".into(),
            Value::Array(delta.children().iter().map(encode_child).collect()),
        );
    }
    Value::Object(m)
}

// ── Decoding ──────────────────────────────────────────────────────────────

fn decode_item(v: &Value) -> Result<Item, DeltaError> {
    match v.as_object() {
        Some(obj) if obj.len() == 1 => match obj.get(EMBED_TAG) {
            Some(inner) => Ok(Item::Delta(from_json(inner)?)),
            None => Ok(Item::Value(v.clone())),
        },
        _ => Ok(Item::Value(v.clone())),
    }
}

fn decode_count(v: &Value, what: &str) -> Result<usize, DeltaError> {
    v.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| DeltaError::decode(format!("{what} must be a non-negative integer")))
}

fn decode_attributes(obj: &Map<String, Value>) -> Result<Option<Attributes>, DeltaError> {
    match obj.get("attributes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(normalize(Some(m.clone()))),
        Some(_) => Err(DeltaError::decode("attributes must be an object")),
    }
}

fn decode_attribution(obj: &Map<String, Value>) -> Result<Option<Attribution>, DeltaError> {
    match obj.get("attribution") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let attribution: Attribution = serde_json::from_value(v.clone())
                .map_err(|e| DeltaError::decode(format!("attribution: {e}")))?;
            Ok(normalize_attribution(Some(attribution)))
        }
    }
}

fn decode_child(v: &Value) -> Result<SeqOp, DeltaError> {
    let obj = v
        .as_object()
        .ok_or_else(|| DeltaError::decode("child must be an object"))?;
    if let Some(content) = obj.get("insert") {
        let content = match content {
            Value::String(s) => Content::Text(s.clone()),
            Value::Array(items) => {
                Content::Items(items.iter().map(decode_item).collect::<Result<_, _>>()?)
            }
            _ => return Err(DeltaError::decode("insert must be a string or an array")),
        };
        return Ok(SeqOp::Insert {
            content,
            attributes: decode_attributes(obj)?,
            attribution: decode_attribution(obj)?,
        });
    }
    if let Some(len) = obj.get("delete") {
        return Ok(SeqOp::Delete {
            len: decode_count(len, "delete")?,
        });
    }
    if let Some(len) = obj.get("retain") {
        return Ok(SeqOp::Retain {
            len: decode_count(len, "retain")?,
            attributes: decode_attributes(obj)?,
            attribution: decode_attribution(obj)?,
        });
    }
    if let Some(delta) = obj.get("modify") {
        return Ok(SeqOp::Modify {
            delta: from_json(delta)?,
            attributes: decode_attributes(obj)?,
            attribution: decode_attribution(obj)?,
        });
    }
    Err(DeltaError::decode("unknown child operation"))
}

fn decode_attr(key: &str, v: &Value) -> Result<MapOp, DeltaError> {
    let obj = v
        .as_object()
        .ok_or_else(|| DeltaError::decode(format!("attr `{key}` must be an object")))?;
    let prev_value = obj.get("prevValue").map(decode_item).transpose()?;
    let value = obj.get("value");
    match obj.get("type").and_then(Value::as_str) {
        Some("insert") => {
            let value =
                value.ok_or_else(|| DeltaError::decode(format!("attr `{key}` lacks a value")))?;
            Ok(MapOp::Insert {
                value: decode_item(value)?,
                prev_value,
                attribution: decode_attribution(obj)?,
            })
        }
        Some("delete") => Ok(MapOp::Delete {
            prev_value,
            attribution: decode_attribution(obj)?,
        }),
        Some("modify") => {
            // Older payloads carry the nested delta under "value".
            let nested = obj
                .get("modify")
                .or(value)
                .ok_or_else(|| DeltaError::decode(format!("attr `{key}` lacks a delta")))?;
            Ok(MapOp::Modify {
                delta: from_json(nested)?,
            })
        }
        Some(other) => Err(DeltaError::decode(format!(
            "attr `{key}` has unknown type `{other}`"
        ))),
        None => Err(DeltaError::decode(format!("attr `{key}` lacks a type"))),
    }
}

/// Parse the JSON projection, normalizing the children.
pub fn from_json(v: &Value) -> Result<Delta, DeltaError> {
    let obj = v
        .as_object()
        .ok_or_else(|| DeltaError::decode("delta must be an object"))?;
    let name = match obj.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(DeltaError::decode("name must be a string")),
    };
    let mut delta = Delta::named(name);
    match obj.get("children") {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            let mut span: usize = 0;
            for child in children {
                let op = decode_child(child)?;
                span = span
                    .checked_add(op.span())
                    .ok_or_else(|| DeltaError::decode("children span overflows"))?;
                delta.push(op);
            }
        }
        Some(_) => return Err(DeltaError::decode("children must be an array")),
    }
    match obj.get("attrs") {
        None | Some(Value::Null) => {}
        Some(Value::Object(attrs)) => {
            for (key, op) in attrs {
                delta.put_attr(key.clone(), decode_attr(key, op)?);
            }
        }
        Some(_) => return Err(DeltaError::decode("attrs must be an object")),
    }
    Ok(delta.done())
}
