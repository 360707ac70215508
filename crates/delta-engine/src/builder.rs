//! Append-only delta construction.
//!
//! ```
//! use delta_engine::DeltaBuilder;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), delta_engine::DeltaError> {
//! let bold = json!({"bold": true}).as_object().cloned();
//! let delta = DeltaBuilder::new()
//!     .insert("hello")?
//!     .insert_with(" ", bold, None)?
//!     .insert("world")?
//!     .done();
//! assert_eq!(delta.children().len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! Every call normalizes against the previous operation, so a builder never
//! produces two adjacent mergeable operations. `use_attributes` and
//! `use_attribution` set an ambient context merged into each following
//! insert, retain and modify (and, for attribution, into `set`/`unset`);
//! explicit arguments win over the ambient context.

use crate::attrs::{
    merge_attribution, merge_attrs, normalize, normalize_attribution, strip_nulls, Attributes,
    Attribution,
};
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};
use crate::schema::{ContentRef, DeltaSchema};

#[derive(Debug, Default)]
pub struct DeltaBuilder {
    delta: Delta,
    schema: DeltaSchema,
    used_attributes: Option<Attributes>,
    used_attribution: Option<Attribution>,
}

impl DeltaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder for a tree node named `name`.
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            delta: Delta::named(Some(name.into())),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: DeltaSchema) -> Self {
        self.schema = schema;
        self
    }

    /// The delta built so far.
    pub fn peek(&self) -> &Delta {
        &self.delta
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty()
    }

    // ── Ambient context ───────────────────────────────────────────────────

    pub fn use_attributes(&mut self, attributes: Option<Attributes>) -> &mut Self {
        self.used_attributes = normalize(attributes);
        self
    }

    pub fn use_attribution(&mut self, attribution: Option<Attribution>) -> &mut Self {
        self.used_attribution = normalize_attribution(attribution);
        self
    }

    fn attributes_for(&self, explicit: Option<&Attributes>) -> Option<Attributes> {
        merge_attrs(self.used_attributes.as_ref(), explicit)
    }

    fn attribution_for(&self, explicit: Option<&Attribution>) -> Option<Attribution> {
        merge_attribution(self.used_attribution.as_ref(), explicit)
    }

    // ── Sequence operations ───────────────────────────────────────────────

    pub fn insert(&mut self, content: impl Into<Content>) -> Result<&mut Self, DeltaError> {
        self.insert_with(content, None, None)
    }

    pub fn insert_with(
        &mut self,
        content: impl Into<Content>,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    ) -> Result<&mut Self, DeltaError> {
        let content = content.into();
        match &content {
            Content::Text(s) => self.schema.content.expect(ContentRef::Text(s))?,
            Content::Items(items) => {
                for item in items {
                    self.schema.content.expect(ContentRef::Item(item))?;
                }
            }
        }
        let op = SeqOp::Insert {
            content,
            attributes: strip_nulls(self.attributes_for(attributes.as_ref())),
            attribution: self.attribution_for(attribution.as_ref()),
        };
        self.delta.push(op);
        Ok(self)
    }

    pub fn retain(&mut self, len: usize) -> &mut Self {
        self.retain_with(len, None, None)
    }

    pub fn retain_with(
        &mut self,
        len: usize,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    ) -> &mut Self {
        let op = SeqOp::Retain {
            len,
            attributes: self.attributes_for(attributes.as_ref()),
            attribution: self.attribution_for(attribution.as_ref()),
        };
        self.delta.push(op);
        self
    }

    pub fn delete(&mut self, len: usize) -> &mut Self {
        self.delta.push(SeqOp::Delete { len });
        self
    }

    /// Apply `delta` to the embedded delta at the current position.
    pub fn modify(&mut self, delta: Delta) -> &mut Self {
        self.modify_with(delta, None, None)
    }

    pub fn modify_with(
        &mut self,
        delta: Delta,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    ) -> &mut Self {
        let op = SeqOp::Modify {
            delta,
            attributes: self.attributes_for(attributes.as_ref()),
            attribution: self.attribution_for(attribution.as_ref()),
        };
        self.delta.push(op);
        self
    }

    // ── Map operations ────────────────────────────────────────────────────

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Item>,
    ) -> Result<&mut Self, DeltaError> {
        self.set_with(key, value, None)
    }

    pub fn set_with(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Item>,
        attribution: Option<Attribution>,
    ) -> Result<&mut Self, DeltaError> {
        let value = value.into();
        self.schema.attrs.expect(ContentRef::Item(&value))?;
        let op = MapOp::Insert {
            value,
            prev_value: None,
            attribution: self.attribution_for(attribution.as_ref()),
        };
        self.delta.put_attr(key.into(), op);
        Ok(self)
    }

    pub fn unset(&mut self, key: impl Into<String>) -> &mut Self {
        self.unset_with(key, None)
    }

    pub fn unset_with(
        &mut self,
        key: impl Into<String>,
        attribution: Option<Attribution>,
    ) -> &mut Self {
        let op = MapOp::Delete {
            prev_value: None,
            attribution: self.attribution_for(attribution.as_ref()),
        };
        self.delta.put_attr(key.into(), op);
        self
    }

    /// Apply `delta` to the embedded delta stored under `key`.
    pub fn update(&mut self, key: impl Into<String>, delta: Delta) -> &mut Self {
        self.delta.put_attr(key.into(), MapOp::Modify { delta });
        self
    }

    /// Seal and return the delta, leaving this builder empty.
    pub fn done(&mut self) -> Delta {
        let name = self.delta.name().map(str::to_string);
        std::mem::replace(&mut self.delta, Delta::named(name)).done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, ValueType};
    use serde_json::json;

    fn attrs(v: serde_json::Value) -> Option<Attributes> {
        v.as_object().cloned()
    }

    #[test]
    fn ambient_attributes_merge_with_explicit() {
        let mut b = DeltaBuilder::new();
        b.use_attributes(attrs(json!({"bold": true, "color": "red"})));
        b.insert_with("x", attrs(json!({"color": "blue"})), None).unwrap();
        b.use_attributes(None);
        b.insert("y").unwrap();
        let d = b.done();
        assert_eq!(
            d.children()[0].attributes().cloned(),
            attrs(json!({"bold": true, "color": "blue"}))
        );
        assert_eq!(d.children()[1].attributes(), None);
    }

    #[test]
    fn null_attributes_are_dropped_on_insert_only() {
        let mut b = DeltaBuilder::new();
        b.insert_with("x", attrs(json!({"bold": null})), None).unwrap();
        b.retain_with(1, attrs(json!({"bold": null})), None);
        let d = b.done();
        assert_eq!(d.children()[0].attributes(), None);
        assert_eq!(d.children()[1].attributes().cloned(), attrs(json!({"bold": null})));
    }

    #[test]
    fn ambient_attribution_applies_to_map_ops() {
        let mut b = DeltaBuilder::new();
        b.use_attribution(Some(Attribution::inserted_by("alice")));
        b.set("title", json!("Hi")).unwrap();
        b.unset("draft");
        let d = b.done();
        assert_eq!(
            d.attr("title").and_then(MapOp::attribution),
            Some(&Attribution::inserted_by("alice"))
        );
        assert!(d.attr("draft").and_then(MapOp::attribution).is_some());
    }

    #[test]
    fn last_write_wins_per_key() {
        let mut b = DeltaBuilder::new();
        b.set("a", json!(1)).unwrap();
        b.unset("a");
        b.set("a", json!(2)).unwrap();
        let d = b.done();
        assert_eq!(d.attrs().len(), 1);
        assert!(matches!(
            d.attr("a"),
            Some(MapOp::Insert { value: Item::Value(v), prev_value: None, .. }) if *v == json!(2)
        ));
    }

    #[test]
    fn schema_violation_leaves_builder_untouched() {
        let schema = DeltaSchema::new(Schema::Text, Schema::Value(ValueType::Number));
        let mut b = DeltaBuilder::new().with_schema(schema);
        b.insert("ok").unwrap();
        let err = b.insert(json!(1)).unwrap_err();
        assert!(matches!(err, DeltaError::SchemaViolation(_)));
        let err = b.set("k", json!("nope")).unwrap_err();
        assert!(matches!(err, DeltaError::SchemaViolation(_)));
        b.set("k", json!(2)).unwrap();
        let d = b.done();
        assert_eq!(d.text(), "ok");
        assert_eq!(d.children().len(), 1);
        assert_eq!(d.attrs().len(), 1);
    }

    #[test]
    fn done_resets_but_keeps_node_name() {
        let mut b = DeltaBuilder::node("p");
        b.insert("a").unwrap();
        let first = b.done();
        assert_eq!(first.name(), Some("p"));
        assert!(b.is_empty());
        assert_eq!(b.done().name(), Some("p"));
    }
}
