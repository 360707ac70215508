//! Content schemas.
//!
//! A schema decides what a [`DeltaBuilder`](crate::DeltaBuilder) accepts as
//! inserted content and as map values. It is consulted only at those two
//! construction boundaries; compose, rebase and diff never validate.
//!
//! Anything implementing [`ContentSchema`] can be plugged in, including
//! closures over [`ContentRef`]. [`Schema`] covers the common declarative
//! cases.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DeltaError;
use crate::ops::Item;

/// A borrowed view of a value offered to a schema.
#[derive(Debug, Clone, Copy)]
pub enum ContentRef<'a> {
    /// A whole text run.
    Text(&'a str),
    Item(&'a Item),
}

impl fmt::Display for ContentRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRef::Text(s) => write!(f, "text {s:?}"),
            ContentRef::Item(Item::Value(v)) => write!(f, "value {v}"),
            ContentRef::Item(Item::Delta(d)) => match d.name() {
                Some(name) => write!(f, "embedded delta <{name}>"),
                None => write!(f, "embedded delta"),
            },
        }
    }
}

pub trait ContentSchema: Send + Sync {
    fn check(&self, value: ContentRef<'_>) -> bool;

    fn expect(&self, value: ContentRef<'_>) -> Result<(), DeltaError> {
        if self.check(value) {
            Ok(())
        } else {
            Err(DeltaError::SchemaViolation(format!("{value} is not allowed")))
        }
    }
}

impl<F> ContentSchema for F
where
    F: Fn(ContentRef<'_>) -> bool + Send + Sync,
{
    fn check(&self, value: ContentRef<'_>) -> bool {
        self(value)
    }
}

/// JSON type of a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Any,
    Null,
    Boolean,
    Number,
    Integer,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::Any => true,
            ValueType::Null => value.is_null(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Number => value.is_number(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::String => value.is_string(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }
}

/// Declarative schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Schema {
    #[default]
    Any,
    /// Rejects everything.
    Nothing,
    Text,
    Value(ValueType),
    /// An embedded delta, optionally required to carry the given node name.
    Embed(Option<String>),
    OneOf(Vec<Schema>),
}

impl Schema {
    /// Rich text: text runs and embeds of any kind.
    pub fn rich_text() -> Self {
        Schema::OneOf(vec![Schema::Text, Schema::Embed(None)])
    }
}

impl ContentSchema for Schema {
    fn check(&self, value: ContentRef<'_>) -> bool {
        match (self, value) {
            (Schema::Any, _) => true,
            (Schema::Nothing, _) => false,
            (Schema::Text, ContentRef::Text(_)) => true,
            (Schema::Value(ty), ContentRef::Item(Item::Value(v))) => ty.matches(v),
            (Schema::Embed(None), ContentRef::Item(Item::Delta(_))) => true,
            (Schema::Embed(Some(name)), ContentRef::Item(Item::Delta(d))) => {
                d.name() == Some(name.as_str())
            }
            (Schema::OneOf(options), value) => options.iter().any(|s| s.check(value)),
            _ => false,
        }
    }
}

/// The pair of schemas a builder validates against.
#[derive(Clone)]
pub struct DeltaSchema {
    pub content: Arc<dyn ContentSchema>,
    pub attrs: Arc<dyn ContentSchema>,
}

impl DeltaSchema {
    pub fn new(content: impl ContentSchema + 'static, attrs: impl ContentSchema + 'static) -> Self {
        Self {
            content: Arc::new(content),
            attrs: Arc::new(attrs),
        }
    }

    /// Constrain inserted content only.
    pub fn content(content: impl ContentSchema + 'static) -> Self {
        Self::new(content, Schema::Any)
    }

    /// Constrain map values only.
    pub fn attrs(attrs: impl ContentSchema + 'static) -> Self {
        Self::new(Schema::Any, attrs)
    }
}

impl Default for DeltaSchema {
    fn default() -> Self {
        Self::new(Schema::Any, Schema::Any)
    }
}

impl fmt::Debug for DeltaSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaSchema").finish_non_exhaustive()
    }
}
