//! Operation variants.
//!
//! A delta holds two kinds of operations:
//! - [`SeqOp`], addressing content by position: `Insert`, `Delete`,
//!   `Retain`, `Modify`
//! - [`MapOp`], addressing a keyed attribute: `Insert`, `Delete`, `Modify`
//!
//! Content is either a run of text or a list of items, where an item is a
//! plain JSON value or an embedded [`Delta`].

use serde_json::Value;

use crate::attrs::{Attributes, Attribution};
use crate::delta::Delta;

// ── Content ───────────────────────────────────────────────────────────────

/// A single list element.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Value(Value),
    Delta(Delta),
}

impl Item {
    pub fn as_delta(&self) -> Option<&Delta> {
        match self {
            Item::Delta(d) => Some(d),
            Item::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Item::Value(v) => Some(v),
            Item::Delta(_) => None,
        }
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Value(value)
    }
}

impl From<Delta> for Item {
    fn from(delta: Delta) -> Self {
        Item::Delta(delta)
    }
}

/// The payload of an insert.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Length counts Unicode scalar values.
    Text(String),
    Items(Vec<Item>),
}

impl Content {
    pub fn len(&self) -> usize {
        match self {
            Content::Text(s) => s.chars().count(),
            Content::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(s) => s.is_empty(),
            Content::Items(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Items(_) => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Item]> {
        match self {
            Content::Items(items) => Some(items),
            Content::Text(_) => None,
        }
    }

    /// Text and item runs never merge with each other.
    pub(crate) fn same_kind(&self, other: &Content) -> bool {
        matches!(
            (self, other),
            (Content::Text(_), Content::Text(_)) | (Content::Items(_), Content::Items(_))
        )
    }

    /// Append `other`, which must be of the same kind.
    pub(crate) fn append(&mut self, other: Content) {
        match (self, other) {
            (Content::Text(s), Content::Text(t)) => s.push_str(&t),
            (Content::Items(a), Content::Items(b)) => a.extend(b),
            _ => {}
        }
    }

    pub(crate) fn slice(&self, start: usize, len: usize) -> Content {
        match self {
            Content::Text(s) => Content::Text(s.chars().skip(start).take(len).collect()),
            Content::Items(items) => {
                let end = (start + len).min(items.len());
                Content::Items(items[start.min(end)..end].to_vec())
            }
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Vec<Item>> for Content {
    fn from(items: Vec<Item>) -> Self {
        Content::Items(items)
    }
}

impl From<Item> for Content {
    fn from(item: Item) -> Self {
        Content::Items(vec![item])
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Items(vec![Item::Value(value)])
    }
}

impl From<Delta> for Content {
    fn from(delta: Delta) -> Self {
        Content::Items(vec![Item::Delta(delta)])
    }
}

// ── Sequence operations ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SeqOp {
    Insert {
        content: Content,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    },
    Delete {
        len: usize,
    },
    Retain {
        len: usize,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    },
    /// Applies `delta` to the single embedded delta at this position.
    Modify {
        delta: Delta,
        attributes: Option<Attributes>,
        attribution: Option<Attribution>,
    },
}

impl SeqOp {
    pub fn insert(content: impl Into<Content>) -> Self {
        SeqOp::Insert {
            content: content.into(),
            attributes: None,
            attribution: None,
        }
    }

    pub fn retain(len: usize) -> Self {
        SeqOp::Retain {
            len,
            attributes: None,
            attribution: None,
        }
    }

    pub fn delete(len: usize) -> Self {
        SeqOp::Delete { len }
    }

    /// Length over the resulting content. Deletes have length zero.
    pub fn len(&self) -> usize {
        match self {
            SeqOp::Insert { content, .. } => content.len(),
            SeqOp::Delete { .. } => 0,
            SeqOp::Retain { len, .. } => *len,
            SeqOp::Modify { .. } => 1,
        }
    }

    /// Units this operation covers when walked by a cursor: inserted units
    /// for an insert, addressed units for everything else.
    pub fn span(&self) -> usize {
        match self {
            SeqOp::Insert { content, .. } => content.len(),
            SeqOp::Delete { len } | SeqOp::Retain { len, .. } => *len,
            SeqOp::Modify { .. } => 1,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, SeqOp::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, SeqOp::Delete { .. })
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            SeqOp::Insert { attributes, .. }
            | SeqOp::Retain { attributes, .. }
            | SeqOp::Modify { attributes, .. } => attributes.as_ref(),
            SeqOp::Delete { .. } => None,
        }
    }

    pub fn attribution(&self) -> Option<&Attribution> {
        match self {
            SeqOp::Insert { attribution, .. }
            | SeqOp::Retain { attribution, .. }
            | SeqOp::Modify { attribution, .. } => attribution.as_ref(),
            SeqOp::Delete { .. } => None,
        }
    }

    /// `len` units of this operation starting at `start`.
    pub(crate) fn slice(&self, start: usize, len: usize) -> SeqOp {
        match self {
            SeqOp::Insert {
                content,
                attributes,
                attribution,
            } => SeqOp::Insert {
                content: content.slice(start, len),
                attributes: attributes.clone(),
                attribution: attribution.clone(),
            },
            SeqOp::Delete { .. } => SeqOp::Delete { len },
            SeqOp::Retain {
                attributes,
                attribution,
                ..
            } => SeqOp::Retain {
                len,
                attributes: attributes.clone(),
                attribution: attribution.clone(),
            },
            SeqOp::Modify { .. } => self.clone(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            SeqOp::Insert { .. } => "insert",
            SeqOp::Delete { .. } => "delete",
            SeqOp::Retain { .. } => "retain",
            SeqOp::Modify { .. } => "modify",
        }
    }
}

// ── Map operations ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    Insert {
        value: Item,
        prev_value: Option<Item>,
        attribution: Option<Attribution>,
    },
    Delete {
        prev_value: Option<Item>,
        attribution: Option<Attribution>,
    },
    Modify {
        delta: Delta,
    },
}

impl MapOp {
    /// The value before this operation, when known.
    pub fn prev_value(&self) -> Option<&Item> {
        match self {
            MapOp::Insert { prev_value, .. } | MapOp::Delete { prev_value, .. } => {
                prev_value.as_ref()
            }
            MapOp::Modify { .. } => None,
        }
    }

    pub fn attribution(&self) -> Option<&Attribution> {
        match self {
            MapOp::Insert { attribution, .. } | MapOp::Delete { attribution, .. } => {
                attribution.as_ref()
            }
            MapOp::Modify { .. } => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            MapOp::Insert { .. } => "insert",
            MapOp::Delete { .. } => "delete",
            MapOp::Modify { .. } => "modify",
        }
    }
}
