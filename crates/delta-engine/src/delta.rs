//! The delta container.
//!
//! A [`Delta`] is an ordered list of sequence operations (`children`) plus a
//! keyed map of attribute operations (`attrs`), optionally tagged with a node
//! `name`. Deltas are built with [`DeltaBuilder`](crate::DeltaBuilder) and are
//! immutable once sealed.
//!
//! Canonical form, maintained by [`Delta::push`]:
//! - no two adjacent children that could merge (same kind, equal attributes
//!   and attribution, same content kind)
//! - an insert never directly follows a delete
//! - no trailing retain without attributes or attribution (after `done`)

use indexmap::IndexMap;

use crate::attrs::attrs_equal;
use crate::cursor::OpCursor;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    name: Option<String>,
    children: Vec<SeqOp>,
    attrs: IndexMap<String, MapOp>,
}

impl Delta {
    /// The empty delta. Composing with it is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn named(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The same operations under another node name.
    pub fn renamed(mut self, name: Option<&str>) -> Delta {
        self.name = name.map(str::to_string);
        self
    }

    pub fn children(&self) -> &[SeqOp] {
        &self.children
    }

    pub fn attrs(&self) -> &IndexMap<String, MapOp> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&MapOp> {
        self.attrs.get(key)
    }

    /// `true` when the delta carries no operations. The name is not
    /// considered.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.attrs.is_empty()
    }

    /// Length of the content this delta produces, summing insert lengths,
    /// retains and modifies.
    pub fn len(&self) -> usize {
        self.children.iter().map(SeqOp::len).sum()
    }

    /// A state delta only enumerates content: inserts and map inserts.
    pub fn is_state(&self) -> bool {
        self.children.iter().all(SeqOp::is_insert)
            && self.attrs.values().all(|op| matches!(op, MapOp::Insert { .. }))
    }

    /// Concatenated text of all text inserts. Embeds are skipped.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|op| match op {
                SeqOp::Insert {
                    content: Content::Text(s),
                    ..
                } => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The children covering units `start..end`. Map operations are kept.
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut out = Delta::named(self.name.clone());
        out.attrs = self.attrs.clone();
        let mut cursor = OpCursor::new(&self.children);
        let mut index = 0;
        while index < end && cursor.has_next() {
            let len = if index < start {
                start - index
            } else {
                end - index
            };
            let Some(op) = cursor.next(len) else { break };
            let span = op.span();
            if index >= start {
                out.push(op);
            }
            index += span;
        }
        out.done()
    }

    /// Equality ignoring attribution at every nesting level.
    pub fn content_eq(&self, other: &Delta) -> bool {
        self.without_attribution() == other.without_attribution()
    }

    pub fn without_attribution(&self) -> Delta {
        let mut out = Delta::named(self.name.clone());
        for op in &self.children {
            out.push(match op {
                SeqOp::Insert {
                    content,
                    attributes,
                    ..
                } => SeqOp::Insert {
                    content: match content {
                        Content::Text(s) => Content::Text(s.clone()),
                        Content::Items(items) => {
                            Content::Items(items.iter().map(item_without_attribution).collect())
                        }
                    },
                    attributes: attributes.clone(),
                    attribution: None,
                },
                SeqOp::Delete { len } => SeqOp::Delete { len: *len },
                SeqOp::Retain {
                    len, attributes, ..
                } => SeqOp::Retain {
                    len: *len,
                    attributes: attributes.clone(),
                    attribution: None,
                },
                SeqOp::Modify {
                    delta, attributes, ..
                } => SeqOp::Modify {
                    delta: delta.without_attribution(),
                    attributes: attributes.clone(),
                    attribution: None,
                },
            });
        }
        for (key, op) in &self.attrs {
            let op = match op {
                MapOp::Insert {
                    value, prev_value, ..
                } => MapOp::Insert {
                    value: item_without_attribution(value),
                    prev_value: prev_value.as_ref().map(item_without_attribution),
                    attribution: None,
                },
                MapOp::Delete { prev_value, .. } => MapOp::Delete {
                    prev_value: prev_value.as_ref().map(item_without_attribution),
                    attribution: None,
                },
                MapOp::Modify { delta } => MapOp::Modify {
                    delta: delta.without_attribution(),
                },
            };
            out.attrs.insert(key.clone(), op);
        }
        out.done()
    }

    /// Seal the delta: re-normalize the children and strip the trailing
    /// retain. Idempotent.
    pub fn done(self) -> Delta {
        let Delta {
            name,
            children,
            attrs,
        } = self;
        let mut out = Delta {
            name,
            children: Vec::with_capacity(children.len()),
            attrs,
        };
        for op in children {
            out.push(op);
        }
        out.chop();
        out
    }

    // ── Algorithms ────────────────────────────────────────────────────────

    /// See [`compose`](crate::compose::compose).
    pub fn compose(&self, other: &Delta) -> Result<Delta, DeltaError> {
        crate::compose::compose(self, other)
    }

    /// Compose `change` into this delta in place. Used to accumulate a burst
    /// of edits; on error `self` is unchanged.
    pub fn apply_in_place(&mut self, change: &Delta) -> Result<(), DeltaError> {
        *self = crate::compose::compose(self, change)?;
        Ok(())
    }

    /// See [`rebase`](crate::rebase::rebase).
    pub fn rebase(&self, other: &Delta, priority: bool) -> Result<Delta, DeltaError> {
        crate::rebase::rebase(self, other, priority)
    }

    /// See [`diff`](crate::diff::diff).
    pub fn diff(&self, to: &Delta) -> Result<Delta, DeltaError> {
        crate::diff::diff(self, to)
    }

    // ── Construction internals ────────────────────────────────────────────

    /// Append `op`, merging it into the last child when possible.
    pub(crate) fn push(&mut self, op: SeqOp) {
        if op.span() == 0 {
            return;
        }
        if op.is_insert() && self.children.last().is_some_and(SeqOp::is_delete) {
            if let Some(delete) = self.children.pop() {
                self.push(op);
                self.children.push(delete);
                return;
            }
        }
        let op = match self.children.last_mut() {
            Some(last) => match merge_into(last, op) {
                Some(op) => op,
                None => return,
            },
            None => op,
        };
        self.children.push(op);
    }

    /// Drop trailing retains that carry no information.
    pub(crate) fn chop(&mut self) {
        while matches!(
            self.children.last(),
            Some(SeqOp::Retain {
                attributes: None,
                attribution: None,
                ..
            })
        ) {
            self.children.pop();
        }
    }

    pub(crate) fn put_attr(&mut self, key: String, op: MapOp) {
        self.attrs.insert(key, op);
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut IndexMap<String, MapOp> {
        &mut self.attrs
    }
}

/// Merge `op` into `last` if both are the same kind with equal formatting
/// and the merged length fits. Returns `op` back when it could not be merged.
fn merge_into(last: &mut SeqOp, op: SeqOp) -> Option<SeqOp> {
    match (last, op) {
        (
            SeqOp::Insert {
                content,
                attributes,
                attribution,
            },
            SeqOp::Insert {
                content: next,
                attributes: next_attributes,
                attribution: next_attribution,
            },
        ) if content.same_kind(&next)
            && attrs_equal(attributes.as_ref(), next_attributes.as_ref())
            && *attribution == next_attribution =>
        {
            content.append(next);
            None
        }
        (
            SeqOp::Retain {
                len,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                len: next,
                attributes: next_attributes,
                attribution: next_attribution,
            },
        ) if attrs_equal(attributes.as_ref(), next_attributes.as_ref())
            && *attribution == next_attribution
            && len.checked_add(next).is_some() =>
        {
            *len += next;
            None
        }
        (SeqOp::Delete { len }, SeqOp::Delete { len: next }) if len.checked_add(next).is_some() => {
            *len += next;
            None
        }
        (_, op) => Some(op),
    }
}

fn item_without_attribution(item: &Item) -> Item {
    match item {
        Item::Value(v) => Item::Value(v.clone()),
        Item::Delta(d) => Item::Delta(d.without_attribution()),
    }
}
