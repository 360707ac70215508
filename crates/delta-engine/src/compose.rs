//! Sequential composition.
//!
//! [`compose`] folds a later delta into an earlier one. [`apply`] is the
//! strict form used on states: it rejects changes that reach past the end of
//! the state and always returns a state.

use crate::attrs::{compose_attrs, merge_attribution};
use crate::cursor::OpCursor;
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// `a` is any delta and carries an implicit trailing retain.
    Loose,
    /// `a` is a state; the result is a state.
    Strict,
}

/// The single delta equivalent to applying `a` then `b`.
pub fn compose(a: &Delta, b: &Delta) -> Result<Delta, DeltaError> {
    compose_in(a, b, Mode::Loose)
}

/// Apply `change` to the state delta `state`.
pub fn apply(state: &Delta, change: &Delta) -> Result<Delta, DeltaError> {
    compose_in(state, change, Mode::Strict)
}

fn compose_in(a: &Delta, b: &Delta, mode: Mode) -> Result<Delta, DeltaError> {
    if mode == Mode::Strict && !a.is_state() {
        return Err(DeltaError::mismatch("apply target is not a state"));
    }
    let name = match (a.name(), b.name()) {
        (Some(x), Some(y)) if x != y => {
            return Err(DeltaError::mismatch(format!(
                "cannot compose <{x}> with <{y}>"
            )))
        }
        (x, y) => x.or(y).map(str::to_string),
    };
    let mut out = Delta::named(name);
    compose_children(&mut out, a, b, mode)?;
    compose_attrs_map(&mut out, a, b, mode)?;
    Ok(out.done())
}

// ── Sequence ──────────────────────────────────────────────────────────────

fn compose_children(out: &mut Delta, a: &Delta, b: &Delta, mode: Mode) -> Result<(), DeltaError> {
    let mut ac = OpCursor::new(a.children());
    let mut bc = OpCursor::new(b.children());
    while ac.has_next() || bc.has_next() {
        if bc.peek_is_insert() {
            if let Some(op) = bc.next(usize::MAX) {
                out.push(op);
            }
            continue;
        }
        if ac.peek_is_delete() {
            if let Some(op) = ac.next(usize::MAX) {
                out.push(op);
            }
            continue;
        }
        if !bc.has_next() {
            for op in ac.rest() {
                out.push(op);
            }
            break;
        }
        if !ac.has_next() {
            if mode == Mode::Strict {
                let kind = bc.peek().map_or("op", SeqOp::kind);
                return Err(DeltaError::mismatch(format!(
                    "{kind} reaches past the end of the state"
                )));
            }
            for op in bc.rest() {
                out.push(op);
            }
            break;
        }
        let len = ac.peek_len().min(bc.peek_len());
        let (Some(a_op), Some(b_op)) = (ac.next(len), bc.next(len)) else {
            break;
        };
        if let Some(op) = compose_op(a_op, b_op, mode)? {
            out.push(op);
        }
    }
    Ok(())
}

/// Combine two aligned ops of equal span. `None` when they cancel out.
fn compose_op(a: SeqOp, b: SeqOp, mode: Mode) -> Result<Option<SeqOp>, DeltaError> {
    let op = match (a, b) {
        (SeqOp::Insert { .. }, SeqOp::Delete { .. }) => return Ok(None),
        (SeqOp::Retain { len, .. }, SeqOp::Delete { .. }) => SeqOp::Delete { len },
        (SeqOp::Modify { .. }, SeqOp::Delete { .. }) => SeqOp::Delete { len: 1 },
        (
            SeqOp::Insert {
                content,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                attributes: over,
                attribution: over_attribution,
                ..
            },
        ) => SeqOp::Insert {
            content,
            attributes: compose_attrs(attributes.as_ref(), over.as_ref(), false),
            attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
        },
        (
            SeqOp::Retain {
                len,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                attributes: over,
                attribution: over_attribution,
                ..
            },
        ) => SeqOp::Retain {
            len,
            attributes: compose_attrs(attributes.as_ref(), over.as_ref(), true),
            attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
        },
        (
            SeqOp::Modify {
                delta,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                attributes: over,
                attribution: over_attribution,
                ..
            },
        ) => SeqOp::Modify {
            delta,
            attributes: compose_attrs(attributes.as_ref(), over.as_ref(), true),
            attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
        },
        (
            SeqOp::Retain {
                attributes,
                attribution,
                ..
            },
            SeqOp::Modify {
                delta,
                attributes: over,
                attribution: over_attribution,
            },
        ) => SeqOp::Modify {
            delta,
            attributes: compose_attrs(attributes.as_ref(), over.as_ref(), true),
            attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
        },
        (
            SeqOp::Modify {
                delta,
                attributes,
                attribution,
            },
            SeqOp::Modify {
                delta: next,
                attributes: over,
                attribution: over_attribution,
            },
        ) => SeqOp::Modify {
            delta: compose_in(&delta, &next, Mode::Loose)?,
            attributes: compose_attrs(attributes.as_ref(), over.as_ref(), true),
            attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
        },
        (
            SeqOp::Insert {
                content: Content::Items(mut items),
                attributes,
                attribution,
            },
            SeqOp::Modify {
                delta: next,
                attributes: over,
                attribution: over_attribution,
            },
        ) if items.len() == 1 && matches!(items[0], Item::Delta(_)) => {
            let Some(Item::Delta(embed)) = items.pop() else {
                return Err(DeltaError::unhandled("insert lost its embed"));
            };
            SeqOp::Insert {
                content: Content::Items(vec![Item::Delta(compose_in(&embed, &next, mode)?)]),
                attributes: compose_attrs(attributes.as_ref(), over.as_ref(), false),
                attribution: merge_attribution(attribution.as_ref(), over_attribution.as_ref()),
            }
        }
        (SeqOp::Insert { .. }, SeqOp::Modify { .. }) => {
            return Err(DeltaError::mismatch(
                "modify addresses text or a plain value",
            ))
        }
        (a, b) => {
            return Err(DeltaError::unhandled(format!(
                "compose {} with {}",
                a.kind(),
                b.kind()
            )))
        }
    };
    Ok(Some(op))
}

// ── Map ───────────────────────────────────────────────────────────────────

fn compose_attrs_map(out: &mut Delta, a: &Delta, b: &Delta, mode: Mode) -> Result<(), DeltaError> {
    for (key, op) in a.attrs() {
        out.put_attr(key.clone(), op.clone());
    }
    for (key, op) in b.attrs() {
        let prev = a.attr(key);
        let next = match (prev, op) {
            (Some(MapOp::Insert { value: Item::Delta(embed), prev_value, attribution }), MapOp::Modify { delta }) => {
                MapOp::Insert {
                    value: Item::Delta(compose_in(embed, delta, mode)?),
                    prev_value: prev_value.clone(),
                    attribution: attribution.clone(),
                }
            }
            (Some(MapOp::Modify { delta: earlier }), MapOp::Modify { delta }) => MapOp::Modify {
                delta: compose_in(earlier, delta, Mode::Loose)?,
            },
            (Some(_), MapOp::Modify { .. }) => {
                return Err(DeltaError::mismatch(format!(
                    "modify of `{key}` over a value that is not a delta"
                )))
            }
            (None, MapOp::Modify { .. }) if mode == Mode::Strict => {
                return Err(DeltaError::mismatch(format!("modify of missing key `{key}`")))
            }
            (Some(earlier), MapOp::Insert { value, attribution, .. }) => MapOp::Insert {
                value: value.clone(),
                prev_value: earlier.prev_value().cloned(),
                attribution: attribution.clone(),
            },
            (Some(earlier), MapOp::Delete { attribution, .. }) => MapOp::Delete {
                prev_value: earlier.prev_value().cloned(),
                attribution: attribution.clone(),
            },
            (None, op) => op.clone(),
        };
        out.put_attr(key.clone(), next);
    }
    if mode == Mode::Strict {
        let attrs = out.attrs_mut();
        attrs.retain(|_, op| !matches!(op, MapOp::Delete { .. }));
        for op in attrs.values_mut() {
            if let MapOp::Insert { prev_value, .. } = op {
                *prev_value = None;
            }
        }
    }
    Ok(())
}
