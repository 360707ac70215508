//! Rebase a delta over a concurrent one.
//!
//! Both operands describe edits of the same parent state. The result is the
//! version of `this` that applies after `other`. `priority` decides ties:
//! concurrent inserts at one position put `this` first, concurrent writes to
//! one key keep `this`, and concurrent formatting of one unit keeps the
//! formatting of `this`.
//!
//! For any `x`, `y` over the same parent `p`:
//!
//! ```text
//! apply(p, compose(x, rebase(y, x, false))) == apply(p, compose(y, rebase(x, y, true)))
//! ```

use crate::attrs::{transform_attribution, transform_attrs};
use crate::cursor::OpCursor;
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{MapOp, SeqOp};

pub fn rebase(this: &Delta, other: &Delta, priority: bool) -> Result<Delta, DeltaError> {
    if let (Some(x), Some(y)) = (this.name(), other.name()) {
        if x != y {
            return Err(DeltaError::mismatch(format!(
                "cannot rebase <{x}> over <{y}>"
            )));
        }
    }
    let mut out = Delta::named(this.name().map(str::to_string));
    rebase_children(&mut out, this, other, priority)?;
    rebase_attrs_map(&mut out, this, other, priority)?;
    Ok(out.done())
}

// ── Sequence ──────────────────────────────────────────────────────────────

fn rebase_children(
    out: &mut Delta,
    this: &Delta,
    other: &Delta,
    priority: bool,
) -> Result<(), DeltaError> {
    let mut sc = OpCursor::new(this.children());
    let mut oc = OpCursor::new(other.children());
    while sc.has_next() {
        if sc.peek_is_insert() && (priority || !oc.peek_is_insert()) {
            if let Some(op) = sc.next(usize::MAX) {
                out.push(op);
            }
            continue;
        }
        if oc.peek_is_insert() {
            let len = oc.peek_len();
            oc.next(len);
            out.push(SeqOp::retain(len));
            continue;
        }
        if !oc.has_next() {
            for op in sc.rest() {
                out.push(op);
            }
            break;
        }
        let len = sc.peek_len().min(oc.peek_len());
        let (Some(mine), Some(theirs)) = (sc.next(len), oc.next(len)) else {
            break;
        };
        if let Some(op) = rebase_op(mine, theirs, priority)? {
            out.push(op);
        }
    }
    Ok(())
}

/// Rebase one op over a concurrent op addressing the same units.
fn rebase_op(mine: SeqOp, theirs: SeqOp, priority: bool) -> Result<Option<SeqOp>, DeltaError> {
    let op = match (mine, theirs) {
        // The units are gone.
        (_, SeqOp::Delete { .. }) => return Ok(None),
        (SeqOp::Delete { len }, SeqOp::Retain { .. } | SeqOp::Modify { .. }) => {
            SeqOp::Delete { len }
        }
        (
            SeqOp::Retain {
                len,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                attributes: theirs,
                attribution: theirs_attribution,
                ..
            }
            | SeqOp::Modify {
                attributes: theirs,
                attribution: theirs_attribution,
                ..
            },
        ) => SeqOp::Retain {
            len,
            attributes: transform_attrs(attributes.as_ref(), theirs.as_ref(), priority),
            attribution: transform_attribution(
                attribution.as_ref(),
                theirs_attribution.as_ref(),
                priority,
            ),
        },
        (
            SeqOp::Modify {
                delta,
                attributes,
                attribution,
            },
            SeqOp::Retain {
                attributes: theirs,
                attribution: theirs_attribution,
                ..
            },
        ) => SeqOp::Modify {
            delta,
            attributes: transform_attrs(attributes.as_ref(), theirs.as_ref(), priority),
            attribution: transform_attribution(
                attribution.as_ref(),
                theirs_attribution.as_ref(),
                priority,
            ),
        },
        (
            SeqOp::Modify {
                delta,
                attributes,
                attribution,
            },
            SeqOp::Modify {
                delta: concurrent,
                attributes: theirs,
                attribution: theirs_attribution,
            },
        ) => SeqOp::Modify {
            delta: rebase(&delta, &concurrent, priority)?,
            attributes: transform_attrs(attributes.as_ref(), theirs.as_ref(), priority),
            attribution: transform_attribution(
                attribution.as_ref(),
                theirs_attribution.as_ref(),
                priority,
            ),
        },
        (mine, theirs) => {
            return Err(DeltaError::unhandled(format!(
                "rebase {} over {}",
                mine.kind(),
                theirs.kind()
            )))
        }
    };
    Ok(Some(op))
}

// ── Map ───────────────────────────────────────────────────────────────────

fn rebase_attrs_map(
    out: &mut Delta,
    this: &Delta,
    other: &Delta,
    priority: bool,
) -> Result<(), DeltaError> {
    for (key, mine) in this.attrs() {
        let Some(theirs) = other.attr(key) else {
            out.put_attr(key.clone(), mine.clone());
            continue;
        };
        let kept = match (mine, theirs) {
            (
                MapOp::Insert {
                    value, attribution, ..
                },
                MapOp::Insert { value: current, .. },
            ) => priority.then(|| MapOp::Insert {
                value: value.clone(),
                prev_value: Some(current.clone()),
                attribution: attribution.clone(),
            }),
            (
                MapOp::Insert {
                    value, attribution, ..
                },
                MapOp::Delete { .. } | MapOp::Modify { .. },
            ) => Some(MapOp::Insert {
                value: value.clone(),
                prev_value: None,
                attribution: attribution.clone(),
            }),
            (MapOp::Delete { .. }, MapOp::Insert { .. } | MapOp::Delete { .. }) => None,
            (MapOp::Delete { attribution, .. }, MapOp::Modify { .. }) => Some(MapOp::Delete {
                prev_value: None,
                attribution: attribution.clone(),
            }),
            (MapOp::Modify { delta }, MapOp::Modify { delta: concurrent }) => {
                Some(MapOp::Modify {
                    delta: rebase(delta, concurrent, priority)?,
                })
            }
            (MapOp::Modify { .. }, _) => None,
        };
        if let Some(op) = kept {
            out.put_attr(key.clone(), op);
        }
    }
    Ok(())
}
