//! Undo.

use crate::attrs::invert_attrs;
use crate::cursor::OpCursor;
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};

/// The change that undoes `change` once it has been applied to the state
/// `base`, so that `apply(apply(base, change), invert(change, base)) == base`.
pub fn invert(change: &Delta, base: &Delta) -> Result<Delta, DeltaError> {
    if !base.is_state() {
        return Err(DeltaError::mismatch("invert base is not a state"));
    }
    let mut out = Delta::named(change.name().map(str::to_string));
    let mut cursor = OpCursor::new(base.children());
    for op in change.children() {
        match op {
            SeqOp::Insert { content, .. } => out.push(SeqOp::delete(content.len())),
            SeqOp::Delete { len } => {
                for removed in take(&mut cursor, *len)? {
                    out.push(removed);
                }
            }
            SeqOp::Retain {
                len, attributes, ..
            } => {
                for kept in take(&mut cursor, *len)? {
                    out.push(SeqOp::Retain {
                        len: kept.span(),
                        attributes: invert_attrs(attributes.as_ref(), kept.attributes()),
                        attribution: None,
                    });
                }
            }
            SeqOp::Modify {
                delta, attributes, ..
            } => {
                let target = take(&mut cursor, 1)?;
                let Some(SeqOp::Insert {
                    content: Content::Items(items),
                    attributes: current,
                    ..
                }) = target.first()
                else {
                    return Err(DeltaError::mismatch("modify addresses text"));
                };
                let Some(Item::Delta(embed)) = items.first() else {
                    return Err(DeltaError::mismatch("modify addresses a plain value"));
                };
                out.push(SeqOp::Modify {
                    delta: invert(delta, embed)?,
                    attributes: invert_attrs(attributes.as_ref(), current.as_ref()),
                    attribution: None,
                });
            }
        }
    }

    for (key, op) in change.attrs() {
        let current = match base.attr(key) {
            Some(MapOp::Insert {
                value, attribution, ..
            }) => Some((value, attribution)),
            _ => None,
        };
        let undo = match (op, current) {
            (MapOp::Modify { delta }, Some((Item::Delta(embed), _))) => MapOp::Modify {
                delta: invert(delta, embed)?,
            },
            (MapOp::Modify { .. }, _) => {
                return Err(DeltaError::mismatch(format!(
                    "modify of `{key}` over a value that is not a delta"
                )))
            }
            // Restoring a value restores who wrote it.
            (op, Some((value, attribution))) => MapOp::Insert {
                value: value.clone(),
                prev_value: written(op),
                attribution: attribution.clone(),
            },
            (op, None) => MapOp::Delete {
                prev_value: written(op),
                attribution: None,
            },
        };
        out.put_attr(key.clone(), undo);
    }
    Ok(out.done())
}

fn written(op: &MapOp) -> Option<Item> {
    match op {
        MapOp::Insert { value, .. } => Some(value.clone()),
        _ => None,
    }
}

/// The base inserts covering the next `len` units.
fn take(cursor: &mut OpCursor<'_>, len: usize) -> Result<Vec<SeqOp>, DeltaError> {
    let mut out = Vec::new();
    let mut remaining = len;
    while remaining > 0 {
        let Some(op) = cursor.next(remaining) else {
            return Err(DeltaError::mismatch("change reaches past the end of its base"));
        };
        remaining -= op.span();
        out.push(op);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::apply;
    use crate::DeltaBuilder;
    use serde_json::json;

    fn round_trip(base: &Delta, change: &Delta) {
        let undo = invert(change, base).unwrap();
        let next = apply(base, change).unwrap();
        assert_eq!(apply(&next, &undo).unwrap(), *base);
    }

    #[test]
    fn undoes_text_edits() {
        let mut base = DeltaBuilder::new();
        base.insert("hello ").unwrap();
        base.insert_with("world", json!({"bold": true}).as_object().cloned(), None).unwrap();
        let base = base.done();
        let mut change = DeltaBuilder::new();
        change.retain(2).delete(6).insert("y").unwrap();
        change.retain_with(3, json!({"bold": null, "italic": true}).as_object().cloned(), None);
        let change = change.done();
        round_trip(&base, &change);

        let undo = invert(&change, &base).unwrap();
        assert!(undo.children().contains(&SeqOp::delete(1)));
    }

    #[test]
    fn undoes_nested_and_map_edits() {
        let para = DeltaBuilder::node("p").insert("ab").unwrap().done();
        let base = DeltaBuilder::new()
            .insert(para)
            .unwrap()
            .set("title", json!("a"))
            .unwrap()
            .set("tags", json!([1]))
            .unwrap()
            .done();
        let change = DeltaBuilder::new()
            .modify(DeltaBuilder::node("p").delete(1).done())
            .set("title", json!("b"))
            .unwrap()
            .unset("tags")
            .set("fresh", json!(0))
            .unwrap()
            .done();
        round_trip(&base, &change);
    }

    #[test]
    fn restored_values_keep_their_attribution() {
        use crate::Attribution;

        let mut base = DeltaBuilder::new();
        base.set_with("title", json!("a"), Some(Attribution::inserted_by("alice").at(1)))
            .unwrap();
        let base = base.done();
        let mut change = DeltaBuilder::new();
        change
            .set_with("title", json!("b"), Some(Attribution::inserted_by("bob").at(2)))
            .unwrap();
        let change = change.done();
        round_trip(&base, &change);
    }

    #[test]
    fn overrun_is_a_mismatch() {
        let base = DeltaBuilder::new().insert("a").unwrap().done();
        let change = DeltaBuilder::new().delete(2).done();
        assert!(matches!(invert(&change, &base), Err(DeltaError::StructuralMismatch(_))));
    }
}
