//! State-to-state diff.
//!
//! Both states are flattened into units (one char or one item each, with
//! its formatting). The common prefix and suffix are trimmed by full
//! equality, the middle by content only, so a unit whose content survives
//! but whose formatting changed becomes a formatting retain instead of a
//! delete and insert.

mod myers;

use delta_engine_util::deep_equal;

use crate::attrs::{attrs_equal, diff_attrs, Attributes, Attribution};
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::ops::{Content, Item, MapOp, SeqOp};

use myers::Edit;

#[derive(Debug, Clone, Copy)]
enum Unit<'a> {
    Char(char),
    Item(&'a Item),
}

#[derive(Debug, Clone, Copy)]
struct Cell<'a> {
    unit: Unit<'a>,
    attributes: Option<&'a Attributes>,
    attribution: Option<&'a Attribution>,
}

impl Cell<'_> {
    fn same_content(&self, other: &Cell<'_>) -> bool {
        match (self.unit, other.unit) {
            (Unit::Char(a), Unit::Char(b)) => a == b,
            (Unit::Item(a), Unit::Item(b)) => items_equal(a, b),
            _ => false,
        }
    }

    fn same(&self, other: &Cell<'_>) -> bool {
        self.same_content(other) && attrs_equal(self.attributes, other.attributes)
    }

    fn to_insert(self) -> SeqOp {
        let content = match self.unit {
            Unit::Char(c) => Content::Text(c.to_string()),
            Unit::Item(item) => Content::Items(vec![item.clone()]),
        };
        SeqOp::Insert {
            content,
            attributes: self.attributes.cloned(),
            attribution: self.attribution.cloned(),
        }
    }
}

fn items_equal(a: &Item, b: &Item) -> bool {
    match (a, b) {
        (Item::Value(a), Item::Value(b)) => deep_equal(a, b),
        (Item::Delta(a), Item::Delta(b)) => a == b,
        _ => false,
    }
}

fn cells(state: &Delta) -> Vec<Cell<'_>> {
    let mut out = Vec::with_capacity(state.len());
    for op in state.children() {
        let SeqOp::Insert {
            content,
            attributes,
            attribution,
        } = op
        else {
            continue;
        };
        let cell = |unit| Cell {
            unit,
            attributes: attributes.as_ref(),
            attribution: attribution.as_ref(),
        };
        match content {
            Content::Text(s) => out.extend(s.chars().map(|c| cell(Unit::Char(c)))),
            Content::Items(items) => out.extend(items.iter().map(|i| cell(Unit::Item(i)))),
        }
    }
    out
}

/// The change that turns the state `from` into the state `to`.
pub fn diff(from: &Delta, to: &Delta) -> Result<Delta, DeltaError> {
    if from.name() != to.name() {
        return Err(DeltaError::mismatch(format!(
            "cannot diff <{}> against <{}>",
            from.name().unwrap_or_default(),
            to.name().unwrap_or_default()
        )));
    }
    if !from.is_state() || !to.is_state() {
        return Err(DeltaError::mismatch("diff operands must be states"));
    }
    let mut out = Delta::named(from.name().map(str::to_string));
    diff_children(&mut out, &cells(from), &cells(to));
    diff_attrs_map(&mut out, from, to);
    Ok(out.done())
}

// ── Sequence ──────────────────────────────────────────────────────────────

fn diff_children(out: &mut Delta, src: &[Cell<'_>], dst: &[Cell<'_>]) {
    let prefix = src.iter().zip(dst).take_while(|(a, b)| a.same(b)).count();
    let suffix = src[prefix..]
        .iter()
        .rev()
        .zip(dst[prefix..].iter().rev())
        .take_while(|(a, b)| a.same(b))
        .count();
    out.push(SeqOp::retain(prefix));

    let src_mid = &src[prefix..src.len() - suffix];
    let dst_mid = &dst[prefix..dst.len() - suffix];
    let edits = myers::diff(src_mid, dst_mid, &|a: &Cell<'_>, b: &Cell<'_>| a.same_content(b));

    let (mut i, mut j) = (0, 0);
    let mut k = 0;
    while k < edits.len() {
        if let Edit::Equal(n) = edits[k] {
            for (a, b) in src_mid[i..i + n].iter().zip(&dst_mid[j..j + n]) {
                out.push(SeqOp::Retain {
                    len: 1,
                    attributes: diff_attrs(a.attributes, b.attributes),
                    attribution: None,
                });
            }
            i += n;
            j += n;
            k += 1;
            continue;
        }
        let (mut deleted, mut inserted) = (0, 0);
        while let Some(edit) = edits.get(k) {
            match edit {
                Edit::Delete(n) => deleted += n,
                Edit::Insert(n) => inserted += n,
                Edit::Equal(_) => break,
            }
            k += 1;
        }
        replace(out, &src_mid[i..i + deleted], &dst_mid[j..j + inserted]);
        i += deleted;
        j += inserted;
    }
}

/// Emit a changed region: pairwise modifies when every removed unit is an
/// embed matched by an inserted embed of the same node, else delete and
/// insert.
fn replace(out: &mut Delta, removed: &[Cell<'_>], added: &[Cell<'_>]) {
    if removed.len() == added.len() {
        let nested: Option<Vec<SeqOp>> = removed
            .iter()
            .zip(added)
            .map(|(a, b)| modify_embed(a, b))
            .collect();
        if let Some(ops) = nested {
            for op in ops {
                out.push(op);
            }
            return;
        }
    }
    out.push(SeqOp::delete(removed.len()));
    for cell in added {
        out.push(cell.to_insert());
    }
}

fn modify_embed(a: &Cell<'_>, b: &Cell<'_>) -> Option<SeqOp> {
    let (Unit::Item(Item::Delta(old)), Unit::Item(Item::Delta(new))) = (a.unit, b.unit) else {
        return None;
    };
    if old.name() != new.name() {
        return None;
    }
    let delta = diff(old, new).ok()?;
    Some(SeqOp::Modify {
        delta,
        attributes: diff_attrs(a.attributes, b.attributes),
        attribution: None,
    })
}

// ── Map ───────────────────────────────────────────────────────────────────

fn state_value(op: &MapOp) -> Option<(&Item, Option<&Attribution>)> {
    match op {
        MapOp::Insert {
            value, attribution, ..
        } => Some((value, attribution.as_ref())),
        _ => None,
    }
}

fn diff_attrs_map(out: &mut Delta, from: &Delta, to: &Delta) {
    for (key, op) in to.attrs() {
        let Some((value, attribution)) = state_value(op) else {
            continue;
        };
        let old = from.attr(key).and_then(state_value).map(|(v, _)| v);
        let next = match old {
            None => MapOp::Insert {
                value: value.clone(),
                prev_value: None,
                attribution: attribution.cloned(),
            },
            Some(old) if items_equal(old, value) => continue,
            Some(prev @ Item::Delta(a)) => match value {
                Item::Delta(b) if a.name() == b.name() => match diff(a, b) {
                    Ok(delta) => MapOp::Modify { delta },
                    Err(_) => replaced(prev, value, attribution),
                },
                _ => replaced(prev, value, attribution),
            },
            Some(old) => replaced(old, value, attribution),
        };
        out.put_attr(key.clone(), next);
    }
    for (key, op) in from.attrs() {
        if to.attr(key).is_none() {
            out.put_attr(
                key.clone(),
                MapOp::Delete {
                    prev_value: state_value(op).map(|(v, _)| v.clone()),
                    attribution: None,
                },
            );
        }
    }
}

fn replaced(old: &Item, value: &Item, attribution: Option<&Attribution>) -> MapOp {
    MapOp::Insert {
        value: value.clone(),
        prev_value: Some(old.clone()),
        attribution: attribution.cloned(),
    }
}
