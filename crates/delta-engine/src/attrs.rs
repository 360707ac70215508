//! Formatting attributes and change attribution.
//!
//! `Attributes` is a flat key→value map of formatting. Inside a retain a
//! `null` value removes the key from the retained content; inside an insert
//! `null` values carry no meaning and are dropped.
//!
//! `Attribution` records who changed what. It never takes part in content
//! equality but is carried through compose and rebase.

use std::collections::BTreeMap;

use delta_engine_util::json_equal::{deep_equal, opt_map_equal};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Attributes = Map<String, Value>;

/// Provenance of a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_at: Option<u64>,
    /// Actors per formatting key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_at: Option<u64>,
}

impl Attribution {
    pub fn inserted_by(actor: impl Into<String>) -> Self {
        Self {
            insert: Some(vec![actor.into()]),
            ..Self::default()
        }
    }

    pub fn deleted_by(actor: impl Into<String>) -> Self {
        Self {
            delete: Some(vec![actor.into()]),
            ..Self::default()
        }
    }

    pub fn formatted_by(key: impl Into<String>, actor: impl Into<String>) -> Self {
        let mut format = BTreeMap::new();
        format.insert(key.into(), vec![actor.into()]);
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        if self.insert.is_some() {
            self.insert_at = Some(timestamp);
        }
        if self.delete.is_some() {
            self.delete_at = Some(timestamp);
        }
        if self.format.is_some() {
            self.format_at = Some(timestamp);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.insert.is_none()
            && self.insert_at.is_none()
            && self.delete.is_none()
            && self.delete_at.is_none()
            && self.format.is_none()
            && self.format_at.is_none()
    }

    /// Field-wise merge where fields set on `over` win. Format actors are
    /// merged per key.
    pub fn merge(&self, over: &Attribution) -> Attribution {
        let format = match (&self.format, &over.format) {
            (Some(base), Some(top)) => {
                let mut merged = base.clone();
                merged.extend(top.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(merged)
            }
            (base, top) => top.clone().or_else(|| base.clone()),
        };
        Attribution {
            insert: over.insert.clone().or_else(|| self.insert.clone()),
            insert_at: over.insert_at.or(self.insert_at),
            delete: over.delete.clone().or_else(|| self.delete.clone()),
            delete_at: over.delete_at.or(self.delete_at),
            format,
            format_at: over.format_at.or(self.format_at),
        }
    }
}

// ── Attribution helpers ───────────────────────────────────────────────────

/// Merge two optional attributions, `over` winning. Empty results are `None`.
pub fn merge_attribution(
    base: Option<&Attribution>,
    over: Option<&Attribution>,
) -> Option<Attribution> {
    let merged = match (base, over) {
        (None, None) => return None,
        (Some(a), None) | (None, Some(a)) => a.clone(),
        (Some(base), Some(over)) => base.merge(over),
    };
    (!merged.is_empty()).then_some(merged)
}

pub(crate) fn normalize_attribution(attribution: Option<Attribution>) -> Option<Attribution> {
    attribution.filter(|a| !a.is_empty())
}

/// Rebase the provenance `mine` over a concurrent `theirs` recorded on the
/// same units. Without priority, fields and format keys that `theirs` also
/// sets are dropped, so both orders settle on the winner's values.
pub fn transform_attribution(
    mine: Option<&Attribution>,
    theirs: Option<&Attribution>,
    priority: bool,
) -> Option<Attribution> {
    let mine = mine?;
    let theirs = match theirs {
        Some(theirs) if !priority => theirs,
        _ => return Some(mine.clone()),
    };
    fn unless<T: Clone>(field: &Option<T>, other_set: bool) -> Option<T> {
        if other_set {
            None
        } else {
            field.clone()
        }
    }
    let format = mine.format.as_ref().and_then(|format| {
        let kept: BTreeMap<String, Vec<String>> = format
            .iter()
            .filter(|(key, _)| theirs.format.as_ref().map_or(true, |f| !f.contains_key(*key)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        (!kept.is_empty()).then_some(kept)
    });
    normalize_attribution(Some(Attribution {
        insert: unless(&mine.insert, theirs.insert.is_some()),
        insert_at: unless(&mine.insert_at, theirs.insert_at.is_some()),
        delete: unless(&mine.delete, theirs.delete.is_some()),
        delete_at: unless(&mine.delete_at, theirs.delete_at.is_some()),
        format,
        format_at: unless(&mine.format_at, theirs.format_at.is_some()),
    }))
}

// ── Attribute helpers ─────────────────────────────────────────────────────

/// `None` for empty maps, so `Some({})` and `None` never coexist.
pub(crate) fn normalize(attrs: Option<Attributes>) -> Option<Attributes> {
    attrs.filter(|m| !m.is_empty())
}

pub(crate) fn strip_nulls(attrs: Option<Attributes>) -> Option<Attributes> {
    normalize(attrs.map(|m| m.into_iter().filter(|(_, v)| !v.is_null()).collect()))
}

pub(crate) fn attrs_equal(a: Option<&Attributes>, b: Option<&Attributes>) -> bool {
    opt_map_equal(a, b)
}

/// Key union of `base` and `over`, keys in `over` winning. Nulls are kept.
pub fn merge_attrs(base: Option<&Attributes>, over: Option<&Attributes>) -> Option<Attributes> {
    let merged = match (base, over) {
        (None, None) => return None,
        (Some(m), None) | (None, Some(m)) => m.clone(),
        (Some(base), Some(over)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                merged.insert(key.clone(), value.clone());
            }
            merged
        }
    };
    normalize(Some(merged))
}

/// Attributes resulting from formatting `a` with the overlay `b`.
///
/// With `keep_null` the nulls of `b` survive (the result is still a change);
/// without it they remove keys (the result describes content).
pub fn compose_attrs(
    a: Option<&Attributes>,
    b: Option<&Attributes>,
    keep_null: bool,
) -> Option<Attributes> {
    let merged = merge_attrs(a, b);
    if keep_null {
        merged
    } else {
        strip_nulls(merged)
    }
}

/// Rebase the formatting `attrs` over a concurrent `other` formatting of the
/// same units. Without priority, keys that `other` also sets are dropped.
pub fn transform_attrs(
    attrs: Option<&Attributes>,
    other: Option<&Attributes>,
    priority: bool,
) -> Option<Attributes> {
    let attrs = attrs?;
    match other {
        Some(other) if !priority => normalize(Some(
            attrs
                .iter()
                .filter(|(key, _)| !other.contains_key(*key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )),
        _ => Some(attrs.clone()),
    }
}

/// The formatting overlay that turns `from` into `to`.
pub fn diff_attrs(from: Option<&Attributes>, to: Option<&Attributes>) -> Option<Attributes> {
    let empty = Attributes::new();
    let from = from.unwrap_or(&empty);
    let to = to.unwrap_or(&empty);
    let mut out = Attributes::new();
    for (key, value) in to {
        if !from.get(key).is_some_and(|old| deep_equal(old, value)) {
            out.insert(key.clone(), value.clone());
        }
    }
    for key in from.keys() {
        if !to.contains_key(key) {
            out.insert(key.clone(), Value::Null);
        }
    }
    normalize(Some(out))
}

/// The overlay that undoes formatting `attrs` applied to content carrying `base`.
pub fn invert_attrs(attrs: Option<&Attributes>, base: Option<&Attributes>) -> Option<Attributes> {
    let attrs = attrs?;
    let empty = Attributes::new();
    let base = base.unwrap_or(&empty);
    let mut out = Attributes::new();
    for (key, value) in attrs {
        match base.get(key) {
            Some(old) if !deep_equal(old, value) => {
                out.insert(key.clone(), old.clone());
            }
            None if !value.is_null() => {
                out.insert(key.clone(), Value::Null);
            }
            _ => {}
        }
    }
    normalize(Some(out))
}
