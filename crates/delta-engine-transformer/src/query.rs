//! Projection of a nested delta.
//!
//! [`Query`] exposes the delta stored under a key path of the A side's map
//! attributes as the whole B side. Edits inside the path travel forward as
//! they are; a replacement of the value at (or above) the path becomes the
//! diff between the old and new projection. B edits travel back wrapped in
//! map modifies along the path.
//!
//! The projection is unnamed on the B side, whatever node name the value on
//! the A side carries.

use delta_engine::{apply, diff, Delta, DeltaBuilder, Item, MapOp};

use crate::{TransformError, TransformResult, Transformer};

#[derive(Debug, Clone)]
pub struct Query {
    path: Vec<String>,
    view: Delta,
    /// Whether the A side holds a delta at `path`.
    present: bool,
}

/// Where an A edit touches the path.
enum Located {
    Untouched,
    /// An edit of the delta at the path.
    Change(Delta),
    /// The value at the path was replaced by this state, or removed.
    Replace(Option<Delta>),
}

impl Query {
    /// Project `path` of an A side that starts out empty.
    pub fn new<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            view: Delta::new(),
            present: false,
        }
    }

    /// Project `path` of the A side state `doc`.
    pub fn over<S: Into<String>>(path: impl IntoIterator<Item = S>, doc: &Delta) -> Self {
        let mut query = Self::new(path);
        if let Some(found) = find(doc, &query.path) {
            query.view = found.renamed(None);
            query.present = true;
        }
        query
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The current B side state.
    pub fn view(&self) -> &Delta {
        &self.view
    }
}

impl Transformer for Query {
    fn apply_a(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        match locate(&delta, &self.path) {
            Located::Untouched => Ok(TransformResult::none()),
            Located::Change(change) => {
                let change = change.renamed(None);
                self.view = apply(&self.view, &change)?;
                self.present = true;
                Ok(TransformResult::to_b(change))
            }
            Located::Replace(next) => {
                self.present = next.is_some();
                let next = next.map_or_else(Delta::new, |d| d.renamed(None));
                let change = diff(&self.view, &next)?;
                self.view = next;
                Ok(TransformResult::to_b(change))
            }
        }
    }

    fn apply_b(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        self.view = apply(&self.view, &delta)?;
        let Some((last, parents)) = self.path.split_last() else {
            return Ok(TransformResult::to_a(delta));
        };
        let leaf = if self.present {
            DeltaBuilder::new().update(last.as_str(), delta).done()
        } else {
            self.present = true;
            DeltaBuilder::new()
                .set(last.as_str(), self.view.clone())?
                .done()
        };
        let wrapped = parents
            .iter()
            .rev()
            .fold(leaf, |inner, key| DeltaBuilder::new().update(key.as_str(), inner).done());
        Ok(TransformResult::to_a(wrapped))
    }
}

fn locate(delta: &Delta, path: &[String]) -> Located {
    let Some((key, rest)) = path.split_first() else {
        return Located::Change(delta.clone());
    };
    match delta.attr(key) {
        None => Located::Untouched,
        Some(MapOp::Modify { delta }) => locate(delta, rest),
        Some(MapOp::Insert {
            value: Item::Delta(state),
            ..
        }) => Located::Replace(find(state, rest)),
        Some(_) => Located::Replace(None),
    }
}

/// The delta stored at `path` inside the state `state`.
fn find(state: &Delta, path: &[String]) -> Option<Delta> {
    let Some((key, rest)) = path.split_first() else {
        return Some(state.clone());
    };
    match state.attr(key) {
        Some(MapOp::Insert {
            value: Item::Delta(inner),
            ..
        }) => find(inner, rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> Delta {
        DeltaBuilder::new().insert(s).unwrap().done()
    }

    fn para(s: &str) -> Delta {
        DeltaBuilder::node("p").insert(s).unwrap().done()
    }

    #[test]
    fn forwards_nested_edits() {
        let doc = DeltaBuilder::new()
            .set("body", para("hi"))
            .unwrap()
            .set("title", json!("t"))
            .unwrap()
            .done();
        let mut q = Query::over(["body"], &doc);
        assert_eq!(q.view(), &text("hi"));

        let edit = DeltaBuilder::new()
            .update("body", DeltaBuilder::node("p").retain(2).insert("!").unwrap().done())
            .done();
        let out = q.apply_a(edit).unwrap();
        assert_eq!(out.b, Some(DeltaBuilder::new().retain(2).insert("!").unwrap().done()));
        assert_eq!(q.view(), &text("hi!"));
    }

    #[test]
    fn ignores_other_keys() {
        let mut q = Query::new(["body"]);
        let edit = DeltaBuilder::new().set("title", json!("t")).unwrap().done();
        assert_eq!(q.apply_a(edit).unwrap(), TransformResult::none());
    }

    #[test]
    fn replacement_becomes_diff() {
        let doc = DeltaBuilder::new().set("body", para("abc")).unwrap().done();
        let mut q = Query::over(["body"], &doc);
        let edit = DeltaBuilder::new().set("body", para("abd")).unwrap().done();
        let out = q.apply_a(edit).unwrap();
        assert_eq!(
            out.b,
            Some(DeltaBuilder::new().retain(2).insert("d").unwrap().delete(1).done())
        );

        let removal = DeltaBuilder::new().unset("body").done();
        let out = q.apply_a(removal).unwrap();
        assert_eq!(out.b, Some(DeltaBuilder::new().delete(3).done()));
        assert!(q.view().is_empty());
    }

    #[test]
    fn wraps_b_edits_along_the_path() {
        let inner = DeltaBuilder::new().set("body", para("hi")).unwrap().done();
        let doc = DeltaBuilder::new().set("page", inner).unwrap().done();
        let mut q = Query::over(["page", "body"], &doc);

        let edit = DeltaBuilder::new().delete(1).done();
        let out = q.apply_b(edit.clone()).unwrap();
        let expected = DeltaBuilder::new()
            .update("page", DeltaBuilder::new().update("body", edit).done())
            .done();
        assert_eq!(out, TransformResult::to_a(expected.clone()));
        assert_eq!(q.view(), &text("i"));

        let next = apply(&doc, &expected).unwrap();
        assert_eq!(find(&next, q.path()).map(|d| d.renamed(None)), Some(text("i")));
    }

    #[test]
    fn first_b_edit_creates_the_value() {
        let mut q = Query::new(["body"]);
        let out = q.apply_b(text("new")).unwrap();
        assert_eq!(
            out,
            TransformResult::to_a(DeltaBuilder::new().set("body", text("new")).unwrap().done())
        );
        let out = q.apply_b(DeltaBuilder::new().retain(3).insert("!").unwrap().done()).unwrap();
        assert!(matches!(
            out.a.as_ref().and_then(|d| d.attr("body")),
            Some(MapOp::Modify { .. })
        ));
    }
}
