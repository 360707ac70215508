//! End-to-end walkthroughs of the public API.

mod common;

use common::{attrs, text};
use delta_engine::{
    apply, compose, diff, from_json, invert, rebase, to_json, DeltaBuilder, Item, MapOp, SeqOp,
};
use serde_json::json;

#[test]
fn builder_keeps_differently_formatted_runs_apart() {
    let delta = DeltaBuilder::new()
        .insert("hello")
        .unwrap()
        .insert_with(" ", attrs(json!({"bold": true})), None)
        .unwrap()
        .insert("world")
        .unwrap()
        .done();
    assert_eq!(
        to_json(&delta),
        json!({"children": [
            {"insert": "hello"},
            {"insert": " ", "attributes": {"bold": true}},
            {"insert": "world"}
        ]})
    );
}

#[test]
fn compose_deletes_tail_and_appends() {
    let change = DeltaBuilder::new()
        .retain(5)
        .delete(6)
        .insert("!")
        .unwrap()
        .done();
    let out = compose(&text("hello world"), &change).unwrap();
    assert_eq!(out, text("hello!"));
    assert_eq!(apply(&text("hello world"), &change).unwrap(), out);
}

#[test]
fn concurrent_edits_rebase_and_converge() {
    let base = text("hello world");
    let x = DeltaBuilder::new().retain(5).delete(6).done();
    let y = DeltaBuilder::new().retain(11).insert("!").unwrap().done();

    let y_over_x = rebase(&y, &x, false).unwrap();
    assert_eq!(
        y_over_x,
        DeltaBuilder::new().retain(5).insert("!").unwrap().done()
    );
    let x_over_y = rebase(&x, &y, true).unwrap();

    let left = apply(&apply(&base, &x).unwrap(), &y_over_x).unwrap();
    let right = apply(&apply(&base, &y).unwrap(), &x_over_y).unwrap();
    assert_eq!(left.text(), "hello!");
    assert_eq!(left, right);
}

#[test]
fn diff_finds_trailing_delete() {
    let change = diff(&text("hello world!"), &text("hello world")).unwrap();
    assert_eq!(change, DeltaBuilder::new().retain(11).delete(1).done());
}

#[test]
fn set_then_unset_collapses_to_one_delete() {
    let set = DeltaBuilder::new().set("a", json!(1)).unwrap().done();
    let unset = DeltaBuilder::new().unset("a").done();

    // The key never existed before the set.
    let fresh = compose(&set, &unset).unwrap();
    assert_eq!(fresh.attrs().len(), 1);
    assert_eq!(fresh.attr("a").and_then(MapOp::prev_value), None);
    assert!(matches!(fresh.attr("a"), Some(MapOp::Delete { .. })));

    // The set replaced an existing value, which the delete remembers.
    let parent = DeltaBuilder::new().set("a", json!(0)).unwrap().done();
    let target = DeltaBuilder::new().set("a", json!(1)).unwrap().done();
    let set_over_parent = diff(&parent, &target).unwrap();
    let known = compose(&set_over_parent, &unset).unwrap();
    assert_eq!(
        known.attr("a").and_then(MapOp::prev_value),
        Some(&Item::from(json!(0)))
    );
}

#[test]
fn document_round_trip_through_json_and_undo() {
    let heading = DeltaBuilder::node("h1").insert("Title").unwrap().done();
    let doc = DeltaBuilder::new()
        .insert(heading)
        .unwrap()
        .insert("body")
        .unwrap()
        .set("lang", json!("en"))
        .unwrap()
        .done();

    let edit = DeltaBuilder::new()
        .modify(
            DeltaBuilder::node("h1")
                .retain_with(5, attrs(json!({"bold": true})), None)
                .done(),
        )
        .delete(4)
        .insert("text")
        .unwrap()
        .set("lang", json!("de"))
        .unwrap()
        .done();

    let wire = to_json(&edit);
    let edit = from_json(&wire).unwrap();
    let next = apply(&doc, &edit).unwrap();
    assert_eq!(next.len(), 5);
    assert!(matches!(next.children()[0], SeqOp::Insert { .. }));

    let undo = invert(&edit, &doc).unwrap();
    assert_eq!(apply(&next, &undo).unwrap(), doc);
    assert_eq!(diff(&doc, &next).and_then(|d| apply(&doc, &d)).unwrap(), next);
}
