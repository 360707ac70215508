//! Random states and changes for the law tests.
#![allow(dead_code)]

use delta_engine::{Attributes, Attribution, Delta, DeltaBuilder, Item, MapOp, SeqOp};
use delta_engine_util::Fuzzer;
use serde_json::json;

pub const ALPHABET: &str = "abcxyz ";
pub const KEYS: [&str; 3] = ["title", "level", "doc"];
const NODES: [&str; 2] = ["p", "h1"];
const ACTORS: [&str; 2] = ["alice", "bob"];
const FORMAT_KEYS: [&str; 3] = ["bold", "italic", "color"];

pub fn attrs(v: serde_json::Value) -> Option<Attributes> {
    v.as_object().cloned()
}

pub fn text(s: &str) -> Delta {
    DeltaBuilder::new().insert(s).unwrap().done()
}

fn formatting(f: &mut Fuzzer) -> Option<Attributes> {
    match f.int(0, 4) {
        0 => attrs(json!({"bold": true})),
        1 => attrs(json!({"italic": true})),
        2 => attrs(json!({"bold": true, "color": "red"})),
        _ => None,
    }
}

/// Who inserted the units or wrote the key, half of the time.
fn authorship(f: &mut Fuzzer) -> Option<Attribution> {
    if f.chance(0.5) {
        let actor = *f.pick(&ACTORS);
        Some(Attribution::inserted_by(actor).at(f.int(0, 9) as u64))
    } else {
        None
    }
}

/// Who reformatted the retained units, some of the time.
fn reformatted_by(f: &mut Fuzzer) -> Option<Attribution> {
    if f.chance(0.4) {
        let key = *f.pick(&FORMAT_KEYS);
        let actor = *f.pick(&ACTORS);
        Some(Attribution::formatted_by(key, actor).at(f.int(0, 9) as u64))
    } else {
        None
    }
}

/// A formatting overlay for a retain, possibly removing keys.
fn reformatting(f: &mut Fuzzer) -> Option<Attributes> {
    match f.int(0, 4) {
        0 => attrs(json!({"bold": true})),
        1 => attrs(json!({"bold": null})),
        2 => attrs(json!({"italic": true, "color": null})),
        3 => attrs(json!({"color": "blue"})),
        _ => None,
    }
}

fn random_text(f: &mut Fuzzer) -> String {
    let len = f.int(1, 4);
    f.string(len, ALPHABET)
}

fn random_node(f: &mut Fuzzer, depth: usize) -> Delta {
    let name = *f.pick(&NODES);
    let mut b = DeltaBuilder::node(name);
    fill(f, &mut b, depth);
    b.done()
}

fn random_item(f: &mut Fuzzer, depth: usize) -> Item {
    if depth > 0 && f.chance(0.5) {
        Item::Delta(random_node(f, depth - 1))
    } else {
        Item::Value(json!(f.int(0, 3)))
    }
}

fn random_insert(f: &mut Fuzzer, b: &mut DeltaBuilder, depth: usize) {
    let format = formatting(f);
    let attribution = authorship(f);
    if f.chance(0.25) {
        let item = random_item(f, depth);
        b.insert_with(item, format, attribution).unwrap();
    } else {
        let text = random_text(f);
        b.insert_with(text, format, attribution).unwrap();
    }
}

fn fill(f: &mut Fuzzer, b: &mut DeltaBuilder, depth: usize) {
    for _ in 0..f.int(0, 4) {
        random_insert(f, b, depth);
    }
    for key in KEYS {
        match f.int(0, 3) {
            0 => {
                let value = json!(f.int(0, 2));
                let attribution = authorship(f);
                b.set_with(key, value, attribution).unwrap();
            }
            1 if depth > 0 && key == "doc" => {
                let node = random_node(f, depth - 1);
                b.set(key, node).unwrap();
            }
            _ => {}
        }
    }
}

/// A random state, nesting embeds up to `depth` levels.
pub fn random_state(f: &mut Fuzzer, depth: usize) -> Delta {
    let mut b = DeltaBuilder::new();
    fill(f, &mut b, depth);
    b.done()
}

/// The embedded delta at each unit of `state`, `None` for chars and values.
fn embeds(state: &Delta) -> Vec<Option<&Delta>> {
    let mut out = Vec::new();
    for op in state.children() {
        if let SeqOp::Insert { content, .. } = op {
            match content.as_items() {
                Some(items) => out.extend(items.iter().map(Item::as_delta)),
                None => out.extend(std::iter::repeat(None).take(content.len())),
            }
        }
    }
    out
}

/// A random change applicable to `state`.
pub fn random_change(f: &mut Fuzzer, state: &Delta, depth: usize) -> Delta {
    let mut b = match state.name() {
        Some(name) => DeltaBuilder::node(name),
        None => DeltaBuilder::new(),
    };
    let units = embeds(state);
    let mut pos = 0;
    while pos < units.len() {
        let left = units.len() - pos;
        match f.int(0, 9) {
            0 | 1 => random_insert(f, &mut b, depth),
            2 | 3 => {
                let n = f.int(1, left.min(3));
                b.delete(n);
                pos += n;
            }
            4 => match units[pos] {
                Some(embed) => {
                    let nested = random_change(f, embed, depth);
                    b.modify(nested);
                    pos += 1;
                }
                None => {
                    let n = f.int(1, left.min(3));
                    b.retain(n);
                    pos += n;
                }
            },
            5 | 6 => {
                let n = f.int(1, left.min(3));
                let format = reformatting(f);
                let attribution = reformatted_by(f);
                b.retain_with(n, format, attribution);
                pos += n;
            }
            _ => {
                let n = f.int(1, left.min(4));
                b.retain(n);
                pos += n;
            }
        }
    }
    if f.chance(0.3) {
        random_insert(f, &mut b, depth);
    }
    for key in KEYS {
        match f.int(0, 5) {
            0 => {
                let value = json!(f.int(0, 2));
                let attribution = authorship(f);
                b.set_with(key, value, attribution).unwrap();
            }
            1 if state.attr(key).is_some() => {
                b.unset(key);
            }
            2 => match state.attr(key) {
                Some(MapOp::Insert {
                    value: Item::Delta(embed),
                    ..
                }) => {
                    let nested = random_change(f, embed, depth);
                    b.update(key, nested);
                }
                _ => {}
            },
            _ => {}
        }
    }
    b.done()
}

/// No adjacent mergeable ops, no insert right after a delete, no bare
/// trailing retain.
pub fn assert_canonical(delta: &Delta) {
    for pair in delta.children().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(!(a.is_delete() && b.is_insert()), "insert after delete in {delta:?}");
        let mergeable = match (a, b) {
            (SeqOp::Delete { .. }, SeqOp::Delete { .. }) => true,
            (SeqOp::Retain { .. }, SeqOp::Retain { .. }) => {
                a.attributes() == b.attributes() && a.attribution() == b.attribution()
            }
            (
                SeqOp::Insert { content: x, .. },
                SeqOp::Insert { content: y, .. },
            ) => {
                x.as_text().is_some() == y.as_text().is_some()
                    && a.attributes() == b.attributes()
                    && a.attribution() == b.attribution()
            }
            _ => false,
        };
        assert!(!mergeable, "mergeable neighbours in {delta:?}");
    }
    assert!(
        !matches!(
            delta.children().last(),
            Some(SeqOp::Retain {
                attributes: None,
                attribution: None,
                ..
            })
        ),
        "bare trailing retain in {delta:?}"
    );
}
