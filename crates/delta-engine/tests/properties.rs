//! Property tests over formatted text.

use delta_engine::{apply, compose, diff, invert, rebase, Attributes, Delta, DeltaBuilder};
use proptest::prelude::*;
use serde_json::{json, Value};

fn format(code: u8) -> Option<Attributes> {
    match code {
        1 => json!({"bold": true}).as_object().cloned(),
        2 => json!({"link": "x"}).as_object().cloned(),
        _ => None,
    }
}

fn text_state_strategy() -> impl Strategy<Value = Delta> {
    prop::collection::vec(("[ab ]{1,4}", 0u8..3), 0..6).prop_map(|runs| {
        let mut b = DeltaBuilder::new();
        for (text, code) in runs {
            b.insert_with(text, format(code), None).unwrap();
        }
        b.done()
    })
}

/// A single splice: keep `at` units, drop `delete`, insert `text`.
#[derive(Debug, Clone)]
struct Splice {
    at: usize,
    delete: usize,
    text: String,
    bold: Option<bool>,
}

fn splice_strategy() -> impl Strategy<Value = Splice> {
    (0usize..32, 0usize..4, "[xy]{0,3}", prop::option::of(any::<bool>())).prop_map(
        |(at, delete, text, bold)| Splice {
            at,
            delete,
            text,
            bold,
        },
    )
}

/// The change `splice` describes, clamped to a state of length `len`.
fn splice_change(splice: &Splice, len: usize) -> Delta {
    let at = splice.at.min(len);
    let delete = splice.delete.min(len - at);
    let mut b = DeltaBuilder::new();
    match splice.bold {
        Some(bold) => {
            let value = if bold { json!(true) } else { Value::Null };
            b.retain_with(at, json!({ "bold": value }).as_object().cloned(), None);
        }
        None => {
            b.retain(at);
        }
    }
    b.delete(delete);
    if !splice.text.is_empty() {
        b.insert(splice.text.as_str()).unwrap();
    }
    b.done()
}

proptest! {
    #[test]
    fn diff_reaches_target(from in text_state_strategy(), to in text_state_strategy()) {
        let change = diff(&from, &to).unwrap();
        prop_assert_eq!(apply(&from, &change).unwrap(), to);
    }

    #[test]
    fn sealing_is_idempotent(state in text_state_strategy()) {
        prop_assert_eq!(state.clone().done(), state.clone());
        prop_assert!(state.is_state());
    }

    #[test]
    fn concurrent_splices_converge(
        parent in text_state_strategy(),
        a in splice_strategy(),
        b in splice_strategy()
    ) {
        let x = splice_change(&a, parent.len());
        let y = splice_change(&b, parent.len());
        let left = apply(&parent, &compose(&x, &rebase(&y, &x, false).unwrap()).unwrap()).unwrap();
        let right = apply(&parent, &compose(&y, &rebase(&x, &y, true).unwrap()).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn splice_undo_restores(parent in text_state_strategy(), a in splice_strategy()) {
        let x = splice_change(&a, parent.len());
        let next = apply(&parent, &x).unwrap();
        let undo = invert(&x, &parent).unwrap();
        prop_assert_eq!(apply(&next, &undo).unwrap(), parent);
    }

    #[test]
    fn serde_round_trip(state in text_state_strategy(), a in splice_strategy()) {
        let x = splice_change(&a, state.len());
        for delta in [state, x] {
            let text = serde_json::to_string(&delta).unwrap();
            let back: Delta = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back, delta);
        }
    }
}
