//! delta-engine: describe, compose and reconcile edits to structured content.
//!
//! A [`Delta`] is either a *state* (inserts only) or a *change* (retains,
//! deletes, inserts and modifies addressing a prior state), plus keyed map
//! operations and an optional node name. Deltas nest: an item may itself be a
//! delta, addressed by `Modify`.
//!
//! - [`DeltaBuilder`] constructs canonical deltas
//! - [`compose`] / [`apply`] sequence two deltas
//! - [`rebase`] reconciles concurrent deltas
//! - [`diff`] derives a change from two states
//! - [`invert`] derives the undo of a change
//! - [`Replica`] runs the two-party sync protocol on top of these

// Leaves
pub mod error;
pub mod attrs;
pub mod ops;
pub mod schema;

// Container and construction
pub mod delta;
pub mod builder;
mod cursor;

// Algorithms
pub mod compose;
pub mod rebase;
pub mod diff;
pub mod invert;

pub mod codec;
pub mod sync;

pub use attrs::{Attributes, Attribution};
pub use builder::DeltaBuilder;
pub use codec::json::{from_json, to_json};
pub use compose::{apply, compose};
pub use delta::Delta;
pub use diff::diff;
pub use error::DeltaError;
pub use invert::invert;
pub use ops::{Content, Item, MapOp, SeqOp};
pub use rebase::rebase;
pub use schema::{ContentRef, ContentSchema, DeltaSchema, Schema, ValueType};
pub use sync::{Replica, SyncMessage};
