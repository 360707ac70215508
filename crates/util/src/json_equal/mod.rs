//! JSON equality utilities.
//!
//! Deep equality for attribute values and attribute maps.

mod deep_equal;

pub use deep_equal::{deep_equal, map_equal, opt_map_equal};
