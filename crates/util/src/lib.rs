//! delta-engine-util - Utility functions for delta-engine
//!
//! Small helpers shared by the engine and its randomized test suites.

pub mod fuzzer;
pub mod json_equal;

// Re-exports for convenience
pub use fuzzer::Fuzzer;
pub use json_equal::{deep_equal, map_equal, opt_map_equal};
