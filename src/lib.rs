//! Hierarchical task tracking on SQLite.
//!
//! Tasks form a tree; completeness rolls up from leaves by sibling weight.

pub mod engine;
