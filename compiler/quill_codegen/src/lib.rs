//! Code generation utilities shared by the compiler and its exporters.
//!
//! - [`tree`] — the balanced dispatch-tree generator: a linear sequence of
//!   per-frame items becomes a minimal-depth tree of range-guarded calls,
//!   so reaching any single index costs tree-depth comparisons instead of
//!   a linear scan.
//! - [`layout`] — datapack-style output paths and the JSON hook registries.

pub mod layout;
pub mod tree;

pub use layout::{function_file_path, render_tag_json, tag_file_path, TagKind};
pub use tree::{build_tree, emit_tree, DispatchNode, EmitContext, TreeFunction, FANOUT};
