//! CLI command implementations.

mod compile;

pub use compile::{compile_file, CompileOptions};
