//! Core data model for the Quill compiler.
//!
//! Everything downstream crates agree on lives here: source statements with
//! their originating line, resource names and `namespace:path` references,
//! and the arena of generated functions with parent/top back-references
//! stored as indices.

mod function;
mod name;
mod statement;

pub use function::{FunctionArena, FunctionId, GeneratedFunction, HookIntent};
pub use name::{ident_ok, FunctionRef, InvalidIdent};
pub use statement::{LinePos, Statement};
