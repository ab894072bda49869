//! Lexing for the Quill compiler.
//!
//! Two layers, used by different consumers:
//!
//! - [`lines::tokenize`] turns the full source text into the line-tagged
//!   statement sequence the interpreter consumes.
//! - [`expr`] is the logos-derived token stream for the expression
//!   sublanguage evaluated by `quill_eval`.

pub mod expr;
pub mod lines;

pub use expr::ExprToken;
pub use lines::tokenize;
