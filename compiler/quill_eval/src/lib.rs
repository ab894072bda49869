//! Compile-time evaluation for the Quill compiler.
//!
//! Macro directives (`!IF`, `LOOP`, invocation arguments) and `<% expr %>`
//! string interpolation all evaluate against one [`MacroEnv`] per
//! compilation run. The expression language is a narrow, explicitly-scoped
//! interpreter — arithmetic, comparison, list/string primitives, variable
//! lookup, a fixed builtin table — rather than a general host-language
//! evaluator, so its capabilities stay auditable and its failure modes
//! uniform.

mod env;
mod errors;
mod interpolate;
mod parser;
mod value;

pub use env::MacroEnv;
pub use errors::{EvalError, EvalResult};
pub use interpolate::interpolate;
pub use parser::eval;
pub use value::Value;
