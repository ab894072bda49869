//! Evaluation errors and their factory constructors.
//!
//! An [`EvalError`] carries only a message; the interpreter wraps it into a
//! `CompilerError` together with the line of the statement being evaluated,
//! which is not known at this layer.

use std::fmt;

/// Expression evaluation failure.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

pub(crate) fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(format!("undefined variable `{name}`"))
}

pub(crate) fn unknown_function(name: &str) -> EvalError {
    EvalError::new(format!("unknown function `{name}`"))
}

pub(crate) fn wrong_arg_count(name: &str, expected: &str, got: usize) -> EvalError {
    EvalError::new(format!(
        "`{name}` expects {expected} argument(s), got {got}"
    ))
}

pub(crate) fn binary_type_mismatch(op: &str, lhs: &crate::Value, rhs: &crate::Value) -> EvalError {
    EvalError::new(format!(
        "cannot apply `{op}` to {} and {}",
        lhs.type_name(),
        rhs.type_name()
    ))
}

pub(crate) fn division_by_zero() -> EvalError {
    EvalError::new("division by zero")
}

pub(crate) fn bad_index(len: usize, index: i64) -> EvalError {
    EvalError::new(format!("index {index} out of bounds (len {len})"))
}

pub(crate) fn not_indexable(value: &crate::Value) -> EvalError {
    EvalError::new(format!("cannot index into {}", value.type_name()))
}

pub(crate) fn unexpected_token(what: &str) -> EvalError {
    EvalError::new(format!("unexpected `{what}` in expression"))
}

pub(crate) fn unexpected_end() -> EvalError {
    EvalError::new("expression ended unexpectedly")
}

pub(crate) fn bad_character(slice: &str) -> EvalError {
    EvalError::new(format!("unrecognized `{slice}` in expression"))
}
