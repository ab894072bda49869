//! Error types for the Quill compiler.
//!
//! Two user-facing kinds:
//!
//! - [`CompilerError`] — malformed input: an unexpected statement,
//!   unbalanced braces, an invalid identifier, a failed expression. Always
//!   carries a [`LinePos`], which is `EOF` when the input ended early.
//! - [`UserError`] — raised deliberately by an `error "<message>"`
//!   statement. An author-intended diagnostic, not a defect in the source.
//!
//! Either aborts the compilation of the file being processed; files already
//! confirmed by earlier, successful compilations in the same run remain in
//! the sink.

use quill_ir::LinePos;
use std::fmt;
use thiserror::Error;

/// Malformed-input error.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CompilerError {
    pub message: String,
    pub pos: LinePos,
}

impl CompilerError {
    /// Create an error at a known statement position.
    pub fn new(message: impl Into<String>, pos: LinePos) -> Self {
        CompilerError {
            message: message.into(),
            pos,
        }
    }

    /// Create an error raised after the input ran out.
    pub fn eof(message: impl Into<String>) -> Self {
        Self::new(message, LinePos::Eof)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.pos)
    }
}

impl std::error::Error for CompilerError {}

/// Author-raised error from an `error "<message>"` statement.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UserError {
    pub message: String,
    pub pos: LinePos,
}

impl UserError {
    pub fn new(message: impl Into<String>, pos: LinePos) -> Self {
        UserError {
            message: message.into(),
            pos,
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.pos)
    }
}

impl std::error::Error for UserError {}

/// Any error a compilation can end with.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum Error {
    #[error("compile error: {0}")]
    Compiler(#[from] CompilerError),
    #[error("error: {0}")]
    User(#[from] UserError),
}

impl Error {
    /// The source position the error points at.
    pub fn pos(&self) -> LinePos {
        match self {
            Error::Compiler(e) => e.pos,
            Error::User(e) => e.pos,
        }
    }
}

/// Convenience alias used throughout the interpreter.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiler_error_cites_line() {
        let e = CompilerError::new("unexpected statement `}`", LinePos::Line(12));
        assert_eq!(e.to_string(), "unexpected statement `}` (line 12)");
    }

    #[test]
    fn eof_error_cites_eof() {
        let e = CompilerError::eof("unclosed block");
        assert_eq!(e.to_string(), "unclosed block (line EOF)");
    }

    #[test]
    fn error_enum_preserves_position() {
        let e: Error = UserError::new("bad rig", LinePos::Line(3)).into();
        assert_eq!(e.pos(), LinePos::Line(3));
        assert_eq!(e.to_string(), "error: bad rig (line 3)");
    }
}
