//! The Quill statement interpreter.
//!
//! Turns tokenized source into generated command files. The grammar is a
//! set of dispatch tables ([`Grammar`]) interpreting a consuming cursor
//! over the statement buffer; scope entry/exit assembles functions in an
//! arena; confirmation renders them into the virtual output sink.
//!
//! The entry point is [`Compiler`], which persists the resource allocator,
//! the sink, and the hook aggregates across files of one run.

mod alloc;
mod compiler;
mod config;
mod cursor;
pub mod extend;
mod grammar;
mod interp;
mod macros;
mod progress;
mod rules;
mod scope;
mod sink;

pub use alloc::SlotAllocator;
pub use compiler::{Compiler, OutputFile, ProjectState};
pub use config::CompilerConfig;
pub use cursor::StatementCursor;
pub use grammar::{build_base, BODY, NAMESPACE, TAG_BODY};
pub use interp::Interp;
pub use progress::{CompileHooks, NullHooks, Progress};
pub use rules::{Grammar, Rule, RuleSet};
pub use sink::{MultiFileAggregate, OutputSink};

pub use quill_diagnostic::{CompilerError, Error, Result, UserError};
