//! Per-file interpretation state.
//!
//! An [`Interp`] lives for one source file's compilation: it owns the
//! statement cursor and the in-progress namespace stack, borrows the
//! project-wide state (arena, environment, allocator, sink, aggregates)
//! from the [`Compiler`](crate::Compiler), and stages its confirmed output
//! so a failure commits nothing for the in-flight file.

use crate::compiler::ProjectState;
use crate::config::CompilerConfig;
use crate::cursor::StatementCursor;
use crate::progress::{CompileHooks, Progress, ProgressMeter};
use crate::rules::Grammar;
use quill_diagnostic::{CompilerError, Result};
use quill_ir::{FunctionId, HookIntent, Statement};
use smallvec::SmallVec;

pub struct Interp<'a> {
    pub config: &'a CompilerConfig,
    pub state: &'a mut ProjectState,
    pub cursor: StatementCursor,
    /// Identifier of the source file being compiled; keys the allocator,
    /// the aggregates, and progress tokens.
    pub file: String,
    /// Element 0 is the root namespace; the rest are path segments.
    pub namespace_stack: SmallVec<[String; 4]>,
    /// Function currently being assembled, if inside a block.
    pub current: Option<FunctionId>,
    /// Output confirmed by this file, committed only on success.
    pub staged_files: Vec<(String, String)>,
    /// Hook registrations confirmed by this file, committed only on
    /// success.
    pub staged_hooks: Vec<(HookIntent, String)>,
    /// Collector for the body of an auxiliary `tag` block.
    pub tag_values: Vec<String>,
    pub hooks: &'a mut dyn CompileHooks,
    meter: ProgressMeter,
}

impl<'a> Interp<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        state: &'a mut ProjectState,
        cursor: StatementCursor,
        file: String,
        namespace_stack: SmallVec<[String; 4]>,
        hooks: &'a mut dyn CompileHooks,
    ) -> Self {
        Interp {
            config,
            state,
            cursor,
            file,
            namespace_stack,
            current: None,
            staged_files: Vec::new(),
            staged_hooks: Vec::new(),
            tag_values: Vec::new(),
            hooks,
            meter: ProgressMeter::new(),
        }
    }

    /// Drive the top-level production until the input is exhausted.
    pub fn drive(&mut self, grammar: &Grammar) -> Result<()> {
        while let Some(stmt) = self.next_statement() {
            grammar.run(crate::grammar::NAMESPACE, self, stmt)?;
        }
        let total = self.cursor.total();
        self.hooks.on_progress(&Progress {
            total,
            current: total,
            percent: 100.0,
            token: self.file.clone(),
        });
        Ok(())
    }

    /// Consume the next statement, emitting rate-limited progress.
    pub fn next_statement(&mut self) -> Option<Statement> {
        let stmt = self.cursor.next()?;
        if self.meter.ready() {
            let total = self.cursor.total();
            let current = self.cursor.position();
            let percent = if total == 0 {
                100.0
            } else {
                current as f32 / total as f32 * 100.0
            };
            self.hooks.on_progress(&Progress {
                total,
                current,
                percent,
                token: self.file.clone(),
            });
        }
        Some(stmt)
    }

    /// Consume the next statement, failing with `EOF` when input ran out.
    pub fn expect_statement(&mut self, expected: &str) -> Result<Statement> {
        self.next_statement().ok_or_else(|| {
            CompilerError::eof(format!("expected {expected}, found end of input")).into()
        })
    }

    /// Consume the next statement, which must be `{`.
    pub fn expect_open(&mut self) -> Result<Statement> {
        let stmt = self.expect_statement("`{`")?;
        if stmt.is_open() {
            Ok(stmt)
        } else {
            Err(CompilerError::new(format!("expected `{{`, found `{}`", stmt.text), stmt.pos).into())
        }
    }

    /// Interpret statements through `production` until the matching `}`.
    pub fn run_to_close(&mut self, grammar: &Grammar, production: &str) -> Result<()> {
        loop {
            let stmt = self.expect_statement("`}`")?;
            if stmt.is_close() {
                return Ok(());
            }
            grammar.run(production, self, stmt)?;
        }
    }

    /// Skip an already-opened block without parsing it, by counting brace
    /// statements until balance returns to zero. Braces inside the skipped
    /// region's comments or strings are not distinguished from structural
    /// ones.
    pub fn skip_balanced(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            let stmt = self.expect_statement("`}`")?;
            if stmt.is_open() {
                depth += 1;
            } else if stmt.is_close() {
                depth -= 1;
            }
        }
        Ok(())
    }
}
