//! The compiler entry point.
//!
//! A [`Compiler`] lives for one run. The grammar, the function arena, the
//! macro environment, the slot allocator, the output sink, and the hook
//! aggregates all persist across the run's files; per-file state is reset
//! at the start of each file's compilation (`release`/`reset` semantics),
//! which is what makes incremental recompilation of one file among many
//! possible.

use crate::alloc::SlotAllocator;
use crate::config::CompilerConfig;
use crate::cursor::StatementCursor;
use crate::interp::Interp;
use crate::progress::{CompileHooks, NullHooks};
use crate::rules::Grammar;
use crate::sink::{MultiFileAggregate, OutputSink};
use quill_codegen::{render_tag_json, tag_file_path, TagKind};
use quill_diagnostic::{CompilerError, Result};
use quill_eval::MacroEnv;
use quill_ir::{ident_ok, FunctionArena, HookIntent, LinePos};
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub path: String,
    pub contents: String,
}

/// Project-wide mutable state shared by every file of a run.
#[derive(Default)]
pub struct ProjectState {
    pub arena: FunctionArena,
    pub env: MacroEnv,
    pub slots: SlotAllocator,
    pub sink: OutputSink,
    pub load_hooks: MultiFileAggregate,
    pub tick_hooks: MultiFileAggregate,
    /// Per-reason counters behind anonymous block names. Reset at run
    /// start, never between files, so generated paths stay unique across
    /// the run.
    pub anon_counters: FxHashMap<String, u32>,
}

pub struct Compiler {
    grammar: Grammar,
    config: CompilerConfig,
    state: ProjectState,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let mut grammar = crate::grammar::build_base();
        crate::extend::register(&mut grammar);
        Compiler {
            grammar,
            config,
            state: ProjectState::default(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The grammar, for exporters that register auxiliary rules before
    /// the first compilation.
    pub fn grammar_mut(&mut self) -> &mut Grammar {
        &mut self.grammar
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    /// Compile one source file. See [`Compiler::compile_with_hooks`].
    pub fn compile(
        &mut self,
        namespace: &str,
        source: &str,
        file: &str,
    ) -> Result<Vec<OutputFile>> {
        let mut hooks = NullHooks;
        self.compile_with_hooks(namespace, source, file, &mut hooks)
    }

    /// Compile one source file, reporting progress and failures to
    /// `hooks`.
    ///
    /// On success the confirmed output is committed to the sink and the
    /// full file list (including hook registries) is returned. On failure
    /// nothing from this file is committed; files confirmed by earlier,
    /// successful compilations of the run remain.
    pub fn compile_with_hooks(
        &mut self,
        namespace: &str,
        source: &str,
        file: &str,
        hooks: &mut dyn CompileHooks,
    ) -> Result<Vec<OutputFile>> {
        let span = tracing::debug_span!("compile", file);
        let _guard = span.enter();

        // Per-file reset: slots and hook registrations belong to the file
        // being (re)compiled; everything else persists.
        self.state.slots.release(file);
        self.state.load_hooks.reset(file);
        self.state.tick_hooks.reset(file);

        let stack = match self.namespace_stack(namespace) {
            Ok(stack) => stack,
            Err(err) => {
                hooks.on_error(&err);
                return Err(err);
            }
        };

        let statements = quill_lexer::tokenize(source);
        tracing::debug!(statements = statements.len(), "tokenized");
        if self.config.dev {
            hooks.on_log(&format!("{file}: {} statement(s)", statements.len()));
        }
        let cursor = StatementCursor::new(statements);
        let mut interp = Interp::new(
            &self.config,
            &mut self.state,
            cursor,
            file.to_string(),
            stack,
            hooks,
        );
        match interp.drive(&self.grammar) {
            Ok(()) => {
                let staged_files = std::mem::take(&mut interp.staged_files);
                let staged_hooks = std::mem::take(&mut interp.staged_hooks);
                drop(interp);
                for (path, contents) in staged_files {
                    self.state.sink.confirm_once(path, contents);
                }
                for (hook, value) in staged_hooks {
                    match hook {
                        HookIntent::OnLoad => self.state.load_hooks.push(file, value),
                        HookIntent::OnTick => self.state.tick_hooks.push(file, value),
                        HookIntent::None => {}
                    }
                }
                tracing::debug!(files = self.state.sink.len(), "confirmed");
                Ok(self.outputs())
            }
            Err(err) => {
                interp.hooks.on_error(&err);
                Err(err)
            }
        }
    }

    /// The namespace stack for a compilation: root and default namespaces
    /// from the configuration, then the caller-supplied namespace.
    fn namespace_stack(&self, namespace: &str) -> Result<SmallVec<[String; 4]>> {
        let mut stack: SmallVec<[String; 4]> = SmallVec::new();
        if let Some(ns) = &self.config.root_namespace {
            stack.push(ns.clone());
        }
        if let Some(ns) = &self.config.default_namespace {
            stack.push(ns.clone());
        }
        stack.push(namespace.to_string());
        for segment in &stack {
            if !ident_ok(segment) {
                return Err(CompilerError::new(
                    format!("invalid identifier `{segment}`"),
                    LinePos::Line(1),
                )
                .into());
            }
        }
        Ok(stack)
    }

    /// Everything generated so far this run: the sink in insertion order,
    /// then the hook registries summarizing all contributions still
    /// registered.
    pub fn outputs(&self) -> Vec<OutputFile> {
        let mut out: Vec<OutputFile> = self
            .state
            .sink
            .iter()
            .map(|(path, contents)| OutputFile {
                path: path.to_string(),
                contents: contents.to_string(),
            })
            .collect();
        for (kind, aggregate) in [
            (TagKind::Load, &self.state.load_hooks),
            (TagKind::Tick, &self.state.tick_hooks),
        ] {
            if !aggregate.is_empty() {
                out.push(OutputFile {
                    path: tag_file_path(kind),
                    contents: render_tag_json(&aggregate.values()),
                });
            }
        }
        out
    }

    /// Start a fresh run: drop every file, function, binding, counter and
    /// allocation.
    pub fn reset(&mut self) {
        self.state.arena.reset();
        self.state.env.reset();
        self.state.slots = SlotAllocator::new();
        self.state.sink.reset();
        self.state.load_hooks.clear();
        self.state.tick_hooks.clear();
        self.state.anon_counters.clear();
    }
}
