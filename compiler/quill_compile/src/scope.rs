//! Scope entry/exit and function confirmation.
//!
//! Opening a block allocates a [`GeneratedFunction`] in the arena with
//! parent/top recorded as indices; closing it confirms the function
//! exactly once: placeholders are substituted through the arena (this is
//! when the full parent chain is known), the file is rendered, and hook
//! intent is staged for the aggregates.

use crate::interp::Interp;
use quill_codegen::function_file_path;
use quill_diagnostic::{CompilerError, Result};
use quill_eval::interpolate;
use quill_ir::{ident_ok, FunctionId, FunctionRef, GeneratedFunction, HookIntent, LinePos};

impl Interp<'_> {
    /// The function currently being assembled.
    pub fn current_fn(&self, pos: LinePos) -> Result<FunctionId> {
        self.current.ok_or_else(|| {
            CompilerError::new("statement is only valid inside a function block", pos).into()
        })
    }

    /// Interpolate a command template and append it to the current
    /// function.
    pub fn push_command(&mut self, template: &str, pos: LinePos) -> Result<()> {
        let id = self.current_fn(pos)?;
        let rendered = interpolate(template, &self.state.env)
            .map_err(|e| CompilerError::new(e.message, pos))?;
        self.state.arena.get_mut(id).commands.push(rendered);
        Ok(())
    }

    /// Append an already-rendered command to the current function.
    pub fn push_raw_command(&mut self, command: String, pos: LinePos) -> Result<()> {
        let id = self.current_fn(pos)?;
        self.state.arena.get_mut(id).commands.push(command);
        Ok(())
    }

    /// Validate a scope or function name against the identifier charset.
    pub fn check_ident(&self, name: &str, pos: LinePos) -> Result<()> {
        if ident_ok(name) {
            Ok(())
        } else {
            Err(CompilerError::new(format!("invalid identifier `{name}`"), pos).into())
        }
    }

    /// Open a named function block and make it current.
    pub fn open_named(&mut self, name: &str, hook: HookIntent, pos: LinePos) -> Result<FunctionId> {
        self.check_ident(name, pos)?;
        Ok(self.open_with_path(self.qualified_path(name), hook, pos))
    }

    /// Open an anonymous block under the generated directory. The name is
    /// `<generated_dir>/<reason>/<n>` with a per-reason counter that
    /// resets at run start.
    pub fn open_anonymous(&mut self, reason: &str, pos: LinePos) -> FunctionId {
        let counter = self
            .state
            .anon_counters
            .entry(reason.to_string())
            .or_insert(0);
        let n = *counter;
        *counter += 1;
        let name = format!("{}/{reason}/{n}", self.config.generated_directory);
        self.open_with_path(self.qualified_path(&name), HookIntent::None, pos)
    }

    /// Open a block that has already consumed its `{`: if the first body
    /// statement is `name <literal>`, the block becomes a named function;
    /// otherwise it is anonymous under `reason`.
    pub fn open_block(&mut self, reason: &str, pos: LinePos) -> Result<FunctionId> {
        let named = match self.cursor.peek() {
            Some(stmt) => stmt
                .text
                .strip_prefix("name ")
                .map(|rest| (rest.trim().to_string(), stmt.pos)),
            None => None,
        };
        match named {
            Some((name, name_pos)) => {
                self.cursor.next();
                self.open_named(&name, HookIntent::None, name_pos)
            }
            None => Ok(self.open_anonymous(reason, pos)),
        }
    }

    /// Path of a new function: the joined namespace stack excluding the
    /// root element, plus the function's own name.
    fn qualified_path(&self, name: &str) -> String {
        let prefix = self.namespace_stack[1..].join("/");
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }

    fn open_with_path(&mut self, path: String, hook: HookIntent, pos: LinePos) -> FunctionId {
        let parent = self.current;
        let top = parent.map(|p| self.state.arena.top_of(p));
        let id = self.state.arena.alloc(GeneratedFunction {
            namespace: self.namespace_stack[0].clone(),
            path,
            parent,
            top,
            commands: Vec::new(),
            hook,
            opened_at: pos,
        });
        self.current = Some(id);
        id
    }

    /// Confirm a function: substitute placeholders, render the file, stage
    /// it for the sink, and pop back to the parent block.
    pub fn confirm(&mut self, id: FunctionId) -> Result<FunctionRef> {
        let opened_at = self.state.arena.get(id).opened_at;
        let self_ref = self.ref_of(id, opened_at)?;
        let parent = self.state.arena.get(id).parent;
        let parent_ref = match parent {
            Some(p) => Some(self.ref_of(p, opened_at)?),
            None => None,
        };
        let top_ref = self.ref_of(self.state.arena.top_of(id), opened_at)?;

        let func = self.state.arena.get(id);
        let mut lines: Vec<String> = Vec::with_capacity(func.commands.len() + 1);
        if let Some(header) = &self.config.header {
            lines.extend(header.lines().map(str::to_string));
        }
        for command in &func.commands {
            let mut command = command.clone();
            if command.contains("$parent") {
                let Some(parent_ref) = &parent_ref else {
                    return Err(CompilerError::new(
                        "`$parent` used in a block with no parent",
                        opened_at,
                    )
                    .into());
                };
                command = command.replace("$parent", &parent_ref.to_string());
            }
            command = command.replace("$block", &self_ref.to_string());
            command = command.replace("$top", &top_ref.to_string());
            lines.push(command);
        }
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        let hook = func.hook;
        self.staged_files
            .push((function_file_path(&self_ref), contents));
        if hook != HookIntent::None {
            self.staged_hooks.push((hook, self_ref.to_string()));
        }
        self.current = parent;
        Ok(self_ref)
    }

    /// Fully-qualified reference for an arena function.
    pub fn ref_of(&self, id: FunctionId, pos: LinePos) -> Result<FunctionRef> {
        self.state
            .arena
            .get(id)
            .make_ref()
            .map_err(|e| CompilerError::new(e.to_string(), pos).into())
    }
}
