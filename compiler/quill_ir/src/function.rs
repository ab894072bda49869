//! Generated functions and their arena.
//!
//! Parent/top back-references are stored as arena indices rather than owning
//! pointers, so the lexical nesting of blocks never forms a reference cycle.
//! Placeholder substitution reads through the arena at confirmation time,
//! when the full chain is known.

use crate::name::{FunctionRef, InvalidIdent};
use crate::statement::LinePos;
use std::fmt;
use std::ops::Index;

/// Index of a function in the [`FunctionArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    #[inline]
    pub fn new(index: u32) -> Self {
        FunctionId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Automatic registration intent for a generated function.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum HookIntent {
    /// Not registered anywhere.
    #[default]
    None,
    /// Included in the project-wide startup list.
    OnLoad,
    /// Included in the per-step invocation list.
    OnTick,
}

/// A function being assembled by the compiler.
///
/// Created when a named or anonymous block opens; command lines accumulate
/// while the block is interpreted; confirmed exactly once when the block
/// closes. Until confirmation, command lines may contain the placeholders
/// `$block`, `$top` and `$parent`.
#[derive(Clone, Debug)]
pub struct GeneratedFunction {
    pub namespace: String,
    /// Slash-joined path segments, excluding the namespace.
    pub path: String,
    /// Lexically enclosing function, absent at top level.
    pub parent: Option<FunctionId>,
    /// Function that `$top` resolves to. Defaults to self when absent.
    pub top: Option<FunctionId>,
    pub commands: Vec<String>,
    pub hook: HookIntent,
    /// Line of the statement that opened this block. Diagnostics raised at
    /// confirmation (an unresolved `$parent`, an invalid name) point here.
    pub opened_at: LinePos,
}

impl GeneratedFunction {
    /// The fully-qualified reference for this function.
    pub fn make_ref(&self) -> Result<FunctionRef, InvalidIdent> {
        FunctionRef::new(&self.namespace, self.path.split('/'))
    }
}

/// Flat storage for every function created during a run.
///
/// Functions are never removed; `FunctionId`s stay valid for the lifetime of
/// the arena. Reset between runs, not between files, so cross-file
/// back-references remain resolvable.
#[derive(Default, Debug)]
pub struct FunctionArena {
    funcs: Vec<GeneratedFunction>,
}

impl FunctionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a function, returning its id.
    #[inline]
    pub fn alloc(&mut self, func: GeneratedFunction) -> FunctionId {
        let id = FunctionId::new(self.funcs.len() as u32);
        self.funcs.push(func);
        id
    }

    /// Get a function by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, id: FunctionId) -> &GeneratedFunction {
        &self.funcs[id.index()]
    }

    /// Get a function mutably by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, id: FunctionId) -> &mut GeneratedFunction {
        &mut self.funcs[id.index()]
    }

    /// Resolve the reference `$top` stands for: the function's `top`, or
    /// itself when none was supplied.
    pub fn top_of(&self, id: FunctionId) -> FunctionId {
        self.get(id).top.unwrap_or(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Drop all functions, keeping capacity. Called at the start of a run.
    pub fn reset(&mut self) {
        self.funcs.clear();
    }
}

impl Index<FunctionId> for FunctionArena {
    type Output = GeneratedFunction;

    #[inline]
    fn index(&self, id: FunctionId) -> &GeneratedFunction {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn func(ns: &str, path: &str) -> GeneratedFunction {
        GeneratedFunction {
            namespace: ns.to_string(),
            path: path.to_string(),
            parent: None,
            top: None,
            commands: Vec::new(),
            hook: HookIntent::None,
            opened_at: LinePos::Line(1),
        }
    }

    #[test]
    fn alloc_assigns_sequential_ids() {
        let mut arena = FunctionArena::new();
        let a = arena.alloc(func("ns", "a"));
        let b = arena.alloc(func("ns", "b"));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn top_defaults_to_self() {
        let mut arena = FunctionArena::new();
        let root = arena.alloc(func("ns", "root"));
        assert_eq!(arena.top_of(root), root);

        let mut child = func("ns", "root/child");
        child.parent = Some(root);
        child.top = Some(root);
        let child = arena.alloc(child);
        assert_eq!(arena.top_of(child), root);
    }

    #[test]
    fn reset_clears_functions() {
        let mut arena = FunctionArena::new();
        arena.alloc(func("ns", "a"));
        arena.reset();
        assert!(arena.is_empty());
    }
}
