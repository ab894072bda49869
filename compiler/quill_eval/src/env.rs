//! The macro environment.
//!
//! One flat mapping of named values for the whole run (loop variables,
//! invocation arguments, configuration constants), plus per-source-file
//! persistent storage for exporters that stash state between files.

use crate::Value;
use rustc_hash::FxHashMap;

/// Mutable variable scope for one compilation run.
#[derive(Default, Debug)]
pub struct MacroEnv {
    vars: FxHashMap<String, Value>,
    /// Per-source-file keyed storage. Outlives individual file
    /// compilations within the run.
    file_store: FxHashMap<String, FxHashMap<String, Value>>,
}

impl MacroEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, returning the previous value if any.
    ///
    /// Loop constructs rebind the same name once per iteration; the final
    /// binding deliberately survives the loop.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.vars.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    /// Store a value under a source file's key space.
    pub fn file_set(&mut self, file: &str, key: impl Into<String>, value: Value) {
        self.file_store
            .entry(file.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn file_get(&self, file: &str, key: &str) -> Option<&Value> {
        self.file_store.get(file)?.get(key)
    }

    /// Drop everything. Called between runs, not between files.
    pub fn reset(&mut self) {
        self.vars.clear();
        self.file_store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_returns_previous_binding() {
        let mut env = MacroEnv::new();
        assert_eq!(env.set("i", Value::Int(0)), None);
        assert_eq!(env.set("i", Value::Int(1)), Some(Value::Int(0)));
        assert_eq!(env.get("i"), Some(&Value::Int(1)));
    }

    #[test]
    fn file_storage_is_keyed_per_file() {
        let mut env = MacroEnv::new();
        env.file_set("a.quill", "frame", Value::Int(3));
        env.file_set("b.quill", "frame", Value::Int(9));
        assert_eq!(env.file_get("a.quill", "frame"), Some(&Value::Int(3)));
        assert_eq!(env.file_get("b.quill", "frame"), Some(&Value::Int(9)));
        assert_eq!(env.file_get("c.quill", "frame"), None);
    }
}
