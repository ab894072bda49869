//! Virtual output collection.
//!
//! Nothing touches the real filesystem during compilation. Confirmed
//! functions land in an [`OutputSink`] (insertion-ordered, deduplicated by
//! path); load/tick hook registrations land in [`MultiFileAggregate`]s so
//! one source file can be recompiled without clobbering the registrations
//! contributed by others.

use rustc_hash::FxHashMap;

/// Insertion-ordered set of generated files, keyed by path.
///
/// A path is emitted at most once per run, regardless of how many times
/// confirmation is requested for it — identity is the path, not the
/// contents.
#[derive(Default, Debug)]
pub struct OutputSink {
    files: Vec<(String, String)>,
    by_path: FxHashMap<String, usize>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file unless its path was already confirmed. Returns
    /// whether the file was actually added.
    pub fn confirm_once(&mut self, path: impl Into<String>, contents: impl Into<String>) -> bool {
        let path = path.into();
        if self.by_path.contains_key(&path) {
            return false;
        }
        self.by_path.insert(path.clone(), self.files.len());
        self.files.push((path, contents.into()));
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop everything. Called between runs.
    pub fn reset(&mut self) {
        self.files.clear();
        self.by_path.clear();
    }
}

/// Ordered per-source-file contribution lists.
///
/// Backing store for the load/tick hook registries: each file appends its
/// contributions in order, `values()` flattens file-then-insertion order,
/// and `reset(file)` clears exactly one file's contributions so it can be
/// recompiled incrementally.
#[derive(Default, Debug)]
pub struct MultiFileAggregate {
    /// File order is first-contribution order, kept stable across resets.
    order: Vec<String>,
    by_file: FxHashMap<String, Vec<String>>,
}

impl MultiFileAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution for `file`.
    pub fn push(&mut self, file: &str, value: impl Into<String>) {
        if !self.by_file.contains_key(file) {
            self.order.push(file.to_string());
        }
        self.by_file
            .entry(file.to_string())
            .or_default()
            .push(value.into());
    }

    /// Clear one file's contributions, leaving every other file's intact.
    pub fn reset(&mut self, file: &str) {
        if let Some(values) = self.by_file.get_mut(file) {
            values.clear();
        }
    }

    /// All contributions, flattened file-then-insertion order.
    pub fn values(&self) -> Vec<String> {
        let mut out = Vec::new();
        for file in &self.order {
            if let Some(values) = self.by_file.get(file) {
                out.extend(values.iter().cloned());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.values().all(Vec::is_empty)
    }

    /// Drop everything. Called between runs.
    pub fn clear(&mut self) {
        self.order.clear();
        self.by_file.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sink_emits_each_path_once() {
        let mut sink = OutputSink::new();
        assert!(sink.confirm_once("data/a.mcfunction", "one"));
        assert!(!sink.confirm_once("data/a.mcfunction", "two"));
        let files: Vec<_> = sink.iter().collect();
        assert_eq!(files, [("data/a.mcfunction", "one")]);
    }

    #[test]
    fn sink_preserves_insertion_order() {
        let mut sink = OutputSink::new();
        sink.confirm_once("b", "2");
        sink.confirm_once("a", "1");
        let paths: Vec<_> = sink.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["b", "a"]);
    }

    #[test]
    fn aggregate_flattens_in_file_then_insertion_order() {
        let mut agg = MultiFileAggregate::new();
        agg.push("one.quill", "ns:a");
        agg.push("two.quill", "ns:x");
        agg.push("one.quill", "ns:b");
        assert_eq!(agg.values(), ["ns:a", "ns:b", "ns:x"]);
    }

    #[test]
    fn reset_touches_only_one_file() {
        let mut agg = MultiFileAggregate::new();
        agg.push("one.quill", "ns:a");
        agg.push("two.quill", "ns:x");
        agg.reset("one.quill");
        assert_eq!(agg.values(), ["ns:x"]);
        // Recompilation contributes fresh values in the original file slot.
        agg.push("one.quill", "ns:a2");
        assert_eq!(agg.values(), ["ns:a2", "ns:x"]);
    }
}
