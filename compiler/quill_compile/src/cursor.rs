//! Cursor over the pending-statement buffer.
//!
//! The interpreter is a consuming recursive-descent process: statements are
//! removed from the front of a shared sequence as they are interpreted.
//! The buffer is shared (`Rc<[Statement]>`), so [`StatementCursor::fork`]
//! is a cheap shallow copy whose advancement leaves the real cursor
//! untouched — the unrolled-loop construct depends on that distinction
//! being explicit.

use quill_ir::{LinePos, Statement};
use std::rc::Rc;

/// Consuming cursor over a statement buffer.
#[derive(Clone, Debug)]
pub struct StatementCursor {
    stmts: Rc<[Statement]>,
    pos: usize,
}

impl StatementCursor {
    pub fn new(stmts: Vec<Statement>) -> Self {
        StatementCursor {
            stmts: stmts.into(),
            pos: 0,
        }
    }

    /// Consume and return the next statement.
    pub fn next(&mut self) -> Option<Statement> {
        let stmt = self.stmts.get(self.pos).cloned()?;
        self.pos += 1;
        Some(stmt)
    }

    /// Look at the next statement without consuming it.
    pub fn peek(&self) -> Option<&Statement> {
        self.stmts.get(self.pos)
    }

    /// Shallow copy sharing the same buffer. Advancing the fork does not
    /// move this cursor.
    pub fn fork(&self) -> StatementCursor {
        StatementCursor {
            stmts: Rc::clone(&self.stmts),
            pos: self.pos,
        }
    }

    /// Number of statements consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of statements in the buffer.
    #[inline]
    pub fn total(&self) -> usize {
        self.stmts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.stmts.len()
    }

    /// Position of the most recently consumed statement, for diagnostics
    /// raised when input runs out mid-construct.
    pub fn last_pos(&self) -> LinePos {
        if self.pos == 0 {
            LinePos::Line(1)
        } else {
            self.stmts
                .get(self.pos - 1)
                .map_or(LinePos::Eof, |s| s.pos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cursor(texts: &[&str]) -> StatementCursor {
        StatementCursor::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Statement::new(i as u32 + 1, *t))
                .collect(),
        )
    }

    #[test]
    fn consumes_in_order() {
        let mut c = cursor(&["a", "b"]);
        assert_eq!(c.next().map(|s| s.text), Some("a".to_string()));
        assert_eq!(c.next().map(|s| s.text), Some("b".to_string()));
        assert_eq!(c.next(), None);
    }

    #[test]
    fn fork_does_not_advance_the_real_cursor() {
        let mut real = cursor(&["a", "b", "c"]);
        let mut fork = real.fork();
        assert_eq!(fork.next().map(|s| s.text), Some("a".to_string()));
        assert_eq!(fork.next().map(|s| s.text), Some("b".to_string()));
        // Real cursor still at the start.
        assert_eq!(real.position(), 0);
        assert_eq!(real.next().map(|s| s.text), Some("a".to_string()));
    }

    #[test]
    fn counts_support_progress_reporting() {
        let mut c = cursor(&["a", "b", "c"]);
        assert_eq!(c.total(), 3);
        c.next();
        assert_eq!(c.position(), 1);
        assert!(!c.is_empty());
    }
}
