//! Line tokenizer.
//!
//! Turns raw source text into the statement sequence the interpreter
//! consumes. Operates strictly per line; a line yields zero, one, or a few
//! statements:
//!
//! - `###` toggles block-comment mode and is itself discarded; while the
//!   mode is on, every line is discarded.
//! - Blank lines and `#`-prefixed lines are discarded. A leading `\#`
//!   escape drops only the backslash, so the marker survives as content.
//! - A leading `}` is split off as its own statement; a trailing `{` is
//!   split off after any text preceding it. `dir x {` therefore yields
//!   `dir x` then `{`, and `} else {` yields `}`, `else`, `{`.
//!
//! Every statement carries its 1-based source line for diagnostics.

use quill_ir::Statement;

/// Tokenize full source text into statements.
pub fn tokenize(source: &str) -> Vec<Statement> {
    let mut out = Vec::new();
    let mut in_block_comment = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let mut line = raw.trim();

        if line.starts_with("###") {
            in_block_comment = !in_block_comment;
            continue;
        }
        if in_block_comment || line.is_empty() {
            continue;
        }
        if let Some(escaped) = line.strip_prefix("\\#") {
            // Escaped comment marker: only the backslash is stripped.
            emit(&mut out, line_no, &format!("#{}", escaped.trim_end()));
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('}') {
            out.push(Statement::new(line_no, "}"));
            line = rest.trim();
            if line.is_empty() {
                continue;
            }
        }
        emit(&mut out, line_no, line);
    }
    out
}

/// Emit a statement, splitting off a trailing `{`.
fn emit(out: &mut Vec<Statement>, line_no: u32, text: &str) {
    if let Some(before) = text.strip_suffix('{') {
        let before = before.trim();
        if !before.is_empty() {
            out.push(Statement::new(line_no, before));
        }
        out.push(Statement::new(line_no, "{"));
    } else {
        out.push(Statement::new(line_no, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(src: &str) -> Vec<String> {
        tokenize(src).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn splits_block_headers() {
        assert_eq!(texts("dir a {\n}\n"), ["dir a", "{", "}"]);
    }

    #[test]
    fn close_then_reopen_on_one_line() {
        assert_eq!(texts("} else {"), ["}", "else", "{"]);
    }

    #[test]
    fn bare_braces() {
        assert_eq!(texts("{\n}"), ["{", "}"]);
    }

    #[test]
    fn discards_comments_and_blanks() {
        let src = "# heading\n\nsay hi\n   \n# tail";
        assert_eq!(texts(src), ["say hi"]);
    }

    #[test]
    fn block_comments_toggle() {
        let src = "###\nanything { at all }\n###\nsay hi";
        assert_eq!(texts(src), ["say hi"]);
    }

    #[test]
    fn escaped_comment_marker_survives() {
        assert_eq!(texts("\\# literal hash line"), ["# literal hash line"]);
    }

    #[test]
    fn statements_carry_line_numbers() {
        let stmts = tokenize("say one\n\nsay two");
        let lines: Vec<_> = stmts.iter().filter_map(|s| s.pos.line()).collect();
        assert_eq!(lines, [1, 3]);
    }

    #[test]
    fn indented_lines_are_trimmed() {
        assert_eq!(texts("    say hi\n\t}"), ["say hi", "}"]);
    }
}
