//! The base grammar.
//!
//! One rule set per production. `NAMESPACE` interprets scope-level
//! statements (`dir`, `function`, `load`, `tick`, compile-time `!IF`);
//! `BODY` interprets statements inside a function block (the macro
//! library plus literal commands); `TAG_BODY` collects the values of an
//! auxiliary tag block. Auxiliary emitters extend these sets through
//! [`Grammar::add_rule`] instead of editing this module.

use crate::interp::Interp;
use crate::macros;
use crate::rules::{Grammar, Rule, RuleSet};
use quill_diagnostic::{CompilerError, Result, UserError};
use quill_eval::interpolate;
use quill_ir::{HookIntent, Statement};

/// Scope-level statements: the top level of a file and `dir` bodies.
pub const NAMESPACE: &str = "namespace";
/// Statements inside a function block.
pub const BODY: &str = "body";
/// Values inside an auxiliary tag block.
pub const TAG_BODY: &str = "tag_body";

/// `keyword rest` — the rest after a leading keyword and whitespace.
pub(crate) fn word_rest<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// `keyword(args)` — the parenthesized argument text of a macro call.
pub(crate) fn macro_args<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(keyword)?.trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

/// Split at the last top-level comma: `(left, Some(right))` or
/// `(text, None)` when no comma sits outside parens/brackets.
pub(crate) fn split_last_top_comma(text: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    let mut split = None;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b',' if depth == 0 => split = Some(i),
            _ => {}
        }
    }
    match split {
        Some(i) => (&text[..i], Some(&text[i + 1..])),
        None => (text, None),
    }
}

/// Strip one matching layer of quotes from an `error` message.
fn unquote(text: &str) -> &str {
    let t = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = t.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    t
}

/// Build the base grammar. Extensions register on top of this afterwards.
pub fn build_base() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.install(NAMESPACE, namespace_rules());
    grammar.install(BODY, body_rules());
    grammar.install(TAG_BODY, tag_body_rules());
    grammar
}

fn namespace_rules() -> RuleSet {
    let mut set = RuleSet::new(|_, _, stmt| {
        Err(CompilerError::new(
            format!("unexpected statement `{}` at namespace level", stmt.text),
            stmt.pos,
        )
        .into())
    });

    set.add(dir_rule(), 0);
    set.add(block_decl_rule("function", HookIntent::None), 0);
    set.add(block_decl_rule("load", HookIntent::OnLoad), 0);
    set.add(block_decl_rule("tick", HookIntent::OnTick), 0);
    set.add(compile_time_if_rule(NAMESPACE), 0);
    set.add(error_rule(), 0);
    set
}

fn body_rules() -> RuleSet {
    let mut set = RuleSet::new(default_command_action);

    set.add(
        Rule::new(
            |stmt| macro_args(&stmt.text, "execute").is_some(),
            macros::conditional::execute_chain,
        ),
        0,
    );
    set.add(compile_time_if_rule(BODY), 0);
    set.add(
        Rule::new(
            |stmt| macro_args(&stmt.text, "LOOP").is_some(),
            macros::loops::unrolled_loop,
        ),
        0,
    );
    set.add(
        Rule::new(
            |stmt| macro_args(&stmt.text, "until").is_some(),
            macros::loops::until_loop,
        ),
        0,
    );
    set.add(
        Rule::new(
            |stmt| macro_args(&stmt.text, "while").is_some(),
            |grammar, interp, stmt| macros::loops::while_loop(grammar, interp, stmt, false),
        ),
        0,
    );
    set.add(
        Rule::new(
            |stmt| {
                stmt.text
                    .strip_prefix("async ")
                    .is_some_and(|rest| macro_args(rest.trim(), "while").is_some())
            },
            |grammar, interp, stmt| macros::loops::while_loop(grammar, interp, stmt, true),
        ),
        0,
    );
    set.add(
        Rule::new(
            |stmt| stmt.text == "sequence",
            macros::schedule::sequence_block,
        ),
        0,
    );
    set.add(nested_function_rule(), 0);
    set.add(error_rule(), 0);
    set
}

fn tag_body_rules() -> RuleSet {
    RuleSet::new(|_, interp, stmt| {
        let value = interpolate(&stmt.text, &interp.state.env)
            .map_err(|e| CompilerError::new(e.message, stmt.pos))?;
        interp.tag_values.push(value);
        Ok(())
    })
}

/// `dir <name> { … }` — push a namespace segment, interpret entries, pop.
fn dir_rule() -> Rule {
    Rule::new(
        |stmt| word_rest(&stmt.text, "dir").is_some_and(|rest| !rest.is_empty()),
        |grammar, interp, stmt| {
            let name = word_rest(&stmt.text, "dir").unwrap_or_default().to_string();
            interp.check_ident(&name, stmt.pos)?;
            interp.expect_open()?;
            interp.namespace_stack.push(name);
            interp.run_to_close(grammar, NAMESPACE)?;
            interp.namespace_stack.pop();
            Ok(())
        },
    )
}

/// `function|load|tick <name> { … }` at scope level.
fn block_decl_rule(keyword: &'static str, hook: HookIntent) -> Rule {
    Rule::new(
        move |stmt| word_rest(&stmt.text, keyword).is_some_and(|rest| !rest.is_empty()),
        move |grammar, interp, stmt| {
            let name = word_rest(&stmt.text, keyword)
                .unwrap_or_default()
                .to_string();
            let id = interp.open_named(&name, hook, stmt.pos)?;
            interp.expect_open()?;
            interp.run_to_close(grammar, BODY)?;
            interp.confirm(id)?;
            Ok(())
        },
    )
}

/// `function` inside a body: a nested declaration when a block follows,
/// otherwise a literal invocation command.
fn nested_function_rule() -> Rule {
    Rule::new(
        |stmt| word_rest(&stmt.text, "function").is_some_and(|rest| !rest.is_empty()),
        |grammar, interp, stmt| {
            if interp.cursor.peek().is_some_and(Statement::is_open) {
                let name = word_rest(&stmt.text, "function")
                    .unwrap_or_default()
                    .to_string();
                let id = interp.open_named(&name, HookIntent::None, stmt.pos)?;
                interp.expect_open()?;
                interp.run_to_close(grammar, BODY)?;
                interp.confirm(id)?;
                Ok(())
            } else {
                default_command_action(grammar, interp, stmt)
            }
        },
    )
}

/// `!IF(expr) { … }` / `!expr { … }` — compile-time branch. A false
/// condition skips the body without parsing it.
fn compile_time_if_rule(production: &'static str) -> Rule {
    Rule::new(
        |stmt| stmt.text.starts_with('!'),
        move |grammar, interp, stmt| {
            macros::conditional::compile_time_if(grammar, interp, stmt, production)
        },
    )
}

/// `error "<message>"` — an author-raised diagnostic.
fn error_rule() -> Rule {
    Rule::new(
        |stmt| word_rest(&stmt.text, "error").is_some(),
        |_, _, stmt| {
            let message = unquote(word_rest(&stmt.text, "error").unwrap_or_default());
            Err(UserError::new(message, stmt.pos).into())
        },
    )
}

/// The body default: a literal command line. A `{` on the following
/// statement turns it into a block-suffixed command — the block becomes an
/// anonymous function and its reference is appended to the command.
fn default_command_action(grammar: &Grammar, interp: &mut Interp<'_>, stmt: Statement) -> Result<()> {
    if interp.cursor.peek().is_some_and(Statement::is_open) {
        interp.cursor.next();
        let rendered = interpolate(&stmt.text, &interp.state.env)
            .map_err(|e| CompilerError::new(e.message, stmt.pos))?;
        let id = interp.open_block("block", stmt.pos)?;
        interp.run_to_close(grammar, BODY)?;
        let fref = interp.confirm(id)?;
        interp.push_raw_command(format!("{rendered} function {fref}"), stmt.pos)
    } else {
        interp.push_command(&stmt.text, stmt.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_rest_requires_word_boundary() {
        assert_eq!(word_rest("dir foo", "dir"), Some("foo"));
        assert_eq!(word_rest("dirfoo", "dir"), None);
        assert_eq!(word_rest("dir", "dir"), Some(""));
    }

    #[test]
    fn macro_args_extracts_parenthesized_text() {
        assert_eq!(macro_args("LOOP(3, i)", "LOOP"), Some("3, i"));
        assert_eq!(macro_args("execute (if score a b matches 1)", "execute"), Some("if score a b matches 1"));
        assert_eq!(macro_args("execute if score", "execute"), None);
    }

    #[test]
    fn last_top_level_comma_ignores_nesting() {
        assert_eq!(
            split_last_top_comma("range(2, 5), i"),
            ("range(2, 5)", Some(" i"))
        );
        assert_eq!(
            split_last_top_comma("if entity @e[type=pig,limit=1]"),
            ("if entity @e[type=pig,limit=1]", None)
        );
    }

    #[test]
    fn unquote_strips_one_layer() {
        assert_eq!(unquote("\"bad rig\""), "bad rig");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
    }
}
