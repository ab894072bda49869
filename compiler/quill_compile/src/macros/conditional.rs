//! Conditional constructs: the runtime `execute … else …` chain and the
//! compile-time `!IF`.

use crate::grammar::{macro_args, BODY};
use crate::interp::Interp;
use crate::rules::Grammar;
use quill_diagnostic::{CompilerError, Result};
use quill_eval::interpolate;
use quill_ir::{FunctionRef, LinePos, Statement};

/// `execute(cond){…} else execute(cond){…} else {…}`
///
/// The target runtime has no native else, so the chain accumulates
/// short-circuit state: the enclosing function resets a private flag, every
/// branch body ends by setting it, and each arm after the first is
/// additionally gated on the flag still being zero. A trailing bare `else`
/// carries no condition of its own.
pub(crate) fn execute_chain(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: Statement,
) -> Result<()> {
    let pos = stmt.pos;
    let cond = condition_text(&stmt.text, interp, pos)?;

    let slot = interp.state.slots.allocate(&interp.file);
    let holder = format!("#quill_if_{slot}");
    let objective = interp.config.internal_scoreboard.clone();

    interp.push_raw_command(format!("scoreboard players set {holder} {objective} 0"), pos)?;

    interp.expect_open()?;
    let branch = chain_branch(grammar, interp, pos, &holder, &objective)?;
    interp.push_raw_command(format!("execute {cond} run function {branch}"), pos)?;

    loop {
        let Some((text, else_pos)) = interp.cursor.peek().map(|s| (s.text.clone(), s.pos)) else {
            break;
        };
        if text == "else" {
            interp.cursor.next();
            interp.expect_open()?;
            let branch = chain_branch(grammar, interp, else_pos, &holder, &objective)?;
            interp.push_raw_command(
                format!("execute if score {holder} {objective} matches 0 run function {branch}"),
                else_pos,
            )?;
            break;
        }
        let Some(rest) = text.strip_prefix("else ") else { break };
        let rest = rest.trim();
        if macro_args(rest, "execute").is_none() {
            break;
        }
        interp.cursor.next();
        let cond = condition_text(rest, interp, else_pos)?;
        interp.expect_open()?;
        let branch = chain_branch(grammar, interp, else_pos, &holder, &objective)?;
        interp.push_raw_command(
            format!("execute if score {holder} {objective} matches 0 {cond} run function {branch}"),
            else_pos,
        )?;
    }
    Ok(())
}

/// Interpret one branch body into an anonymous function that ends by
/// setting the chain flag.
fn chain_branch(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    pos: LinePos,
    holder: &str,
    objective: &str,
) -> Result<FunctionRef> {
    let id = interp.open_block("execute", pos)?;
    interp.run_to_close(grammar, BODY)?;
    interp
        .state
        .arena
        .get_mut(id)
        .commands
        .push(format!("scoreboard players set {holder} {objective} 1"));
    interp.confirm(id)
}

fn condition_text(text: &str, interp: &Interp<'_>, pos: LinePos) -> Result<String> {
    let inner = macro_args(text, "execute").ok_or_else(|| {
        CompilerError::new(format!("malformed condition in `{text}`"), pos)
    })?;
    interpolate(inner.trim(), &interp.state.env)
        .map_err(|e| CompilerError::new(e.message, pos).into())
}

/// `!IF(expr){…}` / `!expr{…}` — evaluated immediately.
///
/// A true condition interprets the body through the production the macro
/// appeared in; a false one skips it by brace counting, so syntactically
/// invalid content inside a not-taken branch is tolerated. Literal braces
/// in the skipped region's comments or strings are structural to the
/// skipper — preserved behavior.
pub(crate) fn compile_time_if(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: Statement,
    production: &str,
) -> Result<()> {
    let expr = match macro_args(&stmt.text, "!IF") {
        Some(inner) => inner,
        None => &stmt.text[1..],
    };
    let value = quill_eval::eval(expr.trim(), &interp.state.env)
        .map_err(|e| CompilerError::new(e.message, stmt.pos))?;
    interp.expect_open()?;
    if value.truthy() {
        interp.run_to_close(grammar, production)
    } else {
        interp.skip_balanced()
    }
}
