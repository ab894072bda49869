//! Loop constructs: compile-time unrolling, runtime polling, and
//! runtime while loops.

use crate::grammar::{macro_args, split_last_top_comma, BODY};
use crate::interp::Interp;
use crate::macros::schedule::parse_time;
use crate::rules::Grammar;
use quill_diagnostic::{CompilerError, Result};
use quill_eval::{interpolate, Value};
use quill_ir::Statement;

/// `LOOP(count, var){…}` — compile-time unrolling.
///
/// `count` is evaluated once; a list iterates per element, an integer per
/// `0..count`. Every iteration except the last interprets the body against
/// a fork of the cursor; the last runs against the real cursor. The loop
/// as a whole therefore consumes exactly one copy of its body from the
/// outer stream while emitting one copy of its effects per iteration.
/// `var` stays bound to the final value afterwards.
pub(crate) fn unrolled_loop(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: Statement,
) -> Result<()> {
    let inner = macro_args(&stmt.text, "LOOP").unwrap_or_default();
    let (count_src, var) = split_last_top_comma(inner);
    let Some(var) = var.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(
            CompilerError::new("LOOP expects `(count, variable)`", stmt.pos).into(),
        );
    };
    let var = var.to_string();

    let count = quill_eval::eval(count_src.trim(), &interp.state.env)
        .map_err(|e| CompilerError::new(e.message, stmt.pos))?;
    let values: Vec<Value> = match count {
        Value::List(xs) => xs,
        Value::Int(n) => (0..n.max(0)).map(Value::Int).collect(),
        other => {
            return Err(CompilerError::new(
                format!("LOOP count must be int or list, got {}", other.type_name()),
                stmt.pos,
            )
            .into())
        }
    };

    interp.expect_open()?;
    if values.is_empty() {
        return interp.skip_balanced();
    }

    let last = values.len() - 1;
    for (i, value) in values.into_iter().enumerate() {
        interp.state.env.set(var.clone(), value);
        if i < last {
            let fork = interp.cursor.fork();
            let real = std::mem::replace(&mut interp.cursor, fork);
            interp.run_to_close(grammar, BODY)?;
            interp.cursor = real;
        } else {
            interp.run_to_close(grammar, BODY)?;
        }
    }
    Ok(())
}

/// `until(cond, time){…}` — runtime polling.
///
/// A fresh slot backs a success flag. The generated poller sets the flag
/// under `cond`, runs the body under `cond`, and reschedules itself after
/// `time` only while the flag is unset: the body runs once, the first time
/// the condition holds, then the retry chain stops.
pub(crate) fn until_loop(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: Statement,
) -> Result<()> {
    let pos = stmt.pos;
    let inner = macro_args(&stmt.text, "until").unwrap_or_default();
    let (cond_src, time) = split_last_top_comma(inner);
    let Some(time) = time else {
        return Err(CompilerError::new("until expects `(condition, time)`", pos).into());
    };
    let ticks = parse_time(time).map_err(|msg| CompilerError::new(msg, pos))?;
    let cond = interpolate(cond_src.trim(), &interp.state.env)
        .map_err(|e| CompilerError::new(e.message, pos))?;

    let slot = interp.state.slots.allocate(&interp.file);
    let holder = format!("#quill_until_{slot}");
    let objective = interp.config.internal_scoreboard.clone();

    interp.expect_open()?;
    let poll = interp.open_anonymous("until", pos);
    let body = interp.open_block("until", pos)?;
    interp.run_to_close(grammar, BODY)?;
    let body_ref = interp.confirm(body)?;

    interp.state.arena.get_mut(poll).commands.extend([
        format!("execute {cond} run scoreboard players set {holder} {objective} 1"),
        format!("execute {cond} run function {body_ref}"),
        format!(
            "execute if score {holder} {objective} matches 0 run schedule function $block {ticks}t replace"
        ),
    ]);
    let poll_ref = interp.confirm(poll)?;

    interp.push_raw_command(format!("scoreboard players set {holder} {objective} 0"), pos)?;
    interp.push_raw_command(format!("function {poll_ref}"), pos)?;
    Ok(())
}

/// `while(cond){…} finally{…}` and `async while(cond, time){…} finally{…}`.
///
/// The generated driver latches `cond` into a flag each pass, runs the
/// body and re-invokes itself while the flag holds — immediately for the
/// synchronous form (unbounded same-step recursion if `cond` never falls),
/// via a timed `schedule … replace` for the async form. The optional
/// `finally` body runs exactly once, on the first pass that finds the
/// condition false.
pub(crate) fn while_loop(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: Statement,
    is_async: bool,
) -> Result<()> {
    let pos = stmt.pos;
    let text = if is_async {
        stmt.text.strip_prefix("async ").unwrap_or(&stmt.text).trim()
    } else {
        stmt.text.as_str()
    };
    let inner = macro_args(text, "while").unwrap_or_default();

    // The async form takes an optional trailing period; a tail that does
    // not parse as a time is part of the condition.
    let (cond_src, ticks) = if is_async {
        match split_last_top_comma(inner) {
            (head, Some(tail)) => match parse_time(tail) {
                Ok(ticks) => (head, ticks),
                Err(_) => (inner, 1),
            },
            (head, None) => (head, 1),
        }
    } else {
        (inner, 0)
    };
    let cond = interpolate(cond_src.trim(), &interp.state.env)
        .map_err(|e| CompilerError::new(e.message, pos))?;

    let slot = interp.state.slots.allocate(&interp.file);
    let holder = format!("#quill_while_{slot}");
    let objective = interp.config.internal_scoreboard.clone();

    interp.expect_open()?;
    let driver = interp.open_anonymous("while", pos);
    let body = interp.open_block("while", pos)?;
    interp.run_to_close(grammar, BODY)?;
    let body_ref = interp.confirm(body)?;

    let finally_ref = finally_block(grammar, interp)?;

    let recurse = if is_async {
        format!(
            "execute if score {holder} {objective} matches 1 run schedule function $block {ticks}t replace"
        )
    } else {
        format!("execute if score {holder} {objective} matches 1 run function $block")
    };
    let driver_fn = interp.state.arena.get_mut(driver);
    driver_fn.commands.extend([
        format!("scoreboard players set {holder} {objective} 0"),
        format!("execute {cond} run scoreboard players set {holder} {objective} 1"),
        format!("execute if score {holder} {objective} matches 1 run function {body_ref}"),
        recurse,
    ]);
    if let Some(finally_ref) = finally_ref {
        driver_fn.commands.push(format!(
            "execute if score {holder} {objective} matches 0 run function {finally_ref}"
        ));
    }
    let driver_ref = interp.confirm(driver)?;
    interp.push_raw_command(format!("function {driver_ref}"), pos)
}

/// Consume an optional `finally { … }` following a loop body.
fn finally_block(
    grammar: &Grammar,
    interp: &mut Interp<'_>,
) -> Result<Option<quill_ir::FunctionRef>> {
    let Some((text, pos)) = interp.cursor.peek().map(|s| (s.text.clone(), s.pos)) else {
        return Ok(None);
    };
    if text != "finally" {
        return Ok(None);
    }
    interp.cursor.next();
    interp.expect_open()?;
    let id = interp.open_block("finally", pos)?;
    interp.run_to_close(grammar, BODY)?;
    Ok(Some(interp.confirm(id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loop_argument_split_keeps_nested_commas() {
        let inner = "range(2, 5), i";
        let (count, var) = split_last_top_comma(inner);
        assert_eq!(count, "range(2, 5)");
        assert_eq!(var.map(str::trim), Some("i"));
    }
}
