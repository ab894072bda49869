//! The `sequence` timeline macro and time parsing.

use crate::interp::Interp;
use crate::rules::Grammar;
use quill_diagnostic::{CompilerError, Result};
use quill_eval::interpolate;
use std::collections::BTreeMap;

/// Parse a time literal into ticks: `s` is seconds (×20), `d` is days
/// (×24000), `t` or no suffix is ticks. Fractions are allowed and round
/// to the nearest tick.
pub(crate) fn parse_time(text: &str) -> Result<u32, String> {
    let t = text.trim();
    let (number, multiplier) = match t.as_bytes().last() {
        Some(b's') => (&t[..t.len() - 1], 20.0),
        Some(b'd') => (&t[..t.len() - 1], 24000.0),
        Some(b't') => (&t[..t.len() - 1], 1.0),
        _ => (t, 1.0),
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("cannot parse time `{text}`"))?;
    let ticks = (value * multiplier).round();
    if ticks < 0.0 || ticks > f64::from(u32::MAX) {
        return Err(format!("time `{text}` out of range"));
    }
    Ok(ticks as u32)
}

/// `sequence { … }` — time-bucketed scheduling.
///
/// `delay <t>` advances a running tick cursor; `setdelay <t>` sets it
/// absolutely; any other statement is appended to the bucket at the
/// cursor's current value. The tick-0 bucket is emitted inline in the
/// enclosing function; every other non-empty bucket becomes its own
/// generated function scheduled with the `replace` policy at its offset,
/// so re-triggering the sequence overwrites any still-pending occurrence
/// instead of stacking duplicates.
pub(crate) fn sequence_block(
    _grammar: &Grammar,
    interp: &mut Interp<'_>,
    stmt: quill_ir::Statement,
) -> Result<()> {
    let pos = stmt.pos;
    interp.expect_open()?;

    let mut cursor_ticks: u32 = 0;
    let mut buckets: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    loop {
        let entry = interp.expect_statement("`}`")?;
        if entry.is_close() {
            break;
        }
        if entry.is_open() {
            return Err(CompilerError::new(
                "blocks are not allowed inside `sequence`",
                entry.pos,
            )
            .into());
        }
        if let Some(rest) = crate::grammar::word_rest(&entry.text, "delay") {
            let ticks = parse_time(rest).map_err(|msg| CompilerError::new(msg, entry.pos))?;
            cursor_ticks = cursor_ticks.saturating_add(ticks);
            continue;
        }
        if let Some(rest) = crate::grammar::word_rest(&entry.text, "setdelay") {
            cursor_ticks = parse_time(rest).map_err(|msg| CompilerError::new(msg, entry.pos))?;
            continue;
        }
        let line = interpolate(&entry.text, &interp.state.env)
            .map_err(|e| CompilerError::new(e.message, entry.pos))?;
        buckets.entry(cursor_ticks).or_default().push(line);
    }

    for (tick, lines) in buckets {
        if tick == 0 {
            for line in lines {
                interp.push_raw_command(line, pos)?;
            }
        } else {
            let id = interp.open_anonymous("sequence", pos);
            interp.state.arena.get_mut(id).commands = lines;
            let fref = interp.confirm(id)?;
            interp.push_raw_command(
                format!("schedule function {fref} {tick}t replace"),
                pos,
            )?;
        }
    }
    Ok(())
}
