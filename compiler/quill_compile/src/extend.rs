//! Auxiliary output-file macros, layered onto the base grammar.
//!
//! Nothing here is known to the base grammar: the `tag` emitter registers
//! itself through [`Grammar::add_rule`], the same seam downstream
//! exporters use to attach their own statement kinds before the first
//! compilation run.

use crate::grammar::{word_rest, TAG_BODY};
use crate::rules::{Grammar, Rule};
use quill_codegen::render_tag_json;
use quill_diagnostic::CompilerError;
use quill_ir::ident_ok;

/// Register the auxiliary emitters on a grammar.
pub fn register(grammar: &mut Grammar) {
    grammar.add_rule(crate::grammar::NAMESPACE, 0, tag_rule());
}

/// `tag <name> { <values> }` — emits a function tag registry at
/// `data/<namespace>/tags/functions/<name>.json` listing the body's
/// values in order.
fn tag_rule() -> Rule {
    Rule::new(
        |stmt| word_rest(&stmt.text, "tag").is_some_and(|rest| !rest.is_empty()),
        |grammar, interp, stmt| {
            let name = word_rest(&stmt.text, "tag").unwrap_or_default().to_string();
            for part in name.split('/') {
                if !ident_ok(part) {
                    return Err(
                        CompilerError::new(format!("invalid identifier `{name}`"), stmt.pos).into(),
                    );
                }
            }
            interp.expect_open()?;
            let saved = std::mem::take(&mut interp.tag_values);
            interp.run_to_close(grammar, TAG_BODY)?;
            let values = std::mem::replace(&mut interp.tag_values, saved);
            let path = format!(
                "data/{}/tags/functions/{name}.json",
                interp.namespace_stack[0]
            );
            interp.staged_files.push((path, render_tag_json(&values)));
            Ok(())
        },
    )
}
