//! `<% expr %>` string interpolation.
//!
//! Command templates may splice evaluated expressions:
//! `say frame <% i + 1 %> of <% total %>`. Interpolation uses the same
//! evaluator as the macro directives, so anything legal in `!IF` is legal
//! here.

use crate::{eval, EvalError, EvalResult, MacroEnv};

/// Splice every `<% expr %>` occurrence in `template`.
///
/// Text outside markers is copied verbatim. An unterminated `<%` is an
/// error rather than silent passthrough.
pub fn interpolate(template: &str, env: &MacroEnv) -> EvalResult<String> {
    // Fast path: nothing to do.
    if !template.contains("<%") {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("<%") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("%>") else {
            return Err(EvalError::new("unterminated `<%` in template"));
        };
        let value = eval(after[..end].trim(), env)?;
        out.push_str(&value.to_string());
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn splices_expressions() {
        let mut env = MacroEnv::new();
        env.set("i", Value::Int(4));
        let got = interpolate("say frame <% i %> of <% i + 1 %>", &env);
        assert_eq!(got, Ok("say frame 4 of 5".to_string()));
    }

    #[test]
    fn plain_text_passes_through() {
        let got = interpolate("scoreboard players set @s x 1", &MacroEnv::new());
        assert_eq!(got, Ok("scoreboard players set @s x 1".to_string()));
    }

    #[test]
    fn unterminated_marker_errors() {
        let got = interpolate("say <% i", &MacroEnv::new());
        assert_eq!(got, Err(EvalError::new("unterminated `<%` in template")));
    }
}
