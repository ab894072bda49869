//! Expression parsing and evaluation.
//!
//! A Pratt-style recursive parser over the logos token stream that
//! evaluates directly to a [`Value`] — the macro language never needs an
//! AST, every expression is evaluated exactly once at the point it is
//! parsed.

use crate::errors::{
    bad_character, bad_index, binary_type_mismatch, division_by_zero, not_indexable,
    undefined_variable, unexpected_end, unexpected_token, unknown_function, wrong_arg_count,
};
use crate::{EvalError, EvalResult, MacroEnv, Value};
use quill_lexer::expr::{lex, ExprToken};

/// Evaluate an expression against the environment.
pub fn eval(source: &str, env: &MacroEnv) -> EvalResult {
    let tokens = lex(source).map_err(|slice| bad_character(&slice))?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        env,
    };
    let value = parser.expr(0)?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(unexpected_token(&describe(tok))),
    }
}

/// Left binding power of an infix operator; `None` for non-operators.
fn infix_bp(tok: &ExprToken) -> Option<u8> {
    use ExprToken::*;
    Some(match tok {
        OrOr => 1,
        AndAnd => 2,
        EqEq | NotEq | Less | LessEq | Greater | GreaterEq => 3,
        Plus | Minus => 4,
        Star | Slash | Percent => 5,
        _ => return None,
    })
}

fn describe(tok: &ExprToken) -> String {
    use ExprToken::*;
    match tok {
        Int(n) => n.to_string(),
        Float(x) => x.to_string(),
        Str(s) => format!("\"{s}\""),
        True => "true".to_string(),
        False => "false".to_string(),
        Ident(name) => name.clone(),
        Plus => "+".to_string(),
        Minus => "-".to_string(),
        Star => "*".to_string(),
        Slash => "/".to_string(),
        Percent => "%".to_string(),
        EqEq => "==".to_string(),
        NotEq => "!=".to_string(),
        LessEq => "<=".to_string(),
        GreaterEq => ">=".to_string(),
        Less => "<".to_string(),
        Greater => ">".to_string(),
        AndAnd => "&&".to_string(),
        OrOr => "||".to_string(),
        Bang => "!".to_string(),
        LParen => "(".to_string(),
        RParen => ")".to_string(),
        LBracket => "[".to_string(),
        RBracket => "]".to_string(),
        Comma => ",".to_string(),
    }
}

struct Parser<'a> {
    tokens: Vec<ExprToken>,
    pos: usize,
    env: &'a MacroEnv,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<ExprToken, EvalError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or_else(unexpected_end)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, want: &ExprToken) -> Result<(), EvalError> {
        let tok = self.next()?;
        if &tok == want {
            Ok(())
        } else {
            Err(unexpected_token(&describe(&tok)))
        }
    }

    fn expr(&mut self, min_bp: u8) -> EvalResult {
        let mut lhs = self.prefix()?;

        loop {
            // Postfix indexing binds tighter than any infix operator.
            if matches!(self.peek(), Some(ExprToken::LBracket)) {
                self.pos += 1;
                let index = self.expr(0)?;
                self.expect(&ExprToken::RBracket)?;
                lhs = index_value(&lhs, &index)?;
                continue;
            }

            let Some(op) = self.peek().cloned() else { break };
            let Some(bp) = infix_bp(&op) else { break };
            if bp <= min_bp {
                break;
            }
            self.pos += 1;

            // Short-circuit logical operators before evaluating the rhs.
            match op {
                ExprToken::AndAnd if !lhs.truthy() => {
                    self.skip_operand(bp)?;
                    lhs = Value::Bool(false);
                    continue;
                }
                ExprToken::OrOr if lhs.truthy() => {
                    self.skip_operand(bp)?;
                    lhs = Value::Bool(true);
                    continue;
                }
                _ => {}
            }

            let rhs = self.expr(bp)?;
            lhs = binary(&op, &lhs, &rhs)?;
        }
        Ok(lhs)
    }

    /// Parse past an operand without keeping its value. Used by the
    /// short-circuit paths, which must still consume well-formed input.
    fn skip_operand(&mut self, bp: u8) -> Result<(), EvalError> {
        // Evaluation is effect-free, so parsing the operand normally and
        // discarding the result is safe; undefined variables are tolerated
        // in the dead half of a short-circuit.
        let saved = self.pos;
        match self.expr(bp) {
            Ok(_) => Ok(()),
            Err(_) => {
                // Re-scan structurally: consume tokens until the next
                // operator at or below this binding power, tracking nesting.
                self.pos = saved;
                let mut depth = 0usize;
                while let Some(tok) = self.peek() {
                    match tok {
                        ExprToken::LParen | ExprToken::LBracket => depth += 1,
                        ExprToken::RParen | ExprToken::RBracket => {
                            if depth == 0 {
                                break;
                            }
                            depth -= 1;
                        }
                        _ if depth == 0 => {
                            if let Some(next_bp) = infix_bp(tok) {
                                if next_bp <= bp {
                                    break;
                                }
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
                Ok(())
            }
        }
    }

    fn prefix(&mut self) -> EvalResult {
        let tok = self.next()?;
        match tok {
            ExprToken::Int(n) => Ok(Value::Int(n)),
            ExprToken::Float(x) => Ok(Value::Float(x)),
            ExprToken::Str(s) => Ok(Value::Str(s)),
            ExprToken::True => Ok(Value::Bool(true)),
            ExprToken::False => Ok(Value::Bool(false)),
            ExprToken::Minus => {
                let operand = self.expr(6)?;
                match operand {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    Value::Float(x) => Ok(Value::Float(-x)),
                    other => Err(EvalError::new(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                }
            }
            ExprToken::Bang => {
                let operand = self.expr(6)?;
                Ok(Value::Bool(!operand.truthy()))
            }
            ExprToken::LParen => {
                let value = self.expr(0)?;
                self.expect(&ExprToken::RParen)?;
                Ok(value)
            }
            ExprToken::LBracket => {
                let mut items = Vec::new();
                if matches!(self.peek(), Some(ExprToken::RBracket)) {
                    self.pos += 1;
                    return Ok(Value::List(items));
                }
                loop {
                    items.push(self.expr(0)?);
                    match self.next()? {
                        ExprToken::Comma => continue,
                        ExprToken::RBracket => break,
                        other => return Err(unexpected_token(&describe(&other))),
                    }
                }
                Ok(Value::List(items))
            }
            ExprToken::Ident(name) => {
                if matches!(self.peek(), Some(ExprToken::LParen)) {
                    self.pos += 1;
                    let args = self.call_args()?;
                    builtin(&name, &args)
                } else {
                    self.env
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| undefined_variable(&name))
                }
            }
            other => Err(unexpected_token(&describe(&other))),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Value>, EvalError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(ExprToken::RParen)) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr(0)?);
            match self.next()? {
                ExprToken::Comma => continue,
                ExprToken::RParen => break,
                other => return Err(unexpected_token(&describe(&other))),
            }
        }
        Ok(args)
    }
}

fn index_value(target: &Value, index: &Value) -> EvalResult {
    let i = index
        .as_int()
        .ok_or_else(|| EvalError::new(format!("index must be int, got {}", index.type_name())))?;
    match target {
        Value::List(xs) => {
            let len = xs.len();
            usize::try_from(i)
                .ok()
                .and_then(|i| xs.get(i).cloned())
                .ok_or_else(|| bad_index(len, i))
        }
        Value::Str(s) => {
            let len = s.chars().count();
            usize::try_from(i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| bad_index(len, i))
        }
        other => Err(not_indexable(other)),
    }
}

fn binary(op: &ExprToken, lhs: &Value, rhs: &Value) -> EvalResult {
    use ExprToken::*;
    match op {
        Plus => add(lhs, rhs),
        Minus | Star | Slash | Percent => arith(op, lhs, rhs),
        EqEq => Ok(Value::Bool(values_eq(lhs, rhs))),
        NotEq => Ok(Value::Bool(!values_eq(lhs, rhs))),
        Less | LessEq | Greater | GreaterEq => compare(op, lhs, rhs),
        AndAnd => Ok(Value::Bool(lhs.truthy() && rhs.truthy())),
        OrOr => Ok(Value::Bool(lhs.truthy() || rhs.truthy())),
        other => Err(unexpected_token(&describe(other))),
    }
}

fn add(lhs: &Value, rhs: &Value) -> EvalResult {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        (Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
        (a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => {
            let mut out = a.clone();
            out.extend(b.iter().cloned());
            Ok(Value::List(out))
        }
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float(a + b)),
            _ => Err(binary_type_mismatch("+", lhs, rhs)),
        },
    }
}

fn arith(op: &ExprToken, lhs: &Value, rhs: &Value) -> EvalResult {
    use ExprToken::*;
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        return match op {
            Minus => Ok(Value::Int(a.wrapping_sub(*b))),
            Star => Ok(Value::Int(a.wrapping_mul(*b))),
            Slash => a
                .checked_div(*b)
                .map(Value::Int)
                .ok_or_else(division_by_zero),
            Percent => a
                .checked_rem(*b)
                .map(Value::Int)
                .ok_or_else(division_by_zero),
            _ => Err(unexpected_token(&describe(op))),
        };
    }
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => match op {
            Minus => Ok(Value::Float(a - b)),
            Star => Ok(Value::Float(a * b)),
            Slash => Ok(Value::Float(a / b)),
            Percent => Ok(Value::Float(a % b)),
            _ => Err(unexpected_token(&describe(op))),
        },
        _ => Err(binary_type_mismatch(&describe(op), lhs, rhs)),
    }
}

fn values_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn compare(op: &ExprToken, lhs: &Value, rhs: &Value) -> EvalResult {
    use ExprToken::*;
    let ordering = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(binary_type_mismatch(&describe(op), lhs, rhs)),
        },
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        Less => ordering.is_lt(),
        LessEq => ordering.is_le(),
        Greater => ordering.is_gt(),
        GreaterEq => ordering.is_ge(),
        other => return Err(unexpected_token(&describe(other))),
    };
    Ok(Value::Bool(result))
}

/// The fixed builtin table. Anything outside it is an error, never a
/// fallthrough to host behavior.
fn builtin(name: &str, args: &[Value]) -> EvalResult {
    match name {
        "len" => {
            let [arg] = args else {
                return Err(wrong_arg_count(name, "1", args.len()));
            };
            match arg {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::List(xs) => Ok(Value::Int(xs.len() as i64)),
                other => Err(EvalError::new(format!(
                    "`len` expects str or list, got {}",
                    other.type_name()
                ))),
            }
        }
        "str" => {
            let [arg] = args else {
                return Err(wrong_arg_count(name, "1", args.len()));
            };
            Ok(Value::Str(arg.to_string()))
        }
        "int" => {
            let [arg] = args else {
                return Err(wrong_arg_count(name, "1", args.len()));
            };
            match arg {
                Value::Int(n) => Ok(Value::Int(*n)),
                Value::Float(x) => Ok(Value::Int(*x as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Str(s) => s
                    .trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| EvalError::new(format!("cannot parse `{s}` as int"))),
                other => Err(EvalError::new(format!(
                    "cannot convert {} to int",
                    other.type_name()
                ))),
            }
        }
        "abs" => {
            let [arg] = args else {
                return Err(wrong_arg_count(name, "1", args.len()));
            };
            match arg {
                Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
                Value::Float(x) => Ok(Value::Float(x.abs())),
                other => Err(EvalError::new(format!(
                    "`abs` expects a number, got {}",
                    other.type_name()
                ))),
            }
        }
        "min" | "max" => {
            if args.len() < 2 {
                return Err(wrong_arg_count(name, "at least 2", args.len()));
            }
            let mut best = args[0].clone();
            for arg in &args[1..] {
                let (a, b) = (best.as_f64(), arg.as_f64());
                let (Some(a), Some(b)) = (a, b) else {
                    return Err(binary_type_mismatch(name, &best, arg));
                };
                let take = if name == "min" { b < a } else { b > a };
                if take {
                    best = arg.clone();
                }
            }
            Ok(best)
        }
        "floor" | "ceil" | "round" => {
            let [arg] = args else {
                return Err(wrong_arg_count(name, "1", args.len()));
            };
            let x = arg.as_f64().ok_or_else(|| {
                EvalError::new(format!("`{name}` expects a number, got {}", arg.type_name()))
            })?;
            let x = match name {
                "floor" => x.floor(),
                "ceil" => x.ceil(),
                _ => x.round(),
            };
            Ok(Value::Int(x as i64))
        }
        "range" => {
            let (start, end) = match args {
                [end] => (0, end.as_int()),
                [start, end] => (start.as_int().unwrap_or(0), end.as_int()),
                _ => return Err(wrong_arg_count(name, "1 or 2", args.len())),
            };
            let end = end.ok_or_else(|| EvalError::new("`range` expects int bounds"))?;
            Ok(Value::List((start..end).map(Value::Int).collect()))
        }
        _ => Err(unknown_function(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> EvalResult {
        eval(src, &MacroEnv::new())
    }

    #[test]
    fn precedence() {
        assert_eq!(run("1 + 2 * 3"), Ok(Value::Int(7)));
        assert_eq!(run("(1 + 2) * 3"), Ok(Value::Int(9)));
    }

    #[test]
    fn comparison_chains_into_logic() {
        assert_eq!(run("1 < 2 && 3 >= 3"), Ok(Value::Bool(true)));
        assert_eq!(run("1 > 2 || false"), Ok(Value::Bool(false)));
    }

    #[test]
    fn variables_resolve_from_env() {
        let mut env = MacroEnv::new();
        env.set("frames", Value::Int(20));
        assert_eq!(eval("frames - 1", &env), Ok(Value::Int(19)));
    }

    #[test]
    fn undefined_variable_fails() {
        let err = run("nope + 1");
        assert_eq!(err, Err(EvalError::new("undefined variable `nope`")));
    }

    #[test]
    fn string_concat_and_index() {
        assert_eq!(
            run(r#""walk_" + 3"#),
            Ok(Value::Str("walk_3".to_string()))
        );
        assert_eq!(run(r#"["a","b"][1]"#), Ok(Value::Str("b".to_string())));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert_eq!(run("1 / 0"), Err(EvalError::new("division by zero")));
    }

    #[test]
    fn short_circuit_skips_dead_operand() {
        // `missing` is undefined, but the dead half never evaluates.
        assert_eq!(run("false && missing"), Ok(Value::Bool(false)));
        assert_eq!(run("true || missing"), Ok(Value::Bool(true)));
    }

    #[test]
    fn builtins() {
        assert_eq!(run("len([1,2,3])"), Ok(Value::Int(3)));
        assert_eq!(run("min(3, 1, 2)"), Ok(Value::Int(1)));
        assert_eq!(run("floor(2.9)"), Ok(Value::Int(2)));
        assert_eq!(
            run("range(2, 5)"),
            Ok(Value::List(vec![
                Value::Int(2),
                Value::Int(3),
                Value::Int(4)
            ]))
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert_eq!(run("1 2"), Err(EvalError::new("unexpected `2` in expression")));
    }
}
