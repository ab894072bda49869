//! Logos-derived tokens for the expression sublanguage.
//!
//! The macro environment evaluates a deliberately narrow language:
//! arithmetic, comparison, logical operators, string/list literals,
//! indexing, and builtin calls. The token set mirrors that and nothing
//! more — the evaluator's capabilities stay auditable.

use logos::Logos;

/// Unescape the interior of a quoted string literal.
fn cook_string(raw: &str) -> String {
    // Strip the surrounding quotes.
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Raw token of the expression sublanguage.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum ExprToken {
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| cook_string(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| cook_string(lex.slice()))]
    Str(String),

    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
}

/// Lex an expression into tokens, or return the offending slice.
pub fn lex(source: &str) -> Result<Vec<ExprToken>, String> {
    let mut tokens = Vec::new();
    for (result, span) in ExprToken::lexer(source).spanned() {
        match result {
            Ok(tok) => tokens.push(tok),
            Err(()) => return Err(source[span].to_string()),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lexes_arithmetic() {
        let toks = lex("1 + 2 * x");
        assert_eq!(
            toks,
            Ok(vec![
                ExprToken::Int(1),
                ExprToken::Plus,
                ExprToken::Int(2),
                ExprToken::Star,
                ExprToken::Ident("x".to_string()),
            ])
        );
    }

    #[test]
    fn lexes_strings_with_escapes() {
        let toks = lex(r#""a\"b""#);
        assert_eq!(toks, Ok(vec![ExprToken::Str("a\"b".to_string())]));
    }

    #[test]
    fn lexes_comparison_and_logic() {
        let toks = lex("a <= 3 && !done");
        assert_eq!(
            toks,
            Ok(vec![
                ExprToken::Ident("a".to_string()),
                ExprToken::LessEq,
                ExprToken::Int(3),
                ExprToken::AndAnd,
                ExprToken::Bang,
                ExprToken::Ident("done".to_string()),
            ])
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(lex("a ~ b"), Err("~".to_string()));
    }
}
