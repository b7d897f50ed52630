//! Lexical helpers for the expression grammar.
//!
//! The grammar is small enough that no token stream is built. Every helper
//! walks the source once, tracking parenthesis depth and whether it is inside
//! a `"..."` or `'...'` literal, and hands back slices of the input.
//!
//! A `'` only opens a literal where a value can start (after `(`, `,`, an
//! operator, or at the beginning), so `O'Brien` and `d'Or` stay plain text.

use super::ExprError;

/// Walks `s` and reports each byte offset that sits outside quotes along
/// with the current parenthesis depth.
struct Scanner<'a> {
    chars: std::str::CharIndices<'a>,
    quote: Option<char>,
    depth: i32,
    /// Last non-blank character outside quotes.
    previous: Option<char>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices(),
            quote: None,
            depth: 0,
            previous: None,
        }
    }
}

/// A character position outside any quoted literal.
struct Position {
    index: usize,
    ch: char,
    /// Depth before this character is applied.
    depth: i32,
}

impl Iterator for Scanner<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        for (index, ch) in self.chars.by_ref() {
            if let Some(q) = self.quote {
                if ch == q {
                    self.quote = None;
                }
                continue;
            }
            let depth = self.depth;
            let value_start = matches!(
                self.previous,
                None | Some('(' | ',' | '=' | '!' | '<' | '>' | '|')
            );
            if !ch.is_whitespace() {
                self.previous = Some(ch);
            }
            match ch {
                '"' => {
                    self.quote = Some(ch);
                    continue;
                }
                '\'' if value_start => {
                    self.quote = Some(ch);
                    continue;
                }
                '(' => self.depth += 1,
                ')' => self.depth -= 1,
                _ => {}
            }
            return Some(Position { index, ch, depth });
        }
        None
    }
}

impl Scanner<'_> {
    /// Drain the scanner and report whether quotes and parens closed.
    fn is_balanced(mut self) -> bool {
        let mut ok = true;
        for pos in self.by_ref() {
            if pos.ch == ')' && pos.depth <= 0 {
                ok = false;
            }
        }
        ok && self.quote.is_none() && self.depth == 0
    }
}

/// Byte offset of the `}}` closing a span whose body starts at `body[0]`.
pub(crate) fn find_span_end(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    Scanner::new(body)
        .find(|p| p.ch == '}' && bytes.get(p.index + 1) == Some(&b'}'))
        .map(|p| p.index)
}

/// Split at the first top-level `||`.
pub(crate) fn split_default(expr: &str) -> Option<(&str, &str)> {
    let bytes = expr.as_bytes();
    Scanner::new(expr)
        .find(|p| p.ch == '|' && p.depth == 0 && bytes.get(p.index + 1) == Some(&b'|'))
        .map(|p| (&expr[..p.index], &expr[p.index + 2..]))
}

/// Contents of a quoted literal, if `s` is exactly one.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    let first = s.chars().next()?;
    if (first == '"' || first == '\'') && s.len() >= 2 && s.ends_with(first) {
        let inner = &s[1..s.len() - 1];
        // "a" "b" is two literals, not one
        if !inner.contains(first) {
            return Some(inner);
        }
    }
    None
}

/// A parsed `NAME(args)` call.
#[derive(Debug, PartialEq)]
pub(crate) struct Call<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `NAME(arg, arg, ...)`. The closing parenthesis of the first `(`
/// must end the expression.
pub(crate) fn parse_call(expr: &str) -> Result<Call<'_>, ExprError> {
    let expr = expr.trim();
    let open = expr
        .find('(')
        .ok_or_else(|| ExprError::Malformed(expr.to_string()))?;
    let name = expr[..open].trim();
    if !is_identifier(name) {
        return Err(ExprError::Malformed(expr.to_string()));
    }

    let close = Scanner::new(expr)
        .find(|p| p.index > open && p.ch == ')' && p.depth == 1)
        .map(|p| p.index)
        .ok_or_else(|| ExprError::Malformed(expr.to_string()))?;
    if !expr[close + 1..].trim().is_empty() {
        return Err(ExprError::Malformed(expr.to_string()));
    }

    let args = split_args(&expr[open + 1..close])?;
    Ok(Call { name, args })
}

/// Whether `s` is shaped like a single call (identifier, balanced parens
/// closing at the very end). Says nothing about the name being known.
pub(crate) fn looks_like_call(s: &str) -> bool {
    let s = s.trim();
    match s.find('(') {
        Some(open) if is_identifier(s[..open].trim()) => parse_call(s).is_ok(),
        _ => false,
    }
}

/// Split an argument list on top-level commas. An empty list yields no
/// arguments; `a,,b` yields an empty middle argument.
pub(crate) fn split_args(s: &str) -> Result<Vec<&str>, ExprError> {
    if !Scanner::new(s).is_balanced() {
        return Err(ExprError::Malformed(s.to_string()));
    }
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut args = Vec::new();
    let mut start = 0;
    for pos in Scanner::new(s) {
        if pos.ch == ',' && pos.depth == 0 {
            args.push(s[start..pos.index].trim());
            start = pos.index + 1;
        }
    }
    args.push(s[start..].trim());
    Ok(args)
}

/// Comparison operators recognized inside `SI` conditions, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Comparison {
    const SCAN_ORDER: [(&'static str, Comparison); 6] = [
        ("==", Comparison::Eq),
        ("!=", Comparison::Ne),
        (">=", Comparison::Ge),
        ("<=", Comparison::Le),
        (">", Comparison::Gt),
        ("<", Comparison::Lt),
    ];
}

/// Find the comparison in a condition. Operators are tried in the fixed
/// order `== != >= <= > <`; the first one present anywhere outside quotes
/// wins, so `a > b == c` splits on `==`.
pub(crate) fn split_comparison(cond: &str) -> Option<(&str, Comparison, &str)> {
    for (token, op) in Comparison::SCAN_ORDER {
        let first = token.as_bytes()[0];
        let bytes = cond.as_bytes();
        let hit = Scanner::new(cond).find(|p| {
            p.ch as u32 == first as u32 && bytes[p.index..].starts_with(token.as_bytes())
        });
        if let Some(p) = hit {
            return Some((&cond[..p.index], op, &cond[p.index + token.len()..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_end_skips_quotes() {
        assert_eq!(find_span_end("a}}rest"), Some(1));
        assert_eq!(find_span_end("CONCAT(\"}}\", x)}} tail"), Some(15));
        assert_eq!(find_span_end("never closed"), None);
    }

    #[test]
    fn test_apostrophe_inside_a_word_is_text() {
        assert_eq!(find_span_end("O'Brien}} rest"), Some(7));
        assert_eq!(find_span_end("SI(a == 'x}}', b, c)}}"), Some(20));
        assert_eq!(
            split_args("O'Brien, 'a, b', d'Or").unwrap(),
            vec!["O'Brien", "'a, b'", "d'Or"]
        );
        assert!(Scanner::new("MAYUS(d'Or)").is_balanced());
    }

    #[test]
    fn test_split_default_first_top_level() {
        assert_eq!(split_default("a || b || c"), Some(("a ", " b || c")));
        assert_eq!(split_default("CONCAT(a || b)"), None);
        assert_eq!(split_default("\"x||y\""), None);
    }

    #[test]
    fn test_parse_call() {
        let call = parse_call("CONCAT(a, \"b, c\", MAYUS(d))").unwrap();
        assert_eq!(call.name, "CONCAT");
        assert_eq!(call.args, vec!["a", "\"b, c\"", "MAYUS(d)"]);

        let call = parse_call("HOY()").unwrap();
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_parse_call_malformed() {
        assert!(parse_call("MAYUS(a").is_err());
        assert!(parse_call("MAYUS(a) extra").is_err());
        assert!(parse_call("(a)").is_err());
        assert!(parse_call("MAYUS(\"a)").is_err());
    }

    #[test]
    fn test_looks_like_call() {
        assert!(looks_like_call("MAYUS(x)"));
        assert!(!looks_like_call("LARGO(a) > LARGO(b)"));
        assert!(!looks_like_call("precio"));
        assert!(!looks_like_call("(1)"));
    }

    #[test]
    fn test_split_args_empty_middle() {
        assert_eq!(split_args("a,,b").unwrap(), vec!["a", "", "b"]);
        assert!(split_args("   ").unwrap().is_empty());
        assert!(split_args("a, (b").is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"yes\""), Some("yes"));
        assert_eq!(unquote(" 'no' "), Some("no"));
        assert_eq!(unquote("\"a\" \"b\""), None);
        assert_eq!(unquote("plain"), None);
        assert_eq!(unquote("\""), None);
    }

    #[test]
    fn test_split_comparison_order() {
        assert_eq!(split_comparison("5 > 3"), Some(("5 ", Comparison::Gt, " 3")));
        assert_eq!(
            split_comparison("precio >= 10"),
            Some(("precio ", Comparison::Ge, " 10"))
        );
        assert_eq!(
            split_comparison("a > b == c"),
            Some(("a > b ", Comparison::Eq, " c"))
        );
        assert_eq!(split_comparison("\"a==b\""), None);
        assert_eq!(split_comparison("flag"), None);
    }
}
