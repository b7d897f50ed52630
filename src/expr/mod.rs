//! # Template Expressions
//!
//! Bindings may embed `{{...}}` spans that are evaluated against the current
//! row and a [`GenerationContext`]:
//!
//! ```text
//! "Lote {{LOTE(AAMM-####)}} · {{MAYUS(producto) || \"SIN NOMBRE\"}}"
//! ```
//!
//! ## Grammar
//!
//! ```text
//! span       := "{{" expression "}}"
//! expression := term ( "||" expression )?
//! term       := call | quoted | column
//! call       := NAME "(" [ arg ( "," arg )* ] ")"
//! arg        := quoted | number | call | column | literal
//! ```
//!
//! - Templates without `{{` are returned untouched.
//! - `a || b` yields `a` unless it is empty or failed, then `b`.
//! - Function names are case-insensitive and must be in [`Function`].
//! - Columns are looked up exactly, then case-insensitively; missing → `""`.
//! - Any failure inside a span replaces only that span with `#ERR#`.

pub mod catalog;
mod context;
mod dates;
mod functions;
mod parse;

pub use catalog::{Category, FUNCTION_CATALOG, FunctionInfo};
pub use context::GenerationContext;
pub use functions::Function;

use thiserror::Error;

use crate::design::Row;

/// Placeholder emitted for a span that failed to evaluate.
pub const ERROR_MARKER: &str = "#ERR#";

/// Errors raised while evaluating a single `{{...}}` span.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("malformed expression: {0}")]
    Malformed(String),

    #[error("{function}: wrong number of arguments ({got})")]
    Arity { function: &'static str, got: usize },

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

/// Evaluate every `{{...}}` span in `template`.
///
/// Spans are replaced left to right; replacement text is never re-scanned.
/// An unterminated `{{` is kept as literal text.
pub fn evaluate(template: &str, row: &Row, ctx: &GenerationContext) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    let env = Env { row, ctx };
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = parse::find_span_end(body) else {
            out.push_str(&rest[start..]);
            return out;
        };

        match env.resolve_expression(&body[..end]) {
            Ok(value) => out.push_str(&value),
            Err(e) => {
                log::debug!("expression {:?} failed: {}", &body[..end], e);
                out.push_str(ERROR_MARKER);
            }
        }
        rest = &body[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Evaluate a single expression (the inside of a span) strictly.
pub fn evaluate_expression(
    expression: &str,
    row: &Row,
    ctx: &GenerationContext,
) -> Result<String, ExprError> {
    Env { row, ctx }.resolve_expression(expression)
}

/// Whether a binding is an expression template rather than a column name.
pub fn is_template(binding: &str) -> bool {
    binding.contains("{{")
}

/// Evaluation environment for one span.
pub(crate) struct Env<'a> {
    pub row: &'a Row,
    pub ctx: &'a GenerationContext,
}

impl Env<'_> {
    fn resolve_expression(&self, expr: &str) -> Result<String, ExprError> {
        let expr = expr.trim();

        if let Some((left, right)) = parse::split_default(expr) {
            if let Ok(value) = self.resolve_expression(left) {
                if !value.trim().is_empty() && value != ERROR_MARKER {
                    return Ok(value);
                }
            }
            return self.resolve_expression(right);
        }

        if let Some(literal) = parse::unquote(expr) {
            return Ok(literal.to_string());
        }

        if expr.contains('(') {
            return self.call(expr);
        }

        Ok(self.lookup(expr).unwrap_or_default().to_string())
    }

    fn call(&self, expr: &str) -> Result<String, ExprError> {
        let call = parse::parse_call(expr)?;
        let function = Function::from_name(call.name)
            .ok_or_else(|| ExprError::UnknownFunction(call.name.to_string()))?;
        function.call(&call.args, self)
    }

    /// Column lookup: exact key, then case-insensitive.
    fn lookup(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(v) = self.row.get(key) {
            return Some(v.as_str());
        }
        self.row
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Resolve one function argument.
    pub(crate) fn resolve_arg(&self, raw: &str) -> Result<String, ExprError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(String::new());
        }
        if let Some(literal) = parse::unquote(raw) {
            return Ok(literal.to_string());
        }
        if functions::parse_number(raw).is_some() && !raw.contains(char::is_whitespace) {
            return Ok(raw.to_string());
        }
        if parse::looks_like_call(raw) {
            return self.call(raw);
        }
        Ok(self.lookup(raw).unwrap_or(raw).to_string())
    }
}
