//! The whitelisted function table.
//!
//! Adding a function means adding a [`Function`] variant; the exhaustive
//! matches in [`Function::name`] and [`Function::call`] point at the rest,
//! and the catalog test fails until it has an entry.

use chrono::{Months, TimeDelta};
use serde::Serialize;

use super::dates::{self, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT};
use super::parse::{self, Comparison};
use super::{Env, ExprError};

/// Every function an expression may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Function {
    // text
    Mayus,
    Minus,
    Recortar,
    Concat,
    Reemplazar,
    Largo,
    // dates
    Hoy,
    Ahora,
    SumarDias,
    SumarMeses,
    FormatoFecha,
    // counters
    Contador,
    Lote,
    // numbers
    Redondear,
    FormatoNum,
    // conditionals
    Si,
    Vacio,
    PorDefecto,
}

impl Function {
    pub const ALL: [Function; 18] = [
        Function::Mayus,
        Function::Minus,
        Function::Recortar,
        Function::Concat,
        Function::Reemplazar,
        Function::Largo,
        Function::Hoy,
        Function::Ahora,
        Function::SumarDias,
        Function::SumarMeses,
        Function::FormatoFecha,
        Function::Contador,
        Function::Lote,
        Function::Redondear,
        Function::FormatoNum,
        Function::Si,
        Function::Vacio,
        Function::PorDefecto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::Mayus => "MAYUS",
            Function::Minus => "MINUS",
            Function::Recortar => "RECORTAR",
            Function::Concat => "CONCAT",
            Function::Reemplazar => "REEMPLAZAR",
            Function::Largo => "LARGO",
            Function::Hoy => "HOY",
            Function::Ahora => "AHORA",
            Function::SumarDias => "SUMAR_DIAS",
            Function::SumarMeses => "SUMAR_MESES",
            Function::FormatoFecha => "FORMATO_FECHA",
            Function::Contador => "CONTADOR",
            Function::Lote => "LOTE",
            Function::Redondear => "REDONDEAR",
            Function::FormatoNum => "FORMATO_NUM",
            Function::Si => "SI",
            Function::Vacio => "VACIO",
            Function::PorDefecto => "POR_DEFECTO",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Function> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|f| f.name() == upper)
    }

    /// Accepted argument counts, inclusive.
    fn arity(&self) -> (usize, usize) {
        match self {
            Function::Mayus | Function::Minus | Function::Largo | Function::Vacio => (1, 1),
            Function::Recortar | Function::PorDefecto => (2, 2),
            Function::Reemplazar => (3, 3),
            Function::Concat => (1, usize::MAX),
            Function::Hoy | Function::Ahora | Function::Lote => (0, 1),
            Function::SumarDias | Function::SumarMeses | Function::FormatoFecha => (1, 2),
            Function::Contador => (0, 3),
            Function::Redondear | Function::FormatoNum => (1, 2),
            Function::Si => (2, 3),
        }
    }

    fn check_arity(&self, got: usize) -> Result<(), ExprError> {
        let (min, max) = self.arity();
        if got < min || got > max {
            return Err(ExprError::Arity {
                function: self.name(),
                got,
            });
        }
        Ok(())
    }

    /// Apply the function to raw (unresolved) argument sources.
    pub(crate) fn call(&self, raw: &[&str], env: &Env<'_>) -> Result<String, ExprError> {
        self.check_arity(raw.len())?;

        // SI needs its condition unresolved and only evaluates one branch.
        let args = if let Function::Si = self {
            Vec::new()
        } else {
            raw.iter()
                .map(|a| env.resolve_arg(a))
                .collect::<Result<Vec<String>, ExprError>>()?
        };
        let arg = |i: usize| args.get(i).map(String::as_str);
        let ctx = env.ctx;

        let out = match self {
            Function::Mayus => args[0].to_uppercase(),
            Function::Minus => args[0].to_lowercase(),
            Function::Recortar => {
                let n = integer(&args[1])?.max(0) as usize;
                args[0].chars().take(n).collect()
            }
            Function::Concat => args.concat(),
            Function::Reemplazar => {
                if args[1].is_empty() {
                    args[0].clone()
                } else {
                    args[0].replace(&args[1], &args[2])
                }
            }
            Function::Largo => args[0].chars().count().to_string(),
            Function::Hoy => {
                dates::format_date(&ctx.now, format_or(arg(0), DEFAULT_DATE_FORMAT))
            }
            Function::Ahora => {
                dates::format_date(&ctx.now, format_or(arg(0), DEFAULT_DATETIME_FORMAT))
            }
            Function::SumarDias => {
                let days = integer(&args[0])?;
                let shifted = TimeDelta::try_days(days)
                    .and_then(|delta| ctx.now.checked_add_signed(delta))
                    .ok_or_else(|| ExprError::InvalidDate(format!("{} days", days)))?;
                dates::format_date(&shifted, format_or(arg(1), DEFAULT_DATE_FORMAT))
            }
            Function::SumarMeses => {
                let months = integer(&args[0])?;
                let magnitude = Months::new(months.unsigned_abs().min(u32::MAX as u64) as u32);
                let shifted = if months >= 0 {
                    ctx.now.checked_add_months(magnitude)
                } else {
                    ctx.now.checked_sub_months(magnitude)
                }
                .ok_or_else(|| ExprError::InvalidDate(format!("{} months", months)))?;
                dates::format_date(&shifted, format_or(arg(1), DEFAULT_DATE_FORMAT))
            }
            Function::FormatoFecha => {
                if args.len() == 2 {
                    let parsed = dates::parse_date(&args[0])?;
                    dates::format_date(&parsed, format_or(arg(1), DEFAULT_DATE_FORMAT))
                } else {
                    dates::format_date(&ctx.now, &args[0])
                }
            }
            Function::Contador => {
                let start = optional_integer(arg(0), 1)?;
                let step = optional_integer(arg(1), 1)?;
                let pad = optional_integer(arg(2), 0)?.clamp(0, 32) as usize;
                let value = start.saturating_add(step.saturating_mul(ctx.row_index as i64));
                zero_pad(value, pad)
            }
            Function::Lote => lot_code(format_or(arg(0), "AAMMDD-####"), env),
            Function::Redondear => {
                let x = number(&args[0])?;
                let decimals = optional_integer(arg(1), 0)?.clamp(0, 10) as usize;
                format!("{:.*}", decimals, round_half_away(x, decimals))
            }
            Function::FormatoNum => {
                let x = number(&args[0])?;
                let decimals = optional_integer(arg(1), 2)?.clamp(0, 10) as usize;
                let formatted = format!("{:.*}", decimals, round_half_away(x, decimals));
                if ctx.uses_decimal_point() {
                    formatted
                } else {
                    formatted.replace('.', ",")
                }
            }
            Function::Vacio => args[0].trim().is_empty().to_string(),
            Function::PorDefecto => {
                if args[0].trim().is_empty() {
                    args[1].clone()
                } else {
                    args[0].clone()
                }
            }
            Function::Si => si(raw, env)?,
        };
        Ok(out)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn format_or<'a>(given: Option<&'a str>, default: &'a str) -> &'a str {
    match given {
        Some(f) if !f.trim().is_empty() => f,
        _ => default,
    }
}

/// Parse a number, accepting `,` as the decimal separator.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let normalized = if t.contains(',') && !t.contains('.') {
        t.replace(',', ".")
    } else {
        t.to_string()
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number(s: &str) -> Result<f64, ExprError> {
    parse_number(s).ok_or_else(|| ExprError::NotANumber(s.to_string()))
}

fn integer(s: &str) -> Result<i64, ExprError> {
    number(s).map(|n| n.trunc() as i64)
}

fn optional_integer(s: Option<&str>, default: i64) -> Result<i64, ExprError> {
    match s {
        Some(v) if !v.trim().is_empty() => integer(v),
        _ => Ok(default),
    }
}

fn zero_pad(value: i64, width: usize) -> String {
    if value < 0 {
        format!("-{:0width$}", value.unsigned_abs(), width = width.saturating_sub(1))
    } else {
        format!("{:0width$}", value, width = width)
    }
}

/// Round half away from zero at `decimals` places.
fn round_half_away(x: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    // f64::round already rounds half away from zero
    (x * factor).round() / factor
}

/// Lot code: date tokens from the batch clock, each run of `#` replaced by
/// the 1-based row number padded to the run length.
fn lot_code(pattern: &str, env: &Env<'_>) -> String {
    let sequence = env.ctx.row_index + 1;
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if ch == '#' {
            let run = rest.chars().take_while(|&c| c == '#').count();
            out.push_str(&format!("{:0run$}", sequence, run = run));
            rest = &rest[run..];
        } else if let Some(token) = dates::match_token(rest) {
            out.push_str(&dates::format_date(&env.ctx.now, token));
            rest = &rest[token.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

fn si(raw: &[&str], env: &Env<'_>) -> Result<String, ExprError> {
    let condition = raw[0];
    let holds = match parse::split_comparison(condition) {
        Some((left, op, right)) => {
            let l = env.resolve_arg(left)?;
            let r = env.resolve_arg(right)?;
            compare(&l, op, &r)
        }
        None => is_truthy(&env.resolve_arg(condition)?),
    };

    let branch = if holds { raw.get(1) } else { raw.get(2) };
    match branch {
        Some(src) => env.resolve_arg(src),
        None => Ok(String::new()),
    }
}

fn compare(left: &str, op: Comparison, right: &str) -> bool {
    use std::cmp::Ordering;

    let ordering = match (parse_number(left), parse_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.trim().cmp(right.trim()),
    };
    match op {
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Ne => ordering != Ordering::Equal,
        Comparison::Ge => ordering != Ordering::Less,
        Comparison::Le => ordering != Ordering::Greater,
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Lt => ordering == Ordering::Less,
    }
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    !(v.is_empty()
        || v == "0"
        || v.eq_ignore_ascii_case("false")
        || v.eq_ignore_ascii_case("no"))
}
