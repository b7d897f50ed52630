//! Per-row generation context.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Everything an expression may know besides the row itself.
///
/// `now` is captured once per batch so `HOY()`, `AHORA()` and `LOTE()` agree
/// across every label of the batch. [`GenerationContext::at_row`] derives the
/// context for a single row without touching `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Zero-based position of the row in the batch.
    #[serde(default)]
    pub row_index: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub now: NaiveDateTime,
    /// Language of the current workspace or user (`"es"`, `"en-US"`...).
    #[serde(default)]
    pub language: Option<String>,
    /// Fallback when `language` is not set.
    #[serde(default)]
    pub default_language: Option<String>,
}

fn default_batch_size() -> usize {
    1
}

impl GenerationContext {
    /// A context for row 0 of a one-row batch at a fixed instant.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            row_index: 0,
            batch_size: 1,
            now,
            language: None,
            default_language: None,
        }
    }

    /// Start a batch of `batch_size` rows, capturing the local clock once.
    pub fn for_batch(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            ..Self::new(Local::now().naive_local())
        }
    }

    /// The same batch context positioned at `row_index`.
    pub fn at_row(&self, row_index: usize) -> Self {
        Self {
            row_index,
            ..self.clone()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Effective language: explicit, then default.
    pub fn effective_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or(self.default_language.as_deref())
    }

    /// Whether numbers should use `.` as decimal separator.
    pub fn uses_decimal_point(&self) -> bool {
        self.effective_language()
            .map(|l| l.trim().to_ascii_lowercase().starts_with("en"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_at_row_keeps_now() {
        let ctx = GenerationContext::new(fixed());
        let row3 = ctx.at_row(3);
        assert_eq!(row3.row_index, 3);
        assert_eq!(row3.now, ctx.now);
    }

    #[test]
    fn test_language_fallback() {
        let ctx = GenerationContext::new(fixed()).with_default_language("en");
        assert!(ctx.uses_decimal_point());

        let ctx = ctx.with_language("es-AR");
        assert!(!ctx.uses_decimal_point());

        assert!(!GenerationContext::new(fixed()).uses_decimal_point());
    }

    #[test]
    fn test_context_from_json() {
        let ctx: GenerationContext =
            serde_json::from_str(r#"{"now": "2024-03-15T09:30:00", "language": "en"}"#).unwrap();
        assert_eq!(ctx.now, fixed());
        assert_eq!(ctx.batch_size, 1);
        assert_eq!(ctx.row_index, 0);
        assert!(ctx.uses_decimal_point());

        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"2024-03-15T09:30:00\""));
    }

    #[test]
    fn test_for_batch_minimum_size() {
        assert_eq!(GenerationContext::for_batch(0).batch_size, 1);
    }
}
