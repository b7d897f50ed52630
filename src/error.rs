//! # Error Types
//!
//! Crate-wide error type. Most per-element problems never surface here:
//! bad expressions degrade to `#ERR#`, missing data falls back to static
//! text, and failed barcode synthesis skips the element. What remains are
//! failures that abort a whole batch (unreadable input, PDF/PNG encoding).

use thiserror::Error;

use crate::code::SynthesisError;
use crate::expr::ExprError;
use crate::render::preview::PreviewError;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// Design, rows or options could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input that cannot be clamped into something usable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Expression evaluation failed (only surfaced by strict callers)
    #[error("Expression error: {0}")]
    Expression(#[from] ExprError),

    /// Barcode/QR synthesis failed
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Preview rasterization or PNG encoding failed
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),

    /// PDF generation failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
