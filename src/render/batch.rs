//! Batches: one design over many rows.
//!
//! A batch captures `now` once, so `HOY()`, `AHORA()` and `LOTE()` agree on
//! every label, and hands each row its own [`GenerationContext`]. Labels are
//! produced lazily; dropping the iterator between rows abandons the rest
//! of the batch.

use super::scene::{LabelScene, compose_label};
use crate::design::{ColumnMapping, Design, Row};
use crate::expr::GenerationContext;
use crate::text::FontMetrics;

/// A design bound to its rows.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    pub design: &'a Design,
    pub rows: &'a [Row],
    pub mapping: &'a ColumnMapping,
    base: GenerationContext,
    empty: Row,
}

impl<'a> Batch<'a> {
    /// A batch stamped with the current local time.
    pub fn new(design: &'a Design, rows: &'a [Row], mapping: &'a ColumnMapping) -> Self {
        let base = GenerationContext::for_batch(rows.len());
        Self::with_context(design, rows, mapping, base)
    }

    /// A batch with a caller-supplied context (fixed `now`, language).
    /// `batch_size` is taken from `rows`.
    pub fn with_context(
        design: &'a Design,
        rows: &'a [Row],
        mapping: &'a ColumnMapping,
        mut base: GenerationContext,
    ) -> Self {
        base.batch_size = rows.len().max(1);
        Self {
            design,
            rows,
            mapping,
            base,
            empty: Row::new(),
        }
    }

    /// Number of labels. No rows still gives one static label.
    pub fn len(&self) -> usize {
        self.rows.len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn context(&self, index: usize) -> GenerationContext {
        self.base.at_row(index)
    }

    pub fn row(&self, index: usize) -> &Row {
        self.rows.get(index).unwrap_or(&self.empty)
    }

    /// Lazily compose every label.
    pub fn scenes<'b>(&'b self, metrics: &'b dyn FontMetrics) -> impl Iterator<Item = LabelScene> + 'b {
        (0..self.len()).map(move |i| {
            compose_label(self.design, self.row(i), self.mapping, &self.context(i), metrics)
        })
    }
}
