//! # Document Renderer
//!
//! Lays a batch of labels out on pages for sheet printers and PDF export.
//!
//! ## Page Formats
//!
//! | Format | Portrait size (mm) |
//! |--------|--------------------|
//! | `a4` | 210 × 297 |
//! | `a5` | 148 × 210 |
//! | `a6` | 105 × 148 |
//! | `letter` | 215.9 × 279.4 |
//! | `legal` | 215.9 × 355.6 |
//! | `label` | the label itself, no margins |
//!
//! Landscape swaps width and height.
//!
//! ## Grid
//!
//! ```text
//!  ┌──────────── page ────────────┐
//!  │ margin                       │
//!  │   ┌─────┐ gap ┌─────┐        │
//!  │   │  0  │     │  1  │        │   label i → page i / per_page,
//!  │   └─────┘     └─────┘        │             slot i % per_page,
//!  │     gap                      │             slots row-major
//!  │   ┌─────┐     ┌─────┐        │
//!  │   │  2  │     │  3  │        │
//!  │   └─────┘     └─────┘        │
//!  └──────────────────────────────┘
//! ```
//!
//! Without explicit `columns`/`rows`, as many labels as fit are placed:
//! `floor((available + gap) / (label + gap))`, at least one.

use serde::{Deserialize, Serialize};

use super::batch::Batch;
use super::scene::LabelScene;
use crate::error::EtiquetaError;
use crate::text::FontMetrics;

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    A6,
    Letter,
    Legal,
    /// One label per page, sized to the label.
    Label,
}

impl PageFormat {
    /// Portrait size in mm; `None` for [`PageFormat::Label`].
    pub fn size_mm(&self) -> Option<(f32, f32)> {
        match self {
            PageFormat::A4 => Some((210.0, 297.0)),
            PageFormat::A5 => Some((148.0, 210.0)),
            PageFormat::A6 => Some((105.0, 148.0)),
            PageFormat::Letter => Some((215.9, 279.4)),
            PageFormat::Legal => Some((215.9, 355.6)),
            PageFormat::Label => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page margins in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }

    fn clamped(&self) -> Self {
        let c = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            top: c(self.top),
            right: c(self.right),
            bottom: c(self.bottom),
            left: c(self.left),
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// How labels are laid out on pages. Every field has a default, so `{}` is a
/// valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub page_format: PageFormat,
    pub orientation: PageOrientation,
    pub margins: Margins,
    pub gap_x_mm: f32,
    pub gap_y_mm: f32,
    /// Fixed column count; as many as fit when absent.
    pub columns: Option<u32>,
    /// Fixed row count; as many as fit when absent.
    pub rows: Option<u32>,
    /// Consecutive copies of each label.
    pub copies: u32,
    /// PDF document title.
    pub title: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            page_format: PageFormat::default(),
            orientation: PageOrientation::default(),
            margins: Margins::default(),
            gap_x_mm: 2.0,
            gap_y_mm: 2.0,
            columns: None,
            rows: None,
            copies: 1,
            title: "Etiquetas".to_string(),
        }
    }
}

impl DocumentOptions {
    /// One label per page.
    pub fn label_pages() -> Self {
        Self {
            page_format: PageFormat::Label,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EtiquetaError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Page geometry and label slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub columns: u32,
    pub rows: u32,
    origin_x: f32,
    origin_y: f32,
    pitch_x: f32,
    pitch_y: f32,
}

impl Grid {
    /// Plan the grid for labels of `label_w × label_h` mm.
    pub fn plan(options: &DocumentOptions, label_w: f32, label_h: f32) -> Self {
        let Some((w, h)) = options.page_format.size_mm() else {
            return Self {
                page_width_mm: label_w,
                page_height_mm: label_h,
                columns: 1,
                rows: 1,
                origin_x: 0.0,
                origin_y: 0.0,
                pitch_x: label_w,
                pitch_y: label_h,
            };
        };
        let (page_w, page_h) = match options.orientation {
            PageOrientation::Portrait => (w, h),
            PageOrientation::Landscape => (h, w),
        };

        let margins = options.margins.clamped();
        let gap_x = non_negative(options.gap_x_mm);
        let gap_y = non_negative(options.gap_y_mm);
        let avail_w = page_w - margins.left - margins.right;
        let avail_h = page_h - margins.top - margins.bottom;

        // explicit counts never exceed what fits
        let fit_columns = fit_count(avail_w, label_w, gap_x);
        let fit_rows = fit_count(avail_h, label_h, gap_y);
        let mut columns = options
            .columns
            .filter(|&c| c > 0)
            .map_or(fit_columns, |c| c.min(fit_columns));
        let mut rows = options
            .rows
            .filter(|&r| r > 0)
            .map_or(fit_rows, |r| r.min(fit_rows));

        if label_w > avail_w || label_h > avail_h {
            log::warn!(
                "label {}x{} mm does not fit the {}x{} mm printable area, placed alone",
                label_w,
                label_h,
                avail_w.max(0.0),
                avail_h.max(0.0)
            );
            columns = 1;
            rows = 1;
        }

        Self {
            page_width_mm: page_w,
            page_height_mm: page_h,
            columns,
            rows,
            origin_x: margins.left,
            origin_y: margins.top,
            pitch_x: label_w + gap_x,
            pitch_y: label_h + gap_y,
        }
    }

    pub fn per_page(&self) -> usize {
        (self.columns as usize * self.rows as usize).max(1)
    }

    /// Top-left of a slot (row-major) in mm from the page's top-left.
    pub fn slot_origin(&self, slot: usize) -> (f32, f32) {
        let columns = self.columns.max(1) as usize;
        let (row, column) = (slot / columns, slot % columns);
        (
            self.origin_x + column as f32 * self.pitch_x,
            self.origin_y + row as f32 * self.pitch_y,
        )
    }
}

/// `floor((avail + gap) / (size + gap))`, at least 1.
fn fit_count(avail: f32, size: f32, gap: f32) -> u32 {
    let pitch = size + gap;
    if pitch.is_nan() || pitch <= 0.0 || !avail.is_finite() {
        return 1;
    }
    ((avail + gap) / pitch).floor().max(1.0) as u32
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// A label placed on a page.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Top-left in mm from the page's top-left.
    pub x_mm: f32,
    pub y_mm: f32,
    pub scene: LabelScene,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub width_mm: f32,
    pub height_mm: f32,
    pub labels: Vec<Placement>,
}

/// A paginated set of labels.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub grid: Grid,
    pub pages: Vec<Page>,
}

impl Document {
    /// Compose every label of `batch` and paginate it.
    pub fn from_batch(batch: &Batch<'_>, options: &DocumentOptions, metrics: &dyn FontMetrics) -> Self {
        let grid = Grid::plan(options, batch.design.width_mm, batch.design.height_mm);
        let copies = options.copies.max(1) as usize;
        let scenes = batch
            .scenes(metrics)
            .flat_map(|scene| std::iter::repeat_n(scene, copies));
        let document = Self::paginate(&options.title, grid, scenes);
        log::debug!(
            "document: {} labels on {} pages ({}x{} per page)",
            document.label_count(),
            document.pages.len(),
            grid.columns,
            grid.rows
        );
        document
    }

    /// Place scenes into slots, row-major, opening pages as needed.
    pub fn paginate(title: &str, grid: Grid, scenes: impl IntoIterator<Item = LabelScene>) -> Self {
        let per_page = grid.per_page();
        let mut pages: Vec<Page> = Vec::new();

        for (i, scene) in scenes.into_iter().enumerate() {
            let slot = i % per_page;
            if slot == 0 {
                pages.push(Page {
                    width_mm: grid.page_width_mm,
                    height_mm: grid.page_height_mm,
                    labels: Vec::with_capacity(per_page),
                });
            }
            let (x_mm, y_mm) = grid.slot_origin(slot);
            if let Some(page) = pages.last_mut() {
                page.labels.push(Placement { x_mm, y_mm, scene });
            }
        }

        Self {
            title: title.to_string(),
            grid,
            pages,
        }
    }

    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|p| p.labels.len()).sum()
    }

    /// Encode as PDF.
    pub fn to_pdf(&self) -> Result<Vec<u8>, EtiquetaError> {
        super::pdf::write_pdf(self)
    }
}
