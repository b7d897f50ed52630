//! # Label Scene
//!
//! One label resolved against one row: every visible element in paint
//! order, with its content bound, text wrapped and sized, and codes
//! synthesized. The document and preview renderers both draw from a
//! [`LabelScene`], so they can only differ in scale and output sink.
//!
//! ## Units
//!
//! | Quantity | Unit |
//! |----------|------|
//! | positions, sizes, strokes | millimetres from the label's top-left |
//! | font sizes, text offsets | canvas pixels (see [`super::units`]) |
//! | rotation | degrees clockwise about the element center |
//!
//! ## Composition
//!
//! ```text
//! Design::paint_order() ──► compose_element (rayon, per element)
//!                              │ binding::resolve_*
//!                              │ text::calc_auto_fit_font_size / layout_text
//!                              │ code::generate_qr / generate_barcode
//!                              ▼
//!                         Vec<SceneItem> (element order)
//! ```

use std::sync::Arc;

use image::DynamicImage;
use rayon::prelude::*;

use super::units::{mm_to_px, px_to_mm};
use crate::binding;
use crate::code::{self, BarcodeConfig, CodeRaster, QrConfig};
use crate::design::{ColumnMapping, Design, Element, ElementKind, Rgb, Row, TextAlign, image_data};
use crate::expr::GenerationContext;
use crate::text::{self, FontMetrics, LINE_HEIGHT_FACTOR, TextStyle};

/// Baseline position inside a line box, as a fraction of the font size
/// below the top of the glyph cell.
pub const BASELINE_RATIO: f32 = 0.8;

/// Lines thinner than this are drawn at this thickness.
pub const HAIRLINE_MM: f32 = 0.2;

/// Code rasters are synthesized at this many pixels per canvas pixel.
const RASTER_OVERSAMPLE: f32 = 4.0;

/// Longest side of a synthesized code raster.
const MAX_RASTER_PX: u32 = 4096;

/// Caption font size bounds (canvas px).
const CAPTION_MIN_PX: f32 = 6.0;
const CAPTION_MAX_PX: f32 = 14.0;
const CAPTION_RATIO: f32 = 0.2;

// ============================================================================
// SCENE TYPES
// ============================================================================

/// Axis-aligned rectangle in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width_mm: f32,
    pub color: Rgb,
}

/// A composed label.
#[derive(Debug, Clone)]
pub struct LabelScene {
    pub width_mm: f32,
    pub height_mm: f32,
    pub background: Option<Rgb>,
    pub border: Option<Stroke>,
    pub border_radius_mm: f32,
    pub items: Vec<SceneItem>,
}

impl LabelScene {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_mm, self.height_mm)
    }
}

/// One drawable element.
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub id: String,
    /// Element box before rotation.
    pub rect: Rect,
    pub rotation_degrees: f32,
    pub kind: SceneKind,
}

impl SceneItem {
    pub fn is_rotated(&self) -> bool {
        self.rotation_degrees.is_finite() && self.rotation_degrees.rem_euclid(360.0) != 0.0
    }
}

#[derive(Debug, Clone)]
pub enum SceneKind {
    Text(TextBlock),
    Code(CodeBlock),
    Shape(ShapeItem),
    Line(LineItem),
    Image(ImageItem),
    /// Content that failed to synthesize or decode: a crossed box.
    Placeholder { label: String },
}

/// Wrapped, sized text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    /// Canvas pixels.
    pub font_size_px: f32,
    pub line_height_px: f32,
    pub bold: bool,
    pub color: Rgb,
    pub align: TextAlign,
    /// The text does not fit even at its minimum size.
    pub overflows: bool,
}

impl TextBlock {
    /// Baseline of line `index`, in canvas pixels below the box top.
    pub fn baseline_px(&self, index: usize) -> f32 {
        index as f32 * self.line_height_px
            + (self.line_height_px - self.font_size_px) / 2.0
            + self.font_size_px * BASELINE_RATIO
    }

    /// Top of the glyph cell of line `index`, in canvas pixels.
    pub fn cell_top_px(&self, index: usize) -> f32 {
        index as f32 * self.line_height_px + (self.line_height_px - self.font_size_px) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Offset from the box's left edge (alignment applied), canvas pixels.
    pub x_px: f32,
    pub width_px: f32,
}

/// A synthesized code placed in its element box.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    pub raster: Arc<CodeRaster>,
    /// Where the symbol is drawn (absolute mm).
    pub symbol: Rect,
    pub caption: Option<Caption>,
}

/// Human-readable line under a barcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub rect: Rect,
    pub font_size_px: f32,
}

impl Caption {
    /// Baseline in mm, the glyph cell centered in the caption strip.
    pub fn baseline_mm(&self) -> f32 {
        let size = px_to_mm(self.font_size_px);
        self.rect.y + (self.rect.height - size) / 2.0 + size * BASELINE_RATIO
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeItem {
    pub ellipse: bool,
    pub fill: Option<Rgb>,
    pub stroke: Option<Stroke>,
    pub corner_radius_mm: f32,
}

/// Horizontal line through the vertical center of its box.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub color: Rgb,
    pub thickness_mm: f32,
}

impl LineItem {
    /// The painted band inside `rect`.
    pub fn band(&self, rect: &Rect) -> Rect {
        let (_, cy) = rect.center();
        Rect::new(rect.x, cy - self.thickness_mm / 2.0, rect.width, self.thickness_mm)
    }
}

#[derive(Debug, Clone)]
pub struct ImageItem {
    pub image: Arc<DynamicImage>,
}

// ============================================================================
// COMPOSITION
// ============================================================================

/// Compose one label.
///
/// Elements are composed in parallel and collected in paint order.
/// Degenerate elements and codes with no value are left out.
pub fn compose_label(
    design: &Design,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
    metrics: &dyn FontMetrics,
) -> LabelScene {
    let order = design.paint_order();
    let items: Vec<SceneItem> = order
        .par_iter()
        .filter_map(|element| compose_element(element, row, mapping, ctx, metrics))
        .collect();

    log::debug!(
        "label {}: {} of {} elements composed",
        ctx.row_index,
        items.len(),
        design.elements.len()
    );

    LabelScene {
        width_mm: design.width_mm,
        height_mm: design.height_mm,
        background: design.background(),
        border: design.border().map(|color| Stroke {
            width_mm: design.border_width,
            color,
        }),
        border_radius_mm: design
            .border_radius
            .min(design.width_mm.min(design.height_mm) / 2.0),
        items,
    }
}

fn compose_element(
    element: &Element,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
    metrics: &dyn FontMetrics,
) -> Option<SceneItem> {
    if element.is_degenerate() {
        log::debug!("element {}: zero area, skipped", element.id);
        return None;
    }
    let rect = Rect::new(element.x, element.y, element.width, element.height);

    let kind = match &element.kind {
        ElementKind::Text(t) => {
            let content = binding::resolve_text(element, row, mapping, ctx);
            let style = if t.font_weight.is_bold() {
                TextStyle::BOLD
            } else {
                TextStyle::REGULAR
            };
            SceneKind::Text(compose_text(
                metrics,
                &content,
                &rect,
                t.font_size,
                t.text_auto_fit.then_some(t.text_min_font_size),
                style,
                t.text_align,
                t.color(),
            ))
        }
        ElementKind::Qr(q) => {
            let content = binding::resolve_code_value(element, row, mapping, ctx);
            if content.is_empty() {
                log::debug!("element {}: empty QR value, skipped", element.id);
                return None;
            }
            let side = rect.width.min(rect.height);
            let mut config = QrConfig::new(q.qr_error_level, raster_px(side));
            if let Some(logo) = q.logo() {
                config = config.with_logo(logo, q.qr_logo_size_percent.clamp(5.0, 30.0));
            }
            match code::generate_qr(&content, &config) {
                Ok(raster) => SceneKind::Code(CodeBlock {
                    raster: Arc::new(raster),
                    symbol: Rect::new(rect.x, rect.y, side, side),
                    caption: None,
                }),
                Err(e) => {
                    log::warn!("element {}: {}", element.id, e);
                    SceneKind::Placeholder { label: "QR".into() }
                }
            }
        }
        ElementKind::Barcode(b) => {
            let content = binding::resolve_code_value(element, row, mapping, ctx);
            if content.is_empty() {
                log::debug!("element {}: empty barcode value, skipped", element.id);
                return None;
            }
            let config = BarcodeConfig {
                format: b.barcode_format,
                module_px: 2,
                height_px: raster_px(rect.height).max(2),
                show_text: b.barcode_show_text,
            };
            match code::generate_barcode(&content, &config) {
                Ok(raster) => SceneKind::Code(place_barcode(raster, &rect, b.barcode_format.is_two_dimensional())),
                Err(e) => {
                    log::warn!("element {}: {}", element.id, e);
                    SceneKind::Placeholder {
                        label: b.barcode_format.name().to_string(),
                    }
                }
            }
        }
        ElementKind::Rectangle(s) | ElementKind::Circle(s) => {
            let circle = matches!(element.kind, ElementKind::Circle(_));
            let fraction = s.radius_fraction();
            SceneKind::Shape(ShapeItem {
                ellipse: circle || fraction >= 1.0,
                fill: s.fill(),
                stroke: s.stroke().map(|color| Stroke {
                    width_mm: s.border_width,
                    color,
                }),
                corner_radius_mm: fraction * rect.width.min(rect.height) / 2.0,
            })
        }
        ElementKind::Line(l) => SceneKind::Line(LineItem {
            color: l.color(),
            thickness_mm: element.height.max(HAIRLINE_MM),
        }),
        ElementKind::Image(img) => match img.data().map(image_data::decode_image) {
            Some(Ok(image)) => SceneKind::Image(ImageItem {
                image: Arc::new(image),
            }),
            Some(Err(e)) => {
                log::warn!("element {}: {}", element.id, e);
                SceneKind::Placeholder {
                    label: "IMG".into(),
                }
            }
            None => SceneKind::Placeholder {
                label: "IMG".into(),
            },
        },
    };

    Some(SceneItem {
        id: element.id.clone(),
        rect,
        rotation_degrees: element.rotation_degrees,
        kind,
    })
}

/// Wrap and size text in canvas pixels. `auto_fit_min` enables auto-fit.
#[allow(clippy::too_many_arguments)]
pub fn compose_text(
    metrics: &dyn FontMetrics,
    content: &str,
    rect: &Rect,
    font_size_px: f32,
    auto_fit_min: Option<f32>,
    style: TextStyle,
    align: TextAlign,
    color: Rgb,
) -> TextBlock {
    let box_w = mm_to_px(rect.width);
    let box_h = mm_to_px(rect.height);

    let (lines, size, overflows) = match auto_fit_min {
        Some(min) => {
            let fit = text::calc_auto_fit_font_size(metrics, content, box_w, box_h, font_size_px, min, style);
            (fit.lines, fit.font_size, fit.overflows)
        }
        None => {
            let layout = text::layout_text(metrics, content, font_size_px, style, box_w);
            let overflows = layout.height() > box_h;
            (layout.lines, font_size_px, overflows)
        }
    };

    let lines = lines
        .into_iter()
        .map(|line| {
            let width_px = metrics.text_width(&line, size, style);
            let x_px = match align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (box_w - width_px) / 2.0,
                TextAlign::Right => box_w - width_px,
            };
            TextLine {
                text: line,
                x_px,
                width_px,
            }
        })
        .collect();

    TextBlock {
        lines,
        font_size_px: size,
        line_height_px: size * LINE_HEIGHT_FACTOR,
        bold: style.bold,
        color,
        align,
        overflows,
    }
}

/// Place a barcode raster in its box: 1D codes stretch to the box width
/// with the caption underneath; 2D codes keep their aspect ratio.
fn place_barcode(raster: CodeRaster, rect: &Rect, two_dimensional: bool) -> CodeBlock {
    if two_dimensional {
        let (w, h) = (raster.image.width() as f32, raster.image.height() as f32);
        let scale = (rect.width / w).min(rect.height / h);
        return CodeBlock {
            raster: Arc::new(raster),
            symbol: Rect::new(rect.x, rect.y, w * scale, h * scale),
            caption: None,
        };
    }

    let caption = raster.caption.clone().map(|text| {
        let font_size_px = (mm_to_px(rect.height) * CAPTION_RATIO).clamp(CAPTION_MIN_PX, CAPTION_MAX_PX);
        let caption_h = px_to_mm(font_size_px * LINE_HEIGHT_FACTOR).min(rect.height / 2.0);
        Caption {
            text,
            rect: Rect::new(rect.x, rect.bottom() - caption_h, rect.width, caption_h),
            font_size_px,
        }
    });
    let bars_h = rect.height - caption.as_ref().map_or(0.0, |c| c.rect.height);

    CodeBlock {
        raster: Arc::new(raster),
        symbol: Rect::new(rect.x, rect.y, rect.width, bars_h),
        caption,
    }
}

/// Raster pixels for a length in mm, at most [`MAX_RASTER_PX`].
fn raster_px(mm: f32) -> u32 {
    (mm_to_px(mm) * RASTER_OVERSAMPLE).round().clamp(1.0, MAX_RASTER_PX as f32) as u32
}
