//! # Preview Renderer
//!
//! Rasterizes one label for on-screen display. The preview draws the same
//! [`LabelScene`] the document renderer writes to PDF, so the two can only
//! differ in scale and sink.
//!
//! ## Scale
//!
//! ```text
//! px_per_mm = min(panel_w / width_mm, panel_h / height_mm, max_zoom × 96 / 25.4)
//! ```
//!
//! Font sizes in the scene are canvas pixels; on screen they are multiplied
//! by the zoom (`px_per_mm / PX_PER_MM`).
//!
//! ## Rasterization
//!
//! Each item is painted into its own layer in item-local device pixels,
//! then composited onto the paper. Rotated layers are composited by inverse
//! mapping about the item center.
//!
//! Text uses the Spleen 12×24 bitmap font scaled to the font size (each
//! glyph centered in its Helvetica advance), or real outlines when a
//! TrueType face is supplied.

use std::collections::HashMap;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use spleen_font::{FONT_12X24, PSF2Font};
use thiserror::Error;

use super::scene::{LabelScene, Rect, SceneItem, SceneKind, ShapeItem, Stroke, TextBlock, compose_label};
use super::units::PX_PER_MM;
use crate::design::{ColumnMapping, Design, Rgb, Row};
use crate::expr::GenerationContext;
use crate::text::{BuiltinMetrics, FontMetrics, TextStyle, TtfMetrics};

/// Errors that can occur during preview rendering.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    #[error("Font error: {0}")]
    Font(String),
}

/// Spleen glyph cell.
const GLYPH_W: usize = 12;
const GLYPH_H: usize = 24;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PLACEHOLDER_GRAY: Rgb = Rgb::new(160, 160, 160);
const PLACEHOLDER_STROKE_MM: f32 = 0.3;

// ============================================================================
// OPTIONS
// ============================================================================

/// Preview panel. Deserializes from `{}` with the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    pub panel_width_px: u32,
    pub panel_height_px: u32,
    /// Largest zoom relative to the 96 dpi canvas.
    pub max_zoom: f32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            panel_width_px: 640,
            panel_height_px: 480,
            max_zoom: 4.0,
        }
    }
}

impl PreviewOptions {
    /// Device pixels per millimetre for a label.
    pub fn px_per_mm(&self, width_mm: f32, height_mm: f32) -> f32 {
        let cap = if self.max_zoom.is_finite() && self.max_zoom > 0.0 {
            self.max_zoom * PX_PER_MM
        } else {
            PX_PER_MM
        };
        let fit = (self.panel_width_px as f32 / width_mm).min(self.panel_height_px as f32 / height_mm);
        let scale = fit.min(cap);
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            PX_PER_MM
        }
    }
}

// ============================================================================
// FRAME
// ============================================================================

/// Device-pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PxRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PxRect {
    fn contains_rounded(&self, px: f32, py: f32, radius: f32) -> bool {
        if px < self.x || py < self.y || px > self.x + self.width || py > self.y + self.height {
            return false;
        }
        let radius = radius.min(self.width / 2.0).min(self.height / 2.0);
        if radius <= 0.0 {
            return true;
        }
        let nx = px.clamp(self.x + radius, self.x + self.width - radius);
        let ny = py.clamp(self.y + radius, self.y + self.height - radius);
        (px - nx).powi(2) + (py - ny).powi(2) <= radius * radius
    }

    fn contains_ellipse(&self, px: f32, py: f32) -> bool {
        let rx = self.width / 2.0;
        let ry = self.height / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (px - self.x - rx) / rx;
        let dy = (py - self.y - ry) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn inset(&self, by: f32) -> PxRect {
        let by = by.min(self.width / 2.0).min(self.height / 2.0).max(0.0);
        PxRect {
            x: self.x + by,
            y: self.y + by,
            width: self.width - 2.0 * by,
            height: self.height - 2.0 * by,
        }
    }
}

/// One label at device scale.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub scene: LabelScene,
    pub px_per_mm: f32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Compose and scale one label for the preview panel.
pub fn render_preview(
    design: &Design,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
    options: &PreviewOptions,
    metrics: &dyn FontMetrics,
) -> PreviewFrame {
    PreviewFrame::new(compose_label(design, row, mapping, ctx, metrics), options)
}

impl PreviewFrame {
    pub fn new(scene: LabelScene, options: &PreviewOptions) -> Self {
        let px_per_mm = options.px_per_mm(scene.width_mm, scene.height_mm);
        Self {
            width_px: (scene.width_mm * px_per_mm).round().max(1.0) as u32,
            height_px: (scene.height_mm * px_per_mm).round().max(1.0) as u32,
            px_per_mm,
            scene,
        }
    }

    /// Device pixels per canvas pixel.
    pub fn zoom(&self) -> f32 {
        self.px_per_mm / PX_PER_MM
    }

    /// A scene rectangle (mm) in device pixels.
    pub fn rect_px(&self, rect: &Rect) -> PxRect {
        PxRect {
            x: rect.x * self.px_per_mm,
            y: rect.y * self.px_per_mm,
            width: rect.width * self.px_per_mm,
            height: rect.height * self.px_per_mm,
        }
    }

    /// Screen font size of a text block.
    pub fn font_size_px(&self, block: &TextBlock) -> f32 {
        block.font_size_px * self.zoom()
    }

    /// Rasterize with the Spleen bitmap font.
    pub fn to_image(&self) -> Result<RgbaImage, PreviewError> {
        let mut glyphs = Glyphs::spleen(&self.scene)?;
        Ok(self.rasterize(&mut glyphs))
    }

    /// Rasterize with TrueType outlines.
    pub fn to_image_with_font(&self, font: &TtfMetrics) -> RgbaImage {
        self.rasterize(&mut Glyphs::Ttf(font))
    }

    pub fn to_png(&self) -> Result<Vec<u8>, PreviewError> {
        encode_png(&self.to_image()?)
    }

    fn rasterize(&self, glyphs: &mut Glyphs<'_>) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width_px, self.height_px, PAPER);
        let bounds = self.rect_px(&self.scene.bounds());
        let radius = self.scene.border_radius_mm * self.px_per_mm;

        if let Some(color) = self.scene.background {
            fill_where(&mut canvas, &bounds, color, |x, y| bounds.contains_rounded(x, y, radius));
        }

        for item in &self.scene.items {
            self.paint_item(&mut canvas, item, glyphs);
        }

        if let Some(border) = self.scene.border {
            let width = border.width_mm * self.px_per_mm;
            stroke_inside(&mut canvas, &bounds, radius, width, border.color, false);
        }
        canvas
    }

    /// Paint `item` into a local layer and composite it.
    fn paint_item(&self, canvas: &mut RgbaImage, item: &SceneItem, glyphs: &mut Glyphs<'_>) {
        // lines may be thicker than their box
        let area = match &item.kind {
            SceneKind::Line(line) => line.band(&item.rect),
            _ => item.rect,
        };
        let (cx, cy) = item.rect.center();
        let center = (cx * self.px_per_mm, cy * self.px_per_mm);
        let rotation = item.is_rotated().then_some((center, item.rotation_degrees));

        // the layer only covers what can land on the canvas
        let Some(visible) = visible_part(&self.rect_px(&area), canvas, rotation) else {
            return;
        };
        let w = visible.width.ceil().max(1.0) as u32;
        let h = visible.height.ceil().max(1.0) as u32;
        let mut layer = RgbaImage::new(w, h);
        let local = |rect: &Rect| PxRect {
            x: rect.x * self.px_per_mm - visible.x,
            y: rect.y * self.px_per_mm - visible.y,
            width: rect.width * self.px_per_mm,
            height: rect.height * self.px_per_mm,
        };
        let full = local(&area);

        match &item.kind {
            SceneKind::Text(block) => self.paint_text(&mut layer, (full.x, full.y), block, glyphs),
            SceneKind::Code(block) => {
                let symbol = local(&block.symbol);
                blit(&mut layer, &block.raster.to_rgba(), &symbol, FilterType::Nearest);
                if let Some(caption) = &block.caption {
                    let size = caption.font_size_px * self.zoom();
                    let strip = local(&caption.rect);
                    let width = glyphs.measure(&caption.text, size, false, self.zoom());
                    let baseline = caption.baseline_mm() * self.px_per_mm - visible.y;
                    glyphs.draw_line(
                        &mut layer,
                        &caption.text,
                        strip.x + (strip.width - width) / 2.0,
                        baseline,
                        size,
                        false,
                        Rgb::BLACK,
                        self.zoom(),
                    );
                }
            }
            SceneKind::Shape(shape) => self.paint_shape(&mut layer, &full, shape),
            SceneKind::Line(line) => fill_where(&mut layer, &full, line.color, |_, _| true),
            SceneKind::Image(img) => {
                blit(&mut layer, &img.image.to_rgba8(), &full, FilterType::Triangle);
            }
            SceneKind::Placeholder { .. } => {
                let stroke = (PLACEHOLDER_STROKE_MM * self.px_per_mm).max(1.0);
                stroke_inside(&mut layer, &full, 0.0, stroke, PLACEHOLDER_GRAY, false);
                let (x0, y0) = (full.x, full.y);
                let (x1, y1) = (full.x + full.width, full.y + full.height);
                stroke_segment(&mut layer, (x0, y0), (x1, y1), stroke, PLACEHOLDER_GRAY);
                stroke_segment(&mut layer, (x1, y0), (x0, y1), stroke, PLACEHOLDER_GRAY);
            }
        }

        match rotation {
            Some((center, degrees)) => composite_rotated(canvas, &layer, &visible, center, degrees),
            None => imageops::overlay(canvas, &layer, visible.x.round() as i64, visible.y.round() as i64),
        }
    }

    /// Text lines of `block`, its box top-left at `origin` in the layer.
    fn paint_text(&self, layer: &mut RgbaImage, origin: (f32, f32), block: &TextBlock, glyphs: &mut Glyphs<'_>) {
        let zoom = self.zoom();
        let size = block.font_size_px * zoom;
        for (i, line) in block.lines.iter().enumerate() {
            glyphs.draw_line(
                layer,
                &line.text,
                origin.0 + line.x_px * zoom,
                origin.1 + block.baseline_px(i) * zoom,
                size,
                block.bold,
                block.color,
                zoom,
            );
        }
    }

    fn paint_shape(&self, layer: &mut RgbaImage, full: &PxRect, shape: &ShapeItem) {
        let radius = shape.corner_radius_mm * self.px_per_mm;
        if let Some(color) = shape.fill {
            if shape.ellipse {
                fill_where(layer, full, color, |x, y| full.contains_ellipse(x, y));
            } else {
                fill_where(layer, full, color, |x, y| full.contains_rounded(x, y, radius));
            }
        }
        if let Some(Stroke { width_mm, color }) = shape.stroke {
            let width = (width_mm * self.px_per_mm).max(1.0);
            stroke_inside(layer, full, radius, width, color, shape.ellipse);
        }
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PreviewError> {
    let mut png_bytes = Vec::new();
    PngEncoder::new(&mut png_bytes)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|e: image::ImageError| PreviewError::ImageEncode(e.to_string()))?;
    Ok(png_bytes)
}

// ============================================================================
// PIXELS
// ============================================================================

/// Source-over blend of `color` at `alpha` onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = a + dst_a * (1.0 - a);
    for (i, &c) in color.iter().enumerate() {
        let mixed = (c as f32 * a + dst.0[i] as f32 * dst_a * (1.0 - a)) / out_a;
        dst.0[i] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

fn rgb(color: Rgb) -> [u8; 3] {
    [color.r, color.g, color.b]
}

/// Paint every pixel of `area` whose center passes `inside`.
fn fill_where(img: &mut RgbaImage, area: &PxRect, color: Rgb, inside: impl Fn(f32, f32) -> bool) {
    let x0 = area.x.floor().max(0.0) as u32;
    let y0 = area.y.floor().max(0.0) as u32;
    let x1 = ((area.x + area.width).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((area.y + area.height).ceil().max(0.0) as u32).min(img.height());
    let c = rgb(color);
    for y in y0..y1 {
        for x in x0..x1 {
            if inside(x as f32 + 0.5, y as f32 + 0.5) {
                blend(img.get_pixel_mut(x, y), c, 1.0);
            }
        }
    }
}

/// Ring between the outline and the outline inset by `width`.
fn stroke_inside(img: &mut RgbaImage, area: &PxRect, radius: f32, width: f32, color: Rgb, ellipse: bool) {
    let inner = area.inset(width);
    let inner_radius = (radius - width).max(0.0);
    fill_where(img, area, color, |x, y| {
        if ellipse {
            area.contains_ellipse(x, y) && !inner.contains_ellipse(x, y)
        } else {
            area.contains_rounded(x, y, radius) && !inner.contains_rounded(x, y, inner_radius)
        }
    });
}

fn stroke_segment(img: &mut RgbaImage, (x0, y0): (f32, f32), (x1, y1): (f32, f32), width: f32, color: Rgb) {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return;
    }
    let half = width / 2.0;
    let area = PxRect {
        x: x0.min(x1) - half,
        y: y0.min(y1) - half,
        width: dx.abs() + width,
        height: dy.abs() + width,
    };
    fill_where(img, &area, color, |px, py| {
        let t = (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0);
        let (nx, ny) = (x0 + t * dx, y0 + t * dy);
        (px - nx).powi(2) + (py - ny).powi(2) <= half * half
    });
}

/// Part of `area` that can reach the canvas, in canvas pixels before
/// rotation. `rotation` is the item's center and clockwise angle.
fn visible_part(area: &PxRect, canvas: &RgbaImage, rotation: Option<((f32, f32), f32)>) -> Option<PxRect> {
    let (cw, ch) = (canvas.width() as f32, canvas.height() as f32);
    let (min_x, min_y, max_x, max_y) = match rotation {
        None => (0.0, 0.0, cw, ch),
        Some(((cx, cy), degrees)) => {
            // canvas corners rotated back into the item's frame
            let (sin, cos) = degrees.to_radians().sin_cos();
            [(0.0, 0.0), (cw, 0.0), (0.0, ch), (cw, ch)]
                .map(|(x, y)| {
                    let (dx, dy) = (x - cx, y - cy);
                    (cx + dx * cos + dy * sin, cy - dx * sin + dy * cos)
                })
                .iter()
                .fold(
                    (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
                    |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                )
        }
    };
    let x0 = area.x.max(min_x.floor());
    let y0 = area.y.max(min_y.floor());
    let x1 = (area.x + area.width).min(max_x.ceil());
    let y1 = (area.y + area.height).min(max_y.ceil());
    (x1 > x0 && y1 > y0).then(|| PxRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Scale `src` into `area` and composite it. Only the window of `src` that
/// lands inside the layer is resampled.
fn blit(layer: &mut RgbaImage, src: &RgbaImage, area: &PxRect, filter: FilterType) {
    if area.width <= 0.0 || area.height <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let x0 = area.x.round().max(0.0);
    let y0 = area.y.round().max(0.0);
    let x1 = (area.x + area.width).round().min(layer.width() as f32);
    let y1 = (area.y + area.height).round().min(layer.height() as f32);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let (sx, sy) = (src.width() as f32 / area.width, src.height() as f32 / area.height);
    let wx0 = (((x0 - area.x) * sx).floor().max(0.0) as u32).min(src.width() - 1);
    let wy0 = (((y0 - area.y) * sy).floor().max(0.0) as u32).min(src.height() - 1);
    let wx1 = (((x1 - area.x) * sx).ceil().max(0.0) as u32).clamp(wx0 + 1, src.width());
    let wy1 = (((y1 - area.y) * sy).ceil().max(0.0) as u32).clamp(wy0 + 1, src.height());
    let window = imageops::crop_imm(src, wx0, wy0, wx1 - wx0, wy1 - wy0).to_image();

    let scaled = imageops::resize(&window, (x1 - x0) as u32, (y1 - y0) as u32, filter);
    imageops::overlay(layer, &scaled, x0 as i64, y0 as i64);
}

/// Composite `layer` (covering `area` before rotation) rotated clockwise by
/// `degrees` about `center`, sampling by inverse mapping.
fn composite_rotated(canvas: &mut RgbaImage, layer: &RgbaImage, area: &PxRect, center: (f32, f32), degrees: f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (cx, cy) = center;

    // bounding box of the rotated corners
    let corners = [
        (area.x, area.y),
        (area.x + area.width, area.y),
        (area.x, area.y + area.height),
        (area.x + area.width, area.y + area.height),
    ]
    .map(|(x, y)| {
        let (dx, dy) = (x - cx, y - cy);
        (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    });
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = (corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as u32).min(canvas.width());
    let max_y = (corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as u32).min(canvas.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            // rotate back by -degrees into the layer
            let lx = cx + dx * cos + dy * sin - area.x;
            let ly = cy - dx * sin + dy * cos - area.y;
            if lx < 0.0 || ly < 0.0 {
                continue;
            }
            let (sx, sy) = (lx as u32, ly as u32);
            if sx >= layer.width() || sy >= layer.height() {
                continue;
            }
            let src = layer.get_pixel(sx, sy).0;
            if src[3] > 0 {
                blend(canvas.get_pixel_mut(x, y), [src[0], src[1], src[2]], src[3] as f32 / 255.0);
            }
        }
    }
}

// ============================================================================
// GLYPHS
// ============================================================================

enum Glyphs<'a> {
    /// 12×24 bitmaps for every character in the scene; `None` when Spleen
    /// has no glyph.
    Spleen(HashMap<char, Option<Vec<bool>>>),
    Ttf(&'a TtfMetrics),
}

impl Glyphs<'_> {
    fn spleen(scene: &LabelScene) -> Result<Self, PreviewError> {
        let mut font = PSF2Font::new(FONT_12X24).map_err(|_| PreviewError::Font("spleen 12x24".into()))?;
        let mut cache = HashMap::new();

        let texts = scene.items.iter().flat_map(|item| match &item.kind {
            SceneKind::Text(block) => block.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
            SceneKind::Code(block) => block.caption.iter().map(|c| c.text.as_str()).collect(),
            _ => Vec::new(),
        });
        for text in texts {
            for ch in text.chars() {
                cache.entry(ch).or_insert_with(|| {
                    let mut utf8 = [0u8; 4];
                    font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()).map(|glyph| {
                        let mut bits = vec![false; GLYPH_W * GLYPH_H];
                        for (row_y, row) in glyph.enumerate() {
                            for (col_x, on) in row.enumerate() {
                                if row_y < GLYPH_H && col_x < GLYPH_W {
                                    bits[row_y * GLYPH_W + col_x] = on;
                                }
                            }
                        }
                        bits
                    })
                });
            }
        }
        Ok(Glyphs::Spleen(cache))
    }

    /// Advance width of `text` in device px.
    fn measure(&self, text: &str, size: f32, bold: bool, zoom: f32) -> f32 {
        let style = if bold { TextStyle::BOLD } else { TextStyle::REGULAR };
        match self {
            Glyphs::Spleen(_) => BuiltinMetrics.text_width(text, size / zoom, style) * zoom,
            Glyphs::Ttf(font) => font.text_width(text, size, style),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_line(
        &mut self,
        layer: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        zoom: f32,
    ) {
        if size <= 0.0 || text.is_empty() {
            return;
        }
        let style = if bold { TextStyle::BOLD } else { TextStyle::REGULAR };
        match self {
            Glyphs::Spleen(cache) => {
                let cell_top = baseline - size * super::scene::BASELINE_RATIO;
                let cell_w = size / 2.0;
                let smear = if bold { (size / 16.0).round().max(1.0) as u32 } else { 0 };
                let mut caret = x;
                for ch in text.chars() {
                    let advance = BuiltinMetrics.text_width(ch.encode_utf8(&mut [0u8; 4]), size / zoom, style) * zoom;
                    let left = caret + (advance - cell_w) / 2.0;
                    match cache.get(&ch) {
                        Some(Some(bits)) => draw_bitmap(layer, bits, left, cell_top, cell_w, size, smear, color),
                        Some(None) | None if !ch.is_whitespace() => {
                            let cell = PxRect {
                                x: left,
                                y: cell_top,
                                width: cell_w,
                                height: size,
                            };
                            stroke_inside(layer, &cell, 0.0, (size / 24.0).max(1.0), color, false);
                        }
                        _ => {}
                    }
                    caret += advance;
                }
            }
            Glyphs::Ttf(metrics) => draw_outlines(layer, metrics, text, x, baseline, size, style, color),
        }
    }
}

/// Nearest-neighbor scale of a 12×24 glyph into a `w × h` cell.
#[allow(clippy::too_many_arguments)]
fn draw_bitmap(layer: &mut RgbaImage, bits: &[bool], left: f32, top: f32, w: f32, h: f32, smear: u32, color: Rgb) {
    let c = rgb(color);
    let (cols, rows) = (w.round().max(1.0) as i64, h.round().max(1.0) as i64);
    let (ox, oy) = (left.round() as i64, top.round() as i64);
    // only cells that can touch the layer
    let (lw, lh) = (layer.width() as i64, layer.height() as i64);
    for dy in (-oy).max(0)..rows.min(lh - oy) {
        let sy = (dy as usize * GLYPH_H) / rows as usize;
        for dx in (-ox - smear as i64).max(0)..cols.min(lw - ox) {
            let sx = (dx as usize * GLYPH_W) / cols as usize;
            if !bits[sy.min(GLYPH_H - 1) * GLYPH_W + sx.min(GLYPH_W - 1)] {
                continue;
            }
            for s in 0..=smear as i64 {
                let (x, y) = (ox + dx + s, oy + dy);
                if x >= 0 && y >= 0 && (x as u32) < layer.width() && (y as u32) < layer.height() {
                    blend(layer.get_pixel_mut(x as u32, y as u32), c, 1.0);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_outlines(
    layer: &mut RgbaImage,
    metrics: &TtfMetrics,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    style: TextStyle,
    color: Rgb,
) {
    use ab_glyph::{Font, ScaleFont};

    let font = metrics.font(style);
    let scale = TtfMetrics::px_scale(font, size);
    let scaled = font.as_scaled(scale);
    let c = rgb(color);
    let (width, height) = (layer.width() as i32, layer.height() as i32);

    let mut caret = x;
    let mut previous = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let off_layer = bounds.max.x < 0.0
                || bounds.max.y < 0.0
                || bounds.min.x >= width as f32
                || bounds.min.y >= height as f32;
            if off_layer {
                caret += scaled.h_advance(id);
                previous = Some(id);
                continue;
            }
            outlined.draw(|px, py, coverage| {
                let gx = px as i32 + bounds.min.x as i32;
                let gy = py as i32 + bounds.min.y as i32;
                if gx >= 0 && gx < width && gy >= 0 && gy < height {
                    blend(layer.get_pixel_mut(gx as u32, gy as u32), c, coverage);
                }
            });
        }
        caret += scaled.h_advance(id);
        previous = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Element, ElementKind, LineElement, Paint, QrElement, ShapeElement, TextElement};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn frame(design: &Design, options: &PreviewOptions) -> PreviewFrame {
        let now = NaiveDate::from_ymd_opt(2024, 1, 31)
            .and_then(|d| d.and_hms_opt(8, 5, 0))
            .unwrap();
        render_preview(
            design,
            &Row::new(),
            &ColumnMapping::new(),
            &GenerationContext::new(now),
            options,
            &BuiltinMetrics,
        )
    }

    fn dark(img: &RgbaImage, x: u32, y: u32) -> bool {
        let p = img.get_pixel(x, y).0;
        p[0] < 128 && p[1] < 128 && p[2] < 128
    }

    #[test]
    fn test_scale_fits_panel() {
        let options = PreviewOptions::default();
        // 640 / 100 = 6.4 < 480 / 50 = 9.6 < 4 × 3.78
        assert!((options.px_per_mm(100.0, 50.0) - 6.4).abs() < 1e-4);
        // tiny labels are capped by max_zoom
        assert!((options.px_per_mm(10.0, 10.0) - 4.0 * PX_PER_MM).abs() < 1e-3);
    }

    #[test]
    fn test_options_from_empty_json() {
        let options: PreviewOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PreviewOptions::default());
    }

    #[test]
    fn test_frame_size() {
        let f = frame(&Design::new(100.0, 50.0), &PreviewOptions::default());
        assert_eq!((f.width_px, f.height_px), (640, 320));
        let img = f.to_image().unwrap();
        assert_eq!(img.dimensions(), (640, 320));
        assert_eq!(*img.get_pixel(10, 10), PAPER);
    }

    #[test]
    fn test_filled_rectangle() {
        let design = Design::new(100.0, 50.0).with_element(Element::new(
            "r",
            10.0,
            10.0,
            20.0,
            10.0,
            ElementKind::Rectangle(ShapeElement {
                background_color: Paint::solid(Rgb::BLACK),
                ..ShapeElement::default()
            }),
        ));
        let img = frame(&design, &PreviewOptions::default()).to_image().unwrap();
        // 6.4 px/mm: rect spans 64..192 × 64..128
        assert!(dark(&img, 100, 90));
        assert!(!dark(&img, 40, 90));
        assert!(!dark(&img, 100, 140));
    }

    #[test]
    fn test_oversized_items_are_clipped_to_canvas() {
        let black = ShapeElement {
            background_color: Paint::solid(Rgb::BLACK),
            ..ShapeElement::default()
        };
        let design = Design::new(100.0, 50.0)
            .with_element(Element::new(
                "big",
                -2000.0,
                -2000.0,
                2050.0,
                2030.0,
                ElementKind::Rectangle(black.clone()),
            ))
            .with_element(
                Element::new("spun", -1000.0, 40.0, 3000.0, 4.0, ElementKind::Rectangle(black)).rotated(90.0),
            );
        let img = frame(&design, &PreviewOptions::default()).to_image().unwrap();
        assert_eq!(img.dimensions(), (640, 320));
        // first rect ends at (50, 30) mm = (320, 192) px
        assert!(dark(&img, 10, 10));
        assert!(dark(&img, 310, 180));
        assert!(!dark(&img, 600, 200));
        // second rect turns about (500, 42) mm, far right of the canvas
        assert!(!dark(&img, 600, 300));
    }

    #[test]
    fn test_rotated_line_is_vertical() {
        let design = Design::new(100.0, 50.0).with_element(
            Element::new("l", 30.0, 24.0, 40.0, 2.0, ElementKind::Line(LineElement::default())).rotated(90.0),
        );
        let img = frame(&design, &PreviewOptions::default()).to_image().unwrap();
        // center (50, 25) mm = (320, 160) px; after rotation it spans y 32..288
        assert!(dark(&img, 320, 60));
        assert!(dark(&img, 320, 260));
        assert!(!dark(&img, 150, 160));
    }

    #[test]
    fn test_qr_and_text_paint_ink() {
        let design = Design::new(50.0, 30.0)
            .with_element(Element::new(
                "qr",
                2.0,
                2.0,
                20.0,
                20.0,
                ElementKind::Qr(QrElement {
                    text_content: "ABC123".into(),
                    ..QrElement::default()
                }),
            ))
            .with_element(Element::new(
                "t",
                25.0,
                2.0,
                20.0,
                10.0,
                ElementKind::Text(TextElement {
                    text_content: "HOLA".into(),
                    font_size: 24.0,
                    ..TextElement::default()
                }),
            ));
        let f = frame(&design, &PreviewOptions::default());
        let img = f.to_image().unwrap();
        let ink = |x0: u32, x1: u32| {
            (x0..x1)
                .flat_map(|x| (0..img.height()).map(move |y| (x, y)))
                .filter(|&(x, y)| dark(&img, x, y))
                .count()
        };
        let split = (24.0 * f.px_per_mm) as u32;
        assert!(ink(0, split) > 100);
        assert!(ink(split, img.width()) > 20);
    }

    #[test]
    fn test_png_signature() {
        let png = frame(&Design::new(20.0, 10.0), &PreviewOptions::default()).to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_font_size_scales_with_zoom() {
        let design = Design::new(100.0, 50.0).with_element(Element::new(
            "t",
            0.0,
            0.0,
            100.0,
            20.0,
            ElementKind::Text(TextElement {
                text_content: "x".into(),
                ..TextElement::default()
            }),
        ));
        let f = frame(&design, &PreviewOptions::default());
        let SceneKind::Text(block) = &f.scene.items[0].kind else {
            panic!("expected text");
        };
        assert!((f.font_size_px(block) - 16.0 * 6.4 / PX_PER_MM).abs() < 1e-3);
    }
}
