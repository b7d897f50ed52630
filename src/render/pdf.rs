//! # PDF Output
//!
//! Writes a [`Document`] with printpdf's op-based API.
//!
//! | Scene item | PDF |
//! |------------|-----|
//! | fills | `DrawPolygon`, non-zero winding |
//! | strokes | closed `DrawLine`, inset by half the stroke width |
//! | text | builtin Helvetica / Helvetica-Bold |
//! | codes, images | PNG XObjects drawn at 72 dpi (1 px = 1 pt before scaling) |
//! | rotation | `cm` matrix about the element center, inside `q`/`Q` |
//!
//! Labels are laid out in mm from the page's top-left; PDF user space is
//! points from the bottom-left. Every coordinate goes through [`PageSpace`].

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use ::image::codecs::png::PngEncoder;
use ::image::{ExtendedColorType, ImageEncoder, RgbaImage};
use printpdf::{
    BuiltinFont, Color, CurTransMat, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage,
    PdfSaveOptions, PdfWarnMsg, Point, Polygon, PolygonRing, Pt, RawImage, TextItem, WindingOrder,
    XObjectId, XObjectTransform,
};

use super::document::{Document, Placement};
use super::scene::{CodeBlock, LabelScene, Rect, SceneItem, SceneKind, ShapeItem, Stroke, TextBlock};
use super::units::{mm_to_pt, px_to_mm, px_to_pt};
use crate::design::Rgb;
use crate::error::EtiquetaError;
use crate::text::{BuiltinMetrics, FontMetrics, TextStyle};

/// Segments per quarter circle for rounded corners.
const ARC_SEGMENTS: usize = 8;
/// Segments for a full ellipse.
const ELLIPSE_SEGMENTS: usize = 48;

const PLACEHOLDER_GRAY: Rgb = Rgb::new(160, 160, 160);
const PLACEHOLDER_STROKE_MM: f32 = 0.3;

/// Encode `document` as PDF bytes.
pub fn write_pdf(document: &Document) -> Result<Vec<u8>, EtiquetaError> {
    let mut doc = PdfDocument::new(&document.title);
    let mut images = ImageCache::default();
    let mut pages = Vec::with_capacity(document.pages.len().max(1));

    for page in &document.pages {
        let mut ops = Vec::new();
        let height_pt = mm_to_pt(page.height_mm);
        for placement in &page.labels {
            draw_label(&mut ops, &mut doc, &mut images, placement, height_pt)?;
        }
        pages.push(PdfPage::new(Mm(page.width_mm), Mm(page.height_mm), ops));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(
            Mm(document.grid.page_width_mm),
            Mm(document.grid.page_height_mm),
            Vec::new(),
        ));
    }

    doc.with_pages(pages);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("pdf: {} writer warnings", warnings.len());
    }
    Ok(bytes)
}

// ============================================================================
// COORDINATES
// ============================================================================

/// Label millimetres → page points.
#[derive(Debug, Clone, Copy)]
struct PageSpace {
    height_pt: f32,
    origin_x_mm: f32,
    origin_y_mm: f32,
}

impl PageSpace {
    fn point(&self, x_mm: f32, y_mm: f32) -> Point {
        Point {
            x: Pt(mm_to_pt(self.origin_x_mm + x_mm)),
            y: Pt(self.height_pt - mm_to_pt(self.origin_y_mm + y_mm)),
        }
    }

    fn points(&self, outline: &[(f32, f32)]) -> Vec<LinePoint> {
        outline
            .iter()
            .map(|&(x, y)| LinePoint {
                p: self.point(x, y),
                bezier: false,
            })
            .collect()
    }
}

/// `cm` for a clockwise on-screen rotation about `center`. PDF's y axis
/// points up, so the matrix turns by `-degrees`.
fn rotation_about(center: &Point, degrees: f32) -> CurTransMat {
    let phi = -degrees.to_radians();
    let (sin, cos) = phi.sin_cos();
    let (cx, cy) = (center.x.0, center.y.0);
    CurTransMat::Raw([
        cos,
        sin,
        -sin,
        cos,
        cx - cos * cx + sin * cy,
        cy - sin * cx - cos * cy,
    ])
}

// ============================================================================
// OUTLINES
// ============================================================================

fn inset(rect: &Rect, by: f32) -> Rect {
    let by = by.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    Rect::new(rect.x + by, rect.y + by, rect.width - 2.0 * by, rect.height - 2.0 * by)
}

/// Rectangle outline, corners rounded by `radius` mm.
fn rect_outline(rect: &Rect, radius: f32) -> Vec<(f32, f32)> {
    let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if radius.is_nan() || radius <= 0.0 {
        return vec![
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.bottom()),
            (rect.x, rect.bottom()),
        ];
    }

    // corner centers clockwise from top-right, with each arc's start angle
    let corners = [
        (rect.right() - radius, rect.y + radius, -FRAC_PI_2),
        (rect.right() - radius, rect.bottom() - radius, 0.0),
        (rect.x + radius, rect.bottom() - radius, FRAC_PI_2),
        (rect.x + radius, rect.y + radius, 2.0 * FRAC_PI_2),
    ];
    let mut points = Vec::with_capacity(4 * (ARC_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for i in 0..=ARC_SEGMENTS {
            let a = start + FRAC_PI_2 * i as f32 / ARC_SEGMENTS as f32;
            points.push((cx + radius * a.cos(), cy + radius * a.sin()));
        }
    }
    points
}

fn ellipse_outline(rect: &Rect) -> Vec<(f32, f32)> {
    let (cx, cy) = rect.center();
    let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let a = TAU * i as f32 / ELLIPSE_SEGMENTS as f32;
            (cx + rx * a.cos(), cy + ry * a.sin())
        })
        .collect()
}

// ============================================================================
// OPS
// ============================================================================

fn pdf_color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_unit();
    Color::Rgb(printpdf::Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

fn fill(ops: &mut Vec<Op>, space: &PageSpace, outline: &[(f32, f32)], color: Rgb) {
    ops.push(Op::SetFillColor { col: pdf_color(color) });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: space.points(outline),
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn stroke(ops: &mut Vec<Op>, space: &PageSpace, outline: &[(f32, f32)], color: Rgb, width_mm: f32, closed: bool) {
    ops.push(Op::SetOutlineColor { col: pdf_color(color) });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(mm_to_pt(width_mm)),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points: space.points(outline),
            is_closed: closed,
        },
    });
}

/// Fill and stroke a rectangle or ellipse; the stroke stays inside the box.
fn shape(ops: &mut Vec<Op>, space: &PageSpace, rect: &Rect, item: &ShapeItem) {
    let outline = |r: &Rect, radius: f32| {
        if item.ellipse {
            ellipse_outline(r)
        } else {
            rect_outline(r, radius)
        }
    };
    if let Some(color) = item.fill {
        fill(ops, space, &outline(rect, item.corner_radius_mm), color);
    }
    if let Some(s) = item.stroke {
        stroke_inside(ops, space, rect, item.corner_radius_mm, &s, item.ellipse);
    }
}

fn stroke_inside(ops: &mut Vec<Op>, space: &PageSpace, rect: &Rect, radius: f32, s: &Stroke, ellipse: bool) {
    let half = s.width_mm / 2.0;
    let inner = inset(rect, half);
    let outline = if ellipse {
        ellipse_outline(&inner)
    } else {
        rect_outline(&inner, (radius - half).max(0.0))
    };
    stroke(ops, space, &outline, s.color, s.width_mm, true);
}

fn text(ops: &mut Vec<Op>, space: &PageSpace, rect: &Rect, block: &TextBlock) {
    let font = if block.bold {
        BuiltinFont::HelveticaBold
    } else {
        BuiltinFont::Helvetica
    };
    for (i, line) in block.lines.iter().enumerate() {
        if line.text.trim().is_empty() {
            continue;
        }
        let x = rect.x + px_to_mm(line.x_px);
        let y = rect.y + px_to_mm(block.baseline_px(i));
        write_text(ops, space.point(x, y), &line.text, px_to_pt(block.font_size_px), font, block.color);
    }
}

fn write_text(ops: &mut Vec<Op>, pos: Point, content: &str, size_pt: f32, font: BuiltinFont, color: Rgb) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor { pos });
    ops.push(Op::SetFontSizeBuiltinFont { size: Pt(size_pt), font });
    ops.push(Op::SetFillColor { col: pdf_color(color) });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(pdf_text(content))],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Builtin fonts only cover Latin-1 reliably: fold accents and map the rest
/// to `?`.
fn pdf_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' '..='~' => c,
            'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' | 'ª' => 'a',
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'Å' => 'A',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'º' | '°' => 'o',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            '¿' => '?',
            '¡' => '!',
            '–' | '—' => '-',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            '\u{00A0}' | '\t' => ' ',
            '€' => 'E',
            _ => '?',
        })
        .collect()
}

// ============================================================================
// IMAGES
// ============================================================================

/// XObjects keyed by the address of the shared raster, so copies of a label
/// embed their codes once.
#[derive(Default)]
struct ImageCache {
    ids: HashMap<usize, (XObjectId, u32, u32)>,
}

impl ImageCache {
    fn get_or_add(
        &mut self,
        doc: &mut PdfDocument,
        key: usize,
        rgba: impl FnOnce() -> RgbaImage,
    ) -> Result<(XObjectId, u32, u32), EtiquetaError> {
        if let Some(entry) = self.ids.get(&key) {
            return Ok(entry.clone());
        }
        let image = rgba();
        let (w, h) = image.dimensions();
        let bytes = png_bytes(&image)?;
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let raw = RawImage::decode_from_bytes(&bytes, &mut warnings).map_err(|e| EtiquetaError::Pdf(e.to_string()))?;
        let entry = (doc.add_image(&raw), w, h);
        self.ids.insert(key, entry.clone());
        Ok(entry)
    }
}

fn arc_key<T>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as usize
}

fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>, EtiquetaError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|e| EtiquetaError::Pdf(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}

/// Stretch an XObject over `rect`.
fn place_image(ops: &mut Vec<Op>, space: &PageSpace, rect: &Rect, (id, w, h): (XObjectId, u32, u32)) {
    if w == 0 || h == 0 {
        return;
    }
    let bottom_left = space.point(rect.x, rect.bottom());
    ops.push(Op::UseXobject {
        id,
        transform: XObjectTransform {
            translate_x: Some(bottom_left.x),
            translate_y: Some(bottom_left.y),
            rotate: None,
            scale_x: Some(mm_to_pt(rect.width) / w as f32),
            scale_y: Some(mm_to_pt(rect.height) / h as f32),
            dpi: Some(72.0),
        },
    });
}

// ============================================================================
// LABELS
// ============================================================================

fn draw_label(
    ops: &mut Vec<Op>,
    doc: &mut PdfDocument,
    images: &mut ImageCache,
    placement: &Placement,
    height_pt: f32,
) -> Result<(), EtiquetaError> {
    let space = PageSpace {
        height_pt,
        origin_x_mm: placement.x_mm,
        origin_y_mm: placement.y_mm,
    };
    let scene: &LabelScene = &placement.scene;
    let bounds = scene.bounds();

    if let Some(color) = scene.background {
        fill(ops, &space, &rect_outline(&bounds, scene.border_radius_mm), color);
    }

    for item in &scene.items {
        if item.is_rotated() {
            let (cx, cy) = item.rect.center();
            ops.push(Op::SaveGraphicsState);
            ops.push(Op::SetTransformationMatrix {
                matrix: rotation_about(&space.point(cx, cy), item.rotation_degrees),
            });
            draw_item(ops, doc, images, &space, item)?;
            ops.push(Op::RestoreGraphicsState);
        } else {
            draw_item(ops, doc, images, &space, item)?;
        }
    }

    if let Some(border) = scene.border {
        stroke_inside(ops, &space, &bounds, scene.border_radius_mm, &border, false);
    }
    Ok(())
}

fn draw_item(
    ops: &mut Vec<Op>,
    doc: &mut PdfDocument,
    images: &mut ImageCache,
    space: &PageSpace,
    item: &SceneItem,
) -> Result<(), EtiquetaError> {
    let rect = &item.rect;
    match &item.kind {
        SceneKind::Text(block) => text(ops, space, rect, block),
        SceneKind::Code(block) => code(ops, doc, images, space, block)?,
        SceneKind::Shape(s) => shape(ops, space, rect, s),
        SceneKind::Line(line) => fill(ops, space, &rect_outline(&line.band(rect), 0.0), line.color),
        SceneKind::Image(img) => {
            let entry = images.get_or_add(doc, arc_key(&img.image), || img.image.to_rgba8())?;
            place_image(ops, space, rect, entry);
        }
        SceneKind::Placeholder { .. } => {
            let outline = rect_outline(&inset(rect, PLACEHOLDER_STROKE_MM / 2.0), 0.0);
            stroke(ops, space, &outline, PLACEHOLDER_GRAY, PLACEHOLDER_STROKE_MM, true);
            let diagonals = [
                [(rect.x, rect.y), (rect.right(), rect.bottom())],
                [(rect.right(), rect.y), (rect.x, rect.bottom())],
            ];
            for diagonal in diagonals {
                stroke(ops, space, &diagonal, PLACEHOLDER_GRAY, PLACEHOLDER_STROKE_MM, false);
            }
        }
    }
    Ok(())
}

fn code(
    ops: &mut Vec<Op>,
    doc: &mut PdfDocument,
    images: &mut ImageCache,
    space: &PageSpace,
    block: &CodeBlock,
) -> Result<(), EtiquetaError> {
    let entry = images.get_or_add(doc, arc_key(&block.raster), || block.raster.to_rgba())?;
    place_image(ops, space, &block.symbol, entry);

    if let Some(caption) = &block.caption {
        let width_mm = px_to_mm(BuiltinMetrics.text_width(&caption.text, caption.font_size_px, TextStyle::REGULAR));
        let x = caption.rect.x + (caption.rect.width - width_mm) / 2.0;
        write_text(
            ops,
            space.point(x, caption.baseline_mm()),
            &caption.text,
            px_to_pt(caption.font_size_px),
            BuiltinFont::Helvetica,
            Rgb::BLACK,
        );
    }
    Ok(())
}
