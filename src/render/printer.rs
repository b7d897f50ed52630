//! # Printer Command Renderer
//!
//! Turns a design and a row into a ZPL label. Printers draw text, codes and
//! shapes natively, so this renderer only converts geometry to dots and
//! picks commands; the only raster it sends is for photos and logos.
//!
//! ## Output
//!
//! ```text
//! ^XA
//! ^CI28
//! ^PW400
//! ^LL240
//! ^LH0,0
//! ^FO40,40        ┐
//! ^A0N,24,24      │ text element
//! ^FB320,1,0,L,0  │
//! ^FDHola^FS      ┘
//! ^XZ
//! ```
//!
//! One command per line; labels of a batch are joined with newlines.
//!
//! ## Rotation
//!
//! ZPL only knows quarter turns. Angles are quantized with
//! [`Orientation::from_degrees`]; sideways fields (90°/270°) swap their
//! width and height around the element's center so the field stays where
//! the design shows it. Lines at other angles use a diagonal (`^GD`).

use image::DynamicImage;

use super::batch::Batch;
use super::dither::MonoBitmap;
use super::units::px_to_mm;
use crate::binding;
use crate::code::{self, BarcodeConfig, BarcodeFormat, QrConfig, qr_module_count};
use crate::design::{
    BarcodeElement, ColumnMapping, Design, Element, ElementKind, QrElement, Row, ShapeElement,
    TextAlign, TextElement, image_data,
};
use crate::expr::GenerationContext;
use crate::printer::PrinterConfig;
use crate::protocol::barcode::{self as zpl_barcode, SymbolParams};
use crate::protocol::commands::{self, Orientation};
use crate::protocol::graphics::{self, Lean, LineColor};
use crate::protocol::text::{self as zpl_text, Justify};
use crate::text::{FontMetrics, TextStyle, calc_auto_fit_with_step, layout_text};

/// Placeholder outline thickness (dots).
const PLACEHOLDER_THICKNESS: u32 = 2;

/// Angles within this many degrees of a quarter turn count as axis-aligned
/// for lines.
const AXIS_TOLERANCE_DEG: f32 = 1.0;

/// Longest side of a `^GFA` graphic (dots).
const MAX_GRAPHIC_DOTS: u32 = 3200;

/// Share of a barcode box taken by the interpretation line.
const INTERPRETATION_SHARE: f32 = 0.2;

/// Element box in dots, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DotBox {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl DotBox {
    fn of(element: &Element, config: &PrinterConfig) -> Self {
        Self {
            x: config.mm_to_dots(element.x),
            y: config.mm_to_dots(element.y),
            w: config.mm_to_dots(element.width),
            h: config.mm_to_dots(element.height),
        }
    }

    /// Origin of a field whose footprint is `(w, h)`, sharing this box's
    /// center.
    fn centered_origin(&self, w: u32, h: u32) -> (u32, u32) {
        let cx = self.x as f32 + self.w as f32 / 2.0;
        let cy = self.y as f32 + self.h as f32 / 2.0;
        (
            (cx - w as f32 / 2.0).round().max(0.0) as u32,
            (cy - h as f32 / 2.0).round().max(0.0) as u32,
        )
    }

    /// Footprint on paper after a quarter-turn.
    fn footprint(&self, orientation: Orientation) -> (u32, u32) {
        if orientation.is_sideways() {
            (self.h, self.w)
        } else {
            (self.w, self.h)
        }
    }

    /// `^FO` for the rotated footprint.
    fn origin(&self, orientation: Orientation) -> String {
        let (w, h) = self.footprint(orientation);
        let (x, y) = self.centered_origin(w, h);
        commands::field_origin(x, y)
    }
}

// ============================================================================
// LABELS
// ============================================================================

/// One label as ZPL (no trailing newline).
pub fn render_label(
    design: &Design,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
    config: &PrinterConfig,
    metrics: &dyn FontMetrics,
) -> String {
    let width = config.mm_to_dots(design.width_mm);
    let height = config.mm_to_dots(design.height_mm);

    let mut out = vec![
        commands::start_format(),
        commands::utf8_encoding(),
        commands::print_width(width),
        commands::label_length(height),
        commands::label_home(0, 0),
    ];

    if let Some(color) = design.border() {
        let thickness = config.mm_to_dots(design.border_width).max(1);
        let rounding = rounding_index(design.border_radius / (design.width_mm.min(design.height_mm) / 2.0));
        out.push(commands::field_origin(0, 0));
        out.push(graphics::graphic_box(width, height, thickness, line_color(color.is_dark()), rounding));
        out.push(commands::field_separator());
    }

    for element in design.paint_order() {
        if element.is_degenerate() {
            log::debug!("element {}: zero area, skipped", element.id);
            continue;
        }
        out.extend(render_element(element, row, mapping, ctx, config, metrics));
    }

    out.push(commands::end_format());
    out.join("\n")
}

/// Lazily render every label of a batch.
pub fn labels<'b>(
    batch: &'b Batch<'b>,
    config: &'b PrinterConfig,
    metrics: &'b dyn FontMetrics,
) -> impl Iterator<Item = String> + 'b {
    (0..batch.len()).map(move |i| {
        render_label(batch.design, batch.row(i), batch.mapping, &batch.context(i), config, metrics)
    })
}

/// A whole batch, labels joined with `\n`.
pub fn render_batch(batch: &Batch<'_>, config: &PrinterConfig, metrics: &dyn FontMetrics) -> String {
    labels(batch, config, metrics).collect::<Vec<_>>().join("\n")
}

fn render_element(
    element: &Element,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
    config: &PrinterConfig,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    let bx = DotBox::of(element, config);
    let orientation = Orientation::from_degrees(element.rotation_degrees);

    match &element.kind {
        ElementKind::Text(t) => {
            let content = binding::resolve_text(element, row, mapping, ctx);
            text_field(t, &content, bx, orientation, config, metrics)
        }
        ElementKind::Qr(q) => {
            let content = binding::resolve_code_value(element, row, mapping, ctx);
            if content.is_empty() {
                log::warn!("element {}: no QR value, skipped", element.id);
                return Vec::new();
            }
            qr_field(element, q, &content, bx, orientation)
        }
        ElementKind::Barcode(b) => {
            let content = binding::resolve_code_value(element, row, mapping, ctx);
            if content.is_empty() {
                log::warn!("element {}: no barcode value, skipped", element.id);
                return Vec::new();
            }
            barcode_field(element, b, &content, bx, orientation)
        }
        ElementKind::Rectangle(s) => rectangle(s, bx, orientation, config),
        ElementKind::Circle(s) => circle(s, bx, orientation, config),
        ElementKind::Line(l) => line(element, l.color().is_dark(), config),
        ElementKind::Image(img) => match img.data().map(image_data::decode_image) {
            Some(Ok(image)) => graphic_field(&image, bx, orientation),
            Some(Err(e)) => {
                log::warn!("element {}: {}", element.id, e);
                placeholder(bx, orientation)
            }
            None => placeholder(bx, orientation),
        },
    }
}

// ============================================================================
// TEXT
// ============================================================================

fn text_field(
    t: &TextElement,
    content: &str,
    bx: DotBox,
    orientation: Orientation,
    config: &PrinterConfig,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    let style = if t.font_weight.is_bold() {
        TextStyle::BOLD
    } else {
        TextStyle::REGULAR
    };
    // sizes below the ^A0 minimum would print larger than measured
    let px_to_dots = |px: f32| {
        (px_to_mm(px) * config.dots_per_mm())
            .round()
            .max(zpl_text::MIN_FONT_DOTS as f32)
    };

    // text runs along the element width whatever the orientation
    let (size, lines) = if t.text_auto_fit {
        let fit = calc_auto_fit_with_step(
            metrics,
            content,
            bx.w as f32,
            bx.h as f32,
            px_to_dots(t.font_size),
            px_to_dots(t.text_min_font_size),
            style,
            1.0,
        );
        (fit.font_size, fit.lines.len())
    } else {
        let size = px_to_dots(t.font_size);
        (size, layout_text(metrics, content, size, style, bx.w as f32).lines.len())
    };
    let size = size.round() as u32;

    let justify = match t.text_align {
        TextAlign::Left => Justify::Left,
        TextAlign::Center => Justify::Center,
        TextAlign::Right => Justify::Right,
    };

    vec![
        bx.origin(orientation),
        zpl_text::scalable_font(orientation, size, size),
        zpl_text::field_block(bx.w, lines as u32, justify),
        zpl_text::text_field_data(content),
    ]
}

// ============================================================================
// CODES
// ============================================================================

fn qr_field(element: &Element, q: &QrElement, content: &str, bx: DotBox, orientation: Orientation) -> Vec<String> {
    let mut config = QrConfig::new(q.qr_error_level, 0);
    if let Some(logo) = q.logo() {
        log::debug!("element {}: QR logo cannot be printed natively, only forcing level H", element.id);
        config = config.with_logo(logo, q.qr_logo_size_percent);
    }
    let level = config.effective_level();

    let modules = match qr_module_count(content, level) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("element {}: {}", element.id, e);
            return placeholder(bx, orientation);
        }
    };
    let magnification = zpl_barcode::qr_magnification(bx.w.min(bx.h), modules);

    vec![
        commands::field_origin(bx.x, bx.y),
        zpl_barcode::qr_code(orientation, magnification),
        zpl_barcode::qr_field_data(level, content),
    ]
}

fn barcode_field(
    element: &Element,
    b: &BarcodeElement,
    content: &str,
    bx: DotBox,
    orientation: Orientation,
) -> Vec<String> {
    let format = b.barcode_format;
    let validation = code::validate_barcode(format, content);
    if !validation.valid {
        log::warn!("element {}: {}", element.id, validation.message);
    }

    // the printer encodes; the local encoder only sizes the modules
    let sizing = code::generate_barcode(
        content,
        &BarcodeConfig {
            format,
            module_px: 1,
            height_px: 1,
            show_text: false,
        },
    );
    // same outcome as the document and preview: a crossed box
    let (modules, rows) = match &sizing {
        Ok(raster) => (raster.modules.max(1), raster.image.height().max(1)),
        Err(e) => {
            log::warn!("element {}: {}", element.id, e);
            return placeholder(bx, orientation);
        }
    };

    // length along the bars' run direction
    let (run, depth) = if orientation.is_sideways() {
        (bx.h, bx.w)
    } else {
        (bx.w, bx.h)
    };
    let module = (run / modules).clamp(1, 10);

    let interpretation = b.barcode_show_text && !format.is_two_dimensional();
    let bar_height = if interpretation {
        (depth as f32 * (1.0 - INTERPRETATION_SHARE)).round() as u32
    } else {
        depth
    };
    let height = match format {
        // row height; the sizing raster is 3 px per row
        BarcodeFormat::Pdf417 => (depth / (rows / 3).max(1)).max(1),
        _ => bar_height.max(1),
    };
    let matrix_module = (run.min(depth) / 24).clamp(1, 10);

    let params = SymbolParams::new(orientation, height, matrix_module, interpretation);
    vec![
        commands::field_origin(bx.x, bx.y),
        zpl_barcode::bar_defaults(module, bar_height),
        zpl_barcode::symbol(format, &params),
        commands::field_data(content),
    ]
}

// ============================================================================
// SHAPES
// ============================================================================

fn line_color(dark: bool) -> LineColor {
    if dark { LineColor::Black } else { LineColor::White }
}

/// `^GB` rounding index 0-8 from a `[0, 1]` radius fraction.
fn rounding_index(fraction: f32) -> u8 {
    if fraction.is_finite() {
        (fraction.clamp(0.0, 1.0) * 8.0).round() as u8
    } else {
        0
    }
}

fn rectangle(s: &ShapeElement, bx: DotBox, orientation: Orientation, config: &PrinterConfig) -> Vec<String> {
    let (w, h) = bx.footprint(orientation);
    let rounding = rounding_index(s.radius_fraction());

    let shape = match (s.fill().filter(|c| c.is_dark()), s.stroke()) {
        (Some(_), _) => graphics::filled_box(w, h, LineColor::Black, rounding),
        (None, Some(color)) => graphics::graphic_box(
            w,
            h,
            config.mm_to_dots(s.border_width).max(1),
            line_color(color.is_dark()),
            rounding,
        ),
        (None, None) => return Vec::new(),
    };
    vec![bx.origin(orientation), shape, commands::field_separator()]
}

fn circle(s: &ShapeElement, bx: DotBox, orientation: Orientation, config: &PrinterConfig) -> Vec<String> {
    let (w, h) = bx.footprint(orientation);
    let (thickness, color) = match (s.fill().filter(|c| c.is_dark()), s.stroke()) {
        (Some(_), _) => (w.min(h), LineColor::Black),
        (None, Some(color)) => (config.mm_to_dots(s.border_width).max(1), line_color(color.is_dark())),
        (None, None) => return Vec::new(),
    };
    let shape = if w == h {
        graphics::graphic_circle(w, thickness, color)
    } else {
        graphics::graphic_ellipse(w, h, thickness, color)
    };
    vec![bx.origin(orientation), shape, commands::field_separator()]
}

/// Lines run along the element width through its center; thickness is the
/// element height.
fn line(element: &Element, dark: bool, config: &PrinterConfig) -> Vec<String> {
    let length = config.mm_to_dots(element.width).max(1);
    let thickness = config.mm_to_dots(element.height).max(1);
    let color = line_color(dark);
    let (cx, cy) = element.center();
    let cx = cx * config.dots_per_mm();
    let cy = cy * config.dots_per_mm();

    let degrees = if element.rotation_degrees.is_finite() {
        element.rotation_degrees.rem_euclid(360.0)
    } else {
        0.0
    };
    let off_axis = (degrees - (degrees / 90.0).round() * 90.0).abs();

    if off_axis <= AXIS_TOLERANCE_DEG {
        let (w, h) = if Orientation::from_degrees(degrees).is_sideways() {
            (thickness, length)
        } else {
            (length, thickness)
        };
        let x = (cx - w as f32 / 2.0).round().max(0.0) as u32;
        let y = (cy - h as f32 / 2.0).round().max(0.0) as u32;
        return vec![
            commands::field_origin(x, y),
            graphics::graphic_box(w, h, w.min(h), color, 0),
            commands::field_separator(),
        ];
    }

    let radians = degrees.to_radians();
    let dx = length as f32 * radians.cos();
    let dy = length as f32 * radians.sin();
    // y grows downward: same signs run top-left to bottom-right
    let lean = if dx * dy > 0.0 { Lean::Left } else { Lean::Right };
    let w = dx.abs().round() as u32;
    let h = dy.abs().round() as u32;
    let x = (cx - w as f32 / 2.0).round().max(0.0) as u32;
    let y = (cy - h as f32 / 2.0).round().max(0.0) as u32;
    vec![
        commands::field_origin(x, y),
        graphics::graphic_diagonal(w, h, thickness, color, lean),
        commands::field_separator(),
    ]
}

// ============================================================================
// IMAGES
// ============================================================================

fn graphic_field(image: &DynamicImage, bx: DotBox, orientation: Orientation) -> Vec<String> {
    let rotated = match orientation {
        Orientation::Normal => image.clone(),
        Orientation::Rotated => image.rotate90(),
        Orientation::Inverted => image.rotate180(),
        Orientation::Bottom => image.rotate270(),
    };
    let (w, h) = bx.footprint(orientation);
    let bitmap = MonoBitmap::from_image(&rotated, w.min(MAX_GRAPHIC_DOTS), h.min(MAX_GRAPHIC_DOTS));
    vec![
        bx.origin(orientation),
        graphics::graphic_field(&bitmap),
        commands::field_separator(),
    ]
}

/// Outline with both diagonals.
fn placeholder(bx: DotBox, orientation: Orientation) -> Vec<String> {
    let (w, h) = bx.footprint(orientation);
    let (x, y) = bx.centered_origin(w, h);
    let origin = commands::field_origin(x, y);
    vec![
        origin.clone(),
        graphics::graphic_box(w, h, PLACEHOLDER_THICKNESS, LineColor::Black, 0),
        commands::field_separator(),
        origin.clone(),
        graphics::graphic_diagonal(w, h, PLACEHOLDER_THICKNESS, LineColor::Black, Lean::Left),
        commands::field_separator(),
        origin,
        graphics::graphic_diagonal(w, h, PLACEHOLDER_THICKNESS, LineColor::Black, Lean::Right),
        commands::field_separator(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{ImageElement, LineElement, Paint, Rgb};
    use crate::printer::Dpi;
    use crate::text::BuiltinMetrics;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ctx() -> GenerationContext {
        let now = NaiveDate::from_ymd_opt(2024, 1, 31)
            .and_then(|d| d.and_hms_opt(8, 5, 0))
            .unwrap();
        GenerationContext::new(now)
    }

    fn render(design: &Design) -> String {
        render_label(
            design,
            &Row::new(),
            &ColumnMapping::new(),
            &ctx(),
            &PrinterConfig::default(),
            &BuiltinMetrics,
        )
    }

    fn text(content: &str) -> Element {
        Element::new(
            "t",
            5.0,
            5.0,
            40.0,
            10.0,
            ElementKind::Text(TextElement {
                text_content: content.into(),
                ..TextElement::default()
            }),
        )
    }

    #[test]
    fn test_empty_label_framing() {
        assert_eq!(
            render(&Design::new(50.0, 30.0)),
            "^XA\n^CI28\n^PW400\n^LL240\n^LH0,0\n^XZ"
        );
    }

    #[test]
    fn test_label_size_follows_dpi() {
        let out = render_label(
            &Design::new(50.0, 30.0),
            &Row::new(),
            &ColumnMapping::new(),
            &ctx(),
            &PrinterConfig::new(Dpi::Dpi300),
            &BuiltinMetrics,
        );
        assert!(out.contains("^PW600\n^LL360"));
    }

    #[test]
    fn test_text_field() {
        let out = render(&Design::new(50.0, 30.0).with_element(text("Hola")));
        // 16 px = 4.23 mm = 34 dots
        assert!(out.contains("^FO40,40\n^A0N,34,34\n^FB320,1,0,L,0\n^FDHola^FS"), "{}", out);
    }

    #[test]
    fn test_text_payload_is_escaped() {
        let out = render(&Design::new(50.0, 30.0).with_element(text("50^ off~\nnuevo")));
        assert!(out.contains("^FD50  off \\&nuevo^FS"), "{}", out);
    }

    #[test]
    fn test_small_text_is_sized_at_the_font_minimum() {
        let content = "palabra ".repeat(200);
        let mut element = text(&content);
        if let ElementKind::Text(t) = &mut element.kind {
            t.text_auto_fit = true;
            t.text_min_font_size = 1.0;
        }
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        let lines = layout_text(&BuiltinMetrics, &content, 10.0, TextStyle::REGULAR, 320.0)
            .lines
            .len();
        assert!(out.contains(&format!("^A0N,10,10\n^FB320,{},0,L,0", lines)), "{}", out);

        let mut element = text("Hola");
        if let ElementKind::Text(t) = &mut element.kind {
            t.font_size = 2.0;
        }
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert!(out.contains("^A0N,10,10\n^FB320,1,0,L,0"), "{}", out);
    }

    #[test]
    fn test_rotated_text_keeps_center() {
        let out = render(&Design::new(50.0, 30.0).with_element(text("Hola").rotated(90.0)));
        // box 40,40 320x80 → center 200,80; footprint 80x320
        assert!(out.contains("^FO160,0\n^A0R,34,34\n^FB320,"), "{}", out);
    }

    #[test]
    fn test_qr_field() {
        let element = Element::new(
            "qr",
            5.0,
            5.0,
            20.0,
            20.0,
            ElementKind::Qr(QrElement {
                text_content: "ABC123".into(),
                ..QrElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        // 160 dots / (21 + 8) = 5
        assert!(out.contains("^FO40,40\n^BQN,2,5\n^FDMA,ABC123^FS"), "{}", out);
        assert_eq!(out.matches("^BQ").count(), 1);
    }

    #[test]
    fn test_qr_logo_forces_h() {
        let element = Element::new(
            "qr",
            0.0,
            0.0,
            20.0,
            20.0,
            ElementKind::Qr(QrElement {
                text_content: "ABC123".into(),
                qr_error_level: crate::code::QrErrorLevel::L,
                qr_logo_data: Some("data:image/png;base64,AAAA".into()),
                ..QrElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert!(out.contains("^FDHA,ABC123^FS"), "{}", out);
    }

    #[test]
    fn test_barcode_field() {
        let element = Element::new(
            "bc",
            0.0,
            0.0,
            40.0,
            10.0,
            ElementKind::Barcode(BarcodeElement {
                text_content: "ABC".into(),
                ..BarcodeElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        // 80 dots deep, 20% for the interpretation line
        assert!(out.contains("^FO0,0\n^BY"), "{}", out);
        assert!(out.contains("^BCN,64,Y,N,N\n^FDABC^FS"), "{}", out);
    }

    #[test]
    fn test_barcode_payload_keeps_command_characters() {
        let element = Element::new(
            "bc",
            0.0,
            0.0,
            40.0,
            10.0,
            ElementKind::Barcode(BarcodeElement {
                text_content: "A^XZ".into(),
                ..BarcodeElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert!(out.contains("^BCN,64,Y,N,N\n^FH^FDA_5EXZ^FS"), "{}", out);
        assert_eq!(out.matches("^XZ").count(), 1);
    }

    #[test]
    fn test_unencodable_barcode_is_placeholder() {
        let element = Element::new(
            "ean",
            0.0,
            0.0,
            40.0,
            10.0,
            ElementKind::Barcode(BarcodeElement {
                text_content: "no es un numero".into(),
                barcode_format: crate::code::BarcodeFormat::Ean13,
                ..BarcodeElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert!(!out.contains("^BY"), "{}", out);
        assert!(!out.contains("^BE"), "{}", out);
        assert!(!out.contains("^FD"), "{}", out);
        assert_eq!(out.matches("^GD").count(), 2, "{}", out);
    }

    #[test]
    fn test_missing_code_value_skips_element() {
        let element = Element::new("qr", 0.0, 0.0, 20.0, 20.0, ElementKind::Qr(QrElement::default()));
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert!(!out.contains("^BQ"));
        assert!(out.ends_with("^XZ"));
    }

    #[test]
    fn test_filled_and_outlined_rectangles() {
        let filled = Element::new(
            "f",
            0.0,
            0.0,
            10.0,
            5.0,
            ElementKind::Rectangle(ShapeElement {
                background_color: Paint::solid(Rgb::BLACK),
                ..ShapeElement::default()
            }),
        );
        let outlined = Element::new(
            "o",
            0.0,
            0.0,
            10.0,
            5.0,
            ElementKind::Rectangle(ShapeElement {
                border_width: 0.25,
                border_radius: 50.0,
                ..ShapeElement::default()
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(filled).with_element(outlined));
        assert!(out.contains("^GB80,40,40,B,0"), "{}", out);
        assert!(out.contains("^GB80,40,2,B,4"), "{}", out);
    }

    #[test]
    fn test_circle_and_ellipse() {
        let ring = ShapeElement {
            border_width: 0.5,
            ..ShapeElement::default()
        };
        let design = Design::new(50.0, 30.0)
            .with_element(Element::new("c", 0.0, 0.0, 10.0, 10.0, ElementKind::Circle(ring.clone())))
            .with_element(Element::new("e", 0.0, 0.0, 20.0, 10.0, ElementKind::Circle(ring)));
        let out = render(&design);
        assert!(out.contains("^GC80,4,B"), "{}", out);
        assert!(out.contains("^GE160,80,4,B"), "{}", out);
    }

    #[test]
    fn test_lines() {
        let line = |rotation: f32| {
            Element::new("l", 10.0, 10.0, 20.0, 0.5, ElementKind::Line(LineElement::default())).rotated(rotation)
        };
        let out = render(&Design::new(50.0, 30.0).with_element(line(0.0)));
        assert!(out.contains("^GB160,4,4,B,0"), "{}", out);

        let out = render(&Design::new(50.0, 30.0).with_element(line(90.0)));
        assert!(out.contains("^GB4,160,4,B,0"), "{}", out);

        let out = render(&Design::new(50.0, 30.0).with_element(line(45.0)));
        assert!(out.contains("^GD113,113,4,B,L"), "{}", out);
    }

    #[test]
    fn test_image_without_data_is_placeholder() {
        let element = Element::new("img", 0.0, 0.0, 10.0, 10.0, ElementKind::Image(ImageElement::default()));
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        assert_eq!(out.matches("^GD80,80,2,B,").count(), 2);
    }

    #[test]
    fn test_image_becomes_graphic_field() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
        let element = Element::new(
            "img",
            0.0,
            0.0,
            2.0,
            1.0,
            ElementKind::Image(ImageElement {
                image_data: Some(image_data::png_data_uri(&img)),
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        // 16x8 dots → 2 bytes per row, 16 bytes
        assert!(out.contains("^GFA,16,16,2,FFFF"), "{}", out);
    }

    #[test]
    fn test_graphic_field_size_is_bounded() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        let element = Element::new(
            "img",
            0.0,
            0.0,
            1000.0,
            1000.0,
            ElementKind::Image(ImageElement {
                image_data: Some(image_data::png_data_uri(&img)),
            }),
        );
        let out = render(&Design::new(50.0, 30.0).with_element(element));
        // 3200 dots square → 400 bytes per row
        assert!(out.contains("^GFA,1280000,1280000,400,"));
    }

    #[test]
    fn test_border_box() {
        let mut design = Design::new(50.0, 30.0);
        design.border_width = 0.5;
        let out = render(&design);
        assert!(out.contains("^FO0,0\n^GB400,240,4,B,0\n^FS"), "{}", out);
    }
}
