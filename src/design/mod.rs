//! # Label Design Model
//!
//! A [`Design`] is the declarative description of one label: its physical
//! size in millimetres, background and border, and a list of positioned
//! [`Element`]s. Every renderer receives the same immutable `Design` and
//! walks it in [`Design::paint_order`].
//!
//! ## JSON Shape
//!
//! ```json
//! {
//!   "width_mm": 50, "height_mm": 30,
//!   "background_color": "#ffffff",
//!   "elements": [
//!     { "id": "t1", "type": "text", "x": 2, "y": 2, "width": 46, "height": 8,
//!       "text_content": "Hello", "font_size": 16 }
//!   ]
//! }
//! ```
//!
//! ## Units
//!
//! | Field | Unit |
//! |-------|------|
//! | `x`, `y`, `width`, `height` | millimetres |
//! | `rotation_degrees` | degrees, clockwise |
//! | `font_size` | canvas pixels (96 px per inch) |
//! | design `border_width` / `border_radius` | millimetres |
//! | element `border_width` | millimetres |
//! | element `border_radius` | percent of the shorter side (0-100) |
//!
//! Numeric fields are parsed leniently: numeric strings are accepted,
//! unusable values fall back to defaults and negative sizes clamp to zero.

pub mod color;
mod data;
pub(crate) mod de;
pub mod image_data;

pub use color::{Paint, Rgb};
pub use data::{ColumnMapping, Row, mapping_from_json, rows_from_json};

use serde::{Deserialize, Deserializer, Serialize};

use crate::code::{BarcodeFormat, QrErrorLevel};
use crate::error::EtiquetaError;

// ============================================================================
// DESIGN
// ============================================================================

/// A label design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    #[serde(
        default = "default_label_width",
        deserialize_with = "de::label_width"
    )]
    pub width_mm: f32,
    #[serde(
        default = "default_label_height",
        deserialize_with = "de::label_height"
    )]
    pub height_mm: f32,
    /// Label background; transparent when missing.
    #[serde(default)]
    pub background_color: Paint,
    #[serde(default, deserialize_with = "de::length")]
    pub border_width: f32,
    #[serde(default)]
    pub border_color: Paint,
    /// Corner radius of the label outline, in millimetres.
    #[serde(default, deserialize_with = "de::length")]
    pub border_radius: f32,
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_label_width() -> f32 {
    de::DEFAULT_LABEL_WIDTH_MM
}

fn default_label_height() -> f32 {
    de::DEFAULT_LABEL_HEIGHT_MM
}

impl Design {
    /// An empty design of the given size.
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm: if width_mm > 0.0 {
                width_mm
            } else {
                de::DEFAULT_LABEL_WIDTH_MM
            },
            height_mm: if height_mm > 0.0 {
                height_mm
            } else {
                de::DEFAULT_LABEL_HEIGHT_MM
            },
            background_color: Paint::default(),
            border_width: 0.0,
            border_color: Paint::default(),
            border_radius: 0.0,
            elements: Vec::new(),
        }
    }

    /// Builder-style element append.
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, EtiquetaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Visible elements in paint order: ascending `z_index`, ties keep
    /// their array order.
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut visible: Vec<&Element> = self.elements.iter().filter(|e| e.visible).collect();
        // sort_by_key is stable
        visible.sort_by_key(|e| e.z_index);
        visible
    }

    /// Background paint, transparent by default.
    pub fn background(&self) -> Option<Rgb> {
        self.background_color.or(None)
    }

    /// Border paint when the border is visible.
    pub fn border(&self) -> Option<Rgb> {
        if self.border_width > 0.0 {
            self.border_color.or(Some(Rgb::BLACK))
        } else {
            None
        }
    }

    /// Element ids that appear more than once.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();
        for element in &self.elements {
            if !seen.insert(element.id.as_str()) && !dupes.contains(&element.id.as_str()) {
                dupes.push(element.id.as_str());
            }
        }
        dupes
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

/// A positioned element. Common geometry lives here; the kind-specific
/// payload is the flattened [`ElementKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::number")]
    pub x: f32,
    #[serde(default, deserialize_with = "de::number")]
    pub y: f32,
    #[serde(default, deserialize_with = "de::length")]
    pub width: f32,
    #[serde(default, deserialize_with = "de::length")]
    pub height: f32,
    #[serde(default, alias = "rotation", deserialize_with = "de::number")]
    pub rotation_degrees: f32,
    #[serde(default, deserialize_with = "de::integer")]
    pub z_index: i32,
    #[serde(default = "default_true", deserialize_with = "de::flag_default_true")]
    pub visible: bool,
    /// Editor-only lock; ignored by every renderer.
    #[serde(default, deserialize_with = "de::flag")]
    pub locked: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
}

fn default_true() -> bool {
    true
}

/// Element payload, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextElement),
    Qr(QrElement),
    Barcode(BarcodeElement),
    Rectangle(ShapeElement),
    Circle(ShapeElement),
    Line(LineElement),
    Image(ImageElement),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default, deserialize_with = "de::text")]
    pub text_content: String,
    #[serde(default, deserialize_with = "de::text")]
    pub binding: String,
    /// Canvas pixels.
    #[serde(default = "default_font_size", deserialize_with = "de::font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_family", deserialize_with = "de::text")]
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub color: Paint,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default, deserialize_with = "de::flag")]
    pub text_auto_fit: bool,
    #[serde(
        default = "default_min_font_size",
        deserialize_with = "de::min_font_size"
    )]
    pub text_min_font_size: f32,
}

pub(crate) fn default_font_size() -> f32 {
    16.0
}

pub(crate) fn default_min_font_size() -> f32 {
    6.0
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            text_content: String::new(),
            binding: String::new(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            font_weight: FontWeight::default(),
            color: Paint::default(),
            text_align: TextAlign::default(),
            text_auto_fit: false,
            text_min_font_size: default_min_font_size(),
        }
    }
}

impl TextElement {
    pub fn color(&self) -> Rgb {
        self.color.or(Some(Rgb::BLACK)).unwrap_or(Rgb::BLACK)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QrElement {
    #[serde(default, deserialize_with = "de::text")]
    pub text_content: String,
    #[serde(default, deserialize_with = "de::text")]
    pub binding: String,
    #[serde(default)]
    pub qr_error_level: QrErrorLevel,
    /// Data URI or bare base64 image placed in the center of the code.
    #[serde(default)]
    pub qr_logo_data: Option<String>,
    #[serde(
        default = "default_logo_percent",
        deserialize_with = "de::logo_percent"
    )]
    pub qr_logo_size_percent: f32,
}

pub(crate) fn default_logo_percent() -> f32 {
    20.0
}

impl QrElement {
    /// Logo data when present and non-blank.
    pub fn logo(&self) -> Option<&str> {
        self.qr_logo_data
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeElement {
    #[serde(default, deserialize_with = "de::text")]
    pub text_content: String,
    #[serde(default, deserialize_with = "de::text")]
    pub binding: String,
    #[serde(default)]
    pub barcode_format: BarcodeFormat,
    #[serde(default = "default_true", deserialize_with = "de::flag_default_true")]
    pub barcode_show_text: bool,
}

impl Default for BarcodeElement {
    fn default() -> Self {
        Self {
            text_content: String::new(),
            binding: String::new(),
            barcode_format: BarcodeFormat::default(),
            barcode_show_text: true,
        }
    }
}

/// Rectangle and circle payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeElement {
    #[serde(default)]
    pub background_color: Paint,
    #[serde(default, deserialize_with = "de::length")]
    pub border_width: f32,
    #[serde(default)]
    pub border_color: Paint,
    /// Percent: 0 = square corners, 100 = full ellipse.
    #[serde(default, deserialize_with = "de::length")]
    pub border_radius: f32,
}

impl ShapeElement {
    pub fn fill(&self) -> Option<Rgb> {
        self.background_color.or(None)
    }

    pub fn stroke(&self) -> Option<Rgb> {
        if self.border_width > 0.0 {
            self.border_color.or(Some(Rgb::BLACK))
        } else {
            None
        }
    }

    /// Corner radius as a fraction `[0, 1]` of half the shorter side.
    pub fn radius_fraction(&self) -> f32 {
        (self.border_radius / 100.0).clamp(0.0, 1.0)
    }
}

/// A straight line: its length is the element width, its thickness the
/// element height.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineElement {
    #[serde(default)]
    pub color: Paint,
}

impl LineElement {
    pub fn color(&self) -> Rgb {
        self.color.or(Some(Rgb::BLACK)).unwrap_or(Rgb::BLACK)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(default)]
    pub image_data: Option<String>,
}

impl ImageElement {
    pub fn data(&self) -> Option<&str> {
        self.image_data
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Element {
    /// A new element with zero rotation, `z_index` 0, visible.
    pub fn new(id: impl Into<String>, x: f32, y: f32, width: f32, height: f32, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
            rotation_degrees: 0.0,
            z_index: 0,
            visible: true,
            locked: false,
            kind,
        }
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// The binding field for data-carrying kinds, empty otherwise.
    pub fn binding(&self) -> &str {
        match &self.kind {
            ElementKind::Text(t) => &t.binding,
            ElementKind::Qr(q) => &q.binding,
            ElementKind::Barcode(b) => &b.binding,
            ElementKind::Rectangle(_)
            | ElementKind::Circle(_)
            | ElementKind::Line(_)
            | ElementKind::Image(_) => "",
        }
    }

    /// Static text used when no binding resolves.
    pub fn text_content(&self) -> &str {
        match &self.kind {
            ElementKind::Text(t) => &t.text_content,
            ElementKind::Qr(q) => &q.text_content,
            ElementKind::Barcode(b) => &b.text_content,
            ElementKind::Rectangle(_)
            | ElementKind::Circle(_)
            | ElementKind::Line(_)
            | ElementKind::Image(_) => "",
        }
    }

    /// True when the element covers no area and paints nothing.
    pub fn is_degenerate(&self) -> bool {
        match self.kind {
            // a line only needs a length
            ElementKind::Line(_) => self.width <= 0.0,
            _ => self.width <= 0.0 || self.height <= 0.0,
        }
    }

    /// Visual center in millimetres.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ============================================================================
// TEXT STYLE ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl<'de> Deserialize<'de> for TextAlign {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = de::text(deserializer)?;
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" => TextAlign::Center,
            "right" | "end" => TextAlign::Right,
            _ => TextAlign::Left,
        })
    }
}

/// CSS-style font weight (100-900). Accepts `"normal"`, `"bold"`, numbers
/// and numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn is_bold(&self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if let serde_json::Value::String(s) = &raw {
            match s.trim().to_ascii_lowercase().as_str() {
                "bold" | "bolder" => return Ok(Self::BOLD),
                "normal" | "lighter" | "" => return Ok(Self::NORMAL),
                _ => {}
            }
        }
        Ok(de::number_from_value(&raw)
            .map(|n| FontWeight(n.clamp(1.0, 1000.0) as u16))
            .unwrap_or_default())
    }
}
