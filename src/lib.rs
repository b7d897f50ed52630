//! # Etiqueta - Label Rendering Engine
//!
//! Etiqueta turns one declarative label [`design::Design`] and a set of
//! data rows into three outputs that agree on geometry, text sizing and
//! encoded content:
//!
//! - **Printer stream**: ZPL for thermal label printers at 203/300/600 dpi
//! - **Document**: labels paginated on sheets, exported as PDF
//! - **Preview**: one label rasterized for a screen panel, exported as PNG
//!
//! ## Quick Start
//!
//! ```
//! use etiqueta::design::{ColumnMapping, Design, Row, rows_from_json};
//! use etiqueta::render::{batch::Batch, document::{Document, DocumentOptions}, printer};
//! use etiqueta::printer::PrinterConfig;
//! use etiqueta::text::BuiltinMetrics;
//!
//! let design = Design::from_json(r#"{
//!     "width_mm": 50, "height_mm": 30,
//!     "elements": [
//!         {"id": "t", "type": "text", "x": 2, "y": 2, "width": 46, "height": 8,
//!          "binding": "{{MAYUS(nombre)}}"}
//!     ]
//! }"#)?;
//! let rows: Vec<Row> = rows_from_json(r#"[{"nombre": "aceite"}, {"nombre": "vinagre"}]"#)?;
//! let mapping = ColumnMapping::new();
//! let batch = Batch::new(&design, &rows, &mapping);
//!
//! let zpl = printer::render_batch(&batch, &PrinterConfig::default(), &BuiltinMetrics);
//! assert!(zpl.contains("^FDACEITE^FS"));
//!
//! let pdf = Document::from_batch(&batch, &DocumentOptions::default(), &BuiltinMetrics).to_pdf()?;
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`design`] | Design, element and data-row model |
//! | [`expr`] | `{{...}}` template functions |
//! | [`binding`] | Which value an element shows |
//! | [`text`] | Font metrics, wrapping, auto-fit |
//! | [`code`] | Barcode/QR synthesis and validation |
//! | [`protocol`] | ZPL command builders |
//! | [`printer`] | Printer resolution |
//! | [`render`] | Printer, document/PDF and preview renderers |
//! | [`error`] | Error types |

pub mod binding;
pub mod code;
pub mod design;
pub mod error;
pub mod expr;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod text;

// Re-exports for convenience
pub use design::{ColumnMapping, Design, Row};
pub use error::EtiquetaError;
pub use printer::PrinterConfig;
