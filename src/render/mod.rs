//! # Rendering Module
//!
//! Three peer renderers over one design and one row.
//!
//! ## Modules
//!
//! | Module | Output | Units |
//! |--------|--------|-------|
//! | [`printer`] | ZPL command stream | printer dots |
//! | [`document`] / [`pdf`] | paginated labels, PDF bytes | mm → points |
//! | [`preview`] | RGBA/PNG for a panel | device pixels |
//!
//! Shared pieces:
//!
//! - [`scene`]: binds, sizes and synthesizes a label once for document and preview
//! - [`batch`]: one design over many rows, with a batch-wide clock
//! - [`units`]: canvas px / point / mm conversions
//! - [`dither`]: Bayer 8x8 ordered dithering for printer bitmaps
//!
//! ## Usage Example
//!
//! ```
//! use etiqueta::design::{ColumnMapping, Design, Row};
//! use etiqueta::printer::PrinterConfig;
//! use etiqueta::render::{batch::Batch, printer};
//! use etiqueta::text::BuiltinMetrics;
//!
//! let design = Design::new(50.0, 30.0);
//! let (rows, mapping) = (Vec::<Row>::new(), ColumnMapping::new());
//! let batch = Batch::new(&design, &rows, &mapping);
//!
//! let zpl = printer::render_batch(&batch, &PrinterConfig::default(), &BuiltinMetrics);
//! assert!(zpl.starts_with("^XA") && zpl.ends_with("^XZ"));
//! ```

pub mod batch;
pub mod dither;
pub mod document;
pub mod pdf;
pub mod preview;
pub mod printer;
pub mod scene;
pub mod units;
