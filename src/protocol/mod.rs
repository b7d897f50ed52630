//! # ZPL Protocol Implementation
//!
//! Command builders for ZPL II, the line-oriented language spoken by most
//! thermal label printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Label framing, field origin/data, orientation
//! - [`text`]: Scalable font and field blocks
//! - [`barcode`]: Linear, 2D and QR symbologies
//! - [`graphics`]: Boxes, circles, ellipses, diagonals, bitmap fields
//!
//! ## Usage Example
//!
//! ```
//! use etiqueta::protocol::{commands, text};
//! use etiqueta::protocol::commands::Orientation;
//! use etiqueta::protocol::text::Justify;
//!
//! let label = [
//!     commands::start_format(),
//!     commands::utf8_encoding(),
//!     commands::field_origin(40, 32),
//!     text::scalable_font(Orientation::Normal, 24, 24),
//!     text::field_block(320, 1, Justify::Left),
//!     text::text_field_data("Hola"),
//!     commands::end_format(),
//! ]
//! .join("\n");
//! assert!(label.starts_with("^XA\n^CI28"));
//! ```
//!
//! ## Protocol Reference
//!
//! Based on the "ZPL II Programming Guide".

pub mod barcode;
pub mod commands;
pub mod graphics;
pub mod text;
