//! # Printer Module
//!
//! This module provides printer-specific configurations and utilities.
//!
//! ## Modules
//!
//! - [`config`]: Print head resolution and mm/dot conversion

pub mod config;

pub use config::{Dpi, PrinterConfig};
