//! # Printer Configuration
//!
//! Resolution settings for ZPL label printers.
//!
//! ## Supported Resolutions
//!
//! | DPI | Dots per mm | Typical models |
//! |-----|-------------|----------------|
//! | 203 | 8 | desktop thermal printers |
//! | 300 | 12 | mid-range industrial printers |
//! | 600 | 24 | high-resolution industrial printers |
//!
//! ZPL printers are addressed in whole dots, and the firmware rounds the
//! nominal resolution to an integer dots-per-mm value. Conversions here use
//! that integer value so coordinates match what the printer actually does.
//!
//! ## Usage
//!
//! ```
//! use etiqueta::printer::{Dpi, PrinterConfig};
//!
//! let config = PrinterConfig::new(Dpi::Dpi300);
//! assert_eq!(config.mm_to_dots(10.0), 120);
//! ```

use serde::{Deserialize, Serialize};

/// Print head resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Dpi {
    #[default]
    Dpi203,
    Dpi300,
    Dpi600,
}

impl Dpi {
    pub const ALL: [Dpi; 3] = [Dpi::Dpi203, Dpi::Dpi300, Dpi::Dpi600];

    pub fn value(&self) -> u16 {
        match self {
            Dpi::Dpi203 => 203,
            Dpi::Dpi300 => 300,
            Dpi::Dpi600 => 600,
        }
    }

    /// Integer dots per millimeter (203 → 8, 300 → 12, 600 → 24).
    pub fn dots_per_mm(&self) -> u16 {
        match self {
            Dpi::Dpi203 => 8,
            Dpi::Dpi300 => 12,
            Dpi::Dpi600 => 24,
        }
    }
}

impl TryFrom<u16> for Dpi {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Dpi::ALL
            .into_iter()
            .find(|d| d.value() == value)
            .ok_or_else(|| format!("Unsupported DPI {}. Use 203, 300 or 600", value))
    }
}

impl From<Dpi> for u16 {
    fn from(dpi: Dpi) -> u16 {
        dpi.value()
    }
}

impl std::str::FromStr for Dpi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .trim()
            .trim_end_matches("dpi")
            .parse()
            .map_err(|_| format!("Invalid DPI: {}", s))?;
        Dpi::try_from(value)
    }
}

/// # Printer Configuration
///
/// ## Calculations
///
/// ```text
/// dots = round(mm * dots_per_mm)
///
/// 50 x 30 mm label at 203 DPI:
///   width  = 50 * 8 = 400 dots
///   height = 30 * 8 = 240 dots
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Resolution in dots per inch
    #[serde(default)]
    pub dpi: Dpi,
}

impl PrinterConfig {
    pub fn new(dpi: Dpi) -> Self {
        Self { dpi }
    }

    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi.dots_per_mm() as f32
    }

    /// Convert millimeters to dots (negative lengths clamp to 0)
    #[inline]
    pub fn mm_to_dots(&self, mm: f32) -> u32 {
        (mm * self.dots_per_mm()).round().max(0.0) as u32
    }

    /// Convert dots to millimeters
    #[inline]
    pub fn dots_to_mm(&self, dots: u32) -> f32 {
        dots as f32 / self.dots_per_mm()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_per_mm_table() {
        assert_eq!(Dpi::Dpi203.dots_per_mm(), 8);
        assert_eq!(Dpi::Dpi300.dots_per_mm(), 12);
        assert_eq!(Dpi::Dpi600.dots_per_mm(), 24);
    }

    #[test]
    fn test_default_is_203() {
        assert_eq!(PrinterConfig::default().dpi, Dpi::Dpi203);
    }

    #[test]
    fn test_mm_to_dots() {
        let config = PrinterConfig::default();
        assert_eq!(config.mm_to_dots(50.0), 400);
        assert_eq!(config.mm_to_dots(0.06), 0);
        assert_eq!(config.mm_to_dots(-3.0), 0);
        assert_eq!(PrinterConfig::new(Dpi::Dpi600).mm_to_dots(1.0), 24);
    }

    #[test]
    fn test_dots_to_mm() {
        let config = PrinterConfig::new(Dpi::Dpi300);
        assert!((config.dots_to_mm(120) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_dpi() {
        assert_eq!("300".parse::<Dpi>(), Ok(Dpi::Dpi300));
        assert_eq!("600dpi".parse::<Dpi>(), Ok(Dpi::Dpi600));
        assert!("72".parse::<Dpi>().is_err());
        assert!("abc".parse::<Dpi>().is_err());
    }

    #[test]
    fn test_serde_as_number() {
        let config: PrinterConfig = serde_json::from_str(r#"{"dpi": 300}"#).unwrap();
        assert_eq!(config.dpi, Dpi::Dpi300);
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"dpi":300}"#);
        assert!(serde_json::from_str::<PrinterConfig>(r#"{"dpi": 100}"#).is_err());
    }
}
