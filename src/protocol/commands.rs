//! # ZPL Label Commands
//!
//! Framing and field commands shared by every element type.
//!
//! ## Label Structure
//!
//! ```text
//! ^XA                  start of label
//! ^CI28                field data is UTF-8
//! ^PW400               print width (dots)
//! ^LL240               label length (dots)
//! ^LH0,0               label home
//! ^FO40,32             field origin ─┐
//! ^A0N,24,24           field body    │ one block per element
//! ^FDHello^FS          field data   ─┘
//! ^XZ                  end of label
//! ```
//!
//! Every builder returns a single command; the renderer writes one command
//! per line.
//!
//! ## Reference
//!
//! Based on the "ZPL II Programming Guide".

// ============================================================================
// ORIENTATION
// ============================================================================

/// Field orientation parameter shared by fonts and barcodes.
///
/// | Code | Rotation (clockwise) |
/// |------|----------------------|
/// | N | 0° |
/// | R | 90° |
/// | I | 180° |
/// | B | 270° |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    Rotated,
    Inverted,
    Bottom,
}

impl Orientation {
    /// Quantize any angle to the nearest quarter turn.
    ///
    /// Buckets: `[315, 45) → N`, `[45, 135) → R`, `[135, 225) → I`,
    /// `[225, 315) → B`. Total over all finite inputs (normalized mod 360);
    /// NaN and infinities are treated as 0°.
    pub fn from_degrees(degrees: f32) -> Self {
        let d = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        if !(45.0..315.0).contains(&d) {
            Orientation::Normal
        } else if d < 135.0 {
            Orientation::Rotated
        } else if d < 225.0 {
            Orientation::Inverted
        } else {
            Orientation::Bottom
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Orientation::Normal => 0,
            Orientation::Rotated => 90,
            Orientation::Inverted => 180,
            Orientation::Bottom => 270,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Orientation::Normal => 'N',
            Orientation::Rotated => 'R',
            Orientation::Inverted => 'I',
            Orientation::Bottom => 'B',
        }
    }

    /// Quarter turns that swap width and height.
    pub fn is_sideways(&self) -> bool {
        matches!(self, Orientation::Rotated | Orientation::Bottom)
    }
}

// ============================================================================
// FRAMING
// ============================================================================

/// # Start Format (^XA)
#[inline]
pub fn start_format() -> String {
    "^XA".to_string()
}

/// # End Format (^XZ)
#[inline]
pub fn end_format() -> String {
    "^XZ".to_string()
}

/// # Change International Encoding (^CI28)
///
/// Selects UTF-8 for all following field data, so accented text and
/// symbols in row values print as-is.
#[inline]
pub fn utf8_encoding() -> String {
    "^CI28".to_string()
}

/// # Print Width (^PW)
#[inline]
pub fn print_width(dots: u32) -> String {
    format!("^PW{}", dots)
}

/// # Label Length (^LL)
#[inline]
pub fn label_length(dots: u32) -> String {
    format!("^LL{}", dots)
}

/// # Label Home (^LH)
///
/// Offset applied to every following `^FO`.
#[inline]
pub fn label_home(x: u32, y: u32) -> String {
    format!("^LH{},{}", x, y)
}

// ============================================================================
// FIELDS
// ============================================================================

/// # Field Origin (^FO)
///
/// Upper-left corner of the field, in dots from the label home.
#[inline]
pub fn field_origin(x: u32, y: u32) -> String {
    format!("^FO{},{}", x, y)
}

/// # Field Data (^FD ... ^FS)
///
/// For encoded symbols, where the payload must reach the printer unchanged.
/// Payloads with command characters or control characters are sent through
/// a field hex prefix (`^FH`, indicator `_`) with those bytes written as
/// `_XX`; anything else is sent as is.
pub fn field_data(data: &str) -> String {
    match hex_field_data(data) {
        Some(escaped) => format!("^FH^FD{}^FS", escaped),
        None => format!("^FD{}^FS", data),
    }
}

/// `data` with `^ ~ _` and control characters as `_XX` UTF-8 byte escapes,
/// or `None` when nothing needs escaping.
pub fn hex_field_data(data: &str) -> Option<String> {
    let needs_hex = |c: char| c == '^' || c == '~' || c.is_control();
    if !data.chars().any(needs_hex) {
        return None;
    }
    let mut out = String::with_capacity(data.len() * 2);
    for c in data.chars() {
        if needs_hex(c) || c == '_' {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("_{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// # Field Separator (^FS)
///
/// Closes fields without data (graphic boxes, circles, lines).
#[inline]
pub fn field_separator() -> String {
    "^FS".to_string()
}

/// Make a payload safe to embed after `^FD`.
///
/// `^` and `~` start commands in any position, so each is replaced with a
/// space. The payload keeps its length; nothing is dropped.
pub fn escape_field_data(data: &str) -> String {
    data.chars()
        .map(|c| if c == '^' || c == '~' { ' ' } else { c })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_framing() {
        assert_eq!(start_format(), "^XA");
        assert_eq!(end_format(), "^XZ");
        assert_eq!(utf8_encoding(), "^CI28");
        assert_eq!(print_width(400), "^PW400");
        assert_eq!(label_length(240), "^LL240");
        assert_eq!(label_home(0, 0), "^LH0,0");
    }

    #[test]
    fn test_field_origin() {
        assert_eq!(field_origin(40, 32), "^FO40,32");
    }

    #[test]
    fn test_escape_preserves_length() {
        let raw = "a^b~c^^";
        let escaped = escape_field_data(raw);
        assert_eq!(escaped, "a b c  ");
        assert_eq!(escaped.chars().count(), raw.chars().count());
        assert!(!escaped.contains('^') && !escaped.contains('~'));
    }

    #[test]
    fn test_field_data() {
        assert_eq!(field_data("Ñandú"), "^FDÑandú^FS");
        assert_eq!(field_data("a_b"), "^FDa_b^FS");
    }

    #[test]
    fn test_field_data_hex_escapes_commands() {
        assert_eq!(field_data("Precio ^10~"), "^FH^FDPrecio _5E10_7E^FS");
        assert_eq!(field_data("uno\ndos_3"), "^FH^FDuno_0Ados_5F3^FS");
        assert_eq!(field_data("^XZ"), "^FH^FD_5EXZ^FS");
    }

    #[test]
    fn test_orientation_buckets() {
        let cases = [
            (0.0, 'N'),
            (44.9, 'N'),
            (45.0, 'R'),
            (90.0, 'R'),
            (134.9, 'R'),
            (135.0, 'I'),
            (224.9, 'I'),
            (225.0, 'B'),
            (314.9, 'B'),
            (315.0, 'N'),
            (359.9, 'N'),
            (360.0, 'N'),
            (-90.0, 'B'),
            (450.0, 'R'),
            (-720.0, 'N'),
        ];
        for (degrees, code) in cases {
            assert_eq!(Orientation::from_degrees(degrees).code(), code, "{}°", degrees);
        }
    }

    #[test]
    fn test_orientation_non_finite() {
        assert_eq!(Orientation::from_degrees(f32::NAN), Orientation::Normal);
        assert_eq!(Orientation::from_degrees(f32::INFINITY), Orientation::Normal);
    }

    #[test]
    fn test_sideways() {
        assert!(Orientation::Rotated.is_sideways());
        assert!(Orientation::Bottom.is_sideways());
        assert!(!Orientation::Inverted.is_sideways());
        assert_eq!(Orientation::Bottom.degrees(), 270);
    }
}
