//! # Binding Resolution
//!
//! Decides what an element shows for a given row. Every renderer goes
//! through these two functions, so the precedence is the same everywhere:
//!
//! | Binding | Result |
//! |---------|--------|
//! | contains `{{` | expression evaluation (mapping and row lookup ignored) |
//! | column name | `row[mapping[id]]`, then `row[binding]`, then static text |
//! | empty | static text |
//!
//! A mapped or direct lookup only counts when the cell is non-empty.

use crate::design::{ColumnMapping, Element, Row};
use crate::expr::{self, GenerationContext};

/// Text shown by a text element (or a code caption).
pub fn resolve_text(
    element: &Element,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
) -> String {
    resolve(element, row, mapping, ctx).unwrap_or_else(|| element.text_content().to_string())
}

/// Content encoded by a QR or barcode element.
///
/// When nothing resolves, the static fallback is `text_content`, or the
/// binding itself taken literally when `text_content` is empty.
pub fn resolve_code_value(
    element: &Element,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
) -> String {
    resolve(element, row, mapping, ctx).unwrap_or_else(|| {
        let static_text = element.text_content();
        if static_text.is_empty() {
            element.binding().to_string()
        } else {
            static_text.to_string()
        }
    })
}

/// The dynamic part of the chain. `None` means "use the static fallback".
fn resolve(
    element: &Element,
    row: &Row,
    mapping: &ColumnMapping,
    ctx: &GenerationContext,
) -> Option<String> {
    let binding = element.binding().trim();

    if expr::is_template(binding) {
        return Some(expr::evaluate(binding, row, ctx));
    }
    if binding.is_empty() {
        return None;
    }

    let mapped = mapping
        .get(&element.id)
        .and_then(|column| row.get(column))
        .filter(|v| !v.is_empty());
    if let Some(value) = mapped {
        return Some(value.clone());
    }

    row.get(binding).filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{BarcodeElement, ElementKind, TextElement};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ctx() -> GenerationContext {
        GenerationContext::new(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn text(binding: &str, content: &str) -> Element {
        Element::new(
            "t1",
            0.0,
            0.0,
            20.0,
            5.0,
            ElementKind::Text(TextElement {
                binding: binding.to_string(),
                text_content: content.to_string(),
                ..TextElement::default()
            }),
        )
    }

    fn barcode(binding: &str, content: &str) -> Element {
        Element::new(
            "b1",
            0.0,
            0.0,
            30.0,
            10.0,
            ElementKind::Barcode(BarcodeElement {
                binding: binding.to_string(),
                text_content: content.to_string(),
                ..BarcodeElement::default()
            }),
        )
    }

    fn row() -> Row {
        [("producto", "Yerba"), ("alias", "Mate"), ("vacio", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expression_wins_over_mapping() {
        let el = text("{{MAYUS(producto)}}", "static");
        let mapping: ColumnMapping = [("t1".to_string(), "alias".to_string())].into();
        assert_eq!(resolve_text(&el, &row(), &mapping, &ctx()), "YERBA");
    }

    #[test]
    fn test_mapping_wins_over_direct_binding() {
        let el = text("producto", "static");
        let mapping: ColumnMapping = [("t1".to_string(), "alias".to_string())].into();
        assert_eq!(resolve_text(&el, &row(), &mapping, &ctx()), "Mate");
    }

    #[test]
    fn test_empty_mapped_cell_falls_to_direct() {
        let el = text("producto", "static");
        let mapping: ColumnMapping = [("t1".to_string(), "vacio".to_string())].into();
        assert_eq!(resolve_text(&el, &row(), &mapping, &ctx()), "Yerba");
    }

    #[test]
    fn test_static_fallback() {
        let el = text("desconocido", "static");
        assert_eq!(
            resolve_text(&el, &row(), &ColumnMapping::new(), &ctx()),
            "static"
        );
        let el = text("", "solo texto");
        assert_eq!(
            resolve_text(&el, &row(), &ColumnMapping::new(), &ctx()),
            "solo texto"
        );
    }

    #[test]
    fn test_code_value_uses_binding_literal() {
        let el = barcode("7790001", "");
        assert_eq!(
            resolve_code_value(&el, &Row::new(), &ColumnMapping::new(), &ctx()),
            "7790001"
        );
        let el = barcode("sku", "fallback");
        assert_eq!(
            resolve_code_value(&el, &Row::new(), &ColumnMapping::new(), &ctx()),
            "fallback"
        );
    }

    #[test]
    fn test_empty_row_uses_static() {
        let el = text("producto", "Etiqueta");
        assert_eq!(
            resolve_text(&el, &Row::new(), &ColumnMapping::new(), &ctx()),
            "Etiqueta"
        );
    }
}
