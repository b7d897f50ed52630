//! End-to-end tests: one design and its rows through every renderer.

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use etiqueta::design::{ColumnMapping, Design, Row, mapping_from_json, rows_from_json};
use etiqueta::expr::GenerationContext;
use etiqueta::printer::{Dpi, PrinterConfig};
use etiqueta::render::batch::Batch;
use etiqueta::render::document::{Document, DocumentOptions};
use etiqueta::render::preview::{PreviewOptions, render_preview};
use etiqueta::render::printer;
use etiqueta::render::scene::SceneKind;
use etiqueta::text::BuiltinMetrics;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap()
}

fn single_text_design(binding: &str) -> Design {
    let json = format!(
        r#"{{
            "width_mm": 50, "height_mm": 30,
            "elements": [
                {{"id": "t", "type": "text", "x": 2, "y": 2, "width": 46, "height": 10,
                  "binding": "{}", "text_content": "estatico"}}
            ]
        }}"#,
        binding
    );
    Design::from_json(&json).unwrap()
}

/// Field data (`^FD...^FS`) of every text field, in order.
fn field_data(zpl: &str) -> Vec<String> {
    zpl.lines()
        .filter_map(|line| line.strip_prefix("^FD"))
        .filter_map(|rest| rest.strip_suffix("^FS"))
        .map(str::to_string)
        .collect()
}

fn zpl_for(design: &Design, rows: &[Row], mapping: &ColumnMapping) -> String {
    let batch = Batch::with_context(design, rows, mapping, GenerationContext::new(now()));
    printer::render_batch(&batch, &PrinterConfig::default(), &BuiltinMetrics)
}

#[test]
fn test_qr_end_to_end() {
    let design = Design::from_json(
        r#"{
            "width_mm": 50, "height_mm": 30,
            "elements": [
                {"id": "q", "type": "qr", "x": 5, "y": 5, "width": 20, "height": 20,
                 "binding": "codigo"}
            ]
        }"#,
    )
    .unwrap();
    let rows = rows_from_json(r#"[{"codigo": "ABC123"}]"#).unwrap();
    let mapping = ColumnMapping::new();

    let zpl = zpl_for(&design, &rows, &mapping);
    assert_eq!(zpl.matches("^BQ").count(), 1);
    assert_eq!(zpl.matches("ABC123").count(), 1);
    assert!(zpl.contains("^FO40,40\n^BQN,2,"));

    let batch = Batch::with_context(&design, &rows, &mapping, GenerationContext::new(now()));
    let document = Document::from_batch(&batch, &DocumentOptions::label_pages(), &BuiltinMetrics);
    assert_eq!(document.pages.len(), 1);
    let page = &document.pages[0];
    assert_eq!((page.width_mm, page.height_mm), (50.0, 30.0));
    assert_eq!(page.labels.len(), 1);

    let placement = &page.labels[0];
    let codes: Vec<_> = placement
        .scene
        .items
        .iter()
        .filter_map(|item| match &item.kind {
            SceneKind::Code(code) => Some(code),
            _ => None,
        })
        .collect();
    assert_eq!(codes.len(), 1);
    assert_eq!(placement.x_mm + codes[0].symbol.x, 5.0);
    assert_eq!(placement.y_mm + codes[0].symbol.y, 5.0);

    let pdf = document.to_pdf().unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_lot_codes_share_the_batch_date() {
    let design = single_text_design("{{LOTE(AAMM-####)}}");
    let rows = rows_from_json(r#"[{"a": "1"}, {"a": "2"}, {"a": "3"}]"#).unwrap();

    let zpl = zpl_for(&design, &rows, &ColumnMapping::new());
    assert_eq!(field_data(&zpl), vec!["2403-0001", "2403-0002", "2403-0003"]);
}

#[test]
fn test_counter_over_rows() {
    let design = single_text_design("{{CONTADOR(1,1,4)}}");
    let rows = rows_from_json(r#"[{}, {}, {}]"#).unwrap();

    let zpl = zpl_for(&design, &rows, &ColumnMapping::new());
    assert_eq!(field_data(&zpl), vec!["0001", "0002", "0003"]);
}

#[test]
fn test_batch_emits_one_block_per_row() {
    let design = single_text_design("nombre");
    let rows = rows_from_json(r#"[{"nombre": "uno"}, {"nombre": "dos"}]"#).unwrap();

    let zpl = zpl_for(&design, &rows, &ColumnMapping::new());
    assert_eq!(zpl.matches("^XA").count(), 2);
    assert_eq!(zpl.matches("^XZ").count(), 2);
    assert!(zpl.contains("^XZ\n^XA"));
}

#[test]
fn test_binding_precedence_in_every_renderer() {
    let design = single_text_design("nombre");
    let rows = rows_from_json(r#"[{"nombre": "directo", "columna": "mapeado"}, {"nombre": "directo"}, {}]"#)
        .unwrap();
    let mapping = mapping_from_json(r#"{"t": "columna"}"#).unwrap();

    let zpl = zpl_for(&design, &rows, &mapping);
    assert_eq!(field_data(&zpl), vec!["mapeado", "directo", "estatico"]);

    let batch = Batch::with_context(&design, &rows, &mapping, GenerationContext::new(now()));
    let texts: Vec<String> = batch
        .scenes(&BuiltinMetrics)
        .map(|scene| match &scene.items[0].kind {
            SceneKind::Text(block) => block.lines.iter().map(|l| l.text.as_str()).collect(),
            other => panic!("expected text, got {:?}", other),
        })
        .collect();
    assert_eq!(texts, vec!["mapeado", "directo", "estatico"]);

    // an expression ignores the mapping
    let design = single_text_design("{{MAYUS(nombre)}}");
    let zpl = zpl_for(&design, &rows[..1], &mapping);
    assert_eq!(field_data(&zpl), vec!["DIRECTO"]);
}

#[test]
fn test_document_and_preview_agree() {
    let design = Design::from_json(
        r#"{
            "width_mm": 60, "height_mm": 40,
            "elements": [
                {"id": "t", "type": "text", "x": 4, "y": 6, "width": 52, "height": 12,
                 "binding": "nombre", "font_size": 20, "text_auto_fit": true},
                {"id": "b", "type": "barcode", "x": 4, "y": 20, "width": 52, "height": 16,
                 "binding": "codigo", "barcode_format": "code128"}
            ]
        }"#,
    )
    .unwrap();
    let rows = rows_from_json(r#"[{"nombre": "Aceite de oliva extra virgen", "codigo": "779123"}]"#).unwrap();
    let mapping = ColumnMapping::new();
    let ctx = GenerationContext::new(now());

    let batch = Batch::with_context(&design, &rows, &mapping, ctx.clone());
    let document = Document::from_batch(&batch, &DocumentOptions::label_pages(), &BuiltinMetrics);
    let printed = &document.pages[0].labels[0].scene;

    let frame = render_preview(
        &design,
        &rows[0],
        &mapping,
        &ctx.at_row(0),
        &PreviewOptions::default(),
        &BuiltinMetrics,
    );

    assert_eq!(printed.items.len(), frame.scene.items.len());
    for (a, b) in printed.items.iter().zip(&frame.scene.items) {
        assert_eq!(a.rect, b.rect);
        match (&a.kind, &b.kind) {
            (SceneKind::Text(x), SceneKind::Text(y)) => assert_eq!(x, y),
            (SceneKind::Code(x), SceneKind::Code(y)) => {
                assert_eq!(x.symbol, y.symbol);
                assert_eq!(x.caption, y.caption);
            }
            (x, y) => panic!("kinds differ: {:?} vs {:?}", x, y),
        }
    }

    let px = frame.rect_px(&frame.scene.items[0].rect);
    assert!((px.x - 4.0 * frame.px_per_mm).abs() < 1e-3);
    assert!((px.y - 6.0 * frame.px_per_mm).abs() < 1e-3);
}

#[test]
fn test_bad_barcode_skips_only_that_element() {
    let design = Design::from_json(
        r#"{
            "width_mm": 50, "height_mm": 30,
            "elements": [
                {"id": "e", "type": "barcode", "x": 2, "y": 2, "width": 40, "height": 12,
                 "binding": "codigo", "barcode_format": "ean13"},
                {"id": "t", "type": "text", "x": 2, "y": 16, "width": 40, "height": 8,
                 "text_content": "sigue"}
            ]
        }"#,
    )
    .unwrap();
    let rows = rows_from_json(r#"[{"codigo": "no es un numero"}]"#).unwrap();
    let mapping = ColumnMapping::new();

    let zpl = zpl_for(&design, &rows, &mapping);
    assert!(zpl.contains("^FDsigue^FS"));
    assert!(!zpl.contains("^BE"), "{}", zpl);
    assert!(!zpl.contains("^BY"), "{}", zpl);
    assert!(!zpl.contains("no es un numero"), "{}", zpl);
    assert!(zpl.ends_with("^XZ"));

    let batch = Batch::with_context(&design, &rows, &mapping, GenerationContext::new(now()));
    let scene = batch.scenes(&BuiltinMetrics).next().unwrap();
    assert!(matches!(scene.items[0].kind, SceneKind::Placeholder { .. }));
    let pdf = Document::from_batch(&batch, &DocumentOptions::default(), &BuiltinMetrics)
        .to_pdf()
        .unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_dpi_scales_field_origins() {
    let design = single_text_design("nombre");
    let rows = rows_from_json(r#"[{"nombre": "x"}]"#).unwrap();
    let mapping = ColumnMapping::new();
    let batch = Batch::with_context(&design, &rows, &mapping, GenerationContext::new(now()));

    let at_300 = printer::render_batch(&batch, &PrinterConfig::new(Dpi::Dpi300), &BuiltinMetrics);
    assert!(at_300.contains("^PW600\n^LL360"));
    assert!(at_300.contains("^FO24,24"));
}
