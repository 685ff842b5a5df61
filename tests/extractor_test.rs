//! Integration tests for extraction from real PDF bytes.

mod common;

use common::{at, build_pdf, timers_page};
use telechunk::{
    build_chunks, extract_bytes, ChunkType, ChunkingConfig, Error, ExtractOptions, Normalizer,
    PdfExtractor,
};

#[test]
fn test_extract_blocks_and_captioned_table() {
    let pdf = build_pdf(&[timers_page()]);
    let doc = extract_bytes(&pdf, "raw/3gpp_spec/ts_38331.pdf").unwrap();

    assert_eq!(doc.document_id, "ts_38331.json");
    assert_eq!(doc.file_name, "ts_38331.pdf");
    assert_eq!(doc.total_pages, 1);
    assert_eq!(doc.metadata.pdf_version, "1.5");

    let page = &doc.pages[0];
    assert_eq!(page.width, 595.0);
    assert_eq!(page.height, 842.0);
    assert!(page.blocks.iter().any(|b| b.text == "Radio Resource Control"));

    assert_eq!(doc.tables.len(), 1);
    let table = &doc.tables[0];
    assert_eq!(table.page_no, 1);
    assert_eq!(table.table_index, 0);
    assert_eq!(table.caption.as_deref(), Some("Table 1: Timers"));
    assert!(table.surrounding_context.contains("Table 1: Timers"));
    assert_eq!(
        table.data,
        vec![
            vec![Some("Timer".to_string()), Some("Value".to_string())],
            vec![Some("T300".to_string()), Some("1000 ms".to_string())],
            vec![Some("T301".to_string()), Some("400 ms".to_string())],
        ]
    );
}

#[test]
fn test_table_text_is_not_repeated_in_prose() {
    let pdf = build_pdf(&[timers_page()]);
    let doc = extract_bytes(&pdf, "ts_38331.pdf").unwrap();
    let chunks = build_chunks(
        &doc,
        "3GPP",
        ChunkingConfig::default(),
        &Normalizer::new(),
    )
    .unwrap();

    let text: Vec<_> = chunks
        .iter()
        .filter(|c| c.chunk_type() == ChunkType::TextBlock)
        .collect();
    assert_eq!(text.len(), 1);
    assert!(text[0].context().contains("Radio Resource Control"));
    assert!(text[0].context().contains("configured by RRC."));
    assert!(!text[0].context().contains("T300"));

    let table = chunks
        .iter()
        .find(|c| c.chunk_type() == ChunkType::TechnicalTable)
        .unwrap();
    assert!(table.context().contains("[CAPTION: Table 1: Timers]"));
    assert!(table.context().contains("ROW 1: Timer: T300 | Value: 1000 ms"));
    assert!(table.context().contains("ROW 2: Timer: T301 | Value: 400 ms"));
}

#[test]
fn test_text_only_skips_tables() {
    let pdf = build_pdf(&[timers_page()]);
    let doc = PdfExtractor::from_bytes(&pdf, "ts.pdf", ExtractOptions::new().text_only())
        .unwrap()
        .extract()
        .unwrap();
    assert!(doc.tables.is_empty());
    assert!(!doc.pages[0].blocks.is_empty());
}

#[test]
fn test_require_caption_drops_bare_tables() {
    let page = vec![
        at(72, 680, "Name"),
        at(300, 680, "Range"),
        at(72, 665, "maxCells"),
        at(300, 665, "1..32"),
    ];
    let pdf = build_pdf(&[page]);

    let lenient = extract_bytes(&pdf, "ts.pdf").unwrap();
    assert_eq!(lenient.tables.len(), 1);
    assert_eq!(lenient.tables[0].caption, None);

    let strict = PdfExtractor::from_bytes(
        &pdf,
        "ts.pdf",
        ExtractOptions::new().with_require_caption(true),
    )
    .unwrap()
    .extract()
    .unwrap();
    assert!(strict.tables.is_empty());
}

#[test]
fn test_blank_pages_are_kept_empty() {
    let pdf = build_pdf(&[timers_page(), vec![]]);
    let doc = extract_bytes(&pdf, "ts.pdf").unwrap();
    assert_eq!(doc.total_pages, 2);
    assert_eq!(doc.pages.len(), 2);
    assert!(doc.pages[1].blocks.is_empty());
}

#[test]
fn test_rejects_non_pdf_bytes() {
    assert!(matches!(
        extract_bytes(b"<!DOCTYPE html><html></html>", "page.pdf"),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn test_document_round_trips_through_json() {
    let pdf = build_pdf(&[timers_page()]);
    let doc = extract_bytes(&pdf, "ts.pdf").unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    let back: telechunk::Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tables[0].data, doc.tables[0].data);
    assert_eq!(back.pages[0].blocks.len(), doc.pages[0].blocks.len());
}
