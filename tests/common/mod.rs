//! Shared fixtures: small PDFs built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A string drawn at a PDF-space position (origin bottom-left) in 10pt Courier.
pub struct Placed<'a> {
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

pub fn at(x: i64, y: i64, text: &str) -> Placed<'_> {
    Placed { x, y, text }
}

/// Build an A4 PDF with one page per entry of `pages`.
pub fn build_pdf(pages: &[Vec<Placed<'_>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for strings in pages {
        let mut operations = Vec::new();
        for placed in strings {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), Object::Integer(10)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(placed.x), Object::Integer(placed.y)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(placed.text)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// One page: a heading, a captioned two-column table, and a paragraph.
pub fn timers_page() -> Vec<Placed<'static>> {
    vec![
        at(72, 780, "Radio Resource Control"),
        at(150, 700, "Table 1: Timers"),
        at(72, 680, "Timer"),
        at(300, 680, "Value"),
        at(72, 665, "T300"),
        at(300, 665, "1000 ms"),
        at(72, 650, "T301"),
        at(300, 650, "400 ms"),
        at(72, 550, "The timers above are configured by RRC."),
    ]
}
