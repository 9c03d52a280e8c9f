//! PDF fixtures built in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Build a PDF with one US Letter page per entry, each showing its text in Courier.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    build(pages, true)
}

/// Same as [`build_pdf`] but the page tree carries no `/MediaBox`.
pub fn build_pdf_without_media_box(pages: &[&str]) -> Vec<u8> {
    build(pages, false)
}

/// A PDF header followed by a truncated object.
pub fn truncated_pdf() -> Vec<u8> {
    let mut data = build_pdf(&["Hello"]);
    data.truncate(40);
    data
}

fn build(pages: &[&str], media_box: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let mut tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids.clone(),
        "Count" => kids.len() as i64,
        "Resources" => resources_id,
    };
    if media_box {
        let letter: Vec<Object> = vec![0.into(), 0.into(), 612.into(), 792.into()];
        tree.set("MediaBox", letter);
    }
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}
