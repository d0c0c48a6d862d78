#![allow(dead_code)]

use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_session::*;
use std::sync::Arc;

pub const TEST_PAGE_HEIGHT: i64 = 150;

/// Build a PDF whose page `i` is `widths[i]` points wide, so copied pages
/// can be told apart by their MediaBox
pub fn create_test_pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for &width in widths {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(TEST_PAGE_HEIGHT),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(widths.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// Page `i` is `100 + i` points wide
pub fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let widths: Vec<i64> = (0..num_pages as i64).map(|i| 100 + i).collect();
    create_test_pdf_with_widths(&widths)
}

/// MediaBox widths of every page of a serialized PDF, in page order
pub fn page_widths(bytes: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            match &media_box[2] {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                other => panic!("unexpected MediaBox entry {other:?}"),
            }
        })
        .collect()
}

/// Renders blank pages, except for one page that always fails at one scale
pub struct FailingRenderer {
    pub page_number: u32,
    pub scale: f32,
}

impl PageRenderer for FailingRenderer {
    fn render_page(
        &self,
        document: &SourceDocument,
        page_number: u32,
        scale: f32,
    ) -> Result<RgbaImage> {
        if page_number == self.page_number && scale == self.scale {
            return Err(SessionError::Render(format!(
                "simulated fault on page {page_number}"
            )));
        }
        PageBoxRenderer.render_page(document, page_number, scale)
    }
}

pub fn blank_renderer() -> Arc<dyn PageRenderer> {
    Arc::new(PageBoxRenderer)
}
