//! Output document assembly
//!
//! Pages are either copied structurally from a source document (organize,
//! split, merge) or appended as full-page JPEG images (annotated export).

use super::source::{SourceDocument, flattened_page};
use crate::types::*;
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Builds one output PDF page by page
pub struct PdfAssembler {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    jpeg_quality: u8,
}

impl PdfAssembler {
    pub fn new(jpeg_quality: u8) -> Self {
        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();
        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
            jpeg_quality,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Append copies of the given 0-based pages of `source`, in the given order
    pub fn copy_pages(&mut self, source: &SourceDocument, indices: &[usize]) -> Result<()> {
        let page_ids = indices
            .iter()
            .map(|&index| {
                source.page_id(index).ok_or(SessionError::InvalidPage {
                    page: index as u32 + 1,
                    page_count: source.page_count(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // One cache per source so shared resources are copied once. Target pages
        // are registered up front so links between them resolve to the copies.
        let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut targets = Vec::with_capacity(page_ids.len());
        for page_id in page_ids {
            let new_page_id = self.output.new_object_id();
            cache.insert(page_id, new_page_id);
            targets.push((page_id, new_page_id));
        }

        for (page_id, new_page_id) in targets {
            self.copy_page(source.pdf(), page_id, new_page_id, &mut cache)?;
        }
        Ok(())
    }

    fn copy_page(
        &mut self,
        source: &Document,
        page_id: ObjectId,
        new_page_id: ObjectId,
        cache: &mut HashMap<ObjectId, ObjectId>,
    ) -> Result<()> {
        let page = flattened_page(source, page_id)?;

        let mut new_page = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            new_page.set(
                key.clone(),
                copy_object_deep(&mut self.output, source, value, cache)?,
            );
        }
        new_page.set("Parent", Object::Reference(self.pages_tree_id));

        self.output
            .objects
            .insert(new_page_id, Object::Dictionary(new_page));
        self.page_refs.push(Object::Reference(new_page_id));
        Ok(())
    }

    /// Append a raster as one full-bleed page.
    ///
    /// The page box is the raster size divided by `scale`, so a page rendered
    /// at 2x comes back at its original size in points.
    pub fn append_raster_as_page(
        &mut self,
        raster: &RgbaImage,
        orientation: Orientation,
        scale: f32,
    ) -> Result<()> {
        let (width_px, height_px) = raster.dimensions();
        let jpeg = encode_jpeg(raster, self.jpeg_quality)?;

        let image_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width_px as i64)),
            ("Height", Object::Integer(height_px as i64)),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]);
        let mut image_stream = Stream::new(image_dict, jpeg);
        // Already DCT-compressed
        image_stream.allows_compression = false;
        let image_id = self.output.add_object(image_stream);

        let scale = if scale > 0.0 { scale } else { 1.0 };
        let (width_pt, height_pt) =
            orientation.apply(width_px as f32 / scale, height_px as f32 / scale);

        let content = format!("q\n{width_pt:.2} 0 0 {height_pt:.2} 0 0 cm\n/Im0 Do\nQ\n");
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let resources = Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Im0",
                Object::Reference(image_id),
            )])),
        )]);

        let page_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_tree_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width_pt),
                    Object::Real(height_pt),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }

    /// Finish the page tree and catalog, and write the document
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        if self.page_refs.is_empty() {
            return Err(SessionError::EmptySelection(
                "No pages to write".to_string(),
            ));
        }

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        let mut writer = Vec::new();
        self.output.save_to(&mut writer)?;
        Ok(writer)
    }
}

/// Flatten alpha onto white and encode as baseline JPEG
fn encode_jpeg(raster: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let mut flattened = image::RgbImage::new(raster.width(), raster.height());
    for (dst, src) in flattened.pixels_mut().zip(raster.pixels()) {
        let alpha = src.0[3] as u16;
        for c in 0..3 {
            dst.0[c] = ((src.0[c] as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&flattened)?;
    Ok(bytes)
}

fn is_page_tree_node(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page" || name == b"Pages")
}

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. Ids are
/// reserved before recursing so reference cycles terminate.
pub(crate) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            // Dangling references become null, as readers treat them
            let Ok(referenced) = source.get_object(*id) else {
                return Ok(Object::Null);
            };
            // Pages outside the copy set are not pulled in through links
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}
