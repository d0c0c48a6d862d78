//! Loaded source documents

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use std::sync::Arc;

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// A parsed PDF plus its raw bytes (the renderer works from the bytes).
///
/// Cloning is cheap; both halves are shared.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    bytes: Arc<[u8]>,
    pdf: Arc<Document>,
    page_ids: Arc<[ObjectId]>,
}

impl SourceDocument {
    /// Parse a document. Unreadable input and documents without pages are load failures.
    pub async fn load(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let bytes: Arc<[u8]> = bytes.into();
        let parse_bytes = Arc::clone(&bytes);
        let pdf = tokio::task::spawn_blocking(move || Document::load_mem(&parse_bytes))
            .await?
            .map_err(|e| SessionError::load(format!("{name}: {e}")))?;

        let page_ids: Vec<ObjectId> = pdf.get_pages().values().copied().collect();
        if page_ids.is_empty() {
            return Err(SessionError::load(format!("{name}: document has no pages")));
        }
        log::info!("Loaded {} ({} pages)", name, page_ids.len());

        Ok(Self {
            name,
            bytes,
            pdf: Arc::new(pdf),
            page_ids: page_ids.into(),
        })
    }

    /// Read and parse a document from disk
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SessionError::load(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::load(name, bytes).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pdf(&self) -> &Document {
        &self.pdf
    }

    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Object id of a page by 0-based original index
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.page_ids.get(index).copied()
    }

    /// Page size in points for a 1-based page number, honouring /Rotate
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32)> {
        let index = self.check_page(page_number)?;
        let page_id = self.page_ids[index];
        let (width, height) = inherited_attribute(&self.pdf, page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|mb| media_box_size(mb))
            .unwrap_or(DEFAULT_PAGE_DIMENSIONS);
        let rotate = inherited_attribute(&self.pdf, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        if rotate.rem_euclid(180) == 90 {
            Ok((height, width))
        } else {
            Ok((width, height))
        }
    }

    /// 0-based index of a 1-based page number
    pub(crate) fn check_page(&self, page_number: u32) -> Result<usize> {
        if page_number == 0 || page_number > self.page_count() {
            return Err(SessionError::InvalidPage {
                page: page_number,
                page_count: self.page_count(),
            });
        }
        Ok(page_number as usize - 1)
    }
}

/// Look up `key` on a page or the nearest ancestor that defines it
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Bounded walk guards against cyclic Parent links
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn media_box_size(media_box: &[Object]) -> Option<(f32, f32)> {
    if media_box.len() != 4 {
        return None;
    }
    let llx = extract_number(&media_box[0])?;
    let lly = extract_number(&media_box[1])?;
    let urx = extract_number(&media_box[2])?;
    let ury = extract_number(&media_box[3])?;
    Some(((urx - llx).abs(), (ury - lly).abs()))
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Copy of a page dictionary with inherited attributes made explicit
pub(crate) fn flattened_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    for key in INHERITABLE_KEYS {
        if page.get(key).is_err() {
            if let Some(value) = inherited_attribute(doc, page_id, key) {
                page.set(key.to_vec(), value.clone());
            }
        }
    }
    Ok(page)
}
