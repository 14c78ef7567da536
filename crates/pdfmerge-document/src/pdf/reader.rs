// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — load PDF bytes with `lopdf` and inspect pages and metadata.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_PAGE_KEYS: [&[u8]; 4] =
    [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic /Parent chains in damaged files.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Read-only view of a PDF document held in memory.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Parse raw PDF bytes.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, lopdf::Error> {
        let document = Document::load_mem(data)?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn is_encrypted(&self) -> bool {
        self.document.is_encrypted()
    }

    /// Page object ids in reading order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    /// Effective /MediaBox size (width, height) of a page, 1-indexed.
    pub fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        let page = self.document.get_dictionary(page_id).ok()?;
        let media_box = inherited_attribute(&self.document, page, b"MediaBox")?;
        let corners: Vec<f32> = media_box
            .as_array()
            .ok()?
            .iter()
            .map(|value| value.as_float().ok())
            .collect::<Option<_>>()?;
        match corners.as_slice() {
            [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    /// Decoded content stream(s) of a page, 1-indexed.
    pub fn page_content(&self, page_number: u32) -> Option<Vec<u8>> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        self.document.get_page_content(page_id).ok()
    }

    /// A text entry of the document-info dictionary, e.g. `b"Title"`.
    pub fn info_text(&self, key: &[u8]) -> Option<String> {
        let info = match self.document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.document.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match info.get(key).ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// The catalog's XMP metadata stream as text.
    pub fn xmp_metadata(&self) -> Option<String> {
        let catalog = self.document.catalog().ok()?;
        let metadata_id = catalog.get(b"Metadata").ok()?.as_reference().ok()?;
        let stream = self.document.get_object(metadata_id).ok()?.as_stream().ok()?;
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        String::from_utf8(content).ok()
    }

    /// The trailer's /ID entry, if present.
    pub fn file_id(&self) -> Option<Vec<Vec<u8>>> {
        let ids = self.document.trailer.get(b"ID").ok()?.as_array().ok()?;
        ids.iter()
            .map(|id| match id {
                Object::String(bytes, _) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Look `key` up on a page, then on each ancestor page-tree node.
pub(crate) fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    if let Ok(value) = page.get(key) {
        return Some(value);
    }

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = document.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Decode a PDF text string: UTF-16BE when it starts with a byte-order mark,
/// otherwise one byte per character.
pub fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
