// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge engine — concatenate normalised PDFs page by page into one PDF/A-1b
// document with `lopdf`, entirely in memory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};
use pdfmerge_core::{MergeConfig, MergeError, MergedDocument, NormalizedPdf};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::metadata::{ClassicInfo, MergeMetadata, MetadataBuilder, XmpPacket};
use crate::pdf::reader::{INHERITABLE_PAGE_KEYS, PdfReader, inherited_attribute};

/// Output version. PDF/A-1 is based on PDF 1.4.
const OUTPUT_PDF_VERSION: &str = "1.4";

/// Merges normalised PDFs under one set of metadata.
///
/// Holds no state between calls; each `merge` works on its own destination
/// document.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    metadata: MergeMetadata,
}

impl MergeEngine {
    pub fn new(metadata: MergeMetadata) -> Self {
        Self { metadata }
    }

    /// Engine for `config`, stamped with the current time.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(MergeMetadata::from_config(config, Utc::now()))
    }

    pub fn metadata(&self) -> &MergeMetadata {
        &self.metadata
    }

    /// Concatenate `sources` in order. Pages keep their order within each
    /// source. Any failure aborts the whole merge.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn merge(&self, sources: Vec<NormalizedPdf>) -> Result<MergedDocument, MergeError> {
        if sources.is_empty() {
            return Err(MergeError::NoSources);
        }

        // Metadata problems must surface before any source is touched.
        let (classic_info, xmp) = MetadataBuilder::build(&self.metadata)?;

        info!(sources = sources.len(), "Merging source documents into one PDF");

        let file_id = file_identifier(&sources, self.metadata.created);
        let source_count = sources.len();
        let mut accumulator = MergeAccumulator::new();
        for (index, source) in sources.into_iter().enumerate() {
            accumulator.append(index, source)?;
        }

        let (document, page_count) = accumulator.finish(&classic_info, &xmp, &file_id)?;
        let bytes = serialise(document)?;

        info!(
            page_count,
            output_bytes = bytes.len(),
            "PDF merge successful"
        );
        Ok(MergedDocument::new(bytes, page_count, source_count))
    }
}

/// Objects and pages collected from the sources so far.
struct MergeAccumulator {
    objects: BTreeMap<ObjectId, Object>,
    pages: Vec<(ObjectId, Dictionary)>,
    next_id: u32,
}

impl MergeAccumulator {
    fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            pages: Vec::new(),
            next_id: 1,
        }
    }

    /// Load one source and move its pages and objects into the accumulator.
    /// The source buffer is dropped on return.
    fn append(&mut self, index: usize, source: NormalizedPdf) -> Result<(), MergeError> {
        let reader = PdfReader::from_bytes(source.bytes()).map_err(|err| {
            MergeError::LoadSource {
                index,
                reason: err.to_string(),
            }
        })?;
        drop(source);

        if reader.is_encrypted() {
            return Err(MergeError::EncryptedSource { index });
        }

        let mut document = reader.into_document();
        document.renumber_objects_with(self.next_id);
        self.next_id = document.max_id + 1;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(MergeError::LoadSource {
                index,
                reason: "document has no pages".into(),
            });
        }

        for &page_id in &page_ids {
            let mut page = document
                .get_dictionary(page_id)
                .map_err(|err| {
                    MergeError::Structure(format!("source #{index} page {page_id:?}: {err}"))
                })?
                .clone();
            for key in INHERITABLE_PAGE_KEYS {
                if !page.has(key) {
                    if let Some(value) = inherited_attribute(&document, &page, key) {
                        let value = value.clone();
                        page.set(key.to_vec(), value);
                    }
                }
            }
            self.pages.push((page_id, page));
        }

        // Page-tree nodes and the catalog are rebuilt for the destination;
        // everything else the pages might reference is carried over.
        for (id, object) in document.objects {
            if page_ids.contains(&id) {
                continue;
            }
            let skip = matches!(object.type_name(), Ok(b"Catalog") | Ok(b"Pages"));
            if !skip {
                self.objects.insert(id, object);
            }
        }

        debug!(index, pages = page_ids.len(), "Source appended");
        Ok(())
    }

    /// Assemble the destination document around the collected pages.
    fn finish(
        self,
        classic_info: &ClassicInfo,
        xmp: &XmpPacket,
        file_id: &[u8],
    ) -> Result<(Document, usize), MergeError> {
        let mut document = Document::with_version(OUTPUT_PDF_VERSION);
        document.objects = self.objects;
        document.max_id = self.next_id;

        let pages_id = document.new_object_id();
        let page_count = self.pages.len();
        let mut kids = Vec::with_capacity(page_count);
        for (page_id, mut page) in self.pages {
            page.set("Parent", pages_id);
            document.objects.insert(page_id, Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let metadata_id = document.add_object(xmp.to_stream());
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "Metadata" => metadata_id,
        });
        let info_id = document.add_object(classic_info.to_dictionary());

        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);
        let id = Object::String(file_id.to_vec(), StringFormat::Hexadecimal);
        document.trailer.set("ID", vec![id.clone(), id]);

        let pruned = document.prune_objects();
        debug!(pruned = pruned.len(), "Unreferenced objects pruned");
        document.renumber_objects();

        let pages = document.get_pages().len();
        if pages != page_count {
            return Err(MergeError::Structure(format!(
                "page tree holds {pages} pages, expected {page_count}"
            )));
        }
        Ok((document, page_count))
    }
}

/// First 16 bytes of a SHA-256 over the inputs and the metadata timestamp.
fn file_identifier(sources: &[NormalizedPdf], created: DateTime<Utc>) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update((source.bytes().len() as u64).to_be_bytes());
        hasher.update(source.bytes());
    }
    hasher.update(created.to_rfc3339().as_bytes());
    let digest = hasher.finalize();
    debug!(file_id = %hex::encode(&digest[..16]), "File identifier computed");
    digest[..16].to_vec()
}

fn serialise(mut document: Document) -> Result<Vec<u8>, MergeError> {
    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| MergeError::Serialize(std::io::Error::other(err.to_string())))?;
    Ok(output)
}
