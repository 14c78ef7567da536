// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the pdfmerge pipeline.

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// MIME type of every merged document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// File name suggested to callers that offer the result as a download.
pub const DEFAULT_OUTPUT_FILENAME: &str = "output.pdf";

/// Raster formats recognised by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Ico,
    Pnm,
    Tga,
    /// Any other signature the decoder knows about.
    Other,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
            Self::Ico => "image/x-icon",
            Self::Pnm => "image/x-portable-anymap",
            Self::Tga => "image/x-tga",
            Self::Other => "application/octet-stream",
        }
    }
}

/// What a source turned out to be after sniffing its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MimeKind {
    Pdf,
    Image(ImageKind),
}

impl MimeKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_CONTENT_TYPE,
            Self::Image(kind) => kind.mime_type(),
        }
    }
}

/// Reference page used for image pages. Only A4 is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f64, f64) {
        let (w_mm, h_mm) = self.dimensions_mm();
        (mm_to_pt(w_mm), mm_to_pt(h_mm))
    }

    /// Dimensions truncated to whole points; image placement works on these.
    ///
    /// A4 is 595.28 x 841.89 pt, so this yields (595, 841).
    pub fn whole_points(&self) -> (u32, u32) {
        let (w, h) = self.dimensions_pt();
        (w as u32, h as u32)
    }
}

fn mm_to_pt(mm: u32) -> f64 {
    f64::from(mm) * 72.0 / 25.4
}

/// Page orientation of a generated image page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape iff the image is strictly wider than tall.
    pub fn for_pixels(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

/// One uploaded input: an owned byte stream plus an untrusted filename hint.
///
/// The stream is consumed exactly once and dropped as soon as the pipeline is
/// done with it.
pub struct SourceItem {
    name: Option<String>,
    reader: Box<dyn Read + Send>,
}

impl SourceItem {
    pub fn from_reader(name: Option<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name,
            reader: Box::new(reader),
        }
    }

    pub fn from_bytes(name: Option<String>, bytes: Vec<u8>) -> Self {
        Self::from_reader(name, std::io::Cursor::new(bytes))
    }

    /// Open a file as a source, using its file name as the hint.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self::from_reader(name, file))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Drain the stream into memory. The stream is closed on return.
    pub fn read_all(self) -> std::io::Result<(Option<String>, Vec<u8>)> {
        let Self { name, mut reader } = self;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok((name, bytes))
    }
}

impl fmt::Debug for SourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceItem")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a normalised PDF came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdfOrigin {
    /// The source already was a PDF; bytes are untouched.
    PassThrough,
    /// Synthesised from a raster image.
    FromImage(ImageKind),
}

/// A single PDF document ready to be merged.
#[derive(Debug, Clone)]
pub struct NormalizedPdf {
    name: Option<String>,
    origin: PdfOrigin,
    bytes: Vec<u8>,
}

impl NormalizedPdf {
    pub fn new(name: Option<String>, origin: PdfOrigin, bytes: Vec<u8>) -> Self {
        Self {
            name,
            origin,
            bytes,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn origin(&self) -> PdfOrigin {
        self.origin
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The merged output. Immutable; the caller owns it.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    bytes: Vec<u8>,
    page_count: usize,
    source_count: usize,
}

impl MergedDocument {
    pub fn new(bytes: Vec<u8>, page_count: usize, source_count: usize) -> Self {
        Self {
            bytes,
            page_count,
            source_count,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of normalised documents that went into the merge.
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_whole_points_truncate() {
        assert_eq!(PaperSize::A4.whole_points(), (595, 841));
    }

    #[test]
    fn square_images_are_portrait() {
        assert_eq!(Orientation::for_pixels(500, 500), Orientation::Portrait);
        assert_eq!(Orientation::for_pixels(501, 500), Orientation::Landscape);
        assert_eq!(Orientation::for_pixels(499, 500), Orientation::Portrait);
    }

    #[test]
    fn read_all_returns_name_and_bytes() {
        let item = SourceItem::from_bytes(Some("scan.png".into()), vec![1, 2, 3]);
        assert_eq!(item.name(), Some("scan.png"));
        let (name, bytes) = item.read_all().unwrap();
        assert_eq!(name.as_deref(), Some("scan.png"));
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn mime_types() {
        assert_eq!(MimeKind::Pdf.mime_type(), "application/pdf");
        assert_eq!(MimeKind::Image(ImageKind::Jpeg).mime_type(), "image/jpeg");
    }
}
