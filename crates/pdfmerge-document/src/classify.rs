// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content sniffing — decide whether a source is a PDF or a raster image by
// looking at its bytes. Upload file names are untrusted and never consulted.

use ::image::ImageFormat;
use pdfmerge_core::{ImageKind, MimeKind, SourceError, SourceItem};
use tracing::{debug, instrument};

/// PDF readers accept a header that starts anywhere in the first 1024 bytes.
const PDF_HEADER_WINDOW: usize = 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A source after classification, still holding its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedSource {
    Pdf(Vec<u8>),
    Image { bytes: Vec<u8>, kind: ImageKind },
}

impl ClassifiedSource {
    pub fn mime_kind(&self) -> MimeKind {
        match self {
            Self::Pdf(_) => MimeKind::Pdf,
            Self::Image { kind, .. } => MimeKind::Image(*kind),
        }
    }
}

/// Classify an in-memory byte buffer.
pub fn classify(bytes: &[u8]) -> Result<MimeKind, SourceError> {
    if bytes.is_empty() {
        return Err(SourceError::Empty);
    }

    // An image signature sits at offset 0; its metadata may mention `%PDF-`.
    if let Ok(format) = ::image::guess_format(bytes) {
        return Ok(MimeKind::Image(image_kind(format)));
    }

    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(MimeKind::Pdf);
    }
    Err(SourceError::Unrecognized)
}

/// Read a source to the end and classify it. The source is closed on return.
#[instrument(skip_all, fields(name = source.name().unwrap_or("<unnamed>")))]
pub fn classify_source(
    source: SourceItem,
) -> Result<(Option<String>, ClassifiedSource), SourceError> {
    let (name, bytes) = source.read_all()?;
    let kind = classify(&bytes)?;
    debug!(mime = kind.mime_type(), bytes_len = bytes.len(), "Source classified");

    let classified = match kind {
        MimeKind::Pdf => ClassifiedSource::Pdf(bytes),
        MimeKind::Image(kind) => ClassifiedSource::Image { bytes, kind },
    };
    Ok((name, classified))
}

fn image_kind(format: ImageFormat) -> ImageKind {
    match format {
        ImageFormat::Png => ImageKind::Png,
        ImageFormat::Jpeg => ImageKind::Jpeg,
        ImageFormat::Gif => ImageKind::Gif,
        ImageFormat::Bmp => ImageKind::Bmp,
        ImageFormat::Tiff => ImageKind::Tiff,
        ImageFormat::WebP => ImageKind::WebP,
        ImageFormat::Ico => ImageKind::Ico,
        ImageFormat::Pnm => ImageKind::Pnm,
        ImageFormat::Tga => ImageKind::Tga,
        _ => ImageKind::Other,
    }
}
