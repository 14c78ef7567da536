// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source normaliser — turn a batch of mixed PDF/image sources into PDFs,
// dropping (and logging) any source that cannot be turned into one.

use pdfmerge_core::{NormalizedPdf, PaperSize, PdfOrigin, SourceError, SourceItem};
use tracing::{error, info, instrument};

use crate::classify::{ClassifiedSource, classify_source};
use crate::pdf::writer::ImageToPdfConverter;

/// A source that was dropped from the batch, and why.
#[derive(Debug)]
pub struct SkippedSource {
    /// Position of the source in the input batch.
    pub index: usize,
    pub name: Option<String>,
    pub error: SourceError,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceNormalizer {
    converter: ImageToPdfConverter,
}

impl SourceNormalizer {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            converter: ImageToPdfConverter::new(paper_size),
        }
    }

    /// Normalise `sources` in order. Failing sources are logged and left out.
    pub fn normalize(&self, sources: Vec<SourceItem>) -> Vec<NormalizedPdf> {
        self.normalize_with_report(sources).0
    }

    /// Like [`normalize`](Self::normalize), also returning the dropped sources.
    ///
    /// Every source stream is consumed and closed before this returns,
    /// whatever its outcome.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn normalize_with_report(
        &self,
        sources: Vec<SourceItem>,
    ) -> (Vec<NormalizedPdf>, Vec<SkippedSource>) {
        let total = sources.len();
        let mut normalized = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (index, source) in sources.into_iter().enumerate() {
            let name = source.name().map(str::to_owned);
            match self.normalize_one(source) {
                Ok(pdf) => normalized.push(pdf),
                Err(err) => {
                    error!(
                        index,
                        name = name.as_deref().unwrap_or("<unnamed>"),
                        error = %err,
                        "Source skipped"
                    );
                    skipped.push(SkippedSource {
                        index,
                        name,
                        error: err,
                    });
                }
            }
        }

        info!(
            total,
            normalized = normalized.len(),
            skipped = skipped.len(),
            "Sources normalised"
        );
        (normalized, skipped)
    }

    fn normalize_one(&self, source: SourceItem) -> Result<NormalizedPdf, SourceError> {
        let (name, classified) = classify_source(source)?;
        match classified {
            ClassifiedSource::Pdf(bytes) => {
                Ok(NormalizedPdf::new(name, PdfOrigin::PassThrough, bytes))
            }
            ClassifiedSource::Image { bytes, kind } => {
                let pdf = self.converter.convert(&bytes)?;
                Ok(NormalizedPdf::new(name, PdfOrigin::FromImage(kind), pdf))
            }
        }
    }
}
