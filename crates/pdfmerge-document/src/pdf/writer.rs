// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image to PDF — wrap a single raster image into a one-page PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The image is drawn through an explicit transformation
// matrix so the landscape rotation lands exactly where `place_image` says.

use pdfmerge_core::{PaperSize, SourceError};
use printpdf::{
    CurTransMat, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage,
    RawImageData, RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::image::placement::place_image;
use crate::pdf::reader::PdfReader;

/// At 72 dpi one image pixel spans one point, which is what the placement
/// arithmetic assumes.
const POINTS_PER_INCH: f32 = 72.0;

/// Converts raster images into single-page PDFs on the reference page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageToPdfConverter {
    paper_size: PaperSize,
}

impl ImageToPdfConverter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    /// Create a single-page PDF containing the given image.
    ///
    /// Landscape images are drawn rotated onto an upright page; every image
    /// is shrunk to fit (never enlarged) and centred.
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len()))]
    pub fn convert(&self, image_bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
        let dynamic_image = ::image::load_from_memory(image_bytes)
            .map_err(|err| SourceError::ImageDecode(err.to_string()))?;

        let (img_width, img_height) = (dynamic_image.width(), dynamic_image.height());
        if img_width == 0 || img_height == 0 {
            return Err(SourceError::Render(format!(
                "image has no pixels ({img_width}x{img_height})"
            )));
        }

        let placement = place_image(img_width, img_height, self.paper_size);
        info!(
            img_width,
            img_height,
            orientation = ?placement.geometry.orientation,
            draw_width = placement.draw_width,
            draw_height = placement.draw_height,
            "Creating image PDF"
        );

        // PDF/A-1 forbids transparency, so alpha is flattened away here.
        let rgb_image = dynamic_image.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb_image.into_raw()),
            width: img_width as usize,
            height: img_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new("Image");
        let xobject_id = doc.add_image(&raw);

        // printpdf scales the XObject to its pixel box (at 72 dpi); the
        // matrix maps that box onto the page.
        let ops = vec![
            Op::SaveGraphicsState,
            Op::SetTransformationMatrix {
                matrix: CurTransMat::Raw(placement.pixel_matrix(img_width, img_height)),
            },
            Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    dpi: Some(POINTS_PER_INCH),
                    ..Default::default()
                },
            },
            Op::RestoreGraphicsState,
        ];

        let (page_w_mm, page_h_mm) = self.paper_size.dimensions_mm();
        let page = PdfPage::new(Mm(page_w_mm as f32), Mm(page_h_mm as f32), ops);
        doc.with_pages(vec![page]);

        // The default options resample large images; embed the pixels as decoded.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..Default::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&options, &mut warnings);
        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "Image page serialised"
        );

        let pages = PdfReader::from_bytes(&output)
            .map_err(|err| SourceError::Render(format!("generated PDF does not parse: {err}")))?
            .page_count();
        if pages != 1 {
            return Err(SourceError::Render(format!(
                "generated PDF has {pages} pages, expected 1"
            )));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use lopdf::Object;
    use lopdf::content::Content;

    fn png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Product of every `cm` operator on page 1, as `[a, b, c, d, e, f]`.
    fn effective_matrix(pdf: &[u8]) -> [f32; 6] {
        let reader = PdfReader::from_bytes(pdf).unwrap();
        let content = Content::decode(&reader.page_content(1).unwrap()).unwrap();
        let mut ctm = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        for op in content.operations.iter().filter(|op| op.operator == "cm") {
            let m: Vec<f32> = op.operands.iter().map(|o| o.as_float().unwrap()).collect();
            ctm = [
                m[0] * ctm[0] + m[1] * ctm[2],
                m[0] * ctm[1] + m[1] * ctm[3],
                m[2] * ctm[0] + m[3] * ctm[2],
                m[2] * ctm[1] + m[3] * ctm[3],
                m[4] * ctm[0] + m[5] * ctm[2] + ctm[4],
                m[4] * ctm[1] + m[5] * ctm[3] + ctm[5],
            ];
        }
        assert!(content.operations.iter().any(|op| op.operator == "Do"));
        ctm
    }

    fn assert_matrix(actual: [f32; 6], expected: [f32; 6]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.05, "matrix {actual:?}, expected {expected:?}");
        }
    }

    /// Pixel size of the single image XObject in `pdf`.
    fn embedded_image_size(pdf: &[u8]) -> (i64, i64) {
        let reader = PdfReader::from_bytes(pdf).unwrap();
        let images: Vec<_> = reader
            .document()
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
            })
            .map(|stream| {
                let width = stream.dict.get(b"Width").and_then(Object::as_i64).unwrap();
                let height = stream.dict.get(b"Height").and_then(Object::as_i64).unwrap();
                (width, height)
            })
            .collect();
        assert_eq!(images.len(), 1);
        images[0]
    }

    fn assert_upright_a4(pdf: &[u8]) {
        let reader = PdfReader::from_bytes(pdf).unwrap();
        assert_eq!(reader.page_count(), 1);
        let (w, h) = reader.page_size(1).unwrap();
        assert!((w - 595.28).abs() < 0.5, "unexpected width {w}");
        assert!((h - 841.89).abs() < 0.5, "unexpected height {h}");
    }

    #[test]
    fn portrait_image_becomes_one_a4_page() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 60, Rgb([200, 10, 10])));
        let pdf = ImageToPdfConverter::default().convert(&png(image)).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert_upright_a4(&pdf);
        // x = (595 - 40) / 2, y = (841 - 60) / 2
        assert_matrix(effective_matrix(&pdf), [40.0, 0.0, 0.0, 60.0, 277.0, 390.0]);
    }

    #[test]
    fn landscape_image_keeps_an_upright_page() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 30, Rgb([0, 0, 255])));
        let pdf = ImageToPdfConverter::default().convert(&png(image)).unwrap();
        assert_upright_a4(&pdf);
        // Rotated 90 degrees: x = 595 - (595 - 30) / 2, y = (841 - 90) / 2
        assert_matrix(effective_matrix(&pdf), [0.0, 90.0, -30.0, 0.0, 313.0, 375.0]);
    }

    #[test]
    fn oversized_landscape_image_fills_the_page() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1682, 1190, Rgb([30, 60, 90])));
        let pdf = ImageToPdfConverter::default().convert(&png(image)).unwrap();
        assert_matrix(effective_matrix(&pdf), [0.0, 841.0, -595.0, 0.0, 595.0, 0.0]);
    }

    #[test]
    fn large_images_are_embedded_at_full_resolution() {
        // About 6 MB of raw RGB, well past any resampling threshold.
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(1682, 1190, |x, y| {
            Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
        }));
        let pdf = ImageToPdfConverter::default().convert(&png(image)).unwrap();
        assert_eq!(embedded_image_size(&pdf), (1682, 1190));
    }

    #[test]
    fn transparent_image_is_flattened() {
        let image =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 255, 0, 128])));
        let pdf = ImageToPdfConverter::new(PaperSize::A4)
            .convert(&png(image))
            .unwrap();
        assert_upright_a4(&pdf);
    }

    #[test]
    fn truncated_image_fails_to_decode() {
        let mut bytes = png(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
        bytes.truncate(20);
        let err = ImageToPdfConverter::default().convert(&bytes).unwrap_err();
        assert!(matches!(err, SourceError::ImageDecode(_)), "got {err}");
    }
}
