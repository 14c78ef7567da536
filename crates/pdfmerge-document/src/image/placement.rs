// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image placement — orientation, fit-to-page scaling and the drawing matrix for
// an image on an upright reference page. Pure arithmetic, no PDF library.
//
// A PDF page is always stored upright; a landscape image is laid out against
// the page with its axes swapped and then drawn rotated 90° counter-clockwise:
//
//   portrait page, portrait image        portrait page, landscape image
//   +---------------+                    +---------------+
//   |   +-------+   |                    |  +---------+  |
//   |   |       |   |                    |  |  image  |  |
//   |   | image |   |                    |  | rotated |  |
//   |   |       |   |                    |  |   90°   |  |
//   |   +-------+   |                    |  +---------+  |
//   +---------------+                    +---------------+
//
// All arithmetic is integer and truncating so placements are reproducible.

use pdfmerge_core::{Orientation, PaperSize};

/// Target bounds an image is fitted into, plus the orientation that chose them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub target_width: u32,
    pub target_height: u32,
    pub orientation: Orientation,
}

impl PageGeometry {
    /// Bounds for an image of `width` x `height` pixels on `paper`.
    pub fn for_image(width: u32, height: u32, paper: PaperSize) -> Self {
        let (page_w, page_h) = paper.whole_points();
        let orientation = Orientation::for_pixels(width, height);
        let (target_width, target_height) = match orientation {
            Orientation::Landscape => (page_h, page_w),
            Orientation::Portrait => (page_w, page_h),
        };
        Self {
            target_width,
            target_height,
            orientation,
        }
    }
}

/// Fit `image` inside `bound` preserving aspect ratio, never enlarging.
///
/// Width is constrained first; the height that results is then checked and,
/// if still too tall, constrained in turn. The order matters for rounding.
pub fn scale_to_fit(image: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (orig_w, orig_h) = (u64::from(image.0), u64::from(image.1));
    let (bound_w, bound_h) = (u64::from(bound.0), u64::from(bound.1));
    let (mut new_w, mut new_h) = (orig_w, orig_h);

    if orig_w > bound_w {
        new_w = bound_w;
        new_h = new_w * orig_h / orig_w;
    }

    if new_h > bound_h {
        new_h = bound_h;
        new_w = new_h * orig_w / orig_h;
    }

    (new_w as u32, new_h as u32)
}

/// Where and how an image is drawn on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    pub geometry: PageGeometry,
    /// Drawn size along the image's own axes, in points.
    pub draw_width: u32,
    pub draw_height: u32,
    /// Anchor of the image's origin on the page, in points from bottom-left.
    pub x: u32,
    pub y: u32,
    /// Counter-clockwise rotation applied at draw time: 0 or 90.
    pub rotation_degrees: u16,
}

impl ImagePlacement {
    /// Transformation matrix `[a b c d e f]` mapping the image unit square onto
    /// the page.
    pub fn unit_matrix(&self) -> [f32; 6] {
        let (w, h) = (self.draw_width as f32, self.draw_height as f32);
        let (x, y) = (self.x as f32, self.y as f32);
        match self.geometry.orientation {
            Orientation::Portrait => [w, 0.0, 0.0, h, x, y],
            // scale(w, h) followed by a quarter turn counter-clockwise
            Orientation::Landscape => [0.0, w, -h, 0.0, x, y],
        }
    }

    /// Same mapping, but for a source box of `pixel_width` x `pixel_height`
    /// units instead of the unit square.
    pub fn pixel_matrix(&self, pixel_width: u32, pixel_height: u32) -> [f32; 6] {
        let [a, b, c, d, e, f] = self.unit_matrix();
        let (sx, sy) = (pixel_width.max(1) as f32, pixel_height.max(1) as f32);
        [a / sx, b / sx, c / sy, d / sy, e, f]
    }

    /// Axis-aligned page rectangle covered by the drawn image: (x0, y0, x1, y1).
    pub fn page_rect(&self) -> (u32, u32, u32, u32) {
        match self.geometry.orientation {
            Orientation::Portrait => (
                self.x,
                self.y,
                self.x + self.draw_width,
                self.y + self.draw_height,
            ),
            Orientation::Landscape => (
                self.x - self.draw_height,
                self.y,
                self.x,
                self.y + self.draw_width,
            ),
        }
    }
}

/// Compute the placement of a `width` x `height` pixel image on `paper`.
///
/// Pixels are taken as points (72 dpi), so small images are drawn unscaled.
pub fn place_image(width: u32, height: u32, paper: PaperSize) -> ImagePlacement {
    let geometry = PageGeometry::for_image(width, height, paper);
    let (draw_width, draw_height) = scale_to_fit(
        (width, height),
        (geometry.target_width, geometry.target_height),
    );
    let (page_w, page_h) = paper.whole_points();

    let (x, y, rotation_degrees) = match geometry.orientation {
        Orientation::Portrait => (
            (page_w - draw_width) / 2,
            (page_h - draw_height) / 2,
            0,
        ),
        // The rotated image spans `draw_height` horizontally, ending at `x`.
        Orientation::Landscape => (
            page_w - (page_w - draw_height) / 2,
            (page_h - draw_width) / 2,
            90,
        ),
    };

    ImagePlacement {
        geometry,
        draw_width,
        draw_height,
        x,
        y,
        rotation_degrees,
    }
}
