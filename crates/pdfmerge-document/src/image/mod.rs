// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — page geometry and placement of raster images on PDF pages.

pub mod placement;

pub use placement::{ImagePlacement, PageGeometry, place_image, scale_to_fit};
