// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-scan — Geometric rectification and pixel-transform pipeline.
//
// Provides the raster value type, document boundary detection (edge map +
// corner estimation), the movable 3×3 control grid, inverse bilinear-patch
// rectification, tone filters, and lossless 90° orientation transforms.

pub mod detect;
pub mod filter;
pub mod grid;
pub mod raster;
pub mod rectify;

// Re-export the primary API so callers can use `blattwerk_scan::rectify` etc.
pub use detect::{default_grid, detect_grid};
pub use filter::apply_filter;
pub use grid::{ControlGrid, Quad};
pub use raster::Raster;
pub use rectify::rectify;
