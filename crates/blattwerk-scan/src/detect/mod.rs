// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection — edge map construction and extremal-corner
// estimation, composed into grid detection with a deterministic fallback.

pub mod corners;
pub mod edges;

pub use corners::estimate_corners;
pub use edges::{EdgeMap, edge_map};

use blattwerk_core::ScanConfig;
use tracing::{debug, info, instrument};

use crate::grid::ControlGrid;
use crate::raster::Raster;

/// Detect the page boundary in a photo and seed a full control grid from it.
///
/// Falls back to the default inset grid when the edge evidence is too thin —
/// degraded detection is not an error.
#[instrument(skip(source, config), fields(width = source.width(), height = source.height()))]
pub fn detect_grid(source: &Raster, config: &ScanConfig) -> ControlGrid {
    let edges = edge_map(source, config);
    match estimate_corners(&edges, config) {
        Some([tl, tr, br, bl]) => {
            info!(?tl, ?tr, ?br, ?bl, "Page boundary detected");
            ControlGrid::from_corners(tl, tr, br, bl)
        }
        None => {
            debug!("Insufficient edge evidence; using default inset grid");
            ControlGrid::inset(source.width(), source.height(), config.inset_ratio)
        }
    }
}

/// The default inset grid, always available without edge analysis.
pub fn default_grid(width: u32, height: u32) -> ControlGrid {
    ControlGrid::inset(width, height, ScanConfig::default().inset_ratio)
}

// -- Tests --------------------------------------------------------------------
