// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner estimator — samples the edge mask on a coarse grid and picks four
// extremal points. An approximate heuristic, not contour extraction: a
// heavily rotated page can fool it, and the caller falls back to the inset
// grid when edge evidence is thin.

use blattwerk_core::{Point, ScanConfig};
use tracing::{debug, instrument};

use super::edges::EdgeMap;

/// Estimate the four page corners from an edge mask.
///
/// The mask is sampled at stride-aligned positions; positions whose mask
/// value exceeds 128 become candidates. Fewer candidates than
/// `min_edge_samples` means the evidence is too thin and `None` is returned.
///
/// Each corner minimizes one linear score (e.g. `x + y` for top-left). The
/// candidate list is re-sorted in place for each score and the first element
/// taken, so ties resolve by stable ascending sort order.
///
/// Returns `[tl, tr, br, bl]`.
#[instrument(skip(edges, config), fields(width = edges.width(), height = edges.height()))]
pub fn estimate_corners(edges: &EdgeMap, config: &ScanConfig) -> Option<[Point; 4]> {
    let stride = config.sample_stride.max(1);

    let mut candidates = Vec::new();
    let mut y = 0;
    while y < edges.height() {
        let mut x = 0;
        while x < edges.width() {
            if edges.value(x, y) > 128 {
                candidates.push(Point::new(x as f32, y as f32));
            }
            x += stride;
        }
        y += stride;
    }

    if candidates.len() < config.min_edge_samples {
        debug!(
            candidates = candidates.len(),
            min = config.min_edge_samples,
            "Too few edge samples for corner estimation"
        );
        return None;
    }

    let w = edges.width() as f32;
    let h = edges.height() as f32;

    candidates.sort_by(|a, b| (a.x + a.y).total_cmp(&(b.x + b.y)));
    let tl = candidates[0];

    candidates.sort_by(|a, b| ((w - a.x) + a.y).total_cmp(&((w - b.x) + b.y)));
    let tr = candidates[0];

    candidates.sort_by(|a, b| ((w - a.x) + (h - a.y)).total_cmp(&((w - b.x) + (h - b.y))));
    let br = candidates[0];

    candidates.sort_by(|a, b| (a.x + (h - a.y)).total_cmp(&(b.x + (h - b.y))));
    let bl = candidates[0];

    debug!(?tl, ?tr, ?br, ?bl, "Corners estimated");
    Some([tl, tr, br, bl])
}

// -- Tests --------------------------------------------------------------------
