// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration.

use serde::{Deserialize, Serialize};

/// Tuning constants for document boundary detection.
///
/// Detection is deterministic for a given config. The downstream components
/// (rectifier, filters) take no configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Gradient magnitude above which a pixel is marked as an edge.
    pub edge_threshold: f32,
    /// Grid stride (pixels) when sampling the edge mask for corner candidates.
    pub sample_stride: u32,
    /// Minimum number of candidate samples required before corner estimation
    /// is trusted; below this the default inset grid is used instead.
    pub min_edge_samples: usize,
    /// Margin of the fallback grid, as a fraction of each dimension.
    pub inset_ratio: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 50.0,
            sample_stride: 10,
            min_edge_samples: 100,
            inset_ratio: 0.05,
        }
    }
}
