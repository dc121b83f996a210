// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge map builder — Gaussian smoothing followed by a thresholded Sobel
// gradient. Deliberately simple: no hysteresis, no non-maximum suppression.

use blattwerk_core::ScanConfig;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::raster::Raster;

/// 3×3 Gaussian kernel, normalized by 16.
const BLUR_KERNEL: [u32; 9] = [1, 2, 1, 2, 4, 2, 1, 2, 1];
const BLUR_KERNEL_SUM: u32 = 16;

const SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// Binary edge mask: one byte per pixel, 0 or 255.
///
/// The 1-pixel border ring is never marked — convolution skips it, so border
/// pixels are excluded from all downstream consideration.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    mask: Vec<u8>,
}

impl EdgeMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mask value at (x, y): 255 for an edge pixel, 0 otherwise.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.mask[y as usize * self.width as usize + x as usize]
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }
}

/// Build the binary edge mask for a raster.
///
/// Steps: 3×3 Gaussian blur per RGB channel (border ring passed through
/// untouched), luminance as the unweighted mean of the blurred channels —
/// not perceptual luma — then a 3×3 Sobel gradient on that luminance. A
/// pixel is an edge iff the gradient magnitude exceeds the threshold.
#[instrument(skip(source, config), fields(width = source.width(), height = source.height()))]
pub fn edge_map(source: &Raster, config: &ScanConfig) -> EdgeMap {
    let w = source.width() as usize;
    let h = source.height() as usize;

    let mut mask = vec![0u8; w * h];
    if w < 3 || h < 3 {
        return EdgeMap {
            width: source.width(),
            height: source.height(),
            mask,
        };
    }

    let blurred = blur_rgb(source);
    let luma = mean_luminance(&blurred);

    // Sobel over the interior; rows are independent.
    let row_len = w;
    mask[row_len..(h - 1) * row_len]
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(i, row)| {
            let y = i + 1;
            for x in 1..w - 1 {
                let mut gx = 0.0f32;
                let mut gy = 0.0f32;
                for ky in 0..3 {
                    for kx in 0..3 {
                        let v = luma[(y + ky - 1) * w + (x + kx - 1)];
                        let k = ky * 3 + kx;
                        gx += v * SOBEL_X[k];
                        gy += v * SOBEL_Y[k];
                    }
                }
                if (gx * gx + gy * gy).sqrt() > config.edge_threshold {
                    row[x] = 255;
                }
            }
        });

    debug!("Edge mask built");
    EdgeMap {
        width: source.width(),
        height: source.height(),
        mask,
    }
}

/// 3×3 Gaussian blur applied per RGB channel. The output starts as a copy of
/// the source, so the border ring keeps its original values; alpha is carried
/// through unchanged.
fn blur_rgb(source: &Raster) -> Vec<u8> {
    let w = source.width() as usize;
    let h = source.height() as usize;
    let src = source.bytes();
    let mut blurred = src.to_vec();

    let row_len = w * 4;
    blurred[row_len..(h - 1) * row_len]
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(i, row)| {
            let y = i + 1;
            for x in 1..w - 1 {
                let mut acc = [0u32; 3];
                for ky in 0..3 {
                    for kx in 0..3 {
                        let k = BLUR_KERNEL[ky * 3 + kx];
                        let idx = ((y + ky - 1) * w + (x + kx - 1)) * 4;
                        for (c, sum) in acc.iter_mut().enumerate() {
                            *sum += src[idx + c] as u32 * k;
                        }
                    }
                }
                let out = x * 4;
                for (c, sum) in acc.iter().enumerate() {
                    row[out + c] = ((sum + BLUR_KERNEL_SUM / 2) / BLUR_KERNEL_SUM) as u8;
                }
            }
        });

    blurred
}

/// Unweighted mean of the RGB channels, as one f32 per pixel.
fn mean_luminance(rgba: &[u8]) -> Vec<f32> {
    rgba.chunks_exact(4)
        .map(|px| (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0)
        .collect()
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_gray(width: u32, height: u32) -> Raster {
        Raster::filled(width, height, [128, 128, 128, 255])
    }

    #[test]
    fn uniform_raster_has_no_edges() {
        let edges = edge_map(&flat_gray(64, 48), &ScanConfig::default());
        assert!(edges.mask().iter().all(|&v| v == 0));
    }

    #[test]
    fn step_edge_is_detected() {
        // Left half black, right half white: a strong vertical edge.
        let (w, h) = (40u32, 20u32);
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for _y in 0..h {
            for x in 0..w {
                let v = if x < w / 2 { 0u8 } else { 255u8 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let raster = Raster::from_raw(w, h, data).unwrap();
        let edges = edge_map(&raster, &ScanConfig::default());

        // The transition column must be marked somewhere in the interior.
        assert!((1..h - 1).any(|y| edges.value(w / 2, y) == 255));
        // Far away from the transition there is no gradient.
        assert_eq!(edges.value(5, h / 2), 0);
        assert_eq!(edges.value(w - 5, h / 2), 0);
    }

    #[test]
    fn border_ring_is_never_marked() {
        // A noisy checkerboard produces gradients everywhere, but the border
        // ring stays out of consideration.
        let (w, h) = (16u32, 16u32);
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 0u8 } else { 255u8 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let raster = Raster::from_raw(w, h, data).unwrap();
        let edges = edge_map(&raster, &ScanConfig::default());

        for x in 0..w {
            assert_eq!(edges.value(x, 0), 0);
            assert_eq!(edges.value(x, h - 1), 0);
        }
        for y in 0..h {
            assert_eq!(edges.value(0, y), 0);
            assert_eq!(edges.value(w - 1, y), 0);
        }
    }

    #[test]
    fn tiny_raster_yields_empty_mask() {
        let edges = edge_map(&flat_gray(2, 2), &ScanConfig::default());
        assert_eq!(edges.mask().len(), 4);
        assert!(edges.mask().iter().all(|&v| v == 0));
    }
}
