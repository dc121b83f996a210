// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter pipeline — stateless pointwise tone transforms. Filters are always
// applied to the canonical rectified raster, never stacked on a previously
// filtered raster, which keeps repeated selection idempotent.

use blattwerk_core::FilterKind;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::raster::Raster;

/// Rec. 601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Contrast expressed on the 0–259 contrast index scale (1.4 × 100).
const CONTRAST_INDEX: f32 = 140.0;
const CONTRAST_BRIGHTNESS: f32 = 10.0;

const BW_THRESHOLD: f32 = 128.0;

const LIGHTEN_GAIN: f32 = 1.2;
const LIGHTEN_OFFSET: f32 = 20.0;

/// Apply a tone filter, returning a new raster of the same dimensions.
///
/// `FilterKind::None` is pixel-identical to the input. Alpha always passes
/// through unchanged; all channel clamps saturate to [0, 255].
#[instrument(skip(source), fields(filter = kind.as_str(), width = source.width(), height = source.height()))]
pub fn apply_filter(source: &Raster, kind: FilterKind) -> Raster {
    let out = match kind {
        FilterKind::None => source.clone(),
        FilterKind::Grayscale => map_pixels(source, |r, g, b| {
            let l = luma(r, g, b);
            (l, l, l)
        }),
        FilterKind::BlackAndWhite => map_pixels(source, |r, g, b| {
            let v = if luma(r, g, b) > BW_THRESHOLD {
                255.0
            } else {
                0.0
            };
            (v, v, v)
        }),
        FilterKind::Enhanced => {
            let factor =
                (259.0 * (CONTRAST_INDEX + 255.0)) / (255.0 * (259.0 - CONTRAST_INDEX));
            map_pixels(source, move |r, g, b| {
                (
                    contrasted(r, factor),
                    contrasted(g, factor),
                    contrasted(b, factor),
                )
            })
        }
        FilterKind::Lighten => map_pixels(source, |r, g, b| {
            (lightened(r), lightened(g), lightened(b))
        }),
    };
    debug!("Filter applied");
    out
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

fn contrasted(channel: f32, factor: f32) -> f32 {
    (factor * (channel - 128.0) + 128.0 + CONTRAST_BRIGHTNESS).clamp(0.0, 255.0)
}

fn lightened(channel: f32) -> f32 {
    (channel * LIGHTEN_GAIN + LIGHTEN_OFFSET).clamp(0.0, 255.0)
}

/// Run a pure RGB transform over every pixel in parallel, rounding results to
/// the nearest byte. Alpha is untouched.
fn map_pixels(source: &Raster, f: impl Fn(f32, f32, f32) -> (f32, f32, f32) + Sync) -> Raster {
    let mut data = source.bytes().to_vec();
    data.par_chunks_exact_mut(4).for_each(|px| {
        let (r, g, b) = f(px[0] as f32, px[1] as f32, px[2] as f32);
        px[0] = r.round() as u8;
        px[1] = g.round() as u8;
        px[2] = b.round() as u8;
    });
    Raster::from_raw_parts(source.width(), source.height(), data)
}

// -- Tests --------------------------------------------------------------------
