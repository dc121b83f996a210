// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectifier — maps the quadrilateral described by the control grid's corners
// onto an upright rectangle via inverse bilinear-patch sampling.
//
// The corner blend is a bilinear-patch approximation of perspective unwarp,
// not a true homography: it is exact only when the quadrilateral is a
// parallelogram and shows mild pincushion-like distortion otherwise.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::grid::Quad;
use crate::raster::Raster;

/// Off-page destination pixels are filled with opaque white.
const FILL: [u8; 4] = [255, 255, 255, 255];

/// Output dimensions derived from the corner quadrilateral: the larger of the
/// top/bottom edge lengths by the larger of the left/right edge lengths, each
/// rounded to a pixel count (and floored at 1 so a degenerate quad still
/// yields a raster).
pub fn output_dimensions(quad: &Quad) -> (u32, u32) {
    let top = quad.tl.distance(quad.tr);
    let bottom = quad.bl.distance(quad.br);
    let left = quad.tl.distance(quad.bl);
    let right = quad.tr.distance(quad.br);
    let out_w = top.max(bottom).round().max(1.0) as u32;
    let out_h = left.max(right).round().max(1.0) as u32;
    (out_w, out_h)
}

/// Resample the source through the quadrilateral into an upright rectangle.
///
/// For every destination pixel the normalized (u, v) position is blended
/// across the four corners to find the source sample point, which is then
/// read with bilinear interpolation. Sample points outside the source are
/// filled with opaque white; alpha is forced opaque everywhere. Idempotent
/// for identical inputs.
#[instrument(skip(source, quad), fields(width = source.width(), height = source.height()))]
pub fn rectify(source: &Raster, quad: &Quad) -> Raster {
    let (out_w, out_h) = output_dimensions(quad);
    debug!(out_w, out_h, "Rectifying");

    let sw = source.width() as usize;
    let sh = source.height() as usize;
    let src_w = source.width() as f32;
    let src_h = source.height() as f32;
    let src = source.bytes();

    // Guard the 1-pixel output dimensions so u/v never divide by zero.
    let u_denom = if out_w > 1 { (out_w - 1) as f32 } else { 1.0 };
    let v_denom = if out_h > 1 { (out_h - 1) as f32 } else { 1.0 };

    let row_len = out_w as usize * 4;
    let mut data = vec![0u8; row_len * out_h as usize];

    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let v = y as f32 / v_denom;
            for x in 0..out_w as usize {
                let u = x as f32 / u_denom;

                let w00 = (1.0 - u) * (1.0 - v);
                let w10 = u * (1.0 - v);
                let w11 = u * v;
                let w01 = (1.0 - u) * v;
                let sx = w00 * quad.tl.x + w10 * quad.tr.x + w11 * quad.br.x + w01 * quad.bl.x;
                let sy = w00 * quad.tl.y + w10 * quad.tr.y + w11 * quad.br.y + w01 * quad.bl.y;

                let px = &mut row[x * 4..x * 4 + 4];
                if sx >= 0.0 && sx < src_w - 1.0 && sy >= 0.0 && sy < src_h - 1.0 {
                    let x0 = sx.floor() as usize;
                    let y0 = sy.floor() as usize;
                    let x1 = (x0 + 1).min(sw - 1);
                    let y1 = (y0 + 1).min(sh - 1);
                    let dx = sx - x0 as f32;
                    let dy = sy - y0 as f32;

                    let i00 = (y0 * sw + x0) * 4;
                    let i10 = (y0 * sw + x1) * 4;
                    let i01 = (y1 * sw + x0) * 4;
                    let i11 = (y1 * sw + x1) * 4;

                    for c in 0..3 {
                        let value = (1.0 - dx) * (1.0 - dy) * src[i00 + c] as f32
                            + dx * (1.0 - dy) * src[i10 + c] as f32
                            + (1.0 - dx) * dy * src[i01 + c] as f32
                            + dx * dy * src[i11 + c] as f32;
                        px[c] = value.round() as u8;
                    }
                    px[3] = 255;
                } else {
                    px.copy_from_slice(&FILL);
                }
            }
        });

    Raster::from_raw_parts(out_w, out_h, data)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use blattwerk_core::Point;

    fn quad(tl: (f32, f32), tr: (f32, f32), bl: (f32, f32), br: (f32, f32)) -> Quad {
        Quad {
            tl: Point::new(tl.0, tl.1),
            tr: Point::new(tr.0, tr.1),
            bl: Point::new(bl.0, bl.1),
            br: Point::new(br.0, br.1),
        }
    }

    #[test]
    fn output_dimensions_follow_edge_lengths() {
        let q = quad((0.0, 0.0), (99.0, 0.0), (0.0, 99.0), (99.0, 99.0));
        assert_eq!(output_dimensions(&q), (99, 99));

        // Max of opposing edges wins.
        let q = quad((0.0, 0.0), (80.0, 0.0), (0.0, 120.0), (100.0, 120.0));
        let (w, h) = output_dimensions(&q);
        assert_eq!(w, 100);
        assert_eq!(h, 120);
    }

    #[test]
    fn full_frame_square_resamples_interior_exactly() {
        let source = Raster::filled(100, 100, [90, 140, 190, 255]);
        let q = quad((0.0, 0.0), (99.0, 0.0), (0.0, 99.0), (99.0, 99.0));
        let out = rectify(&source, &q);

        assert_eq!((out.width(), out.height()), (99, 99));
        assert_eq!(out.pixel(50, 50), [90, 140, 190, 255]);
        assert_eq!(out.pixel(0, 0), [90, 140, 190, 255]);
    }

    #[test]
    fn off_page_samples_fill_white() {
        let source = Raster::filled(100, 100, [0, 0, 0, 255]);
        // Corners pulled 50px outside the source on every side.
        let q = quad(
            (-50.0, -50.0),
            (149.0, -50.0),
            (-50.0, 149.0),
            (149.0, 149.0),
        );
        let out = rectify(&source, &q);

        // Top-left destination pixel maps to (-50,-50): off-page, so white.
        assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
        // The center still lands inside the black source.
        let (cx, cy) = (out.width() / 2, out.height() / 2);
        assert_eq!(out.pixel(cx, cy), [0, 0, 0, 255]);
    }

    #[test]
    fn sample_at_negative_coordinate_is_white() {
        // tl.x = -5 puts the first destination column's sample at (-5, 10).
        let source = Raster::filled(60, 60, [10, 10, 10, 255]);
        let q = quad((-5.0, 10.0), (54.0, 10.0), (-5.0, 49.0), (54.0, 49.0));
        let out = rectify(&source, &q);
        assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn degenerate_quad_yields_single_pixel_without_fault() {
        let source = Raster::filled(10, 10, [50, 60, 70, 255]);
        let q = quad((5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (5.0, 5.0));
        let out = rectify(&source, &q);
        assert_eq!((out.width(), out.height()), (1, 1));
        assert_eq!(out.pixel(0, 0), [50, 60, 70, 255]);
    }

    #[test]
    fn rectify_is_idempotent_for_identical_inputs() {
        let mut data = Vec::new();
        for i in 0..(30 * 20) {
            let v = (i % 251) as u8;
            data.extend_from_slice(&[v, v.wrapping_add(40), v.wrapping_add(90), 255]);
        }
        let source = Raster::from_raw(30, 20, data).unwrap();
        let q = quad((2.0, 1.0), (27.0, 3.0), (1.0, 18.0), (28.0, 17.0));
        assert_eq!(rectify(&source, &q), rectify(&source, &q));
    }

    #[test]
    fn parallelogram_maps_straight_lines_straight() {
        // A sheared parallelogram: the bilinear patch is exact here, so a
        // vertical stripe in the source stays a contiguous stripe per row.
        let (w, h) = (80u32, 60u32);
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for _y in 0..h {
            for x in 0..w {
                let v = if (30..34).contains(&x) { 255u8 } else { 0u8 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let source = Raster::from_raw(w, h, data).unwrap();
        let q = quad((10.0, 5.0), (69.0, 5.0), (10.0, 54.0), (69.0, 54.0));
        let out = rectify(&source, &q);

        // Every output row crosses the stripe exactly once.
        for y in 0..out.height() {
            let hits = (0..out.width())
                .filter(|&x| out.pixel(x, y)[0] > 128)
                .count();
            assert!(hits >= 2, "row {} lost the stripe", y);
        }
    }
}
