// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Control grid — the movable 3×3 mesh describing a page boundary.

use blattwerk_core::Point;
use blattwerk_core::error::{BlattwerkError, Result};
use serde::{Deserialize, Serialize};

/// Number of points in a control grid.
pub const GRID_POINTS: usize = 9;

/// A 3×3 mesh of movable points, row-major:
///
/// ```text
/// 0 1 2      tl  top-mid  tr
/// 3 4 5      left-mid  center  right-mid
/// 6 7 8      bl  bottom-mid  br
/// ```
///
/// Only the four corner points (indices 0, 2, 6, 8) feed rectification. The
/// five remaining points are visual guides: seeded by midpoint interpolation
/// but independently movable afterwards — nothing re-links them to the
/// corners once a user drags them. No convexity or ordering validation is
/// performed; a degenerate quadrilateral flows through to the rectifier and
/// produces whatever the bilinear map yields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlGrid {
    points: [Point; GRID_POINTS],
}

impl ControlGrid {
    /// Build a grid from exactly 9 points. Any other count is a contract
    /// violation.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let points: [Point; GRID_POINTS] =
            points
                .try_into()
                .map_err(|_| BlattwerkError::InvalidGrid {
                    expected: GRID_POINTS,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    /// Axis-aligned rectangle inset by `ratio` of each dimension, with guide
    /// points on the half lines.
    pub fn inset(width: u32, height: u32, ratio: f32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let (x0, x1, x2) = (w * ratio, w * 0.5, w * (1.0 - ratio));
        let (y0, y1, y2) = (h * ratio, h * 0.5, h * (1.0 - ratio));
        Self {
            points: [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x2, y0),
                Point::new(x0, y1),
                Point::new(x1, y1),
                Point::new(x2, y1),
                Point::new(x0, y2),
                Point::new(x1, y2),
                Point::new(x2, y2),
            ],
        }
    }

    /// Seed a full grid from four detected corners: edge midpoints are the
    /// means of adjacent corners, the center is the mean of all four.
    pub fn from_corners(tl: Point, tr: Point, br: Point, bl: Point) -> Self {
        let center = Point::new(
            (tl.x + tr.x + bl.x + br.x) / 4.0,
            (tl.y + tr.y + bl.y + br.y) / 4.0,
        );
        Self {
            points: [
                tl,
                Point::midpoint(tl, tr),
                tr,
                Point::midpoint(tl, bl),
                center,
                Point::midpoint(tr, br),
                bl,
                Point::midpoint(bl, br),
                br,
            ],
        }
    }

    /// Replace one point. Callers clamp the point to raster bounds before
    /// invocation; the grid itself accepts any coordinates.
    pub fn set(&mut self, index: usize, point: Point) -> Result<()> {
        if index >= GRID_POINTS {
            return Err(BlattwerkError::InvalidGridIndex(index));
        }
        self.points[index] = point;
        Ok(())
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Point; GRID_POINTS] {
        &self.points
    }

    /// The four corner points in rectification order.
    pub fn corners(&self) -> Quad {
        Quad {
            tl: self.points[0],
            tr: self.points[2],
            bl: self.points[6],
            br: self.points[8],
        }
    }
}

/// The quadrilateral consumed by the rectifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub tl: Point,
    pub tr: Point,
    pub bl: Point,
    pub br: Point,
}

// -- Tests --------------------------------------------------------------------
