// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Blattwerk scanning engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scanned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStatus {
    /// Loaded, grid editable, not yet rectified.
    Draft,
    /// The canonical rectified raster has been produced and cached.
    Rectified,
}

/// Tone filter applied to a rectified raster.
///
/// Filters are pure per-pixel transforms. The selected kind is stored on the
/// page so the displayed raster can be re-derived from the canonical rectified
/// raster at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    /// Identity — displayed raster equals the canonical rectified raster.
    None,
    /// Luma threshold to pure black/white.
    BlackAndWhite,
    /// Rec. 601 luma on all three channels.
    Grayscale,
    /// Contrast boost plus slight brightening.
    Enhanced,
    /// Multiplicative lightening.
    Lighten,
}

impl Default for FilterKind {
    fn default() -> Self {
        Self::None
    }
}

impl FilterKind {
    /// Stable keyword for UI labels and manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BlackAndWhite => "black-and-white",
            Self::Grayscale => "grayscale",
            Self::Enhanced => "enhanced",
            Self::Lighten => "lighten",
        }
    }
}

/// A point in the source raster's pixel coordinate space.
///
/// Always source-space pixels, never display-scaled coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Arithmetic mean of two points.
    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Quarter-turn rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// +90°.
    Clockwise,
    /// −90°.
    CounterClockwise,
}

impl Rotation {
    /// Signed degrees, matching the command surface (+90 / −90).
    pub fn degrees(&self) -> i32 {
        match self {
            Self::Clockwise => 90,
            Self::CounterClockwise => -90,
        }
    }

    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            90 => Some(Self::Clockwise),
            -90 => Some(Self::CounterClockwise),
            _ => None,
        }
    }
}

/// Standard paper sizes for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Serializable page summary for session manifests.
///
/// Carries the page metadata without the raster payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: PageId,
    /// SHA-256 hex digest of the source image bytes.
    pub source_hash: String,
    pub status: PageStatus,
    pub filter: FilterKind,
    pub source_width: u32,
    pub source_height: u32,
    /// Whether a committed output raster exists for export.
    pub committed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
