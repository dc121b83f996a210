// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page — one photographed page and everything derived from it.

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{FilterKind, PageId, PageMeta, PageStatus, Point, Rotation, ScanConfig};
use blattwerk_scan::{ControlGrid, Raster, apply_filter, detect_grid, rectify};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

/// A scanned page: the source photo, its control grid, and the rasters
/// derived from them.
///
/// The canonical rectified raster is produced once by the explicit rectify
/// step and is the sole input to filtering; the displayed raster is always
/// re-derived from it, so switching filters repeatedly never compounds.
/// Committing promotes the current displayed raster to the page's saved
/// output for export.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    /// The photo as loaded. Never mutated.
    pub source: Raster,
    /// SHA-256 hex digest of the bytes the source was decoded from.
    pub source_hash: String,
    pub grid: ControlGrid,
    /// Canonical rectified raster (pre-filter). Present once rectified.
    pub rectified: Option<Raster>,
    /// What the user currently sees: canonical raster with the active filter.
    pub displayed: Option<Raster>,
    /// Saved output, promoted from `displayed` by an explicit commit.
    pub committed: Option<Raster>,
    pub filter: FilterKind,
    pub status: PageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Create a draft page with the default inset grid.
    pub fn new(source: Raster, source_hash: String) -> Self {
        let now = Utc::now();
        let grid = ControlGrid::inset(
            source.width(),
            source.height(),
            ScanConfig::default().inset_ratio,
        );
        Self {
            id: PageId::new(),
            source,
            source_hash,
            grid,
            rectified: None,
            displayed: None,
            committed: None,
            filter: FilterKind::None,
            status: PageStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode encoded image bytes (JPEG, PNG, …) into a draft page.
    #[instrument(skip(bytes), fields(data_len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let source = Raster::decode(bytes)?;
        Ok(Self::new(source, sha256_hex(bytes)))
    }

    // -- Grid commands --------------------------------------------------------

    /// Re-run boundary detection, overwriting the whole grid (including any
    /// user-dragged guide points).
    pub fn auto_detect(&mut self, config: &ScanConfig) {
        self.grid = detect_grid(&self.source, config);
        self.touch();
    }

    /// Move one grid point. The point is clamped to the source raster bounds
    /// before it reaches the grid.
    pub fn set_grid_point(&mut self, index: usize, point: Point) -> Result<()> {
        let clamped = Point::new(
            point.x.clamp(0.0, self.source.width() as f32),
            point.y.clamp(0.0, self.source.height() as f32),
        );
        self.grid.set(index, clamped)?;
        self.touch();
        Ok(())
    }

    // -- Pipeline commands ----------------------------------------------------

    /// Rectify through the grid's corners, caching the canonical raster and
    /// resetting the filter selection.
    #[instrument(skip(self), fields(page = %self.id))]
    pub fn rectify(&mut self) {
        let quad = self.grid.corners();
        let canonical = rectify(&self.source, &quad);
        info!(
            width = canonical.width(),
            height = canonical.height(),
            "Page rectified"
        );
        self.displayed = Some(canonical.clone());
        self.rectified = Some(canonical);
        self.filter = FilterKind::None;
        self.status = PageStatus::Rectified;
        self.touch();
    }

    /// Re-derive the displayed raster from the canonical one with the given
    /// filter.
    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<()> {
        let canonical = self.rectified.as_ref().ok_or(BlattwerkError::NotRectified)?;
        self.displayed = Some(apply_filter(canonical, kind));
        self.filter = kind;
        self.touch();
        Ok(())
    }

    /// Rotate the page output by a quarter turn.
    ///
    /// The canonical raster is rotated and replaced — not just the displayed
    /// one — so a later filter re-selection derives from the rotated state
    /// instead of silently undoing the rotation.
    pub fn rotate(&mut self, rotation: Rotation) -> Result<()> {
        let canonical = self.rectified.as_ref().ok_or(BlattwerkError::NotRectified)?;
        let rotated = canonical.rotated(rotation);
        self.displayed = Some(apply_filter(&rotated, self.filter));
        self.rectified = Some(rotated);
        self.touch();
        Ok(())
    }

    /// Promote the displayed raster to the page's saved output.
    pub fn commit(&mut self) -> Result<()> {
        let displayed = self.displayed.as_ref().ok_or(BlattwerkError::NotRectified)?;
        self.committed = Some(displayed.clone());
        self.touch();
        Ok(())
    }

    // -- Introspection --------------------------------------------------------

    /// Serializable summary without the raster payloads.
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            id: self.id,
            source_hash: self.source_hash.clone(),
            status: self.status,
            filter: self.filter,
            source_width: self.source.width(),
            source_height: self.source.height(),
            committed: self.committed.is_some(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Hex-encoded SHA-256 digest.
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn colored_page() -> Page {
        let source = Raster::filled(40, 30, [200, 100, 50, 255]);
        let hash = sha256_hex(source.bytes());
        Page::new(source, hash)
    }

    #[test]
    fn new_page_is_a_draft_with_inset_grid() {
        let page = colored_page();
        assert_eq!(page.status, PageStatus::Draft);
        assert_eq!(page.filter, FilterKind::None);
        assert!(page.rectified.is_none());
        assert_eq!(page.grid.points().len(), 9);
        let p0 = page.grid.point(0).unwrap();
        assert_eq!((p0.x, p0.y), (2.0, 1.5));
    }

    #[test]
    fn from_bytes_round_trips_through_the_codec() {
        let raster = Raster::filled(8, 8, [10, 200, 30, 255]);
        let bytes = raster.to_png_bytes().unwrap();
        let page = Page::from_bytes(&bytes).unwrap();
        assert_eq!(page.source, raster);
        assert_eq!(page.source_hash, sha256_hex(&bytes));
    }

    #[test]
    fn set_grid_point_clamps_to_source_bounds() {
        let mut page = colored_page();
        page.set_grid_point(4, Point::new(-25.0, 9999.0)).unwrap();
        assert_eq!(page.grid.point(4), Some(Point::new(0.0, 30.0)));
    }

    #[test]
    fn rectify_caches_canonical_and_resets_filter() {
        let mut page = colored_page();
        page.apply_filter(FilterKind::Grayscale).unwrap_err();
        page.filter = FilterKind::Grayscale; // simulate stale selection
        page.rectify();

        assert_eq!(page.status, PageStatus::Rectified);
        assert_eq!(page.filter, FilterKind::None);
        assert_eq!(page.rectified, page.displayed);
    }

    #[test]
    fn filters_always_derive_from_the_canonical_raster() {
        let mut page = colored_page();
        page.rectify();
        let canonical = page.rectified.clone().unwrap();

        page.apply_filter(FilterKind::BlackAndWhite).unwrap();
        page.apply_filter(FilterKind::Grayscale).unwrap();

        // The canonical raster is untouched, and the displayed raster is the
        // grayscale of the canonical — not of the earlier black/white pass.
        assert_eq!(page.rectified.as_ref(), Some(&canonical));
        assert_eq!(
            page.displayed.unwrap(),
            blattwerk_scan::apply_filter(&canonical, FilterKind::Grayscale)
        );
    }

    #[test]
    fn rotate_keeps_canonical_and_displayed_consistent() {
        let mut page = colored_page();
        page.rectify();
        page.apply_filter(FilterKind::Grayscale).unwrap();
        let (w, h) = {
            let r = page.rectified.as_ref().unwrap();
            (r.width(), r.height())
        };

        page.rotate(Rotation::Clockwise).unwrap();

        let canonical = page.rectified.as_ref().unwrap();
        let displayed = page.displayed.as_ref().unwrap();
        assert_eq!((canonical.width(), canonical.height()), (h, w));
        assert_eq!((displayed.width(), displayed.height()), (h, w));
        // The active filter survived the rotation.
        assert_eq!(page.filter, FilterKind::Grayscale);
        for px in displayed.bytes().chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn rotate_round_trip_restores_dimensions() {
        let mut page = colored_page();
        page.rectify();
        let before = {
            let r = page.rectified.as_ref().unwrap();
            (r.width(), r.height())
        };
        page.rotate(Rotation::Clockwise).unwrap();
        page.rotate(Rotation::CounterClockwise).unwrap();
        let after = {
            let r = page.rectified.as_ref().unwrap();
            (r.width(), r.height())
        };
        assert_eq!(before, after);
    }

    #[test]
    fn commit_promotes_the_displayed_raster() {
        let mut page = colored_page();
        assert!(matches!(
            page.commit(),
            Err(BlattwerkError::NotRectified)
        ));

        page.rectify();
        page.apply_filter(FilterKind::Lighten).unwrap();
        page.commit().unwrap();
        assert_eq!(page.committed, page.displayed);

        let meta = page.meta();
        assert!(meta.committed);
        assert_eq!(meta.filter, FilterKind::Lighten);
    }
}
