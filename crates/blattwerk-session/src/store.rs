// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page store — the ordered page collection and its command surface.
//
// A store is owned by a single logical session; commands are applied
// sequentially, last write wins. The UI layer is an external collaborator
// that forwards drag gestures and button presses as these commands.

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{FilterKind, PageId, PageMeta, Point, Rotation, ScanConfig};
use blattwerk_scan::Raster;
use tracing::{info, instrument};

use crate::page::{Page, sha256_hex};

/// Ordered collection of pages with a current-page cursor.
#[derive(Debug, Default)]
pub struct PageStore {
    config: ScanConfig,
    pages: Vec<Page>,
    current: Option<usize>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: None,
        }
    }

    // -- Collection management ------------------------------------------------

    /// Decode image bytes into a new page, auto-detect its boundary, and make
    /// it the current page.
    #[instrument(skip(self, bytes), fields(data_len = bytes.len()))]
    pub fn add_page_bytes(&mut self, bytes: &[u8]) -> Result<PageId> {
        let mut page = Page::from_bytes(bytes)?;
        page.auto_detect(&self.config);
        let id = page.id;
        self.pages.push(page);
        self.current = Some(self.pages.len() - 1);
        info!(page = %id, pages = self.pages.len(), "Page added");
        Ok(id)
    }

    /// Add an already-decoded raster as a new page.
    pub fn add_raster(&mut self, source: Raster) -> PageId {
        let hash = sha256_hex(source.bytes());
        let mut page = Page::new(source, hash);
        page.auto_detect(&self.config);
        let id = page.id;
        self.pages.push(page);
        self.current = Some(self.pages.len() - 1);
        id
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Make the page at `index` current. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<PageId> {
        if index < self.pages.len() {
            self.current = Some(index);
            Some(self.pages[index].id)
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<&Page> {
        self.current.and_then(|i| self.pages.get(i))
    }

    /// Remove the page at `index`.
    ///
    /// The cursor shifts down when the deletion is at or before it; deleting
    /// the first page while it is current leaves no current page.
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.pages.remove(index);
        if let Some(cur) = self.current {
            if cur >= index {
                self.current = cur.checked_sub(1);
            }
        }
        if self.pages.is_empty() {
            self.current = None;
        } else if let Some(cur) = self.current {
            self.current = Some(cur.min(self.pages.len() - 1));
        }
        true
    }

    /// Reorder a page. The cursor follows the page it pointed at.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        if from >= self.pages.len() || to >= self.pages.len() {
            return false;
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        if self.current == Some(from) {
            self.current = Some(to);
        }
        true
    }

    // -- Page commands --------------------------------------------------------

    pub fn set_grid_point(&mut self, id: PageId, index: usize, point: Point) -> Result<()> {
        self.page_mut(id)?.set_grid_point(index, point)
    }

    pub fn auto_detect(&mut self, id: PageId) -> Result<()> {
        let config = self.config.clone();
        self.page_mut(id)?.auto_detect(&config);
        Ok(())
    }

    pub fn rectify(&mut self, id: PageId) -> Result<()> {
        self.page_mut(id)?.rectify();
        Ok(())
    }

    pub fn apply_filter(&mut self, id: PageId, kind: FilterKind) -> Result<()> {
        self.page_mut(id)?.apply_filter(kind)
    }

    pub fn rotate(&mut self, id: PageId, rotation: Rotation) -> Result<()> {
        self.page_mut(id)?.rotate(rotation)
    }

    pub fn commit(&mut self, id: PageId) -> Result<()> {
        self.page_mut(id)?.commit()
    }

    // -- Views ----------------------------------------------------------------

    /// Pages with a committed output, in session order.
    pub fn committed_pages(&self) -> Vec<&Page> {
        self.pages.iter().filter(|p| p.committed.is_some()).collect()
    }

    /// Serializable session summary.
    pub fn manifest(&self) -> Vec<PageMeta> {
        self.pages.iter().map(Page::meta).collect()
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BlattwerkError::PageNotFound(id))
    }
}

// -- Tests --------------------------------------------------------------------
