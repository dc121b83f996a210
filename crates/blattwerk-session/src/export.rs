// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export assembly — packages committed pages into a multi-page PDF or a
// bundle of named PNG entries, using `printpdf` 0.8's data-oriented API.
//
// Per-page raster encodings are independent, so they run concurrently on
// blocking tasks; all of them are joined before the document is assembled.

use std::path::Path;

use blattwerk_core::PaperSize;
use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_scan::Raster;
use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::store::PageStore;

/// Placement DPI for page images (reasonable for print).
const EXPORT_DPI: f32 = 150.0;

/// One named PNG output, e.g. `page-01.png`. Archive container formats are
/// the caller's concern.
#[derive(Debug, Clone)]
pub struct PngEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Packages committed pages for archiving or printing.
pub struct Exporter {
    /// Paper size for PDF page creation.
    paper_size: PaperSize,
}

impl Exporter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    // -- PDF ------------------------------------------------------------------

    /// Assemble all committed pages into one PDF, one page per raster, each
    /// image scaled to fit the paper with its aspect ratio preserved and
    /// centred.
    #[instrument(skip(self, store), fields(pages = store.len()))]
    pub async fn export_pdf(&self, store: &PageStore) -> Result<Vec<u8>> {
        let rasters = committed_rasters(store)?;
        let count = rasters.len();
        info!(count, paper = ?self.paper_size, "Exporting PDF");

        // Strip alpha on blocking tasks; join everything before assembly.
        let mut set: JoinSet<(usize, u32, u32, Vec<u8>)> = JoinSet::new();
        for (index, raster) in rasters.into_iter().enumerate() {
            set.spawn_blocking(move || {
                let rgb = DynamicImage::ImageRgba8(raster.to_rgba_image()).to_rgb8();
                let (w, h) = rgb.dimensions();
                (index, w, h, rgb.into_raw())
            });
        }
        let mut parts: Vec<Option<(u32, u32, Vec<u8>)>> = (0..count).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (index, w, h, pixels) =
                joined.map_err(|err| BlattwerkError::ExportJoin(err.to_string()))?;
            parts[index] = Some((w, h, pixels));
        }

        let (page_w, page_h) = self.page_dimensions();
        let mut doc = PdfDocument::new("Blattwerk Scan");
        let mut pages: Vec<PdfPage> = Vec::with_capacity(count);

        for part in parts {
            let (w, h, pixels) = part
                .ok_or_else(|| BlattwerkError::ExportJoin("missing page encoding".to_string()))?;
            let raw = RawImage {
                pixels: RawImageData::U8(pixels),
                width: w as usize,
                height: h as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: fit_transform(w, h, page_w, page_h),
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), "PDF assembly complete");
        Ok(output)
    }

    /// Export the PDF and write it directly to a file.
    pub async fn export_pdf_to_file(
        &self,
        store: &PageStore,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.export_pdf(store).await?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    // -- PNG bundle -----------------------------------------------------------

    /// Encode every committed page as PNG, named `page-NN.png` in session
    /// order.
    #[instrument(skip(self, store), fields(pages = store.len()))]
    pub async fn export_png_bundle(&self, store: &PageStore) -> Result<Vec<PngEntry>> {
        let rasters = committed_rasters(store)?;
        let count = rasters.len();
        info!(count, "Exporting PNG bundle");

        let mut set: JoinSet<Result<(usize, Vec<u8>)>> = JoinSet::new();
        for (index, raster) in rasters.into_iter().enumerate() {
            set.spawn_blocking(move || raster.to_png_bytes().map(|bytes| (index, bytes)));
        }
        let mut encoded: Vec<Option<Vec<u8>>> = (0..count).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (index, bytes) =
                joined.map_err(|err| BlattwerkError::ExportJoin(err.to_string()))??;
            encoded[index] = Some(bytes);
        }

        let mut entries = Vec::with_capacity(count);
        for (index, bytes) in encoded.into_iter().enumerate() {
            let bytes = bytes
                .ok_or_else(|| BlattwerkError::ExportJoin("missing page encoding".to_string()))?;
            entries.push(PngEntry {
                name: format!("page-{:02}.png", index + 1),
                bytes,
            });
        }
        Ok(entries)
    }
}

/// Committed output rasters in session order; empty is an error.
fn committed_rasters(store: &PageStore) -> Result<Vec<Raster>> {
    let rasters: Vec<Raster> = store
        .committed_pages()
        .iter()
        .filter_map(|page| page.committed.clone())
        .collect();
    if rasters.is_empty() {
        return Err(BlattwerkError::NothingToExport);
    }
    Ok(rasters)
}

/// Transform placing an image on a PDF page: scaled to fit the full page
/// while preserving aspect ratio, centred.
fn fit_transform(img_w_px: u32, img_h_px: u32, page_w: Mm, page_h: Mm) -> XObjectTransform {
    let img_w_pt = img_w_px as f32 / EXPORT_DPI * 72.0;
    let img_h_pt = img_h_px as f32 / EXPORT_DPI * 72.0;
    let page_w_pt = page_w.into_pt().0;
    let page_h_pt = page_h.into_pt().0;

    let scale = (page_w_pt / img_w_pt).min(page_h_pt / img_h_pt);

    XObjectTransform {
        translate_x: Some(Pt((page_w_pt - img_w_pt * scale) / 2.0)),
        translate_y: Some(Pt((page_h_pt - img_h_pt * scale) / 2.0)),
        scale_x: Some(scale),
        scale_y: Some(scale),
        dpi: Some(EXPORT_DPI),
        rotate: None,
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use blattwerk_core::FilterKind;

    /// A store with `n` rectified-and-committed pages.
    fn committed_store(n: usize) -> PageStore {
        let mut store = PageStore::new();
        for i in 0..n {
            let seed = (i as u8) * 40 + 20;
            let id = store.add_raster(Raster::filled(60, 40, [seed, 120, 200, 255]));
            store.rectify(id).unwrap();
            store.apply_filter(id, FilterKind::Grayscale).unwrap();
            store.commit(id).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn export_pdf_produces_a_pdf_header() {
        let store = committed_store(2);
        let bytes = Exporter::a4().export_pdf(&store).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"), "not a PDF: {:?}", &bytes[..8]);
    }

    #[tokio::test]
    async fn export_pdf_without_committed_pages_is_an_error() {
        let mut store = PageStore::new();
        store.add_raster(Raster::filled(10, 10, [0, 0, 0, 255]));
        let result = Exporter::a4().export_pdf(&store).await;
        assert!(matches!(result, Err(BlattwerkError::NothingToExport)));
    }

    #[tokio::test]
    async fn png_bundle_entries_are_numbered_in_session_order() {
        let store = committed_store(3);
        let entries = Exporter::a4().export_png_bundle(&store).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["page-01.png", "page-02.png", "page-03.png"]);

        // Every entry decodes back to the committed raster.
        for (entry, page) in entries.iter().zip(store.committed_pages()) {
            let decoded = Raster::decode(&entry.bytes).unwrap();
            assert_eq!(Some(&decoded), page.committed.as_ref());
        }
    }

    #[tokio::test]
    async fn export_pdf_to_file_writes_the_document() {
        let store = committed_store(1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");

        Exporter::a4()
            .export_pdf_to_file(&store, &path)
            .await
            .unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"%PDF"));
    }
}
