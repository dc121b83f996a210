// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Blattwerk.

use thiserror::Error;

use crate::types::PageId;

/// Top-level error type for all Blattwerk operations.
#[derive(Debug, Error)]
pub enum BlattwerkError {
    // -- Raster / codec errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Grid contract violations --
    #[error("control grid must have exactly {expected} points, got {actual}")]
    InvalidGrid { expected: usize, actual: usize },

    #[error("grid point index {0} out of range")]
    InvalidGridIndex(usize),

    // -- Session errors --
    #[error("unknown page: {0}")]
    PageNotFound(PageId),

    #[error("page has not been rectified yet")]
    NotRectified,

    // -- Export errors --
    #[error("PDF assembly failed: {0}")]
    PdfError(String),

    #[error("no committed pages to export")]
    NothingToExport,

    #[error("export task failed: {0}")]
    ExportJoin(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlattwerkError>;
