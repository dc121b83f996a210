// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-session — Page lifecycle, session store, and export assembly.
//
// Owns the ordered collection of pages, applies grid/rectify/filter/rotate
// commands sequentially to the owning page, and packages committed pages
// into a multi-page PDF or a bundle of named PNG entries.

pub mod export;
pub mod page;
pub mod store;

pub use export::{Exporter, PngEntry};
pub use page::Page;
pub use store::PageStore;
