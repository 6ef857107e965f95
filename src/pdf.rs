use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::PdfError;

mod compose;
mod lopdf_backend;
mod text;

pub use lopdf_backend::LopdfDocument;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum LinkKind {
    GoTo,
    Named,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct LinkRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl LinkRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// An internal link annotation on a page. `target_page` is zero-based and is
/// `None` when the destination could not be resolved to a page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageLink {
    pub kind: LinkKind,
    pub rect: LinkRect,
    pub target_page: Option<usize>,
}

/// The operations the TOC pipeline needs from a PDF library. Page indices are
/// zero-based throughout.
pub trait PdfDocument: Sized {
    fn empty() -> Self;

    fn page_count(&self) -> Result<usize, PdfError>;

    fn page_text(&self, index: usize) -> Result<String, PdfError>;

    fn page_links(&self, index: usize) -> Result<Vec<PageLink>, PdfError>;

    fn clipped_text(&self, index: usize, rect: &LinkRect) -> Result<String, PdfError>;

    fn copy_pages(&self, range: RangeInclusive<usize>) -> Result<Self, PdfError>;

    fn append(&mut self, other: &Self) -> Result<(), PdfError>;

    fn save(&mut self) -> Result<Vec<u8>, PdfError>;
}

#[cfg(test)]
pub mod fake;
#[cfg(test)]
pub mod sample;
