use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::error::PdfError;
use crate::pdf::PdfDocument;

/// A link annotation on a contents page together with the text under it.
/// `target_page` is one-based; zero or less means unresolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawTocLink {
    pub text: String,
    pub target_page: i64,
}

pub fn scan_page<D: PdfDocument>(doc: &D, index: usize) -> Result<Vec<RawTocLink>, PdfError> {
    let links = doc.page_links(index)?;

    let mut raw = Vec::with_capacity(links.len());
    for link in links {
        let text = match doc.clipped_text(index, &link.rect) {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(page = index, error = %err, "failed to read link text");
                continue;
            }
        };
        let target_page = link
            .target_page
            .map(|page| page as i64 + 1)
            .unwrap_or(0);
        raw.push(RawTocLink { text, target_page });
    }

    Ok(raw)
}

pub fn scan_pages<D: PdfDocument>(doc: &D, pages: RangeInclusive<usize>) -> Vec<RawTocLink> {
    let mut raw = Vec::new();
    for index in pages {
        match scan_page(doc, index) {
            Ok(links) => {
                debug!(page = index, links = links.len(), "scanned contents page");
                raw.extend(links);
            }
            Err(err) => warn!(page = index, error = %err, "no entries from page"),
        }
    }
    raw
}
