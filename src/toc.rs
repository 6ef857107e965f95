use tracing::{info, warn};

use crate::error::TocError;
use crate::model::TocTable;
use crate::pdf::PdfDocument;

pub mod classifier;
pub mod locator;
pub mod resolver;
pub mod scanner;

use classifier::EntryClassifier;
use resolver::OPEN_ENDED_PAGE_BOUND;

pub fn discover_toc<D: PdfDocument>(doc: &D) -> Result<Option<TocTable>, TocError> {
    let classifier = EntryClassifier::new()?;

    let page_count = doc.page_count()?;
    if page_count == 0 {
        return Err(TocError::EmptyDocument);
    }

    let Some(start) = locator::locate(doc, page_count) else {
        info!(
            scanned_pages = page_count.min(locator::LOOKAHEAD_PAGES),
            "no contents page found"
        );
        return Ok(None);
    };

    let pages = locator::listing_pages(doc, start, page_count);
    let raw_links = scanner::scan_pages(doc, pages.clone());
    let entries = classifier.classify(raw_links);
    if entries.is_empty() {
        info!(
            start = *pages.start(),
            end = *pages.end(),
            "contents listing has no usable links"
        );
        return Ok(None);
    }

    let table = resolver::resolve(entries, closing_bound(doc));
    info!(
        entries = table.len(),
        sections = table.sections().count(),
        unassigned = table.unassigned().count(),
        "resolved table of contents"
    );
    Ok(Some(table))
}

pub fn closing_bound<D: PdfDocument>(doc: &D) -> u32 {
    match doc.page_count() {
        Ok(count) => u32::try_from(count).unwrap_or(OPEN_ENDED_PAGE_BOUND),
        Err(err) => {
            warn!(error = %err, bound = OPEN_ENDED_PAGE_BOUND, "page count unavailable; leaving last range open-ended");
            OPEN_ENDED_PAGE_BOUND
        }
    }
}
