use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::pdf::PdfDocument;

pub const LOOKAHEAD_PAGES: usize = 6;

const START_MARKERS: [&str; 2] = ["Contents", "TABLE OF CONTENTS"];
const CONTINUATION_MARKERS: [&str; 3] = ["SECTION", "....", "INTRODUCTION"];

pub fn is_listing_start(text: &str) -> bool {
    START_MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn is_listing_continuation(text: &str) -> bool {
    CONTINUATION_MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn locate<D: PdfDocument>(doc: &D, page_count: usize) -> Option<usize> {
    for index in 0..page_count.min(LOOKAHEAD_PAGES) {
        match doc.page_text(index) {
            Ok(text) if is_listing_start(&text) => {
                debug!(page = index, "contents listing starts");
                return Some(index);
            }
            Ok(_) => {}
            Err(err) => warn!(page = index, error = %err, "skipping unreadable page"),
        }
    }
    None
}

pub fn listing_pages<D: PdfDocument>(
    doc: &D,
    start: usize,
    page_count: usize,
) -> RangeInclusive<usize> {
    let mut end = start;
    while end + 1 < page_count {
        let next = end + 1;
        match doc.page_text(next) {
            Ok(text) if is_listing_continuation(&text) => end = next,
            Ok(_) => break,
            Err(err) => {
                warn!(page = next, error = %err, "listing ends at unreadable page");
                break;
            }
        }
    }
    debug!(start, end, "contents listing pages");
    start..=end
}
