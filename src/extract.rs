use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{PackageError, SelectionError};
use crate::model::{EntryId, EntryKind, PageSpan, PartRecord, TocEntry, TocTable};
use crate::package::MERGED_FILENAME;
use crate::pdf::PdfDocument;

const FILENAME_CHARS: usize = 50;

#[derive(Debug)]
pub struct ExtractedPart<D> {
    pub id: EntryId,
    pub kind: EntryKind,
    pub title: String,
    pub span: PageSpan,
    pub filename: String,
    pub document: D,
}

impl<D: PdfDocument> ExtractedPart<D> {
    pub fn record(&self) -> Result<PartRecord, PackageError> {
        let page_count = self.document.page_count()?;
        Ok(PartRecord {
            id: self.id,
            kind: self.kind,
            title: self.title.clone(),
            page_range: self.span.to_string(),
            page_count: u32::try_from(page_count).unwrap_or(u32::MAX),
            filename: self.filename.clone(),
        })
    }
}

pub fn part_filename(cleaned_text: &str, start_page: u32) -> String {
    let stem = cleaned_text
        .chars()
        .take(FILENAME_CHARS)
        .filter(|ch| *ch != ' ' && *ch != '/')
        .map(|ch| if ch == '\\' { '_' } else { ch })
        .collect::<String>();

    if stem.is_empty() {
        format!("section_{start_page}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}

// Names in `reserved` are taken before any part is named.
pub fn dedupe_filenames(names: Vec<String>, reserved: &[&str]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = reserved
        .iter()
        .map(|name| (name.to_string(), 1))
        .collect();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            out.push(name);
            continue;
        }

        let stem = name.strip_suffix(".pdf").unwrap_or(&name);
        let mut suffix = *count;
        let mut candidate = format!("{stem}_{suffix}.pdf");
        while seen.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{stem}_{suffix}.pdf");
        }
        seen.insert(candidate.clone(), 1);
        out.push(candidate);
    }

    out
}

pub fn page_indices(entry: &TocEntry) -> std::ops::RangeInclusive<usize> {
    let start = entry.start_page.saturating_sub(1) as usize;
    let end = entry.end_page.saturating_sub(1) as usize;
    start..=end.max(start)
}

pub fn extract_entry<D: PdfDocument>(doc: &D, entry: &TocEntry) -> Result<D, PackageError> {
    let range = page_indices(entry);
    debug!(
        start = *range.start(),
        end = *range.end(),
        text = %entry.raw_text,
        "copying page range"
    );
    Ok(doc.copy_pages(range)?)
}

pub fn extract_selection<D: PdfDocument>(
    doc: &D,
    table: &TocTable,
    selected: &[EntryId],
) -> Result<Vec<ExtractedPart<D>>, PackageError> {
    let entries = selected
        .iter()
        .map(|id| {
            table
                .get(*id)
                .map(|entry| (*id, entry))
                .ok_or(SelectionError::UnknownEntry(id.0))
        })
        .collect::<Result<Vec<(EntryId, &TocEntry)>, SelectionError>>()?;

    let filenames = dedupe_filenames(
        entries
            .iter()
            .map(|(_, entry)| part_filename(&entry.cleaned_text, entry.start_page))
            .collect(),
        &[MERGED_FILENAME],
    );

    let mut parts = Vec::with_capacity(entries.len());
    for ((id, entry), filename) in entries.into_iter().zip(filenames) {
        let document = extract_entry(doc, entry)?;
        parts.push(ExtractedPart {
            id,
            kind: entry.kind,
            title: entry.raw_text.clone(),
            span: entry.own_span(),
            filename,
            document,
        });
    }

    info!(parts = parts.len(), "extracted selected entries");
    Ok(parts)
}
