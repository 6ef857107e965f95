use tracing::debug;

use super::classifier::ClassifiedEntry;
use crate::model::{EntryId, EntryKind, PageSpan, TocEntry, TocTable};

pub const OPEN_ENDED_PAGE_BOUND: u32 = 9999;

struct PendingEntry {
    entry: ClassifiedEntry,
    end_page: Option<u32>,
    parent_section: Option<EntryId>,
    section_range: Option<PageSpan>,
}

struct OpenSection {
    id: EntryId,
    start_page: u32,
}

pub fn resolve(entries: Vec<ClassifiedEntry>, page_bound: u32) -> TocTable {
    let mut ordered = entries;
    ordered.sort_by_key(|entry| entry.start_page);

    let mut pending: Vec<PendingEntry> = Vec::with_capacity(ordered.len());
    let mut open_section: Option<OpenSection> = None;

    for entry in ordered {
        match entry.kind {
            EntryKind::Section => {
                let bound = entry.start_page.saturating_sub(1);
                close_open_entries(&mut pending, open_section.as_ref(), bound);

                let id = EntryId(pending.len());
                debug!(id = %id, start = entry.start_page, text = %entry.raw_text, "section opens");
                open_section = Some(OpenSection {
                    id,
                    start_page: entry.start_page,
                });
                pending.push(PendingEntry {
                    entry,
                    end_page: None,
                    parent_section: Some(id),
                    section_range: None,
                });
            }
            EntryKind::Subject => {
                if let Some(previous) = pending.last_mut() {
                    if previous.entry.kind == EntryKind::Subject && previous.end_page.is_none() {
                        previous.end_page = Some(
                            previous
                                .entry
                                .start_page
                                .max(entry.start_page.saturating_sub(1)),
                        );
                    }
                }
                pending.push(PendingEntry {
                    entry,
                    end_page: None,
                    parent_section: open_section.as_ref().map(|section| section.id),
                    section_range: None,
                });
            }
        }
    }

    close_open_entries(&mut pending, open_section.as_ref(), page_bound);

    TocTable::from_entries(
        pending
            .into_iter()
            .map(|pending| {
                let start_page = pending.entry.start_page;
                TocEntry {
                    kind: pending.entry.kind,
                    raw_text: pending.entry.raw_text,
                    cleaned_text: pending.entry.cleaned_text,
                    start_page,
                    end_page: pending.end_page.unwrap_or(start_page),
                    parent_section: pending.parent_section,
                    section_range: pending.section_range,
                    indent_level: pending.entry.indent_level,
                }
            })
            .collect(),
    )
}

fn close_open_entries(pending: &mut [PendingEntry], open_section: Option<&OpenSection>, bound: u32) {
    for item in pending.iter_mut().filter(|item| item.end_page.is_none()) {
        item.end_page = Some(item.entry.start_page.max(bound));
    }

    let Some(section) = open_section else {
        return;
    };
    let span = PageSpan {
        start: section.start_page,
        end: section.start_page.max(bound),
    };
    for item in pending
        .iter_mut()
        .filter(|item| item.parent_section == Some(section.id) && item.section_range.is_none())
    {
        item.section_range = Some(span);
    }
}
