use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EntryKind {
    Section,
    Subject,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Section => "Section",
            Self::Subject => "Subject",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TocEntry {
    pub kind: EntryKind,
    pub raw_text: String,
    pub cleaned_text: String,
    pub start_page: u32,
    pub end_page: u32,
    pub parent_section: Option<EntryId>,
    pub section_range: Option<PageSpan>,
    pub indent_level: u32,
}

impl TocEntry {
    pub fn is_section(&self) -> bool {
        self.kind == EntryKind::Section
    }

    pub fn own_span(&self) -> PageSpan {
        PageSpan {
            start: self.start_page,
            end: self.end_page,
        }
    }

    pub fn own_page_range(&self) -> String {
        self.own_span().to_string()
    }

    pub fn section_page_range(&self) -> Option<String> {
        self.section_range.map(|span| span.to_string())
    }
}

/// Resolved table of contents, ordered by start page with ties in discovery
/// order. An `EntryId` is the position of an entry in this table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TocTable {
    entries: Vec<TocEntry>,
}

impl TocTable {
    pub(crate) fn from_entries(entries: Vec<TocEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: EntryId) -> Option<&TocEntry> {
        self.entries.get(id.0)
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &TocEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (EntryId(index), entry))
    }

    pub fn sections(&self) -> impl Iterator<Item = (EntryId, &TocEntry)> {
        self.iter().filter(|(_, entry)| entry.is_section())
    }

    pub fn unassigned(&self) -> impl Iterator<Item = (EntryId, &TocEntry)> {
        self.iter()
            .filter(|(_, entry)| !entry.is_section() && entry.parent_section.is_none())
    }

    pub fn is_flat(&self) -> bool {
        self.sections().next().is_none()
    }

    pub fn rows(&self) -> Vec<TocRow> {
        self.iter()
            .map(|(id, entry)| TocRow {
                id,
                kind: entry.kind,
                indent_level: entry.indent_level,
                text: entry.raw_text.clone(),
                cleaned_text: entry.cleaned_text.clone(),
                page_range: entry.own_page_range(),
                section: entry
                    .parent_section
                    .and_then(|parent| self.get(parent))
                    .map(|parent| parent.raw_text.clone()),
                section_range: entry.section_page_range(),
                starting_page_number: entry.start_page,
                ending_page_number: entry.end_page,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocRow {
    pub id: EntryId,
    pub kind: EntryKind,
    pub indent_level: u32,
    pub text: String,
    pub cleaned_text: String,
    pub page_range: String,
    pub section: Option<String>,
    pub section_range: Option<String>,
    pub starting_page_number: u32,
    pub ending_page_number: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: String,
    pub page_count: usize,
    pub flat: bool,
    pub entries: Vec<TocRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartRecord {
    pub id: EntryId,
    pub kind: EntryKind,
    pub title: String,
    pub page_range: String,
    pub page_count: u32,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: String,
    pub source_sha256: String,
    pub merged_filename: Option<String>,
    pub part_count: usize,
    pub parts: Vec<PartRecord>,
}
