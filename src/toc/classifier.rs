use regex::Regex;

use super::scanner::RawTocLink;
use crate::model::EntryKind;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedEntry {
    pub kind: EntryKind,
    pub raw_text: String,
    pub cleaned_text: String,
    pub start_page: u32,
    pub indent_level: u32,
}

pub struct EntryClassifier {
    dot_leader: Regex,
    section_prefix: Regex,
    decimal_numbering: Regex,
}

impl EntryClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            dot_leader: Regex::new(r"\.{2,}.*")?,
            section_prefix: Regex::new(r"(?i)^SECTION\s*[IVXLCD]+\s*:?")?,
            decimal_numbering: Regex::new(r"^(\d+(\.\d+)+)")?,
        })
    }

    pub fn clean_text(&self, text: &str) -> String {
        self.dot_leader.replace_all(text, "").trim().to_string()
    }

    pub fn classify_text(&self, text: &str) -> EntryKind {
        if text.to_uppercase().contains("SECTION") {
            EntryKind::Section
        } else {
            EntryKind::Subject
        }
    }

    pub fn strip_section_prefix(&self, text: &str) -> String {
        self.section_prefix.replace(text, "").trim().to_string()
    }

    pub fn indent_level(&self, kind: EntryKind, cleaned_text: &str) -> u32 {
        if kind == EntryKind::Section {
            return 0;
        }
        self.decimal_numbering
            .captures(cleaned_text)
            .and_then(|captures| captures.get(1))
            .map(|numbering| numbering.as_str().matches('.').count() as u32)
            .unwrap_or(1)
    }

    pub fn classify(&self, links: Vec<RawTocLink>) -> Vec<ClassifiedEntry> {
        links
            .into_iter()
            .filter(|link| !link.text.trim().is_empty() && link.target_page > 0)
            .filter_map(|link| {
                let start_page = u32::try_from(link.target_page).ok()?;
                let raw_text = self.clean_text(&link.text);
                let kind = self.classify_text(&raw_text);
                let cleaned_text = self.strip_section_prefix(&raw_text);
                let indent_level = self.indent_level(kind, &cleaned_text);
                Some(ClassifiedEntry {
                    kind,
                    raw_text,
                    cleaned_text,
                    start_page,
                    indent_level,
                })
            })
            .collect()
    }
}
