use tracing::{info, warn};

use crate::error::{PackageError, SelectionError, TocError};
use crate::extract::{ExtractedPart, extract_selection};
use crate::model::{EntryId, EntryKind, TocTable};
use crate::pdf::PdfDocument;
use crate::selection::SelectionState;
use crate::toc::discover_toc;

pub struct Session<D> {
    name: String,
    document: D,
    toc: Option<TocTable>,
    selection: SelectionState,
}

impl<D: PdfDocument> Session<D> {
    pub fn load(name: impl Into<String>, document: D) -> Result<Self, TocError> {
        let name = name.into();
        let toc = discover_toc(&document)?;
        let selection = toc.as_ref().map(SelectionState::new).unwrap_or_default();

        match &toc {
            Some(table) => info!(source = %name, entries = table.len(), "session loaded"),
            None => warn!(source = %name, "no table of contents found"),
        }

        Ok(Self {
            name,
            document,
            toc,
            selection,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toc(&self) -> Option<&TocTable> {
        self.toc.as_ref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn toggle_parent(&mut self, section: EntryId, value: bool) -> Result<(), SelectionError> {
        self.selection.toggle_parent(section, value)
    }

    pub fn toggle_child(&mut self, subject: EntryId, value: bool) -> Result<(), SelectionError> {
        self.selection.toggle_child(subject, value)
    }

    pub fn toggle(&mut self, id: EntryId, value: bool) -> Result<(), SelectionError> {
        let kind = self
            .toc
            .as_ref()
            .and_then(|table| table.get(id))
            .map(|entry| entry.kind)
            .ok_or(SelectionError::UnknownEntry(id.0))?;
        match kind {
            EntryKind::Section => self.toggle_parent(id, value),
            EntryKind::Subject => self.toggle_child(id, value),
        }
    }

    pub fn select_all(&mut self, value: bool) {
        self.selection.select_all(value);
    }

    pub fn extract(&self) -> Result<Vec<ExtractedPart<D>>, PackageError> {
        let Some(table) = self.toc.as_ref() else {
            return Ok(Vec::new());
        };
        extract_selection(&self.document, table, &self.selection.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fake::FakeDocument;

    fn listing_document(first_link: &str) -> FakeDocument {
        let mut doc = FakeDocument::with_pages(15);
        doc.set_text(0, "Contents");
        doc.add_link(0, first_link, 3);
        doc.add_link(0, "Overview ........ 4", 4);
        doc.add_link(0, "Risks ........ 7", 7);
        doc.add_link(0, "SECTION II ........ 10", 10);
        doc
    }

    #[test]
    fn load_builds_table_and_fresh_selection() {
        let session = Session::load("annual.pdf", listing_document("SECTION I ........ 3")).expect("load");
        assert_eq!(session.name(), "annual.pdf");
        assert_eq!(session.toc().map(TocTable::len), Some(4));
        assert!((0..4).all(|index| session.selection().is_checked(EntryId(index)) == Ok(false)));
        assert!(session.selection().selected().is_empty());
    }

    #[test]
    fn toggle_routes_by_entry_kind() {
        let mut session = Session::load("annual.pdf", listing_document("SECTION I ........ 3")).expect("load");

        session.toggle(EntryId(0), true).expect("section");
        assert_eq!(session.selection().selected(), vec![EntryId(0), EntryId(1), EntryId(2)]);

        session.toggle(EntryId(2), false).expect("subject");
        assert_eq!(session.selection().selected(), vec![EntryId(1)]);

        assert_eq!(session.toggle(EntryId(9), true), Err(SelectionError::UnknownEntry(9)));
    }

    #[test]
    fn extract_follows_selection_order() {
        let mut session = Session::load("annual.pdf", listing_document("SECTION I ........ 3")).expect("load");
        session.toggle(EntryId(3), true).expect("section");
        session.toggle(EntryId(1), true).expect("subject");

        let parts = session.extract().expect("extract");
        let names = parts.iter().map(|part| part.filename.as_str()).collect::<Vec<&str>>();
        assert_eq!(names, vec!["Overview.pdf", "section_10.pdf"]);
    }

    #[test]
    fn reloading_discards_previous_selection() {
        let mut first = Session::load("a.pdf", listing_document("SECTION I ........ 3")).expect("load");
        first.select_all(true);
        assert_eq!(first.selection().selected().len(), 4);

        let second = Session::load("b.pdf", listing_document("Preface ........ 3")).expect("load");
        assert!(second.selection().selected().is_empty());
        assert!(second.toc().is_some_and(|table| table.sections().count() == 1));
    }

    #[test]
    fn document_without_listing_has_empty_selection() {
        let session = Session::load("plain.pdf", FakeDocument::with_pages(4)).expect("load");
        assert!(session.toc().is_none());
        assert!(session.selection().selected().is_empty());
        assert!(session.extract().expect("extract").is_empty());
    }
}
