use tracing::debug;

use crate::error::SelectionError;
use crate::model::{EntryId, EntryKind, TocEntry, TocTable};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionState {
    kinds: Vec<EntryKind>,
    start_pages: Vec<u32>,
    parents: Vec<Option<EntryId>>,
    children: Vec<Vec<EntryId>>,
    checked: Vec<bool>,
}

impl SelectionState {
    pub fn new(table: &TocTable) -> Self {
        let mut children = vec![Vec::new(); table.len()];
        let mut parents = Vec::with_capacity(table.len());

        for (id, entry) in table.iter() {
            let parent = subject_parent(entry);
            if let Some(parent) = parent {
                children[parent.0].push(id);
            }
            parents.push(parent);
        }

        Self {
            kinds: table.entries().iter().map(|entry| entry.kind).collect(),
            start_pages: table.entries().iter().map(|entry| entry.start_page).collect(),
            parents,
            children,
            checked: vec![false; table.len()],
        }
    }

    pub fn is_checked(&self, id: EntryId) -> Result<bool, SelectionError> {
        self.kind_of(id)?;
        Ok(self.checked[id.0])
    }

    pub fn children_of(&self, section: EntryId) -> Result<&[EntryId], SelectionError> {
        match self.kind_of(section)? {
            EntryKind::Section => Ok(&self.children[section.0]),
            EntryKind::Subject => Err(SelectionError::NotASection(section.0)),
        }
    }

    pub fn toggle_parent(&mut self, section: EntryId, value: bool) -> Result<(), SelectionError> {
        let children = self.children_of(section)?.to_vec();

        self.checked[section.0] = value;
        for child in &children {
            self.checked[child.0] = value;
        }
        debug!(section = %section, value, children = children.len(), "toggled section");
        Ok(())
    }

    pub fn toggle_child(&mut self, subject: EntryId, value: bool) -> Result<(), SelectionError> {
        if self.kind_of(subject)? != EntryKind::Subject {
            return Err(SelectionError::NotASubject(subject.0));
        }

        self.checked[subject.0] = value;
        if let Some(parent) = self.parents[subject.0] {
            let all_checked = self.children[parent.0]
                .iter()
                .all(|child| self.checked[child.0]);
            self.checked[parent.0] = all_checked;
            debug!(subject = %subject, value, section = %parent, section_checked = all_checked, "toggled subject");
        } else {
            debug!(subject = %subject, value, "toggled unassigned subject");
        }
        Ok(())
    }

    pub fn select_all(&mut self, value: bool) {
        self.checked.iter_mut().for_each(|flag| *flag = value);
    }

    pub fn selected(&self) -> Vec<EntryId> {
        let mut ids = self
            .checked
            .iter()
            .enumerate()
            .filter(|(_, checked)| **checked)
            .map(|(index, _)| EntryId(index))
            .collect::<Vec<EntryId>>();
        ids.sort_by_key(|id| self.start_pages[id.0]);
        ids
    }

    fn kind_of(&self, id: EntryId) -> Result<EntryKind, SelectionError> {
        self.kinds
            .get(id.0)
            .copied()
            .ok_or(SelectionError::UnknownEntry(id.0))
    }
}

fn subject_parent(entry: &TocEntry) -> Option<EntryId> {
    match entry.kind {
        EntryKind::Section => None,
        EntryKind::Subject => entry.parent_section,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSpan;

    fn entry(kind: EntryKind, text: &str, start: u32, end: u32, parent: Option<usize>) -> TocEntry {
        TocEntry {
            kind,
            raw_text: text.to_string(),
            cleaned_text: text.to_string(),
            start_page: start,
            end_page: end,
            parent_section: parent.map(EntryId),
            section_range: parent.map(|_| PageSpan { start, end }),
            indent_level: if kind == EntryKind::Section { 0 } else { 1 },
        }
    }

    // Preface(2-2, unassigned) | SECTION I(3-9): Overview 4-6, Risks 7-9 | SECTION II(10-15): Outlook 11-15
    fn sample_table() -> TocTable {
        TocTable::from_entries(vec![
            entry(EntryKind::Subject, "Preface", 2, 2, None),
            entry(EntryKind::Section, "SECTION I", 3, 9, Some(1)),
            entry(EntryKind::Subject, "Overview", 4, 6, Some(1)),
            entry(EntryKind::Subject, "Risks", 7, 9, Some(1)),
            entry(EntryKind::Section, "SECTION II", 10, 15, Some(4)),
            entry(EntryKind::Subject, "Outlook", 11, 15, Some(4)),
        ])
    }

    #[test]
    fn new_state_starts_unchecked() {
        let state = SelectionState::new(&sample_table());
        assert!(state.selected().is_empty());
        assert_eq!(state.is_checked(EntryId(2)), Ok(false));
    }

    #[test]
    fn children_of_lists_subjects_only() {
        let state = SelectionState::new(&sample_table());
        assert_eq!(state.children_of(EntryId(1)), Ok(&[EntryId(2), EntryId(3)][..]));
        assert_eq!(state.children_of(EntryId(4)), Ok(&[EntryId(5)][..]));
        assert_eq!(state.children_of(EntryId(2)), Err(SelectionError::NotASection(2)));
    }

    #[test]
    fn toggle_parent_propagates_to_every_child() {
        let mut state = SelectionState::new(&sample_table());

        state.toggle_parent(EntryId(1), true).expect("section toggle");
        assert_eq!(state.selected(), vec![EntryId(1), EntryId(2), EntryId(3)]);
        assert_eq!(state.is_checked(EntryId(5)), Ok(false));

        state.toggle_parent(EntryId(1), false).expect("section toggle");
        assert!(state.selected().is_empty());
    }

    #[test]
    fn unchecking_one_child_unchecks_the_section() {
        let mut state = SelectionState::new(&sample_table());
        state.toggle_parent(EntryId(1), true).expect("section toggle");

        state.toggle_child(EntryId(3), false).expect("subject toggle");

        assert_eq!(state.is_checked(EntryId(1)), Ok(false));
        assert_eq!(state.is_checked(EntryId(2)), Ok(true));
        assert_eq!(state.selected(), vec![EntryId(2)]);
    }

    #[test]
    fn checking_every_child_checks_the_section() {
        let mut state = SelectionState::new(&sample_table());

        state.toggle_child(EntryId(2), true).expect("subject toggle");
        assert_eq!(state.is_checked(EntryId(1)), Ok(false));

        state.toggle_child(EntryId(3), true).expect("subject toggle");
        assert_eq!(state.is_checked(EntryId(1)), Ok(true));
    }

    #[test]
    fn unassigned_subject_toggles_independently() {
        let mut state = SelectionState::new(&sample_table());
        state.toggle_parent(EntryId(1), true).expect("section toggle");

        state.toggle_child(EntryId(0), true).expect("subject toggle");
        state.toggle_child(EntryId(0), false).expect("subject toggle");

        assert_eq!(state.is_checked(EntryId(0)), Ok(false));
        assert_eq!(state.is_checked(EntryId(1)), Ok(true));
        assert_eq!(state.is_checked(EntryId(4)), Ok(false));
    }

    #[test]
    fn selected_is_ordered_by_start_page() {
        let mut state = SelectionState::new(&sample_table());
        state.toggle_child(EntryId(5), true).expect("subject toggle");
        state.toggle_child(EntryId(0), true).expect("subject toggle");
        state.toggle_child(EntryId(2), true).expect("subject toggle");

        assert_eq!(state.selected(), vec![EntryId(0), EntryId(2), EntryId(4), EntryId(5)]);
    }

    #[test]
    fn select_all_sets_every_flag() {
        let mut state = SelectionState::new(&sample_table());
        state.select_all(true);
        assert_eq!(state.selected().len(), 6);
        state.select_all(false);
        assert!(state.selected().is_empty());
    }

    #[test]
    fn toggles_reject_wrong_kind_and_unknown_ids() {
        let mut state = SelectionState::new(&sample_table());
        assert_eq!(state.toggle_parent(EntryId(2), true), Err(SelectionError::NotASection(2)));
        assert_eq!(state.toggle_child(EntryId(1), true), Err(SelectionError::NotASubject(1)));
        assert_eq!(state.toggle_child(EntryId(42), true), Err(SelectionError::UnknownEntry(42)));
        assert_eq!(state.is_checked(EntryId(6)), Err(SelectionError::UnknownEntry(6)));
        assert!(state.selected().is_empty());
    }
}
