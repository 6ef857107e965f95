use std::ops::RangeInclusive;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use super::compose::{copy_pages_into, empty_document};
use super::text::{assemble_lines, page_glyphs};
use super::{LinkKind, LinkRect, PageLink, PdfDocument};
use crate::error::PdfError;

const MAX_DESTINATION_DEPTH: usize = 8;
const MAX_NAME_TREE_DEPTH: usize = 32;

pub struct LopdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    pub fn open(bytes: &[u8]) -> Result<Self, PdfError> {
        let inner = Document::load_mem(bytes).map_err(|err| PdfError::Open(err.to_string()))?;
        Ok(Self::from_document(inner))
    }

    fn from_document(inner: Document) -> Self {
        let page_ids = inner.get_pages().values().copied().collect();
        Self { inner, page_ids }
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, PdfError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page: index,
                page_count: self.page_ids.len(),
            })
    }

    fn page_index_of(&self, id: ObjectId) -> Option<usize> {
        self.page_ids.iter().position(|page_id| *page_id == id)
    }

    fn deref<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.inner.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_link(&self, annot: &Dictionary, page_index: usize) -> Option<(LinkKind, Option<usize>)> {
        if let Some(action) = annot
            .get(b"A")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_dict().ok())
        {
            let action_type = action.get(b"S").and_then(Object::as_name).ok()?;
            return match action_type {
                b"GoTo" => Some((
                    LinkKind::GoTo,
                    action
                        .get(b"D")
                        .ok()
                        .and_then(|dest| self.resolve_destination(dest, 0)),
                )),
                b"Named" => {
                    let name = action.get(b"N").and_then(Object::as_name).ok()?;
                    Some((LinkKind::Named, self.named_action_target(name, page_index)))
                }
                _ => None,
            };
        }

        annot
            .get(b"Dest")
            .ok()
            .map(|dest| (LinkKind::GoTo, self.resolve_destination(dest, 0)))
    }

    fn named_action_target(&self, name: &[u8], page_index: usize) -> Option<usize> {
        let page_count = self.page_ids.len();
        match name {
            b"NextPage" => Some(page_index + 1).filter(|index| *index < page_count),
            b"PrevPage" => page_index.checked_sub(1),
            b"FirstPage" => Some(0).filter(|_| page_count > 0),
            b"LastPage" => page_count.checked_sub(1),
            _ => None,
        }
    }

    fn resolve_destination(&self, dest: &Object, depth: usize) -> Option<usize> {
        if depth > MAX_DESTINATION_DEPTH {
            return None;
        }

        match self.deref(dest)? {
            Object::Array(items) => match items.first()? {
                Object::Reference(page_ref) => self.page_index_of(*page_ref),
                _ => None,
            },
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, depth + 1),
            Object::String(name, _) | Object::Name(name) => {
                let target = self.lookup_named_destination(name)?;
                self.resolve_destination(target, depth + 1)
            }
            _ => None,
        }
    }

    fn lookup_named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.inner.catalog().ok()?;

        let from_tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|names| names.get(b"Dests").ok())
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|root| self.lookup_name_tree(root, name, 0));
        if from_tree.is_some() {
            return from_tree;
        }

        catalog
            .get(b"Dests")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|dests| dests.get(name).ok())
    }

    fn lookup_name_tree<'a>(&'a self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_NAME_TREE_DEPTH {
            return None;
        }

        if let Some(pairs) = node
            .get(b"Names")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_array().ok())
        {
            for pair in pairs.chunks(2) {
                if let [Object::String(key, _), value] = pair {
                    if key.as_slice() == name {
                        return Some(value);
                    }
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| self.deref(kid).and_then(|obj| obj.as_dict().ok()))
            .find_map(|kid| self.lookup_name_tree(kid, name, depth + 1))
    }

    fn page_error(page: usize, err: impl std::fmt::Display) -> PdfError {
        PdfError::Page {
            page,
            reason: err.to_string(),
        }
    }
}

impl PdfDocument for LopdfDocument {
    fn empty() -> Self {
        Self::from_document(empty_document())
    }

    fn page_count(&self) -> Result<usize, PdfError> {
        Ok(self.page_ids.len())
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let page_id = self.page_id(index)?;
        let glyphs = page_glyphs(&self.inner, page_id).map_err(|err| Self::page_error(index, err))?;
        Ok(assemble_lines(&glyphs, "\n"))
    }

    fn page_links(&self, index: usize) -> Result<Vec<PageLink>, PdfError> {
        let page_id = self.page_id(index)?;
        let page = self
            .inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|err| Self::page_error(index, err))?;

        let Some(annots) = page
            .get(b"Annots")
            .ok()
            .and_then(|obj| self.deref(obj))
            .and_then(|obj| obj.as_array().ok())
        else {
            return Ok(Vec::new());
        };

        let mut links = Vec::new();
        for entry in annots {
            let Some(annot) = self.deref(entry).and_then(|obj| obj.as_dict().ok()) else {
                continue;
            };
            if !matches!(annot.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Link") {
                continue;
            }

            let Some(rect) = annot
                .get(b"Rect")
                .ok()
                .and_then(|obj| self.deref(obj))
                .and_then(|obj| obj.as_array().ok())
                .and_then(|array| rect_from_array(array))
            else {
                continue;
            };

            let Some((kind, target_page)) = self.resolve_link(annot, index) else {
                continue;
            };

            debug!(page = index, ?kind, ?target_page, "link annotation");
            links.push(PageLink {
                kind,
                rect,
                target_page,
            });
        }

        Ok(links)
    }

    fn clipped_text(&self, index: usize, rect: &LinkRect) -> Result<String, PdfError> {
        let page_id = self.page_id(index)?;
        let glyphs = page_glyphs(&self.inner, page_id).map_err(|err| Self::page_error(index, err))?;
        let inside = glyphs.iter().filter(|glyph| {
            let (x, y) = glyph.center();
            rect.contains(x, y)
        });
        Ok(assemble_lines(inside, " "))
    }

    fn copy_pages(&self, range: RangeInclusive<usize>) -> Result<Self, PdfError> {
        let page_count = self.page_ids.len();
        let start = *range.start();
        if start >= page_count {
            return Err(PdfError::PageOutOfRange {
                page: start,
                page_count,
            });
        }
        let end = (*range.end()).min(page_count - 1);
        if end < start {
            return Err(Self::page_error(start, "empty page range"));
        }

        let mut doc = empty_document();
        copy_pages_into(&mut doc, &self.inner, &self.page_ids[start..=end])?;
        Ok(Self::from_document(doc))
    }

    fn append(&mut self, other: &Self) -> Result<(), PdfError> {
        copy_pages_into(&mut self.inner, &other.inner, &other.page_ids)?;
        self.page_ids = self.inner.get_pages().values().copied().collect();
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|err| PdfError::Save(err.to_string()))?;
        Ok(buffer)
    }
}

fn rect_from_array(array: &[Object]) -> Option<LinkRect> {
    let values = array
        .iter()
        .map(|obj| match obj {
            Object::Integer(value) => Some(*value as f64),
            Object::Real(value) => Some(*value as f64),
            _ => None,
        })
        .collect::<Option<Vec<f64>>>()?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Some(LinkRect::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}
