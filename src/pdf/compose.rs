use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::error::PdfError;

const INHERITED_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub fn empty_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => Object::Integer(0),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn copy_pages_into(
    target: &mut Document,
    source: &Document,
    page_ids: &[ObjectId],
) -> Result<(), PdfError> {
    let pages_id = root_pages_id(target)?;

    let mut copier = ObjectCopier::new(source, target, page_ids);
    let mut new_kids = Vec::with_capacity(page_ids.len());
    for page_id in page_ids {
        let new_page_id = copier.copy_page(*page_id, pages_id)?;
        new_kids.push(Object::Reference(new_page_id));
    }

    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    let added = new_kids.len() as i64;
    kids.extend(new_kids);

    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", Object::Integer(original_count + added));
    Ok(())
}

fn root_pages_id(doc: &Document) -> Result<ObjectId, PdfError> {
    Ok(doc.catalog()?.get(b"Pages")?.as_reference()?)
}

fn is_page_tree_node(obj: &Object) -> bool {
    match obj.as_dict() {
        Ok(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"Page" || name == b"Pages"
        ),
        Err(_) => false,
    }
}

fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").ok()?.as_reference().ok()?;
    for _ in 0..64 {
        let dict = doc.get_object(parent).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
    copied_pages: HashSet<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document, page_ids: &[ObjectId]) -> Self {
        Self {
            source,
            target,
            id_map: HashMap::new(),
            copied_pages: page_ids.iter().copied().collect(),
        }
    }

    fn reserve(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return *target_id;
        }
        let target_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, target_id);
        target_id
    }

    fn copy_page(&mut self, page_id: ObjectId, parent_id: ObjectId) -> Result<ObjectId, PdfError> {
        let mut page = self.source.get_object(page_id)?.as_dict()?.clone();
        for key in INHERITED_PAGE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_value(self.source, &page, key) {
                    page.set(key, value);
                }
            }
        }
        page.remove(b"Parent");

        let new_id = self.reserve(page_id);
        let mut copied = match self.remap(Object::Dictionary(page))? {
            Object::Dictionary(dict) => dict,
            _ => Dictionary::new(),
        };
        copied.set("Parent", Object::Reference(parent_id));
        self.target
            .objects
            .insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    fn copy_reference(&mut self, source_id: ObjectId) -> Result<Object, PdfError> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(Object::Reference(*target_id));
        }
        if self.copied_pages.contains(&source_id) {
            return Ok(Object::Reference(self.reserve(source_id)));
        }

        let source = self.source;
        let obj = match source.get_object(source_id) {
            Ok(obj) => obj,
            Err(_) => return Ok(Object::Null),
        };
        if is_page_tree_node(obj) {
            return Ok(Object::Null);
        }

        let target_id = self.reserve(source_id);
        let copied = self.remap(obj.clone())?;
        self.target.objects.insert(target_id, copied);
        Ok(Object::Reference(target_id))
    }

    fn remap(&mut self, obj: Object) -> Result<Object, PdfError> {
        match obj {
            Object::Reference(id) => self.copy_reference(id),
            Object::Array(items) => Ok(Object::Array(
                items
                    .into_iter()
                    .map(|item| self.remap(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }
}
