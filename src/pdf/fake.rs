use std::collections::HashSet;
use std::ops::RangeInclusive;

use super::{LinkKind, LinkRect, PageLink, PdfDocument};
use crate::error::PdfError;

#[derive(Clone, Debug, Default)]
pub struct FakePage {
    pub text: String,
    pub links: Vec<(PageLink, String)>,
}

#[derive(Clone, Debug, Default)]
pub struct FakeDocument {
    pub pages: Vec<FakePage>,
    pub failing_text_pages: HashSet<usize>,
    pub failing_link_pages: HashSet<usize>,
    pub page_count_fails: bool,
}

impl FakeDocument {
    pub fn with_pages(page_count: usize) -> Self {
        Self {
            pages: (1..=page_count)
                .map(|number| FakePage {
                    text: format!("page {number}"),
                    links: Vec::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, index: usize, text: &str) {
        self.pages[index].text = text.to_string();
    }

    /// Adds a GoTo link on `index` whose clipped text is `text`, pointing at the
    /// one-based `target_page` (0 or less yields an unresolved target).
    pub fn add_link(&mut self, index: usize, text: &str, target_page: i64) {
        let row = self.pages[index].links.len() as f64;
        let link = PageLink {
            kind: LinkKind::GoTo,
            rect: LinkRect::new(50.0, 700.0 - row * 20.0, 500.0, 715.0 - row * 20.0),
            target_page: usize::try_from(target_page - 1).ok(),
        };
        self.pages[index].links.push((link, text.to_string()));
    }

    fn page(&self, index: usize) -> Result<&FakePage, PdfError> {
        self.pages.get(index).ok_or(PdfError::PageOutOfRange {
            page: index,
            page_count: self.pages.len(),
        })
    }
}

impl PdfDocument for FakeDocument {
    fn empty() -> Self {
        Self::default()
    }

    fn page_count(&self) -> Result<usize, PdfError> {
        if self.page_count_fails {
            return Err(PdfError::Page {
                page: 0,
                reason: "page tree unreadable".to_string(),
            });
        }
        Ok(self.pages.len())
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        if self.failing_text_pages.contains(&index) {
            return Err(PdfError::Page {
                page: index,
                reason: "text extraction failed".to_string(),
            });
        }
        Ok(self.page(index)?.text.clone())
    }

    fn page_links(&self, index: usize) -> Result<Vec<PageLink>, PdfError> {
        if self.failing_link_pages.contains(&index) {
            return Err(PdfError::Page {
                page: index,
                reason: "annotation extraction failed".to_string(),
            });
        }
        Ok(self
            .page(index)?
            .links
            .iter()
            .map(|(link, _)| link.clone())
            .collect())
    }

    fn clipped_text(&self, index: usize, rect: &LinkRect) -> Result<String, PdfError> {
        Ok(self
            .page(index)?
            .links
            .iter()
            .find(|(link, _)| link.rect == *rect)
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }

    fn copy_pages(&self, range: RangeInclusive<usize>) -> Result<Self, PdfError> {
        let start = *range.start();
        if start >= self.pages.len() {
            return Err(PdfError::PageOutOfRange {
                page: start,
                page_count: self.pages.len(),
            });
        }
        let end = (*range.end()).min(self.pages.len() - 1);
        Ok(Self {
            pages: self.pages[start..=end].to_vec(),
            ..Self::default()
        })
    }

    fn append(&mut self, other: &Self) -> Result<(), PdfError> {
        self.pages.extend(other.pages.iter().cloned());
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, PdfError> {
        let texts = self
            .pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<&str>>();
        Ok(texts.join("\n").into_bytes())
    }
}
