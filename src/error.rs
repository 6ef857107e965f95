use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to open PDF: {0}")]
    Open(String),

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("failed to read page {page}: {reason}")]
    Page { page: usize, reason: String },

    #[error("PDF structure error: {0}")]
    Structure(#[from] lopdf::Error),

    #[error("failed to serialize PDF: {0}")]
    Save(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL does not point to a PDF file: {0}")]
    NotPdf(String),

    #[error("failed to compile viewer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Error, Debug)]
pub enum TocError {
    #[error(transparent)]
    Open(#[from] PdfError),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("failed to compile entry pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("entry {0} does not exist")]
    UnknownEntry(usize),

    #[error("entry {0} is not a section")]
    NotASection(usize),

    #[error("entry {0} is not a subject")]
    NotASubject(usize),
}

#[derive(Error, Debug)]
pub enum PackageError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}
