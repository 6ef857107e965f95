use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::pdf::{LopdfDocument, PdfDocument};
use crate::session::Session;
use crate::source::{resolve_pdf_bytes, source_name};
use crate::util::sha256_hex;

pub mod split;
pub mod toc;

pub struct LoadedSource {
    pub session: Session<LopdfDocument>,
    pub sha256: String,
    pub page_count: usize,
}

pub fn load_source(input: &str, timeout: Duration) -> Result<LoadedSource> {
    let bytes = resolve_pdf_bytes(input, timeout)
        .with_context(|| format!("failed to obtain PDF from {input}"))?;
    let sha256 = sha256_hex(&bytes);

    let document = LopdfDocument::open(&bytes).with_context(|| format!("failed to open {input}"))?;
    let page_count = document
        .page_count()
        .with_context(|| format!("failed to count pages of {input}"))?;

    let name = source_name(input);
    info!(source = %name, pages = page_count, sha256 = %sha256, "loaded PDF");

    let session = Session::load(name, document)
        .with_context(|| format!("failed to discover table of contents in {input}"))?;

    Ok(LoadedSource {
        session,
        sha256,
        page_count,
    })
}
