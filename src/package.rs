use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{PackageError, PdfError};
use crate::extract::ExtractedPart;
use crate::pdf::PdfDocument;

pub const MERGED_FILENAME: &str = "merged_selected_sections.pdf";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn merge_parts<D: PdfDocument>(parts: &[ExtractedPart<D>]) -> Result<Option<D>, PdfError> {
    if parts.is_empty() {
        return Ok(None);
    }

    let mut merged = D::empty();
    for part in parts {
        merged.append(&part.document)?;
    }
    Ok(Some(merged))
}

pub fn render_outputs<D: PdfDocument>(
    parts: &mut [ExtractedPart<D>],
) -> Result<Option<Vec<OutputFile>>, PackageError> {
    let Some(mut merged) = merge_parts(parts)? else {
        warn!("empty selection; nothing to package");
        return Ok(None);
    };

    let mut files = Vec::with_capacity(parts.len() + 1);
    for part in parts.iter_mut() {
        files.push(OutputFile {
            filename: part.filename.clone(),
            bytes: part.document.save()?,
        });
    }
    files.push(OutputFile {
        filename: MERGED_FILENAME.to_string(),
        bytes: merged.save()?,
    });
    Ok(Some(files))
}

pub fn bundle<D: PdfDocument>(parts: &mut [ExtractedPart<D>]) -> Result<Option<Vec<u8>>, PackageError> {
    let Some(files) = render_outputs(parts)? else {
        return Ok(None);
    };
    archive(&files).map(Some)
}

pub fn archive(files: &[OutputFile]) -> Result<Vec<u8>, PackageError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer.start_file(file.filename.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }

    let bytes = writer.finish()?.into_inner();
    info!(files = files.len(), bytes = bytes.len(), "archive written");
    Ok(bytes)
}

pub fn write_outputs(dir: &Path, files: &[OutputFile]) -> Result<Vec<PathBuf>, PackageError> {
    fs::create_dir_all(dir).map_err(|source| PackageError::Write {
        path: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.filename);
        fs::write(&path, &file.bytes).map_err(|source| PackageError::Write {
            path: path.display().to_string(),
            source,
        })?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "parts written");
    Ok(written)
}
