use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::SourceError;

pub fn is_remote(input: &str) -> bool {
    let input = input.trim();
    input.starts_with("http://") || input.starts_with("https://")
}

pub fn looks_like_pdf(url: &str) -> bool {
    url.trim().to_ascii_lowercase().ends_with(".pdf")
}

pub fn source_name(input: &str) -> String {
    let input = input.trim();
    let name = if is_remote(input) {
        Url::parse(input)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .filter(|segment| !segment.is_empty())
    } else {
        Path::new(input)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    };
    name.unwrap_or_else(|| input.to_string())
}

pub struct ViewerScanner {
    iframe_src: Regex,
}

impl ViewerScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            iframe_src: Regex::new(r#"(?is)<iframe\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)?,
        })
    }

    pub fn embedded_src<'h>(&self, html: &'h str) -> Option<&'h str> {
        let captures = self.iframe_src.captures(html)?;
        (1..=3)
            .filter_map(|group| captures.get(group))
            .map(|found| found.as_str().trim())
            .next()
    }

    pub fn pdf_url(&self, page_url: &Url, html: &str) -> Result<Url, SourceError> {
        let target = match self.embedded_src(html) {
            Some(src) => match src.split_once("file=") {
                Some((_, file)) => file,
                None => src,
            },
            None => page_url.as_str(),
        };

        let url = page_url.join(target).map_err(|err| SourceError::InvalidUrl {
            url: target.to_string(),
            reason: err.to_string(),
        })?;
        if !looks_like_pdf(url.path()) {
            return Err(SourceError::NotPdf(url.to_string()));
        }
        Ok(url)
    }
}

pub fn resolve_pdf_bytes(input: &str, timeout: Duration) -> Result<Vec<u8>, SourceError> {
    let input = input.trim();
    if !is_remote(input) {
        let bytes = fs::read(input).map_err(|source| SourceError::Io {
            path: input.to_string(),
            source,
        })?;
        info!(path = input, bytes = bytes.len(), "read local PDF");
        return Ok(bytes);
    }

    let page_url = Url::parse(input).map_err(|err| SourceError::InvalidUrl {
        url: input.to_string(),
        reason: err.to_string(),
    })?;
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| SourceError::Request {
            url: input.to_string(),
            source,
        })?;

    let pdf_url = if looks_like_pdf(page_url.path()) {
        page_url
    } else {
        let html = fetch(&client, &page_url)?;
        let html = String::from_utf8_lossy(&html);
        let resolved = ViewerScanner::new()?.pdf_url(&page_url, &html)?;
        debug!(page = %page_url, pdf = %resolved, "resolved embedded PDF");
        resolved
    };

    let bytes = fetch(&client, &pdf_url)?;
    info!(url = %pdf_url, bytes = bytes.len(), "downloaded PDF");
    Ok(bytes)
}

fn fetch(client: &Client, url: &Url) -> Result<Vec<u8>, SourceError> {
    let request_error = |source| SourceError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url.clone()).send().map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().map_err(request_error)?.to_vec())
}
