//! PDF text extraction wrapper
//!
//! Wraps pdf-extract crate with error handling for:
//! - Unreadable files
//! - Corrupted PDFs (library errors and library panics)

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};
use crate::{elog, log};

/// Extract full text from the PDF at `path`, pages concatenated in order
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let pages = extract_pages_labeled(&bytes, &path.display().to_string())?;
    let text = join_pages(&pages);
    log!("[Extract] {}: {} pages, {} chars", path.display(), pages.len(), text.chars().count());
    Ok(text)
}

/// Extract full text from PDF bytes
pub fn extract_text_from_bytes(pdf_bytes: &[u8]) -> Result<String> {
    let pages = extract_pages(pdf_bytes)?;
    Ok(join_pages(&pages))
}

/// Extract text per page, in document order
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<String>> {
    extract_pages_labeled(pdf_bytes, "<memory>")
}

fn extract_pages_labeled(pdf_bytes: &[u8], label: &str) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => {
            elog!("[Extract] {}: {}", label, e);
            Err(Error::Pdf(e.to_string()))
        }
        Err(_) => {
            elog!("[Extract] {}: pdf-extract panicked", label);
            Err(Error::PdfPanicked(label.to_string()))
        }
    }
}

/// Concatenate page texts with no separator. No pages yields an empty string.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
    }
    text
}
