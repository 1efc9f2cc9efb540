//! Book domain helpers: upload validation and reader-facing metadata.

use crate::error::{Error, Result};

/// Fixed content type for stored documents.
///
/// Every book is served as a PDF; the backend does not sniff or convert
/// uploaded content.
pub const BOOK_CONTENT_TYPE: &str = "application/pdf";

/// Validate that a required text field is non-empty after trimming.
///
/// Returns the trimmed value so callers store normalized text.
pub fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingField(field));
    }
    Ok(trimmed)
}

/// Suggested filename for a book's reader view, derived from its title.
///
/// The title goes into a `Content-Disposition` header, so quotes, backslashes,
/// control characters, and path separators are stripped.
pub fn attachment_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return "book.pdf".to_string();
    }
    format!("{cleaned}.pdf")
}
