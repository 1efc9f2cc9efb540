//! Storage key derivation for uploaded blobs.
//!
//! Keys have the shape `{unix_millis}-{uuid}/{sanitized_filename}`: a
//! time-ordered prefix for operator-friendly listings, a random component so
//! concurrent uploads of the same filename can never collide, and the
//! original filename preserved as the final path segment.

use time::OffsetDateTime;
use uuid::Uuid;

/// Fallback name used when the client supplied no usable filename.
const DEFAULT_FILENAME: &str = "upload.pdf";

/// Maximum length of the sanitized filename segment.
const MAX_FILENAME_LEN: usize = 128;

/// Derive a collision-resistant storage key for a new upload.
pub fn derive_storage_key(original_filename: Option<&str>, uploaded_at: OffsetDateTime) -> String {
    let millis = uploaded_at.unix_timestamp_nanos() / 1_000_000;
    let name = sanitize_filename(original_filename.unwrap_or_default());
    format!("{millis}-{}/{name}", Uuid::new_v4().simple())
}

/// Reduce a client-supplied filename to a single safe path segment.
///
/// Takes the last path component (browsers may send full paths), keeps
/// alphanumerics plus `.`, `-`, and `_`, and rejects names that are empty or
/// all dots after cleaning.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Leading dots would produce hidden files or ".." segments.
    while cleaned.starts_with('.') {
        cleaned.remove(0);
    }
    cleaned.truncate(MAX_FILENAME_LEN);

    if cleaned.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }
    cleaned
}
