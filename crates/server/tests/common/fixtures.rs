//! Request fixtures for API tests.

/// Fixed multipart boundary used by test requests.
pub const BOUNDARY: &str = "stacks-test-boundary";

/// Content-Type header value for test multipart bodies.
#[allow(dead_code)]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Build a multipart upload body with the given fields. Omitted fields are
/// left out entirely so tests can exercise validation.
#[allow(dead_code)]
pub fn multipart_upload(
    title: Option<&str>,
    category: Option<&str>,
    file: Option<(&str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(title) = title {
        push_text_field(&mut body, "title", title);
    }
    if let Some(category) = category {
        push_text_field(&mut body, "category", category);
    }
    if let Some((filename, data)) = file {
        push_file_field(&mut body, "file", filename, data);
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn push_text_field(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
    );
}

fn push_file_field(body: &mut Vec<u8>, name: &str, filename: &str, data: &[u8]) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
}
