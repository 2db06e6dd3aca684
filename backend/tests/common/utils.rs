use axum::response::Response;
use http_body_util::BodyExt;

const BOUNDARY: &str = "----image-gateway-test-boundary";

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// One file part of a multipart request
pub struct TestFile {
    pub field: &'static str,
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A file part under the `files` field
pub fn test_file(name: &str, content_type: &str, bytes: impl Into<Vec<u8>>) -> TestFile {
    TestFile {
        field: "files",
        name: name.to_string(),
        content_type: content_type.to_string(),
        bytes: bytes.into(),
    }
}

impl TestFile {
    pub fn in_field(self, field: &'static str) -> Self {
        Self { field, ..self }
    }
}

/// Builds a `multipart/form-data` body
///
/// Returns the `Content-Type` header value and the body.
pub fn multipart_body(files: &[TestFile]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Extracts the `name=value` pair from a `Set-Cookie` header value
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
