//! Presentation records and their link encodings

use chrono::{DateTime, SecondsFormat, Utc};
use common_types::ImageRecord;

/// Builds the record returned to clients for a stored object
pub(super) fn image_record(
    original_name: String,
    storage_key: String,
    url: String,
    size: u64,
    content_type: String,
    upload_time: DateTime<Utc>,
) -> ImageRecord {
    ImageRecord {
        markdown: markdown(&original_name, &url),
        bbcode: bbcode(&url),
        html: html(&original_name, &url),
        original_name,
        file_name: storage_key,
        url,
        size,
        content_type,
        upload_time: upload_time.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn markdown(alt: &str, url: &str) -> String {
    format!("![{alt}]({url})")
}

fn bbcode(url: &str) -> String {
    format!("[img]{url}[/img]")
}

fn html(alt: &str, url: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        escape_attribute(url),
        escape_attribute(alt)
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
