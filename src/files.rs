//! Helpers shared by file validation and the file controllers.

use std::path::Path;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`; binary multiples, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", SIZE_UNITS[unit])
}

/// File extension for a mime type, used when naming generated files.
pub fn mime_to_ext(mime: &str) -> String {
    let mime = mime.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => "png".to_string(),
        "image/jpeg" | "image/jpg" => "jpg".to_string(),
        "image/webp" => "webp".to_string(),
        "image/gif" => "gif".to_string(),
        "application/pdf" => "pdf".to_string(),
        other => other
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|subtype| !subtype.is_empty())
            .map(|subtype| subtype.split(['+', ';']).next().unwrap_or(subtype).to_string())
            .unwrap_or_else(|| "bin".to_string()),
    }
}

/// Matches `mime` against an allowlist entry; `image/*` and `*/*` wildcards are honoured.
pub fn mime_matches(pattern: &str, mime: &str) -> bool {
    let pattern = pattern.trim();
    let mime = mime.trim();
    if pattern == "*/*" || pattern == "*" {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(family) => mime
            .split_once('/')
            .is_some_and(|(candidate, _)| candidate.eq_ignore_ascii_case(family)),
        None => pattern.eq_ignore_ascii_case(mime),
    }
}

/// Mime type guessed from a path's extension, `application/octet-stream` when unknown.
pub fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
