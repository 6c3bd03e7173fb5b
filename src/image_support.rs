use crate::error::AppError;
use base64::Engine;
use std::path::Path;

/// Guess a simple MIME type from the file extension
fn guess_mime_from_ext(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") | Some("heif") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Read an image from `path` and return it as a Base64 data URL
pub fn image_path_to_data_url(path: &str) -> Result<String, AppError> {
    let p = Path::new(path);
    let mime = guess_mime_from_ext(p);
    let data = std::fs::read(p)
        .map_err(|e| AppError::ImageLoad(format!("reading {} failed: {}", path, e)))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    Ok(format!("data:{};base64,{}", mime, b64))
}

/// Turn a handoff URI into something the webview can display.
///
/// Local files are inlined as data URLs because the webview cannot reach
/// arbitrary filesystem paths. Content and remote URIs pass through
/// unchanged.
pub fn display_source(image_uri: &str) -> Result<String, AppError> {
    if let Some(path) = image_uri.strip_prefix("file://") {
        return image_path_to_data_url(path);
    }
    if image_uri.starts_with('/') {
        return image_path_to_data_url(image_uri);
    }
    Ok(image_uri.to_string())
}
