//! Loads images referenced from requirement descriptions.

use std::path::Path;
use std::sync::LazyLock;

use base64::Engine as _;
use indexmap::IndexMap;
use regex::Regex;

/// `[label](target)` or `![alt](target)`; captures the target.
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:!\[.*?\]|\[.*?\])\((.*?)\)").expect("valid link regex"));

static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpg|jpeg|gif|bmp|webp|svg)$").expect("valid extension regex")
});

/// Read every image referenced by `text`, keyed by the reference as written.
///
/// References are resolved against `base_dir` (the requirements document's
/// directory). Missing or unreadable files are logged and skipped; non-image
/// links are ignored.
pub fn extract_images(base_dir: &Path, text: Option<&str>) -> IndexMap<String, String> {
    let mut images = IndexMap::new();
    let Some(text) = text else {
        return images;
    };

    for captures in LINK_PATTERN.captures_iter(text) {
        let relative = &captures[1];
        if !IMAGE_EXTENSION.is_match(relative) || images.contains_key(relative) {
            continue;
        }

        let absolute = base_dir.join(relative);
        match std::fs::read(&absolute) {
            Ok(bytes) => {
                images.insert(
                    relative.to_string(),
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Image file not found: {}", absolute.display());
            }
            Err(e) => {
                tracing::warn!("Failed to read image {}: {}", relative, e);
            }
        }
    }

    images
}
