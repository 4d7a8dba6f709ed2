//! Media asset classification.

use mime_guess::mime;

/// Check whether a path points at an image or A/V asset by extension.
///
/// The cheap pre-filter used before any request goes out; media assets are
/// skipped during content scraping. Covers image, audio, and video types.
pub fn is_media_extension(path: &str) -> bool {
    mime_guess::from_path(path)
        .first()
        .map(|m| {
            let kind = m.type_();
            kind == mime::IMAGE || kind == mime::AUDIO || kind == mime::VIDEO
        })
        .unwrap_or(false)
}
