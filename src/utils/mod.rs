//! Shared utility functions.

mod media;

pub use media::is_media_extension;
