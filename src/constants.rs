//! Shared constants used across the converter.

/// User agent string sent with image downloads.
pub const USER_AGENT: &str = concat!("ghost-to-jekyll/", env!("CARGO_PKG_VERSION"));

/// Jekyll layout written into every post's front matter.
pub const POST_LAYOUT: &str = "post";

/// Category written into every post's front matter.
pub const POST_CATEGORY: &str = "react";

/// Ghost status value of posts that get exported.
pub const PUBLISHED_STATUS: &str = "published";

/// Folder under the new base prefix that images are served from.
pub const IMAGE_FOLDER: &str = "img";
