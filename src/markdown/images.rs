use std::sync::LazyLock;

use regex::Regex;

use crate::constants::IMAGE_FOLDER;

/// `![alt](path)` on a single line, shortest alt and path.
static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("image link pattern is valid")
});

/// An image found while rewriting, to be downloaded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Absolute URL on the old site.
    pub source_url: String,
    /// File name the image is stored under locally.
    pub local_name: String,
}

/// Point every markdown image link at `<new_base_prefix>/img/<basename>`.
///
/// Returns the rewritten text and one reference per link, in order of
/// appearance. Links to the same image yield one reference each.
///
/// Scanning continues on the rewritten text right after each inserted
/// replacement, so offsets stay correct when paths change length.
///
/// # Examples
///
/// ```
/// # use ghost_to_jekyll::markdown::rewrite_images;
/// let (text, refs) = rewrite_images("![logo](/content/logo.png)", "https://old.blog", "/site");
/// assert_eq!(text, "![logo](/site/img/logo.png)");
/// assert_eq!(refs[0].source_url, "https://old.blog/content/logo.png");
/// ```
#[must_use]
pub fn rewrite_images(
    markdown: &str,
    old_base_url: &str,
    new_base_prefix: &str,
) -> (String, Vec<ImageReference>) {
    let mut text = markdown.to_string();
    let mut references = Vec::new();
    let mut pos = 0;

    while let Some(caps) = IMAGE_LINK.captures_at(&text, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let range = whole.range();
        let alt = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let path = caps.get(2).map_or("", |m| m.as_str());

        let source_url = format!("{old_base_url}{path}");
        let local_name = basename(&source_url).to_string();
        let replacement = format!("![{alt}]({new_base_prefix}/{IMAGE_FOLDER}/{local_name})");
        drop(caps);

        references.push(ImageReference {
            source_url,
            local_name,
        });

        pos = range.start + replacement.len();
        text.replace_range(range, &replacement);
    }

    (text, references)
}

/// Final path segment of a URL or path.
fn basename(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}
