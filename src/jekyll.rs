//! Projection of Ghost posts onto Jekyll post files.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::constants::{POST_CATEGORY, POST_LAYOUT};
use crate::error::ConvertError;
use crate::ghost::{Lookup, Post};

/// A rendered post, ready to be written into the posts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JekyllPost {
    pub filename: String,
    pub content: String,
}

/// Front matter fields of a Jekyll post.
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub date: DateTime<Utc>,
    pub tags: Vec<&'a str>,
}

impl FrontMatter<'_> {
    /// Render the `---` delimited block, including the closing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "layout: {POST_LAYOUT}");
        let _ = writeln!(out, "title:  {}", self.title);
        if let Some(author) = self.author {
            let _ = writeln!(out, "author: {author}");
        }
        let _ = writeln!(out, "date: {}", self.date.format("%Y-%m-%d %H:%M"));
        let _ = writeln!(out, "published: true");
        let _ = writeln!(out, "categories: {POST_CATEGORY}");
        if !self.tags.is_empty() {
            let _ = writeln!(out, "tags: {}", self.tags.join(" "));
        }
        let _ = writeln!(out, "---");
        out
    }
}

/// `<YYYY-MM-DD>-<slug>.md`
#[must_use]
pub fn post_filename(date: DateTime<Utc>, slug: &str) -> String {
    format!("{}-{slug}.md", date.format("%Y-%m-%d"))
}

/// Render a post with the given (possibly rewritten) body.
///
/// # Errors
///
/// Returns an error if the publish date is missing or invalid, or if the
/// author or a tag id does not resolve.
pub fn render_post(post: &Post, body: &str, lookup: &Lookup) -> Result<JekyllPost, ConvertError> {
    let date = post.publish_date()?;
    let front_matter = FrontMatter {
        title: &post.title,
        author: lookup.author_name(post)?,
        date,
        tags: lookup.tag_names(post)?,
    };

    Ok(JekyllPost {
        filename: post_filename(date, &post.slug),
        content: front_matter.render() + body,
    })
}
