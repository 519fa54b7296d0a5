use std::collections::HashMap;

use super::models::{ExportData, Id, Post};
use crate::error::ConvertError;

/// Id indexes over the read-only export collections.
///
/// Built once per run and passed into post processing.
#[derive(Debug, Default)]
pub struct Lookup {
    authors: HashMap<Id, String>,
    /// Tag names in export order; output lists tags in this order.
    tags: Vec<String>,
    tag_positions: HashMap<Id, usize>,
    post_tags: HashMap<Id, Vec<Id>>,
}

impl Lookup {
    #[must_use]
    pub fn new(data: &ExportData) -> Self {
        let authors = data
            .users
            .iter()
            .map(|user| (user.id.clone(), user.name.clone()))
            .collect();

        let tags = data.tags.iter().map(|tag| tag.name.clone()).collect();
        let mut tag_positions = HashMap::with_capacity(data.tags.len());
        for (position, tag) in data.tags.iter().enumerate() {
            tag_positions.entry(tag.id.clone()).or_insert(position);
        }

        let mut post_tags: HashMap<Id, Vec<Id>> = HashMap::new();
        for row in &data.posts_tags {
            post_tags
                .entry(row.post_id.clone())
                .or_default()
                .push(row.tag_id.clone());
        }

        Self {
            authors,
            tags,
            tag_positions,
            post_tags,
        }
    }

    /// Name of the post's author, `None` if the post has no author id.
    ///
    /// # Errors
    ///
    /// Returns an error if the author id matches no user.
    pub fn author_name(&self, post: &Post) -> Result<Option<&str>, ConvertError> {
        let Some(author_id) = &post.author_id else {
            return Ok(None);
        };
        self.authors
            .get(author_id)
            .map(|name| Some(name.as_str()))
            .ok_or_else(|| ConvertError::UnknownAuthor {
                post: post.id.clone(),
                author: author_id.clone(),
            })
    }

    /// Names of the post's tags, in tag-collection order, each at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if a join row points at a tag id that does not exist.
    pub fn tag_names(&self, post: &Post) -> Result<Vec<&str>, ConvertError> {
        let Some(tag_ids) = self.post_tags.get(&post.id) else {
            return Ok(Vec::new());
        };

        let mut positions = tag_ids
            .iter()
            .map(|tag_id| {
                self.tag_positions
                    .get(tag_id)
                    .copied()
                    .ok_or_else(|| ConvertError::UnknownTag {
                        post: post.id.clone(),
                        tag: tag_id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        positions.sort_unstable();
        positions.dedup();

        Ok(positions.into_iter().map(|i| self.tags[i].as_str()).collect())
    }
}
