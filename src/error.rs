use thiserror::Error;

use crate::ghost::Id;

/// Errors raised while turning Ghost posts into Jekyll posts.
///
/// All of these are fatal: well-formed exports never produce them.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("export contains no database entries")]
    EmptyExport,
    #[error("post {post} references unknown author {author}")]
    UnknownAuthor { post: Id, author: Id },
    #[error("post {post} references unknown tag {tag}")]
    UnknownTag { post: Id, tag: Id },
    #[error("published post {post} has no publish date")]
    MissingPublishDate { post: Id },
    #[error("post {post} has an invalid publish date '{value}'")]
    InvalidPublishDate { post: Id, value: String },
}
