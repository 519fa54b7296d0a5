use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::PUBLISHED_STATUS;
use crate::error::ConvertError;

/// Top-level shape of a Ghost JSON export.
#[derive(Debug, Clone, Deserialize)]
pub struct GhostExport {
    pub db: Vec<ExportDatabase>,
}

/// One database snapshot inside an export.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportDatabase {
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    pub data: ExportData,
}

/// The four collections the converter reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub posts_tags: Vec<PostTag>,
}

/// Ghost record identifier.
///
/// Older exports use integer ids, newer ones use object-id strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A timestamp as it appears in an export: RFC 3339 text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Parse into a UTC timestamp, or `None` if the value is not a valid date.
    #[must_use]
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    // Some exports drop the offset: "2015-05-20 18:32:53"
                    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|naive| naive.and_utc())
                }),
        }
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A Ghost post.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: Id,
    pub status: String,
    #[serde(default)]
    pub published_at: Option<RawTimestamp>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub author_id: Option<Id>,
    #[serde(default)]
    pub markdown: Option<String>,
}

impl Post {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PUBLISHED_STATUS
    }

    /// The markdown body, empty when the export has none.
    #[must_use]
    pub fn body(&self) -> &str {
        self.markdown.as_deref().unwrap_or("")
    }

    /// Parsed publish date.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is missing or cannot be parsed.
    pub fn publish_date(&self) -> Result<DateTime<Utc>, ConvertError> {
        let raw = self
            .published_at
            .as_ref()
            .ok_or_else(|| ConvertError::MissingPublishDate {
                post: self.id.clone(),
            })?;
        raw.parse().ok_or_else(|| ConvertError::InvalidPublishDate {
            post: self.id.clone(),
            value: raw.to_string(),
        })
    }
}

/// A Ghost user; only the name is exported as the post author.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
}

/// A row of the posts-to-tags join table.
#[derive(Debug, Clone, Deserialize)]
pub struct PostTag {
    pub post_id: Id,
    pub tag_id: Id,
}
