//! Ghost JSON export loading and lookup indexes.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub mod lookup;
pub mod models;

pub use lookup::Lookup;
pub use models::{ExportData, GhostExport, Id, Post, PostTag, RawTimestamp, Tag, User};

use crate::error::ConvertError;

/// Parse an export document and return the data of its first database entry.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the export has no entries.
pub fn parse_export(json: &str) -> Result<ExportData> {
    let export: GhostExport = serde_json::from_str(json).context("Failed to parse Ghost export")?;
    let data = export
        .db
        .into_iter()
        .next()
        .map(|db| db.data)
        .ok_or(ConvertError::EmptyExport)?;

    debug!(
        posts = data.posts.len(),
        users = data.users.len(),
        tags = data.tags.len(),
        posts_tags = data.posts_tags.len(),
        "Parsed Ghost export"
    );

    Ok(data)
}

/// Read and parse an export file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_export(path: &Path) -> Result<ExportData> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read Ghost export: {}", path.display()))?;
    parse_export(&json)
}
