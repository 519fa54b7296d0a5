//! The single conversion pass over an export.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::download::ImageDownloader;
use crate::error::ConvertError;
use crate::ghost::{self, ExportData, Lookup, Post};
use crate::jekyll::{render_post, JekyllPost};
use crate::markdown::{fix_code_fences, rewrite_images, ImageReference};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub posts_written: usize,
    pub posts_skipped: usize,
    pub images_downloaded: usize,
}

/// A published post after body rewriting and rendering.
#[derive(Debug, Clone)]
pub struct PreparedPost {
    pub post: JekyllPost,
    pub images: Vec<ImageReference>,
}

/// Rewrite a post's body and render it as a Jekyll post.
///
/// # Errors
///
/// Returns an error if the post's date, author or tags do not resolve.
pub fn prepare_post(
    post: &Post,
    config: &Config,
    lookup: &Lookup,
) -> Result<PreparedPost, ConvertError> {
    let (body, images) = rewrite_images(post.body(), &config.old_base_url, &config.new_base_prefix);
    let body = if config.fix_code_syntax {
        fix_code_fences(&body)
    } else {
        body
    };

    Ok(PreparedPost {
        post: render_post(post, &body, lookup)?,
        images,
    })
}

/// Load the configured export and convert it.
///
/// # Errors
///
/// Returns the first fatal error of the run.
pub async fn run(config: &Config) -> Result<ConversionSummary> {
    let data = ghost::load_export(&config.export_path).await?;

    create_dir(&config.posts_dir).await?;
    let downloader = if config.download_images {
        create_dir(&config.images_dir).await?;
        Some(
            ImageDownloader::new(&config.images_dir, config.http_timeout)
                .context("Failed to build HTTP client")?,
        )
    } else {
        None
    };

    convert(&data, config, downloader).await
}

/// Convert every published post of `data`.
///
/// Post files and image downloads are written by independent tasks. The run
/// waits for all of them and fails with the first error seen; a failed task
/// does not cancel the others.
///
/// # Errors
///
/// Returns an error if a post cannot be rendered, a write fails, or a
/// download fails.
pub async fn convert(
    data: &ExportData,
    config: &Config,
    downloader: Option<ImageDownloader>,
) -> Result<ConversionSummary> {
    let lookup = Lookup::new(data);
    let mut summary = ConversionSummary::default();
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();
    let mut failure: Option<anyhow::Error> = None;

    for post in &data.posts {
        if !post.is_published() {
            debug!(slug = %post.slug, status = %post.status, "Skipping unpublished post");
            summary.posts_skipped += 1;
            continue;
        }

        let prepared = match prepare_post(post, config, &lookup) {
            Ok(prepared) => prepared,
            Err(e) => {
                failure = Some(e.into());
                break;
            }
        };

        let path = config.posts_dir.join(&prepared.post.filename);
        let content = prepared.post.content;
        tasks.spawn(async move {
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write post: {}", path.display()))?;
            debug!(path = %path.display(), "Wrote post");
            Ok(())
        });
        summary.posts_written += 1;

        if let Some(downloader) = &downloader {
            for image in prepared.images {
                let downloader = downloader.clone();
                tasks.spawn(async move {
                    downloader.fetch(&image).await?;
                    Ok(())
                });
                summary.images_downloaded += 1;
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        let result = joined.context("Conversion task panicked").and_then(|r| r);
        if let Err(e) = result {
            error!("{e:#}");
            failure.get_or_insert(e);
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }

    info!(
        posts_written = summary.posts_written,
        posts_skipped = summary.posts_skipped,
        images_downloaded = summary.images_downloaded,
        "Conversion complete"
    );
    Ok(summary)
}

async fn create_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghost::{Id, RawTimestamp};

    fn post(markdown: &str) -> Post {
        Post {
            id: Id::Number(1),
            status: "published".to_string(),
            published_at: Some(RawTimestamp::Text("2015-05-20T18:32:53Z".to_string())),
            title: "Title".to_string(),
            slug: "title".to_string(),
            author_id: None,
            markdown: Some(markdown.to_string()),
        }
    }

    #[test]
    fn test_prepare_post_rewrites_images() {
        let config = Config {
            old_base_url: "https://blog.example.com".to_string(),
            new_base_prefix: "/react".to_string(),
            ..Config::for_testing()
        };
        let prepared = prepare_post(&post("![a](/content/a.png)\n"), &config, &Lookup::default())
            .unwrap();

        assert!(prepared.post.content.ends_with("---\n![a](/react/img/a.png)\n"));
        assert_eq!(prepared.images.len(), 1);
        assert_eq!(
            prepared.images[0].source_url,
            "https://blog.example.com/content/a.png"
        );
    }

    #[test]
    fn test_prepare_post_fixes_code_when_enabled() {
        let md = "```\nvar x;\n```\n";
        let lookup = Lookup::default();

        let untouched = prepare_post(&post(md), &Config::for_testing(), &lookup).unwrap();
        assert!(untouched.post.content.ends_with("---\n```\nvar x;\n```\n"));

        let config = Config {
            fix_code_syntax: true,
            ..Config::for_testing()
        };
        let fixed = prepare_post(&post(md), &config, &lookup).unwrap();
        assert!(fixed.post.content.ends_with("---\n```js\nvar x;\n```\n"));
    }
}
