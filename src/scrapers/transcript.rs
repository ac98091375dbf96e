//! Transcript page extraction.
//!
//! Transcript bodies live in the `#content` element, normally as a run of `p`
//! children. A handful of pages (two days in December 2014) put every
//! paragraph in a `div` instead, so when the `p` children of `#content` hold
//! no text the `div` children are used.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::errors::{ExtractionError, PipelineResult};
use crate::fetcher::Fetch;
use crate::models::{BriefingRecord, TranscriptDocument};

const CONTENT_ID: &str = "content";

static CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&format!("#{CONTENT_ID}")).expect("static selector"));

/// Text blocks of the content container, or `None` if the page has none.
///
/// Each block's text is trimmed; blank blocks are dropped.
pub fn content_blocks(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let content = document.select(&CONTENT).next()?;

    let blocks = child_blocks(content, "p");
    if !blocks.is_empty() {
        return Some(blocks);
    }
    debug!("No paragraph text; falling back to divs");
    Some(child_blocks(content, "div"))
}

/// Trimmed, non-blank text of the `tag` children of `parent`.
fn child_blocks(parent: ElementRef<'_>, tag: &str) -> Vec<String> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == tag)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Location of the text artifact for a slug.
pub fn text_path(text_dir: &Path, slug: &str) -> PathBuf {
    text_dir.join(format!("{slug}.txt"))
}

/// Fetch one transcript, extract its body and write `{slug}.txt`.
#[instrument(level = "info", skip_all, fields(slug = %record.slug, url = %record.transcript_url))]
pub async fn extract<F: Fetch>(
    fetcher: &F,
    record: &BriefingRecord,
    text_dir: &Path,
) -> PipelineResult<TranscriptDocument> {
    let raw_html = fetcher.fetch(&record.transcript_url).await?;

    let blocks = content_blocks(&raw_html).ok_or_else(|| ExtractionError::MissingContainer {
        slug: record.slug.clone(),
        url: record.transcript_url.clone(),
        container: CONTENT_ID.to_string(),
    })?;
    if blocks.is_empty() {
        return Err(ExtractionError::EmptyBody {
            slug: record.slug.clone(),
            url: record.transcript_url.clone(),
        }
        .into());
    }
    let body_text = blocks.join("\n");

    write_text(text_dir, &record.slug, &body_text).await?;
    info!(blocks = blocks.len(), bytes = body_text.len(), "Extracted transcript");

    Ok(TranscriptDocument {
        id: record.id(),
        raw_html,
        body_text,
    })
}

async fn write_text(text_dir: &Path, slug: &str, text: &str) -> io::Result<()> {
    fs::create_dir_all(text_dir).await?;
    fs::write(text_path(text_dir, slug), text.as_bytes()).await
}
