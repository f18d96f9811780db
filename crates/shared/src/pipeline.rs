use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::archive::{ArchiveManager, ArchiveReport};
use crate::config::Config;
use crate::content::{ContentLoader, ContentOrigin};
use crate::models::SectionValue;
use crate::publish::{GitPublisher, PublishOutcome};
use crate::render::DocumentRenderer;

/// What one daily run produced.
#[derive(Debug)]
pub struct DailyReport {
    pub display_date: String,
    pub origin: ContentOrigin,
    pub warnings: Vec<String>,
    pub archive: ArchiveReport,
    pub publish: Option<PublishOutcome>,
}

/// Load, render and archive the digest for `today`, then publish if enabled.
/// Only failing to write the page itself is an error.
pub fn run_daily(config: &Config, today: NaiveDate) -> Result<DailyReport> {
    let load = ContentLoader::load(config.content_path.as_deref(), today);

    let display_date = match load.record.get("date") {
        Some(SectionValue::Text(date)) => date.clone(),
        _ => crate::dates::display_date(today),
    };

    let document = DocumentRenderer::render(&load.record);

    let archive = ArchiveManager::new(&config.output_dir)
        .archive(&document, &display_date, today)
        .context("Failed to save the daily brief")?;

    let publish = config.publish.then(|| {
        GitPublisher::new(&config.output_dir)
            .publish(&format!("daily brief {}", archive.iso_date))
    });

    Ok(DailyReport {
        display_date,
        origin: load.origin,
        warnings: load.warnings,
        archive,
        publish,
    })
}
