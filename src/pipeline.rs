use crate::cache::PageCache;
use crate::config::{
    DocumentFormat, LoadedSource, UnknownDatePolicy, load_source_file, load_sources_from_dir,
};
use crate::engine::{assemble, scan_candidates};
use crate::fetch::{FetchedDocument, fetch_source_documents};
use crate::lines::normalize;
use crate::model::{RaceRecord, SourceRunReport};
use anyhow::{Context, Result, bail};
use scraper::Html;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub source: Option<String>,
    pub no_cache: bool,
}

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub records: Vec<RaceRecord>,
    pub reports: Vec<SourceRunReport>,
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub config_dir: Option<PathBuf>,
    pub source_file: Option<PathBuf>,
}

/// Fetch every enabled source, run the extraction engine per document, and
/// concatenate the per-source outputs in source order. Each source's record
/// sequence is independent; the merge is plain concatenation.
pub fn scrape_sources(options: &ScrapeOptions) -> Result<ScrapeOutcome> {
    let mut sources = load_sources_from_dir(&options.config_dir)?;
    if let Some(filter) = &options.source {
        sources.retain(|s| s.config.source.key == *filter);
    }
    if sources.is_empty() {
        bail!("no matching source configurations found");
    }

    let cache = (!options.no_cache).then(|| PageCache::new(&options.cache_dir));

    let mut records = Vec::new();
    let mut reports = Vec::new();

    for source in sources {
        if !source.config.source.enabled {
            info!(source = %source.config.source.key, "source disabled; skipping");
            continue;
        }

        info!(source = %source.config.source.key, "scrape start");
        let docs = fetch_source_documents(&source, cache.as_ref())
            .with_context(|| format!("fetch failed for source {}", source.config.source.key))?;

        let mut report = SourceRunReport {
            source_key: source.config.source.key.clone(),
            state: source.config.source.state.clone(),
            pages_fetched: docs.len(),
            ..SourceRunReport::default()
        };

        for doc in &docs {
            let text = flatten_document(&source, doc);
            let lines = normalize(&text);
            report.lines_scanned += lines.len();

            let candidates = scan_candidates(&lines, &source.config.engine);
            report.candidates += candidates.len();
            if source.config.engine.unknown_date == UnknownDatePolicy::Drop {
                report.dropped_unknown_date += candidates
                    .iter()
                    .filter(|candidate| candidate.date.is_none())
                    .count();
            }

            let mut extracted = assemble(&candidates, &source.config.engine);
            for record in &mut extracted {
                record.link = Some(doc.source_url.clone());
            }
            report.records += extracted.len();
            records.extend(extracted);
        }

        info!(
            source = %source.config.source.key,
            pages = report.pages_fetched,
            lines = report.lines_scanned,
            candidates = report.candidates,
            records = report.records,
            dropped_unknown_date = report.dropped_unknown_date,
            "scrape complete"
        );

        reports.push(report);
    }

    Ok(ScrapeOutcome { records, reports })
}

pub fn validate_configs(options: &ValidateOptions) -> Result<Vec<String>> {
    let mut messages = Vec::new();

    if let Some(file) = &options.source_file {
        let source = load_source_file(file)?;
        messages.push(validate_message(&source, file));
        return Ok(messages);
    }

    if let Some(dir) = &options.config_dir {
        let sources = load_sources_from_dir(dir)?;
        for source in sources {
            let message = validate_message(&source, &source.path);
            messages.push(message);
        }
        return Ok(messages);
    }

    bail!("either --config-dir or --source-file must be provided");
}

fn validate_message(source: &LoadedSource, path: &std::path::Path) -> String {
    match &source.config.source.state {
        Some(state) => format!(
            "OK: {} [{}] ({})",
            source.config.source.key,
            state,
            path.display()
        ),
        None => format!("OK: {} ({})", source.config.source.key, path.display()),
    }
}

/// Flatten a fetched document to plain text. HTML documents are reduced to
/// their text nodes, one per line, so element boundaries survive as line
/// boundaries for the lookback heuristics; text documents pass through.
fn flatten_document(source: &LoadedSource, doc: &FetchedDocument) -> String {
    let raw = String::from_utf8_lossy(&doc.body);
    match source.config.fetch.format {
        DocumentFormat::Text => raw.into_owned(),
        DocumentFormat::Html => flatten_html(&raw),
    }
}

pub fn flatten_html(html: &str) -> String {
    let parsed = Html::parse_document(html);
    parsed
        .root_element()
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed-width table for the display boundary.
pub fn render_table(records: &[RaceRecord]) -> String {
    let headers = ["Date", "State", "Race", "Distances"];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for record in records {
        let cells = [
            record.date.as_str(),
            record.state.as_str(),
            record.race_name.as_str(),
            record.distances.as_str(),
        ];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let push_row = |cells: [&str; 4], out: &mut String| {
        let row = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<w$}", w = *width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(row.trim_end());
        out.push('\n');
    };

    push_row(headers, &mut out);
    for record in records {
        push_row(
            [
                record.date.as_str(),
                record.state.as_str(),
                record.race_name.as_str(),
                record.distances.as_str(),
            ],
            &mut out,
        );
    }

    out
}
