use crate::model::RaceRecord;
use crate::pipeline::{ScrapeOptions, scrape_sources};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub sources: usize,
    pub first_run_records: usize,
    pub second_run_records: usize,
    /// Same records in the same order across both runs.
    pub identical: bool,
    /// Records sharing a (date, state, race) key within one run. Must be
    /// zero; the assembler's dedup guarantees it.
    pub duplicate_keys: usize,
}

/// Scrape everything twice (the second pass rides the page cache) and audit
/// the output against the engine's promised properties: idempotence and
/// key uniqueness.
pub fn run_harness(options: &HarnessOptions) -> Result<HarnessReport> {
    let scrape_options = ScrapeOptions {
        config_dir: options.config_dir.clone(),
        cache_dir: options.cache_dir.clone(),
        source: None,
        no_cache: false,
    };

    let first = scrape_sources(&scrape_options)?;
    let second = scrape_sources(&scrape_options)?;

    Ok(HarnessReport {
        sources: first.reports.len(),
        first_run_records: first.records.len(),
        second_run_records: second.records.len(),
        identical: first.records == second.records,
        duplicate_keys: duplicate_key_count(&first.records),
    })
}

fn duplicate_key_count(records: &[RaceRecord]) -> usize {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| !seen.insert(record.dedup_key()))
        .count()
}
