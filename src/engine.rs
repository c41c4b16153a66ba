use crate::config::{EngineConfig, UnknownDatePolicy};
use crate::date::find_date;
use crate::fields::extract_fields;
use crate::lines::LineSequence;
use crate::model::{CandidateEvent, RaceRecord};
use crate::name::resolve_name;
use std::collections::HashSet;
use tracing::debug;

/// Placeholder date shown when the lookback window held no date and the
/// policy keeps such candidates.
pub const UNKNOWN_DATE_LABEL: &str = "TBD";

/// Scan every line for the "plausibly describes a race" predicate: the line
/// carries the distance label and an eligible distance span. Each hit
/// becomes one candidate with its date and name resolved from the line's
/// neighborhood.
pub fn scan_candidates(lines: &LineSequence, config: &EngineConfig) -> Vec<CandidateEvent> {
    let mut candidates = Vec::new();

    for index in 0..lines.len() {
        let line = &lines[index];
        if !line.contains(&config.labels.distance) {
            continue;
        }

        let fields = extract_fields(line, config);
        if !fields.distance_eligible {
            continue;
        }

        let date = find_date(lines, index, config.date_lookback);
        let race_name = resolve_name(lines, index, &fields, config);

        debug!(
            index,
            dated = date.is_some(),
            states = fields.states.len(),
            "candidate line"
        );

        candidates.push(CandidateEvent {
            date,
            distances: fields.distances,
            states: fields.states,
            start_time: fields.start_time,
            race_name,
            raw_line: line.to_string(),
            source_index: index,
        });
    }

    candidates
}

/// Fan each candidate out to one record per matched state, apply the month
/// window, distance and state allow-list filters, then collapse duplicate
/// (date, state, race) keys to the first occurrence in scan order. Output
/// order follows input scan order, never hash order.
pub fn assemble(candidates: &[CandidateEvent], config: &EngineConfig) -> Vec<RaceRecord> {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut records = Vec::new();

    for candidate in candidates {
        let date = match candidate.date {
            Some(token) => {
                if !config.month_allowed(token.month) {
                    debug!(line = %candidate.raw_line, month = token.month.code(), "month outside window");
                    continue;
                }
                token.to_string()
            }
            None => match config.unknown_date {
                UnknownDatePolicy::Drop => continue,
                UnknownDatePolicy::Keep => UNKNOWN_DATE_LABEL.to_string(),
            },
        };

        // Guaranteed by the scan predicate; re-checked so assemble stands
        // alone as a contract.
        if !has_eligible_distance(candidate, config) {
            continue;
        }

        for state in &candidate.states {
            if !config.is_canonical_state(state) {
                continue;
            }

            let key = (date.clone(), state.clone(), candidate.race_name.clone());
            if !seen.insert(key) {
                continue;
            }

            records.push(RaceRecord {
                date: date.clone(),
                state: state.clone(),
                race_name: candidate.race_name.clone(),
                distances: candidate.distances.join(", "),
                link: None,
                source_line: candidate.raw_line.clone(),
            });
        }
    }

    records
}

pub fn extract_records(lines: &LineSequence, config: &EngineConfig) -> Vec<RaceRecord> {
    let candidates = scan_candidates(lines, config);
    assemble(&candidates, config)
}

fn has_eligible_distance(candidate: &CandidateEvent, config: &EngineConfig) -> bool {
    let token = config.distance_token.to_ascii_lowercase();
    candidate
        .distances
        .iter()
        .any(|distance| distance.eq_ignore_ascii_case(&config.distance_token))
        || candidate
            .distances
            .join(", ")
            .to_ascii_lowercase()
            .contains(&token)
}
