use crate::config::EngineConfig;
use regex::Regex;
use std::sync::LazyLock;

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:am|pm)\b").expect("time-of-day regex must compile")
});

/// Everything recoverable from a single listing line. A missing label means
/// the corresponding field is empty; extraction never fails.
#[derive(Debug, Clone, Default)]
pub struct LineFields {
    pub distances: Vec<String>,
    /// Whether the distance span carries the configured eligibility token,
    /// either as a split element or anywhere in the raw span.
    pub distance_eligible: bool,
    pub states: Vec<String>,
    pub start_time: Option<String>,
    /// Byte spans of the first two time-of-day tokens, kept for the name
    /// resolver's between-times policy.
    pub time_spans: Vec<(usize, usize)>,
}

pub fn extract_fields(line: &str, config: &EngineConfig) -> LineFields {
    let mut fields = LineFields::default();

    if let Some(span) = label_span(line, &config.labels.distance, config) {
        fields.distances = span
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToString::to_string)
            .collect();
        fields.distance_eligible = distance_span_eligible(span, &fields.distances, config);
    }

    if let Some(span) = label_span(line, &config.labels.state, config) {
        fields.states = match_states(span, config);
    }

    for found in TIME_OF_DAY.find_iter(line).take(2) {
        fields.time_spans.push((found.start(), found.end()));
        if fields.start_time.is_none() {
            fields.start_time = Some(found.as_str().to_string());
        }
    }

    fields
}

/// Text between a label and the next recognized label, or end of line.
fn label_span<'a>(line: &'a str, label: &str, config: &EngineConfig) -> Option<&'a str> {
    let start = line.find(label)? + label.len();
    let rest = &line[start..];

    let end = config
        .labels
        .all()
        .iter()
        .filter_map(|other| rest.find(*other))
        .min()
        .unwrap_or(rest.len());

    Some(rest[..end].trim())
}

/// Element equality first, then a substring scan of the raw span. The
/// substring fallback covers unsplit or malformed distance lists; trading
/// the occasional false positive for fewer false negatives is intentional.
fn distance_span_eligible(span: &str, distances: &[String], config: &EngineConfig) -> bool {
    if distances
        .iter()
        .any(|distance| distance.eq_ignore_ascii_case(&config.distance_token))
    {
        return true;
    }

    span.to_ascii_lowercase()
        .contains(&config.distance_token.to_ascii_lowercase())
}

/// Canonical state names matched within a state-label span. Exact token
/// matches against the alias map win; when none succeed, the unsplit span
/// is scanned for each alias as a substring (run-together lists).
fn match_states(span: &str, config: &EngineConfig) -> Vec<String> {
    let mut states: Vec<String> = span
        .split([',', '|', '/'])
        .filter_map(|token| config.lookup_state(token))
        .map(ToString::to_string)
        .collect();

    if states.is_empty() {
        let lowered = span.to_ascii_lowercase();
        for (alias, canonical) in &config.states {
            if lowered.contains(alias.as_str()) {
                states.push(canonical.clone());
            }
        }
    }

    let mut seen = Vec::new();
    states.retain(|state| {
        if seen.contains(state) {
            false
        } else {
            seen.push(state.clone());
            true
        }
    });
    states
}
