use crate::config::EngineConfig;
use crate::date::strip_leading_date;
use crate::fields::LineFields;
use crate::lines::LineSequence;

/// Plausible length range for a title-like line picked out of the backward
/// window. Shorter lines are stray tokens, longer ones are prose blocks.
const MIN_TITLE_LEN: usize = 4;
const MAX_TITLE_LEN: usize = 120;

/// Derive a human-readable event name for the anchor line at `at`. Three
/// policies, tried strictly in this order; later ones are less reliable and
/// only apply when the earlier anchors are absent:
///
/// 1. two time tokens on the line -> the text strictly between them;
/// 2. one time token -> the text after it, truncated at the director label;
/// 3. nearest preceding title-like line within the name lookback window,
///    falling back to the anchor line's own text (truncated at its first
///    label, leading date token stripped).
pub fn resolve_name(
    lines: &LineSequence,
    at: usize,
    fields: &LineFields,
    config: &EngineConfig,
) -> String {
    let line = &lines[at];

    if let [(_, first_end), (second_start, _), ..] = fields.time_spans[..] {
        if first_end <= second_start {
            let between = trim_name(&line[first_end..second_start]);
            if !between.is_empty() {
                return between;
            }
        }
    } else if let [(_, end)] = fields.time_spans[..] {
        let mut after = &line[end..];
        if let Some(pos) = after.find(&config.labels.director) {
            after = &after[..pos];
        }
        let name = trim_name(after);
        if !name.is_empty() {
            return name;
        }
    }

    let floor = at.saturating_sub(config.name_lookback);
    for index in (floor..at).rev() {
        let candidate = &lines[index];
        if is_label_line(candidate, config) {
            continue;
        }
        if (MIN_TITLE_LEN..=MAX_TITLE_LEN).contains(&candidate.len()) {
            return candidate.to_string();
        }
    }

    anchor_fallback(line, config)
}

/// The anchor line's own text as a name of last resort: everything before
/// the first label, minus a leading date token. An empty result falls back
/// to the whole line so the record stays traceable.
fn anchor_fallback(line: &str, config: &EngineConfig) -> String {
    let head = match config
        .labels
        .all()
        .iter()
        .filter_map(|label| line.find(*label))
        .min()
    {
        Some(pos) => &line[..pos],
        None => line,
    };

    let trimmed = trim_name(strip_leading_date(head));
    if trimmed.is_empty() {
        line.to_string()
    } else {
        trimmed
    }
}

fn trim_name(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | '|'))
        .to_string()
}

/// Lines carrying a distance, type, or director label are field rows, never
/// titles.
fn is_label_line(line: &str, config: &EngineConfig) -> bool {
    line.contains(&config.labels.distance)
        || line.contains(&config.labels.kind)
        || line.contains(&config.labels.director)
}
