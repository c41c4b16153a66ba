use crate::lines::LineSequence;
use crate::model::{DateToken, Month};
use regex::Regex;
use std::sync::LazyLock;

static DAY_THEN_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+([a-z]+)").expect("day-first date regex must compile")
});

static WORD_THEN_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\s+(\d{1,2})\b").expect("month-first date regex must compile")
});

/// Recognize a date token on a single line. Two grammars, in priority order:
/// `<day> <month-word>` then `<month-word> <day>`. Month words are validated
/// against the explicit per-month spelling tables, so a stray `"10 runners"`
/// never reads as a date.
pub fn date_on_line(line: &str) -> Option<DateToken> {
    for caps in DAY_THEN_WORD.captures_iter(line) {
        let day = caps[1].parse::<u8>().ok()?;
        if !(1..=31).contains(&day) {
            continue;
        }
        if let Some(month) = Month::from_word(&caps[2]) {
            return Some(DateToken { month, day });
        }
    }

    for caps in WORD_THEN_DAY.captures_iter(line) {
        let Some(month) = Month::from_word(&caps[1]) else {
            continue;
        };
        let day = caps[2].parse::<u8>().ok()?;
        if (1..=31).contains(&day) {
            return Some(DateToken { month, day });
        }
    }

    None
}

static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d{1,2})\s+([a-z]+)|([a-z]+)\s+(\d{1,2}))\b[\s,]*")
        .expect("leading date regex must compile")
});

/// Strip a date token from the start of a line, if one is there. Used when
/// a listing line leads with its date and the rest of the line is the name.
pub fn strip_leading_date(line: &str) -> &str {
    let Some(caps) = LEADING_DATE.captures(line) else {
        return line;
    };

    let month_word = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
        .unwrap_or_default();
    if Month::from_word(month_word).is_none() {
        return line;
    }

    &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..]
}

/// Find the date governing the line at `at`: the line itself first, then a
/// backward scan through at most `lookback` preceding lines. Nearest
/// preceding match wins. `None` when the window holds no date; callers
/// decide whether that drops the candidate or tags it.
pub fn find_date(lines: &LineSequence, at: usize, lookback: usize) -> Option<DateToken> {
    if let Some(token) = lines.get(at).and_then(date_on_line) {
        return Some(token);
    }

    let floor = at.saturating_sub(lookback);
    for index in (floor..at).rev() {
        if let Some(token) = date_on_line(&lines[index]) {
            return Some(token);
        }
    }

    None
}
