use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar month as recognized in listing text. The recognizer knows all
/// twelve months; which of them survive into output is the allow-list's
/// decision, not the recognizer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Upper-cased three-letter code used in record display.
    pub fn code(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    /// Lowercase token used when expanding `{{month}}` in listing URLs.
    pub fn url_token(self) -> &'static str {
        match self {
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sep => "sep",
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
        }
    }

    /// Accepted spellings, per month. Explicit tables rather than anything
    /// locale-derived; listing sites mix abbreviations and long forms freely.
    pub fn spellings(self) -> &'static [&'static str] {
        match self {
            Month::Jan => &["jan", "january"],
            Month::Feb => &["feb", "february"],
            Month::Mar => &["mar", "march"],
            Month::Apr => &["apr", "april"],
            Month::May => &["may"],
            Month::Jun => &["jun", "june"],
            Month::Jul => &["jul", "july"],
            Month::Aug => &["aug", "august"],
            Month::Sep => &["sep", "sept", "september"],
            Month::Oct => &["oct", "october"],
            Month::Nov => &["nov", "november"],
            Month::Dec => &["dec", "december"],
        }
    }

    pub fn from_word(word: &str) -> Option<Month> {
        let lowered = word.to_ascii_lowercase();
        Month::ALL
            .into_iter()
            .find(|month| month.spellings().contains(&lowered.as_str()))
    }
}

/// A day-of-month plus month recovered from listing text. Absence of a date
/// is `Option<DateToken>::None` at the call sites, never a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateToken {
    pub month: Month,
    pub day: u8,
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}", self.month.code(), self.day)
    }
}

/// One line that plausibly describes a race, with everything recovered from
/// it and its neighborhood. Consumed immediately by the assembler.
#[derive(Debug, Clone)]
pub struct CandidateEvent {
    pub date: Option<DateToken>,
    pub distances: Vec<String>,
    pub states: Vec<String>,
    pub start_time: Option<String>,
    pub race_name: String,
    pub raw_line: String,
    pub source_index: usize,
}

/// Final output unit. No two records in an output sequence share
/// (date, state, race_name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Race")]
    pub race_name: String,
    #[serde(rename = "Distances")]
    pub distances: String,
    #[serde(rename = "Link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "Source")]
    pub source_line: String,
}

impl RaceRecord {
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.date, &self.state, &self.race_name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceRunReport {
    pub source_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub pages_fetched: usize,
    pub lines_scanned: usize,
    pub candidates: usize,
    pub records: usize,
    pub dropped_unknown_date: usize,
}
